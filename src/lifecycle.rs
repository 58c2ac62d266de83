use crate::models::LifecycleState;
use anyhow::Result;
use crossterm::event::{
    DisableFocusChange, EnableFocusChange, Event, KeyCode, KeyEventKind, KeyModifiers,
};
use crossterm::execute;
use std::io::{self, BufRead};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread;
use tracing::{debug, warn};

/// What the screen should do in response to a terminal event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Lifecycle(LifecycleState),
    Reset,
    Quit,
}

pub fn map_event(event: &Event) -> Option<Input> {
    match event {
        Event::FocusGained => Some(Input::Lifecycle(LifecycleState::Active)),
        Event::FocusLost => Some(Input::Lifecycle(LifecycleState::Inactive)),
        Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Input::Quit)
            }
            KeyCode::Char('q') | KeyCode::Esc => Some(Input::Quit),
            KeyCode::Char('r') => Some(Input::Reset),
            _ => None,
        },
        _ => None,
    }
}

/// Terminal focus reporting, enabled for as long as this value lives.
pub struct FocusSubscription {
    _private: (),
}

impl FocusSubscription {
    pub fn subscribe() -> Result<Self> {
        execute!(io::stdout(), EnableFocusChange)?;
        debug!("Focus reporting enabled");
        Ok(Self { _private: () })
    }
}

impl Drop for FocusSubscription {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), DisableFocusChange);
        debug!("Focus reporting disabled");
    }
}

/// Set when SIGINT or SIGTERM arrives.
pub fn install_stop_handler() -> Result<Arc<AtomicBool>> {
    let stop = Arc::new(AtomicBool::new(false));
    let flag = stop.clone();
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))?;
    Ok(stop)
}

/// Parse lifecycle states, one per line. Blank lines are ignored and
/// unrecognised ones are logged and skipped.
pub fn parse_states<R: BufRead>(reader: R) -> impl Iterator<Item = LifecycleState> {
    reader.lines().map_while(|line| line.ok()).filter_map(|line| {
        if line.trim().is_empty() {
            return None;
        }
        match line.parse() {
            Ok(state) => Some(state),
            Err(e) => {
                warn!("Ignoring input line: {}", e);
                None
            }
        }
    })
}

/// Read states from stdin on a background thread. The channel closes at EOF.
pub fn spawn_stdin_reader() -> Receiver<LifecycleState> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = io::stdin();
        for state in parse_states(stdin.lock()) {
            if tx.send(state).is_err() {
                break;
            }
        }
    });
    rx
}
