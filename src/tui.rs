use crate::lifecycle::{map_event, FocusSubscription, Input};
use crate::models::Phase;
use crate::storage::KeyValueStore;
use crate::tracker::{Tracker, Transition};
use crate::utils::format_elapsed;
use anyhow::Result;
use chrono::{DateTime, Utc};
use crossterm::{
    event, execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{error, info};

const TIMER_COLOR: Color = Color::Rgb(0, 122, 255);

pub fn run_tui<S: KeyValueStore>(
    tracker: &mut Tracker<S>,
    refresh: Duration,
    stop: &AtomicBool,
) -> Result<()> {
    // setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = FocusSubscription::subscribe()
        .and_then(|_focus| run_loop(&mut terminal, tracker, refresh, stop));

    // restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!("Screen loop failed: {:#}", err);
        println!("{:?}", err)
    }

    Ok(())
}

fn run_loop<S: KeyValueStore>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    tracker: &mut Tracker<S>,
    refresh: Duration,
    stop: &AtomicBool,
) -> Result<()> {
    loop {
        terminal.draw(|f| draw(f, tracker, Utc::now()))?;

        if stop.load(Ordering::SeqCst) {
            return Ok(());
        }

        if !event::poll(refresh)? {
            continue;
        }

        let Some(input) = map_event(&event::read()?) else {
            continue;
        };
        let now = Utc::now();
        match input {
            Input::Lifecycle(state) => {
                if let Transition::SessionEnded { elapsed_ms } =
                    tracker.on_lifecycle_change(state, now)
                {
                    info!(
                        elapsed_ms,
                        total_ms = tracker.daily_total_ms,
                        "Session ended"
                    );
                }
            }
            Input::Reset => tracker.reset(now),
            Input::Quit => return Ok(()),
        }
    }
}

pub fn draw<S: KeyValueStore>(frame: &mut Frame, tracker: &Tracker<S>, now: DateTime<Utc>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Timer
            Constraint::Length(3), // Footer
        ])
        .split(frame.size());

    draw_header(frame, chunks[0], tracker);
    draw_timer(frame, chunks[1], tracker, now);
    draw_footer(frame, chunks[2]);
}

fn draw_header<S: KeyValueStore>(frame: &mut Frame, area: Rect, tracker: &Tracker<S>) {
    let status_text = match tracker.last_state.phase() {
        Phase::Foregrounded => Span::styled(
            "COUNTING",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        Phase::Backgrounded => Span::styled(
            "PAUSED",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
    };

    let date = tracker
        .date
        .map(|d| d.to_string())
        .unwrap_or_else(|| "----------".to_string());

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " scrtime ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | "),
        status_text,
        Span::raw(" | "),
        Span::raw(date),
    ]))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, area);
}

fn draw_timer<S: KeyValueStore>(
    frame: &mut Frame,
    area: Rect,
    tracker: &Tracker<S>,
    now: DateTime<Utc>,
) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(5),
            Constraint::Min(0),
        ])
        .split(area);

    let lines = vec![
        Line::from(Span::styled(
            "Screen Time Today",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::raw(""),
        Line::from(Span::styled(
            format_elapsed(tracker.live_total_ms(now)),
            Style::default()
                .fg(TIMER_COLOR)
                .add_modifier(Modifier::BOLD),
        )),
        Line::raw(""),
        Line::from(Span::styled(
            "(Only counts while app is open)",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        rows[1],
    );
}

fn draw_footer(frame: &mut Frame, area: Rect) {
    let help = Paragraph::new("Press 'q' to quit | 'r' to reset today")
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
    frame.render_widget(help, area);
}
