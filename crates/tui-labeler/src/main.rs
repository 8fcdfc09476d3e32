//! TUI demo for labeling gesture intervals over multi-camera captures.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p tui-labeler -- <data-folder> [--skip-labeled]
//! ```
//!
//! The data folder holds one directory per camera per capture
//! (`p001g02c00/...`) and receives the `p001g02_spots.json` label files.
//! Captures are visited in (person, gesture) order; frames stream in while
//! you label, and the strip at the bottom shows the labeling over the whole
//! sequence with the not-yet-loaded tail in white.
//!
//! # Keys (defaults, override via `keymap.json`)
//!
//! - `f` / `d`: step forward / back
//! - `g` / `s`: big step forward / back
//! - `b`: open an interval (again to cancel; on a labeled frame, jump to its
//!   start)
//! - `n`: close the open interval (on an end mark, reopen it; on a labeled
//!   frame, jump to its end)
//! - `x`: delete the interval under the cursor (inner frames only)
//! - `w`: save
//! - `m`: next capture (refused while unsaved changes exist)
//! - `q`: quit

mod keymap;
mod store;

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, stdout};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use labeler_core::{
    Action, ActionOutcome, LabelArray, LabelCode, LabelSession, SequenceSource, SessionState,
    SpotStore,
};
use labeler_frames::{Capture, SyncedFrameDirs, scan_captures};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use keymap::Keymap;
use store::JsonSpotStore;

#[derive(Debug, Parser)]
#[command(about = "Label gesture intervals over multi-camera captures")]
struct Args {
    /// Folder holding the capture frame directories and label files.
    folder: PathBuf,

    /// Skip captures that already have a label file.
    #[arg(short, long)]
    skip_labeled: bool,

    /// Key bindings file.
    #[arg(long, default_value = "keymap.json")]
    keymap: PathBuf,

    /// Gesture id to display name map.
    #[arg(long, default_value = "gestures.json")]
    gestures: PathBuf,
}

/// Why the per-capture loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaptureExit {
    NextCapture,
    Quit,
}

/// Per-capture application state.
struct CaptureApp<'a> {
    session: LabelSession,
    source: SyncedFrameDirs,
    store: JsonSpotStore,
    keymap: &'a Keymap,
    title: String,
    status_message: String,
    confirm_quit: bool,
    exit: Option<CaptureExit>,
}

impl CaptureApp<'_> {
    /// One tick: pull the next loading step and hand the count to the session
    /// before any action of this tick is applied.
    fn tick(&mut self) {
        let loaded = self.source.load_next();
        self.session.set_loaded_count(loaded);
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if self.confirm_quit {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    self.exit = Some(CaptureExit::Quit);
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.confirm_quit = false;
                    self.status_message.clear();
                }
                _ => {}
            }
            return;
        }

        let KeyCode::Char(ch) = key.code else {
            return;
        };
        let Some(action) = self.keymap.action_for(ch) else {
            return;
        };
        self.apply(action);
    }

    fn apply(&mut self, action: Action) {
        match self.session.apply(action, &mut self.store) {
            Ok(ActionOutcome::Saved) => {
                info!(file = %self.store.path().display(), "labels saved");
                self.status_message = format!("Saved: {}", self.store.path().display());
            }
            Ok(ActionOutcome::SaveBlocked) => {
                self.status_message =
                    "Cannot save: close or cancel the open interval first.".to_string();
            }
            Ok(ActionOutcome::Advance) => {
                self.exit = Some(CaptureExit::NextCapture);
            }
            Ok(ActionOutcome::AdvanceBlocked) => {
                warn!(capture = %self.title, "advance refused, unsaved changes");
                self.status_message =
                    "You have unsaved changes! Save before moving to the next sequence."
                        .to_string();
            }
            Ok(ActionOutcome::Quit) => {
                if self.session.is_dirty() {
                    self.confirm_quit = true;
                    self.status_message = "Unsaved changes. Quit anyway? (y/n)".to_string();
                } else {
                    self.exit = Some(CaptureExit::Quit);
                }
            }
            Ok(_) => {}
            Err(err) => {
                error!(%err, "save failed");
                self.status_message = err.to_string();
            }
        }
    }

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::vertical([
            Constraint::Length(3),
            Constraint::Min(4),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(frame.area());

        let state = self.session.state();

        frame.render_widget(
            Paragraph::new(self.title.as_str())
                .block(Block::default().borders(Borders::ALL)),
            chunks[0],
        );

        let mut lines = vec![
            Line::from(format!(
                "frame {} / {}   loaded {}",
                state.cursor, state.total_len, state.loaded_count
            )),
            Line::from(format!(
                "intervals: {}{}{}",
                state.interval_count,
                if state.waiting_end {
                    "   waiting for end"
                } else {
                    ""
                },
                if state.is_dirty { "   [unsaved]" } else { "" }
            )),
        ];
        match self.source.item(state.cursor) {
            Some(set) => {
                for (camera, bytes) in set {
                    lines.push(Line::from(format!("camera {:02}: {} bytes", camera, bytes.len())));
                }
            }
            None => lines.push(Line::from("frame not loaded yet")),
        }
        frame.render_widget(
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("frames")),
            chunks[1],
        );

        self.render_label_strip(frame, chunks[2], &state);

        frame.render_widget(
            Paragraph::new(self.status_message.as_str())
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default().borders(Borders::ALL)),
            chunks[3],
        );
    }

    /// The labeling over the whole sequence, scaled onto the terminal width:
    /// pending green, starts blue, inner gray, ends red, the unloaded tail
    /// white, the cursor yellow on top.
    fn render_label_strip(&self, frame: &mut Frame, area: Rect, state: &SessionState) {
        let inner_width = area.width.saturating_sub(2) as usize;
        let mut spans = Vec::with_capacity(inner_width);
        for col in 0..inner_width {
            let color = column_color(
                self.session.labels(),
                state.cursor,
                state.loaded_count,
                col,
                inner_width,
            );
            match color {
                Some(color) => spans.push(Span::styled(" ", Style::default().bg(color))),
                None => spans.push(Span::raw(" ")),
            }
        }
        frame.render_widget(
            Paragraph::new(Line::from(spans))
                .block(Block::default().borders(Borders::ALL).title("labels")),
            area,
        );
    }
}

/// Color for one strip column, `None` for a column past the sequence.
fn column_color(
    labels: &LabelArray,
    cursor: usize,
    loaded: usize,
    col: usize,
    width: usize,
) -> Option<Color> {
    let total = labels.len();
    if total == 0 || width == 0 {
        return None;
    }
    let lo = col * total / width;
    if lo >= total {
        return None;
    }
    let hi = (((col + 1) * total) / width).clamp(lo + 1, total);

    let code = (lo..hi)
        .map(|pos| labels.get(pos))
        .max_by_key(|&code| code_rank(code))
        .unwrap_or(LabelCode::Unlabeled);
    let mut color = code_color(code);
    if lo >= loaded {
        color = Color::White;
    }
    if (lo..hi).contains(&cursor) {
        color = Color::Yellow;
    }
    Some(color)
}

fn code_rank(code: LabelCode) -> u8 {
    match code {
        LabelCode::PendingStart => 4,
        LabelCode::IntervalStart => 3,
        LabelCode::IntervalEnd => 2,
        LabelCode::IntervalInner => 1,
        LabelCode::Unlabeled => 0,
    }
}

fn code_color(code: LabelCode) -> Color {
    match code {
        LabelCode::PendingStart => Color::Green,
        LabelCode::IntervalStart => Color::Blue,
        LabelCode::IntervalEnd => Color::Red,
        LabelCode::IntervalInner => Color::Gray,
        LabelCode::Unlabeled => Color::DarkGray,
    }
}

fn load_gesture_names(path: &Path) -> BTreeMap<String, String> {
    if !path.exists() {
        warn!(file = %path.display(), "no gesture name file, ids shown without names");
        return BTreeMap::new();
    }
    match fs::read_to_string(path).map_err(|err| err.to_string()).and_then(|text| {
        serde_json::from_str::<BTreeMap<String, String>>(&text).map_err(|err| err.to_string())
    }) {
        Ok(names) => names,
        Err(err) => {
            warn!(file = %path.display(), %err, "cannot read gesture names");
            BTreeMap::new()
        }
    }
}

fn run_capture<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut CaptureApp<'_>,
) -> io::Result<CaptureExit> {
    loop {
        app.tick();
        terminal.draw(|f| app.render(f))?;

        if let Some(exit) = app.exit {
            return Ok(exit);
        }

        if event::poll(Duration::from_millis(40))?
            && let Event::Key(key) = event::read()?
        {
            app.handle_key_event(key);
        }
    }
}

fn run<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    args: &Args,
    keymap: &Keymap,
    gesture_names: &BTreeMap<String, String>,
    captures: Vec<Capture>,
) -> io::Result<()> {
    for capture in captures {
        let spot_path = args.folder.join(capture.spot_file_name());
        if args.skip_labeled && spot_path.exists() {
            info!(capture = %capture.label(), "already labeled, skipping");
            continue;
        }

        let cameras: Vec<u8> = capture.cameras.keys().copied().collect();
        info!(capture = %capture.label(), ?cameras, "loading capture");

        let source = match SyncedFrameDirs::open(&capture.cameras) {
            Ok(source) => source,
            Err(err) => {
                error!(capture = %capture.label(), %err, "cannot open capture, skipping");
                continue;
            }
        };

        let mut store = JsonSpotStore::new(spot_path);
        let session = match store.load() {
            Ok(Some(spots)) => match LabelSession::from_spots(source.total_len(), &spots) {
                Ok(session) => session,
                Err(err) => {
                    error!(capture = %capture.label(), %err, "label file does not fit capture, skipping");
                    continue;
                }
            },
            Ok(None) => LabelSession::new(source.total_len()),
            Err(err) => {
                error!(capture = %capture.label(), %err, "cannot read label file, skipping");
                continue;
            }
        };

        let gesture_name = gesture_names
            .get(&capture.gesture.to_string())
            .map(String::as_str)
            .unwrap_or("?");
        let mut app = CaptureApp {
            session,
            source,
            store,
            keymap,
            title: format!(
                "PERSON_ID: {:03} GESTURE_ID: {:02} ({})",
                capture.person, capture.gesture, gesture_name
            ),
            status_message: String::new(),
            confirm_quit: false,
            exit: None,
        };

        match run_capture(terminal, &mut app)? {
            CaptureExit::NextCapture => continue,
            CaptureExit::Quit => break,
        }
    }
    Ok(())
}

fn main() -> io::Result<()> {
    let args = Args::parse();

    let (writer, _guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(".", "tui-labeler.log"));
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(writer)
        .with_ansi(false)
        .init();

    let keymap = match Keymap::load(&args.keymap) {
        Ok(keymap) => keymap,
        Err(err) => {
            eprintln!("{}", err);
            process::exit(1);
        }
    };
    debug!(?keymap, "key bindings");
    let gesture_names = load_gesture_names(&args.gestures);

    let captures = match scan_captures(&args.folder) {
        Ok(captures) => captures,
        Err(err) => {
            error!(%err, "capture scan failed");
            eprintln!("{}", err);
            process::exit(1);
        }
    };
    if captures.is_empty() {
        eprintln!("No captures found in '{}'", args.folder.display());
        return Ok(());
    }

    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &args, &keymap, &gesture_names, captures);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("exiting");
    result
}
