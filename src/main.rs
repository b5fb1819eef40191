mod audio;
mod graphics;
mod math;
mod point;
mod state;
mod visualizer;

use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseEventKind};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::audio::AudioSim;
use crate::graphics::{Frame, TerminalSession};
use crate::state::{AppState, Session, VisualState};
use crate::visualizer::{SceneConfig, Viewport, Visualizer};

/// Overlay text color
const TEXT_COLOR: (u8, u8, u8) = (229, 231, 235);

/// Command-line options
#[derive(Parser, Debug)]
#[command(name = "orb3d", version, about)]
struct Args {
    /// Number of points on the sphere
    #[arg(long, default_value_t = 800)]
    points: usize,

    /// Sphere radius in abstract pixels
    #[arg(long, default_value_t = 100.0)]
    radius: f64,

    /// Perspective focal length
    #[arg(long, default_value_t = 300.0)]
    focal_length: f64,

    /// Target frames per second
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Seed for the simulated audio source
    #[arg(long)]
    seed: Option<u64>,

    /// Start with the scripted assistant session running
    #[arg(long)]
    auto: bool,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;
    run(args)
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    match log_file {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(
                    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
                )
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        None => {
            // the alternate screen owns stdout; keep stderr quiet unless
            // RUST_LOG asks for more
            tracing_subscriber::fmt()
                .with_env_filter(
                    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error")),
                )
                .with_writer(io::stderr)
                .init();
        }
    }
    Ok(())
}

fn run(args: Args) -> Result<()> {
    if !io::stdout().is_terminal() {
        // degrade silently: no drawing surface, no work
        warn!("stdout is not a terminal, nothing to draw");
        return Ok(());
    }

    let _session_guard =
        TerminalSession::enter().context("failed to configure the terminal")?;
    let (mut cols, mut rows) = TerminalSession::size();
    let mut frame = Frame::new(cols, rows);

    let mut visualizer = Visualizer::new(SceneConfig {
        points: args.points.max(1),
        radius: args.radius,
        focal_length: args.focal_length,
    });
    let mut data = AppState::new();
    let mut audio = AudioSim::new(args.seed);
    let mut session = args.auto.then(Session::new);
    info!(
        points = args.points,
        fps = args.fps,
        auto = args.auto,
        "visualizer starting"
    );

    let mut out = io::stdout();
    let tick = Duration::from_secs_f64(1.0 / args.fps.max(1) as f64);
    let mut last_tick = Instant::now();

    loop {
        let budget = tick.saturating_sub(last_tick.elapsed());
        if event::poll(budget)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,
                    KeyCode::Char('p') => data.paused = !data.paused,
                    KeyCode::Char('d') => data.debug = !data.debug,
                    KeyCode::Char(' ') | KeyCode::Char('a') | KeyCode::Enter => {
                        toggle_session(&mut session, &mut data)
                    }
                    KeyCode::Char(c) => {
                        if let Some(state) = manual_state(c) {
                            session = None;
                            data.state = state;
                            debug!(state = state.label(), "state asserted manually");
                        }
                    }
                    _ => {}
                },
                Event::Mouse(mouse) if matches!(mouse.kind, MouseEventKind::Down(_)) => {
                    toggle_session(&mut session, &mut data)
                }
                Event::Resize(new_cols, new_rows) => {
                    cols = new_cols;
                    rows = new_rows;
                    frame = Frame::new(cols, rows);
                }
                _ => {}
            }
            continue;
        }

        let now = Instant::now();
        let dt = now.duration_since(last_tick).as_secs_f64();
        last_tick = now;

        if !data.paused {
            if let Some(active) = session.as_mut() {
                // the session asserts mutually exclusive flags, the
                // visualizer collapses them
                let agent = active.tick(dt);
                data.state = VisualState::from_flags(
                    agent == VisualState::Listening,
                    agent == VisualState::Speaking,
                    agent == VisualState::Thinking,
                );
            }
            audio.update(data.state, dt);
            data.audio_level = audio.level();
            data.spectrum = audio.bins().to_vec();
            data.advance(dt);
        }

        let viewport = Viewport {
            width: cols as f64,
            height: rows as f64 * 2.0,
        };
        let projected = visualizer.project(&data, viewport);
        visualizer.note_frame();

        frame.clear();
        frame.draw_points(&projected);
        if data.debug {
            draw_overlay(&mut frame, &visualizer, &data);
        }
        if data.paused {
            let label = "paused";
            let col = cols.saturating_sub(label.len() as u16) / 2;
            frame.put_str(col, rows / 2, label, TEXT_COLOR);
        }
        frame.present(&mut out).context("failed to draw frame")?;
    }

    info!("visualizer stopped");
    Ok(())
}

/// The click callback: connect (start the scripted session) when idle,
/// disconnect back to idle otherwise.
fn toggle_session(session: &mut Option<Session>, data: &mut AppState) {
    if session.take().is_some() {
        data.state = VisualState::Idle;
        debug!("session disconnected");
    } else {
        *session = Some(Session::new());
        debug!("session connected");
    }
}

fn manual_state(c: char) -> Option<VisualState> {
    match c {
        '1' | 'i' => Some(VisualState::Idle),
        '2' | 'l' => Some(VisualState::Listening),
        '3' | 's' => Some(VisualState::Speaking),
        '4' | 't' => Some(VisualState::Thinking),
        _ => None,
    }
}

fn draw_overlay(frame: &mut Frame, visualizer: &Visualizer, data: &AppState) {
    let spectrum_mean = if data.spectrum.is_empty() {
        0.0
    } else {
        data.spectrum.iter().map(|&b| b as f64).sum::<f64>() / data.spectrum.len() as f64
    };
    let lines = [
        format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        format!("state: {}", data.state.label()),
        format!(
            "angle x: {:.2}  y: {:.2}  z: {:.2}",
            data.rotation.x, data.rotation.y, data.rotation.z
        ),
        format!("fps: {:.1}", visualizer.fps()),
        format!(
            "audio: {:.2}  spectrum mean: {:.1}",
            data.audio_level, spectrum_mean
        ),
        format!("points: {}", visualizer.config().points),
    ];
    for (i, line) in lines.iter().enumerate() {
        frame.put_str(1, 1 + i as u16, line, TEXT_COLOR);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_keys_cover_all_four_states() {
        assert_eq!(manual_state('i'), Some(VisualState::Idle));
        assert_eq!(manual_state('l'), Some(VisualState::Listening));
        assert_eq!(manual_state('s'), Some(VisualState::Speaking));
        assert_eq!(manual_state('t'), Some(VisualState::Thinking));
        assert_eq!(manual_state('1'), Some(VisualState::Idle));
        assert_eq!(manual_state('4'), Some(VisualState::Thinking));
        assert_eq!(manual_state('x'), None);
    }

    #[test]
    fn click_toggles_the_session_and_returns_to_idle() {
        let mut session = None;
        let mut data = AppState::new();
        data.state = VisualState::Speaking;
        toggle_session(&mut session, &mut data);
        assert!(session.is_some());
        toggle_session(&mut session, &mut data);
        assert!(session.is_none());
        assert_eq!(data.state, VisualState::Idle);
    }
}
