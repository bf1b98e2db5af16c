use crossterm::{
    cursor::{Hide, Show},
    event::{self, Event, KeyCode},
    execute,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::env;
use std::io::{stdout, BufRead, BufWriter};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

mod firework;
mod intake;
mod overlay;
mod particle;
mod show;
mod surface;

use intake::ScoreEvent;
use overlay::{Overlay, OverlayConfig, Schedule};
use surface::TermSurface;

struct Options {
    bg_color: (u8, u8, u8),
    tick_ceiling: u64,
    fps: u32,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            bg_color: (0, 0, 0),
            tick_ceiling: OverlayConfig::default().tick_ceiling,
            fps: 60,
        }
    }
}

fn print_usage() {
    eprintln!("scoreburst - terminal score overlay with fireworks");
    eprintln!();
    eprintln!("Usage: scoreburst [OPTIONS]");
    eprintln!();
    eprintln!("Reads newline-delimited JSON score messages on stdin:");
    eprintln!("  {{\"type\":\"H5P_SCORE_RESULT\",\"score\":95,\"maxScore\":100}}");
    eprintln!();
    eprintln!("The overlay stays hidden until the first score arrives, then shows");
    eprintln!("the result tier and, for scores of 90% and up, a fireworks display.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --bg-color RRGGBB  Backdrop color as hex (e.g., --bg-color 1a1b26)");
    eprintln!("  --tick-ceiling N   Top-tier keep-spawning ceiling in ticks (default 600)");
    eprintln!("  --fps N            Nominal tick rate (default 60)");
    eprintln!();
    eprintln!("Press 'q', ESC, or Ctrl+C to exit");
}

fn parse_hex_color(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some((r, g, b))
}

/// Background thread feeding the frame loop. Lines that are not score
/// results are dropped without comment; the channel closes on stdin EOF.
fn spawn_listener() -> Receiver<ScoreEvent> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if let Some(ev) = intake::parse_message(&line) {
                if tx.send(ev).is_err() {
                    break;
                }
            }
        }
    });
    rx
}

fn run(opts: Options) -> std::io::Result<()> {
    let rx = spawn_listener();

    let stdout = stdout();
    let mut stdout = BufWriter::with_capacity(1024 * 64, stdout);

    terminal::enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, Hide, Clear(ClearType::All))?;

    let (cols, rows) = terminal::size()?;
    let mut surface = TermSurface::new(cols as usize, rows as usize, opts.bg_color);

    let config = OverlayConfig {
        tick_ceiling: opts.tick_ceiling,
        ..OverlayConfig::default()
    };
    let mut overlay = Overlay::new(config, fastrand::Rng::new());

    let tick_len = Duration::from_secs_f32(1.0 / opts.fps as f32);
    // The waiting frame renders once before the controller parks itself.
    let mut running = true;
    let mut next_tick = Instant::now();

    'outer: loop {
        // Score events are applied between frames, never inside one. A
        // new score always forces the loop back into the running state.
        loop {
            match rx.try_recv() {
                Ok(ev) => {
                    overlay.recv_score(&ev);
                    surface.set_visible(true);
                    running = true;
                    next_tick = Instant::now();
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(key) => {
                    if key.code == KeyCode::Char('q')
                        || key.code == KeyCode::Esc
                        || (key.code == KeyCode::Char('c')
                            && key.modifiers.contains(event::KeyModifiers::CONTROL))
                    {
                        break 'outer;
                    }
                }
                Event::Resize(cols, rows) => {
                    let visible = surface.is_visible();
                    surface = TermSurface::new(cols as usize, rows as usize, opts.bg_color);
                    surface.set_visible(visible);
                    execute!(stdout, Clear(ClearType::All))?;
                    // Repaint once at the new size even if parked.
                    running = true;
                }
                _ => {}
            }
        }

        if running {
            if overlay.tick(&mut surface) == Schedule::Pause {
                running = false;
            }
            surface.render(&mut stdout)?;

            next_tick += tick_len;
            let now = Instant::now();
            if next_tick > now {
                thread::sleep(next_tick - now);
            } else {
                next_tick = now;
            }
        } else {
            // Parked: no ticks until a score event or key wakes us. All
            // animation state survives the pause untouched.
            event::poll(Duration::from_millis(100))?;
        }
    }

    execute!(stdout, Show, LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;

    Ok(())
}

fn main() -> std::io::Result<()> {
    let args: Vec<String> = env::args().collect();
    let mut opts = Options::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--bg-color" => {
                if i + 1 < args.len() {
                    if let Some(color) = parse_hex_color(&args[i + 1]) {
                        opts.bg_color = color;
                        i += 2;
                    } else {
                        eprintln!("Invalid hex color: {}", args[i + 1]);
                        eprintln!("Expected format: RRGGBB (e.g., 1a1b26)");
                        std::process::exit(1);
                    }
                } else {
                    eprintln!("--bg-color requires a hex color value");
                    std::process::exit(1);
                }
            }
            "--tick-ceiling" => {
                if i + 1 < args.len() {
                    match args[i + 1].parse::<u64>() {
                        Ok(n) => {
                            opts.tick_ceiling = n;
                            i += 2;
                        }
                        Err(_) => {
                            eprintln!("Invalid tick ceiling: {}", args[i + 1]);
                            std::process::exit(1);
                        }
                    }
                } else {
                    eprintln!("--tick-ceiling requires a tick count");
                    std::process::exit(1);
                }
            }
            "--fps" => {
                if i + 1 < args.len() {
                    match args[i + 1].parse::<u32>() {
                        Ok(n) if n > 0 => {
                            opts.fps = n;
                            i += 2;
                        }
                        _ => {
                            eprintln!("Invalid fps: {}", args[i + 1]);
                            std::process::exit(1);
                        }
                    }
                } else {
                    eprintln!("--fps requires a rate");
                    std::process::exit(1);
                }
            }
            "help" | "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            arg => {
                eprintln!("Unknown option: {arg}");
                eprintln!();
                print_usage();
                std::process::exit(1);
            }
        }
    }

    run(opts)
}
