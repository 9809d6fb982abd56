// Copyright (c) 2026 rezky_nightky

mod app;
mod cell;
mod charset;
mod config;
mod droplet;
mod engine;
mod field;
mod frame;
mod logging;
mod overlay;
mod palette;
mod panel;
mod prefs;
mod random;
mod render;
mod runtime;
mod surface;
mod terminal;
mod theme;

use std::env;
use std::time::{Duration, Instant};

#[cfg(unix)]
use std::thread;

use clap::builder::styling::{AnsiColor as ClapAnsiColor, Color as ClapColor};
use clap::builder::styling::{Effects as ClapEffects, Style as ClapStyle};
use clap::builder::Styles as ClapStyles;
use clap::{CommandFactory, FromArgMatches};
use crossterm::event::{Event, KeyEventKind};
use tracing::{info, warn};

#[cfg(unix)]
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

use crate::app::{Action, App};
use crate::charset::{build_chars, charset_from_str, GlyphPool};
use crate::config::{
    color_enabled_stdout, default_params_usage_for_help, parse_overlay_position,
    parse_overlay_size, print_list_charsets, print_list_themes, Args,
};
use crate::engine::MatrixRain;
use crate::frame::Frame;
use crate::prefs::PrefStore;
use crate::random::StdRandom;
use crate::render::Canvas;
use crate::runtime::{BackgroundMode, ColorMode};
use crate::surface::Surface;
use crate::terminal::{restore_terminal_best_effort, Terminal};
use crate::theme::theme_by_key;

const HELP_TEMPLATE_PLAIN: &str = "\
{before-help}{about-with-newline}
USAGE:
  {usage}

{all-args}{after-help}";

const HELP_TEMPLATE_COLOR: &str = "\
{before-help}{about-with-newline}
\x1b[1;36mUSAGE:\x1b[0m
  {usage}

{all-args}{after-help}";

fn build_info() -> String {
    let sha = env!("DIGIRAIN_GIT_SHA");
    if sha.is_empty() {
        env!("DIGIRAIN_BUILD").to_string()
    } else {
        format!("{} ({})", env!("DIGIRAIN_BUILD"), sha)
    }
}

fn clap_styles() -> ClapStyles {
    ClapStyles::styled()
        .header(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Cyan))),
        )
        .usage(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Green))),
        )
        .literal(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Yellow))))
        .placeholder(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Magenta))))
}

fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("{}", msg);
    std::process::exit(1);
}

fn require_f64_range(name: &str, v: f64, min: f64, max: f64) -> f64 {
    if !v.is_finite() {
        fail(format!("failed to apply {} {} (must be a finite number)", name, v));
    }
    if v < min || v > max {
        fail(format!("failed to apply {} {} (min {} max {})", name, v, min, max));
    }
    v
}

fn default_to_ascii() -> bool {
    let lang = env::var("LANG").unwrap_or_default();
    !lang.to_ascii_uppercase().contains("UTF")
}

fn detect_color_mode_auto() -> ColorMode {
    let colorterm = env::var("COLORTERM")
        .unwrap_or_default()
        .to_ascii_lowercase();
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return ColorMode::TrueColor;
    }

    let term = env::var("TERM").unwrap_or_default().to_ascii_lowercase();
    if term == "dumb" {
        return ColorMode::Mono;
    }
    if term.contains("256color") {
        return ColorMode::Color256;
    }
    if term.is_empty() || term == "linux" || term.starts_with("vt") {
        return ColorMode::Color16;
    }

    ColorMode::Color256
}

fn detect_color_mode(args: &Args) -> ColorMode {
    match args.colormode {
        None => detect_color_mode_auto(),
        Some(0) => ColorMode::Mono,
        Some(16) => ColorMode::Color16,
        Some(8) | Some(256) => ColorMode::Color256,
        Some(24) | Some(32) => ColorMode::TrueColor,
        Some(m) => fail(format!(
            "invalid --colormode: {} (allowed: 0,16,8/256,24/32)",
            m
        )),
    }
}

fn color_mode_label(m: ColorMode) -> &'static str {
    match m {
        ColorMode::TrueColor => "24-bit truecolor",
        ColorMode::Color256 => "8-bit (256-color)",
        ColorMode::Color16 => "16-color",
        ColorMode::Mono => "mono",
    }
}

fn open_store(args: &Args) -> PrefStore {
    let Some(path) = args.prefs_file.clone().or_else(PrefStore::default_path) else {
        warn!("no config directory; preferences will not be saved");
        return PrefStore::in_memory();
    };
    let store = match PrefStore::open(&path) {
        Ok(store) => store,
        Err(e) => {
            warn!(error = %e, "ignoring saved preferences");
            return PrefStore::in_memory();
        }
    };
    if args.no_save {
        return store.detach();
    }
    if let Some(p) = store.path() {
        info!(path = %p.display(), "preferences are saved on change");
    }
    store
}

/// Session-only overrides from the command line; these are not saved.
fn apply_cli_overrides(engine: &mut MatrixRain, args: &Args) {
    if let Some(key) = &args.theme {
        let key = key.trim().to_ascii_lowercase();
        if theme_by_key(&key).is_none() {
            fail(format!("invalid theme: {} (see --list-themes)", key));
        }
        engine.set_theme(&key);
    }
    if let Some(msg) = &args.message {
        engine.set_overlay_text(msg);
        engine.set_overlay_visible(true);
    }
    if let Some(size) = &args.size {
        engine.set_overlay_size(parse_overlay_size(size).unwrap_or_else(|e| fail(e)));
    }
    if let Some(position) = &args.position {
        engine.set_overlay_position(parse_overlay_position(position).unwrap_or_else(|e| fail(e)));
    }
}

fn main() -> std::io::Result<()> {
    std::panic::set_hook(Box::new(|info| {
        restore_terminal_best_effort();
        eprintln!("{}", info);
    }));

    #[cfg(unix)]
    {
        if let Ok(mut signals) = Signals::new([SIGINT, SIGTERM, SIGHUP]) {
            thread::spawn(move || {
                if let Some(sig) = signals.forever().next() {
                    restore_terminal_best_effort();
                    std::process::exit(128 + sig);
                }
            });
        }
    }

    #[cfg(windows)]
    {
        if let Err(e) = ctrlc::set_handler(|| {
            restore_terminal_best_effort();
            std::process::exit(130);
        }) {
            eprintln!("failed to install Ctrl-C handler: {}", e);
        }
    }

    let mut cmd = Args::command();
    cmd = cmd.styles(clap_styles());
    cmd = cmd.before_help(default_params_usage_for_help());
    let help_template = if color_enabled_stdout() {
        HELP_TEMPLATE_COLOR
    } else {
        HELP_TEMPLATE_PLAIN
    };
    cmd = cmd.help_template(help_template);
    cmd.build();

    if cmd.get_arguments().any(|a| a.get_id().as_str() == "help") {
        cmd = cmd.mut_arg("help", |a| a.help_heading("HELP"));
    }

    let matches = cmd.get_matches();
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    if args.list_charsets {
        print_list_charsets();
        return Ok(());
    }

    if args.list_themes {
        print_list_themes();
        return Ok(());
    }

    if args.check_bitcolor {
        let colorterm = env::var("COLORTERM").unwrap_or_default();
        let term = env::var("TERM").unwrap_or_default();
        let auto = detect_color_mode_auto();
        let effective = detect_color_mode(&args);

        println!("BITCOLOR CHECK:");
        println!(
            "  COLORTERM: {}",
            if colorterm.is_empty() {
                "(unset)"
            } else {
                &colorterm
            }
        );
        println!(
            "  TERM: {}",
            if term.is_empty() { "(unset)" } else { &term }
        );
        println!("  auto_detected: {}", color_mode_label(auto));
        if args.colormode.is_some() {
            println!("  forced: {}", color_mode_label(effective));
        }
        println!("  effective: {}", color_mode_label(effective));
        return Ok(());
    }

    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if args.info {
        println!("Version: v{}", env!("CARGO_PKG_VERSION"));
        println!("Build: {}", build_info());
        println!("Copyright: (c) 2026 {}", env!("CARGO_PKG_AUTHORS"));
        println!("License: {}", env!("CARGO_PKG_LICENSE"));
        println!("Source: {}", env!("CARGO_PKG_REPOSITORY"));
        return Ok(());
    }

    if let Err(e) = logging::init(args.log_file.as_deref()) {
        fail(format!("failed to open log file: {}", e));
    }

    let def_ascii = default_to_ascii();
    let color_mode = detect_color_mode(&args);
    let background = BackgroundMode::from(args.color_bg);
    let target_fps = require_f64_range("--fps", args.fps, 1.0, 240.0);
    let end_after = args.duration.and_then(|s| {
        if !s.is_finite() {
            fail(format!(
                "failed to apply --duration {} (must be a finite number)",
                s
            ));
        }
        (s > 0.0).then(|| require_f64_range("--duration", s, 0.1, 86400.0))
    });

    let charset = charset_from_str(&args.charset, def_ascii).unwrap_or_else(|e| fail(e));
    let chars = build_chars(charset);

    let mut rng = match args.seed {
        Some(seed) => StdRandom::seeded(seed),
        None => StdRandom::from_os(),
    };
    let glyphs = GlyphPool::new(chars, &mut rng);
    let engine = MatrixRain::new(glyphs, Box::new(rng));

    let store = open_store(&args);
    let mut app = App::new(engine, store, def_ascii);
    apply_cli_overrides(app.engine_mut(), &args);

    info!(
        theme = app.engine().current_theme().key,
        color_mode = color_mode_label(color_mode),
        fps = target_fps,
        "starting"
    );

    let mut term = Terminal::new()?;
    let (cols, lines) = term.size()?;
    let mut surface = Surface::new(cols, lines);
    let mut frame = Frame::new(cols, lines, None);
    let (w, h) = surface.size();
    app.engine_mut().resize(w, h);

    let start_time = Instant::now();
    let end_time = end_after.map(|s| start_time + Duration::from_secs_f64(s));
    let target_period = Duration::from_secs_f64(1.0 / target_fps);
    let mut next_frame = Instant::now();
    let mut running = true;

    while running {
        if end_time.is_some_and(|end| Instant::now() >= end) {
            break;
        }
        let mut pending_resize: Option<(u16, u16)> = None;

        loop {
            while Terminal::poll_event(Duration::from_millis(0))? {
                match Terminal::read_event()? {
                    Event::Resize(nw, nh) => pending_resize = Some((nw, nh)),
                    Event::Key(k) if k.kind == KeyEventKind::Press => {
                        if args.screensaver || app.handle_key(k) == Action::Quit {
                            running = false;
                            break;
                        }
                    }
                    Event::Mouse(m) => {
                        app.handle_mouse(m, frame.width, frame.height, Instant::now());
                    }
                    _ => {}
                }
            }

            if !running || pending_resize.is_some() {
                break;
            }

            let now = Instant::now();
            if now >= next_frame {
                break;
            }

            let mut timeout = next_frame - now;
            if let Some(end) = end_time {
                if now >= end {
                    break;
                }
                timeout = timeout.min(end - now);
            }
            let _ = Terminal::poll_event(timeout)?;
        }

        if !running {
            break;
        }

        if let Some((nw, nh)) = pending_resize {
            surface = Surface::new(nw, nh);
            frame = Frame::new(nw, nh, None);
            let (w, h) = surface.size();
            app.engine_mut().resize(w, h);
        }

        let now_ms = start_time.elapsed().as_secs_f64() * 1000.0;
        app.engine_mut().advance_and_render(now_ms, &mut surface);
        surface.present(&mut frame, color_mode, background);
        let bg = surface.background_color(color_mode, background);
        app.draw_ui(&mut frame, color_mode, surface.paper(), bg);
        term.draw(&mut frame)?;

        next_frame += target_period;
        let now = Instant::now();
        if now > next_frame {
            next_frame = now;
        }
    }

    drop(term);
    info!(
        elapsed_s = start_time.elapsed().as_secs_f64(),
        "stopped"
    );
    Ok(())
}
