// Copyright (c) 2026 rezky_nightky

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::Parser;

use crate::runtime::{BackgroundMode, OverlayPosition, OverlaySize};
use crate::theme::THEMES;

pub const DEFAULT_PARAMS_USAGE: &str = "DEFAULT PARAMS USAGE:\n  digirain --theme classic --charset auto --fps 60 --color-bg theme --size medium --position center";

pub fn color_enabled_stdout() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if matches!(std::env::var("CLICOLOR").ok().as_deref(), Some("0")) {
        return false;
    }
    std::io::stdout().is_terminal()
}

fn colorize_usage(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 32);
    for (i, line) in text.lines().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        if let Some(rest) = line.strip_prefix("  digirain") {
            out.push_str("  \x1b[1;34mdigirain\x1b[0m");
            out.push_str(rest);
        } else if line.ends_with(':') && line == line.to_ascii_uppercase() {
            out.push_str("\x1b[1;36m");
            out.push_str(line);
            out.push_str("\x1b[0m");
        } else {
            out.push_str(line);
        }
    }
    out
}

pub fn default_params_usage_for_help() -> String {
    if color_enabled_stdout() {
        colorize_usage(DEFAULT_PARAMS_USAGE)
    } else {
        DEFAULT_PARAMS_USAGE.to_string()
    }
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorBg {
    #[value(name = "theme")]
    Theme,
    #[value(name = "black")]
    Black,
    #[value(name = "default-background")]
    DefaultBackground,
}

impl From<ColorBg> for BackgroundMode {
    fn from(bg: ColorBg) -> Self {
        match bg {
            ColorBg::Theme => BackgroundMode::Theme,
            ColorBg::Black => BackgroundMode::Black,
            ColorBg::DefaultBackground => BackgroundMode::Terminal,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "digirain", version, disable_version_flag = true)]
pub struct Args {
    #[arg(
        short = 'c',
        long = "theme",
        help_heading = "APPEARANCE",
        help = "Theme for this session (see --list-themes); overrides the saved one"
    )]
    pub theme: Option<String>,

    #[arg(
        long = "color-bg",
        default_value_t = ColorBg::Theme,
        value_enum,
        help_heading = "APPEARANCE",
        help = "Background mode (theme, black, default-background)"
    )]
    pub color_bg: ColorBg,

    #[arg(
        long = "colormode",
        help_heading = "APPEARANCE",
        help = "Force color mode (allowed: 0,16,8/256,24/32). Default: 24-bit if supported (COLORTERM), else 8-bit"
    )]
    pub colormode: Option<u16>,

    #[arg(
        short = 'm',
        long = "message",
        help_heading = "OVERLAY",
        help = "Show this overlay text for this session (max 50 chars)"
    )]
    pub message: Option<String>,

    #[arg(
        long = "size",
        help_heading = "OVERLAY",
        help = "Overlay size: small, medium, large, xlarge"
    )]
    pub size: Option<String>,

    #[arg(
        long = "position",
        help_heading = "OVERLAY",
        help = "Overlay position: top, center, bottom"
    )]
    pub position: Option<String>,

    #[arg(
        short = 'f',
        long = "fps",
        default_value_t = 60.0,
        help_heading = "PERFORMANCE",
        help = "Target FPS (min 1 max 240); the rain itself steps at most 60 times per second"
    )]
    pub fps: f64,

    #[arg(
        long = "charset",
        default_value = "auto",
        help_heading = "CHARSET",
        help = "Charset preset (see --list-charsets)"
    )]
    pub charset: String,

    #[arg(
        long = "seed",
        help_heading = "GENERAL",
        help = "Seed the random source for a reproducible run"
    )]
    pub seed: Option<u64>,

    #[arg(
        long = "duration",
        help_heading = "GENERAL",
        help = "Stop after N seconds (min 0.1 max 86400; <=0 disables)"
    )]
    pub duration: Option<f64>,

    #[arg(
        short = 's',
        long = "screensaver",
        help_heading = "GENERAL",
        help = "Screensaver mode (exit on keypress)"
    )]
    pub screensaver: bool,

    #[arg(
        long = "prefs-file",
        help_heading = "STORAGE",
        help = "Preferences file (default: <config dir>/digirain/prefs.json)"
    )]
    pub prefs_file: Option<PathBuf>,

    #[arg(
        long = "no-save",
        help_heading = "STORAGE",
        help = "Keep preference changes in memory only"
    )]
    pub no_save: bool,

    #[arg(
        long = "log-file",
        help_heading = "STORAGE",
        help = "Write diagnostics to this file (filter with RUST_LOG)"
    )]
    pub log_file: Option<PathBuf>,

    #[arg(
        long = "check-bitcolor",
        help_heading = "HELP",
        help = "Print detected terminal color capability and exit"
    )]
    pub check_bitcolor: bool,

    #[arg(
        long = "list-charsets",
        help_heading = "HELP",
        help = "List available charset presets and exit"
    )]
    pub list_charsets: bool,

    #[arg(
        long = "list-themes",
        help_heading = "HELP",
        help = "List available themes and exit"
    )]
    pub list_themes: bool,

    #[arg(
        long = "info",
        short = 'i',
        help_heading = "HELP",
        help = "Print version info and exit"
    )]
    pub info: bool,

    #[arg(
        long = "version",
        short = 'v',
        help_heading = "HELP",
        help = "Print version and exit"
    )]
    pub version: bool,
}

pub fn parse_overlay_size(s: &str) -> Result<OverlaySize, String> {
    OverlaySize::from_key(&s.trim().to_ascii_lowercase())
        .ok_or_else(|| format!("invalid size: {} (allowed: small, medium, large, xlarge)", s))
}

pub fn parse_overlay_position(s: &str) -> Result<OverlayPosition, String> {
    OverlayPosition::from_key(&s.trim().to_ascii_lowercase())
        .ok_or_else(|| format!("invalid position: {} (allowed: top, center, bottom)", s))
}

fn print_heading(title: &str, value_flag: &str) {
    if color_enabled_stdout() {
        println!("\x1b[1;36m{}\x1b[0m", title);
        println!(
            "\x1b[2mNOTE: Use only the VALUE (left side) with {}.\x1b[0m",
            value_flag
        );
    } else {
        println!("{}", title);
        println!("NOTE: Use only the VALUE (left side) with {}.", value_flag);
    }
    println!();
}

pub fn print_list_charsets() {
    print_heading("AVAILABLE CHARSET PRESETS:", "--charset");
    println!("VALUE        DESCRIPTION");
    println!("auto         Auto-select (ascii when non-UTF, otherwise classic)");
    println!("classic      Katakana + uppercase + digits + punctuation (alias: matrix)");
    println!("ascii        Letters + digits + punctuation");
    println!("katakana     Half-width katakana");
    println!("binary       0 and 1 (aliases: bin, 01)");
    println!("hex          0-9 and A-F (alias: hexadecimal)");
    println!("digits       Digits only (aliases: dec, decimal)");
}

pub fn print_list_themes() {
    print_heading("AVAILABLE THEMES:", "--theme");
    println!("VALUE        DESCRIPTION");
    for (i, t) in THEMES.iter().enumerate() {
        println!("{:<12} {} (key {})", t.key, t.name, i + 1);
    }
}
