// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::runtime::ColorMode;

fn dist2(a: [u8; 3], b: [u8; 3]) -> i32 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let d = x as i32 - y as i32;
            d * d
        })
        .sum()
}

/// Nearest xterm-256 index, choosing between the 6x6x6 cube and the gray ramp.
pub fn rgb_to_ansi256(rgb: [u8; 3]) -> u8 {
    const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

    let level = |c: u8| ((c as u16 * 5 + 127) / 255) as u8;
    let [r6, g6, b6] = rgb.map(level);
    let cube = [
        CUBE_LEVELS[r6 as usize],
        CUBE_LEVELS[g6 as usize],
        CUBE_LEVELS[b6 as usize],
    ];
    let cube_idx = 16 + 36 * r6 + 6 * g6 + b6;

    let avg = ((rgb[0] as u16 + rgb[1] as u16 + rgb[2] as u16) / 3) as u8;
    let (gray_idx, gray) = match avg {
        0..=7 => (16, [0, 0, 0]),
        239..=255 => (231, [255, 255, 255]),
        _ => {
            let step = (avg - 8) / 10;
            let v = 8 + 10 * step;
            (232 + step, [v, v, v])
        }
    };

    if dist2(rgb, gray) < dist2(rgb, cube) {
        gray_idx
    } else {
        cube_idx
    }
}

pub fn rgb_to_color16(rgb: [u8; 3]) -> Color {
    const TABLE: [(Color, [u8; 3]); 16] = [
        (Color::Black, [0, 0, 0]),
        (Color::DarkGrey, [128, 128, 128]),
        (Color::Grey, [192, 192, 192]),
        (Color::White, [255, 255, 255]),
        (Color::DarkRed, [128, 0, 0]),
        (Color::Red, [255, 0, 0]),
        (Color::DarkGreen, [0, 128, 0]),
        (Color::Green, [0, 255, 0]),
        (Color::DarkBlue, [0, 0, 128]),
        (Color::Blue, [0, 0, 255]),
        (Color::DarkCyan, [0, 128, 128]),
        (Color::Cyan, [0, 255, 255]),
        (Color::DarkMagenta, [128, 0, 128]),
        (Color::Magenta, [255, 0, 255]),
        (Color::DarkYellow, [128, 128, 0]),
        (Color::Yellow, [255, 255, 0]),
    ];

    TABLE
        .iter()
        .min_by_key(|(_, c)| dist2(rgb, *c))
        .map(|(c, _)| *c)
        .unwrap_or(Color::White)
}

/// Terminal color for `rgb` under `mode`; `None` leaves the default color.
pub fn quantize(rgb: [u8; 3], mode: ColorMode) -> Option<Color> {
    match mode {
        ColorMode::Mono => None,
        ColorMode::Color16 => Some(rgb_to_color16(rgb)),
        ColorMode::Color256 => Some(Color::AnsiValue(rgb_to_ansi256(rgb))),
        ColorMode::TrueColor => Some(Color::Rgb {
            r: rgb[0],
            g: rgb[1],
            b: rgb[2],
        }),
    }
}

/// Straight-alpha blend of `top` over `bottom`.
pub fn blend(bottom: [f32; 3], top: [u8; 3], alpha: f32) -> [f32; 3] {
    let a = alpha.clamp(0.0, 1.0);
    [
        bottom[0] + (top[0] as f32 - bottom[0]) * a,
        bottom[1] + (top[1] as f32 - bottom[1]) * a,
        bottom[2] + (top[2] as f32 - bottom[2]) * a,
    ]
}

pub fn to_rgb8(c: [f32; 3]) -> [u8; 3] {
    c.map(|v| v.round().clamp(0.0, 255.0) as u8)
}
