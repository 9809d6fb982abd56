// Copyright (c) 2026 rezky_nightky

use crate::field::RainField;
use crate::theme::{hsl_to_rgb, Rgba, Theme};

/// A drawable 2D surface measured in the same units as the field.
pub trait Canvas {
    fn size(&self) -> (f32, f32);

    /// Paints `color` over the whole surface, honoring its alpha.
    fn fill(&mut self, color: Rgba);

    /// Draws `ch` in the glyph cell containing `(x, y)`.
    fn draw_glyph(&mut self, ch: char, x: f32, y: f32, color: Rgba);
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GlyphColor {
    Rgba { r: u8, g: u8, b: u8, a: f32 },
    /// Hue in degrees; saturation and lightness in percent.
    Hsla { h: f32, s: f32, l: f32, a: f32 },
}

impl GlyphColor {
    #[cfg(test)]
    pub fn alpha(&self) -> f32 {
        match *self {
            GlyphColor::Rgba { a, .. } | GlyphColor::Hsla { a, .. } => a,
        }
    }

    pub fn to_rgba(self) -> Rgba {
        match self {
            GlyphColor::Rgba { r, g, b, a } => Rgba::new(r, g, b, a),
            GlyphColor::Hsla { h, s, l, a } => {
                let [r, g, b] = hsl_to_rgb(h, s / 100.0, l / 100.0);
                Rgba::new(r, g, b, a)
            }
        }
    }
}

pub fn opacity_for(index: usize, age: f32) -> f32 {
    if index == 0 {
        return 1.0;
    }
    (1.0 - index as f32 / 20.0 - age / 100.0).max(0.0)
}

/// Color of the cell `index` places behind the head.
pub fn color_for(index: usize, age: f32, hue: f32, theme: &Theme) -> GlyphColor {
    let a = opacity_for(index, age);
    let head = index == 0;
    let j = index as f32;

    if theme.rainbow {
        return GlyphColor::Hsla {
            h: (hue + j * 8.0).rem_euclid(360.0),
            s: if head { 100.0 } else { (100.0 - j * 3.0).max(60.0) },
            l: if head { 70.0 } else { (60.0 - j * 2.0).max(20.0) },
            a,
        };
    }

    let base = if head { theme.lead } else { theme.trail };
    let brightness = 1.0 - index as f64 / 15.0;
    let scale = |c: u8| (c as f64 * brightness).floor().clamp(0.0, 255.0) as u8;
    GlyphColor::Rgba {
        r: scale(base[0]),
        g: scale(base[1]),
        b: scale(base[2]),
        a,
    }
}

/// Paints one frame. Holds no state between frames.
pub fn render(field: &RainField, theme: &Theme, canvas: &mut dyn Canvas) {
    canvas.fill(theme.background);

    let (_, h) = canvas.size();
    let cell = field.cell_size();

    for (i, drop) in field.drops().iter().enumerate() {
        if drop.y <= -cell || drop.y >= h + cell {
            continue;
        }
        let x = i as f32 * cell;
        for (j, c) in drop.chars.iter().enumerate() {
            let cy = drop.cell_y(j, cell);
            if cy <= -cell || cy >= h {
                continue;
            }
            let hue = if theme.rainbow {
                (drop.base_hue + c.age).rem_euclid(360.0)
            } else {
                0.0
            };
            let color = color_for(j, c.age, hue, theme).to_rgba();
            canvas.draw_glyph(c.value, x, cy, color);
        }
    }
}
