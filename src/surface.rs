// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::cell::Cell;
use crate::field::CELL_SIZE;
use crate::frame::Frame;
use crate::palette::{blend, quantize, to_rgb8};
use crate::render::Canvas;
use crate::runtime::{BackgroundMode, ColorMode};
use crate::theme::Rgba;

/// Minimum per-channel distance from the background for a glyph to stay visible.
const VISIBLE_DELTA: f32 = 8.0;

/// Terminal-backed canvas. Each terminal cell holds one glyph and the color its
/// pixels have accumulated, so repeated translucent fills fade old trails out.
pub struct Surface {
    cols: u16,
    lines: u16,
    paper: [f32; 3],
    ink: Vec<[f32; 3]>,
    glyphs: Vec<char>,
    bold: Vec<bool>,
}

impl Surface {
    pub fn new(cols: u16, lines: u16) -> Self {
        let len = cols as usize * lines as usize;
        Self {
            cols,
            lines,
            paper: [0.0; 3],
            ink: vec![[0.0; 3]; len],
            glyphs: vec![' '; len],
            bold: vec![false; len],
        }
    }

    /// Current background color beneath the glyphs.
    pub fn paper(&self) -> [u8; 3] {
        to_rgb8(self.paper)
    }

    fn cell_index(&self, x: f32, y: f32) -> Option<usize> {
        if !(x >= 0.0 && y >= 0.0) {
            return None;
        }
        let cx = (x / CELL_SIZE).floor() as usize;
        let cy = (y / CELL_SIZE).floor() as usize;
        if cx >= self.cols as usize || cy >= self.lines as usize {
            return None;
        }
        Some(cy * self.cols as usize + cx)
    }

    fn is_visible(&self, i: usize) -> bool {
        if self.glyphs[i] == ' ' {
            return false;
        }
        let ink = self.ink[i];
        (0..3).any(|c| (ink[c] - self.paper[c]).abs() >= VISIBLE_DELTA)
    }

    /// Glyph and color of the cell at `(col, line)`, if it is still visible.
    #[cfg(test)]
    pub fn visible_glyph(&self, col: u16, line: u16) -> Option<(char, [u8; 3])> {
        if col >= self.cols || line >= self.lines {
            return None;
        }
        let i = line as usize * self.cols as usize + col as usize;
        self.is_visible(i)
            .then(|| (self.glyphs[i], to_rgb8(self.ink[i])))
    }

    pub fn background_color(&self, mode: ColorMode, background: BackgroundMode) -> Option<Color> {
        match background {
            BackgroundMode::Theme => quantize(self.paper(), mode),
            BackgroundMode::Black if mode != ColorMode::Mono => Some(Color::Black),
            BackgroundMode::Black | BackgroundMode::Terminal => None,
        }
    }

    /// Quantizes the surface into `frame` for the given terminal capabilities.
    pub fn present(&self, frame: &mut Frame, mode: ColorMode, background: BackgroundMode) {
        let bg = self.background_color(mode, background);
        for line in 0..self.lines.min(frame.height) {
            for col in 0..self.cols.min(frame.width) {
                let i = line as usize * self.cols as usize + col as usize;
                let cell = if self.is_visible(i) {
                    let fg = quantize(to_rgb8(self.ink[i]), mode);
                    Cell::glyph(self.glyphs[i], fg, bg).with_bold(self.bold[i])
                } else {
                    Cell::blank(bg)
                };
                frame.set(col, line, cell);
            }
        }
    }
}

impl Canvas for Surface {
    fn size(&self) -> (f32, f32) {
        (
            self.cols as f32 * CELL_SIZE,
            self.lines as f32 * CELL_SIZE,
        )
    }

    fn fill(&mut self, color: Rgba) {
        let rgb = color.rgb();
        self.paper = blend(self.paper, rgb, color.a);
        for ink in &mut self.ink {
            *ink = blend(*ink, rgb, color.a);
        }
        self.bold.fill(false);
    }

    fn draw_glyph(&mut self, ch: char, x: f32, y: f32, color: Rgba) {
        if color.a <= 0.0 {
            return;
        }
        let Some(i) = self.cell_index(x, y) else {
            return;
        };
        let under = if self.glyphs[i] == ch {
            self.ink[i]
        } else {
            self.paper
        };
        self.glyphs[i] = ch;
        self.ink[i] = blend(under, color.rgb(), color.a);
        self.bold[i] = color.a >= 1.0;
    }
}
