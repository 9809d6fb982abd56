// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::cell::Cell;
use crate::frame::Frame;
use crate::palette::{blend, quantize, to_rgb8};
use crate::runtime::{ColorMode, OverlayPosition, OverlaySize};
use crate::theme::Theme;

pub const MAX_OVERLAY_CHARS: usize = 50;
const OVERLAY_OPACITY: f32 = 0.9;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct BoxStyle {
    spacing: u16,
    pad_x: u16,
    pad_y: u16,
    border: u16,
}

fn box_style(size: OverlaySize) -> BoxStyle {
    match size {
        OverlaySize::Small => BoxStyle {
            spacing: 0,
            pad_x: 1,
            pad_y: 0,
            border: 0,
        },
        OverlaySize::Medium => BoxStyle {
            spacing: 0,
            pad_x: 2,
            pad_y: 1,
            border: 1,
        },
        OverlaySize::Large => BoxStyle {
            spacing: 1,
            pad_x: 3,
            pad_y: 1,
            border: 1,
        },
        OverlaySize::XLarge => BoxStyle {
            spacing: 2,
            pad_x: 4,
            pad_y: 2,
            border: 1,
        },
    }
}

/// Text shown over the rain, independent of the animation itself.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Overlay {
    text: String,
    visible: bool,
    size: OverlaySize,
    position: OverlayPosition,
}

/// Placement of the overlay box in terminal cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OverlayLayout {
    pub col: u16,
    pub line: u16,
    pub width: u16,
    pub height: u16,
    /// Box cells in row-major order; spaces are padding.
    pub cells: Vec<(u16, u16, char)>,
}

impl Overlay {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn size(&self) -> OverlaySize {
        self.size
    }

    pub fn position(&self) -> OverlayPosition {
        self.position
    }

    /// Stores at most 50 characters; control characters are dropped.
    pub fn set_text(&mut self, text: &str) {
        self.text = text
            .chars()
            .filter(|c| !c.is_control())
            .take(MAX_OVERLAY_CHARS)
            .collect();
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn set_size(&mut self, size: OverlaySize) {
        self.size = size;
    }

    pub fn set_position(&mut self, position: OverlayPosition) {
        self.position = position;
    }

    pub fn is_shown(&self) -> bool {
        self.visible && !self.text.is_empty()
    }

    pub fn layout(&self, cols: u16, lines: u16) -> Option<OverlayLayout> {
        if !self.is_shown() {
            return None;
        }
        let style = box_style(self.size);
        let frame_x = 2 * (style.border + style.pad_x);
        let frame_y = 2 * (style.border + style.pad_y);
        let max_w = cols.checked_sub(frame_x).filter(|w| *w > 0)? as usize;
        let max_h = lines.checked_sub(frame_y).filter(|h| *h > 0)? as usize;

        let text: Vec<char> = self.text.chars().collect();
        let spaced_len = |spacing: usize| text.len() + text.len().saturating_sub(1) * spacing;
        let spacing = if spaced_len(style.spacing as usize) <= max_w {
            style.spacing as usize
        } else {
            0
        };
        let mut spaced = Vec::with_capacity(spaced_len(spacing));
        for (k, &ch) in text.iter().enumerate() {
            if k > 0 {
                spaced.extend(std::iter::repeat(' ').take(spacing));
            }
            spaced.push(ch);
        }

        let rows: Vec<&[char]> = spaced.chunks(max_w).take(max_h).collect();
        let content_w = rows.iter().map(|r| r.len()).max().unwrap_or(0) as u16;
        let content_h = rows.len() as u16;
        let width = content_w + frame_x;
        let height = content_h + frame_y;

        let col = (cols - width) / 2;
        let line = match self.position {
            OverlayPosition::Top => 1,
            OverlayPosition::Center => (lines - height) / 2,
            OverlayPosition::Bottom => lines.saturating_sub(height + 1),
        }
        .min(lines - height);

        let b = style.border;
        let mut cells = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                let edge_y = b == 1 && (y == 0 || y + 1 == height);
                let edge_x = b == 1 && (x == 0 || x + 1 == width);
                let mut ch = match (edge_y, edge_x) {
                    (true, true) => '+',
                    (true, false) => '-',
                    (false, true) => '|',
                    (false, false) => ' ',
                };
                let (cy, cx) = (b + style.pad_y, b + style.pad_x);
                if y >= cy && x >= cx {
                    if let Some(row) = rows.get((y - cy) as usize) {
                        let left = (content_w as usize - row.len()) / 2;
                        let ix = (x - cx) as usize;
                        if ix >= left && ix < left + row.len() {
                            ch = row[ix - left];
                        }
                    }
                }
                cells.push((col + x, line + y, ch));
            }
        }

        Some(OverlayLayout {
            col,
            line,
            width,
            height,
            cells,
        })
    }

    /// Paints the overlay on top of an already presented frame.
    pub fn draw(
        &self,
        frame: &mut Frame,
        theme: &Theme,
        mode: ColorMode,
        paper: [u8; 3],
        bg: Option<Color>,
    ) {
        let Some(layout) = self.layout(frame.width, frame.height) else {
            return;
        };
        let base = paper.map(f32::from);
        let fg = quantize(to_rgb8(blend(base, theme.lead, OVERLAY_OPACITY)), mode);
        for (x, y, ch) in layout.cells {
            let cell = if ch == ' ' {
                Cell::blank(bg)
            } else {
                Cell::glyph(ch, fg, bg).with_bold(true)
            };
            frame.set(x, y, cell);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::theme_by_key;

    fn shown(text: &str, size: OverlaySize, position: OverlayPosition) -> Overlay {
        let mut o = Overlay::default();
        o.set_text(text);
        o.set_visible(true);
        o.set_size(size);
        o.set_position(position);
        o
    }

    fn row_text(layout: &OverlayLayout, line: u16) -> String {
        layout
            .cells
            .iter()
            .filter(|c| c.1 == line)
            .map(|c| c.2)
            .collect()
    }

    #[test]
    fn text_is_capped_at_fifty_chars() {
        let mut o = Overlay::default();
        o.set_text(&"x".repeat(80));
        assert_eq!(o.text().chars().count(), MAX_OVERLAY_CHARS);
        o.set_text("a\nb");
        assert_eq!(o.text(), "ab");
    }

    #[test]
    fn hidden_or_empty_overlay_has_no_layout() {
        let mut o = Overlay::default();
        o.set_text("hello");
        assert!(o.layout(80, 24).is_none());
        o.set_visible(true);
        assert!(o.layout(80, 24).is_some());
        o.set_text("");
        assert!(!o.is_shown());
        assert!(o.layout(80, 24).is_none());
    }

    #[test]
    fn medium_box_is_centered_with_border() {
        let o = shown("HELLO", OverlaySize::Medium, OverlayPosition::Center);
        let l = o.layout(81, 25).unwrap();
        assert_eq!((l.width, l.height), (11, 5));
        assert_eq!((l.col, l.line), (35, 10));
        assert_eq!(row_text(&l, 10), "+---------+");
        assert_eq!(row_text(&l, 12), "|  HELLO  |");
    }

    #[test]
    fn sizes_change_spacing_and_border() {
        let small = shown("AB", OverlaySize::Small, OverlayPosition::Top);
        let l = small.layout(40, 10).unwrap();
        assert_eq!((l.width, l.height, l.line), (4, 1, 1));
        assert_eq!(row_text(&l, 1), " AB ");

        let xl = shown("AB", OverlaySize::XLarge, OverlayPosition::Bottom);
        let l = xl.layout(40, 20).unwrap();
        assert_eq!((l.width, l.height), (14, 7));
        assert_eq!(l.line, 20 - 7 - 1);
        assert_eq!(row_text(&l, l.line + 3), "|    A  B    |");
    }

    #[test]
    fn narrow_screens_drop_spacing_then_wrap() {
        let o = shown("ABCDEFGH", OverlaySize::Large, OverlayPosition::Center);
        let l = o.layout(12, 10).unwrap();
        assert_eq!(l.width, 12);
        assert_eq!(l.height, 6);
        assert!(o.layout(4, 10).is_none());
    }

    #[test]
    fn draw_uses_theme_lead_color() {
        let o = shown("Z", OverlaySize::Small, OverlayPosition::Top);
        let theme = theme_by_key("amber").unwrap();
        let mut frame = Frame::new(10, 4, None);
        o.draw(&mut frame, theme, ColorMode::TrueColor, [0, 0, 0], None);
        let cell = frame.get(4, 1).unwrap();
        assert_eq!(cell.ch, 'Z');
        assert_eq!(cell.fg, Some(Color::Rgb { r: 230, g: 162, b: 0 }));
    }
}
