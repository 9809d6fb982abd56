// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::cell::Cell;
use crate::frame::Frame;
use crate::overlay::Overlay;
use crate::palette::quantize;
use crate::prefs::PanelPosition;
use crate::runtime::ColorMode;
use crate::theme::{Theme, THEMES};

pub const PANEL_WIDTH: u16 = 34;

const ROW_HEADER: u16 = 1;
const ROW_THEME_HEADING: u16 = 3;
const ROW_FIRST_THEME: u16 = 4;
const ROW_OVERLAY_HEADING: u16 = ROW_FIRST_THEME + THEMES.len() as u16;
const ROW_OVERLAY_TEXT: u16 = ROW_OVERLAY_HEADING + 1;
const ROW_OVERLAY_VISIBLE: u16 = ROW_OVERLAY_HEADING + 2;
const ROW_OVERLAY_SIZE: u16 = ROW_OVERLAY_HEADING + 3;
const ROW_OVERLAY_POSITION: u16 = ROW_OVERLAY_HEADING + 4;
const EXPANDED_HEIGHT: u16 = ROW_OVERLAY_POSITION + 2;
const COLLAPSED_HEIGHT: u16 = 3;

const TEXT_GRAY: [u8; 3] = [200, 200, 200];

/// What a click inside the panel landed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hit {
    Header,
    Toggle,
    Theme(usize),
    OverlayText,
    OverlayVisible,
    OverlaySize,
    OverlayPosition,
    Body,
}

/// Everything the panel displays besides its own state.
pub struct PanelView<'a> {
    pub theme: &'a Theme,
    pub overlay: &'a Overlay,
    /// Overlay text being typed, when the text field has focus.
    pub editing: Option<&'a str>,
    pub mode: ColorMode,
}

#[derive(Clone, Debug)]
pub struct Panel {
    collapsed: bool,
    position: PanelPosition,
    ascii: bool,
    grab: Option<(u16, u16)>,
}

impl Panel {
    pub fn new(collapsed: bool, position: PanelPosition, ascii: bool) -> Self {
        Self {
            collapsed,
            position,
            ascii,
            grab: None,
        }
    }

    #[cfg(test)]
    pub fn collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn toggle_collapsed(&mut self) -> bool {
        self.collapsed = !self.collapsed;
        self.collapsed
    }

    #[cfg(test)]
    pub fn position(&self) -> PanelPosition {
        self.position
    }

    pub fn height(&self) -> u16 {
        if self.collapsed {
            COLLAPSED_HEIGHT
        } else {
            EXPANDED_HEIGHT
        }
    }

    /// Screen rectangle `(col, line, width, height)` for a `cols` x `lines` terminal.
    pub fn rect(&self, cols: u16, lines: u16) -> (u16, u16, u16, u16) {
        let w = PANEL_WIDTH.min(cols);
        let h = self.height().min(lines);
        let (x, y) = self.position.resolve(w, h, cols, lines);
        (x, y, w, h)
    }

    pub fn hit(&self, col: u16, line: u16, cols: u16, lines: u16) -> Option<Hit> {
        let (x, y, w, h) = self.rect(cols, lines);
        if col < x || line < y || col >= x + w || line >= y + h {
            return None;
        }
        let (rx, ry) = (col - x, line - y);
        let toggle_at = w.saturating_sub(5);
        Some(match ry {
            ROW_HEADER if rx >= toggle_at && rx < toggle_at + 3 => Hit::Toggle,
            ROW_HEADER => Hit::Header,
            _ if self.collapsed => Hit::Body,
            r if (ROW_FIRST_THEME..ROW_OVERLAY_HEADING).contains(&r) => {
                Hit::Theme((r - ROW_FIRST_THEME) as usize)
            }
            ROW_OVERLAY_TEXT => Hit::OverlayText,
            ROW_OVERLAY_VISIBLE => Hit::OverlayVisible,
            ROW_OVERLAY_SIZE => Hit::OverlaySize,
            ROW_OVERLAY_POSITION => Hit::OverlayPosition,
            _ => Hit::Body,
        })
    }

    #[cfg(test)]
    pub fn is_dragging(&self) -> bool {
        self.grab.is_some()
    }

    pub fn begin_drag(&mut self, col: u16, line: u16, cols: u16, lines: u16) {
        let (x, y, _, _) = self.rect(cols, lines);
        self.grab = Some((col.saturating_sub(x), line.saturating_sub(y)));
    }

    pub fn drag_to(&mut self, col: u16, line: u16, cols: u16, lines: u16) {
        let Some((gx, gy)) = self.grab else {
            return;
        };
        let (_, _, w, h) = self.rect(cols, lines);
        let x = col.saturating_sub(gx).min(cols.saturating_sub(w));
        let y = line.saturating_sub(gy).min(lines.saturating_sub(h));
        self.position = PanelPosition::at(x, y);
    }

    /// Ends a drag, returning the position to remember.
    pub fn end_drag(&mut self) -> Option<PanelPosition> {
        self.grab.take().map(|_| self.position)
    }

    pub fn draw(&self, frame: &mut Frame, view: &PanelView<'_>) {
        let (x0, y0, w, h) = self.rect(frame.width, frame.height);
        if w < 12 || h < COLLAPSED_HEIGHT {
            return;
        }
        let color = |rgb: [u8; 3]| quantize(rgb, view.mode);
        let bg = color([0, 0, 0]);
        let accent = color(view.theme.lead);
        let text = color(TEXT_GRAY);

        for ry in 0..h {
            for rx in 0..w {
                let edge_y = ry == 0 || ry + 1 == h || (ry == 2 && !self.collapsed);
                let edge_x = rx == 0 || rx + 1 == w;
                let ch = match (edge_y, edge_x) {
                    (true, true) => '+',
                    (true, false) => '-',
                    (false, true) => '|',
                    (false, false) => ' ',
                };
                let fg = if ch == ' ' { None } else { accent };
                frame.set(x0 + rx, y0 + ry, Cell::glyph(ch, fg, bg));
            }
        }

        let inner = (w - 2) as usize;
        let mut put = |ry: u16, s: &str, fg: Option<Color>, bold: bool| {
            if ry + 1 >= h {
                return;
            }
            let clipped: String = s.chars().take(inner).collect();
            frame.put_str(x0 + 1, y0 + ry, &clipped, fg, bg, bold);
        };

        let (grip, toggle) = match (self.ascii, self.collapsed) {
            (true, true) => ('=', "[+]"),
            (true, false) => ('=', "[-]"),
            (false, true) => ('≡', "[+]"),
            (false, false) => ('≡', "[−]"),
        };
        let header = format!("{} Matrix Settings", grip);
        let gap = inner.saturating_sub(header.chars().count() + 4);
        put(
            ROW_HEADER,
            &format!("{}{}{} ", header, " ".repeat(gap), toggle),
            accent,
            true,
        );

        if self.collapsed {
            return;
        }

        put(ROW_THEME_HEADING, " Theme", text, true);
        let marker = if self.ascii { '*' } else { '●' };
        for (i, t) in THEMES.iter().enumerate() {
            let active = t.key == view.theme.key;
            let line = format!(" {} {} {}", i + 1, if active { marker } else { ' ' }, t.name);
            put(ROW_FIRST_THEME + i as u16, &line, color(t.lead), active);
        }

        put(ROW_OVERLAY_HEADING, " Text Overlay", text, true);
        let label = " [e] Text: ";
        let room = inner.saturating_sub(label.chars().count() + 1);
        let field = match view.editing {
            Some(buf) => format!("{}{}_", label, tail_chars(buf, room.saturating_sub(1))),
            None if view.overlay.text().is_empty() => format!("{}(empty)", label),
            None => format!("{}{}", label, tail_chars(view.overlay.text(), room)),
        };
        let editing = view.editing.is_some();
        put(
            ROW_OVERLAY_TEXT,
            &field,
            if editing { accent } else { text },
            editing,
        );

        let shown = view.overlay.visible();
        put(
            ROW_OVERLAY_VISIBLE,
            if shown {
                " [t] Hide Text"
            } else {
                " [t] Show Text"
            },
            if shown { accent } else { text },
            shown,
        );
        put(
            ROW_OVERLAY_SIZE,
            &format!(" [s] Size: {}", view.overlay.size().label()),
            text,
            false,
        );
        put(
            ROW_OVERLAY_POSITION,
            &format!(" [p] Position: {}", view.overlay.position().label()),
            text,
            false,
        );
    }
}

fn tail_chars(s: &str, n: usize) -> String {
    let count = s.chars().count();
    s.chars().skip(count.saturating_sub(n)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::theme_by_key;

    fn row(frame: &Frame, y: u16) -> String {
        frame.row(y).iter().map(|c| c.ch).collect()
    }

    #[test]
    fn default_panel_sits_top_right() {
        let p = Panel::new(false, PanelPosition::default(), true);
        assert_eq!(p.rect(100, 40), (64, 1, PANEL_WIDTH, EXPANDED_HEIGHT));
        let c = Panel::new(true, PanelPosition::default(), true);
        assert_eq!(c.rect(100, 40).3, COLLAPSED_HEIGHT);
    }

    #[test]
    fn hit_testing_maps_rows() {
        let p = Panel::new(false, PanelPosition::at(0, 0), true);
        assert_eq!(p.hit(3, 1, 80, 30), Some(Hit::Header));
        assert_eq!(p.hit(PANEL_WIDTH - 4, 1, 80, 30), Some(Hit::Toggle));
        assert_eq!(p.hit(5, ROW_FIRST_THEME + 2, 80, 30), Some(Hit::Theme(2)));
        assert_eq!(p.hit(5, ROW_OVERLAY_SIZE, 80, 30), Some(Hit::OverlaySize));
        assert_eq!(p.hit(5, 0, 80, 30), Some(Hit::Body));
        assert_eq!(p.hit(PANEL_WIDTH, 1, 80, 30), None);

        let c = Panel::new(true, PanelPosition::at(0, 0), true);
        assert_eq!(c.hit(5, 2, 80, 30), Some(Hit::Body));
        assert_eq!(c.hit(5, ROW_FIRST_THEME, 80, 30), None);
    }

    #[test]
    fn drag_moves_and_clamps() {
        let mut p = Panel::new(false, PanelPosition::at(10, 5), true);
        p.begin_drag(12, 6, 80, 30);
        assert!(p.is_dragging());
        p.drag_to(20, 8, 80, 30);
        assert_eq!(p.rect(80, 30).0, 18);
        assert_eq!(p.rect(80, 30).1, 7);
        p.drag_to(79, 29, 80, 30);
        assert_eq!(p.end_drag(), Some(PanelPosition::at(80 - PANEL_WIDTH, 30 - EXPANDED_HEIGHT)));
        assert!(!p.is_dragging());
        assert_eq!(p.end_drag(), None);
    }

    #[test]
    fn draw_lists_themes_and_overlay_settings() {
        let p = Panel::new(false, PanelPosition::at(0, 0), true);
        let mut overlay = Overlay::default();
        overlay.set_text("follow");
        let view = PanelView {
            theme: theme_by_key("blue").unwrap(),
            overlay: &overlay,
            editing: None,
            mode: ColorMode::TrueColor,
        };
        let mut frame = Frame::new(40, 20, None);
        p.draw(&mut frame, &view);

        assert!(row(&frame, ROW_HEADER).starts_with("|= Matrix Settings"));
        assert!(row(&frame, ROW_HEADER).contains("[-]"));
        assert!(row(&frame, ROW_FIRST_THEME + 1).starts_with("| 2 * Blue Tech"));
        assert!(row(&frame, ROW_FIRST_THEME).starts_with("| 1   Classic Matrix"));
        assert!(row(&frame, ROW_OVERLAY_TEXT).contains("Text: follow"));
        assert!(row(&frame, ROW_OVERLAY_VISIBLE).contains("Show Text"));
        assert!(row(&frame, ROW_OVERLAY_SIZE).contains("Size: Medium"));
        let classic = frame.get(5, ROW_FIRST_THEME).unwrap();
        assert_eq!(classic.fg, Some(Color::Rgb { r: 0, g: 255, b: 0 }));
    }

    #[test]
    fn editing_shows_cursor() {
        let p = Panel::new(false, PanelPosition::at(0, 0), true);
        let overlay = Overlay::default();
        let view = PanelView {
            theme: theme_by_key("classic").unwrap(),
            overlay: &overlay,
            editing: Some("abc"),
            mode: ColorMode::Mono,
        };
        let mut frame = Frame::new(40, 20, None);
        p.draw(&mut frame, &view);
        assert!(row(&frame, ROW_OVERLAY_TEXT).contains("Text: abc_"));
    }
}
