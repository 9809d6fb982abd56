// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::cell::Cell;

/// Off-screen grid of terminal cells with per-row dirty tracking.
#[derive(Clone, Debug)]
pub struct Frame {
    pub width: u16,
    pub height: u16,
    cells: Vec<Cell>,
    dirty_rows: Vec<bool>,
    dirty_all: bool,
}

impl Frame {
    pub fn new(width: u16, height: u16, bg: Option<Color>) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::blank(bg); width as usize * height as usize],
            dirty_rows: vec![false; height as usize],
            dirty_all: true,
        }
    }

    pub fn is_dirty_all(&self) -> bool {
        self.dirty_all
    }

    pub fn is_row_dirty(&self, y: u16) -> bool {
        self.dirty_all || self.dirty_rows.get(y as usize).copied().unwrap_or(false)
    }

    pub fn clear_dirty(&mut self) {
        self.dirty_all = false;
        self.dirty_rows.fill(false);
    }

    pub fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    #[allow(dead_code)]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    pub fn row(&self, y: u16) -> &[Cell] {
        let w = self.width as usize;
        let start = y as usize * w;
        self.cells.get(start..start + w).unwrap_or(&[])
    }

    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        let Some(i) = self.index(x, y) else {
            return;
        };
        if self.cells[i] == cell {
            return;
        }
        self.cells[i] = cell;
        self.dirty_rows[y as usize] = true;
    }

    /// Writes `text` left to right from `(x, y)`, clipping at the right edge.
    pub fn put_str(
        &mut self,
        x: u16,
        y: u16,
        text: &str,
        fg: Option<Color>,
        bg: Option<Color>,
        bold: bool,
    ) {
        for (k, ch) in text.chars().enumerate() {
            let Some(cx) = x.checked_add(k as u16) else {
                break;
            };
            if cx >= self.width {
                break;
            }
            self.set(cx, y, Cell::glyph(ch, fg, bg).with_bold(bold));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_marks_only_changed_rows() {
        let mut f = Frame::new(4, 3, None);
        f.clear_dirty();
        f.set(1, 1, Cell::glyph('x', None, None));
        assert!(f.is_row_dirty(1));
        assert!(!f.is_row_dirty(0));
        f.clear_dirty();
        f.set(1, 1, Cell::glyph('x', None, None));
        assert!(!f.is_row_dirty(1));
    }

    #[test]
    fn new_frame_is_blank_and_fully_dirty() {
        let f = Frame::new(2, 2, Some(Color::Black));
        assert_eq!(f.get(1, 1).unwrap().ch, ' ');
        assert_eq!(f.get(1, 1).unwrap().bg, Some(Color::Black));
        assert!(f.is_dirty_all());
        assert!(f.get(2, 0).is_none());
    }

    #[test]
    fn put_str_clips_at_edge() {
        let mut f = Frame::new(3, 1, None);
        f.put_str(1, 0, "abc", None, None, false);
        let row: String = f.row(0).iter().map(|c| c.ch).collect();
        assert_eq!(row, " ab");
        assert!(f.get(3, 0).is_none());
    }
}
