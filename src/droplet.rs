// Copyright (c) 2026 rezky_nightky

use std::collections::VecDeque;

use crate::charset::GlyphPool;
use crate::random::RandomSource;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphCell {
    pub value: char,
    /// Ticks since creation, advanced 0.2 per visible frame.
    pub age: f32,
    pub hue: f32,
}

impl GlyphCell {
    pub fn fresh(glyphs: &GlyphPool, rng: &mut dyn RandomSource) -> Self {
        Self::aged(glyphs, rng, 0.0)
    }

    pub fn aged(glyphs: &GlyphPool, rng: &mut dyn RandomSource, age: f32) -> Self {
        let value = glyphs.pick(rng);
        Self {
            value,
            age,
            hue: rng.next_f32() * 360.0,
        }
    }
}

/// One falling column. Index 0 of `chars` is the head.
#[derive(Clone, Debug)]
pub struct Drop {
    pub id: u64,
    pub y: f32,
    pub speed: f32,
    pub chars: VecDeque<GlyphCell>,
    pub max_length: usize,
    pub respawn_rate: f32,
    pub active: bool,
    pub base_hue: f32,
}

impl Drop {
    /// Builds a fresh drop. Without `y` it starts 50..150 units above the top edge.
    pub fn spawn(id: u64, y: Option<f32>, rng: &mut dyn RandomSource) -> Self {
        let y = match y {
            Some(y) => y,
            None => -(rng.next_f32() * 100.0) - 50.0,
        };
        let mut speed = rng.next_f32() * 0.7 + 0.3;
        if rng.next_f32() > 0.9 {
            speed += 0.5;
        }
        let respawn_rate = rng.next_f32() * 0.03 + 0.01;
        let max_length = (rng.next_f32() * 30.0) as usize + 10;
        let base_hue = rng.next_f32() * 360.0;

        Self {
            id,
            y,
            speed,
            chars: VecDeque::with_capacity(max_length + 1),
            max_length,
            respawn_rate,
            active: true,
            base_hue,
        }
    }

    pub fn push_head(&mut self, cell: GlyphCell) {
        self.chars.push_front(cell);
    }

    /// Vertical position of the cell at `index` (0 = head).
    pub fn cell_y(&self, index: usize, cell_size: f32) -> f32 {
        self.y - index as f32 * cell_size
    }

    pub fn trim_to_max(&mut self) {
        self.chars.truncate(self.max_length);
    }
}
