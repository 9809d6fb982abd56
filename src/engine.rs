// Copyright (c) 2026 rezky_nightky

use tracing::{debug, info};

use crate::charset::GlyphPool;
use crate::field::{RainField, CELL_SIZE};
use crate::overlay::Overlay;
use crate::random::RandomSource;
use crate::render::{render, Canvas};
use crate::runtime::{OverlayPosition, OverlaySize};
use crate::theme::{default_theme, theme_by_key, Theme};

/// The animation core: rain simulation, active theme and text overlay.
/// Persistence and input handling live with the caller.
pub struct MatrixRain {
    field: RainField,
    theme: &'static Theme,
    overlay: Overlay,
}

impl MatrixRain {
    pub fn new(glyphs: GlyphPool, rng: Box<dyn RandomSource>) -> Self {
        Self {
            field: RainField::new(glyphs, rng),
            theme: default_theme(),
            overlay: Overlay::default(),
        }
    }

    #[cfg(test)]
    pub fn field(&self) -> &RainField {
        &self.field
    }

    pub fn current_theme(&self) -> &'static Theme {
        self.theme
    }

    /// Switches theme by key. Unknown keys leave the current theme in place.
    pub fn set_theme(&mut self, key: &str) -> bool {
        match theme_by_key(key) {
            Some(theme) => {
                if theme.key != self.theme.key {
                    info!(theme = theme.key, "theme changed");
                }
                self.theme = theme;
                true
            }
            None => {
                debug!(key, "ignoring unknown theme");
                false
            }
        }
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn set_overlay_text(&mut self, text: &str) {
        self.overlay.set_text(text);
    }

    pub fn set_overlay_visible(&mut self, visible: bool) {
        self.overlay.set_visible(visible);
    }

    pub fn set_overlay_size(&mut self, size: OverlaySize) {
        self.overlay.set_size(size);
    }

    pub fn set_overlay_position(&mut self, position: OverlayPosition) {
        self.overlay.set_position(position);
    }

    /// Reinitializes the field for a surface of the given size.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.field.initialize(width, height, CELL_SIZE);
    }

    pub fn restart(&mut self) {
        let (w, h) = (self.field.width(), self.field.height());
        self.resize(w, h);
    }

    /// Advances the simulation and, if a frame was accepted, paints it.
    pub fn advance_and_render(&mut self, now_ms: f64, canvas: &mut dyn Canvas) -> bool {
        if !self.field.advance(now_ms) {
            return false;
        }
        render(&self.field, self.theme, canvas);
        true
    }
}
