// Copyright (c) 2026 rezky_nightky

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use crossterm::style::Color;
use tracing::{info, warn};

use crate::engine::MatrixRain;
use crate::frame::Frame;
use crate::overlay::MAX_OVERLAY_CHARS;
use crate::panel::{Hit, Panel, PanelView};
use crate::prefs::{
    PrefStore, Preferences, KEY_OVERLAY_POSITION, KEY_OVERLAY_SIZE, KEY_OVERLAY_TEXT,
    KEY_PANEL_COLLAPSED, KEY_PANEL_POSITION, KEY_SHOW_OVERLAY, KEY_THEME,
};
use crate::runtime::ColorMode;
use crate::theme::THEMES;

const DOUBLE_CLICK: Duration = Duration::from_millis(500);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Continue,
    Quit,
}

/// Glue between user input, the rain engine and saved preferences.
pub struct App {
    engine: MatrixRain,
    store: PrefStore,
    panel: Panel,
    editing: Option<String>,
    last_header_click: Option<Instant>,
}

impl App {
    /// Applies the stored preferences to `engine` and builds the panel.
    pub fn new(mut engine: MatrixRain, store: PrefStore, ascii: bool) -> Self {
        let prefs = Preferences::from_store(&store);
        engine.set_theme(prefs.theme);
        engine.set_overlay_text(&prefs.overlay_text);
        engine.set_overlay_visible(prefs.show_overlay);
        engine.set_overlay_size(prefs.overlay_size);
        engine.set_overlay_position(prefs.overlay_position);
        Self {
            engine,
            store,
            panel: Panel::new(prefs.panel_collapsed, prefs.panel_position, ascii),
            editing: None,
            last_header_click: None,
        }
    }

    pub fn engine(&self) -> &MatrixRain {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut MatrixRain {
        &mut self.engine
    }

    #[cfg(test)]
    pub fn panel(&self) -> &Panel {
        &self.panel
    }

    #[cfg(test)]
    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    fn persist(&mut self, key: &str, value: impl Into<String>) {
        if let Err(e) = self.store.set(key, value) {
            warn!(key, error = %e, "failed to save preference");
        }
    }

    pub fn select_theme(&mut self, index: usize) {
        let Some(theme) = THEMES.get(index) else {
            return;
        };
        if self.engine.set_theme(theme.key) {
            self.persist(KEY_THEME, theme.key);
        }
    }

    pub fn toggle_overlay(&mut self) {
        let visible = !self.engine.overlay().visible();
        self.engine.set_overlay_visible(visible);
        self.persist(KEY_SHOW_OVERLAY, visible.to_string());
    }

    pub fn cycle_overlay_size(&mut self) {
        let size = self.engine.overlay().size().next();
        self.engine.set_overlay_size(size);
        self.persist(KEY_OVERLAY_SIZE, size.key());
    }

    pub fn cycle_overlay_position(&mut self) {
        let position = self.engine.overlay().position().next();
        self.engine.set_overlay_position(position);
        self.persist(KEY_OVERLAY_POSITION, position.key());
    }

    pub fn toggle_panel(&mut self) {
        let collapsed = self.panel.toggle_collapsed();
        self.persist(KEY_PANEL_COLLAPSED, collapsed.to_string());
    }

    fn begin_editing(&mut self) {
        if self.editing.is_none() {
            self.editing = Some(self.engine.overlay().text().to_string());
        }
    }

    fn finish_editing(&mut self) {
        if self.editing.take().is_some() {
            info!(text = self.engine.overlay().text(), "overlay text set");
        }
    }

    fn set_overlay_text(&mut self, text: String) {
        self.engine.set_overlay_text(&text);
        let stored = self.engine.overlay().text().to_string();
        self.persist(KEY_OVERLAY_TEXT, stored);
        self.editing = Some(text);
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c') => Action::Quit,
                _ => Action::Continue,
            };
        }

        if let Some(buf) = self.editing.clone() {
            match key.code {
                KeyCode::Enter | KeyCode::Esc => self.finish_editing(),
                KeyCode::Backspace => {
                    let mut buf = buf;
                    buf.pop();
                    self.set_overlay_text(buf);
                }
                KeyCode::Char(c) if buf.chars().count() < MAX_OVERLAY_CHARS => {
                    let mut buf = buf;
                    buf.push(c);
                    self.set_overlay_text(buf);
                }
                _ => {}
            }
            return Action::Continue;
        }

        match key.code {
            KeyCode::Char('q') => return Action::Quit,
            KeyCode::Char(c @ '1'..='9') => {
                self.select_theme(c as usize - '1' as usize);
            }
            KeyCode::Char('t') => self.toggle_overlay(),
            KeyCode::Char('s') => self.cycle_overlay_size(),
            KeyCode::Char('p') => self.cycle_overlay_position(),
            KeyCode::Char('e') | KeyCode::Enter => self.begin_editing(),
            KeyCode::Char(' ') => self.engine.restart(),
            KeyCode::Esc => self.toggle_panel(),
            _ => {}
        }
        Action::Continue
    }

    pub fn handle_mouse(&mut self, ev: MouseEvent, cols: u16, lines: u16, now: Instant) {
        let (col, line) = (ev.column, ev.row);
        match ev.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let hit = self.panel.hit(col, line, cols, lines);
                if hit != Some(Hit::OverlayText) {
                    self.finish_editing();
                }
                match hit {
                    Some(Hit::Header) => {
                        let double = self
                            .last_header_click
                            .is_some_and(|t| now.saturating_duration_since(t) < DOUBLE_CLICK);
                        if double {
                            self.last_header_click = None;
                            self.toggle_panel();
                        } else {
                            self.last_header_click = Some(now);
                            self.panel.begin_drag(col, line, cols, lines);
                        }
                    }
                    Some(Hit::Toggle) => self.toggle_panel(),
                    Some(Hit::Theme(i)) => self.select_theme(i),
                    Some(Hit::OverlayText) => self.begin_editing(),
                    Some(Hit::OverlayVisible) => self.toggle_overlay(),
                    Some(Hit::OverlaySize) => self.cycle_overlay_size(),
                    Some(Hit::OverlayPosition) => self.cycle_overlay_position(),
                    Some(Hit::Body) | None => {}
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                self.panel.drag_to(col, line, cols, lines);
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if let Some(pos) = self.panel.end_drag() {
                    self.persist(KEY_PANEL_POSITION, pos.to_json());
                }
            }
            _ => {}
        }
    }

    /// Draws the overlay and the control panel over the presented rain.
    pub fn draw_ui(
        &self,
        frame: &mut Frame,
        mode: ColorMode,
        paper: [u8; 3],
        bg: Option<Color>,
    ) {
        let theme = self.engine.current_theme();
        self.engine.overlay().draw(frame, theme, mode, paper, bg);
        let view = PanelView {
            theme,
            overlay: self.engine.overlay(),
            editing: self.editing.as_deref(),
            mode,
        };
        self.panel.draw(frame, &view);
    }
}
