// Copyright (c) 2026 rezky_nightky

use tracing::{debug, info, trace};

use crate::charset::GlyphPool;
use crate::droplet::{Drop, GlyphCell};
use crate::random::RandomSource;

/// Side of one glyph cell in surface units.
pub const CELL_SIZE: f32 = 16.0;

pub const TARGET_FPS: f64 = 60.0;
const FRAME_INTERVAL_MS: f64 = 1000.0 / TARGET_FPS;

const MAINTENANCE_EVERY_FRAMES: u64 = 5;
const MIN_ACTIVE_DENSITY: f32 = 0.7;
const MIN_ACTIVE_ABSOLUTE: usize = 5;

const WAVE_COOLDOWN_MS: f64 = 5000.0;
const WAVE_MIN_SHARE: f32 = 0.3;
const WAVE_SHARE_SPREAD: f32 = 0.1;
const WAVE_STAGGER_CELLS: f32 = 10.0;

const FAILSAFE_MIN_ACTIVE: usize = 10;

const AGE_STEP: f32 = 0.2;
const GLYPH_MUTATE_CHANCE: f32 = 0.01;
const MAX_CELL_AGE: f32 = 50.0;

const RESET_EMPTY_BELOW: f32 = 100.0;
const RESET_ALWAYS_BELOW: f32 = 300.0;
const LATE_RESET_CHANCE: f32 = 0.003;
const EARLY_RESPAWN_CHANCE: f32 = 0.02;
const RESTAGGER_CHANCE: f32 = 0.003;
const RESTAGGER_DEPTH_CELLS: f32 = 20.0;
const RESTAGGER_SPREAD_CELLS: f32 = 5.0;

/// The grid of falling columns. One `Drop` per column; resets replace a
/// drop wholesale through `Drop::spawn`.
pub struct RainField {
    width: f32,
    height: f32,
    cell_size: f32,
    columns: usize,
    drops: Vec<Drop>,

    glyphs: GlyphPool,
    rng: Box<dyn RandomSource>,
    next_id: u64,

    last_frame_ms: Option<f64>,
    frames: u64,
    wave_clock_ms: f64,
}

impl RainField {
    pub fn new(glyphs: GlyphPool, rng: Box<dyn RandomSource>) -> Self {
        Self {
            width: 0.0,
            height: 0.0,
            cell_size: CELL_SIZE,
            columns: 0,
            drops: Vec::new(),
            glyphs,
            rng,
            next_id: 0,
            last_frame_ms: None,
            frames: 0,
            wave_clock_ms: 0.0,
        }
    }

    #[cfg(test)]
    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn drops(&self) -> &[Drop] {
        &self.drops
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    #[cfg(test)]
    pub(crate) fn drops_mut(&mut self) -> &mut [Drop] {
        &mut self.drops
    }

    /// Rebuilds the whole grid for a surface of `width` x `height`.
    /// In-flight drops are discarded.
    pub fn initialize(&mut self, width: f32, height: f32, cell_size: f32) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        self.cell_size = if cell_size > 0.0 { cell_size } else { CELL_SIZE };
        self.columns = if self.width > 0.0 && self.height > 0.0 {
            (self.width / self.cell_size).floor() as usize
        } else {
            0
        };

        let h = self.height;
        let cell = self.cell_size;
        self.drops.clear();
        self.drops.reserve(self.columns);

        for i in 0..self.columns {
            let mut drop = self.fresh_drop(None);
            let r = self.rng.next_f32();
            drop.y = match i % 4 {
                0 => r * -h * 0.25,
                1 => h * 0.25 + r * h * 0.25,
                2 => h * 0.5 + r * h * 0.25,
                _ => h * 0.75 + r * h * 0.25,
            };

            if drop.y >= 0.0 && drop.y < h {
                let wanted = (self.rng.next_f32() * 20.0) as usize + 5;
                let fits = (drop.y / cell).floor() as usize + 1;
                let n = wanted.min(fits).min(drop.max_length);
                for _ in 0..n {
                    let age = self.rng.next_f32() * 10.0;
                    let glyph = GlyphCell::aged(&self.glyphs, self.rng.as_mut(), age);
                    drop.push_head(glyph);
                }
            }
            self.drops.push(drop);
        }

        self.wave_clock_ms = 0.0;
        self.frames = 0;
        info!(
            columns = self.columns,
            width = self.width,
            height = self.height,
            "rain field initialized"
        );
    }

    /// Runs one simulation step if at least one frame interval has passed
    /// since the last accepted frame. Returns whether a step ran.
    pub fn advance(&mut self, now_ms: f64) -> bool {
        let dt = match self.last_frame_ms {
            Some(last) if now_ms - last < FRAME_INTERVAL_MS => return false,
            Some(last) => now_ms - last,
            None => 0.0,
        };
        self.last_frame_ms = Some(now_ms);

        if self.columns == 0 {
            return true;
        }

        self.frames += 1;
        self.wave_clock_ms += dt;

        if self.frames % MAINTENANCE_EVERY_FRAMES == 0 {
            self.maintain_density();
        }
        if self.wave_clock_ms > WAVE_COOLDOWN_MS {
            self.generate_wave();
        }
        self.failsafe();

        for i in 0..self.columns {
            self.step_column(i);
        }
        true
    }

    fn fresh_drop(&mut self, y: Option<f32>) -> Drop {
        self.next_id += 1;
        Drop::spawn(self.next_id, y, self.rng.as_mut())
    }

    fn respawn(&mut self, col: usize, y: Option<f32>) {
        let drop = self.fresh_drop(y);
        let id = drop.id;
        let old = std::mem::replace(&mut self.drops[col], drop);
        trace!(col, old = old.id, id, "column respawned");
    }

    /// Freshly spawned and still above the top edge, waiting to grow a head.
    fn is_pending(d: &Drop) -> bool {
        d.active && d.chars.is_empty() && d.y < 0.0
    }

    fn is_near_top(&self, d: &Drop) -> bool {
        d.active && d.y < self.cell_size * 2.0
    }

    pub fn near_top_count(&self) -> usize {
        self.drops.iter().filter(|d| self.is_near_top(d)).count()
    }

    /// Columns that density maintenance may promote.
    pub fn is_promotable(&self, d: &Drop) -> bool {
        !d.active || d.y > self.height
    }

    pub fn maintain_density(&mut self) {
        if self.columns == 0 {
            return;
        }
        let mut near_top = self.near_top_count();
        let target = MIN_ACTIVE_DENSITY * self.columns as f32;
        let ratio = near_top as f32 / self.columns as f32;
        if ratio >= MIN_ACTIVE_DENSITY && near_top >= MIN_ACTIVE_ABSOLUTE {
            return;
        }

        let mut promoted = 0usize;
        for i in 0..self.columns {
            if near_top as f32 >= target {
                break;
            }
            if !self.is_promotable(&self.drops[i]) {
                continue;
            }
            let counted = self.is_near_top(&self.drops[i]);
            self.respawn(i, None);
            if !counted {
                near_top += 1;
            }
            promoted += 1;
        }
        if promoted > 0 {
            debug!(promoted, near_top, "density maintenance promoted drops");
        }
    }

    fn generate_wave(&mut self) {
        let n = self.columns;
        let share = WAVE_MIN_SHARE + self.rng.next_f32() * WAVE_SHARE_SPREAD;
        let size = ((n as f32 * share) as usize).min(n);
        let start = (self.rng.next_f32() * (n - size) as f32) as usize;

        let mut reset = 0usize;
        for k in 0..size {
            let col = (start + k) % n;
            if self.drops[col].y > self.height / 2.0 {
                let stagger = -self.cell_size * (self.rng.next_f32() * WAVE_STAGGER_CELLS);
                self.respawn(col, Some(stagger));
                reset += 1;
            }
        }

        self.wave_clock_ms = 0.0;
        debug!(start, size, reset, "wave generated");
    }

    fn failsafe(&mut self) {
        let needed = FAILSAFE_MIN_ACTIVE.min(self.columns);
        let found = self
            .drops
            .iter()
            .filter(|d| Self::is_pending(d) || (d.active && !d.chars.is_empty()))
            .take(needed)
            .count();
        if found >= needed {
            return;
        }
        let mut reseeded = 0usize;
        for i in (0..self.columns).step_by(3) {
            if Self::is_pending(&self.drops[i]) {
                continue;
            }
            self.respawn(i, None);
            reseeded += 1;
        }
        debug!(found, reseeded, "failsafe reseeded every third column");
    }

    fn step_column(&mut self, i: usize) {
        let h = self.height;
        let cell = self.cell_size;

        {
            let glyphs = &self.glyphs;
            let rng = self.rng.as_mut();
            let d = &mut self.drops[i];

            if d.y > -cell && d.y < h + cell {
                let head_y = d.y;
                for (j, c) in d.chars.iter_mut().enumerate() {
                    let cy = head_y - j as f32 * cell;
                    if cy <= -cell || cy >= h {
                        continue;
                    }
                    c.age += AGE_STEP;
                    if j > 0 && rng.next_f32() < GLYPH_MUTATE_CHANCE {
                        c.value = glyphs.pick(rng);
                    }
                }
            }

            d.y += d.speed;

            let len = d.chars.len();
            if d.y >= 0.0 && (len == 0 || d.y - (len as f32 - 1.0) * cell >= cell) {
                d.push_head(GlyphCell::fresh(glyphs, rng));
            }
            d.trim_to_max();

            if i % 3 == 0 {
                while let Some(tail) = d.chars.back() {
                    let tail_y = d.cell_y(d.chars.len() - 1, cell);
                    if tail_y > h || tail.age > MAX_CELL_AGE {
                        d.chars.pop_back();
                    } else {
                        break;
                    }
                }
            }

            if d.y > h && d.chars.is_empty() {
                d.active = false;
            }
        }

        if self.should_reset(i) {
            self.respawn(i, None);
            return;
        }

        if i % 2 == 0 {
            self.maybe_resupply(i);
        }
    }

    fn should_reset(&mut self, i: usize) -> bool {
        let h = self.height;
        let d = &self.drops[i];
        let (y, empty, rate) = (d.y, d.chars.is_empty(), d.respawn_rate);

        if (y > h + RESET_EMPTY_BELOW && empty) || y > h + RESET_ALWAYS_BELOW {
            return true;
        }
        if y > h / 3.0 && self.rng.next_f32() < rate {
            return true;
        }
        y > h / 2.0 && self.rng.next_f32() < LATE_RESET_CHANCE
    }

    fn maybe_resupply(&mut self, i: usize) {
        let h = self.height;
        let cell = self.cell_size;
        let (y, has_chars) = (self.drops[i].y, !self.drops[i].chars.is_empty());

        if y > h / 3.0 && self.rng.next_f32() < EARLY_RESPAWN_CHANCE {
            self.respawn(i, None);
            let head_start = (self.rng.next_f32() * 3.0) as usize + 1;
            for _ in 0..head_start {
                let c = GlyphCell::fresh(&self.glyphs, self.rng.as_mut());
                self.drops[i].push_head(c);
            }
            return;
        }

        if has_chars && y > cell * RESTAGGER_DEPTH_CELLS && self.rng.next_f32() < RESTAGGER_CHANCE {
            let start = -cell * (self.rng.next_f32() * RESTAGGER_SPREAD_CELLS);
            self.respawn(i, Some(start));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charset::{build_chars, Charset};
    use crate::random::{SequenceRandom, StdRandom};

    fn make_field(seed: u64, width: f32, height: f32) -> RainField {
        let mut rng = StdRandom::seeded(seed);
        let glyphs = GlyphPool::new(build_chars(Charset::CLASSIC), &mut rng);
        let mut field = RainField::new(glyphs, Box::new(rng));
        field.initialize(width, height, CELL_SIZE);
        field
    }

    fn frame_ms(n: u64) -> f64 {
        n as f64 * FRAME_INTERVAL_MS
    }

    #[test]
    fn initialize_derives_columns_and_bands() {
        let field = make_field(5, 160.0, 640.0);
        assert_eq!(field.columns(), 10);
        assert_eq!(field.drops().len(), 10);

        let h = 640.0;
        for (i, d) in field.drops().iter().enumerate() {
            let (lo, hi) = match i % 4 {
                0 => (-h * 0.25, 0.0),
                1 => (h * 0.25, h * 0.5),
                2 => (h * 0.5, h * 0.75),
                _ => (h * 0.75, h),
            };
            assert!(d.y >= lo && d.y <= hi, "column {} y {} not in band", i, d.y);
            assert!(d.chars.len() <= d.max_length);
            if d.y >= 0.0 && d.y < h {
                assert!(!d.chars.is_empty());
                assert!(d.chars.iter().all(|c| c.age < 10.0));
            }
        }
    }

    #[test]
    fn resize_rebuilds_grid() {
        let mut field = make_field(6, 160.0, 320.0);
        let old_ids: Vec<u64> = field.drops().iter().map(|d| d.id).collect();
        field.initialize(333.0, 200.0, CELL_SIZE);
        assert_eq!(field.columns(), 20);
        assert_eq!(field.drops().len(), 20);
        assert!(field.drops().iter().all(|d| !old_ids.contains(&d.id)));
    }

    #[test]
    fn degenerate_surface_has_no_columns() {
        let mut field = make_field(1, 0.0, 480.0);
        assert_eq!(field.columns(), 0);
        assert!(field.advance(0.0));
        assert!(field.advance(frame_ms(1)));

        field.initialize(-40.0, -10.0, CELL_SIZE);
        assert_eq!(field.columns(), 0);
        assert!(field.drops().is_empty());
        field.maintain_density();

        field.initialize(160.0, 0.0, CELL_SIZE);
        assert_eq!(field.columns(), 0);
        assert!(field.drops().is_empty());
        assert!(field.advance(frame_ms(4)));
    }

    #[test]
    fn throttle_skips_early_frames() {
        let mut field = make_field(2, 320.0, 320.0);
        assert!(field.advance(1000.0));
        assert!(!field.advance(1005.0));
        assert!(!field.advance(1016.0));
        assert!(field.advance(1017.0));
    }

    #[test]
    fn length_never_exceeds_max() {
        let mut field = make_field(9, 640.0, 480.0);
        for n in 0..3000 {
            field.advance(frame_ms(n));
            for d in field.drops() {
                assert!(d.chars.len() <= d.max_length);
            }
        }
    }

    #[test]
    fn drop_far_below_is_replaced() {
        let mut field = make_field(4, 160.0, 320.0);
        let h = field.height();
        let old_id = {
            let d = &mut field.drops_mut()[1];
            d.y = h + 301.0;
            d.id
        };
        assert!(field.advance(0.0));
        let d = &field.drops()[1];
        assert_ne!(d.id, old_id);
        assert!(d.chars.is_empty());
    }

    #[test]
    fn maintenance_promotes_up_to_target() {
        let mut field = make_field(12, 480.0, 320.0);
        let h = field.height();
        for d in field.drops_mut() {
            d.y = h * 0.6;
            d.active = false;
        }
        field.maintain_density();
        let ratio = field.near_top_count() as f32 / field.columns() as f32;
        assert!(ratio >= MIN_ACTIVE_DENSITY);
        assert_eq!(field.near_top_count(), 21);
    }

    #[test]
    fn maintenance_runs_out_of_promotable_drops() {
        let mut field = make_field(14, 480.0, 320.0);
        let h = field.height();
        for (i, d) in field.drops_mut().iter_mut().enumerate() {
            d.y = h * 0.6;
            d.active = i % 2 == 0;
        }
        field.maintain_density();
        let ratio = field.near_top_count() as f32 / field.columns() as f32;
        let eligible = field.drops().iter().filter(|d| field.is_promotable(d)).count();
        assert!(ratio >= MIN_ACTIVE_DENSITY || eligible == 0);
        assert_eq!(field.near_top_count(), 15);
    }

    #[test]
    fn maintenance_stops_when_nothing_is_promotable() {
        let mut field = make_field(13, 480.0, 320.0);
        let h = field.height();
        for d in field.drops_mut() {
            d.y = h * 0.5;
            d.active = true;
        }
        field.maintain_density();
        assert_eq!(field.near_top_count(), 0);
        assert_eq!(
            field.drops().iter().filter(|d| field.is_promotable(d)).count(),
            0
        );
    }

    #[test]
    fn wave_resets_a_band_in_the_lower_half() {
        let mut field = make_field(21, 320.0, 320.0);
        let h = field.height();
        for d in field.drops_mut() {
            d.y = h * 0.8;
        }
        let before: Vec<u64> = field.drops().iter().map(|d| d.id).collect();

        field.rng = Box::new(SequenceRandom::new(&[0.0, 0.0, 0.5]));
        field.generate_wave();

        // 20 columns at 30% share starting at column 0.
        for (i, d) in field.drops().iter().enumerate() {
            if i < 6 {
                assert_ne!(d.id, before[i]);
                assert!(d.y <= 0.0 && d.y >= -CELL_SIZE * WAVE_STAGGER_CELLS);
            } else {
                assert_eq!(d.id, before[i]);
            }
        }
        assert_eq!(field.wave_clock_ms, 0.0);
    }

    #[test]
    fn wave_fires_after_cooldown() {
        let mut field = make_field(22, 320.0, 320.0);
        field.advance(0.0);
        assert!(field.advance(WAVE_COOLDOWN_MS - 1.0));
        assert!(field.wave_clock_ms > 0.0);
        assert!(field.advance(WAVE_COOLDOWN_MS + 20.0));
        assert_eq!(field.wave_clock_ms, 0.0);
    }

    #[test]
    fn failsafe_reseeds_dead_field() {
        let mut field = make_field(30, 480.0, 320.0);
        for d in field.drops_mut() {
            d.chars.clear();
            d.active = false;
            d.y = 100.0;
        }
        let before: Vec<u64> = field.drops().iter().map(|d| d.id).collect();
        field.failsafe();
        for (i, d) in field.drops().iter().enumerate() {
            assert_eq!(d.id != before[i], i % 3 == 0);
        }
    }

    #[test]
    fn failsafe_leaves_pending_drops_alone() {
        let mut field = make_field(32, 160.0, 320.0);
        for d in field.drops_mut() {
            d.chars.clear();
            d.active = false;
            d.y = 100.0;
        }
        field.failsafe();
        let reseeded: Vec<u64> = field.drops().iter().map(|d| d.id).collect();
        field.failsafe();
        let again: Vec<u64> = field.drops().iter().map(|d| d.id).collect();
        assert_eq!(reseeded, again);
    }

    #[test]
    fn every_column_lights_up_on_narrow_fields() {
        for (seed, width) in [(7, 160.0), (8, 208.0)] {
            let mut field = make_field(seed, width, 384.0);
            let mut lit = vec![false; field.columns()];
            for n in 0..3000 {
                field.advance(frame_ms(n));
                for (i, d) in field.drops().iter().enumerate() {
                    if !d.chars.is_empty() && d.y >= 0.0 && d.y < field.height() {
                        lit[i] = true;
                    }
                }
            }
            assert!(
                lit.iter().all(|&l| l),
                "{} columns, unlit: {:?}",
                field.columns(),
                lit
            );
        }
    }

    #[test]
    fn field_never_stays_dead_for_long() {
        let mut field = make_field(31, 640.0, 320.0);
        let mut dead_streak = 0;
        let mut worst = 0;
        for n in 0..6000 {
            field.advance(frame_ms(n));
            let alive = field
                .drops()
                .iter()
                .filter(|d| d.active && !d.chars.is_empty())
                .count();
            if alive < FAILSAFE_MIN_ACTIVE {
                dead_streak += 1;
            } else {
                dead_streak = 0;
            }
            worst = worst.max(dead_streak);
        }
        assert!(worst < 600, "field stayed sparse for {} frames", worst);
    }

    #[test]
    fn forced_respawn_roll_resets_mid_screen_drop() {
        let mut field = make_field(40, 160.0, 320.0);
        let h = field.height();
        {
            let d = &mut field.drops_mut()[1];
            d.y = h * 0.4;
            d.respawn_rate = 0.04;
        }
        let old = field.drops()[1].id;
        field.rng = Box::new(SequenceRandom::constant(0.0));
        field.step_column(1);
        assert_ne!(field.drops()[1].id, old);
    }

    #[test]
    fn high_rolls_keep_drop_falling() {
        let mut field = make_field(41, 160.0, 320.0);
        let h = field.height();
        let (old, y0, speed) = {
            let d = &mut field.drops_mut()[2];
            d.y = h * 0.6;
            (d.id, d.y, d.speed)
        };
        field.rng = Box::new(SequenceRandom::constant(0.999));
        field.step_column(2);
        let d = &field.drops()[2];
        assert_eq!(d.id, old);
        assert!((d.y - (y0 + speed)).abs() < 1e-4);
    }

    #[test]
    fn even_column_early_respawn_gets_head_start() {
        let mut field = make_field(42, 160.0, 320.0);
        let h = field.height();
        {
            let d = &mut field.drops_mut()[2];
            d.chars.clear();
            d.y = h * 0.4;
            d.respawn_rate = 0.01;
        }
        // New head (3 rolls), respawn-rate roll misses, early-respawn roll hits,
        // five spawn rolls, then a head start of three cells.
        field.rng = Box::new(SequenceRandom::new(&[
            0.5, 0.5, 0.5, 0.5, 0.0, 0.5, 0.5, 0.5, 0.5, 0.5, 0.99,
        ]));
        let old = field.drops()[2].id;
        field.step_column(2);
        let d = &field.drops()[2];
        assert_ne!(d.id, old);
        assert!((1..=3).contains(&d.chars.len()));
        assert!(d.chars.iter().all(|c| c.age == 0.0));
    }

    #[test]
    fn head_cell_is_inserted_once_on_screen() {
        let mut field = make_field(43, 160.0, 320.0);
        {
            let d = &mut field.drops_mut()[1];
            d.chars.clear();
            d.y = -0.1;
            d.speed = 0.5;
        }
        field.rng = Box::new(SequenceRandom::constant(0.999));
        field.step_column(1);
        let d = &field.drops()[1];
        assert_eq!(d.chars.len(), 1);
        assert_eq!(d.chars[0].age, 0.0);
    }
}
