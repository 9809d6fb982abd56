// Copyright (c) 2026 rezky_nightky

/// An RGB color with straight (non-premultiplied) alpha in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[cfg(test)]
    pub const fn opaque([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn rgb(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Theme {
    pub key: &'static str,
    pub name: &'static str,
    /// Low-alpha fill painted over the whole surface every frame.
    pub background: Rgba,
    pub lead: [u8; 3],
    pub trail: [u8; 3],
    pub fade_opacity: f32,
    /// Hue-cycling mode; `lead`/`trail` only style the UI.
    pub rainbow: bool,
}

pub static THEMES: [Theme; 6] = [
    Theme {
        key: "classic",
        name: "Classic Matrix",
        background: Rgba::new(0, 0, 0, 0.05),
        lead: [0, 255, 0],
        trail: [0, 180, 0],
        fade_opacity: 0.05,
        rainbow: false,
    },
    Theme {
        key: "blue",
        name: "Blue Tech",
        background: Rgba::new(0, 0, 10, 0.05),
        lead: [0, 180, 255],
        trail: [0, 80, 180],
        fade_opacity: 0.05,
        rainbow: false,
    },
    Theme {
        key: "amber",
        name: "Amber Terminal",
        background: Rgba::new(0, 0, 0, 0.05),
        lead: [255, 180, 0],
        trail: [180, 100, 0],
        fade_opacity: 0.05,
        rainbow: false,
    },
    Theme {
        key: "pink",
        name: "Cyberpunk",
        background: Rgba::new(10, 0, 10, 0.05),
        lead: [255, 50, 255],
        trail: [180, 0, 180],
        fade_opacity: 0.05,
        rainbow: false,
    },
    Theme {
        key: "rainbow",
        name: "Rainbow",
        background: Rgba::new(0, 0, 0, 0.05),
        lead: [255, 255, 255],
        trail: [180, 180, 180],
        fade_opacity: 0.05,
        rainbow: true,
    },
    Theme {
        key: "monochrome",
        name: "Monochrome",
        background: Rgba::new(0, 0, 0, 0.05),
        lead: [220, 220, 220],
        trail: [150, 150, 150],
        fade_opacity: 0.05,
        rainbow: false,
    },
];

pub fn default_theme() -> &'static Theme {
    &THEMES[0]
}

pub fn theme_by_key(key: &str) -> Option<&'static Theme> {
    THEMES.iter().find(|t| t.key == key)
}

/// HSL to RGB; `h` in degrees, `s` and `l` in `0.0..=1.0`.
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> [u8; 3] {
    let to_u8 = |v: f32| (v * 255.0).round().clamp(0.0, 255.0) as u8;
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    if s == 0.0 {
        let v = to_u8(l);
        return [v, v, v];
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    let h = h.rem_euclid(360.0) / 360.0;

    [
        to_u8(hue_to_channel(p, q, h + 1.0 / 3.0)),
        to_u8(hue_to_channel(p, q, h)),
        to_u8(hue_to_channel(p, q, h - 1.0 / 3.0)),
    ]
}

fn hue_to_channel(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}
