// Copyright (c) 2026 rezky_nightky

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Mono,
    Color16,
    Color256,
    TrueColor,
}

/// What the terminal shows behind the rain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BackgroundMode {
    /// The current theme's background color.
    #[default]
    Theme,
    Black,
    /// Leave the terminal's own background untouched.
    Terminal,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OverlaySize {
    Small,
    #[default]
    Medium,
    Large,
    XLarge,
}

impl OverlaySize {
    pub const ALL: [OverlaySize; 4] = [
        OverlaySize::Small,
        OverlaySize::Medium,
        OverlaySize::Large,
        OverlaySize::XLarge,
    ];

    pub fn key(self) -> &'static str {
        match self {
            OverlaySize::Small => "small",
            OverlaySize::Medium => "medium",
            OverlaySize::Large => "large",
            OverlaySize::XLarge => "xlarge",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OverlaySize::Small => "Small",
            OverlaySize::Medium => "Medium",
            OverlaySize::Large => "Large",
            OverlaySize::XLarge => "X-Large",
        }
    }

    pub fn from_key(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.key() == s)
    }

    pub fn next(self) -> Self {
        match self {
            OverlaySize::Small => OverlaySize::Medium,
            OverlaySize::Medium => OverlaySize::Large,
            OverlaySize::Large => OverlaySize::XLarge,
            OverlaySize::XLarge => OverlaySize::Small,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OverlayPosition {
    Top,
    #[default]
    Center,
    Bottom,
}

impl OverlayPosition {
    pub const ALL: [OverlayPosition; 3] = [
        OverlayPosition::Top,
        OverlayPosition::Center,
        OverlayPosition::Bottom,
    ];

    pub fn key(self) -> &'static str {
        match self {
            OverlayPosition::Top => "top",
            OverlayPosition::Center => "center",
            OverlayPosition::Bottom => "bottom",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OverlayPosition::Top => "Top",
            OverlayPosition::Center => "Center",
            OverlayPosition::Bottom => "Bottom",
        }
    }

    pub fn from_key(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.key() == s)
    }

    pub fn next(self) -> Self {
        match self {
            OverlayPosition::Top => OverlayPosition::Center,
            OverlayPosition::Center => OverlayPosition::Bottom,
            OverlayPosition::Bottom => OverlayPosition::Top,
        }
    }
}
