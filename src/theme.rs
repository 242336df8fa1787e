//! Theme preference and light/dark resolution.
//!
//! The preference is either forced (dark or light) or follows the system
//! signal. The system signal comes from `COLORFGBG` or, in the binary, from
//! an OSC 11 terminal background query.

/// Stored theme preference.
#[derive(clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ThemePreference {
    #[default]
    #[value(name = "auto")]
    FollowSystem,
    Dark,
    Light,
}

impl ThemePreference {
    /// Parse the stored value: `"true"` is dark, `"false"` is light,
    /// anything else (including a missing value) follows the system.
    pub fn from_stored(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("true") => Self::Dark,
            Some("false") => Self::Light,
            _ => Self::FollowSystem,
        }
    }

    /// Parse the legacy boolean dark-mode flag. Unknown values yield `None`.
    pub fn from_legacy_dark_mode(value: &str) -> Option<Self> {
        match value.trim() {
            "true" => Some(Self::Dark),
            "false" => Some(Self::Light),
            _ => None,
        }
    }

    pub const fn as_stored(self) -> &'static str {
        match self {
            Self::FollowSystem => "auto",
            Self::Dark => "true",
            Self::Light => "false",
        }
    }

    /// Command-line name (`auto`, `dark`, `light`).
    pub const fn as_flag(self) -> &'static str {
        match self {
            Self::FollowSystem => "auto",
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    /// Toggle order: follow-system, dark, light, back to follow-system.
    #[must_use]
    pub const fn cycle(self) -> Self {
        match self {
            Self::FollowSystem => Self::Dark,
            Self::Dark => Self::Light,
            Self::Light => Self::FollowSystem,
        }
    }

    /// Label shown on the toggle button.
    pub const fn label(self) -> &'static str {
        match self {
            Self::FollowSystem => "Auto",
            Self::Dark => "Dark",
            Self::Light => "Light",
        }
    }

    pub const fn follows_system(self) -> bool {
        matches!(self, Self::FollowSystem)
    }

    /// The effective appearance given the current system signal.
    pub const fn resolve(self, system: Appearance) -> Appearance {
        match self {
            Self::FollowSystem => system,
            Self::Dark => Appearance::Dark,
            Self::Light => Appearance::Light,
        }
    }
}

/// A resolved light or dark appearance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Appearance {
    Light,
    #[default]
    Dark,
}

impl Appearance {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

/// System appearance from the environment, defaulting to dark.
pub fn system_appearance() -> Appearance {
    appearance_from_colorfgbg(std::env::var("COLORFGBG").ok().as_deref())
}

/// Interpret `COLORFGBG` (`fg;bg`): background colors 7 and up are light.
pub fn appearance_from_colorfgbg(colorfgbg: Option<&str>) -> Appearance {
    let Some(value) = colorfgbg else {
        return Appearance::Dark;
    };
    let bg_str = value.rsplit(';').next().unwrap_or(value);
    let Ok(bg) = bg_str.parse::<u8>() else {
        return Appearance::Dark;
    };

    if bg >= 7 {
        Appearance::Light
    } else {
        Appearance::Dark
    }
}

/// Classify a background color by perceived luminance.
pub fn appearance_from_rgb(r: u8, g: u8, b: u8) -> Appearance {
    let luma = 0.0722f32.mul_add(
        f32::from(b),
        0.2126f32.mul_add(f32::from(r), 0.7152 * f32::from(g)),
    );
    if luma >= 140.0 {
        Appearance::Light
    } else {
        Appearance::Dark
    }
}

/// Parse an OSC 11 reply: `ESC ] 11 ; rgb:RRRR/GGGG/BBBB` terminated by BEL or ST.
pub fn parse_osc11_reply(reply: &str) -> Option<(u8, u8, u8)> {
    let start = reply.find("rgb:")?;
    let data = &reply[start + 4..];
    let mut parts = data.split(['/', '\x07', '\x1b']);
    let r = parts.next()?;
    let g = parts.next()?;
    let b = parts.next()?;
    Some((
        parse_osc_component(r)?,
        parse_osc_component(g)?,
        parse_osc_component(b)?,
    ))
}

fn parse_osc_component(s: &str) -> Option<u8> {
    let hex = s.trim();
    if hex.len() >= 4 {
        let v = u16::from_str_radix(hex.get(..4)?, 16).ok()?;
        Some((v >> 8) as u8)
    } else if hex.len() == 2 {
        u8::from_str_radix(hex, 16).ok()
    } else {
        None
    }
}
