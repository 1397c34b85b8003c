//! Color system for a dark theme with elevation hierarchy.
//!
//! Provides:
//! - RGBA color representation with hex and HSL conversions
//! - The application theme
//! - The fixed collection color palette
//! - Integration with owo-colors (CLI output) and ratatui (TUI rendering)

use owo_colors::OwoColorize;
use ratatui::style::Color as RatatuiColor;
use std::fmt::{self, Display};

/// Represents an RGBA color with optional alpha channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    r: u8,
    g: u8,
    b: u8,
    a: u8,
}

impl Color {
    /// Create a new RGB color with full opacity
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Create a new RGBA color with specified alpha
    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create a color from HSL values
    pub fn from_hsl(h: f32, s: f32, l: f32) -> Self {
        let h = h % 360.0;
        let s = s.clamp(0.0, 100.0) / 100.0;
        let l = l.clamp(0.0, 100.0) / 100.0;

        if s == 0.0 {
            let v = (l * 255.0) as u8;
            return Self::rgb(v, v, v);
        }

        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
        let m = l - c / 2.0;

        let (r, g, b) = match h as u32 {
            0..=59 => (c, x, 0.0),
            60..=119 => (x, c, 0.0),
            120..=179 => (0.0, c, x),
            180..=239 => (0.0, x, c),
            240..=299 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };

        Self::rgb(
            ((r + m) * 255.0).round() as u8,
            ((g + m) * 255.0).round() as u8,
            ((b + m) * 255.0).round() as u8,
        )
    }

    /// Convert to HSL values
    pub fn to_hsl(&self) -> (f32, f32, f32) {
        let r = self.r as f32 / 255.0;
        let g = self.g as f32 / 255.0;
        let b = self.b as f32 / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;

        let mut h = if delta == 0.0 {
            0.0
        } else if max == r {
            60.0 * (((g - b) / delta) % 6.0)
        } else if max == g {
            60.0 * ((b - r) / delta + 2.0)
        } else {
            60.0 * ((r - g) / delta + 4.0)
        };

        if h < 0.0 {
            h += 360.0;
        }

        let l = (max + min) / 2.0;
        let s = if delta == 0.0 {
            0.0
        } else {
            delta / (1.0 - (2.0 * l - 1.0).abs())
        };

        (h, s * 100.0, l * 100.0)
    }

    /// Create a color from a hexadecimal string (`#rrggbb` or `#rrggbbaa`)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }

        match hex.len() {
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(Self::rgb(r, g, b))
            }
            8 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                let a = u8::from_str_radix(&hex[6..8], 16).ok()?;
                Some(Self::rgba(r, g, b, a))
            }
            3 => {
                let mut channels = hex.chars().map(|c| c.to_digit(16).map(|d| (d * 17) as u8));
                let r = channels.next()??;
                let g = channels.next()??;
                let b = channels.next()??;
                Some(Self::rgb(r, g, b))
            }
            _ => None,
        }
    }

    /// Convert to hexadecimal string representation
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// Get color with modified alpha
    pub fn with_alpha(&self, alpha: u8) -> Self {
        Self { a: alpha, ..*self }
    }

    /// Lightens the color by a percentage (0-100)
    pub fn lighten(&self, amount: f32) -> Self {
        let (h, s, l) = self.to_hsl();
        Self::from_hsl(h, s, (l + amount).min(100.0))
    }

    /// Convert to ratatui Color.
    ///
    /// Terminals have no alpha channel, so translucent colors are blended
    /// onto the theme base background first.
    pub fn to_ratatui(&self) -> RatatuiColor {
        let solid = if self.a == 255 {
            *self
        } else {
            theme::background::BASE.mix(&self.with_alpha(255), self.a as f32 / 255.0)
        };
        RatatuiColor::Rgb(solid.r, solid.g, solid.b)
    }

    /// Get the RGB components
    pub fn rgb_components(&self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }

    /// Mix with another color by a specified amount (0.0-1.0)
    pub fn mix(&self, other: &Color, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);
        let r = ((self.r as f32 * (1.0 - amount) + other.r as f32 * amount).round()) as u8;
        let g = ((self.g as f32 * (1.0 - amount) + other.g as f32 * amount).round()) as u8;
        let b = ((self.b as f32 * (1.0 - amount) + other.b as f32 * amount).round()) as u8;
        let a = ((self.a as f32 * (1.0 - amount) + other.a as f32 * amount).round()) as u8;
        Self::rgba(r, g, b, a)
    }

    /// Picks black or white text, whichever reads better on this color
    pub fn contrast_text(&self) -> Self {
        let (_, _, l) = self.to_hsl();
        if l > 60.0 {
            theme::background::BASE
        } else {
            theme::text::PRIMARY
        }
    }
}

impl From<Color> for RatatuiColor {
    fn from(color: Color) -> Self {
        color.to_ratatui()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Extension trait for applying theme colors to strings with owo-colors
pub trait ThemeColorize: OwoColorize {
    /// Apply primary text color
    #[inline]
    fn primary(self) -> String
    where
        Self: Sized + Display,
    {
        let (r, g, b) = theme::text::PRIMARY.rgb_components();
        format!("{}", self.truecolor(r, g, b))
    }

    /// Apply secondary text color
    #[inline]
    fn secondary(self) -> String
    where
        Self: Sized + Display,
    {
        let (r, g, b) = theme::text::SECONDARY.rgb_components();
        format!("{}", self.truecolor(r, g, b))
    }

    /// Apply the accent color used for headings and favorites
    #[inline]
    fn accent(self) -> String
    where
        Self: Sized + Display,
    {
        let (r, g, b) = theme::accent::CORAL.rgb_components();
        format!("{}", self.truecolor(r, g, b))
    }

    /// Apply success status color
    #[inline]
    fn success(self) -> String
    where
        Self: Sized + Display,
    {
        let (r, g, b) = theme::status::SUCCESS.rgb_components();
        format!("{}", self.truecolor(r, g, b))
    }

    /// Apply warning status color
    #[inline]
    fn warning(self) -> String
    where
        Self: Sized + Display,
    {
        let (r, g, b) = theme::status::WARNING.rgb_components();
        format!("{}", self.truecolor(r, g, b))
    }

    /// Apply error status color
    #[inline]
    fn error(self) -> String
    where
        Self: Sized + Display,
    {
        let (r, g, b) = theme::status::ERROR.rgb_components();
        format!("{}", self.truecolor(r, g, b))
    }
}

impl<T: OwoColorize + Display> ThemeColorize for T {}

/// Theme color constants and semantic color groupings
pub mod theme {
    use super::Color;

    /// Background elevation hierarchy
    pub mod background {
        use super::Color;

        pub const BASE: Color = Color::rgb(18, 16, 20); // #121014
        pub const ELEVATION_1: Color = Color::rgb(27, 24, 30); // #1B181E
        pub const ELEVATION_2: Color = Color::rgb(37, 33, 41); // #252129
        pub const ELEVATION_3: Color = Color::rgb(48, 43, 53); // #302B35
    }

    /// Brand accents
    pub mod accent {
        use super::Color;

        pub const CORAL: Color = Color::rgb(255, 122, 89); // #FF7A59
        pub const CORAL_SUBTLE: Color = Color::rgba(255, 122, 89, 38); // 15% opacity
        pub const SUNFLOWER: Color = Color::rgb(255, 200, 61); // #FFC83D
    }

    /// Text hierarchy
    pub mod text {
        use super::Color;

        pub const PRIMARY: Color = Color::rgb(240, 236, 244); // #F0ECF4
        pub const SECONDARY: Color = Color::rgb(158, 150, 166); // #9E96A6
        pub const PLACEHOLDER: Color = Color::rgb(101, 94, 108); // #655E6C
    }

    /// Notice colors
    pub mod status {
        use super::Color;

        pub const INFO: Color = Color::rgb(92, 182, 255); // #5CB6FF
        pub const SUCCESS: Color = Color::rgb(61, 214, 140); // #3DD68C
        pub const WARNING: Color = Color::rgb(255, 191, 0); // #FFBF00
        pub const ERROR: Color = Color::rgb(255, 77, 109); // #FF4D6D
    }

    /// Semantic color mapping for common UI elements
    pub mod semantic {
        use super::Color;

        pub const BORDER: Color = super::background::ELEVATION_3;
        pub const FOCUS_RING: Color = super::accent::CORAL;
        pub const SELECTION: Color = super::accent::CORAL_SUBTLE;
        pub const FAVORITE: Color = super::status::ERROR;
        pub const CHIP_ACTIVE: Color = super::accent::SUNFLOWER;

        pub fn selection_text() -> Color {
            super::accent::CORAL.lighten(15.0)
        }
    }

    /// Fixed palette offered when creating a collection
    pub mod collection {
        use super::Color;

        pub const PALETTE: [&str; 8] = [
            "#f0643c", "#e0407f", "#3f63e0", "#2ca85a", "#e08a1e", "#8a4ff0", "#00a99a",
            "#d8452f",
        ];

        /// Resolves a stored collection color; unknown strings fall back to the
        /// first palette entry.
        pub fn resolve(color: &str) -> Color {
            Color::from_hex(color).unwrap_or(Color::rgb(240, 100, 60))
        }
    }
}
