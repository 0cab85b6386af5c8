//! Color values and the closed-form transforms applied by color functions.

use serde::{Deserialize, Serialize};

/// A resolved color: RGB channels in 0..=255, alpha in 0.0..=1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: f64,
}

/// The same color in HSL space: hue in degrees, saturation and lightness in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    /// Hue, 0..360.
    pub h: f64,
    /// Saturation, 0..=100.
    pub s: f64,
    /// Lightness, 0..=100.
    pub l: f64,
}

impl Rgba {
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    /// Creates an opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Returns the same color with a new alpha (clamped to 0..=1).
    #[must_use]
    pub fn with_alpha(self, a: f64) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Returns true if the color is fully opaque.
    #[must_use]
    pub fn is_opaque(&self) -> bool {
        self.a >= 1.0
    }

    /// Parses a hex literal (`#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`).
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#')?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let expand = |s: &str| u8::from_str_radix(&s.repeat(2), 16).ok();
        let pair = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            3 | 4 => {
                let r = expand(&hex[0..1])?;
                let g = expand(&hex[1..2])?;
                let b = expand(&hex[2..3])?;
                let a = if hex.len() == 4 {
                    f64::from(expand(&hex[3..4])?) / 255.0
                } else {
                    1.0
                };
                Some(Self { r, g, b, a })
            }
            6 | 8 => {
                let r = pair(&hex[0..2])?;
                let g = pair(&hex[2..4])?;
                let b = pair(&hex[4..6])?;
                let a = if hex.len() == 8 {
                    f64::from(pair(&hex[6..8])?) / 255.0
                } else {
                    1.0
                };
                Some(Self { r, g, b, a })
            }
            _ => None,
        }
    }

    /// Looks up a CSS named color.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let c = match name.to_ascii_lowercase().as_str() {
            "transparent" => return Some(Self::BLACK.with_alpha(0.0)),
            "white" => (255, 255, 255),
            "black" => (0, 0, 0),
            "red" => (255, 0, 0),
            "green" => (0, 128, 0),
            "blue" => (0, 0, 255),
            "yellow" => (255, 255, 0),
            "gray" | "grey" => (128, 128, 128),
            "darkgray" | "darkgrey" => (169, 169, 169),
            "lightgray" | "lightgrey" => (211, 211, 211),
            "dimgray" | "dimgrey" => (105, 105, 105),
            "gainsboro" => (220, 220, 220),
            "whitesmoke" => (245, 245, 245),
            "silver" => (192, 192, 192),
            "maroon" => (128, 0, 0),
            "olive" => (128, 128, 0),
            "lime" => (0, 255, 0),
            "aqua" | "cyan" => (0, 255, 255),
            "teal" => (0, 128, 128),
            "navy" => (0, 0, 128),
            "fuchsia" | "magenta" => (255, 0, 255),
            "purple" => (128, 0, 128),
            "orange" => (255, 165, 0),
            "darkorange" => (255, 140, 0),
            "gold" => (255, 215, 0),
            "pink" => (255, 192, 203),
            "hotpink" => (255, 105, 180),
            "crimson" => (220, 20, 60),
            "tomato" => (255, 99, 71),
            "coral" => (255, 127, 80),
            "salmon" => (250, 128, 114),
            "brown" => (165, 42, 42),
            "tan" => (210, 180, 140),
            "beige" => (245, 245, 220),
            "ivory" => (255, 255, 240),
            "khaki" => (240, 230, 140),
            "indigo" => (75, 0, 130),
            "violet" => (238, 130, 238),
            "orchid" => (218, 112, 214),
            "plum" => (221, 160, 221),
            "lavender" => (230, 230, 250),
            "skyblue" => (135, 206, 235),
            "lightblue" => (173, 216, 230),
            "steelblue" => (70, 130, 180),
            "royalblue" => (65, 105, 225),
            "dodgerblue" => (30, 144, 255),
            "darkblue" => (0, 0, 139),
            "darkgreen" => (0, 100, 0),
            "forestgreen" => (34, 139, 34),
            "seagreen" => (46, 139, 87),
            "lightgreen" => (144, 238, 144),
            "darkred" => (139, 0, 0),
            "firebrick" => (178, 34, 34),
            "slategray" | "slategrey" => (112, 128, 144),
            "rebeccapurple" => (102, 51, 153),
            _ => return None,
        };
        Some(Self::rgb(c.0, c.1, c.2))
    }

    /// Converts to HSL.
    #[must_use]
    pub fn to_hsl(self) -> Hsl {
        let r = f64::from(self.r) / 255.0;
        let g = f64::from(self.g) / 255.0;
        let b = f64::from(self.b) / 255.0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;
        let d = max - min;
        if d.abs() < f64::EPSILON {
            return Hsl {
                h: 0.0,
                s: 0.0,
                l: l * 100.0,
            };
        }
        let s = d / (1.0 - (2.0 * l - 1.0).abs());
        let h = if (max - r).abs() < f64::EPSILON {
            60.0 * (((g - b) / d).rem_euclid(6.0))
        } else if (max - g).abs() < f64::EPSILON {
            60.0 * ((b - r) / d + 2.0)
        } else {
            60.0 * ((r - g) / d + 4.0)
        };
        Hsl {
            h: h.rem_euclid(360.0),
            s: s * 100.0,
            l: l * 100.0,
        }
    }

    /// Builds a color from HSL with the given alpha.
    #[must_use]
    pub fn from_hsl(hsl: Hsl, a: f64) -> Self {
        let h = hsl.h.rem_euclid(360.0);
        let s = hsl.s.clamp(0.0, 100.0) / 100.0;
        let l = hsl.l.clamp(0.0, 100.0) / 100.0;
        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = c * (1.0 - ((h / 60.0).rem_euclid(2.0) - 1.0).abs());
        let m = l - c / 2.0;
        let (r, g, b) = match h {
            h if h < 60.0 => (c, x, 0.0),
            h if h < 120.0 => (x, c, 0.0),
            h if h < 180.0 => (0.0, c, x),
            h if h < 240.0 => (0.0, x, c),
            h if h < 300.0 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        Self {
            r: unit_to_channel(r + m),
            g: unit_to_channel(g + m),
            b: unit_to_channel(b + m),
            a: a.clamp(0.0, 1.0),
        }
    }

    /// Adds `amount` percentage points to the HSL lightness, clamped to 0..=100.
    #[must_use]
    pub fn adjust_lightness(self, amount: f64) -> Self {
        let mut hsl = self.to_hsl();
        hsl.l = (hsl.l + amount).clamp(0.0, 100.0);
        Self::from_hsl(hsl, self.a)
    }

    /// Adds `amount` percentage points to the HSL saturation, clamped to 0..=100.
    #[must_use]
    pub fn adjust_saturation(self, amount: f64) -> Self {
        let mut hsl = self.to_hsl();
        hsl.s = (hsl.s + amount).clamp(0.0, 100.0);
        Self::from_hsl(hsl, self.a)
    }

    /// Rotates the hue by `degrees`, modulo 360.
    #[must_use]
    pub fn adjust_hue(self, degrees: f64) -> Self {
        let mut hsl = self.to_hsl();
        hsl.h = (hsl.h + degrees).rem_euclid(360.0);
        Self::from_hsl(hsl, self.a)
    }

    /// Inverts each RGB channel.
    #[must_use]
    pub fn invert(self) -> Self {
        Self {
            r: 255 - self.r,
            g: 255 - self.g,
            b: 255 - self.b,
            a: self.a,
        }
    }

    /// Linear interpolation: `weight` (0..=1) of `self`, the rest of `other`.
    #[must_use]
    pub fn mix(self, other: Self, weight: f64) -> Self {
        let w = weight.clamp(0.0, 1.0);
        let lerp = |a: u8, b: u8| unit_to_channel((f64::from(a) * w + f64::from(b) * (1.0 - w)) / 255.0);
        Self {
            r: lerp(self.r, other.r),
            g: lerp(self.g, other.g),
            b: lerp(self.b, other.b),
            a: self.a * w + other.a * (1.0 - w),
        }
    }

    /// Composites this color over an opaque backdrop.
    #[must_use]
    pub fn over(self, backdrop: Self) -> Self {
        if self.is_opaque() {
            return self;
        }
        let a = self.a;
        let blend = |fg: u8, bg: u8| {
            unit_to_channel((f64::from(fg) * a + f64::from(bg) * (1.0 - a)) / 255.0)
        };
        Self::rgb(
            blend(self.r, backdrop.r),
            blend(self.g, backdrop.g),
            blend(self.b, backdrop.b),
        )
    }
}

impl std::fmt::Display for Rgba {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_opaque() {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "rgba({}, {}, {}, {:.2})", self.r, self.g, self.b, self.a)
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn unit_to_channel(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}
