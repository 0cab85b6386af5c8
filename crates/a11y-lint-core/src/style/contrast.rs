//! WCAG relative luminance and contrast ratio.
//!
//! - AA: 4.5:1 for normal text, 3:1 for large text
//! - AAA: 7:1 for normal text, 4.5:1 for large text

use super::color::Rgba;
use serde::{Deserialize, Serialize};

/// AA minimum for normal text.
pub const AA_NORMAL: f64 = 4.5;
/// AA minimum for large text.
pub const AA_LARGE: f64 = 3.0;
/// AAA minimum for normal text.
pub const AAA_NORMAL: f64 = 7.0;
/// AAA minimum for large text.
pub const AAA_LARGE: f64 = 4.5;

/// Relative luminance per WCAG 2.x.
/// <https://www.w3.org/TR/WCAG21/#dfn-relative-luminance>
#[must_use]
pub fn relative_luminance(color: Rgba) -> f64 {
    let linear = [color.r, color.g, color.b].map(|c| {
        let v = f64::from(c) / 255.0;
        if v <= 0.040_45 {
            v / 12.92
        } else {
            ((v + 0.055) / 1.055).powf(2.4)
        }
    });
    0.2126 * linear[0] + 0.7152 * linear[1] + 0.0722 * linear[2]
}

/// Contrast ratio between two colors, always >= 1.0 and symmetric.
///
/// Translucent colors are flattened over white on their own; use
/// [`ContrastReport::for_text`] to layer text over its background first.
#[must_use]
pub fn contrast_ratio(a: Rgba, b: Rgba) -> f64 {
    let l1 = relative_luminance(a.over(Rgba::WHITE));
    let l2 = relative_luminance(b.over(Rgba::WHITE));
    let (lighter, darker) = if l1 >= l2 { (l1, l2) } else { (l2, l1) };
    (lighter + 0.05) / (darker + 0.05)
}

/// A contrast ratio with its pass/fail against each WCAG threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContrastReport {
    /// The ratio itself.
    pub ratio: f64,
    /// Passes AA for normal text (4.5:1).
    pub aa_normal: bool,
    /// Passes AA for large text (3:1).
    pub aa_large: bool,
    /// Passes AAA for normal text (7:1).
    pub aaa_normal: bool,
    /// Passes AAA for large text (4.5:1).
    pub aaa_large: bool,
}

impl ContrastReport {
    /// Evaluates text over a background: the background is flattened over
    /// white, then the text color over the flattened background.
    #[must_use]
    pub fn for_text(foreground: Rgba, background: Rgba) -> Self {
        let bg = background.over(Rgba::WHITE);
        Self::evaluate(foreground.over(bg), bg)
    }

    /// Evaluates a color pair against every threshold.
    #[must_use]
    pub fn evaluate(foreground: Rgba, background: Rgba) -> Self {
        let ratio = contrast_ratio(foreground, background);
        Self {
            ratio,
            aa_normal: ratio >= AA_NORMAL,
            aa_large: ratio >= AA_LARGE,
            aaa_normal: ratio >= AAA_NORMAL,
            aaa_large: ratio >= AAA_LARGE,
        }
    }

    /// AA pass/fail for the given text size.
    #[must_use]
    pub fn passes_aa(&self, large_text: bool) -> bool {
        if large_text {
            self.aa_large
        } else {
            self.aa_normal
        }
    }

    /// AAA pass/fail for the given text size.
    #[must_use]
    pub fn passes_aaa(&self, large_text: bool) -> bool {
        if large_text {
            self.aaa_large
        } else {
            self.aaa_normal
        }
    }
}
