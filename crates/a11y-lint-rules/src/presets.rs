//! Built-in check sets and the default registry.

use crate::{
    AriaRole, ColorContrast, ColorContrastEnhanced, ControlName, FocusVisible, FormLabel,
    HtmlLang, ImageAlt, ReducedMotion,
};
use a11y_lint_core::{CheckRef, Config, Registry, RegistryError, Selection, FULL_TIER};
use std::sync::Arc;

/// Built-in tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// High-impact checks only.
    Quick,
    /// The default tier for everyday scans.
    Standard,
    /// Every registered check.
    Full,
}

impl Preset {
    /// Tier name as used in configuration and on the command line.
    #[must_use]
    pub fn tier(self) -> &'static str {
        match self {
            Self::Quick => "quick",
            Self::Standard => "standard",
            Self::Full => FULL_TIER,
        }
    }

    /// Selection for this tier.
    #[must_use]
    pub fn selection(self) -> Selection {
        Selection::Tier(self.tier().to_string())
    }

    /// Built-in checks that belong to this tier.
    #[must_use]
    pub fn checks(self) -> Vec<CheckRef> {
        builtin_checks()
            .into_iter()
            .filter(|c| self == Self::Full || c.tiers().contains(&self.tier()))
            .collect()
    }
}

/// Every built-in check, in code order.
#[must_use]
pub fn builtin_checks() -> Vec<CheckRef> {
    vec![
        Arc::new(ImageAlt::new()),
        Arc::new(HtmlLang::new()),
        Arc::new(ControlName::new()),
        Arc::new(FormLabel::new()),
        Arc::new(AriaRole::new()),
        Arc::new(ColorContrast::new()),
        Arc::new(ColorContrastEnhanced::new()),
        Arc::new(FocusVisible::new()),
        Arc::new(ReducedMotion::new()),
    ]
}

/// Registry of every built-in check with `config` applied.
///
/// # Errors
///
/// Returns a [`RegistryError`] when the configuration references unknown
/// checks or sets an invalid weight.
pub fn builtin_registry(config: &Config) -> Result<Registry, RegistryError> {
    Registry::load(builtin_checks(), config)
}
