//! # a11y-lint-rules
//!
//! Built-in accessibility checks for a11y-lint.
//!
//! Every check is a stateless value implementing
//! [`Check`](a11y_lint_core::Check). [`builtin_registry`] registers all of
//! them with a configuration applied.
//!
//! ## Available Checks
//!
//! | Code | Id | Type | Weight | Tiers |
//! |------|----|------|--------|-------|
//! | AX001 | `image-alt` | html | 10 | quick, standard |
//! | AX002 | `html-lang` | html | 7 | standard |
//! | AX003 | `control-name` | html | 10 | quick, standard |
//! | AX004 | `form-label` | html | 8 | standard |
//! | AX005 | `aria-role` | html | 6 | standard |
//! | AX101 | `color-contrast` | style | 10 | quick, standard |
//! | AX102 | `color-contrast-enhanced` | style | 3 | |
//! | AX103 | `focus-visible` | style | 7 | standard |
//! | AX104 | `reduced-motion` | style | 5 | standard |
//!
//! Every check is also part of the `full` tier.
//!
//! ## Usage
//!
//! ```ignore
//! use a11y_lint_core::{Config, Scanner};
//! use a11y_lint_rules::builtin_registry;
//!
//! let config = Config::default();
//! let registry = builtin_registry(&config)?;
//! let report = Scanner::from_config(&registry, &config).scan(&files)?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod aria_role;
mod color_contrast;
mod control_name;
mod focus_visible;
mod form_label;
mod html_lang;
mod image_alt;
mod presets;
mod reduced_motion;

pub use aria_role::AriaRole;
pub use color_contrast::{ColorContrast, ColorContrastEnhanced};
pub use control_name::ControlName;
pub use focus_visible::FocusVisible;
pub use form_label::FormLabel;
pub use html_lang::HtmlLang;
pub use image_alt::ImageAlt;
pub use presets::{builtin_checks, builtin_registry, Preset};
pub use reduced_motion::ReducedMotion;

/// Re-export core types for convenience.
pub use a11y_lint_core::{Check, Finding, Severity};
