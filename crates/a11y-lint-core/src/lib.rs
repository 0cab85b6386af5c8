//! # a11y-lint-core
//!
//! Static accessibility analysis engine for component markup and style
//! sheets. Nothing is rendered: checks run over source text, style values
//! are resolved symbolically to real colors and findings are scored per
//! analysis unit.
//!
//! This crate provides:
//!
//! - [`Check`] trait implemented by every rule body
//! - [`Registry`] immutable catalog of checks and tiers
//! - [`StyleResolver`] for variables, custom properties and color functions
//! - [`DependencyGraph`] over style imports
//! - [`Runner`] sequential or pooled execution with per-check isolation
//! - [`collapse`] root-cause merging of duplicate findings
//! - [`Scanner`] tying everything into one [`ScanReport`]
//!
//! ## Example
//!
//! ```ignore
//! use a11y_lint_core::{Registry, Scanner, Selection};
//!
//! let registry = Registry::builder().check(MyCheck).build()?;
//! let report = Scanner::new(&registry)
//!     .select(Selection::Tier("quick".into()))
//!     .scan(&collector)?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod check;
mod collapse;
mod config;
mod context;
mod graph;
mod registry;
mod runner;
mod scan;
mod score;
mod types;

/// Style sheet scanning, symbol resolution and contrast math.
pub mod style;

/// Utility modules for check implementations.
pub mod utils;

pub use check::{Check, CheckError, CheckRef};
pub use collapse::{collapse, collapse_issues, message_template};
pub use config::{CheckConfig, Config, ConfigError, ScanConfig, UnitBy};
pub use context::EvalContext;
pub use graph::{import_targets, DependencyGraph};
pub use registry::{
    CheckDefinition, Registry, RegistryBuilder, RegistryError, Selection, FULL_TIER,
};
pub use runner::{
    CancelToken, Coverage, Parallelism, RunError, RunOutput, Runner, RunnerOptions,
};
pub use scan::{CollectError, Collected, ScanError, Scanner, SourceCollector};
pub use score::{audit_unit, score};
pub use style::{
    contrast_ratio, ContrastReport, ResolveError, Rgba, StyleResolver, Value,
    MAX_RESOLUTION_DEPTH,
};
pub use types::{
    AuditResult, CollapsedIssue, ContentType, Distribution, EvaluationResult, Finding, Issue,
    ScanReport, ScoreReport, Severity, SeverityCounts, SourceFile, UnitReport,
    FILE_READ_ERROR_ID,
};
pub use utils::allowance::{AllowCheck, AllowDirective};
