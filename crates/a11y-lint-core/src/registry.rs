//! Immutable catalog of checks and their tier membership.

use crate::check::{Check, CheckError, CheckRef};
use crate::config::Config;
use crate::context::EvalContext;
use crate::types::{ContentType, EvaluationResult, Severity};

use miette::Diagnostic;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;

/// Tier that always contains every enabled check.
pub const FULL_TIER: &str = "full";

/// Valid range for check weights.
pub const WEIGHT_RANGE: std::ops::RangeInclusive<u8> = 1..=10;

/// Errors raised while building a registry or selecting checks.
///
/// These are configuration errors: a scan fails with one before any file
/// is processed.
#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum RegistryError {
    /// The requested tier does not exist.
    #[error("unknown tier '{name}'")]
    #[diagnostic(code(a11y_lint::unknown_tier), help("available tiers: {available}"))]
    UnknownTier {
        /// Requested tier.
        name: String,
        /// Comma-separated known tiers.
        available: String,
    },

    /// The requested check id or code does not exist.
    #[error("unknown check '{id}'")]
    #[diagnostic(
        code(a11y_lint::unknown_check),
        help("run `a11y-lint list-checks` to see available checks")
    )]
    UnknownCheck {
        /// Requested id or code.
        id: String,
    },

    /// A configured tier lists a check that is not registered.
    #[error("tier '{tier}' references unknown check '{id}'")]
    #[diagnostic(code(a11y_lint::unknown_tier_member))]
    UnknownTierMember {
        /// Tier name from configuration.
        tier: String,
        /// Unknown check id.
        id: String,
    },

    /// A weight outside 1..=10.
    #[error("check '{id}' has weight {weight}, expected 1..=10")]
    #[diagnostic(code(a11y_lint::invalid_weight))]
    InvalidWeight {
        /// Check id.
        id: String,
        /// Offending weight.
        weight: u8,
    },

    /// Two checks share an id.
    #[error("check '{id}' is registered twice")]
    #[diagnostic(code(a11y_lint::duplicate_check))]
    DuplicateCheck {
        /// Duplicated id.
        id: String,
    },
}

/// What to run: a named tier or a single check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Every check in a tier.
    Tier(String),
    /// One check by id or code, regardless of tiers.
    Check(String),
}

/// A registered check with its effective settings.
///
/// Cheap to clone; the check itself is shared.
#[derive(Clone)]
pub struct CheckDefinition {
    check: CheckRef,
    weight: u8,
    severity_override: Option<Severity>,
    enabled: bool,
}

impl CheckDefinition {
    /// Check id.
    #[must_use]
    pub fn id(&self) -> &'static str {
        self.check.id()
    }

    /// Short code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        self.check.code()
    }

    /// Description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        self.check.description()
    }

    /// Content type the check applies to.
    #[must_use]
    pub fn content_type(&self) -> ContentType {
        self.check.content_type()
    }

    /// Effective weight (1..=10).
    #[must_use]
    pub fn weight(&self) -> u8 {
        self.weight
    }

    /// Configured severity override.
    #[must_use]
    pub fn severity_override(&self) -> Option<Severity> {
        self.severity_override
    }

    /// Whether the check participates in tiers.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The underlying check.
    #[must_use]
    pub fn check(&self) -> &dyn Check {
        self.check.as_ref()
    }

    /// Evaluates the check.
    ///
    /// # Errors
    ///
    /// Propagates the check's own error.
    pub fn evaluate(&self, ctx: &EvalContext<'_>) -> Result<EvaluationResult, CheckError> {
        self.check.evaluate(ctx)
    }
}

impl std::fmt::Debug for CheckDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckDefinition")
            .field("id", &self.id())
            .field("code", &self.code())
            .field("weight", &self.weight)
            .field("severity_override", &self.severity_override)
            .field("enabled", &self.enabled)
            .finish()
    }
}

/// Builder for a [`Registry`].
#[derive(Default)]
pub struct RegistryBuilder {
    checks: Vec<CheckRef>,
    config: Option<Config>,
}

impl RegistryBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a check.
    #[must_use]
    pub fn check<C: Check + 'static>(mut self, check: C) -> Self {
        self.checks.push(Arc::new(check));
        self
    }

    /// Registers a shared check.
    #[must_use]
    pub fn check_ref(mut self, check: CheckRef) -> Self {
        self.checks.push(check);
        self
    }

    /// Registers several shared checks.
    #[must_use]
    pub fn checks(mut self, checks: impl IntoIterator<Item = CheckRef>) -> Self {
        self.checks.extend(checks);
        self
    }

    /// Applies per-check settings and extra tiers from configuration.
    #[must_use]
    pub fn config(mut self, config: &Config) -> Self {
        self.config = Some(config.clone());
        self
    }

    /// Builds the registry and precomputes tier membership.
    ///
    /// # Errors
    ///
    /// Returns a [`RegistryError`] for duplicate ids, out-of-range weights
    /// and configured tiers naming unknown checks.
    pub fn build(self) -> Result<Registry, RegistryError> {
        let config = self.config.unwrap_or_default();
        let mut definitions = Vec::with_capacity(self.checks.len());
        let mut index = HashMap::new();

        for check in self.checks {
            let id = check.id();
            if index.insert(id.to_string(), definitions.len()).is_some() {
                return Err(RegistryError::DuplicateCheck { id: id.to_string() });
            }
            let weight = config
                .check_weight(id)
                .unwrap_or_else(|| check.default_weight());
            if !WEIGHT_RANGE.contains(&weight) {
                return Err(RegistryError::InvalidWeight {
                    id: id.to_string(),
                    weight,
                });
            }
            definitions.push(CheckDefinition {
                weight,
                severity_override: config.check_severity(id),
                enabled: config.is_check_enabled(id),
                check,
            });
        }

        let mut tiers: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        tiers.insert(FULL_TIER.to_string(), Vec::new());
        for (i, def) in definitions.iter().enumerate() {
            if !def.enabled {
                continue;
            }
            for tier in def.check.tiers() {
                tiers.entry((*tier).to_string()).or_default().push(i);
            }
            tiers.entry(FULL_TIER.to_string()).or_default().push(i);
        }
        for (tier, ids) in &config.tiers {
            let members = tiers.entry(tier.clone()).or_default();
            for id in ids {
                let i = *index.get(id).ok_or_else(|| RegistryError::UnknownTierMember {
                    tier: tier.clone(),
                    id: id.clone(),
                })?;
                if definitions[i].enabled {
                    members.push(i);
                }
            }
        }
        for members in tiers.values_mut() {
            members.sort_unstable();
            members.dedup();
        }

        debug!(
            "Registry loaded: {} check(s), {} tier(s)",
            definitions.len(),
            tiers.len()
        );
        Ok(Registry {
            definitions,
            index,
            tiers,
        })
    }
}

/// Immutable catalog of check definitions.
///
/// Built once and shared by reference; never mutated after construction.
#[derive(Debug)]
pub struct Registry {
    definitions: Vec<CheckDefinition>,
    index: HashMap<String, usize>,
    tiers: BTreeMap<String, Vec<usize>>,
}

impl Registry {
    /// Creates a new builder.
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Builds a registry from checks and configuration.
    ///
    /// # Errors
    ///
    /// See [`RegistryBuilder::build`].
    pub fn load(
        checks: impl IntoIterator<Item = CheckRef>,
        config: &Config,
    ) -> Result<Self, RegistryError> {
        Self::builder().checks(checks).config(config).build()
    }

    /// All definitions in registration order.
    #[must_use]
    pub fn definitions(&self) -> &[CheckDefinition] {
        &self.definitions
    }

    /// Looks up a definition by id or code (codes are case-insensitive).
    #[must_use]
    pub fn get(&self, id_or_code: &str) -> Option<&CheckDefinition> {
        self.index
            .get(id_or_code)
            .map(|&i| &self.definitions[i])
            .or_else(|| {
                self.definitions
                    .iter()
                    .find(|d| d.code().eq_ignore_ascii_case(id_or_code))
            })
    }

    /// Tier names in sorted order.
    pub fn tier_names(&self) -> impl Iterator<Item = &str> {
        self.tiers.keys().map(String::as_str)
    }

    /// Tiers a check belongs to.
    #[must_use]
    pub fn tiers_of(&self, id: &str) -> Vec<&str> {
        let Some(&i) = self.index.get(id) else {
            return Vec::new();
        };
        self.tiers
            .iter()
            .filter(|(_, members)| members.binary_search(&i).is_ok())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Number of registered checks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Returns true if no checks are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Selects the checks to run.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownTier`] or [`RegistryError::UnknownCheck`].
    pub fn select(&self, selection: &Selection) -> Result<Vec<CheckDefinition>, RegistryError> {
        match selection {
            Selection::Tier(name) => {
                let members =
                    self.tiers
                        .get(name)
                        .ok_or_else(|| RegistryError::UnknownTier {
                            name: name.clone(),
                            available: self.tier_names().collect::<Vec<_>>().join(", "),
                        })?;
                Ok(members.iter().map(|&i| self.definitions[i].clone()).collect())
            }
            Selection::Check(id) => self
                .get(id)
                .cloned()
                .map(|d| vec![d])
                .ok_or_else(|| RegistryError::UnknownCheck { id: id.clone() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CheckConfig;

    struct Fake {
        id: &'static str,
        code: &'static str,
        weight: u8,
        tiers: &'static [&'static str],
    }

    impl Check for Fake {
        fn id(&self) -> &'static str {
            self.id
        }
        fn code(&self) -> &'static str {
            self.code
        }
        fn content_type(&self) -> ContentType {
            ContentType::Html
        }
        fn default_weight(&self) -> u8 {
            self.weight
        }
        fn tiers(&self) -> &'static [&'static str] {
            self.tiers
        }
        fn evaluate(&self, _ctx: &EvalContext<'_>) -> Result<EvaluationResult, CheckError> {
            Ok(EvaluationResult::not_applicable())
        }
    }

    fn fake(id: &'static str, code: &'static str, tiers: &'static [&'static str]) -> Fake {
        Fake {
            id,
            code,
            weight: 5,
            tiers,
        }
    }

    fn registry() -> Registry {
        Registry::builder()
            .check(fake("alpha", "T001", &["quick", "standard"]))
            .check(fake("beta", "T002", &["standard"]))
            .check(fake("gamma", "T003", &[]))
            .build()
            .unwrap()
    }

    fn ids(defs: &[CheckDefinition]) -> Vec<&'static str> {
        defs.iter().map(CheckDefinition::id).collect()
    }

    #[test]
    fn test_tiers_are_precomputed() {
        let r = registry();
        let tier = |t: &str| ids(&r.select(&Selection::Tier(t.into())).unwrap());
        assert_eq!(tier("quick"), vec!["alpha"]);
        assert_eq!(tier("standard"), vec!["alpha", "beta"]);
        assert_eq!(tier("full"), vec!["alpha", "beta", "gamma"]);
        assert_eq!(r.tiers_of("alpha"), vec!["full", "quick", "standard"]);
    }

    #[test]
    fn test_single_check_bypasses_tiers() {
        let r = registry();
        assert_eq!(ids(&r.select(&Selection::Check("gamma".into())).unwrap()), vec!["gamma"]);
        assert_eq!(ids(&r.select(&Selection::Check("t002".into())).unwrap()), vec!["beta"]);
    }

    #[test]
    fn test_unknown_selection_is_an_error() {
        let r = registry();
        let err = r.select(&Selection::Tier("nightly".into())).unwrap_err();
        assert!(matches!(err, RegistryError::UnknownTier { .. }));
        assert_eq!(err.to_string(), "unknown tier 'nightly'");

        let err = r.select(&Selection::Check("delta".into())).unwrap_err();
        assert!(matches!(err, RegistryError::UnknownCheck { .. }));
    }

    #[test]
    fn test_duplicate_and_weight_validation() {
        let err = Registry::builder()
            .check(fake("alpha", "T001", &[]))
            .check(fake("alpha", "T009", &[]))
            .build()
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateCheck { .. }));

        let err = Registry::builder()
            .check(Fake {
                id: "heavy",
                code: "T004",
                weight: 11,
                tiers: &[],
            })
            .build()
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidWeight { weight: 11, .. }));
    }

    #[test]
    fn test_config_overrides() {
        let mut config = Config::default();
        config.checks.insert(
            "beta".into(),
            CheckConfig {
                enabled: Some(false),
                severity: None,
                weight: None,
            },
        );
        config.checks.insert(
            "alpha".into(),
            CheckConfig {
                enabled: None,
                severity: Some(Severity::Warning),
                weight: Some(9),
            },
        );
        config.tiers.insert("ci".into(), vec!["gamma".into()]);

        let r = Registry::builder()
            .check(fake("alpha", "T001", &["quick", "standard"]))
            .check(fake("beta", "T002", &["standard"]))
            .check(fake("gamma", "T003", &[]))
            .config(&config)
            .build()
            .unwrap();

        assert_eq!(ids(&r.select(&Selection::Tier("standard".into())).unwrap()), vec!["alpha"]);
        assert_eq!(ids(&r.select(&Selection::Tier("full".into())).unwrap()), vec!["alpha", "gamma"]);
        assert_eq!(ids(&r.select(&Selection::Tier("ci".into())).unwrap()), vec!["gamma"]);
        let alpha = r.get("alpha").unwrap();
        assert_eq!(alpha.weight(), 9);
        assert_eq!(alpha.severity_override(), Some(Severity::Warning));
        // Disabled checks can still be selected explicitly.
        assert_eq!(ids(&r.select(&Selection::Check("beta".into())).unwrap()), vec!["beta"]);
    }

    #[test]
    fn test_disabled_check_leaves_configured_tier() {
        let mut config = Config::default();
        config.checks.insert(
            "alpha".into(),
            CheckConfig {
                enabled: Some(false),
                severity: None,
                weight: None,
            },
        );
        config.tiers.insert("ci".into(), vec!["alpha".into(), "gamma".into()]);
        config.tiers.insert("solo".into(), vec!["alpha".into()]);

        let r = Registry::builder()
            .check(fake("alpha", "T001", &["quick"]))
            .check(fake("gamma", "T003", &[]))
            .config(&config)
            .build()
            .unwrap();

        assert_eq!(ids(&r.select(&Selection::Tier("ci".into())).unwrap()), vec!["gamma"]);
        assert!(r.select(&Selection::Tier("solo".into())).unwrap().is_empty());
        assert!(r.tiers_of("alpha").is_empty());
    }

    #[test]
    fn test_config_tier_with_unknown_member() {
        let mut config = Config::default();
        config.tiers.insert("ci".into(), vec!["nope".into()]);
        let err = Registry::builder()
            .check(fake("alpha", "T001", &[]))
            .config(&config)
            .build()
            .unwrap_err();
        assert!(matches!(err, RegistryError::UnknownTierMember { .. }));
    }
}
