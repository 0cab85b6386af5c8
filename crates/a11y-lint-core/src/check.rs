//! The check capability implemented by every rule body.

use crate::context::EvalContext;
use crate::types::{ContentType, EvaluationResult, Severity};
use std::sync::Arc;

/// Errors a check may report instead of a result.
///
/// The runner converts these (and panics) into an `info` internal-error
/// finding for the (file, check) pair; they never abort a scan.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    /// The check could not evaluate the content.
    #[error("{0}")]
    Failed(String),

    /// The check observed that its deadline passed and gave up.
    #[error("check exceeded its time budget")]
    DeadlineExceeded,
}

/// A declarative accessibility check over one source file.
///
/// Implement this trait to add a rule. Checks are registered explicitly in
/// a [`Registry`](crate::Registry) and must be stateless: one instance is
/// shared by every worker of a scan.
///
/// # Example
///
/// ```ignore
/// use a11y_lint_core::{Check, CheckError, ContentType, EvalContext, EvaluationResult};
///
/// pub struct NoMarquee;
///
/// impl Check for NoMarquee {
///     fn id(&self) -> &'static str { "no-marquee" }
///     fn code(&self) -> &'static str { "AX900" }
///     fn content_type(&self) -> ContentType { ContentType::Html }
///
///     fn evaluate(&self, ctx: &EvalContext<'_>) -> Result<EvaluationResult, CheckError> {
///         let marquees = ctx.elements().into_iter().filter(|e| e.name == "marquee");
///         // ...
///     }
/// }
/// ```
pub trait Check: Send + Sync {
    /// Returns the kebab-case id of this check (e.g., "image-alt").
    fn id(&self) -> &'static str;

    /// Returns the short code of this check (e.g., "AX001").
    fn code(&self) -> &'static str;

    /// Returns a brief description of what this check verifies.
    fn description(&self) -> &'static str {
        ""
    }

    /// Content type this check applies to.
    fn content_type(&self) -> ContentType;

    /// Importance used in score aggregation (1..=10).
    fn default_weight(&self) -> u8 {
        5
    }

    /// Built-in tiers this check belongs to. Every check is always part of
    /// the `full` tier, whether or not it lists it here.
    fn tiers(&self) -> &'static [&'static str] {
        &[]
    }

    /// Severity used for the findings this check raises.
    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    /// Evaluates one file.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckError`] when the content cannot be evaluated.
    fn evaluate(&self, ctx: &EvalContext<'_>) -> Result<EvaluationResult, CheckError>;
}

/// Shared handle to a check.
pub type CheckRef = Arc<dyn Check>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Finding;

    struct TestCheck;

    impl Check for TestCheck {
        fn id(&self) -> &'static str {
            "test-check"
        }
        fn code(&self) -> &'static str {
            "TEST001"
        }
        fn description(&self) -> &'static str {
            "A test check"
        }
        fn content_type(&self) -> ContentType {
            ContentType::Html
        }

        fn evaluate(&self, ctx: &EvalContext<'_>) -> Result<EvaluationResult, CheckError> {
            let mut result = EvaluationResult::with_elements(1);
            result.push(Finding::new(
                self.id(),
                self.default_severity(),
                ctx.path,
                "Test finding",
            ));
            Ok(result)
        }
    }

    #[test]
    fn test_check_defaults() {
        let check = TestCheck;
        assert_eq!(check.id(), "test-check");
        assert_eq!(check.code(), "TEST001");
        assert_eq!(check.default_severity(), Severity::Error);
        assert_eq!(check.default_weight(), 5);
        assert!(check.tiers().is_empty());
    }

    #[test]
    fn test_check_error_display() {
        assert_eq!(CheckError::Failed("bad".into()).to_string(), "bad");
        assert_eq!(
            CheckError::DeadlineExceeded.to_string(),
            "check exceeded its time budget"
        );
    }
}
