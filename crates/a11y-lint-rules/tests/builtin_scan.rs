//! Integration test: built-in checks through the full scan pipeline.

use a11y_lint_core::{Config, ContentType, Issue, Scanner, Selection, Severity, SourceFile};
use a11y_lint_rules::{builtin_registry, Preset};
use std::path::PathBuf;

fn style(path: &str, unit: &str, content: &str) -> SourceFile {
    SourceFile::new(path, content, ContentType::Style, unit)
}

fn html(path: &str, unit: &str, content: &str) -> SourceFile {
    SourceFile::new(path, content, ContentType::Html, unit)
}

const CHECKOUT_FORM: &str = r#"<form>
  <label for="email">Email</label>
  <input id="email" type="email">
  <input type="text" name="coupon">
  <button type="submit">Pay</button>
</form>
"#;

#[test]
fn lightened_brand_color_fails_contrast() {
    let files = vec![style(
        "theme/button.scss",
        "theme",
        "$brand: #1a73e8;\n$primary: $brand;\n$bg: lighten($primary, 10%);\n.btn {\n  color: #fff;\n  background-color: $bg;\n}\n",
    )];
    let registry = builtin_registry(&Config::default()).expect("valid registry");
    let report = Scanner::new(&registry).scan(&files).expect("scan should succeed");

    let unit = &report.units[0];
    assert_eq!(unit.issues.len(), 1);
    let Issue::Single(finding) = &unit.issues[0] else {
        panic!("expected a single issue, got {:?}", unit.issues);
    };
    assert_eq!(finding.check_id, "color-contrast");
    assert_eq!(finding.severity, Severity::Error);
    assert_eq!(finding.line, Some(5));
    assert!(finding.message.starts_with("Text color #ffffff on #"), "{}", finding.message);
    assert!(finding.message.ends_with("(needs 4.5:1)"), "{}", finding.message);

    assert_eq!(unit.score.score, Some(0));
    assert_eq!(report.distribution.poor, 1);
    assert!(report.has_failures());
}

#[test]
fn deeply_nested_style_value_does_not_abort_scan() {
    let nested = format!("{}#000{}", "lighten(".repeat(20_000), ", 1%)".repeat(20_000));
    let files = vec![style(
        "theme/deep.scss",
        "theme",
        &format!(
            ".a {{ color: {nested}; background-color: #fff; }}\n.b {{ color: #999; background-color: #fff; }}\n"
        ),
    )];
    let registry = builtin_registry(&Config::default()).expect("valid registry");
    let report = Scanner::new(&registry).scan(&files).expect("scan should succeed");

    let issues = report.all_issues();
    assert_eq!(issues.len(), 1, "{issues:?}");
    let Issue::Single(finding) = issues[0] else {
        panic!("expected a single issue, got {issues:?}");
    };
    assert_eq!(finding.check_id, "color-contrast");
    assert_eq!(finding.line, Some(2));
}

#[test]
fn shared_token_failure_collapses_to_token_file() {
    let files = vec![
        style("styles/_tokens.scss", "tokens", "$muted: #999;\n$surface: #fff;\n"),
        style(
            "styles/alert.scss",
            "alert",
            "@use 'tokens';\n.alert { color: $muted; background-color: $surface; }\n",
        ),
        style(
            "styles/badge.scss",
            "badge",
            "@use 'tokens';\n.badge { color: $muted; background-color: $surface; }\n",
        ),
    ];
    let registry = builtin_registry(&Config::default()).expect("valid registry");
    let report = Scanner::new(&registry).scan(&files).expect("scan should succeed");

    let issues = report.all_issues();
    assert_eq!(issues.len(), 1);
    let Issue::Collapsed(issue) = issues[0] else {
        panic!("expected a collapsed issue, got {issues:?}");
    };
    assert_eq!(issue.check_id, "color-contrast");
    assert_eq!(issue.ancestor_file, PathBuf::from("styles/_tokens.scss"));
    assert_eq!(issue.count, 2);
    assert_eq!(
        issue.affected_files,
        vec![PathBuf::from("styles/alert.scss"), PathBuf::from("styles/badge.scss")]
    );
    assert_eq!(
        issue.message,
        "Text color #999999 on #ffffff has contrast 2.85:1 (needs 4.5:1)"
    );
    assert_eq!(report.severity_counts.errors, 1);

    let scores: Vec<(&str, Option<u32>)> = report
        .units
        .iter()
        .map(|u| (u.unit_id.as_str(), u.score.score))
        .collect();
    assert_eq!(scores, [("alert", Some(0)), ("badge", Some(0)), ("tokens", None)]);
    assert_eq!(report.distribution.unscored, 1);

    let report = Scanner::new(&registry)
        .collapse(false)
        .scan(&files)
        .expect("scan should succeed");
    assert_eq!(report.all_issues().len(), 2);
}

#[test]
fn mixed_unit_is_weighted_across_markup_and_styles() {
    let files = vec![
        html("checkout/form.html", "checkout", CHECKOUT_FORM),
        style(
            "checkout/form.scss",
            "checkout",
            ".pay { color: #1a1a1a; background-color: #ffffff; }\n",
        ),
    ];
    let registry = builtin_registry(&Config::default()).expect("valid registry");

    // control-name (10) and color-contrast (10) pass, form-label (8) fails.
    let report = Scanner::new(&registry).scan(&files).expect("scan should succeed");
    let unit = &report.units[0];
    assert_eq!((unit.score.numerator, unit.score.denominator), (20, 28));
    assert_eq!(unit.score.score, Some(71));
    assert_eq!(report.distribution.good, 1);
    let failed: Vec<&str> = unit
        .audits
        .iter()
        .filter(|a| a.applicable && !a.passed)
        .map(|a| a.check_id.as_str())
        .collect();
    assert_eq!(failed, ["form-label"]);
    assert_eq!(unit.issues[0].message(), "Form field <input type=\"text\"> has no label");

    // form-label is not part of the quick tier.
    let report = Scanner::new(&registry)
        .select(Preset::Quick.selection())
        .scan(&files)
        .expect("scan should succeed");
    assert_eq!(report.units[0].score.score, Some(100));
}

#[test]
fn allow_directive_suppresses_finding() {
    let allowed = CHECKOUT_FORM.replace(
        "  <input type=\"text\" name=\"coupon\">",
        "  <!-- a11y-lint: allow(form-label) reason=\"label rendered by script\" -->\n  <input type=\"text\" name=\"coupon\">",
    );
    let files = vec![html("checkout/form.html", "checkout", &allowed)];
    let registry = builtin_registry(&Config::default()).expect("valid registry");
    let report = Scanner::new(&registry)
        .select(Selection::Check("form-label".to_string()))
        .scan(&files)
        .expect("scan should succeed");
    assert!(report.units[0].issues.is_empty());
    assert_eq!(report.units[0].score.score, Some(100));
}

#[test]
fn configured_tier_and_weight_apply() {
    let config = Config::parse(
        r#"
[scan]
tier = "forms"

[tiers]
forms = ["form-label", "control-name"]

[checks.form-label]
weight = 2
"#,
    )
    .expect("valid config");
    let registry = builtin_registry(&config).expect("valid registry");
    let files = vec![html("checkout/form.html", "checkout", CHECKOUT_FORM)];
    let report = Scanner::from_config(&registry, &config)
        .scan(&files)
        .expect("scan should succeed");
    let score = &report.units[0].score;
    assert_eq!((score.numerator, score.denominator), (10, 12));
    assert_eq!(score.score, Some(83));
}
