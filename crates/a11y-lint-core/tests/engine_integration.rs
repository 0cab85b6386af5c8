//! Integration test: engine end-to-end via Scanner.
//!
//! Small checks defined here drive the full collect → graph → resolve →
//! run → collapse → score pipeline over in-memory sources.

use a11y_lint_core::{
    collapse_issues, Check, CheckError, ContentType, ContrastReport, DependencyGraph,
    EvalContext, EvaluationResult, Finding, Issue, Parallelism, Registry, RunnerOptions,
    Scanner, Selection, Severity, SourceFile,
};
use std::path::PathBuf;
use std::time::Duration;

// ── Checks used by the scenarios ──

/// Flags animated rules when nothing in the import closure offers a
/// reduced-motion alternative.
struct MotionCheck;

impl Check for MotionCheck {
    fn id(&self) -> &'static str {
        "motion"
    }
    fn code(&self) -> &'static str {
        "T100"
    }
    fn content_type(&self) -> ContentType {
        ContentType::Style
    }
    fn tiers(&self) -> &'static [&'static str] {
        &["standard"]
    }
    fn evaluate(&self, ctx: &EvalContext<'_>) -> Result<EvaluationResult, CheckError> {
        let animated: Vec<_> = ctx
            .stylesheet()
            .rules()
            .filter_map(|r| r.last("animation"))
            .collect();
        let mut result = EvaluationResult::with_elements(animated.len());
        let guarded = ctx.styles.import_closure(ctx.path).iter().any(|f| {
            ctx.styles.sheet(f).is_some_and(|s| {
                s.blocks
                    .iter()
                    .any(|b| b.selector.contains("prefers-reduced-motion"))
            })
        });
        if !guarded {
            for decl in animated {
                result.push(
                    Finding::new(
                        self.id(),
                        Severity::Error,
                        ctx.path,
                        "Animation has no reduced-motion alternative",
                    )
                    .with_line(decl.line),
                );
            }
        }
        Ok(result)
    }
}

/// Text over background contrast for rules declaring both.
struct ContrastCheck;

impl Check for ContrastCheck {
    fn id(&self) -> &'static str {
        "contrast"
    }
    fn code(&self) -> &'static str {
        "T101"
    }
    fn content_type(&self) -> ContentType {
        ContentType::Style
    }
    fn tiers(&self) -> &'static [&'static str] {
        &["standard"]
    }
    fn evaluate(&self, ctx: &EvalContext<'_>) -> Result<EvaluationResult, CheckError> {
        let mut result = EvaluationResult::not_applicable();
        for rule in ctx.stylesheet().rules() {
            let (Some(fg), Some(bg)) = (rule.last("color"), rule.last("background-color")) else {
                continue;
            };
            let (Ok(fg_color), Ok(bg_color)) = (
                ctx.resolve_color(&fg.value, fg.offset),
                ctx.resolve_color(&bg.value, bg.offset),
            ) else {
                continue;
            };
            result.elements_found += 1;
            let report = ContrastReport::for_text(fg_color, bg_color);
            if !report.passes_aa(false) {
                result.push(
                    Finding::new(
                        self.id(),
                        Severity::Error,
                        ctx.path,
                        format!("Contrast {:.2}:1 is below 4.5:1", report.ratio),
                    )
                    .with_line(bg.line),
                );
            }
        }
        Ok(result)
    }
}

/// Counts `<marker>` elements and raises one error per `bad` attribute.
struct Marker {
    id: &'static str,
    weight: u8,
}

impl Check for Marker {
    fn id(&self) -> &'static str {
        self.id
    }
    fn code(&self) -> &'static str {
        self.id
    }
    fn content_type(&self) -> ContentType {
        ContentType::Html
    }
    fn default_weight(&self) -> u8 {
        self.weight
    }
    fn evaluate(&self, ctx: &EvalContext<'_>) -> Result<EvaluationResult, CheckError> {
        let marker = format!("x-{}", self.id);
        let mut result = EvaluationResult::with_elements(ctx.elements_named(&marker).count());
        for e in ctx.elements_named(&marker).filter(|e| e.has_attr("bad")) {
            result.push(
                Finding::new(self.id, Severity::Error, ctx.path, "bad marker").with_line(e.line),
            );
        }
        Ok(result)
    }
}

/// Panics on files whose content contains `explode`.
struct Fragile;

impl Check for Fragile {
    fn id(&self) -> &'static str {
        "fragile"
    }
    fn code(&self) -> &'static str {
        "T200"
    }
    fn content_type(&self) -> ContentType {
        ContentType::Html
    }
    fn evaluate(&self, ctx: &EvalContext<'_>) -> Result<EvaluationResult, CheckError> {
        assert!(!ctx.content.contains("explode"), "cannot handle this file");
        Ok(EvaluationResult::with_elements(1))
    }
}

fn style(path: &str, unit: &str, content: &str) -> SourceFile {
    SourceFile::new(path, content, ContentType::Style, unit)
}

fn html(path: &str, unit: &str, content: &str) -> SourceFile {
    SourceFile::new(path, content, ContentType::Html, unit)
}

fn style_registry() -> Registry {
    Registry::builder()
        .check(MotionCheck)
        .check(ContrastCheck)
        .build()
        .expect("registry should build")
}

// ── Scenarios ──

#[test]
fn shared_ancestor_collapses_into_one_issue() {
    let files = vec![
        style("card/_motion.scss", "card", "@keyframes spin { to { transform: rotate(1turn); } }"),
        style("card/header.scss", "card", "@use 'motion';\n.header { animation: spin 1s; }"),
        style("card/body.scss", "card", "@use 'motion';\n.body { animation: spin 2s; }"),
    ];
    let registry = style_registry();

    let report = Scanner::new(&registry).scan(&files).expect("scan should succeed");
    let issues = &report.units[0].issues;
    assert_eq!(issues.len(), 1);
    let Issue::Collapsed(issue) = &issues[0] else {
        panic!("expected a collapsed issue, got {issues:?}");
    };
    assert_eq!(issue.ancestor_file, PathBuf::from("card/_motion.scss"));
    assert_eq!(issue.count, 2);
    assert_eq!(
        issue.affected_files,
        vec![PathBuf::from("card/body.scss"), PathBuf::from("card/header.scss")]
    );

    let report = Scanner::new(&registry)
        .collapse(false)
        .scan(&files)
        .expect("scan should succeed");
    assert_eq!(report.units[0].issues.len(), 2);
}

#[test]
fn reduced_motion_in_shared_file_passes() {
    let files = vec![
        style(
            "card/_motion.scss",
            "card",
            "@media (prefers-reduced-motion: reduce) { * { animation: none; } }",
        ),
        style("card/header.scss", "card", "@use 'motion';\n.header { animation: spin 1s; }"),
    ];
    let registry = style_registry();
    let report = Scanner::new(&registry).scan(&files).expect("scan should succeed");
    assert!(report.units[0].issues.is_empty());
    assert_eq!(report.units[0].score.score, Some(100));
}

#[test]
fn lightened_variable_chain_fails_contrast() {
    let files = vec![style(
        "button/button.scss",
        "button",
        "$brand: #1a73e8;\n$primary: $brand;\n$bg: lighten($primary, 10%);\n.btn {\n  color: #fff;\n  background-color: $bg;\n}\n",
    )];
    let registry = style_registry();
    let report = Scanner::new(&registry).scan(&files).expect("scan should succeed");
    let unit = &report.units[0];
    assert_eq!(unit.issues.len(), 1);
    assert_eq!(unit.issues[0].check_id(), "contrast");
    assert!(unit.issues[0].message().starts_with("Contrast 3."));
    let audit = unit.audits.iter().find(|a| a.check_id == "contrast").unwrap();
    assert!(audit.applicable);
    assert!(!audit.passed);
}

#[test]
fn unresolvable_colors_are_not_applicable() {
    let files = vec![style(
        "button/button.scss",
        "button",
        "$a: $b;\n$b: $a;\n.btn { color: #fff; background-color: $a; }\n.x { color: #fff; background-color: $missing; }",
    )];
    let registry = style_registry();
    let report = Scanner::new(&registry).scan(&files).expect("scan should succeed");
    let unit = &report.units[0];
    assert!(unit.issues.is_empty());
    assert!(unit.audits.iter().all(|a| !a.applicable));
    assert_eq!(unit.score.score, None);
    assert_eq!(report.distribution.unscored, 1);
}

#[test]
fn weighted_score_of_three_checks() {
    let registry = Registry::builder()
        .check(Marker { id: "one", weight: 10 })
        .check(Marker { id: "two", weight: 10 })
        .check(Marker { id: "three", weight: 7 })
        .build()
        .expect("registry should build");
    let files = vec![html(
        "card/card.html",
        "card",
        "<x-one></x-one>\n<x-two bad></x-two>\n<x-two bad></x-two>\n<x-three></x-three>",
    )];
    let report = Scanner::new(&registry)
        .select(Selection::Tier("full".into()))
        .scan(&files)
        .expect("scan should succeed");
    let score = &report.units[0].score;
    assert_eq!((score.numerator, score.denominator), (17, 27));
    assert_eq!(score.score, Some(63));
    assert_eq!(report.distribution.fair, 1);
}

#[test]
fn panicking_check_is_isolated() {
    let registry = Registry::builder()
        .check(Fragile)
        .check(Marker { id: "one", weight: 5 })
        .build()
        .expect("registry should build");
    let files = vec![
        html("a/a.html", "a", "<x-one bad></x-one>"),
        html("b/b.html", "b", "<p>explode</p><x-one bad></x-one>"),
        html("c/c.html", "c", "<x-one></x-one>"),
    ];
    let report = Scanner::new(&registry)
        .select(Selection::Tier("full".into()))
        .scan(&files)
        .expect("scan should succeed");

    let issues = report.all_issues();
    let internal: Vec<_> = issues.iter().filter(|i| i.is_internal()).collect();
    assert_eq!(internal.len(), 1);
    assert_eq!(internal[0].check_id(), "fragile");
    assert_eq!(internal[0].files(), vec![std::path::Path::new("b/b.html")]);
    assert_eq!(internal[0].severity(), Severity::Info);

    // The other check still ran on every file.
    let marker_errors = issues.iter().filter(|i| i.check_id() == "one").count();
    assert_eq!(marker_errors, 2);
    assert_eq!(report.units.len(), 3);
    assert_eq!(report.files_checked, 3);
}

// ── Properties ──

fn many_files() -> Vec<SourceFile> {
    let mut files = vec![style("styles/_shared.scss", "shared", "$x: 1;")];
    for i in 0..60 {
        let unit = format!("u{}", i % 7);
        files.push(html(
            &format!("{unit}/f{i}.html"),
            &unit,
            if i % 3 == 0 { "<x-one bad></x-one>" } else { "<x-one></x-one>" },
        ));
        files.push(style(
            &format!("styles/s{i}.scss"),
            &unit,
            "@use 'shared';\n.a { animation: spin 1s; color: #777; background-color: #888; }",
        ));
    }
    files
}

#[test]
fn sequential_and_pooled_runs_agree() {
    let registry = Registry::builder()
        .check(MotionCheck)
        .check(ContrastCheck)
        .check(Marker { id: "one", weight: 5 })
        .build()
        .expect("registry should build");
    let files = many_files();

    let sequential = Scanner::new(&registry)
        .select(Selection::Tier("full".into()))
        .options(RunnerOptions::sequential())
        .scan(&files)
        .expect("scan should succeed");

    for workers in [1, 2, 3, 8] {
        let options = RunnerOptions {
            parallelism: Parallelism::Pool {
                max_workers: Some(workers),
            },
            pool_threshold: 1,
            files_per_worker: 10,
            check_timeout: Duration::from_secs(5),
        };
        let pooled = Scanner::new(&registry)
            .select(Selection::Tier("full".into()))
            .options(options)
            .scan(&files)
            .expect("scan should succeed");
        assert_eq!(pooled.units, sequential.units, "workers = {workers}");
        assert_eq!(pooled.severity_counts, sequential.severity_counts);
    }
}

#[test]
fn collapsing_scan_output_again_changes_nothing() {
    let registry = style_registry();
    let files = many_files();
    let report = Scanner::new(&registry)
        .select(Selection::Tier("full".into()))
        .scan(&files)
        .expect("scan should succeed");
    let graph = DependencyGraph::build(&files);

    for unit in &report.units {
        let again = collapse_issues(unit.issues.clone(), &graph, true);
        assert_eq!(again, unit.issues);
    }
    assert!(report
        .all_issues()
        .iter()
        .any(|i| matches!(i, Issue::Collapsed(c) if c.count > 1)));
}
