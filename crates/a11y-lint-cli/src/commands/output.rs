//! Shared output formatting for scan reports.

use anyhow::Result;
use a11y_lint_core::{Issue, ScanReport, Severity, UnitReport};
use std::fmt;
use std::io::IsTerminal;

use crate::OutputFormat;

/// Print a scan report in the specified format.
pub fn print(report: &ScanReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print!(
            "{}",
            TextReport {
                report,
                colored: std::io::stdout().is_terminal(),
            }
        ),
        OutputFormat::Json => return print_json(report),
        OutputFormat::Compact => print!("{}", CompactReport(report)),
    }
    Ok(())
}

fn print_json(report: &ScanReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{json}");
    Ok(())
}

/// Human-readable rendering, grouped by unit.
struct TextReport<'a> {
    report: &'a ScanReport,
    colored: bool,
}

impl TextReport<'_> {
    fn paint(&self, code: &str, text: &str) -> String {
        if self.colored {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    fn severity(&self, severity: Severity) -> String {
        let code = match severity {
            Severity::Error => "31",
            Severity::Warning => "33",
            Severity::Info => "34",
        };
        self.paint(code, &severity.to_string())
    }

    fn unit(&self, f: &mut fmt::Formatter<'_>, unit: &UnitReport) -> fmt::Result {
        let score = unit
            .score
            .score
            .map_or_else(|| "n/a".to_string(), |s| s.to_string());
        writeln!(
            f,
            "{}  score {} ({}/{})",
            self.paint("1", &unit.unit_id),
            score,
            unit.score.numerator,
            unit.score.denominator
        )?;
        for issue in &unit.issues {
            match issue {
                Issue::Single(finding) => {
                    let location = match finding.line {
                        Some(line) => format!("{}:{line}", finding.source_file.display()),
                        None => finding.source_file.display().to_string(),
                    };
                    writeln!(
                        f,
                        "  {}[{}] {}",
                        self.severity(finding.severity),
                        finding.check_id,
                        location
                    )?;
                    writeln!(f, "    {}", finding.message)?;
                    if !finding.snippet.is_empty() {
                        writeln!(f, "    | {}", finding.snippet)?;
                    }
                }
                Issue::Collapsed(collapsed) => {
                    writeln!(
                        f,
                        "  {}[{}] {} ({} occurrence(s))",
                        self.severity(collapsed.severity),
                        collapsed.check_id,
                        collapsed.ancestor_file.display(),
                        collapsed.count
                    )?;
                    writeln!(f, "    {}", collapsed.message)?;
                    let affected: Vec<String> = collapsed
                        .affected_files
                        .iter()
                        .map(|p| p.display().to_string())
                        .collect();
                    writeln!(f, "    = affected: {}", affected.join(", "))?;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.report;
        for unit in &report.units {
            self.unit(f, unit)?;
            writeln!(f)?;
        }
        for warning in &report.warnings {
            writeln!(f, "{}: {}", self.severity(Severity::Warning), warning)?;
        }

        let d = &report.distribution;
        writeln!(
            f,
            "Units: {} (excellent {}, good {}, fair {}, poor {}, unscored {})",
            report.units.len(),
            d.excellent,
            d.good,
            d.fair,
            d.poor,
            d.unscored
        )?;

        let counts = &report.severity_counts;
        let summary_color = if counts.errors > 0 {
            "31"
        } else if counts.warnings > 0 {
            "33"
        } else {
            "32"
        };
        let summary = format!(
            "Found {} error(s), {} warning(s), {} info(s) in {} file(s)",
            counts.errors, counts.warnings, counts.infos, report.files_checked
        );
        writeln!(f, "{}", self.paint(summary_color, &summary))
    }
}

/// One line per distinct issue.
struct CompactReport<'a>(&'a ScanReport);

impl fmt::Display for CompactReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for issue in self.0.all_issues() {
            writeln!(f, "{issue}")?;
        }
        Ok(())
    }
}
