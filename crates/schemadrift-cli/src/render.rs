//! Human-readable output of a comparison report

use colored::{ColoredString, Colorize};
use schemadrift_core::{ActualValue, Finding, FindingCode, Report, Side};
use std::io::Write;

/// Line printed after the last finding of a completed run
pub const DONE: &str = "Done";

/// Prints one line per finding followed by `Done`
#[derive(Debug, Clone, Copy)]
pub struct ReportRenderer {
    color: bool,
}

impl Default for ReportRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportRenderer {
    /// Colored output (still subject to `NO_COLOR` and terminal detection)
    pub fn new() -> Self {
        Self { color: true }
    }

    /// Output without escape codes
    pub fn plain() -> Self {
        Self { color: false }
    }

    fn paint(&self, text: ColoredString) -> ColoredString {
        if self.color {
            text
        } else {
            text.clear()
        }
    }

    /// The plain-text line for a finding
    pub fn message(finding: &Finding) -> String {
        match finding {
            Finding::MissingIn {
                side: Side::Compared,
                kind,
                scope,
                name,
            } => format!("Missing {} in Database \"{}\": {}", kind, scope, name),
            Finding::MissingIn {
                side: Side::Reference,
                kind,
                scope,
                name,
            } => format!(
                "Following {} in Database \"{}\" should not exist: {}",
                kind, scope, name
            ),
            Finding::PropertyMismatch {
                kind,
                scope,
                property,
                expected,
                actual: ActualValue::Absent,
                ..
            } => format!(
                "Missing {} property in Database \"{}\": {} = {}",
                kind,
                scope,
                property,
                display_value(expected.as_deref())
            ),
            Finding::PropertyMismatch {
                kind,
                scope,
                property,
                expected,
                actual: ActualValue::Present(actual),
                ..
            } => format!(
                "Difference {} property in Database \"{}@{}\": should be \"{}\" but is \"{}\"",
                kind,
                scope,
                property,
                display_value(expected.as_deref()),
                display_value(actual.as_deref())
            ),
        }
    }

    fn styled(&self, finding: &Finding) -> ColoredString {
        let message = Self::message(finding);
        self.paint(match finding.code() {
            FindingCode::MissingObject => message.red(),
            FindingCode::UnexpectedObject => message.yellow(),
            FindingCode::MissingProperty => message.magenta(),
            FindingCode::PropertyMismatch => message.cyan(),
        })
    }

    /// Write every finding in order, then `Done`
    pub fn render(&self, out: &mut impl Write, report: &Report) -> std::io::Result<()> {
        for finding in &report.findings {
            writeln!(out, "{}", self.styled(finding))?;
        }
        writeln!(out, "{}", self.paint(DONE.green().bold()))
    }

    /// Prefix of the line confirming a written snapshot
    pub fn saved(&self) -> ColoredString {
        self.paint("Saved".green())
    }

    /// Summary block for verbose runs
    pub fn render_summary(&self, out: &mut impl Write, report: &Report) -> std::io::Result<()> {
        writeln!(out)?;
        let rule = self.paint("=".repeat(60).bright_blue());
        writeln!(out, "{}", rule)?;
        writeln!(
            out,
            "{}",
            self.paint(
                format!("Schema Comparison: {} -> {}", report.reference, report.compared)
                    .bold()
                    .bright_blue()
            )
        )?;
        writeln!(out, "{}", rule)?;
        let summary = &report.summary;
        writeln!(out, "{:<22}{}", "Tables compared:", summary.tables_compared)?;
        writeln!(out, "{:<22}{}", "Total findings:", self.count(summary.total))?;
        writeln!(out, "{:<22}{}", "  Missing objects:", self.count(summary.missing_objects))?;
        writeln!(out, "{:<22}{}", "  Extra objects:", self.count(summary.unexpected_objects))?;
        writeln!(out, "{:<22}{}", "  Missing properties:", self.count(summary.missing_properties))?;
        writeln!(out, "{:<22}{}", "  Differences:", self.count(summary.property_mismatches))?;

        if report.has_drift() {
            writeln!(out, "{}", self.paint("✗ Schemas differ".red().bold()))
        } else {
            writeln!(out, "{}", self.paint("✓ No drift detected".green().bold()))
        }
    }

    fn count(&self, n: usize) -> ColoredString {
        self.paint(if n > 0 {
            n.to_string().yellow()
        } else {
            n.to_string().green()
        })
    }
}

fn display_value(value: Option<&str>) -> &str {
    value.unwrap_or("NULL")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use schemadrift_core::{ObjectKind, Scope};

    fn prod() -> Scope {
        Scope::database("prod")
    }

    #[test]
    fn missing_and_extra_objects() {
        let missing = Finding::missing_in(Side::Compared, ObjectKind::Table, prod(), "orders");
        assert_eq!(
            ReportRenderer::message(&missing),
            r#"Missing table in Database "prod": orders"#
        );

        let extra = Finding::missing_in(Side::Reference, ObjectKind::Index, prod().child("users"), "idx");
        assert_eq!(
            ReportRenderer::message(&extra),
            r#"Following index in Database "prod.users" should not exist: idx"#
        );
    }

    #[test]
    fn property_findings() {
        let scope = prod().child("users").child("email");

        let missing = Finding::property_mismatch(
            ObjectKind::Field,
            scope.clone(),
            "email",
            "Comment",
            Some("x".to_string()),
            ActualValue::Absent,
        );
        assert_eq!(
            ReportRenderer::message(&missing),
            r#"Missing field property in Database "prod.users.email": Comment = x"#
        );

        let differs = Finding::property_mismatch(
            ObjectKind::Field,
            scope,
            "email",
            "Type",
            Some("varchar(255)".to_string()),
            ActualValue::Present(Some("varchar(100)".to_string())),
        );
        assert_eq!(
            ReportRenderer::message(&differs),
            r#"Difference field property in Database "prod.users.email@Type": should be "varchar(255)" but is "varchar(100)""#
        );
    }

    #[test]
    fn null_values_are_spelled_out() {
        let finding = Finding::property_mismatch(
            ObjectKind::Field,
            prod().child("users").child("id"),
            "id",
            "Default",
            None,
            ActualValue::Present(Some(String::new())),
        );
        assert_eq!(
            ReportRenderer::message(&finding),
            r#"Difference field property in Database "prod.users.id@Default": should be "NULL" but is """#
        );
    }

    #[test]
    fn render_ends_with_done() {
        let report = Report::from_findings(
            "staging",
            "prod",
            vec![Finding::missing_in(Side::Compared, ObjectKind::Table, prod(), "orders")],
        );
        let mut out = Vec::new();
        ReportRenderer::plain().render(&mut out, &report).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Missing table in Database \"prod\": orders\nDone\n"
        );

        let mut out = Vec::new();
        ReportRenderer::plain()
            .render(&mut out, &Report::new("staging", "prod"))
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Done\n");
    }

    #[test]
    fn plain_summary_has_no_escape_codes() {
        let report = Report::from_findings(
            "staging",
            "prod",
            vec![Finding::missing_in(Side::Reference, ObjectKind::Table, prod(), "tmp")],
        );
        let mut out = Vec::new();
        ReportRenderer::plain().render_summary(&mut out, &report).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(!text.contains('\u{1b}'));
        assert!(text.contains("Schema Comparison: staging -> prod"));
        assert!(text.contains("  Extra objects:      1"));
        assert!(text.ends_with("✗ Schemas differ\n"));
    }
}
