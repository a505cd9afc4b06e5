//! Core types for architecture violations and scan reports.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Severity level for violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message, does not fail a check.
    Info,
    /// Warning that should be addressed.
    Warning,
    /// Error that must be fixed.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Kind of architecture violation.
///
/// Adding a variant forces every severity/rule/suggestion mapping to be
/// updated, since all dispatch on this type is via exhaustive `match`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViolationKind {
    /// Import crosses layer boundaries against the allow-list.
    LayerViolation,
    /// Import reaches into a sibling slice of the same layer.
    CrossSlice,
    /// Two files import each other.
    CircularDependency,
    /// File extension banned by the active policy.
    FileType,
    /// File lives under the reserved unsafe shared segment.
    InvalidSharedSegment,
    /// Import bypasses a slice's public entry point.
    DeepNesting,
    /// Route entry file imports something its kind may not.
    RouteRestriction,
}

impl ViolationKind {
    /// All kinds, in report order.
    pub const ALL: [Self; 7] = [
        Self::LayerViolation,
        Self::CrossSlice,
        Self::CircularDependency,
        Self::FileType,
        Self::InvalidSharedSegment,
        Self::DeepNesting,
        Self::RouteRestriction,
    ];

    /// Stable rule name for this kind.
    #[must_use]
    pub fn rule_name(self) -> &'static str {
        match self {
            Self::LayerViolation => "layer-dependency",
            Self::CrossSlice => "slice-isolation",
            Self::CircularDependency => "no-circular-imports",
            Self::FileType => "ts-only-files",
            Self::InvalidSharedSegment => "no-internal-shared",
            Self::DeepNesting => "public-entry-imports",
            Self::RouteRestriction => "route-imports",
        }
    }

    /// One-line description of the rule this kind enforces.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::LayerViolation => "a layer may only import from the layers it is allowed to",
            Self::CrossSlice => "slices within a layer must not import each other directly",
            Self::CircularDependency => "two modules must not import each other",
            Self::FileType => "only TypeScript sources are allowed under a ts-only policy",
            Self::InvalidSharedSegment => {
                "the internal shared segment is reserved and must not hold project code"
            }
            Self::DeepNesting => "cross-layer imports must go through the slice public entry",
            Self::RouteRestriction => "route entry files have their own import allow-list",
        }
    }

    /// Severity used when the config carries no override for this kind.
    #[must_use]
    pub fn default_severity(self) -> Severity {
        match self {
            Self::LayerViolation
            | Self::CircularDependency
            | Self::FileType
            | Self::RouteRestriction => Severity::Error,
            Self::CrossSlice | Self::InvalidSharedSegment | Self::DeepNesting => Severity::Warning,
        }
    }
}

impl std::fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::LayerViolation => "layer-violation",
            Self::CrossSlice => "cross-slice",
            Self::CircularDependency => "circular-dependency",
            Self::FileType => "file-type",
            Self::InvalidSharedSegment => "invalid-shared-segment",
            Self::DeepNesting => "deep-nesting",
            Self::RouteRestriction => "route-restriction",
        };
        write!(f, "{s}")
    }
}

/// One concrete rule breach detected for a specific import or file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    /// What rule was broken.
    pub kind: ViolationKind,
    /// File the violation was found in, relative to the project root.
    pub file: PathBuf,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
    /// The raw import statement, empty for file-level violations.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub import_statement: String,
    /// The literal (unresolved) import path, empty for file-level violations.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub import_path: String,
    /// Layer of the importing file, if resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_layer: Option<String>,
    /// Layer of the import target, if resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_layer: Option<String>,
    /// Severity of this violation.
    pub severity: Severity,
    /// Layers the importing file was allowed to import from.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_layers: Vec<String>,
    /// Human-readable message.
    pub message: String,
    /// Kind-specific remediation guidance.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl Violation {
    /// Creates a violation with the kind's default severity.
    #[must_use]
    pub fn new(
        kind: ViolationKind,
        file: impl Into<PathBuf>,
        line: usize,
        column: usize,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            file: file.into(),
            line,
            column,
            import_statement: String::new(),
            import_path: String::new(),
            from_layer: None,
            to_layer: None,
            severity: kind.default_severity(),
            allowed_layers: Vec::new(),
            message: message.into(),
            suggestions: Vec::new(),
        }
    }

    /// Attaches the offending import statement and path.
    #[must_use]
    pub fn with_import(mut self, statement: impl Into<String>, path: impl Into<String>) -> Self {
        self.import_statement = statement.into();
        self.import_path = path.into();
        self
    }

    /// Attaches resolved source/target layers.
    #[must_use]
    pub fn with_layers(mut self, from: Option<String>, to: Option<String>) -> Self {
        self.from_layer = from;
        self.to_layer = to;
        self
    }

    /// Attaches the allowed-layer set for context.
    #[must_use]
    pub fn with_allowed_layers(mut self, allowed: Vec<String>) -> Self {
        self.allowed_layers = allowed;
        self
    }

    /// Attaches remediation guidance.
    #[must_use]
    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }

    /// Overrides the severity.
    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Formats the violation for terminal output.
    #[must_use]
    pub fn format(&self) -> String {
        use std::fmt::Write;
        let mut output = format!(
            "{} {} at {}:{}:{}\n",
            self.kind,
            self.kind.rule_name(),
            self.file.display(),
            self.line,
            self.column,
        );
        let _ = writeln!(output, "  {}: {}", self.severity, self.message);
        for suggestion in &self.suggestions {
            let _ = writeln!(output, "  = help: {suggestion}");
        }
        output
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}: {} [{}] {}",
            self.file.display(),
            self.line,
            self.column,
            self.severity,
            self.kind,
            self.message
        )
    }
}

/// Converts a [`Violation`] to a miette `Diagnostic` for rich error display.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
#[error("{message}")]
pub struct ViolationDiagnostic {
    message: String,
    #[help]
    help: Option<String>,
}

impl From<&Violation> for ViolationDiagnostic {
    fn from(v: &Violation) -> Self {
        Self {
            message: format!(
                "{} at {}:{}:{}: {}",
                v.kind.rule_name(),
                v.file.display(),
                v.line,
                v.column,
                v.message
            ),
            help: v.suggestions.first().cloned(),
        }
    }
}

/// Violation counts broken down by severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    /// Number of errors.
    pub errors: usize,
    /// Number of warnings.
    pub warnings: usize,
    /// Number of infos.
    pub infos: usize,
}

/// Aggregate result of one full scan.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ViolationReport {
    /// All violations, sorted by file then line then column.
    pub violations: Vec<Violation>,
    /// Total number of violations.
    pub total: usize,
    /// Counts by severity.
    pub by_severity: SeverityCounts,
    /// Counts by kind.
    pub by_kind: BTreeMap<ViolationKind, usize>,
    /// Number of files analyzed.
    pub files_analyzed: usize,
    /// Wall-clock time for the scan, in milliseconds.
    pub elapsed_ms: u64,
}

impl ViolationReport {
    /// Assembles a report from raw violations, sorting and counting them.
    #[must_use]
    pub fn build(mut violations: Vec<Violation>, files_analyzed: usize, elapsed_ms: u64) -> Self {
        violations.sort_by(|a, b| {
            a.file
                .cmp(&b.file)
                .then(a.line.cmp(&b.line))
                .then(a.column.cmp(&b.column))
        });

        let mut by_severity = SeverityCounts::default();
        let mut by_kind = BTreeMap::new();
        for v in &violations {
            match v.severity {
                Severity::Error => by_severity.errors += 1,
                Severity::Warning => by_severity.warnings += 1,
                Severity::Info => by_severity.infos += 1,
            }
            *by_kind.entry(v.kind).or_insert(0) += 1;
        }

        Self {
            total: violations.len(),
            violations,
            by_severity,
            by_kind,
            files_analyzed,
            elapsed_ms,
        }
    }

    /// Returns true if there are any error-level violations.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.by_severity.errors > 0
    }

    /// Checks if any violations meet or exceed the given severity.
    #[must_use]
    pub fn has_violations_at(&self, severity: Severity) -> bool {
        self.violations.iter().any(|v| v.severity >= severity)
    }

    /// Returns violations of the given kind.
    #[must_use]
    pub fn of_kind(&self, kind: ViolationKind) -> Vec<&Violation> {
        self.violations.iter().filter(|v| v.kind == kind).collect()
    }

    /// Prints a summary report to stdout.
    pub fn print_report(&self) {
        for violation in &self.violations {
            println!("{}", violation.format());
        }
        println!(
            "\nFound {} error(s), {} warning(s), {} info(s) in {} file(s) ({}ms)",
            self.by_severity.errors,
            self.by_severity.warnings,
            self.by_severity.infos,
            self.files_analyzed,
            self.elapsed_ms,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_violation(kind: ViolationKind, line: usize) -> Violation {
        Violation::new(
            kind,
            PathBuf::from("src/features/auth/login.ts"),
            line,
            1,
            "test",
        )
    }

    #[test]
    fn kind_default_severities() {
        assert_eq!(
            ViolationKind::LayerViolation.default_severity(),
            Severity::Error
        );
        assert_eq!(
            ViolationKind::CrossSlice.default_severity(),
            Severity::Warning
        );
    }

    #[test]
    fn severity_ordering() {
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
    }

    #[test]
    fn report_counts_by_severity_and_kind() {
        let violations = vec![
            make_violation(ViolationKind::LayerViolation, 3),
            make_violation(ViolationKind::LayerViolation, 1),
            make_violation(ViolationKind::CrossSlice, 2),
        ];
        let report = ViolationReport::build(violations, 10, 42);

        assert_eq!(report.total, 3);
        assert_eq!(report.by_severity.errors, 2);
        assert_eq!(report.by_severity.warnings, 1);
        assert_eq!(report.by_kind[&ViolationKind::LayerViolation], 2);
        assert_eq!(report.by_kind[&ViolationKind::CrossSlice], 1);
        assert!(report.has_errors());
    }

    #[test]
    fn report_sorts_by_file_then_line() {
        let violations = vec![
            make_violation(ViolationKind::LayerViolation, 9),
            make_violation(ViolationKind::CrossSlice, 2),
        ];
        let report = ViolationReport::build(violations, 1, 0);
        assert_eq!(report.violations[0].line, 2);
        assert_eq!(report.violations[1].line, 9);
    }

    #[test]
    fn violation_format_includes_suggestions() {
        let v = make_violation(ViolationKind::LayerViolation, 1)
            .with_suggestions(vec!["move it to shared".into()]);
        assert!(v.format().contains("= help: move it to shared"));
    }

    #[test]
    fn has_violations_at_threshold() {
        let report =
            ViolationReport::build(vec![make_violation(ViolationKind::CrossSlice, 1)], 1, 0);
        assert!(report.has_violations_at(Severity::Warning));
        assert!(!report.has_violations_at(Severity::Error));
    }

    #[test]
    fn diagnostic_carries_first_suggestion_as_help() {
        let violation = make_violation(ViolationKind::LayerViolation, 3)
            .with_suggestions(vec!["move it to shared".to_owned(), "or pass props".to_owned()]);
        let diag = ViolationDiagnostic::from(&violation);
        assert!(diag.to_string().contains("layer-dependency"));
        assert_eq!(
            miette::Diagnostic::help(&diag).map(|h| h.to_string()),
            Some("move it to shared".to_owned())
        );
    }
}
