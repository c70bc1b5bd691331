use serde::Serialize;

use crate::decision::Decision;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<String>,
}

impl ValidationError {
    pub fn error(file: &str, message: impl Into<String>) -> Self {
        Self::new(file, Severity::Error, message.into())
    }

    pub fn warning(file: &str, message: impl Into<String>) -> Self {
        Self::new(file, Severity::Warning, message.into())
    }

    fn new(file: &str, severity: Severity, message: String) -> Self {
        Self {
            file: file.to_string(),
            line: None,
            severity,
            message,
            fix: None,
        }
    }

    pub fn at_line(mut self, line: Option<usize>) -> Self {
        self.line = line;
        self
    }

    pub fn with_fix(mut self, fix: impl Into<String>) -> Self {
        self.fix = Some(fix.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    fn location(&self) -> String {
        match self.line {
            Some(l) => format!("{}:{}", self.file, l),
            None => self.file.clone(),
        }
    }

    /// `file[:line]: message [Fix: fix]`
    pub fn render(&self, with_fix: bool) -> String {
        let mut out = format!("{}: {}", self.location(), self.message);
        if with_fix {
            if let Some(fix) = &self.fix {
                out.push_str(" [Fix: ");
                out.push_str(fix);
                out.push(']');
            }
        }
        out
    }
}

/// Insertion-ordered diagnostics for one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    entries: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, e: ValidationError) {
        self.entries.push(e);
    }

    pub fn entries(&self) -> &[ValidationError] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(ValidationError::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationError> {
        self.entries.iter().filter(|e| e.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationError> {
        self.entries.iter().filter(|e| e.severity == Severity::Warning)
    }

    /// Entries grouped errors first; order within a severity is preserved.
    pub fn sorted(&self) -> Vec<&ValidationError> {
        let mut v: Vec<&ValidationError> = self.entries.iter().collect();
        v.sort_by_key(|e| e.severity);
        v
    }

    pub fn to_decision(&self) -> Decision {
        if self.has_errors() {
            let lines: Vec<String> = self.sorted().iter().map(|e| e.render(true)).collect();
            return Decision::Deny(lines.join("\n"));
        }
        let warnings: Vec<String> = self.warnings().map(|e| e.render(false)).collect();
        if warnings.is_empty() {
            Decision::Allow
        } else {
            Decision::Ask(warnings.join("\n"))
        }
    }
}

impl Extend<ValidationError> for ValidationReport {
    fn extend<T: IntoIterator<Item = ValidationError>>(&mut self, iter: T) {
        self.entries.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_deny_with_fix_text_and_come_first() {
        let mut r = ValidationReport::new();
        r.push(ValidationError::warning("values.yaml", "w1").at_line(Some(3)));
        r.push(
            ValidationError::error("app/application.yaml", "bad url")
                .with_fix("use https"),
        );

        let Decision::Deny(msg) = r.to_decision() else {
            panic!("expected deny");
        };
        let lines: Vec<&str> = msg.lines().collect();
        assert_eq!(lines[0], "app/application.yaml: bad url [Fix: use https]");
        assert_eq!(lines[1], "values.yaml:3: w1");
    }

    #[test]
    fn warnings_ask_without_fix_text() {
        let mut r = ValidationReport::new();
        r.push(
            ValidationError::warning("values.yaml", "rename")
                .at_line(Some(7))
                .with_fix("do it"),
        );
        assert_eq!(r.to_decision(), Decision::Ask("values.yaml:7: rename".into()));
    }

    #[test]
    fn empty_report_allows() {
        assert_eq!(ValidationReport::new().to_decision(), Decision::Allow);
    }
}
