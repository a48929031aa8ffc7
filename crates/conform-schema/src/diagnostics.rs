//! Non-fatal compile-time warnings (§7: "surface once per compilation as
//! structured diagnostics, not fatal"), collected during schema compilation
//! and optionally pretty-printed with `ariadne`, mirroring
//! `apollo-compiler`'s `diagnostic::CliReport`.

use std::fmt;

use ariadne::Color;
use ariadne::Label;
use ariadne::Report;
use ariadne::ReportKind;
use ariadne::Source;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// `oneOf` with overlapping or otherwise indistinguishable branches
    /// falls back to `anyOf` semantics (§4.3.2, §9 open question).
    OneOfFallback { pointer: String },
    /// A format keyword is honored but its regex is a conservative
    /// approximation (e.g. `date-time` does not reject invalid calendar
    /// dates such as February 30th).
    ApproximateFormat { pointer: String, format: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::OneOfFallback { pointer } => {
                write!(f, "{pointer}: oneOf with ambiguous branches treated as anyOf")
            }
            Warning::ApproximateFormat { pointer, format } => {
                write!(f, "{pointer}: format \"{format}\" compiled to an approximate regex")
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, warning: Warning) {
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Renders every collected warning against `schema_source` using
    /// `ariadne`, one report per warning, written to `out`.
    pub fn render(&self, schema_source: &str, mut out: impl std::io::Write) -> std::io::Result<()> {
        for warning in &self.warnings {
            let report = Report::build(ReportKind::Warning, (), 0)
                .with_message(warning.to_string())
                .with_label(Label::new(0..schema_source.len().min(1)).with_color(Color::Yellow))
                .finish();
            report.write(Source::from(schema_source), &mut out)?;
        }
        Ok(())
    }
}
