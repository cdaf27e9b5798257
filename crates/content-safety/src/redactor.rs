//! In-place redaction of critical-severity matches.
//!
//! Redaction is an independent transform, not part of the accept/reject path:
//! it can be applied to any text, whatever verdict the analyzer would give.

use regex::Regex;

use crate::analyzer::AnalyzerError;
use crate::catalog::{self, Severity, CATALOG};

/// Replacement token for redacted spans.  Must never itself match a critical
/// pattern, or redaction would stop being idempotent.
pub const REDACTED: &str = "[REDACTED]";

/// Replaces every match of every critical-severity pattern with
/// [`REDACTED`].  Non-critical categories are left untouched.
pub struct Redactor {
    critical: Vec<Regex>,
}

impl Redactor {
    /// Compile the critical subset of the catalogue.
    pub fn new() -> Result<Self, AnalyzerError> {
        let mut critical = Vec::new();
        for rule in CATALOG.iter().filter(|r| r.severity == Severity::Critical) {
            for source in rule.patterns {
                critical.push(catalog::compile(source)?);
            }
        }
        Ok(Self { critical })
    }

    /// Redact all critical matches in `content`.
    ///
    /// Patterns are applied sequentially over the progressively-mutated
    /// string: a later pattern scans the already-redacted text, not the
    /// original.  Two overlapping critical matches therefore collapse into
    /// one replacement instead of splicing over each other; a second pass
    /// finds nothing left to redact.
    pub fn redact(&self, content: &str) -> String {
        let mut text = content.to_string();
        for re in &self.critical {
            if re.is_match(&text) {
                text = re.replace_all(&text, REDACTED).into_owned();
            }
        }
        text
    }
}

impl Default for Redactor {
    /// # Panics
    ///
    /// Panics if the built-in catalogue fails to compile (covered by the
    /// catalogue tests).
    fn default() -> Self {
        Self::new().expect("built-in catalogue must compile")
    }
}
