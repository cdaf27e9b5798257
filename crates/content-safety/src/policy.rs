//! Policy thresholds and the verdict function mapping an analyzer pass to an
//! allow / warn / block recommendation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::analyzer::Finding;
use crate::catalog::Severity;

/// Ceiling for the danger score.
pub const MAX_SCORE: u32 = 100;

/// Scores at or above this threshold block regardless of severity.
pub const BLOCK_THRESHOLD: u32 = 50;

/// Scores at or above this threshold warn when nothing escalates to a block.
pub const WARN_THRESHOLD: u32 = 20;

/// The action recommended for a piece of content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    /// Nothing noteworthy; persist as-is.
    Allow,
    /// Persist, but the accumulated signals are worth surfacing.
    Warn,
    /// Reject the write.
    Block,
}

impl Recommendation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Warn => "warn",
            Self::Block => "block",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derive the recommendation from a complete finding set and its score.
///
/// Decision order, first rule wins:
///
/// 1. any critical finding blocks — a single category-defining phrase is
///    unambiguous even though its lone score (40) sits below the numeric
///    block threshold;
/// 2. `score >= BLOCK_THRESHOLD` blocks — an accumulation of medium/low
///    signals with no single definitive phrase;
/// 3. any high finding blocks;
/// 4. `score >= WARN_THRESHOLD` warns;
/// 5. otherwise allow.
pub fn recommend(findings: &[Finding], score: u32) -> Recommendation {
    if findings.iter().any(|f| f.severity == Severity::Critical) {
        return Recommendation::Block;
    }
    if score >= BLOCK_THRESHOLD {
        return Recommendation::Block;
    }
    if findings.iter().any(|f| f.severity == Severity::High) {
        return Recommendation::Block;
    }
    if score >= WARN_THRESHOLD {
        return Recommendation::Warn;
    }
    Recommendation::Allow
}
