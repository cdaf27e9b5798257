//! Threat pattern catalogue.
//!
//! Contains the static table of regex patterns used to detect prompt-injection
//! and social-engineering attempts in agent-facing text.  Each entry groups a
//! [`ThreatCategory`] with a fixed [`Severity`] and the set of regex sources
//! covering distinct phrasings of that threat.  Patterns are compiled at
//! analyzer-construction time, case-insensitive and with multiline anchors so
//! that `^` binds to individual line starts (several patterns target simulated
//! `SYSTEM:` prefixes impersonating a privileged transcript message).

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Threat level of a category.  Fixed per category, never per pattern; drives
/// both the numeric score weight and the policy escalation rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    /// Score contribution of a single match at this severity.
    pub fn weight(self) -> u32 {
        match self {
            Self::Critical => 40,
            Self::High => 25,
            Self::Medium => 15,
            Self::Low => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Broad classification of the manipulation technique a rule targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreatCategory {
    /// Attempts to cancel or replace the instructions the reading agent was
    /// given by its operator.
    InstructionOverride,
    /// Text impersonating a privileged message in a chat transcript
    /// (`SYSTEM:` line prefixes, `<system>` tags, model-format delimiters).
    FakeSystemPrompt,
    /// Attempts to switch the reading agent into an unrestricted or
    /// jailbroken persona or mode.
    ModeManipulation,
    /// Attempts to extract the system prompt, hidden instructions, or
    /// credentials from the reading agent.
    CredentialExtraction,
    /// Direct commands telling the reading agent to perform an action
    /// (reply, follow, visit, execute).
    CommandedAction,
    /// Embedded shell commands or code-execution requests.
    CommandInjection,
    /// Trust manipulation: impersonating operators, demanding secrecy,
    /// fake authorization claims.
    SocialEngineering,
    /// Pressure framing: urgency, deadlines, threats of loss.
    UrgencyManipulation,
    /// Obfuscated payloads: base64-like runs, escape sequences, zero-width
    /// and direction-override characters.
    EncodingObfuscation,
}

impl ThreatCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InstructionOverride => "instruction_override",
            Self::FakeSystemPrompt => "fake_system_prompt",
            Self::ModeManipulation => "mode_manipulation",
            Self::CredentialExtraction => "credential_extraction",
            Self::CommandedAction => "commanded_action",
            Self::CommandInjection => "command_injection",
            Self::SocialEngineering => "social_engineering",
            Self::UrgencyManipulation => "urgency_manipulation",
            Self::EncodingObfuscation => "encoding_obfuscation",
        }
    }
}

impl fmt::Display for ThreatCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Catalogue
// ---------------------------------------------------------------------------

/// One catalogue entry: a category, its severity, and the regex sources that
/// detect it.  Every pattern inherits the entry's severity.
pub struct CategoryRule {
    pub category: ThreatCategory,
    pub severity: Severity,
    pub patterns: &'static [&'static str],
}

/// The built-in catalogue, in scan order.
///
/// Kept as a plain static table: there is exactly one scanning algorithm,
/// applied uniformly, so no dispatch abstraction is needed.  The entries are
/// ordered most- to least-severe, which also fixes the order findings are
/// reported in.
pub static CATALOG: &[CategoryRule] = &[
    CategoryRule {
        category: ThreatCategory::InstructionOverride,
        severity: Severity::Critical,
        patterns: &[
            r"ignore\s+(?:all\s+|any\s+)?(?:previous|prior|above|earlier)\s+(?:instructions?|prompts?|rules?|directives?)",
            r"disregard\s+(?:all\s+|any\s+)?(?:previous|prior|above|earlier|your)\s+(?:instructions?|prompts?|rules?|training)",
            r"forget\s+(?:everything|all\s+previous|all\s+prior|your\s+(?:instructions?|rules?|training)|what\s+you\s+were\s+told)",
            r"(?:override|overwrite)\s+(?:your|all|any|previous|prior)\s+(?:instructions?|programming|rules?|directives?)",
            r"do\s+not\s+(?:follow|obey)\s+(?:any\s+|the\s+|your\s+)?(?:previous|prior|above|original|earlier)",
            r"new\s+instructions?\s*:",
        ],
    },
    CategoryRule {
        category: ThreatCategory::FakeSystemPrompt,
        severity: Severity::Critical,
        patterns: &[
            r"^\s*(?:system|admin|root|operator)\s*:",
            r"<\s*/?\s*system\s*>",
            r"\[\s*(?:system|admin)\s+(?:override|message|note|prompt)\s*\]",
            r"<<\s*sys\s*>>",
            r"###\s*(?:system|instruction|admin)\b",
            r"\[inst\]",
        ],
    },
    CategoryRule {
        category: ThreatCategory::ModeManipulation,
        severity: Severity::Critical,
        patterns: &[
            r"you\s+are\s+now\s+(?:an?\s+)?(?:in\s+)?(?:unrestricted|unfiltered|uncensored|jailbroken|free|developer\s+mode|debug\s+mode)",
            r"(?:act|behave)\s+as\s+(?:if\s+you\s+(?:are|were)\s+)?(?:an?\s+)?(?:unrestricted|unfiltered|uncensored|jailbroken)",
            r"(?:enable|enter|activate|switch\s+to)\s+(?:developer|debug|god|dan|jailbreak|unrestricted)\s+mode",
            r"you\s+(?:have|are\s+bound\s+by)\s+no\s+(?:restrictions?|limitations?|filters?|rules?)",
            r"(?:bypass|disable|turn\s+off)\s+(?:your\s+|all\s+)?(?:safety|content)\s+(?:guidelines?|filters?|policies|restrictions?)",
        ],
    },
    CategoryRule {
        category: ThreatCategory::CredentialExtraction,
        severity: Severity::Critical,
        patterns: &[
            r"(?:reveal|show|print|display|output|share|repeat)\s+(?:me\s+)?(?:your|the)\s+(?:system\s+prompt|initial\s+(?:instructions?|prompt)|hidden\s+(?:instructions?|prompt)|original\s+instructions?)",
            r"what\s+(?:is|are|were)\s+your\s+(?:system\s+prompt|initial\s+instructions?|original\s+instructions?|hidden\s+rules?)",
            r"(?:send|give|share|post|paste)\s+(?:me\s+|us\s+)?your\s+(?:api\s+keys?|tokens?|passwords?|credentials?|secrets?|private\s+keys?)",
            r"(?:exfiltrate|leak)\s+(?:the|your|any)\s+(?:data|secrets?|credentials?|keys?|prompt)",
        ],
    },
    CategoryRule {
        category: ThreatCategory::CommandedAction,
        severity: Severity::High,
        patterns: &[
            r"you\s+must\s+(?:now\s+|immediately\s+)?(?:reply|respond|send|post|comment|follow|message|visit|click|execute|run)",
            r"(?:every|all)\s+agents?\s+(?:reading|who\s+reads?|seeing)\s+this\s+(?:must|should|need)",
            r"if\s+you\s+are\s+an?\s+(?:ai|agent|assistant|bot|llm)\s*,?\s*(?:please\s+)?(?:do|reply|respond|follow|send|post|ignore|visit)",
            r"respond\s+(?:only\s+)?with\s+(?:the\s+following|exactly)",
        ],
    },
    CategoryRule {
        category: ThreatCategory::CommandInjection,
        severity: Severity::High,
        patterns: &[
            r"\b(?:curl|wget)\s+(?:-[\w-]+\s+)*https?://",
            r"\brm\s+-rf?\b",
            r"(?:execute|run)\s+(?:this|the\s+following)\s+(?:command|script|code|shell)",
            r"\b(?:eval|exec)\s*\(",
        ],
    },
    CategoryRule {
        category: ThreatCategory::SocialEngineering,
        severity: Severity::Medium,
        patterns: &[
            r"(?:i\s+am|i'm|this\s+is)\s+your\s+(?:creator|developer|operator|administrator|owner)",
            r"(?:don'?t|do\s+not)\s+tell\s+(?:anyone|anybody|your\s+(?:operator|user|owner|human))",
            r"(?:keep\s+this\s+(?:a\s+)?secret|between\s+you\s+and\s+me)",
            r"this\s+is\s+(?:an?\s+)?(?:official|authorized|approved)\s+(?:test|request|message|audit)",
            r"(?:verify|confirm)\s+your\s+(?:identity|account)\s+by\b",
        ],
    },
    CategoryRule {
        category: ThreatCategory::UrgencyManipulation,
        severity: Severity::Medium,
        patterns: &[
            r"\b(?:urgent|emergency|asap|immediately|act\s+now|right\s+away)\b",
            r"(?:final|last)\s+(?:warning|chance|notice)",
            r"(?:within|in\s+the\s+next)\s+\d+\s+(?:minutes?|hours?)\s+or\b",
            r"(?:before\s+it'?s\s+too\s+late|time\s+is\s+running\s+out)",
        ],
    },
    CategoryRule {
        category: ThreatCategory::EncodingObfuscation,
        severity: Severity::Low,
        patterns: &[
            r"[A-Za-z0-9+/]{20,}={0,2}",
            r"(?:\\x[0-9a-f]{2}){4,}",
            r"(?:\\u[0-9a-f]{4}){3,}",
            "[\u{200B}\u{200C}\u{200D}\u{2060}\u{FEFF}\u{202D}\u{202E}]",
        ],
    },
];

/// Compile one catalogue pattern with the scan flags used everywhere in this
/// crate (case-insensitive, multiline anchors).
pub(crate) fn compile(source: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(source)
        .case_insensitive(true)
        .multi_line(true)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_patterns_compile() {
        for rule in CATALOG {
            for source in rule.patterns {
                compile(source).unwrap_or_else(|e| {
                    panic!(
                        "pattern {source:?} in category '{}' failed to compile: {e}",
                        rule.category
                    )
                });
            }
        }
    }

    #[test]
    fn categories_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for rule in CATALOG {
            assert!(
                seen.insert(rule.category),
                "duplicate category: {}",
                rule.category
            );
        }
    }

    #[test]
    fn every_category_has_patterns() {
        for rule in CATALOG {
            assert!(
                !rule.patterns.is_empty(),
                "category '{}' has no patterns",
                rule.category
            );
        }
    }

    #[test]
    fn severity_weights() {
        assert_eq!(Severity::Critical.weight(), 40);
        assert_eq!(Severity::High.weight(), 25);
        assert_eq!(Severity::Medium.weight(), 15);
        assert_eq!(Severity::Low.weight(), 5);
    }

    #[test]
    fn category_names_are_snake_case() {
        for rule in CATALOG {
            let name = rule.category.as_str();
            assert!(
                name.chars().all(|c| c.is_ascii_lowercase() || c == '_'),
                "category name '{name}' is not snake_case"
            );
        }
    }

    #[test]
    fn serde_uses_snake_case_names() {
        let json = serde_json::to_string(&ThreatCategory::InstructionOverride).unwrap();
        assert_eq!(json, "\"instruction_override\"");
        let json = serde_json::to_string(&Severity::Critical).unwrap();
        assert_eq!(json, "\"critical\"");
    }

    #[test]
    fn obfuscation_is_low_severity() {
        // Base64 runs and hex escapes have legitimate uses (hashes, embedded
        // tokens); the category stays a weak secondary signal.
        let rule = CATALOG
            .iter()
            .find(|r| r.category == ThreatCategory::EncodingObfuscation)
            .unwrap();
        assert_eq!(rule.severity, Severity::Low);
    }
}
