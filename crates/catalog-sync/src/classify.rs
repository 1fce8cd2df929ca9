//! Severity classification for backend log lines.
//!
//! Rules are evaluated in table order and the first match wins, so error
//! markers take priority over success markers, which take priority over
//! warning markers. Matching is a case-insensitive substring test.

use crate::feedback::Severity;

/// A single classification rule: any of `markers` found in a line maps it to `severity`.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub severity: Severity,
    pub markers: &'static [&'static str],
}

/// Ordered rule table. Markers are lowercase.
pub const RULES: &[Rule] = &[
    Rule {
        severity: Severity::Error,
        markers: &[
            "error",
            "critical",
            "fatal",
            "failed to save",
            "failed to process",
            "could not",
        ],
    },
    Rule {
        severity: Severity::Success,
        markers: &[
            "success",
            "skipped",
            "completed",
            "imported",
            "created",
            "updated",
        ],
    },
    Rule {
        severity: Severity::Warning,
        markers: &["warning", "warn"],
    },
];

/// Classify a raw log line against [`RULES`]. Unmarked text is [`Severity::Info`].
pub fn classify(text: &str) -> Severity {
    classify_with(RULES, text)
}

/// Classify against an arbitrary ordered rule table.
pub fn classify_with(rules: &[Rule], text: &str) -> Severity {
    let lower = text.to_lowercase();
    rules
        .iter()
        .find(|rule| rule.markers.iter().any(|marker| lower.contains(marker)))
        .map_or(Severity::Info, |rule| rule.severity)
}
