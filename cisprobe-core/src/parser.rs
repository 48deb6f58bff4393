//! Interpretation of the free-text output of a successful scan.
//!
//! The poll loop only needs a yes/no answer, so alternate scan output formats
//! plug in here without touching the prober.

use once_cell::sync::Lazy;
use regex::Regex;

/// Marker the benchmark summary prints when nothing failed.
pub const ZERO_NON_COMPLIANT_MARKER: &str = "and 0 non-compliant";

static NON_COMPLIANT_COUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d+)\s+non-compliant\b")
        .expect("non-compliant counter regex should compile")
});

/// What a successful scan's output says about the target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputAssessment {
    /// No failed controls.
    Compliant,
    /// At least one failed control, or output that cannot be read as clean.
    NonCompliant,
}

/// Reads the standard output of a scan that finished with `Success`.
pub trait ComplianceOutputParser: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Classifies the output. Anything unrecognised is non-compliant.
    fn assess(&self, output: &str) -> OutputAssessment;
}

/// Compliant iff the output contains a fixed phrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerPhraseParser {
    phrase: String,
}

impl MarkerPhraseParser {
    /// Parser matching `phrase` verbatim.
    pub fn new(phrase: impl Into<String>) -> Self {
        Self {
            phrase: phrase.into(),
        }
    }
}

impl Default for MarkerPhraseParser {
    fn default() -> Self {
        Self::new(ZERO_NON_COMPLIANT_MARKER)
    }
}

impl ComplianceOutputParser for MarkerPhraseParser {
    fn name(&self) -> &'static str {
        "marker-phrase"
    }

    fn assess(&self, output: &str) -> OutputAssessment {
        if output.contains(&self.phrase) {
            OutputAssessment::Compliant
        } else {
            OutputAssessment::NonCompliant
        }
    }
}

/// Reads every `<n> non-compliant` counter in the summary. Compliant only
/// when at least one counter was printed and all of them are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SummaryCountParser;

impl SummaryCountParser {
    /// Sum of all non-compliant counters, or `None` when the output carries
    /// no summary at all.
    pub fn non_compliant_total(output: &str) -> Option<u64> {
        let mut seen = false;
        let mut total: u64 = 0;
        for caps in NON_COMPLIANT_COUNT.captures_iter(output) {
            seen = true;
            // Counters too large for u64 are certainly not zero.
            let count = caps[1].parse::<u64>().unwrap_or(u64::MAX);
            total = total.saturating_add(count);
        }
        seen.then_some(total)
    }
}

impl ComplianceOutputParser for SummaryCountParser {
    fn name(&self) -> &'static str {
        "summary-count"
    }

    fn assess(&self, output: &str) -> OutputAssessment {
        match Self::non_compliant_total(output) {
            Some(0) => OutputAssessment::Compliant,
            _ => OutputAssessment::NonCompliant,
        }
    }
}
