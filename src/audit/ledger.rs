// src/audit/ledger.rs
// =============================================================================
// The finding ledger and running score.
//
// Every observation the audit makes is recorded here as a Finding. Each
// finding has a kind, and the kind decides how many points come off the
// score. The score starts at 100 and only ever goes down; it is clamped to
// 0..=100 when it is read for reporting, never while deductions are applied.
// =============================================================================

use std::fmt;

use serde::Serialize;

/// Score every run starts from
pub const STARTING_SCORE: i64 = 100;

/// Extra points the legacy auditor took off for a missing <h1>
const LEGACY_H1_EXTRA: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Error,
    Warn,
    Success,
    Info,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Error => "ERROR",
            Severity::Warn => "WARN",
            Severity::Success => "SUCCESS",
            Severity::Info => "INFO",
        }
    }
}

// What a finding is about.
//
// The kind fixes both the severity and the deduction, so there is exactly
// one place that knows "an orphan page costs 5 points".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    MissingH1,
    MultipleH1,
    MissingStructuredData,
    AbsoluteInternalLink,
    UnprotectedExternalLink,
    RelativeLink,
    ExtensionLink,
    DeadLink,
    OrphanPage,
    BrokenExternalLink,
    /// Timeouts and connection failures. Usually the auditing machine's
    /// network, not the site, so they never cost points.
    ExternalUnreachable,
    ConfigDetection,
    MissingBreadcrumb,
    SitemapEntryMissing,
    NotInSitemap,
    Summary,
}

impl FindingKind {
    pub fn severity(&self) -> Severity {
        use FindingKind::*;
        match self {
            MissingH1 | DeadLink | BrokenExternalLink => Severity::Error,
            MultipleH1
            | MissingStructuredData
            | AbsoluteInternalLink
            | UnprotectedExternalLink
            | RelativeLink
            | ExtensionLink
            | OrphanPage
            | ExternalUnreachable
            | ConfigDetection => Severity::Warn,
            MissingBreadcrumb | SitemapEntryMissing | NotInSitemap => Severity::Info,
            Summary => Severity::Success,
        }
    }

    /// Points this kind of finding takes off the score
    pub fn deduction(&self) -> u32 {
        use FindingKind::*;
        match self {
            MissingH1 | DeadLink => 10,
            OrphanPage | BrokenExternalLink => 5,
            MultipleH1
            | MissingStructuredData
            | AbsoluteInternalLink
            | UnprotectedExternalLink
            | RelativeLink
            | ExtensionLink => 2,
            ExternalUnreachable
            | ConfigDetection
            | MissingBreadcrumb
            | SitemapEntryMissing
            | NotInSitemap
            | Summary => 0,
        }
    }
}

/// One reportable observation
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    pub severity: Severity,
    pub kind: FindingKind,
    pub message: String,
    /// Points taken off the score when this finding was recorded
    pub deduction: u32,
}

/// Called with every finding as it is recorded
pub type FindingSink = Box<dyn Fn(&Finding) + Send + Sync>;

// The running deduction ledger for one audit run.
//
// Findings are appended in emission order and never removed. An optional
// sink sees each finding as soon as it is recorded, which is how per-file
// results reach the user while the audit is still running.
#[derive(Default)]
pub struct Ledger {
    findings: Vec<Finding>,
    deducted: u64,
    sink: Option<FindingSink>,
    legacy_h1_penalty: bool,
}

impl fmt::Debug for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ledger")
            .field("findings", &self.findings)
            .field("deducted", &self.deducted)
            .field("has_sink", &self.sink.is_some())
            .field("legacy_h1_penalty", &self.legacy_h1_penalty)
            .finish()
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forward every finding to `sink` as it is recorded
    pub fn with_sink(mut self, sink: impl Fn(&Finding) + Send + Sync + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Reproduce the legacy double deduction for a missing <h1>
    pub fn with_legacy_h1_penalty(mut self, enabled: bool) -> Self {
        self.legacy_h1_penalty = enabled;
        self
    }

    /// Records a finding and applies its deduction
    pub fn record(&mut self, kind: FindingKind, message: impl Into<String>) {
        let mut deduction = kind.deduction();
        if kind == FindingKind::MissingH1 && self.legacy_h1_penalty {
            deduction += LEGACY_H1_EXTRA;
        }

        let finding = Finding {
            severity: kind.severity(),
            kind,
            message: message.into(),
            deduction,
        };

        if let Some(sink) = &self.sink {
            sink(&finding);
        }

        self.deducted += u64::from(deduction);
        self.findings.push(finding);
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn into_findings(self) -> Vec<Finding> {
        self.findings
    }

    /// Sum of every deduction so far
    pub fn total_deducted(&self) -> u64 {
        self.deducted
    }

    /// Unclamped running score; can drop below zero
    pub fn raw_score(&self) -> i64 {
        STARTING_SCORE - self.deducted as i64
    }

    /// Score as displayed: clamped to 0..=100
    pub fn score(&self) -> u32 {
        self.raw_score().clamp(0, STARTING_SCORE) as u32
    }

    #[cfg(test)]
    pub fn count(&self, kind: FindingKind) -> usize {
        self.findings.iter().filter(|f| f.kind == kind).count()
    }
}

/// Qualitative band for the final score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    Good,
    Fair,
    Poor,
}

impl ScoreBand {
    pub fn for_score(score: u32) -> Self {
        if score >= 80 {
            ScoreBand::Good
        } else if score >= 50 {
            ScoreBand::Fair
        } else {
            ScoreBand::Poor
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_full_score() {
        let ledger = Ledger::new();
        assert_eq!(ledger.score(), 100);
        assert!(ledger.findings().is_empty());
    }

    #[test]
    fn test_deductions_by_kind() {
        let mut ledger = Ledger::new();
        ledger.record(FindingKind::DeadLink, "a.html: Dead link: /x");
        ledger.record(FindingKind::OrphanPage, "b.html");
        ledger.record(FindingKind::RelativeLink, "a.html: x");
        ledger.record(FindingKind::BrokenExternalLink, "https://gone.example");
        assert_eq!(ledger.total_deducted(), 10 + 5 + 2 + 5);
        assert_eq!(ledger.score(), 78);
    }

    #[test]
    fn test_exempt_findings_do_not_deduct() {
        let mut ledger = Ledger::new();
        ledger.record(FindingKind::ExternalUnreachable, "timeout");
        ledger.record(FindingKind::ConfigDetection, "no index.html");
        ledger.record(FindingKind::MissingBreadcrumb, "deep/page.html");
        ledger.record(FindingKind::Summary, "no orphans");
        assert_eq!(ledger.score(), 100);
        assert_eq!(ledger.findings().len(), 4);
    }

    #[test]
    fn test_missing_h1_single_vs_legacy() {
        let mut ledger = Ledger::new();
        ledger.record(FindingKind::MissingH1, "about.html");
        assert_eq!(ledger.score(), 90);

        let mut legacy = Ledger::new().with_legacy_h1_penalty(true);
        legacy.record(FindingKind::MissingH1, "about.html");
        assert_eq!(legacy.score(), 85);
        assert_eq!(legacy.findings()[0].deduction, 15);
    }

    #[test]
    fn test_score_clamps_only_when_read() {
        let mut ledger = Ledger::new();
        for i in 0..15 {
            ledger.record(FindingKind::DeadLink, format!("dead {}", i));
        }
        assert_eq!(ledger.raw_score(), -50);
        assert_eq!(ledger.score(), 0);
    }

    #[test]
    fn test_findings_keep_emission_order() {
        let mut ledger = Ledger::new();
        ledger.record(FindingKind::MultipleH1, "first");
        ledger.record(FindingKind::DeadLink, "second");
        let messages: Vec<_> = ledger.findings().iter().map(|f| f.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second"]);
        assert_eq!(ledger.findings()[1].severity, Severity::Error);
    }

    #[test]
    fn test_score_bands() {
        assert_eq!(ScoreBand::for_score(100), ScoreBand::Good);
        assert_eq!(ScoreBand::for_score(80), ScoreBand::Good);
        assert_eq!(ScoreBand::for_score(79), ScoreBand::Fair);
        assert_eq!(ScoreBand::for_score(50), ScoreBand::Fair);
        assert_eq!(ScoreBand::for_score(49), ScoreBand::Poor);
        assert_eq!(ScoreBand::for_score(0), ScoreBand::Poor);
    }

    #[test]
    fn test_sink_sees_findings_in_order() {
        use std::sync::{Arc, Mutex};

        let seen = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&seen);
        let mut ledger = Ledger::new()
            .with_sink(move |f: &Finding| captured.lock().unwrap().push(f.message.clone()));
        ledger.record(FindingKind::OrphanPage, "a.html");
        ledger.record(FindingKind::Summary, "done");

        assert_eq!(*seen.lock().unwrap(), vec!["a.html", "done"]);
        assert_eq!(ledger.score(), 95);
    }
}
