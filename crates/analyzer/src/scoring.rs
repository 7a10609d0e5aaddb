//! Heuristic results → numeric score.

use txguard_core::{HeuristicResult, HeuristicScore, RiskLevel};

/// Failed-check counts per severity tier.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TierCounts {
    pub critical: u32,
    pub high: u32,
    pub medium: u32,
    pub low: u32,
}

impl TierCounts {
    pub fn tally(results: &[HeuristicResult]) -> Self {
        let mut counts = Self::default();
        for r in results.iter().filter(|r| !r.passed) {
            match r.severity {
                RiskLevel::Critical => counts.critical += 1,
                RiskLevel::High => counts.high += 1,
                RiskLevel::Medium => counts.medium += 1,
                RiskLevel::Low => counts.low += 1,
            }
        }
        counts
    }
}

/// Maps failed checks to a score. The highest non-empty tier decides:
///
/// | tier     | score                  |
/// |----------|------------------------|
/// | critical | `85 + min(5n, 15)`     |
/// | high     | `60 + min(10n, 25)`    |
/// | medium   | `30 + min(10n, 30)`    |
/// | low      | `min(5n, 30)`          |
///
/// Passed checks never contribute, whatever their severity.
pub fn aggregate(results: &[HeuristicResult]) -> HeuristicScore {
    let c = TierCounts::tally(results);
    let score = if c.critical > 0 {
        85 + (5 * c.critical).min(15)
    } else if c.high > 0 {
        60 + (10 * c.high).min(25)
    } else if c.medium > 0 {
        30 + (10 * c.medium).min(30)
    } else {
        (5 * c.low).min(30)
    };

    let score = score.min(100) as u8;
    HeuristicScore {
        score,
        level: RiskLevel::from_score(score),
    }
}
