//! Terminal report for a finished analysis.
//!
//! Takes an [`AnalysisResult`] and produces a boxed, human-readable summary
//! with the target's contract label, failed checks, and recommendations.

use alloy_primitives::Address;
use txguard_core::{AnalysisResult, HeuristicKind, RiskLevel};

const INNER_WIDTH: usize = 62;

/// Report view built from an [`AnalysisResult`].
#[derive(Debug)]
pub struct Report {
    pub id: String,
    pub score: u8,
    pub level: RiskLevel,
    pub label: String,
    pub summary: String,
    pub target: Option<Target>,
    pub function: String,
    pub value_at_risk: String,
    pub simulation: String,
    pub findings: Vec<Finding>,
    pub advisories: Vec<String>,
    pub explanation: String,
    pub recommendations: Vec<String>,
}

/// The contract or account the transaction is sent to.
#[derive(Debug)]
pub struct Target {
    pub address: Address,
    pub protocol: String,
    pub name: String,
}

/// A failed check.
#[derive(Debug)]
pub struct Finding {
    pub check: HeuristicKind,
    pub severity: RiskLevel,
    pub message: String,
}

impl Target {
    pub fn resolve(address: Address) -> Self {
        let (protocol, name) = match txguard_provider::labels::lookup(&address) {
            Some(l) => (l.protocol.to_string(), l.name.to_string()),
            None => ("Unknown".to_string(), format!("{address}")),
        };
        Self {
            address,
            protocol,
            name,
        }
    }
}

impl Report {
    pub fn build(result: &AnalysisResult) -> Self {
        let mut findings: Vec<Finding> = result
            .heuristics
            .iter()
            .filter(|h| !h.passed)
            .map(|h| Finding {
                check: h.check,
                severity: h.severity,
                message: h.message.clone(),
            })
            .collect();
        // Worst first.
        findings.sort_by(|a, b| b.severity.cmp(&a.severity));

        // Passed checks that still carry a warning tier.
        let advisories = result
            .heuristics
            .iter()
            .filter(|h| h.passed && h.severity > RiskLevel::Low)
            .map(|h| h.message.clone())
            .collect();

        let sim = &result.simulation;
        let simulation = if sim.success {
            "ok".to_string()
        } else {
            let reason = sim.error.as_deref().unwrap_or("unknown error");
            format!("failed: {reason}")
        };

        Report {
            id: result.id.clone(),
            score: result.risk_score.score,
            level: result.risk_score.level,
            label: result.risk_score.label.to_string(),
            summary: result.decoded.human_readable.clone(),
            target: result.decoded.to.map(Target::resolve),
            function: result
                .decoded
                .function
                .map(|f| f.name().to_string())
                .unwrap_or_else(|| "-".to_string()),
            value_at_risk: sim.value_at_risk.clone().unwrap_or_else(|| "-".to_string()),
            simulation,
            findings,
            advisories,
            explanation: result.explanation.clone(),
            recommendations: result.recommendations.clone(),
        }
    }

    /// Render the report as a boxed string.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let rule = "═".repeat(INNER_WIDTH);

        out.push('\n');
        out.push_str(&format!("╔{rule}╗\n"));
        out.push_str(&format!(
            "║{:^w$}║\n",
            "TXGUARD RISK REPORT",
            w = INNER_WIDTH
        ));
        out.push_str(&format!("╠{rule}╣\n"));
        field(
            &mut out,
            "Risk",
            &format!("{} ({}/100, {})", self.label, self.score, self.level),
        );
        field(&mut out, "Action", &self.summary);
        match &self.target {
            Some(t) => {
                field(&mut out, "Target", &format!("{} / {}", t.protocol, t.name));
                field(&mut out, "Address", &t.address.to_string());
            }
            None => field(&mut out, "Target", "(contract creation)"),
        }
        field(&mut out, "Function", &self.function);
        field(&mut out, "Value at risk", &self.value_at_risk);
        field(&mut out, "Simulation", &self.simulation);
        out.push_str(&format!("╠{rule}╣\n"));

        if self.findings.is_empty() {
            line(&mut out, "No failed checks.");
        } else {
            line(&mut out, "FINDINGS");
            for (i, f) in self.findings.iter().enumerate() {
                line(
                    &mut out,
                    &format!(
                        "{}. [{}] {}",
                        i + 1,
                        f.severity.as_str().to_uppercase(),
                        f.message
                    ),
                );
            }
        }
        for a in &self.advisories {
            line(&mut out, &format!("note: {a}"));
        }

        out.push_str(&format!("╠{rule}╣\n"));
        for chunk in wrap(&self.explanation, INNER_WIDTH - 4) {
            line(&mut out, &chunk);
        }
        line(&mut out, "");
        for (i, r) in self.recommendations.iter().enumerate() {
            line(&mut out, &format!("{}. {r}", i + 1));
        }
        out.push_str(&format!("╚{rule}╝\n"));
        out.push_str(&format!("  id: {}\n", self.id));
        out
    }
}

fn field(out: &mut String, name: &str, value: &str) {
    line(out, &format!("{:<15} {value}", format!("{name}:")));
}

/// Long lines run past the right border rather than being cut.
fn line(out: &mut String, text: &str) {
    let pad = (INNER_WIDTH - 2).saturating_sub(text.chars().count());
    out.push_str(&format!("║  {text}{}║\n", " ".repeat(pad)));
}

fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::decode_offline;
    use crate::explain;
    use crate::heuristics::{run_all, HeuristicConfig};
    use crate::scoring::aggregate;
    use txguard_core::{RiskScore, SimulationResult, TransactionInput};
    use txguard_provider::ReferenceSets;

    const USDC_BASE: &str = "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913";

    fn analysis(calldata: &str) -> AnalysisResult {
        let input = TransactionInput::calldata(USDC_BASE, calldata);
        let decoded = decode_offline(&input).unwrap();
        let refs = ReferenceSets::builtin();
        let heuristics = run_all(&decoded, &refs, &HeuristicConfig::default());
        let risk_score = RiskScore::from(aggregate(&heuristics));
        let e = explain::fallback(&heuristics, risk_score.level);
        AnalysisResult {
            id: "test".into(),
            wallet_address: None,
            tx_hash: None,
            input_data: input,
            risk_score,
            explanation: e.explanation,
            recommendations: e.recommendations,
            decoded,
            heuristics: heuristics.into_vec(),
            simulation: SimulationResult::reverted("Transaction would revert"),
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn labels_known_target() {
        let report = Report::build(&analysis("0x"));
        let target = report.target.unwrap();
        assert_eq!(target.protocol, "USDC");
        assert!(report.findings.is_empty());
    }

    #[test]
    fn renders_findings_worst_first() {
        let calldata = format!(
            "0x095ea7b3{:0>64}{}",
            "742d35cc6634c0532925a3b844bc9e7595f0beb0",
            "f".repeat(64)
        );
        let report = Report::build(&analysis(&calldata));
        assert_eq!(report.findings[0].severity, RiskLevel::Critical);

        let text = report.render();
        assert!(text.contains("TXGUARD RISK REPORT"));
        assert!(text.contains("[CRITICAL] This approval sets an unlimited"));
        assert!(text.contains("Critical Risk (90/100, critical)"));
        assert!(text.contains("failed: Transaction would revert"));
        assert!(text.contains("1. Do not sign this transaction"));
    }

    #[test]
    fn wrap_respects_width() {
        let lines = wrap("one two three four five six", 9);
        assert_eq!(lines, vec!["one two", "three", "four five", "six"]);
    }
}
