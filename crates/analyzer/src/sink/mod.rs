//! Persistence handoff for finished analyses.
//!
//! Two row schemas:
//! - [`AnalysisRow`]: one per analysis, flattened for columnar stores
//! - [`FindingRow`]: one per failed check (denormalized)
//!
//! Full [`AnalysisResult`]s can also be written as-is. The only backend is
//! the NDJSON stream in [`json_stream`]; the analyzer never reads back.

pub mod json_stream;

use serde::Serialize;
use txguard_core::AnalysisResult;

// ---------------------------------------------------------------------------
// Serializable row types
// ---------------------------------------------------------------------------

/// One row per analysis.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRow {
    pub id: String,
    pub wallet_address: Option<String>,
    pub tx_hash: Option<String>,
    pub target_address: Option<String>,
    pub target_protocol: String,
    pub target_name: String,
    pub function_name: Option<String>,
    pub human_readable: String,
    pub value_wei: String,
    pub risk_score: u8,
    pub risk_level: String,
    pub risk_label: String,
    pub failed_checks: u32,
    pub simulation_success: bool,
    pub value_at_risk: Option<String>,
    pub created_at: String,
}

/// One row per failed check.
#[derive(Debug, Clone, Serialize)]
pub struct FindingRow {
    pub analysis_id: String,
    pub check: String,
    pub severity: String,
    pub message: String,
    pub created_at: String,
}

// ---------------------------------------------------------------------------
// Builder: AnalysisResult → Rows
// ---------------------------------------------------------------------------

impl AnalysisRow {
    pub fn from_result(result: &AnalysisResult) -> Self {
        let (protocol, name) = match result
            .decoded
            .to
            .and_then(|a| txguard_provider::labels::lookup(&a))
        {
            Some(l) => (l.protocol.to_string(), l.name.to_string()),
            None => ("Unknown".into(), String::new()),
        };

        AnalysisRow {
            id: result.id.clone(),
            wallet_address: result.wallet_address.map(|a| a.to_string()),
            tx_hash: result.tx_hash.map(|h| h.to_string()),
            target_address: result.decoded.to.map(|a| a.to_string()),
            target_protocol: protocol,
            target_name: name,
            function_name: result.decoded.function.map(|f| f.name().to_string()),
            human_readable: result.decoded.human_readable.clone(),
            value_wei: result.decoded.value.to_string(),
            risk_score: result.risk_score.score,
            risk_level: result.risk_score.level.to_string(),
            risk_label: result.risk_score.label.to_string(),
            failed_checks: result.heuristics.iter().filter(|h| !h.passed).count() as u32,
            simulation_success: result.simulation.success,
            value_at_risk: result.simulation.value_at_risk.clone(),
            created_at: result.created_at.to_rfc3339(),
        }
    }
}

impl FindingRow {
    pub fn from_result(result: &AnalysisResult) -> Vec<Self> {
        let created_at = result.created_at.to_rfc3339();
        result
            .heuristics
            .iter()
            .filter(|h| !h.passed)
            .map(|h| FindingRow {
                analysis_id: result.id.clone(),
                check: h.check.as_str().to_string(),
                severity: h.severity.to_string(),
                message: h.message.clone(),
                created_at: created_at.clone(),
            })
            .collect()
    }
}
