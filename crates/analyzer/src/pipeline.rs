//! End-to-end analysis: decode → heuristics → score → (simulate ∥ value at
//! risk) → explanation → [`AnalysisResult`].

use crate::decoder;
use crate::explain::{self, Explainer};
use crate::heuristics::{self, HeuristicConfig};
use crate::scoring;
use crate::simulator;
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use txguard_core::error::{GuardError, GuardResult};
use txguard_core::{
    AnalysisResult, DecodedTransaction, Explanation, HeuristicResult, HeuristicResults,
    InputSource, RiskScore, TransactionInput,
};
use txguard_provider::{ChainAccess, ReferenceSets};

/// One analysis request: the transaction plus the wallet that would sign it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    #[serde(flatten)]
    pub input: TransactionInput,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
}

impl AnalysisRequest {
    pub fn new(input: TransactionInput) -> Self {
        Self {
            input,
            wallet_address: None,
        }
    }

    pub fn with_wallet(mut self, wallet: impl Into<String>) -> Self {
        self.wallet_address = Some(wallet.into());
        self
    }

    /// Parsed wallet address; `None` when absent.
    pub fn wallet(&self) -> GuardResult<Option<Address>> {
        self.wallet_address
            .as_deref()
            .map(|w| {
                w.trim()
                    .parse::<Address>()
                    .map_err(|e| GuardError::InvalidInput(format!("walletAddress {w:?}: {e}")))
            })
            .transpose()
    }
}

/// Chain-free part of an analysis.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    #[serde(rename = "decodedTx")]
    pub decoded: DecodedTransaction,
    pub heuristics: HeuristicResults,
    pub risk_score: RiskScore,
}

/// Runs the heuristics over a decoded transaction and scores them.
pub fn assess(
    decoded: DecodedTransaction,
    refs: &ReferenceSets,
    config: &HeuristicConfig,
) -> Assessment {
    let heuristics = heuristics::run_all(&decoded, refs, config);
    let risk_score = RiskScore::from(scoring::aggregate(&heuristics));
    Assessment {
        decoded,
        heuristics,
        risk_score,
    }
}

/// Decodes and assesses many inputs in parallel. Output order matches input
/// order; each entry fails independently.
pub fn score_batch(
    inputs: &[TransactionInput],
    refs: &ReferenceSets,
    config: &HeuristicConfig,
) -> Vec<GuardResult<Assessment>> {
    use rayon::prelude::*;

    tracing::info!(inputs = inputs.len(), "batch scoring");
    inputs
        .par_iter()
        .map(|input| decoder::decode_offline(input).map(|d| assess(d, refs, config)))
        .collect()
}

/// Owns the collaborators for repeated analyses.
pub struct Analyzer<C> {
    chain: C,
    refs: ReferenceSets,
    config: HeuristicConfig,
    explainer: Option<Box<dyn Explainer>>,
}

impl<C: ChainAccess> Analyzer<C> {
    pub fn new(chain: C) -> Self {
        Self {
            chain,
            refs: ReferenceSets::builtin(),
            config: HeuristicConfig::default(),
            explainer: None,
        }
    }

    pub fn with_reference_sets(mut self, refs: ReferenceSets) -> Self {
        self.refs = refs;
        self
    }

    pub fn with_config(mut self, config: HeuristicConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_explainer(mut self, explainer: impl Explainer + 'static) -> Self {
        self.explainer = Some(Box::new(explainer));
        self
    }

    pub fn chain(&self) -> &C {
        &self.chain
    }

    pub fn config(&self) -> &HeuristicConfig {
        &self.config
    }

    pub fn assess(&self, decoded: DecodedTransaction) -> Assessment {
        assess(decoded, &self.refs, &self.config)
    }

    pub fn score_batch(&self, inputs: &[TransactionInput]) -> Vec<GuardResult<Assessment>> {
        score_batch(inputs, &self.refs, &self.config)
    }

    /// Full analysis. Only input and hash-resolution failures are errors;
    /// simulation and explanation problems are reported inside the result.
    pub async fn analyze(&self, request: &AnalysisRequest) -> GuardResult<AnalysisResult> {
        let wallet = request.wallet()?;
        let tx_hash = match request.input.source()? {
            InputSource::Hash(hash) => Some(hash),
            InputSource::Raw(_) => None,
        };

        let decoded = decoder::decode(&request.input, &self.chain).await?;
        tracing::info!(summary = %decoded.human_readable, "decoded");

        let Assessment {
            decoded,
            heuristics,
            risk_score,
        } = self.assess(decoded);
        tracing::info!(
            score = risk_score.score,
            level = %risk_score.level,
            failed = heuristics.iter().filter(|h| !h.passed).count(),
            "scored"
        );

        let (mut simulation, value_at_risk) = tokio::join!(
            simulator::simulate(&decoded, wallet, &self.chain),
            std::future::ready(simulator::estimate_value_at_risk(&decoded)),
        );
        simulation.value_at_risk = Some(value_at_risk.to_string());
        tracing::info!(
            success = simulation.success,
            value_at_risk = %value_at_risk,
            "simulated"
        );

        let Explanation {
            explanation,
            recommendations,
        } = self.explain(&decoded, &heuristics, &risk_score).await;

        Ok(AnalysisResult {
            id: uuid::Uuid::new_v4().to_string(),
            wallet_address: wallet,
            tx_hash,
            input_data: request.input.clone(),
            risk_score,
            explanation,
            recommendations,
            decoded,
            heuristics: heuristics.into_vec(),
            simulation,
            created_at: chrono::Utc::now(),
        })
    }

    async fn explain(
        &self,
        decoded: &DecodedTransaction,
        heuristics: &[HeuristicResult],
        score: &RiskScore,
    ) -> Explanation {
        let Some(explainer) = &self.explainer else {
            return explain::fallback(heuristics, score.level);
        };
        match explainer.explain(decoded, heuristics, score).await {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!(error = %e, "explainer failed, using fallback");
                explain::fallback(heuristics, score.level)
            }
        }
    }
}
