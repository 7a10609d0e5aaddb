//! Natural-language explanation of a risk assessment.
//!
//! [`Explainer`] is the seam to an external text generator. When none is
//! configured, or it fails, the pipeline substitutes the deterministic
//! [`fallback_explanation`] / [`fallback_recommendations`] pair.

use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;
use txguard_core::error::{GuardError, GuardResult};
use txguard_core::{DecodedTransaction, Explanation, HeuristicResult, RiskLevel, RiskScore};

pub const SYSTEM_PROMPT: &str = "You are a blockchain security expert analyzing Ethereum \
transactions. Provide clear, concise explanations of transaction risks and actionable \
recommendations. Always prioritize user safety.";

const MAX_OUTPUT_CHARS: usize = 1000;
const MAX_RECOMMENDATIONS: usize = 3;
const UNPARSED_EXPLANATION: &str =
    "Unable to generate explanation. Please review the transaction carefully.";

#[async_trait]
pub trait Explainer: Send + Sync {
    async fn explain(
        &self,
        tx: &DecodedTransaction,
        results: &[HeuristicResult],
        score: &RiskScore,
    ) -> GuardResult<Explanation>;
}

/// Rule-based explainer; never fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct FallbackExplainer;

#[async_trait]
impl Explainer for FallbackExplainer {
    async fn explain(
        &self,
        _tx: &DecodedTransaction,
        results: &[HeuristicResult],
        score: &RiskScore,
    ) -> GuardResult<Explanation> {
        Ok(fallback(results, score.level))
    }
}

pub fn fallback(results: &[HeuristicResult], level: RiskLevel) -> Explanation {
    Explanation {
        explanation: fallback_explanation(results, level),
        recommendations: fallback_recommendations(level),
    }
}

pub fn fallback_explanation(results: &[HeuristicResult], level: RiskLevel) -> String {
    let concerns: Vec<&str> = results
        .iter()
        .filter(|r| !r.passed)
        .map(|r| r.message.as_str())
        .collect();

    if concerns.is_empty() {
        return "This transaction appears to be low risk based on automated checks.".into();
    }

    let concerns = concerns.join(". ");
    match level {
        RiskLevel::Critical => format!(
            "CRITICAL RISK: This transaction has multiple security concerns: {concerns}. \
             We strongly recommend against proceeding."
        ),
        RiskLevel::High => format!(
            "HIGH RISK: This transaction has security concerns: {concerns}. \
             Please review carefully before proceeding."
        ),
        RiskLevel::Medium => format!(
            "MODERATE RISK: This transaction has some concerns: {concerns}. \
             Please verify the details before proceeding."
        ),
        RiskLevel::Low => {
            format!("This transaction appears relatively safe, but note: {concerns}.")
        }
    }
}

pub fn fallback_recommendations(level: RiskLevel) -> Vec<String> {
    let recs: [&str; 3] = match level {
        RiskLevel::Critical | RiskLevel::High => [
            "Do not sign this transaction",
            "Verify the contract address is legitimate",
            "Contact support if you're unsure",
        ],
        RiskLevel::Medium => [
            "Review all transaction details carefully",
            "Verify the receiving address is correct",
            "Consider starting with a small test amount",
        ],
        RiskLevel::Low => [
            "Verify the transaction details match your expectations",
            "Double-check the recipient address",
            "Ensure you trust the contract you're interacting with",
        ],
    };
    recs.iter().map(|s| s.to_string()).collect()
}

// ---------------------------------------------------------------------------
// Prompt-based explainer
// ---------------------------------------------------------------------------

/// A chat-style completion backend.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, system: &str, prompt: &str) -> GuardResult<String>;
}

/// Explains by prompting a [`TextGenerator`] and parsing its reply.
pub struct PromptExplainer<G> {
    generator: G,
}

impl<G: TextGenerator> PromptExplainer<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl<G: TextGenerator> Explainer for PromptExplainer<G> {
    async fn explain(
        &self,
        tx: &DecodedTransaction,
        results: &[HeuristicResult],
        score: &RiskScore,
    ) -> GuardResult<Explanation> {
        let prompt = build_prompt(tx, results, score);
        let reply = self
            .generator
            .generate(SYSTEM_PROMPT, &prompt)
            .await
            .map_err(|e| GuardError::Explanation(e.to_string()))?;

        let parsed = parse_response(&reply);
        Ok(Explanation {
            explanation: sanitize(&parsed.explanation),
            recommendations: parsed.recommendations.iter().map(|r| sanitize(r)).collect(),
        })
    }
}

pub fn build_prompt(
    tx: &DecodedTransaction,
    results: &[HeuristicResult],
    score: &RiskScore,
) -> String {
    let to = tx
        .to
        .map(|a| a.to_string())
        .unwrap_or_else(|| "(contract creation)".into());
    let function = tx.function.map(|f| f.name()).unwrap_or("Unknown");
    let concerns = results
        .iter()
        .filter(|r| !r.passed)
        .enumerate()
        .map(|(i, r)| format!("{}. {} (Severity: {})", i + 1, r.message, r.severity))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Analyze this blockchain transaction and provide a security assessment.

Transaction Details:
- To: {to}
- Value: {value} wei
- Function: {function}
- Human-readable: {summary}

Risk Score: {score}/100 ({level})

Security Concerns Detected:
{concerns}

Provide:
1. A clear explanation of the risks (2-3 sentences)
2. Three specific recommendations for the user

Format your response as:
EXPLANATION: [your explanation]
RECOMMENDATIONS:
1. [recommendation 1]
2. [recommendation 2]
3. [recommendation 3]",
        value = tx.value,
        summary = tx.human_readable,
        score = score.score,
        level = score.level,
    )
}

static EXPLANATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)EXPLANATION:\s*(.+?)(?:RECOMMENDATIONS:|$)").unwrap());
static RECOMMENDATIONS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)RECOMMENDATIONS:\s*(.+)").unwrap());
static ITEM_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+\.\s*").unwrap());
static SCRIPT_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b.*?</script>").unwrap());
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Splits a generator reply into explanation and at most three
/// recommendations. Falls back to the medium-tier list when the reply has no
/// numbered recommendations.
pub fn parse_response(content: &str) -> Explanation {
    let explanation = EXPLANATION_RE
        .captures(content)
        .map(|c| c[1].trim().to_string())
        .unwrap_or_else(|| UNPARSED_EXPLANATION.to_string());

    let recommendations: Vec<String> = RECOMMENDATIONS_RE
        .captures(content)
        .map(|c| {
            ITEM_NUMBER_RE
                .split(&c[1])
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .take(MAX_RECOMMENDATIONS)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let recommendations = if recommendations.is_empty() {
        fallback_recommendations(RiskLevel::Medium)
    } else {
        recommendations
    };

    Explanation {
        explanation,
        recommendations,
    }
}

/// Strips `<script>` blocks and HTML tags, caps length, trims.
pub fn sanitize(text: &str) -> String {
    let without_scripts = SCRIPT_BLOCK_RE.replace_all(text, "");
    let mut plain = TAG_RE.replace_all(&without_scripts, "").into_owned();

    if plain.chars().count() > MAX_OUTPUT_CHARS {
        let cut: String = plain.chars().take(MAX_OUTPUT_CHARS).collect();
        plain = cut + "...";
    }
    plain.trim().to_string()
}
