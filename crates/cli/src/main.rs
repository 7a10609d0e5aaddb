//! CLI for the txguard transaction risk analyzer.
//!
//! Pipeline: resolve/decode -> heuristics -> score -> simulate -> explain -> report.

use alloy_primitives::{Address, U256};
use clap::{Args, Parser, Subcommand};
use std::io::BufRead;
use std::path::PathBuf;
use std::time::Instant;
use txguard_analyzer::reporter::Report;
use txguard_analyzer::sink::json_stream::JsonStreamSink;
use txguard_analyzer::sink::{AnalysisRow, FindingRow};
use txguard_analyzer::{AnalysisRequest, Analyzer, HeuristicConfig};
use txguard_core::{AnalysisResult, GuardError, TransactionInput, UnsignedTx};
use txguard_provider::ReferenceSets;

#[derive(Parser, Debug)]
#[command(name = "txguard", version, about = "Pre-signing transaction risk analyzer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze one transaction against a live chain.
    Analyze {
        #[arg(short, long, env = "TXGUARD_RPC_URL")]
        rpc_url: String,

        #[command(flatten)]
        input: InputArgs,

        /// Wallet that would sign; used as the simulation sender.
        #[arg(short, long)]
        wallet: Option<String>,

        #[command(flatten)]
        risk: RiskArgs,

        #[arg(long, default_value_t = false)]
        json: bool,

        /// Sink output: "ndjson" writes NDJSON to stdout,
        /// "ndjson:/path/to/file" writes to file.
        #[arg(long)]
        sink: Option<String>,
    },

    /// Decode calldata without chain access.
    Decode {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Score transactions offline (no simulation, no explanation).
    Score {
        #[command(flatten)]
        input: InputArgs,

        /// NDJSON file of inputs (`{"to":..,"calldata":..}` per line); "-" for stdin.
        #[arg(long, conflicts_with_all = ["tx_hash", "to", "unsigned"])]
        batch: Option<PathBuf>,

        #[command(flatten)]
        risk: RiskArgs,
    },

    /// Print the unsigned transaction that revokes an ERC-20 allowance.
    Revoke {
        #[arg(long)]
        token: Address,

        #[arg(long)]
        spender: Address,
    },
}

/// One of: `--tx-hash`, `--unsigned`, or `--to` with optional calldata/value.
#[derive(Args, Debug)]
struct InputArgs {
    #[arg(long)]
    tx_hash: Option<String>,

    /// Unsigned transaction as JSON: {"to":..,"data":..,"value":..}.
    #[arg(long)]
    unsigned: Option<String>,

    #[arg(long)]
    to: Option<String>,

    #[arg(long, requires = "to")]
    calldata: Option<String>,

    /// Native value in wei (decimal or 0x hex).
    #[arg(long)]
    value: Option<String>,
}

impl InputArgs {
    fn is_empty(&self) -> bool {
        self.tx_hash.is_none() && self.unsigned.is_none() && self.to.is_none()
    }

    fn into_input(self) -> Result<TransactionInput, GuardError> {
        let unsigned_tx = self
            .unsigned
            .as_deref()
            .map(serde_json::from_str::<UnsignedTx>)
            .transpose()
            .map_err(|e| GuardError::InvalidInput(format!("--unsigned: {e}")))?;

        // A bare `--to` is a plain value transfer.
        let calldata = match (&self.to, self.calldata) {
            (Some(_), None) => Some("0x".to_string()),
            (_, calldata) => calldata,
        };

        Ok(TransactionInput {
            tx_hash: self.tx_hash,
            unsigned_tx,
            calldata,
            to: self.to,
            value: self.value,
        })
    }
}

#[derive(Args, Debug)]
struct RiskArgs {
    /// Native value (wei) above which a transfer is flagged.
    #[arg(long, env = "TXGUARD_HIGH_VALUE_THRESHOLD", value_parser = parse_wei)]
    high_value_threshold: Option<U256>,

    /// Extra malicious addresses, one per line.
    #[arg(long, env = "TXGUARD_MALICIOUS_LIST")]
    malicious_list: Option<PathBuf>,
}

impl RiskArgs {
    fn build(&self) -> Result<(ReferenceSets, HeuristicConfig), GuardError> {
        let mut refs = ReferenceSets::builtin();
        if let Some(path) = &self.malicious_list {
            refs = refs.load_malicious_file(path)?;
        }
        let mut config = HeuristicConfig::default();
        if let Some(threshold) = self.high_value_threshold {
            config = config.with_high_value_threshold(threshold);
        }
        Ok((refs, config))
    }
}

fn parse_wei(s: &str) -> Result<U256, String> {
    s.trim().parse::<U256>().map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            rpc_url,
            input,
            wallet,
            risk,
            json,
            sink,
        } => {
            let t0 = Instant::now();
            let (refs, config) = risk.build()?;
            tracing::info!(
                rpc_url = %rpc_url,
                malicious = refs.malicious_count(),
                threshold = %config.high_value_threshold,
                "starting analysis"
            );

            let provider = txguard_provider::rpc::RpcProvider::connect(&rpc_url).await?;
            let analyzer = Analyzer::new(provider)
                .with_reference_sets(refs)
                .with_config(config);

            let mut request = AnalysisRequest::new(input.into_input()?);
            request.wallet_address = wallet;
            let result = analyzer.analyze(&request).await?;

            tracing::info!(
                id = %result.id,
                score = result.risk_score.score,
                elapsed_ms = t0.elapsed().as_millis(),
                "analysis complete"
            );

            let report = Report::build(&result);
            if let Some(ref sink_spec) = sink {
                if sink_spec == "ndjson" {
                    let n = write_sink(JsonStreamSink::stdout(), &result)?;
                    tracing::info!(rows = n, "ndjson sink: wrote to stdout");
                } else if let Some(path) = sink_spec.strip_prefix("ndjson:") {
                    let file = std::fs::File::create(path)?;
                    let n = write_sink(JsonStreamSink::new(file), &result)?;
                    tracing::info!(rows = n, path, "ndjson sink: wrote to file");
                } else {
                    eprintln!("Unknown sink: {sink_spec}. Use 'ndjson' or 'ndjson:/path'");
                }

                // Still print report to stderr so it's visible.
                eprint!("{}", report.render());
            } else if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print!("{}", report.render());
            }
        }

        Commands::Decode { input } => {
            let decoded = txguard_analyzer::decode_offline(&input.into_input()?)?;
            println!("{}", serde_json::to_string_pretty(&decoded)?);
        }

        Commands::Score { input, batch, risk } => {
            let (refs, config) = risk.build()?;

            let inputs = match batch {
                Some(path) => read_batch(&path)?,
                None if input.is_empty() => {
                    return Err("provide --batch or one of --tx-hash/--to/--unsigned".into())
                }
                None => vec![input.into_input()?],
            };

            let t0 = Instant::now();
            let results = txguard_analyzer::score_batch(&inputs, &refs, &config);
            let mut out = JsonStreamSink::stdout();
            let mut failed = 0usize;
            for r in &results {
                match r {
                    Ok(assessment) => out.write_line(assessment)?,
                    Err(e) => {
                        failed += 1;
                        out.write_line(&serde_json::json!({ "error": e.to_string() }))?;
                    }
                }
            }
            let n = out.finish()?;
            tracing::info!(
                rows = n,
                failed,
                elapsed_ms = t0.elapsed().as_millis(),
                "batch scored"
            );
        }

        Commands::Revoke { token, spender } => {
            let tx = txguard_analyzer::prepare_revoke(token, spender);
            println!("{}", serde_json::to_string_pretty(&tx)?);
        }
    }

    Ok(())
}

fn write_sink<W: std::io::Write>(
    mut sink: JsonStreamSink<W>,
    result: &AnalysisResult,
) -> std::io::Result<usize> {
    sink.write_row(&AnalysisRow::from_result(result))?;
    sink.write_findings(&FindingRow::from_result(result))?;
    sink.finish()
}

/// Reads one `TransactionInput` per non-blank line.
fn read_batch(path: &PathBuf) -> Result<Vec<TransactionInput>, Box<dyn std::error::Error>> {
    let reader: Box<dyn BufRead> = if path.as_os_str() == "-" {
        Box::new(std::io::stdin().lock())
    } else {
        Box::new(std::io::BufReader::new(std::fs::File::open(path)?))
    };

    let mut inputs = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let input = serde_json::from_str(&line)
            .map_err(|e| GuardError::InvalidInput(format!("line {}: {e}", i + 1)))?;
        inputs.push(input);
    }
    tracing::info!(inputs = inputs.len(), path = %path.display(), "read batch");
    Ok(inputs)
}
