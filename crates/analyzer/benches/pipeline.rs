use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::SolCall;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use txguard_analyzer::catalog::{IERC20, IERC721};
use txguard_analyzer::{
    assess, decode_offline, score_batch, AnalysisRequest, Analyzer, HeuristicConfig,
};
use txguard_core::TransactionInput;
use txguard_provider::mock::MockChain;
use txguard_provider::ReferenceSets;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn addr(i: u64) -> Address {
    Address::from_word(B256::from(U256::from(i)))
}

/// A rotating mix of the shapes seen in practice.
fn make_input(i: u64) -> TransactionInput {
    let to = addr(i % 50 + 1).to_string();
    let data: Vec<u8> = match i % 4 {
        0 => IERC20::approveCall {
            spender: addr(i),
            amount: U256::MAX,
        }
        .abi_encode(),
        1 => IERC20::transferCall {
            to: addr(i),
            amount: U256::from(i) * U256::from(10u64).pow(U256::from(18)),
        }
        .abi_encode(),
        2 => IERC721::setApprovalForAllCall {
            operator: addr(i),
            approved: i % 8 == 2,
        }
        .abi_encode(),
        _ => {
            return TransactionInput::calldata(to, "0x").with_value((i * 1_000_000_007).to_string())
        }
    };
    TransactionInput::calldata(to, Bytes::from(data).to_string())
}

// ---------------------------------------------------------------------------
// Benchmark: decode + heuristics + aggregation, single input
// ---------------------------------------------------------------------------

fn bench_assess_one(c: &mut Criterion) {
    let refs = ReferenceSets::builtin();
    let config = HeuristicConfig::default();

    let mut group = c.benchmark_group("assess_one");
    for (name, input) in [
        ("approve", make_input(0)),
        ("transfer", make_input(1)),
        ("nft_approval", make_input(2)),
        ("eth_send", make_input(3)),
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(name), &input, |b, input| {
            b.iter(|| {
                let decoded = decode_offline(black_box(input)).unwrap();
                black_box(assess(decoded, &refs, &config))
            });
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark: rayon batch scoring
// ---------------------------------------------------------------------------

fn bench_score_batch(c: &mut Criterion) {
    let refs = ReferenceSets::builtin();
    let config = HeuristicConfig::default();

    let mut group = c.benchmark_group("score_batch");
    for count in [100, 1_000, 10_000] {
        let inputs: Vec<TransactionInput> = (0..count).map(make_input).collect();
        group.bench_with_input(BenchmarkId::from_parameter(count), &inputs, |b, inputs| {
            b.iter(|| black_box(score_batch(inputs, &refs, &config)));
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark: full analysis against the mock chain
// ---------------------------------------------------------------------------

fn bench_analyze_mock(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let analyzer = Analyzer::new(
        MockChain::builder()
            .with_call_result(Bytes::from_static(&[1u8; 32]))
            .with_gas_estimate(46_000)
            .build(),
    );
    let request = AnalysisRequest::new(make_input(0)).with_wallet(addr(7).to_string());

    c.bench_function("analyze_mock", |b| {
        b.to_async(&rt)
            .iter(|| async { black_box(analyzer.analyze(&request).await.unwrap()) });
    });
}

criterion_group!(
    benches,
    bench_assess_one,
    bench_score_batch,
    bench_analyze_mock,
);
criterion_main!(benches);
