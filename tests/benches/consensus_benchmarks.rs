//! # RePoW Consensus Benchmarks
//!
//! | Area | Operation |
//! |------|-----------|
//! | rp-01 Ethash | light hashimoto over a test-sized cache |
//! | rp-02 Difficulty | retarget per epoch |
//! | rp-02 Reputation | reward and decay arithmetic |
//! | rp-02 Engine | full header verification with a real seal |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use num_bigint::BigUint;
use primitive_types::H256;
use rp_01_ethash::{EthashConfig, EthashProvider};
use rp_02_consensus::domain::reputation::{compute_decay, compute_reward};
use rp_02_consensus::testing::{addr, test_chain_config, TestChain};
use rp_02_consensus::{
    calc_difficulty, ChainConfig, ConsensusEngine, EngineConfig, ReputationEngine,
    ReputationParams,
};
use shared_types::Header;
use std::time::Duration;

// ============================================================================
// rp-01: Ethash
// ============================================================================

fn bench_hashimoto_light(c: &mut Criterion) {
    let mut group = c.benchmark_group("rp-01-ethash");
    let provider = EthashProvider::new(EthashConfig::test()).unwrap();
    let cache = provider.cache(0);
    let hash = H256::repeat_byte(0x5a);

    group.bench_function("hashimoto_light", |b| {
        let mut nonce = 0u64;
        b.iter(|| {
            nonce = nonce.wrapping_add(1);
            black_box(cache.hashimoto(&hash, nonce))
        })
    });

    let dataset = provider.dataset(0, true);
    group.bench_function("hashimoto_full", |b| {
        let mut nonce = 0u64;
        b.iter(|| {
            nonce = nonce.wrapping_add(1);
            black_box(dataset.hashimoto(&hash, nonce))
        })
    });
    group.finish();
}

// ============================================================================
// rp-02: Difficulty
// ============================================================================

fn bench_calc_difficulty(c: &mut Criterion) {
    let mut group = c.benchmark_group("rp-02-difficulty");
    let parent = Header {
        number: 4_500_000,
        difficulty: BigUint::from(3_000_000_000_000u64),
        time: 1_600_000_000,
        ..Default::default()
    };

    for (name, config) in [
        ("frontier", ChainConfig::frontier()),
        ("homestead", ChainConfig::default()),
        ("constantinople", ChainConfig::all_forks()),
    ] {
        group.bench_with_input(BenchmarkId::new("calc_difficulty", name), &config, |b, config| {
            b.iter(|| black_box(calc_difficulty(config, parent.time + 17, &parent)))
        });
    }
    group.finish();
}

// ============================================================================
// rp-02: Reputation arithmetic
// ============================================================================

fn bench_reputation(c: &mut Criterion) {
    let mut group = c.benchmark_group("rp-02-reputation");
    let params = ReputationParams::default();
    let author = addr(1);

    let appearances = [0u64, 3, 10, 40];
    group.throughput(Throughput::Elements(appearances.len() as u64));
    group.bench_function("reward_and_decay", |b| {
        b.iter(|| {
            for a in appearances {
                black_box(compute_reward(&params, &author, 1_250, a));
                black_box(compute_decay(&params, 1_250, a));
            }
        })
    });
    group.finish();
}

// ============================================================================
// rp-02: Header verification
// ============================================================================

fn bench_verify_header(c: &mut Criterion) {
    let mut group = c.benchmark_group("rp-02-engine");
    group.measurement_time(Duration::from_secs(10));

    let engine = ReputationEngine::new(EngineConfig::test()).unwrap();
    let mut node = TestChain::new(engine, test_chain_config(), 32, 1_600_000_000);
    node.mine_many(&[addr(1), addr(2)], 8).unwrap();
    let head = node.head();
    let (block, _) = node
        .build_on(&head, addr(3), head.time + 13, Vec::new())
        .unwrap();

    group.bench_function("verify_header_sealed", |b| {
        b.iter(|| {
            black_box(
                node.engine
                    .verify_header(node.chain.as_ref(), block.header(), true),
            )
        })
    });
    group.bench_function("verify_header_unsealed", |b| {
        b.iter(|| {
            black_box(
                node.engine
                    .verify_header(node.chain.as_ref(), block.header(), false),
            )
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_hashimoto_light,
    bench_calc_difficulty,
    bench_reputation,
    bench_verify_header
);
criterion_main!(benches);
