//! Property tests for subnet suggestions over seeded random hit sets.

use hitsift_engine::{
    Address, AttributeKind, CountedHit, EngineConfig, Hit, Suggestion, SuggestionEngine,
};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::net::Ipv4Addr;

const SEEDS: [u64; 6] = [1, 7, 42, 1_337, 65_537, 2_024];

/// Destination-only hits clustered in 10.0.0.0/22 so that merges happen.
fn random_hits(seed: u64) -> Vec<CountedHit> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let n = rng.gen_range(1..200);
    (0..n)
        .map(|_| {
            let ip = Ipv4Addr::from(0x0A00_0000u32 | rng.gen_range(0..1024u32));
            let count = rng.gen_range(1..50u64);
            CountedHit::new(Hit::default().with_destination(Address::host_v4(ip)), count)
        })
        .collect()
}

fn engine(rule_weight: f64) -> SuggestionEngine {
    SuggestionEngine::new(EngineConfig::new().with_rule_weight(rule_weight)).unwrap()
}

fn all_suggestions(hits: &[CountedHit], rule_weight: f64) -> Vec<Suggestion> {
    engine(rule_weight)
        .suggest(hits, AttributeKind::Destination, usize::MAX)
        .unwrap()
}

fn subnet(s: &Suggestion) -> Address {
    *s.value.as_address().unwrap()
}

// ===========================================
// Idempotence
// ===========================================

#[test]
fn test_repeated_calls_are_identical() {
    for seed in SEEDS {
        let hits = random_hits(seed);
        let first = all_suggestions(&hits, 50.0);
        let second = all_suggestions(&hits, 50.0);
        assert_eq!(first, second, "seed {seed}");
    }
}

#[test]
fn test_input_order_does_not_matter() {
    for seed in SEEDS {
        let hits = random_hits(seed);
        let mut shuffled = hits.clone();
        shuffled.shuffle(&mut ChaCha8Rng::seed_from_u64(seed ^ 0xFFFF));

        assert_eq!(
            all_suggestions(&hits, 50.0),
            all_suggestions(&shuffled, 50.0),
            "seed {seed}"
        );
    }
}

#[test]
fn test_layer_threading_does_not_change_results() {
    let threaded = SuggestionEngine::new(
        EngineConfig::new()
            .with_rule_weight(50.0)
            .with_parallel(true)
            .with_max_threads(4)
            .with_parallel_threshold(2),
    )
    .unwrap();

    for seed in SEEDS {
        let hits = random_hits(seed);
        let suggestions = threaded
            .suggest(&hits, AttributeKind::Destination, usize::MAX)
            .unwrap();
        assert_eq!(suggestions, all_suggestions(&hits, 50.0), "seed {seed}");
    }
}

// ===========================================
// Coverage conservation
// ===========================================

#[test]
fn test_suggestions_partition_all_hits() {
    for seed in SEEDS {
        let hits = random_hits(seed);
        let total: u64 = hits.iter().map(|h| h.count).sum();

        for rule_weight in [1.0, 30.0, 500.0, 10_000.0] {
            let suggestions = all_suggestions(&hits, rule_weight);
            let covered: u64 = suggestions.iter().map(|s| s.size).sum();
            assert_eq!(covered, total, "seed {seed}, weight {rule_weight}");

            // Every hit lies in exactly one suggested subnet.
            for h in &hits {
                let destination = h.hit.destination.unwrap();
                let owners = suggestions
                    .iter()
                    .filter(|s| subnet(s).contains(&destination))
                    .count();
                assert_eq!(owners, 1, "seed {seed}, weight {rule_weight}, {destination}");
            }
        }
    }
}

#[test]
fn test_scores_bounded_by_rule_weight() {
    for seed in SEEDS {
        let hits = random_hits(seed);
        let rule_weight = 40.0;
        for s in all_suggestions(&hits, rule_weight) {
            assert!(s.score > 0.0);
            assert!(s.score <= 1.0 / rule_weight, "seed {seed}: {s:?}");
        }
    }
}

// ===========================================
// Monotonic generality
// ===========================================

#[test]
fn test_higher_weight_never_adds_rules() {
    let weights = [0.5, 4.0, 32.0, 256.0, 2_048.0, 16_384.0, 1e9];
    for seed in SEEDS {
        let hits = random_hits(seed);
        let counts: Vec<usize> = weights
            .iter()
            .map(|&w| all_suggestions(&hits, w).len())
            .collect();

        assert!(
            counts.windows(2).all(|pair| pair[1] <= pair[0]),
            "seed {seed}: {counts:?}"
        );
        assert_eq!(*counts.last().unwrap(), 1, "seed {seed}");
    }
}

#[test]
fn test_tiny_weight_keeps_every_host() {
    for seed in SEEDS {
        let hits = random_hits(seed);
        let distinct = engine(1e-6)
            .suggest_detailed(&hits, AttributeKind::Destination, usize::MAX)
            .unwrap()
            .distinct_values;
        let suggestions = all_suggestions(&hits, 1e-6);

        assert_eq!(suggestions.len(), distinct, "seed {seed}");
        assert!(suggestions.iter().all(|s| subnet(s).prefix_len() == 32));
    }
}

// ===========================================
// Ranking and tie-break
// ===========================================

#[test]
fn test_ranked_by_size_descending() {
    for seed in SEEDS {
        let hits = random_hits(seed);
        let suggestions = all_suggestions(&hits, 30.0);
        assert!(
            suggestions.windows(2).all(|pair| pair[0].size >= pair[1].size),
            "seed {seed}"
        );
    }
}

#[test]
fn test_equal_costs_prefer_single_rule() {
    // Two sibling hosts with one hit each: union = 2 * (1 + 0) + 2 = 4,
    // separated = 2 + 2 = 4.
    let hits: Vec<CountedHit> = ["10.0.0.0", "10.0.0.1"]
        .iter()
        .map(|a| CountedHit::new(Hit::default().with_destination(a.parse().unwrap()), 1))
        .collect();

    for _ in 0..3 {
        let suggestions = all_suggestions(&hits, 2.0);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].value.to_string(), "10.0.0.0/31");
        assert_eq!(suggestions[0].size, 2);
        assert_eq!(suggestions[0].score, 0.25);
    }
}

// ===========================================
// Output shape
// ===========================================

#[test]
fn test_suggestions_serialize_as_json_records() {
    let hits: Vec<CountedHit> = [("0.0.0.0", 100), ("0.0.0.1", 50), ("0.0.0.2", 17), ("0.0.0.3", 8)]
        .iter()
        .map(|(a, count)| CountedHit::new(Hit::default().with_destination(a.parse().unwrap()), *count))
        .collect();

    let suggestions = all_suggestions(&hits, 127.0);
    let json = serde_json::to_value(&suggestions).unwrap();

    let values: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["value"].as_str().unwrap())
        .collect();
    assert_eq!(values, vec!["0.0.0.0/32", "0.0.0.1/32", "0.0.0.2/31"]);
    assert_eq!(json[2]["size"], 25);
    assert_eq!(json[2]["attribute"], "destination");
}
