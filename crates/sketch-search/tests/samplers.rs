use std::collections::BTreeSet;

use proptest::prelude::*;
use sketch_core::{fork_random_state, LinearRandomEngine};
use sketch_search::{
    make_block_sampler, make_rule_sampler, ProbabilisticRuleSampler, RuleId, RuleSampler,
    WeightTable,
};

fn drain(strategy: &str, names: &[String], seed: i64) -> Vec<String> {
    let mut sampler = make_block_sampler(names, strategy, seed).unwrap();
    std::iter::from_fn(|| sampler.next_block()).collect()
}

#[test]
fn three_to_one_table_resolves_draws() {
    let a = RuleId::from_index(0);
    let b = RuleId::from_index(1);
    let mut table = WeightTable::new();
    table.push(a, 3);
    table.push(b, 1);
    assert_eq!(table.entries().collect::<Vec<_>>(), vec![(0, a), (3, b)]);
    assert_eq!(table.total(), 4);
    assert_eq!(table.locate(2), Some((a, 2)));
    assert_eq!(table.locate(3), Some((b, 0)));
}

#[test]
fn weighted_rule_sampler_converges_to_weights() {
    let rules = [RuleId::from_index(0), RuleId::from_index(1), RuleId::from_index(2)];
    let mut sampler = ProbabilisticRuleSampler::new(&rules, &[1, 2, 5], 2024).unwrap();
    assert_eq!(sampler.table().total(), 8);
    let mut hits = [0usize; 3];
    let trials = 8000;
    for _ in 0..trials {
        let rule = sampler.next_rule().unwrap();
        hits[rule.index()] += 1;
    }
    for (index, weight) in [1.0, 2.0, 5.0].iter().enumerate() {
        let share = hits[index] as f64 / trials as f64;
        assert!((share - weight / 8.0).abs() < 0.03, "rule {index} share {share}");
    }
}

#[test]
fn traversal_block_sampler_stays_exhausted() {
    let names: Vec<String> = ["C", "D", "E"].iter().map(|name| name.to_string()).collect();
    let mut sampler = make_block_sampler(&names, "traversal", 1).unwrap();
    assert_eq!(sampler.next_block().as_deref(), Some("C"));
    assert_eq!(sampler.next_block().as_deref(), Some("D"));
    assert_eq!(sampler.next_block().as_deref(), Some("E"));
    for _ in 0..4 {
        assert_eq!(sampler.next_block(), None);
    }
}

#[test]
fn unknown_sampler_strategy_is_config_error() {
    let err = make_block_sampler(&[], "reverse", 1).err().unwrap();
    assert!(err.is_config());
    let err = make_rule_sampler(&[], &[], "", 1).err().unwrap();
    assert!(err.is_config());
}

/// Parent state whose fork is exactly zero: its successor is `1_999_999_973`.
fn zero_fork_parent() -> i64 {
    let modulus = LinearRandomEngine::MODULUS as i128;
    let mut base = LinearRandomEngine::MULTIPLIER as i128;
    let mut exp = modulus - 2;
    let mut inverse = 1i128;
    while exp > 0 {
        if exp & 1 == 1 {
            inverse = inverse * base % modulus;
        }
        base = base * base % modulus;
        exp >>= 1;
    }
    (1_999_999_973i128 * inverse % modulus) as i64
}

#[test]
fn zero_forked_seed_still_drives_samplers() {
    let mut parent = zero_fork_parent();
    let seed = fork_random_state(&mut parent);
    assert_eq!(seed, 0);

    let rules = [RuleId::from_index(0), RuleId::from_index(1)];
    let mut zero = make_rule_sampler(&rules, &[1, 1], "probabilistic", seed).unwrap();
    let mut one = make_rule_sampler(&rules, &[1, 1], "probabilistic", 1).unwrap();
    let mut seen = BTreeSet::new();
    for _ in 0..200 {
        let rule = zero.next_rule().unwrap();
        assert_eq!(Some(rule), one.next_rule());
        seen.insert(rule.index());
    }
    assert_eq!(seen.len(), 2, "zero seed stuck on one rule");

    let names: Vec<String> = (0..8).map(|index| format!("B{index}")).collect();
    assert_eq!(drain("probabilistic", &names, seed), drain("probabilistic", &names, 1));
    let mut sorted = drain("probabilistic", &names, seed);
    sorted.sort();
    assert_eq!(sorted, names);
}

proptest! {
    #[test]
    fn traversal_yields_each_block_once_in_order(
        names in prop::collection::btree_set("[a-z]{1,6}", 0..12)
    ) {
        let names: Vec<String> = names.into_iter().collect();
        prop_assert_eq!(drain("traversal", &names, 1), names);
    }

    #[test]
    fn probabilistic_blocks_are_drawn_without_replacement(
        names in prop::collection::btree_set("[a-z]{1,6}", 0..12),
        seed in 1i64..2_000_000_000,
    ) {
        let names: Vec<String> = names.into_iter().collect();
        let drawn = drain("probabilistic", &names, seed);
        prop_assert_eq!(drawn.len(), names.len());
        let unique: BTreeSet<String> = drawn.into_iter().collect();
        let expected: BTreeSet<String> = names.into_iter().collect();
        prop_assert_eq!(unique, expected);
    }
}
