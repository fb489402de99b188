use proptest::prelude::*;
use rosu_reading_pp::{
    osu::{OsuDifficultyAttributes, OsuPerformance, OsuScoreState},
    Difficulty,
};

use self::common::*;

mod common;

fn attrs(mods: u32) -> OsuDifficultyAttributes {
    Difficulty::new().mods(mods).calculate(&mixed(150))
}

#[test]
fn via_map_equals_via_attributes() {
    let map = mixed(150);

    let via_map = OsuPerformance::new(&map)
        .mods(HD)
        .combo(100)
        .n100(4)
        .misses(1)
        .calculate();

    let via_attrs = OsuPerformance::from(attrs(HD))
        .mods(HD)
        .combo(100)
        .n100(4)
        .misses(1)
        .calculate();

    assert_eq!(via_map, via_attrs);
}

#[test]
fn implied_full_combo_is_deterministic() {
    let attrs = attrs(NM);

    let first = attrs.clone().performance().calculate();
    let second = attrs.performance().calculate();

    assert_eq!(first, second);
    assert_eq!(first.effective_miss_count.to_bits(), 0.0_f64.to_bits());
    assert!(first.pp > 0.0);
}

#[test]
fn perfect_play_is_worth_the_most() {
    let attrs = attrs(NM);
    let max_pp = attrs.clone().performance().calculate().pp;

    let worse = attrs.performance().accuracy(97.0).misses(2).calculate();

    assert!(worse.pp < max_pp);
}

#[test]
fn no_fail_only_matters_with_misses() {
    let nomod = attrs(NM).performance().calculate();
    let nf = attrs(NF).performance().mods(NF).calculate();

    assert_almost_eq(nf.pp, nomod.pp, 1e-9);

    let nomod = attrs(NM).performance().misses(3).calculate();
    let nf = attrs(NF).performance().mods(NF).misses(3).calculate();

    assert!(nf.pp < nomod.pp);
}

#[test]
fn hidden_pp_requires_hidden() {
    let nomod = attrs(NM).performance().calculate();
    let hd = attrs(HD).performance().mods(HD).calculate();

    assert_eq!(nomod.pp_hidden.to_bits(), 0.0_f64.to_bits());
    assert!(hd.pp_hidden > 0.0);
}

#[test]
fn lazer_counts_sliders_for_accuracy() {
    let attrs = attrs(NM);

    let stable = attrs.clone().performance().n100(5).calculate();
    let lazer = attrs.performance().n100(5).lazer(true).calculate();

    assert!(stable.pp_acc.to_bits() != lazer.pp_acc.to_bits());
}

#[test]
fn state_is_respected() {
    let attrs = attrs(NM);
    let total = attrs.n_objects();

    let state = OsuScoreState {
        max_combo: 50,
        n300: total - 6,
        n100: 3,
        n50: 1,
        misses: 2,
    };

    let mut perf = attrs.performance().state(state);

    assert_eq!(perf.generate_state(), state);
}

fn arb_state(n_objects: u32) -> impl Strategy<Value = (u32, u32, u32, u32)> {
    (0..=n_objects).prop_flat_map(move |misses| {
        let remaining = n_objects - misses;

        (Just(misses), 0..=remaining).prop_flat_map(move |(misses, n100)| {
            let remaining = remaining - n100;

            (Just(misses), Just(n100), 0..=remaining, 0..=1000_u32)
        })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn effective_misses_are_bounded(
        (misses, n100, n50, combo) in arb_state(151),
        mods in prop::sample::select(vec![NM, HD, DT, FL, SO]),
    ) {
        let attrs = attrs(NM);
        prop_assume!(attrs.n_objects() == 151);

        let result = attrs
            .performance()
            .mods(mods)
            .misses(misses)
            .n100(n100)
            .n50(n50)
            .combo(combo)
            .calculate();

        let effective = result.effective_miss_count;

        prop_assert!(effective >= f64::from(misses));
        prop_assert!(effective <= f64::from(misses + n100 + n50) + 1e-9);
        prop_assert!(result.pp.is_finite() && result.pp >= 0.0);
    }
}
