use rosu_reading_pp::{osu::OsuGradualDifficulty, Beatmap, Difficulty};

use self::common::*;

mod common;

#[test]
fn empty_map() {
    let mut gradual = OsuGradualDifficulty::new(Difficulty::new(), &Beatmap::default());

    assert_eq!(gradual.len(), 0);
    assert!(gradual.next().is_none());
}

#[test]
fn counts_match_passed_objects() {
    let map = mixed(45);
    let difficulty = Difficulty::new().mods(HD);

    for (i, attrs) in difficulty.gradual(&map).enumerate() {
        let expected = difficulty.clone().passed_objects(i as u32 + 1).calculate(&map);

        assert_eq!(attrs.n_circles, expected.n_circles);
        assert_eq!(attrs.n_sliders, expected.n_sliders);
        assert_eq!(attrs.n_spinners, expected.n_spinners);
        assert_eq!(attrs.max_combo, expected.max_combo);
        assert_almost_eq(attrs.ar, expected.ar, 1e-9);
    }
}

#[test]
fn final_ratings_match_full_calculation() {
    let map = jumps(150, 220.0);
    let difficulty = Difficulty::new().mods(DT);

    let last = difficulty.gradual(&map).last().unwrap();
    let full = difficulty.calculate(&map);

    assert_eq!(last.max_combo, full.max_combo);
    assert_almost_eq(last.aim, full.aim, 1e-6);
    assert_almost_eq(last.speed, full.speed, 1e-6);
}

#[test]
fn nth_skips_objects() {
    let map = stream(60, 110.0);
    let difficulty = Difficulty::new();

    let mut stepped = difficulty.gradual(&map);
    let mut skipping = difficulty.gradual(&map);

    let tenth = stepped.by_ref().take(10).last().unwrap();
    let skipped = skipping.nth(9).unwrap();

    assert_eq!(tenth, skipped);
    assert_eq!(stepped.len(), skipping.len());
}

#[test]
fn gradual_attributes_collects_all() {
    let map = mixed(20);
    let all = Difficulty::new().gradual_attributes(&map);

    assert_eq!(all.len(), map.hit_objects.len());
    assert!(all.windows(2).all(|w| w[0].max_combo < w[1].max_combo));
}

#[test]
fn ratings_grow_within_a_section() {
    let interval = 50.0;
    let map = jumps(48, interval);
    let all = Difficulty::new().gradual_attributes(&map);

    // Objects sharing a 400ms section at clock rate 1
    let section = |i: usize| ((1000.0 + i as f64 * interval) / 400.0).ceil();

    for i in 1..all.len() - 1 {
        if section(i).to_bits() != section(i + 1).to_bits() {
            continue;
        }

        let (curr, next) = (&all[i], &all[i + 1]);

        assert!(next.aim >= curr.aim, "aim after {i}: {} < {}", next.aim, curr.aim);
        assert!(next.speed >= curr.speed, "speed after {i}: {} < {}", next.speed, curr.speed);
        assert!(
            next.reading_low_ar >= curr.reading_low_ar,
            "low AR after {i}: {} < {}",
            next.reading_low_ar,
            curr.reading_low_ar
        );
    }
}

#[test]
fn slider_factor_is_neutral() {
    let map = mixed(30);

    let full = Difficulty::new().calculate(&map);
    assert!(full.slider_factor <= 1.0);

    for attrs in Difficulty::new().gradual(&map) {
        assert_almost_eq(attrs.slider_factor, 1.0, 0.0);
    }
}

