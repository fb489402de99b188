use crate::{
    model::mods::GameMods,
    osu::{
        attributes::{OsuDifficultyAttributes, OsuPerformanceAttributes},
        difficulty::{
            adjust_cognition_performance, cognition_performance,
            skills::{
                flashlight::Flashlight, reading_hidden::ReadingHidden,
                reading_low_ar::ReadingLowAr, strain::difficulty_to_performance,
            },
        },
        score_state::OsuScoreState,
    },
    util::{difficulty::power_mean, float_ext::FloatExt},
};

use super::PERFORMANCE_BASE_MULTIPLIER;

/// Evaluates a score's judgements against difficulty attributes.
#[derive(Clone)]
pub(super) struct OsuPerformanceCalculator<'mods> {
    attrs: OsuDifficultyAttributes,
    mods: &'mods GameMods,
    acc: f64,
    state: OsuScoreState,
    effective_miss_count: f64,
    /// Stays the same for the perfect baseline.
    total_hits: f64,
    amount_hit_objects_with_accuracy: u32,
}

/// All pp values of a single evaluation.
struct PerformanceValues {
    aim: f64,
    speed: f64,
    acc: f64,
    low_ar: f64,
    high_ar: f64,
    hidden: f64,
    reading: f64,
    flashlight: f64,
    total: f64,
}

impl<'mods> OsuPerformanceCalculator<'mods> {
    pub(super) fn new(
        attrs: OsuDifficultyAttributes,
        mods: &'mods GameMods,
        state: OsuScoreState,
        lazer: bool,
    ) -> Self {
        let effective_miss_count = calculate_effective_misses(&attrs, &state);

        let amount_hit_objects_with_accuracy = if lazer || mods.sv2() {
            attrs.n_circles + attrs.n_sliders
        } else {
            attrs.n_circles
        };

        Self {
            acc: state.accuracy(),
            total_hits: f64::from(state.total_hits()),
            attrs,
            mods,
            state,
            effective_miss_count,
            amount_hit_objects_with_accuracy,
        }
    }

    pub(super) fn calculate(mut self) -> OsuPerformanceAttributes {
        if self.state.total_hits() == 0 {
            return OsuPerformanceAttributes {
                difficulty: self.attrs,
                ..Default::default()
            };
        }

        let mut multiplier = PERFORMANCE_BASE_MULTIPLIER;

        if self.mods.nf() {
            multiplier *= (1.0 - 0.02 * self.effective_miss_count).max(0.9);
        }

        if self.mods.so() {
            multiplier *= 1.0 - (f64::from(self.attrs.n_spinners) / self.total_hits).powf(0.85);
        }

        if self.mods.rx() {
            // * https://www.desmos.com/calculator/bc9eybdthb
            // * we use OD13.3 as maximum since it's the value at which great hitwidow becomes 0
            // * this is well beyond currently maximum achievable OD which is 12.17 (DTx2 + DA with OD11)
            let (n100_mult, n50_mult) = if self.attrs.od > 0.0 {
                (
                    (1.0 - (self.attrs.od / 13.33).powf(1.8)).max(0.0),
                    (1.0 - (self.attrs.od / 13.33).powi(5)).max(0.0),
                )
            } else {
                (1.0, 1.0)
            };

            // * As we're adding Oks and Mehs to an approximated number of combo breaks the result can be
            // * higher than total hits in specific scenarios (which breaks some calculations) so we need to clamp it.
            self.effective_miss_count = (self.effective_miss_count
                + f64::from(self.state.n100) * n100_mult
                + f64::from(self.state.n50) * n50_mult)
                .min(self.total_hits);
        }

        let values = self.performance_values();

        multiplier *= self.balance_multiplier();

        OsuPerformanceAttributes {
            pp: values.total * multiplier,
            pp_aim: values.aim,
            pp_speed: values.speed,
            pp_acc: values.acc,
            pp_flashlight: values.flashlight,
            pp_reading: values.reading,
            pp_low_ar: values.low_ar,
            pp_high_ar: values.high_ar,
            pp_hidden: values.hidden,
            effective_miss_count: self.effective_miss_count,
            difficulty: self.attrs,
        }
    }

    fn performance_values(&self) -> PerformanceValues {
        let aim = self.compute_aim_value();
        let speed = self.compute_speed_value();
        let low_ar = self.compute_low_ar_value();
        let high_ar = self.compute_high_ar_value();
        let potential_flashlight = self.compute_flashlight_value();
        let hidden = self.compute_hidden_value();

        let flashlight = if self.mods.fl() {
            potential_flashlight
        } else {
            0.0
        };

        let mechanical = power_mean(aim, speed, 1.1);

        let cognition = adjust_cognition_performance(
            cognition_performance(low_ar, high_ar, flashlight, hidden),
            mechanical,
            potential_flashlight,
        );

        let acc = self.compute_accuracy_value();
        let total = cognition + power_mean(mechanical, acc, 1.1);

        // Split cognition into its reading and flashlight share
        let ar = power_mean(low_ar, high_ar, 1.1);
        let reading = adjust_cognition_performance(ar + hidden, mechanical, flashlight);

        PerformanceValues {
            aim,
            speed,
            acc,
            low_ar,
            high_ar,
            hidden,
            reading,
            flashlight: cognition - reading,
            total,
        }
    }

    /// Rescales high values; evaluated on the play without any misses.
    fn balance_multiplier(&self) -> f64 {
        let mut perfect = self.clone();
        perfect.effective_miss_count = 0.0;
        perfect.state.misses = 0;
        perfect.state.max_combo = self.attrs.max_combo;

        let total = perfect.performance_values().total * PERFORMANCE_BASE_MULTIPLIER;

        if total < 600.0 {
            return 1.0;
        }

        let rescaled = (total - 600.0) / 1000.0;

        1.0 + (0.06 * rescaled).min(0.088 * rescaled.powf(0.4))
    }

    fn compute_aim_value(&self) -> f64 {
        let mut aim_value = difficulty_to_performance(self.attrs.aim);

        let len_bonus = self.length_bonus();
        aim_value *= len_bonus;

        if self.effective_miss_count > 0.0 {
            aim_value *= calculate_miss_penalty(
                self.effective_miss_count,
                self.attrs.aim_difficult_strain_count,
            );
        }

        let ar_factor = if self.mods.rx() {
            0.0
        } else if self.attrs.ar > 10.33 {
            0.3 * (self.attrs.ar - 10.33)
        } else if self.attrs.ar < 8.0 {
            0.05 * (8.0 - self.attrs.ar)
        } else {
            0.0
        };

        aim_value *= 1.0 + ar_factor * len_bonus;

        if self.mods.hd() {
            // * We want to give more reward for lower AR when it comes to aim and HD. This nerfs high AR and buffs lower AR.
            aim_value *= 1.0 + 0.04 * (12.0 - self.attrs.ar);
        }

        aim_value *= self.slider_nerf_factor();

        aim_value *= self.acc;
        // * It is important to consider accuracy difficulty when scaling with accuracy.
        aim_value *= 0.98 + self.attrs.od.powi(2) / 2500.0;

        aim_value
    }

    fn compute_speed_value(&self) -> f64 {
        if self.mods.rx() {
            return 0.0;
        }

        let mut speed_value = difficulty_to_performance(self.attrs.speed);

        let len_bonus = self.length_bonus();
        speed_value *= len_bonus;

        if self.effective_miss_count > 0.0 {
            speed_value *= calculate_miss_penalty(
                self.effective_miss_count,
                self.attrs.speed_difficult_strain_count,
            );
        }

        let ar_factor = if self.attrs.ar > 10.33 {
            0.3 * (self.attrs.ar - 10.33)
        } else {
            0.0
        };

        speed_value *= 1.0 + ar_factor * len_bonus;

        if self.mods.hd() {
            speed_value *= 1.0 + 0.04 * (12.0 - self.attrs.ar);
        }

        speed_value * self.speed_accuracy_factor()
    }

    fn compute_accuracy_value(&self) -> f64 {
        if self.mods.rx() {
            return 0.0;
        }

        let amount_hit_objects_with_acc = f64::from(self.amount_hit_objects_with_accuracy);

        // * This percentage only considers HitCircles of any value - in this part
        // * of the calculation we focus on hitting the timing hit window.
        let better_acc_percentage = if amount_hit_objects_with_acc > 0.0 {
            let n300 = f64::from(self.state.n300)
                - (self.total_hits - amount_hit_objects_with_acc);

            ((n300 * 6.0 + f64::from(self.state.n100) * 2.0 + f64::from(self.state.n50))
                / (amount_hit_objects_with_acc * 6.0))
                // * It is possible to reach a negative accuracy with this formula. Cap it at zero - zero points.
                .max(0.0)
        } else {
            0.0
        };

        // * Lots of arbitrary values from testing.
        // * Considering to use derivation from perfect accuracy in a probabilistic manner - assume normal distribution.
        let mut acc_value =
            1.52163_f64.powf(self.attrs.od) * better_acc_percentage.powi(24) * 2.83;

        // * Bonus for many hitcircles - it's harder to keep good accuracy up for longer.
        acc_value *= (amount_hit_objects_with_acc / 1000.0).powf(0.3).min(1.15);

        if self.mods.hd() {
            acc_value *= 1.08;
        }

        if self.mods.fl() {
            acc_value *= 1.02;
        }

        acc_value
    }

    /// Calculated regardless of the flashlight mod to cap cognition.
    fn compute_flashlight_value(&self) -> f64 {
        let mut flashlight_value = Flashlight::difficulty_to_performance(self.attrs.flashlight);

        let total_hits = self.total_hits;

        // * Penalize misses by assessing # of misses relative to the total # of objects.
        // * Default a 3% reduction for any # of misses.
        if self.effective_miss_count > 0.0 {
            flashlight_value *= 0.97
                * (1.0 - (self.effective_miss_count / total_hits).powf(0.775))
                    .powf(self.effective_miss_count.powf(0.875));
        }

        flashlight_value *= self.get_combo_scaling_factor();

        // * Account for shorter maps having a higher ratio of 0 combo/100 combo flashlight radius.
        flashlight_value *= 0.7
            + 0.1 * (total_hits / 200.0).min(1.0)
            + f64::from(u8::from(total_hits > 200.0))
                * 0.2
                * ((total_hits - 200.0) / 200.0).min(1.0);

        // * Scale the flashlight value with accuracy _slightly_.
        flashlight_value *= 0.5 + self.acc / 2.0;
        // * It is important to also consider accuracy difficulty when doing that.
        flashlight_value *= 0.98 + self.attrs.od.powi(2) / 2500.0;

        flashlight_value
    }

    fn compute_low_ar_value(&self) -> f64 {
        let mut reading_value = ReadingLowAr::difficulty_to_performance(self.attrs.reading_low_ar);

        if self.effective_miss_count > 0.0 {
            reading_value *= calculate_miss_penalty(
                self.effective_miss_count,
                self.attrs.low_ar_difficult_strain_count,
            );
        }

        reading_value *= self.acc * self.acc;
        reading_value *= (0.98 + self.attrs.od.powi(2) / 2500.0).powi(2);

        reading_value
    }

    /// Split into an aim and a speed part based on the ratio of the
    /// mechanical skills.
    fn compute_high_ar_value(&self) -> f64 {
        let high_ar_value = difficulty_to_performance(self.attrs.reading_high_ar);

        let aim_performance = difficulty_to_performance(self.attrs.aim);
        let speed_performance = difficulty_to_performance(self.attrs.speed);

        let aim_ratio = aim_performance / (aim_performance + speed_performance);

        let mut aim_part_value = high_ar_value * aim_ratio;
        aim_part_value *= self.slider_nerf_factor();
        aim_part_value *= self.acc;
        aim_part_value *= 0.98 + self.attrs.od.powi(2) / 2500.0;

        let speed_part_value = high_ar_value * (1.0 - aim_ratio) * self.speed_accuracy_factor();

        aim_part_value + speed_part_value
    }

    fn compute_hidden_value(&self) -> f64 {
        if !self.mods.hd() {
            return 0.0;
        }

        let mut reading_value = ReadingHidden::difficulty_to_performance(self.attrs.hidden);

        reading_value *= self.length_bonus();

        if self.effective_miss_count > 0.0 {
            reading_value *= calculate_miss_penalty(
                self.effective_miss_count,
                self.attrs.hidden_difficult_strain_count,
            );
        }

        reading_value *= self.acc * self.acc;
        reading_value *= 0.98 + self.attrs.od.powi(2) / 2500.0;

        reading_value
    }

    /// Longer maps are worth more.
    fn length_bonus(&self) -> f64 {
        let total_hits = self.total_hits;

        0.95 + 0.4 * (total_hits / 2000.0).min(1.0)
            + f64::from(u8::from(total_hits > 2000.0)) * (total_hits / 2000.0).log10() * 0.5
    }

    /// Estimates how many difficult slider ends were dropped.
    ///
    /// Always `1.0` if there are no sliders.
    fn slider_nerf_factor(&self) -> f64 {
        if self.attrs.n_sliders == 0 {
            return 1.0;
        }

        // * We assume 15% of sliders in a map are difficult since there's no way to tell from the performance calculator.
        let estimate_diff_sliders = f64::from(self.attrs.n_sliders) * 0.15;

        let estimate_slider_ends_dropped = f64::from(
            (self.state.n100 + self.state.n50 + self.state.misses)
                .min(self.max_combo().saturating_sub(self.state.max_combo)),
        )
        .clamp(0.0, estimate_diff_sliders);

        (1.0 - self.attrs.slider_factor)
            * (1.0 - estimate_slider_ends_dropped / estimate_diff_sliders).powi(3)
            + self.attrs.slider_factor
    }

    /// Scales speed with accuracy and OD, and punishes doubletapping.
    fn speed_accuracy_factor(&self) -> f64 {
        let total_hits = self.total_hits;

        let relevant_acc = if self.attrs.speed_note_count.eq(0.0) {
            0.0
        } else {
            let n300 = f64::from(self.state.n300);
            let n100 = f64::from(self.state.n100);
            let n50 = f64::from(self.state.n50);

            let relevant_total_diff = total_hits - self.attrs.speed_note_count;
            let relevant_n300 = (n300 - relevant_total_diff).max(0.0);
            let relevant_n100 = (n100 - (relevant_total_diff - n300).max(0.0)).max(0.0);
            let relevant_n50 = (n50 - (relevant_total_diff - n300 - n100).max(0.0)).max(0.0);

            (relevant_n300 * 6.0 + relevant_n100 * 2.0 + relevant_n50)
                / (self.attrs.speed_note_count * 6.0)
        };

        let od = self.attrs.od;

        let mut factor = (0.95 + od * od / 750.0)
            * ((self.acc + relevant_acc) / 2.0).powf((14.5 - od) / 2.0);

        let n50 = f64::from(self.state.n50);

        if n50 >= total_hits / 500.0 {
            factor *= 0.99_f64.powf(n50 - total_hits / 500.0);
        }

        factor
    }

    fn get_combo_scaling_factor(&self) -> f64 {
        let max_combo = f64::from(self.max_combo());

        (f64::from(self.state.max_combo).powf(0.8) / max_combo.powf(0.8)).min(1.0)
    }

    /// The map's maximum combo but at least `1`.
    fn max_combo(&self) -> u32 {
        self.attrs.max_combo.max(1)
    }
}

fn calculate_effective_misses(attrs: &OsuDifficultyAttributes, state: &OsuScoreState) -> f64 {
    // * Guess the number of misses + slider breaks from combo
    let mut combo_based_miss_count = 0.0;

    if attrs.n_sliders > 0 {
        let full_combo_threshold =
            f64::from(attrs.max_combo.max(1)) - 0.1 * f64::from(attrs.n_sliders);

        if f64::from(state.max_combo) < full_combo_threshold {
            combo_based_miss_count = full_combo_threshold / f64::from(state.max_combo).max(1.0);
        }
    }

    // * Clamp miss count to maximum amount of possible breaks
    combo_based_miss_count =
        combo_based_miss_count.min(f64::from(state.n100 + state.n50 + state.misses));

    combo_based_miss_count.max(f64::from(state.misses))
}

/// Penalize misses relative to the amount of difficult strains.
///
/// Maps with at most one difficult strain are penalized fully.
fn calculate_miss_penalty(miss_count: f64, difficult_strain_count: f64) -> f64 {
    let strain_log = difficult_strain_count.ln().max(f64::EPSILON);

    0.96 / ((miss_count / (4.0 * strain_log.powf(0.94))) + 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs() -> OsuDifficultyAttributes {
        OsuDifficultyAttributes {
            aim: 2.8,
            speed: 2.5,
            flashlight: 1.9,
            reading_low_ar: 0.6,
            reading_high_ar: 1.4,
            hidden: 0.8,
            slider_factor: 0.97,
            speed_note_count: 250.0,
            aim_difficult_strain_count: 120.0,
            speed_difficult_strain_count: 90.0,
            low_ar_difficult_strain_count: 40.0,
            hidden_difficult_strain_count: 60.0,
            ar: 9.5,
            od: 9.0,
            hp: 5.0,
            great_hit_window: 26.0,
            n_circles: 400,
            n_sliders: 200,
            n_spinners: 2,
            stars: 5.8,
            max_combo: 900,
        }
    }

    fn full_combo() -> OsuScoreState {
        OsuScoreState {
            max_combo: 900,
            n300: 602,
            n100: 0,
            n50: 0,
            misses: 0,
        }
    }

    fn calculate(mods: &GameMods, state: OsuScoreState) -> OsuPerformanceAttributes {
        OsuPerformanceCalculator::new(attrs(), mods, state, false).calculate()
    }

    #[test]
    fn full_combo_has_no_effective_misses() {
        let attrs = calculate(&GameMods::default(), full_combo());

        assert!(attrs.effective_miss_count.abs() < f64::EPSILON);
        assert!(attrs.pp > 0.0);
    }

    #[test]
    fn effective_misses_from_combo() {
        let state = OsuScoreState {
            max_combo: 300,
            n100: 5,
            n300: 597,
            ..full_combo()
        };

        let effective = calculate_effective_misses(&attrs(), &state);

        // 880 / 300 but at most the amount of non-300s
        assert!((effective - 880.0 / 300.0).abs() < 1e-9, "{effective}");

        let state = OsuScoreState {
            max_combo: 300,
            n100: 1,
            n300: 601,
            ..full_combo()
        };

        assert!((calculate_effective_misses(&attrs(), &state) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn misses_lower_pp() {
        let fc = calculate(&GameMods::default(), full_combo());

        let state = OsuScoreState {
            max_combo: 450,
            n300: 599,
            misses: 3,
            ..full_combo()
        };

        let missed = calculate(&GameMods::default(), state);

        assert!(missed.pp < fc.pp);
        assert!(missed.effective_miss_count >= 3.0);
    }

    #[test]
    fn hidden_value_requires_hidden() {
        let nomod = calculate(&GameMods::default(), full_combo());
        let hidden = calculate(&GameMods::from(8), full_combo());

        assert!(nomod.pp_hidden.abs() < f64::EPSILON);
        assert!(hidden.pp_hidden > 0.0);
    }

    #[test]
    fn relax_has_no_speed_or_acc() {
        let attrs = calculate(&GameMods::from(128), full_combo());

        assert!(attrs.pp_speed.abs() < f64::EPSILON);
        assert!(attrs.pp_acc.abs() < f64::EPSILON);
    }

    #[test]
    fn no_hits_no_pp() {
        let attrs = calculate(&GameMods::default(), OsuScoreState::default());

        assert!(attrs.pp.abs() < f64::EPSILON);
        assert_eq!(attrs.difficulty.n_circles, 400);
    }

    #[test]
    fn miss_penalty_stays_finite() {
        for count in [0.0, 0.5, 1.0, 2.0, 100.0] {
            let penalty = calculate_miss_penalty(3.0, count);

            assert!(penalty.is_finite() && (0.0..=0.96).contains(&penalty), "{penalty}");
        }
    }

    #[test]
    fn balance_is_neutral_below_threshold() {
        let mods = GameMods::default();

        let easy = OsuDifficultyAttributes {
            aim: 1.0,
            speed: 1.0,
            flashlight: 0.5,
            reading_low_ar: 0.2,
            reading_high_ar: 0.3,
            hidden: 0.2,
            ..attrs()
        };

        let calc = OsuPerformanceCalculator::new(easy, &mods, full_combo(), false);

        assert!(calc.performance_values().total * PERFORMANCE_BASE_MULTIPLIER < 600.0);
        assert!(calc.balance_multiplier().eq(1.0));

        let hard = OsuDifficultyAttributes {
            aim: 8.0,
            speed: 6.0,
            ..attrs()
        };

        let calc = OsuPerformanceCalculator::new(hard, &mods, full_combo(), false);

        assert!(calc.balance_multiplier() > 1.0);
    }

    #[test]
    fn balance_ignores_combo() {
        let mods = GameMods::default();

        let hard = OsuDifficultyAttributes {
            aim: 8.0,
            speed: 6.0,
            ..attrs()
        };

        let fc = OsuScoreState {
            n300: 597,
            n100: 5,
            ..full_combo()
        };

        let choked = OsuScoreState {
            max_combo: 300,
            ..fc
        };

        let fc = OsuPerformanceCalculator::new(hard.clone(), &mods, fc, false);
        let choke = OsuPerformanceCalculator::new(hard, &mods, choked, false);

        assert!(choke.effective_miss_count > 0.0);
        assert!(fc
            .balance_multiplier()
            .almost_eq(choke.balance_multiplier(), 1e-12));
        assert!(choke.clone().calculate().pp < fc.clone().calculate().pp);
    }

    #[test]
    fn zero_sliders_no_slider_nerf() {
        let mods = GameMods::default();
        let mut calc = OsuPerformanceCalculator::new(attrs(), &mods, full_combo(), false);
        calc.attrs.n_sliders = 0;
        calc.state.max_combo = 10;

        assert!((calc.slider_nerf_factor() - 1.0).abs() < f64::EPSILON);
    }
}
