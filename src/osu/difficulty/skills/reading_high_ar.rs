use crate::{
    osu::difficulty::{
        evaluators::{AimEvaluator, ReadingEvaluator, RhythmEvaluator, SpeedEvaluator},
        object::OsuDifficultyObject,
        DIFFICULTY_MULTIPLIER,
    },
    util::difficulty::power_mean,
};

use super::{
    aim::Aim,
    speed::Speed,
    strain::{strain_decay, StrainSkill},
};

const MECHANICAL_PP_POWER: f64 = ReadingEvaluator::MECHANICAL_PP_POWER;

/// Mechanical difficulty of aiming and tapping objects that appear shortly
/// before they have to be hit.
///
/// Consists of an aim and a speed component whose section peaks are merged.
#[derive(Clone, Default)]
pub struct ReadingHighAr {
    aim_component: HighArAimComponent,
    speed_component: HighArSpeedComponent,
    objects_count: usize,
    objects_preempt_sum: f64,
    pub inner: StrainSkill,
}

impl ReadingHighAr {
    const SKILL_MULTIPLIER: f64 = 9.3;
    const SUM_POWER: f64 = 1.1;
    const CURVE_POWER: f64 = 3.0369;
    const CURVE_MULTIPLIER: f64 = 3.69656;

    pub fn process(&mut self, curr: &OsuDifficultyObject, objects: &[OsuDifficultyObject]) {
        self.aim_component.process(curr, objects);
        self.speed_component.process(curr, objects);

        if !curr.base.is_spinner() {
            self.objects_count += 1;
            self.objects_preempt_sum += curr.preempt;
        }

        let merged = power_mean(
            self.aim_component.inner.curr_section_peak,
            self.speed_component.inner.curr_section_peak,
            Self::SUM_POWER,
        );

        let merged = Self::SKILL_MULTIPLIER * merged.powf(MECHANICAL_PP_POWER);

        self.inner.advance_section_from_zero(curr);
        self.inner.record(merged);
    }

    pub fn difficulty_value(&self) -> f64 {
        if self.objects_count == 0 {
            return 0.0;
        }

        let aim_value = self.aim_component.inner.difficulty_value(
            StrainSkill::REDUCED_SECTION_COUNT,
            StrainSkill::REDUCED_STRAIN_BASELINE,
        );

        let speed_value = self.speed_component.inner.difficulty_value(
            HighArSpeedComponent::REDUCED_SECTION_COUNT,
            StrainSkill::REDUCED_STRAIN_BASELINE,
        );

        let aim_performance =
            Self::difficulty_to_performance(aim_value.sqrt() * DIFFICULTY_MULTIPLIER);
        let speed_performance =
            Self::difficulty_to_performance(speed_value.sqrt() * DIFFICULTY_MULTIPLIER);

        let mut total_performance = power_mean(aim_performance, speed_performance, Self::SUM_POWER);

        let objects_count = self.objects_count as f64;

        let mut length_bonus = 0.95 + 0.4 * (objects_count / 2000.0).min(1.0);

        if self.objects_count > 2000 {
            length_bonus += (objects_count / 2000.0).log10() * 0.5;
        }

        let length_bonus = length_bonus.powf(0.5 / MECHANICAL_PP_POWER);

        // Short preempts make long maps even more tiring
        let avg_preempt = self.objects_preempt_sum / objects_count / 1000.0;

        let length_bonus_power = if length_bonus < 1.0 {
            2.0
        } else {
            1.0 + 0.75 * 0.1_f64.powf((2.3 * avg_preempt).powf(8.0))
        };

        total_performance *= length_bonus.powf(length_bonus_power);

        let adjusted_difficulty = Self::performance_to_difficulty(total_performance);
        let difficulty_value = (adjusted_difficulty / DIFFICULTY_MULTIPLIER).powf(2.0);

        Self::SKILL_MULTIPLIER * difficulty_value.powf(MECHANICAL_PP_POWER)
    }

    pub fn difficulty_to_performance(difficulty: f64) -> f64 {
        difficulty.powf(Self::CURVE_POWER) * Self::CURVE_MULTIPLIER
    }

    fn performance_to_difficulty(performance: f64) -> f64 {
        (performance / Self::CURVE_MULTIPLIER).powf(Self::CURVE_POWER.recip())
    }

    pub fn curr_strain_peaks(&self) -> Vec<f64> {
        self.inner.curr_strain_peaks()
    }
}

/// Minimum strain every object adds, scaled by the high AR curve.
const COMPONENT_DEFAULT_VALUE_MULTIPLIER: f64 = 280.0;

#[derive(Clone, Default)]
struct HighArAimComponent {
    curr_strain: f64,
    inner: StrainSkill,
}

impl HighArAimComponent {
    fn process(&mut self, curr: &OsuDifficultyObject, objects: &[OsuDifficultyObject]) {
        let prev_start_time = curr.previous(0, objects).map_or(0.0, |prev| prev.start_time);
        let curr_strain = self.curr_strain;

        self.inner.advance_section(curr, |time| {
            curr_strain * strain_decay(time - prev_start_time, Aim::STRAIN_DECAY_BASE)
        });

        let high_ar = ReadingEvaluator::evaluate_high_ar_diff_of(curr, objects, true);
        let aim_difficulty =
            AimEvaluator::evaluate_diff_of(curr, objects, true) * Aim::SKILL_MULTIPLIER * high_ar;

        self.curr_strain *= strain_decay(curr.delta_time, Aim::STRAIN_DECAY_BASE);
        self.curr_strain += aim_difficulty + COMPONENT_DEFAULT_VALUE_MULTIPLIER * high_ar;

        self.inner.record(self.curr_strain);
    }
}

#[derive(Clone, Default)]
struct HighArSpeedComponent {
    curr_strain: f64,
    curr_rhythm: f64,
    inner: StrainSkill,
}

impl HighArSpeedComponent {
    const REDUCED_SECTION_COUNT: usize = 5;

    fn process(&mut self, curr: &OsuDifficultyObject, objects: &[OsuDifficultyObject]) {
        let prev_start_time = curr.previous(0, objects).map_or(0.0, |prev| prev.start_time);
        let total_strain = self.curr_strain * self.curr_rhythm;

        self.inner.advance_section(curr, |time| {
            total_strain * strain_decay(time - prev_start_time, Speed::STRAIN_DECAY_BASE)
        });

        let high_ar = ReadingEvaluator::evaluate_high_ar_diff_of(curr, objects, false);
        let speed_difficulty =
            SpeedEvaluator::evaluate_diff_of(curr, objects) * Speed::SKILL_MULTIPLIER * high_ar;

        self.curr_strain *= strain_decay(curr.strain_time, Speed::STRAIN_DECAY_BASE);
        self.curr_strain += speed_difficulty + COMPONENT_DEFAULT_VALUE_MULTIPLIER * high_ar;

        self.curr_rhythm =
            curr.rhythm_difficulty(|| RhythmEvaluator::evaluate_diff_of(curr, objects));

        self.inner.record(self.curr_strain * self.curr_rhythm);
    }
}
