use crate::osu::difficulty::{
    evaluators::{AimEvaluator, ReadingEvaluator},
    object::OsuDifficultyObject,
};

use super::strain::{strain_decay, StrainSkill};

/// Reading difficulty of dense patterns caused by low approach rates.
#[derive(Clone)]
pub struct ReadingLowAr {
    curr_density_aim_strain: f64,
    pub inner: StrainSkill,
}

impl ReadingLowAr {
    const SKILL_MULTIPLIER: f64 = 1.23;
    const AIM_COMPONENT_MULTIPLIER: f64 = 0.4;
    const STRAIN_DECAY_BASE: f64 = 0.15;

    const REDUCED_SECTION_COUNT: usize = 5;
    const REDUCED_STRAIN_BASELINE: f64 = 0.7;

    pub fn new(step: bool) -> Self {
        Self {
            curr_density_aim_strain: 0.0,
            inner: StrainSkill::new(step),
        }
    }

    pub fn process(&mut self, curr: &OsuDifficultyObject, objects: &[OsuDifficultyObject]) {
        let density_reading_difficulty = ReadingEvaluator::evaluate_low_ar_diff_of(curr, objects);
        let density_aiming_factor =
            ReadingEvaluator::evaluate_aiming_density_factor_of(curr, objects);

        self.curr_density_aim_strain *= strain_decay(curr.delta_time, Self::STRAIN_DECAY_BASE);
        self.curr_density_aim_strain += density_aiming_factor
            * AimEvaluator::evaluate_diff_of(curr, objects, true)
            * Self::AIM_COMPONENT_MULTIPLIER;

        let total_density_difficulty =
            (self.curr_density_aim_strain + density_reading_difficulty) * Self::SKILL_MULTIPLIER;

        self.inner.advance_section_from_zero(curr);
        self.inner.record(total_density_difficulty);
        self.inner
            .update_step(Self::REDUCED_SECTION_COUNT, Self::REDUCED_STRAIN_BASELINE);
    }

    pub fn difficulty_value(&self) -> f64 {
        self.inner
            .difficulty_value(Self::REDUCED_SECTION_COUNT, Self::REDUCED_STRAIN_BASELINE)
    }

    pub fn difficult_strain_count(&self, difficulty: f64) -> f64 {
        self.inner.difficult_strain_count(difficulty)
    }

    pub fn difficulty_to_performance(difficulty: f64) -> f64 {
        (difficulty.powf(1.5) * 20.0)
            .max(difficulty.powf(2.0) * 17.0)
            .max(difficulty.powf(3.0) * 10.5)
            .max(difficulty.powf(4.0) * 6.0)
    }

    pub fn curr_strain_peaks(&self) -> Vec<f64> {
        self.inner.curr_strain_peaks()
    }
}

#[cfg(test)]
mod tests {
    use crate::util::float_ext::FloatExt;

    use super::*;

    #[test]
    fn performance_curve_picks_largest_term() {
        // Below 1 the lowest power dominates
        assert!(ReadingLowAr::difficulty_to_performance(0.25).almost_eq(20.0 * 0.125, 1e-12));
        // Above 1 the highest power dominates eventually
        assert!(ReadingLowAr::difficulty_to_performance(4.0).almost_eq(6.0 * 256.0, 1e-9));
        assert!(ReadingLowAr::difficulty_to_performance(0.0).eq(0.0));
    }
}
