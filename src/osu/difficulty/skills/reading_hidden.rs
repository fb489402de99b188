use crate::osu::difficulty::{
    evaluators::{AimEvaluator, ReadingEvaluator},
    object::OsuDifficultyObject,
};

use super::strain::{strain_decay, StrainSkill};

/// Aim difficulty of objects that fade out before they're hit.
#[derive(Clone)]
pub struct ReadingHidden {
    curr_strain: f64,
    pub inner: StrainSkill,
}

impl ReadingHidden {
    const SKILL_MULTIPLIER: f64 = 7.632;
    const STRAIN_DECAY_BASE: f64 = 0.15;

    pub fn new(step: bool) -> Self {
        Self {
            curr_strain: 0.0,
            inner: StrainSkill::new(step),
        }
    }

    pub fn process(&mut self, curr: &OsuDifficultyObject, objects: &[OsuDifficultyObject]) {
        let prev_start_time = curr.previous(0, objects).map_or(0.0, |prev| prev.start_time);
        let curr_strain = self.curr_strain;

        self.inner.advance_section(curr, |time| {
            curr_strain * strain_decay(time - prev_start_time, Self::STRAIN_DECAY_BASE)
        });

        self.curr_strain *= strain_decay(curr.delta_time, Self::STRAIN_DECAY_BASE);
        self.curr_strain += AimEvaluator::evaluate_diff_of(curr, objects, false)
            * ReadingEvaluator::evaluate_hidden_diff_of(curr, objects)
            * Self::SKILL_MULTIPLIER;

        self.inner.record(self.curr_strain);
        self.inner.update_step(
            StrainSkill::REDUCED_SECTION_COUNT,
            StrainSkill::REDUCED_STRAIN_BASELINE,
        );
    }

    pub fn difficulty_value(&self) -> f64 {
        self.inner.difficulty_value(
            StrainSkill::REDUCED_SECTION_COUNT,
            StrainSkill::REDUCED_STRAIN_BASELINE,
        )
    }

    pub fn difficult_strain_count(&self, difficulty: f64) -> f64 {
        self.inner.difficult_strain_count(difficulty)
    }

    pub fn difficulty_to_performance(difficulty: f64) -> f64 {
        (difficulty * 16.0)
            .max(difficulty.powf(2.0) * 10.0)
            .max(difficulty.powf(3.0) * 4.0)
    }

    pub fn curr_strain_peaks(&self) -> Vec<f64> {
        self.inner.curr_strain_peaks()
    }
}
