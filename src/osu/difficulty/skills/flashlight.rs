use crate::osu::difficulty::{evaluators::FlashlightEvaluator, object::OsuDifficultyObject};

use super::strain::{strain_decay, StrainSkill};

#[derive(Clone, Default)]
pub struct Flashlight {
    curr_strain: f64,
    pub inner: StrainSkill,
}

impl Flashlight {
    const SKILL_MULTIPLIER: f64 = 0.05512;
    const STRAIN_DECAY_BASE: f64 = 0.15;

    pub fn process(&mut self, curr: &OsuDifficultyObject, objects: &[OsuDifficultyObject]) {
        let prev_start_time = curr.previous(0, objects).map_or(0.0, |prev| prev.start_time);
        let curr_strain = self.curr_strain;

        self.inner.advance_section(curr, |time| {
            curr_strain * strain_decay(time - prev_start_time, Self::STRAIN_DECAY_BASE)
        });

        self.curr_strain *= strain_decay(curr.delta_time, Self::STRAIN_DECAY_BASE);
        self.curr_strain +=
            FlashlightEvaluator::evaluate_diff_of(curr, objects) * Self::SKILL_MULTIPLIER;

        self.inner.record(self.curr_strain);
    }

    /// Sum of all section peaks.
    pub fn difficulty_value(&self) -> f64 {
        self.inner.curr_strain_peaks().iter().sum()
    }

    pub fn difficulty_to_performance(difficulty: f64) -> f64 {
        25.0 * difficulty.powf(2.0)
    }

    pub fn curr_strain_peaks(&self) -> Vec<f64> {
        self.inner.curr_strain_peaks()
    }
}
