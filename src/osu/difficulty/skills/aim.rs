use crate::osu::difficulty::{evaluators::AimEvaluator, object::OsuDifficultyObject};

use super::strain::{strain_decay, StrainSkill};

#[derive(Clone)]
pub struct Aim {
    with_sliders: bool,
    curr_strain: f64,
    pub inner: StrainSkill,
}

impl Aim {
    pub const SKILL_MULTIPLIER: f64 = 25.18;
    pub const STRAIN_DECAY_BASE: f64 = 0.15;

    pub fn new(with_sliders: bool, step: bool) -> Self {
        Self {
            with_sliders,
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

        let strain = self.strain_value_at(curr, objects);
        self.inner.record(strain);
        self.inner.update_step(
            StrainSkill::REDUCED_SECTION_COUNT,
            StrainSkill::REDUCED_STRAIN_BASELINE,
        );
    }

    fn strain_value_at(&mut self, curr: &OsuDifficultyObject, objects: &[OsuDifficultyObject]) -> f64 {
        self.curr_strain *= strain_decay(curr.delta_time, Self::STRAIN_DECAY_BASE);
        self.curr_strain +=
            AimEvaluator::evaluate_diff_of(curr, objects, self.with_sliders) * Self::SKILL_MULTIPLIER;

        self.curr_strain
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

    pub fn curr_strain_peaks(&self) -> Vec<f64> {
        self.inner.curr_strain_peaks()
    }
}
