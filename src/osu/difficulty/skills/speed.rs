use crate::{
    osu::difficulty::{
        evaluators::{RhythmEvaluator, SpeedEvaluator},
        object::OsuDifficultyObject,
    },
    util::float_ext::FloatExt,
};

use super::strain::{strain_decay, StrainSkill};

#[derive(Clone)]
pub struct Speed {
    curr_strain: f64,
    curr_rhythm: f64,
    /// Highest strain and the matching relevant note count so far; only
    /// tracked when calculating gradually.
    step_notes: Option<(f64, f64)>,
    pub inner: StrainSkill,
}

impl Speed {
    pub const SKILL_MULTIPLIER: f64 = 1.430;
    pub const STRAIN_DECAY_BASE: f64 = 0.3;
    const REDUCED_SECTION_COUNT: usize = 5;

    pub fn new(step: bool) -> Self {
        Self {
            curr_strain: 0.0,
            curr_rhythm: 0.0,
            step_notes: step.then_some((0.0, 0.0)),
            inner: StrainSkill::new(step),
        }
    }

    pub fn process(&mut self, curr: &OsuDifficultyObject, objects: &[OsuDifficultyObject]) {
        let prev_start_time = curr.previous(0, objects).map_or(0.0, |prev| prev.start_time);
        let total_strain = self.curr_strain * self.curr_rhythm;

        self.inner.advance_section(curr, |time| {
            total_strain * strain_decay(time - prev_start_time, Self::STRAIN_DECAY_BASE)
        });

        let strain = self.strain_value_at(curr, objects);
        self.inner.record(strain);
        self.inner
            .update_step(Self::REDUCED_SECTION_COUNT, StrainSkill::REDUCED_STRAIN_BASELINE);

        if let Some((max_strain, relevant_notes)) = self.step_notes {
            self.step_notes = Some(if strain > max_strain {
                (strain, relevant_note_count(&self.inner.object_strains, strain))
            } else if max_strain.not_eq(0.0) {
                (max_strain, relevant_notes + relevant_note_weight(strain, max_strain))
            } else {
                (max_strain, relevant_notes)
            });
        }
    }

    fn strain_value_at(&mut self, curr: &OsuDifficultyObject, objects: &[OsuDifficultyObject]) -> f64 {
        self.curr_strain *= strain_decay(curr.strain_time, Self::STRAIN_DECAY_BASE);
        self.curr_strain += SpeedEvaluator::evaluate_diff_of(curr, objects) * Self::SKILL_MULTIPLIER;

        self.curr_rhythm =
            curr.rhythm_difficulty(|| RhythmEvaluator::evaluate_diff_of(curr, objects));

        self.curr_strain * self.curr_rhythm
    }

    pub fn difficulty_value(&self) -> f64 {
        self.inner
            .difficulty_value(Self::REDUCED_SECTION_COUNT, StrainSkill::REDUCED_STRAIN_BASELINE)
    }

    pub fn difficult_strain_count(&self, difficulty: f64) -> f64 {
        self.inner.difficult_strain_count(difficulty)
    }

    /// Amount of notes weighted by their strain relative to the highest one.
    pub fn relevant_note_count(&self) -> f64 {
        if let Some((_, relevant_notes)) = self.step_notes {
            return relevant_notes;
        }

        self.inner
            .object_strains
            .iter()
            .copied()
            .max_by(f64::total_cmp)
            .filter(|&max_strain| max_strain > 0.0)
            .map_or(0.0, |max_strain| {
                relevant_note_count(&self.inner.object_strains, max_strain)
            })
    }

    pub fn curr_strain_peaks(&self) -> Vec<f64> {
        self.inner.curr_strain_peaks()
    }
}

fn relevant_note_count(object_strains: &[f64], max_strain: f64) -> f64 {
    object_strains
        .iter()
        .map(|&strain| relevant_note_weight(strain, max_strain))
        .sum()
}

fn relevant_note_weight(strain: f64, max_strain: f64) -> f64 {
    (1.0 + f64::exp(-(strain / max_strain * 12.0 - 6.0))).recip()
}
