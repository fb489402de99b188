use std::iter;

use crate::{
    osu::difficulty::object::OsuDifficultyObject,
    util::{float_ext::FloatExt, sorted_vec::SortedVec},
};

/// State shared by all strain based skills.
///
/// The map is split into sections of [`SECTION_LEN`] milliseconds and the
/// highest strain of each section is stored. Skills feed their per-object
/// strain into [`record`] and move on to the next section through
/// [`advance_section`].
///
/// [`SECTION_LEN`]: StrainSkill::SECTION_LEN
/// [`record`]: StrainSkill::record
/// [`advance_section`]: StrainSkill::advance_section
#[derive(Clone, Default)]
pub struct StrainSkill {
    pub curr_section_peak: f64,
    pub curr_section_end: f64,
    pub strain_peaks: Vec<f64>,
    pub object_strains: Vec<f64>,
    step: Option<StepState>,
}

/// Values that are kept up to date after every object when calculating
/// gradually.
#[derive(Clone)]
struct StepState {
    sorted_peaks: SortedVec<f64>,
    difficulty: f64,
    difficult_strains: f64,
}

impl StrainSkill {
    pub const SECTION_LEN: f64 = 400.0;
    pub const DECAY_WEIGHT: f64 = 0.9;
    pub const REDUCED_SECTION_COUNT: usize = 10;
    pub const REDUCED_STRAIN_BASELINE: f64 = 0.75;

    pub fn new(step: bool) -> Self {
        Self {
            step: step.then(|| StepState {
                sorted_peaks: SortedVec::new_f64(),
                difficulty: 0.0,
                difficult_strains: 0.0,
            }),
            ..Self::default()
        }
    }

    /// Close all sections that end before `curr` starts.
    ///
    /// Every new section starts with the strain returned by `initial_strain`
    /// for the section's start time.
    pub fn advance_section(
        &mut self,
        curr: &OsuDifficultyObject,
        mut initial_strain: impl FnMut(f64) -> f64,
    ) {
        if curr.idx == 0 {
            self.curr_section_end = (curr.start_time / Self::SECTION_LEN).ceil() * Self::SECTION_LEN;
        }

        while curr.start_time > self.curr_section_end {
            self.save_curr_peak();
            self.curr_section_peak = initial_strain(self.curr_section_end);
            self.curr_section_end += Self::SECTION_LEN;
        }
    }

    /// Same as [`advance_section`](Self::advance_section) but new sections
    /// start at zero.
    pub fn advance_section_from_zero(&mut self, curr: &OsuDifficultyObject) {
        self.advance_section(curr, |_| 0.0);
    }

    pub fn record(&mut self, strain: f64) {
        self.curr_section_peak = self.curr_section_peak.max(strain);
        self.object_strains.push(strain);
    }

    fn save_curr_peak(&mut self) {
        self.strain_peaks.push(self.curr_section_peak);

        if let Some(ref mut step) = self.step {
            step.sorted_peaks.insert(self.curr_section_peak);
        }
    }

    /// All section peaks including the currently open section.
    pub fn curr_strain_peaks(&self) -> Vec<f64> {
        let mut peaks = Vec::with_capacity(self.strain_peaks.len() + 1);
        peaks.extend_from_slice(&self.strain_peaks);
        peaks.push(self.curr_section_peak);

        peaks
    }

    /// Weighted sum of the section peaks after reducing the highest ones.
    pub fn difficulty_value(&self, reduced_section_count: usize, reduced_strain_baseline: f64) -> f64 {
        if let Some(ref step) = self.step {
            return step.difficulty;
        }

        difficulty_value(
            self.curr_strain_peaks(),
            reduced_section_count,
            reduced_strain_baseline,
        )
    }

    /// Amount of strains that are considered difficult relative to the
    /// given difficulty value.
    pub fn difficult_strain_count(&self, difficulty: f64) -> f64 {
        match self.step {
            Some(ref step) => step.difficult_strains,
            None => count_top_weighted_strains(&self.object_strains, difficulty),
        }
    }

    /// Update the gradual difficulty after the latest recorded strain.
    ///
    /// Does nothing if the skill is not calculated gradually.
    pub fn update_step(&mut self, reduced_section_count: usize, reduced_strain_baseline: f64) {
        let Some(ref step) = self.step else {
            return;
        };

        // Stored peaks are already sorted so only the open section's peak
        // needs to be merged in
        let mut stored = step.sorted_peaks.iter().rev().copied().peekable();
        let mut open_peak = Some(self.curr_section_peak);

        let peaks = iter::from_fn(|| match (open_peak, stored.peek().copied()) {
            (Some(open), Some(peak)) if peak > open => stored.next(),
            (Some(_), _) => open_peak.take(),
            (None, _) => stored.next(),
        });

        let difficulty =
            sorted_difficulty_value(peaks, reduced_section_count, reduced_strain_baseline);
        let last_strain = self.object_strains.last().copied().unwrap_or(0.0);

        let difficult_strains = if difficulty.not_eq(step.difficulty) {
            count_top_weighted_strains(&self.object_strains, difficulty)
        } else if difficulty.not_eq(0.0) {
            step.difficult_strains + difficult_strain_weight(last_strain, difficulty / 10.0)
        } else {
            step.difficult_strains
        };

        if let Some(ref mut step) = self.step {
            step.difficulty = difficulty;
            step.difficult_strains = difficult_strains;
        }
    }
}

pub fn difficulty_value(
    current_strain_peaks: Vec<f64>,
    reduced_section_count: usize,
    reduced_strain_baseline: f64,
) -> f64 {
    // * Sections with 0 strain are excluded to avoid worst-case time complexity of the following sort (e.g. /b/2351871).
    // * These sections will not contribute to the difficulty.
    let mut peaks = current_strain_peaks;
    peaks.retain(|&peak| peak > 0.0);
    peaks.sort_unstable_by(|a, b| b.total_cmp(a));

    sorted_difficulty_value(peaks.into_iter(), reduced_section_count, reduced_strain_baseline)
}

/// Same as [`difficulty_value`] for peaks in descending order.
fn sorted_difficulty_value(
    peaks: impl Iterator<Item = f64>,
    reduced_section_count: usize,
    reduced_strain_baseline: f64,
) -> f64 {
    let mut peaks = peaks.filter(|&peak| peak > 0.0);

    // * We are reducing the highest strains first to account for extreme difficulty spikes
    let mut reduced: Vec<f64> = peaks
        .by_ref()
        .take(reduced_section_count)
        .enumerate()
        .map(|(i, strain)| {
            let clamped = (i as f64 / reduced_section_count as f64).clamp(0.0, 1.0);
            let scale = f64::log10(f64::lerp(1.0, 10.0, clamped));

            strain * f64::lerp(reduced_strain_baseline, 1.0, scale)
        })
        .collect();

    reduced.sort_unstable_by(|a, b| b.total_cmp(a));

    // Only the reduced peaks can be out of order
    let mut reduced = reduced.into_iter().peekable();
    let mut rest = peaks.peekable();

    let merged = iter::from_fn(|| match (reduced.peek().copied(), rest.peek().copied()) {
        (Some(a), Some(b)) if b > a => rest.next(),
        (Some(_), _) => reduced.next(),
        (None, _) => rest.next(),
    });

    let mut difficulty = 0.0;
    let mut weight = 1.0;

    // * Difficulty is the weighted sum of the highest strains from every section.
    // * We're sorting from highest to lowest strain.
    for strain in merged {
        let next = difficulty + strain * weight;

        if next.eq(difficulty) {
            break;
        }

        difficulty = next;
        weight *= StrainSkill::DECAY_WEIGHT;
    }

    difficulty
}

pub fn count_top_weighted_strains(object_strains: &[f64], difficulty_value: f64) -> f64 {
    if object_strains.is_empty() {
        return 0.0;
    }

    // * What would the top strain be if all strain values were identical
    let consistent_top_strain = difficulty_value / 10.0;

    if consistent_top_strain.eq(0.0) {
        return object_strains.len() as f64;
    }

    // * Use a weighted sum of all strains. Constants are arbitrary and give nice values
    object_strains
        .iter()
        .map(|&strain| difficult_strain_weight(strain, consistent_top_strain))
        .sum()
}

fn difficult_strain_weight(strain: f64, consistent_top_strain: f64) -> f64 {
    1.1 / (1.0 + f64::exp(-10.0 * (strain / consistent_top_strain - 0.88)))
}

pub fn strain_decay(ms: f64, strain_decay_base: f64) -> f64 {
    f64::powf(strain_decay_base, ms / 1000.0)
}

pub fn difficulty_to_performance(difficulty: f64) -> f64 {
    f64::powf(5.0 * f64::max(1.0, difficulty / 0.0675) - 4.0, 3.0) / 100_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_peak_is_reduced() {
        let value = difficulty_value(vec![0.0, 100.0, 0.0], 10, 0.75);

        assert!(value.almost_eq(75.0, 1e-9), "{value}");
    }

    #[test]
    fn peaks_are_weighted_by_rank() {
        // No reduction so only the weighting applies
        let value = difficulty_value(vec![1.0, 2.0, 4.0], 0, 0.75);

        assert!(value.almost_eq(4.0 + 2.0 * 0.9 + 0.81, 1e-9), "{value}");
    }

    #[test]
    fn top_weighted_strains_without_difficulty() {
        assert!(count_top_weighted_strains(&[], 10.0).eq(0.0));
        assert!(count_top_weighted_strains(&[1.0, 2.0, 3.0], 0.0).eq(3.0));

        let count = count_top_weighted_strains(&[10.0, 10.0, 0.0], 10.0);
        assert!(count > 2.0 && count < 2.21, "{count}");
    }

    #[test]
    fn sorted_peaks_skip_sorting() {
        let peaks: Vec<f64> = vec![3.0, 0.0, 12.0, 4.0, 9.0, 2.5, 6.0, 11.0, 5.0, 8.0, 0.5, 7.5, 1.0];

        let mut sorted = peaks.clone();
        sorted.sort_unstable_by(|a, b| b.total_cmp(a));

        let expected = difficulty_value(peaks, 10, 0.75);
        let actual = sorted_difficulty_value(sorted.into_iter(), 10, 0.75);

        assert!(actual.almost_eq(expected, 1e-12), "{actual} vs {expected}");
    }

    #[test]
    fn step_mode_matches_full_evaluation() {
        let peaks = [3.0, 7.5, 1.0, 0.0, 12.0, 4.0, 9.0, 2.5, 6.0, 11.0, 5.0, 8.0, 0.5];

        let mut step = StrainSkill::new(true);
        let mut full = StrainSkill::new(false);

        for (i, &peak) in peaks.iter().enumerate() {
            for skill in [&mut step, &mut full] {
                if i > 0 {
                    skill.save_curr_peak();
                }

                skill.curr_section_peak = peak;
                skill.record(peak);
            }

            step.update_step(
                StrainSkill::REDUCED_SECTION_COUNT,
                StrainSkill::REDUCED_STRAIN_BASELINE,
            );

            let expected = full.difficulty_value(
                StrainSkill::REDUCED_SECTION_COUNT,
                StrainSkill::REDUCED_STRAIN_BASELINE,
            );
            let actual = step.difficulty_value(
                StrainSkill::REDUCED_SECTION_COUNT,
                StrainSkill::REDUCED_STRAIN_BASELINE,
            );

            assert!(actual.almost_eq(expected, 1e-9), "{actual} vs {expected}");
        }
    }

    #[test]
    fn step_mode_grows_within_section() {
        let mut skill = StrainSkill::new(true);

        for peak in [5.0, 2.0, 9.0] {
            skill.curr_section_peak = peak;
            skill.save_curr_peak();
        }

        skill.curr_section_peak = 0.0;
        let mut prev = 0.0;

        // Later strains of the open section may be lower than its peak
        for strain in [1.0, 4.0, 3.0, 8.0, 2.0, 10.0, 6.0] {
            skill.record(strain);
            skill.update_step(
                StrainSkill::REDUCED_SECTION_COUNT,
                StrainSkill::REDUCED_STRAIN_BASELINE,
            );

            let value = skill.difficulty_value(
                StrainSkill::REDUCED_SECTION_COUNT,
                StrainSkill::REDUCED_STRAIN_BASELINE,
            );

            assert!(value >= prev, "{value} < {prev}");
            prev = value;
        }
    }

    #[test]
    fn decay() {
        assert!(strain_decay(0.0, 0.15).eq(1.0));
        assert!(strain_decay(1000.0, 0.15).almost_eq(0.15, 1e-12));
    }

    #[test]
    fn performance_floor() {
        assert!(difficulty_to_performance(0.0).almost_eq(1e-5, 1e-12));
    }
}
