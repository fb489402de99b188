use std::{cmp, f64::consts::PI};

use crate::{
    osu::difficulty::object::OsuDifficultyObject,
    util::{difficulty::logistic, float_ext::FloatExt},
};

/// Rates how complex the rhythm leading up to an object is.
///
/// Consecutive objects with similar delta times form an island. Changes
/// between islands are rewarded unless they repeat or involve sliders.
pub struct RhythmEvaluator;

impl RhythmEvaluator {
    const HISTORY_TIME_MAX: f64 = 5000.0;
    const HISTORY_OBJECTS_MAX: usize = 32;
    const RHYTHM_OVERALL_MULTIPLIER: f64 = 0.95;
    const RHYTHM_RATIO_MULTIPLIER: f64 = 12.0;

    /// Rhythm complexity multiplier of `curr`, at least `1.0`.
    ///
    /// Spinners have no rhythm and are rated `0.0`.
    pub fn evaluate_diff_of(curr: &OsuDifficultyObject, diff_objects: &[OsuDifficultyObject]) -> f64 {
        if curr.base.is_spinner() {
            return 0.0;
        }

        let history_len = cmp::min(curr.idx, Self::HISTORY_OBJECTS_MAX);
        let history_start = Self::history_start(curr, diff_objects, history_len);

        let Some((mut prev_obj, mut last_obj)) = curr
            .previous(history_start, diff_objects)
            .zip(curr.previous(history_start + 1, diff_objects))
        else {
            return Self::multiplier(0.0);
        };

        let mut state = RhythmState::new(curr.hit_window * 0.3);

        // Oldest objects first
        for i in (1..=history_start).rev() {
            let Some(curr_obj) = curr.previous(i - 1, diff_objects) else {
                break;
            };

            let time_decay = (Self::HISTORY_TIME_MAX - (curr.start_time - curr_obj.start_time))
                / Self::HISTORY_TIME_MAX;
            let note_decay = (history_len - i) as f64 / history_len as f64;

            state.process(curr_obj, prev_obj, last_obj, note_decay.min(time_decay));

            last_obj = prev_obj;
            prev_obj = curr_obj;
        }

        Self::multiplier(state.complexity_sum)
    }

    /// How many objects back the considered history reaches.
    fn history_start(
        curr: &OsuDifficultyObject,
        diff_objects: &[OsuDifficultyObject],
        history_len: usize,
    ) -> usize {
        let mut start = 0;

        while curr.previous(start, diff_objects).is_some_and(|prev| {
            start + 2 < history_len && curr.start_time - prev.start_time < Self::HISTORY_TIME_MAX
        }) {
            start += 1;
        }

        start
    }

    fn multiplier(complexity_sum: f64) -> f64 {
        (4.0 + complexity_sum * Self::RHYTHM_OVERALL_MULTIPLIER).sqrt() / 2.0
    }
}

/// Bonus for a change from `prev_delta` to `curr_delta` before patterns are
/// taken into account.
fn base_ratio(prev_delta: f64, curr_delta: f64, eps: f64) -> f64 {
    // Deltas that are multiples of each other, e.g. 100 and 200, get less
    let delta_difference_ratio = prev_delta.min(curr_delta) / prev_delta.max(curr_delta);
    let ratio = 1.0
        + RhythmEvaluator::RHYTHM_RATIO_MULTIPLIER
            * (PI / delta_difference_ratio).sin().powi(2).min(0.5);

    let fraction = (prev_delta / curr_delta).max(curr_delta / prev_delta);
    let fraction_multiplier = (2.0 - fraction / 8.0).clamp(0.0, 1.0);

    let window_penalty = (((prev_delta - curr_delta).abs() - eps).max(0.0) / eps).min(1.0);

    window_penalty * ratio * fraction_multiplier
}

/// Running state while walking through the rhythm history.
struct RhythmState {
    eps: f64,
    island: RhythmIsland,
    prev_island: RhythmIsland,
    // Islands compare with a tolerance so they can't be hashed
    island_counts: Vec<(RhythmIsland, usize)>,
    start_ratio: f64,
    in_island: bool,
    complexity_sum: f64,
}

impl RhythmState {
    fn new(eps: f64) -> Self {
        Self {
            eps,
            island: RhythmIsland::new(eps),
            prev_island: RhythmIsland::new(eps),
            island_counts: Vec::new(),
            start_ratio: 0.0,
            in_island: false,
            complexity_sum: 0.0,
        }
    }

    fn process(
        &mut self,
        curr_obj: &OsuDifficultyObject,
        prev_obj: &OsuDifficultyObject,
        last_obj: &OsuDifficultyObject,
        decay: f64,
    ) {
        let eps = self.eps;
        let curr_delta = curr_obj.strain_time;
        let prev_delta = prev_obj.strain_time;
        let last_delta = last_obj.strain_time;

        let mut ratio = base_ratio(prev_delta, curr_delta, eps);

        if !self.in_island {
            // Speeding up starts an island
            if prev_delta > curr_delta + eps {
                self.in_island = true;

                if curr_obj.base.is_slider() {
                    ratio *= 0.6;
                }

                if prev_obj.base.is_slider() {
                    ratio *= 0.6;
                }

                self.start_ratio = ratio;
                self.island = RhythmIsland::new_with_delta(curr_delta as i32, eps);
            }

            return;
        }

        if prev_delta.almost_eq(curr_delta, eps) {
            self.island.add_delta(curr_delta as i32);

            return;
        }

        // Changes into or out of sliders have lenient timing
        if curr_obj.base.is_slider() {
            ratio *= 0.125;
        }

        if prev_obj.base.is_slider() {
            ratio *= 0.3;
        }

        if self.island.is_similar_polarity(&self.prev_island) {
            ratio *= 0.5;
        }

        // Two speed ups in a row, e.g. 1/1 to 1/2 to 1/4
        if last_delta > prev_delta + eps && prev_delta > curr_delta + eps {
            ratio *= 0.125;
        }

        if self.prev_island.delta_count == self.island.delta_count {
            ratio *= 0.5;
        }

        ratio *= self.repetition_factor();
        ratio *= 1.0 - prev_obj.get_doubletapness(Some(curr_obj)) * 0.75;

        self.complexity_sum += (ratio * self.start_ratio).sqrt() * decay;
        self.start_ratio = ratio;
        self.prev_island = self.island;

        // Slowing down ends the island
        if prev_delta + eps < curr_delta {
            self.in_island = false;
        }

        self.island = RhythmIsland::new_with_delta(curr_delta as i32, eps);
    }

    /// Penalty for the current island if it was seen before. Unseen islands
    /// are recorded instead.
    fn repetition_factor(&mut self) -> f64 {
        let island = self.island;

        let Some((_, count)) = self
            .island_counts
            .iter_mut()
            .find(|(seen, _)| *seen == island)
            .filter(|entry| !entry.0.is_default())
        else {
            self.island_counts.push((island, 1));

            return 1.0;
        };

        // Only directly consecutive repeats are counted
        if self.prev_island == island {
            *count += 1;
        }

        let count = *count as f64;
        let power = logistic(f64::from(island.delta), 58.33, 0.24, Some(2.75));

        (3.0 / count).min(count.recip().powf(power))
    }
}

const MIN_DELTA_TIME: i32 = OsuDifficultyObject::MIN_DELTA_TIME as i32;

/// Group of consecutive objects with about the same delta time.
#[derive(Copy, Clone, Debug)]
struct RhythmIsland {
    eps: f64,
    delta: i32,
    delta_count: i32,
}

impl RhythmIsland {
    const NO_DELTA: i32 = i32::MAX;

    const fn new(eps: f64) -> Self {
        Self {
            eps,
            delta: Self::NO_DELTA,
            delta_count: 0,
        }
    }

    fn new_with_delta(delta: i32, eps: f64) -> Self {
        Self {
            eps,
            delta: delta.max(MIN_DELTA_TIME),
            delta_count: 1,
        }
    }

    fn add_delta(&mut self, delta: i32) {
        if self.delta == Self::NO_DELTA {
            self.delta = delta.max(MIN_DELTA_TIME);
        }

        self.delta_count += 1;
    }

    const fn is_similar_polarity(&self, other: &Self) -> bool {
        self.delta_count % 2 == other.delta_count % 2
    }

    const fn is_default(&self) -> bool {
        self.delta == Self::NO_DELTA && self.delta_count == 0
    }
}

impl PartialEq for RhythmIsland {
    fn eq(&self, other: &Self) -> bool {
        f64::from(self.delta.abs_diff(other.delta)) < self.eps
            && self.delta_count == other.delta_count
    }
}
