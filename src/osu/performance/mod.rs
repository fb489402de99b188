use std::mem;

use crate::{model::mods::GameMods, util::map_or_attrs::MapOrAttrs, Beatmap, Difficulty};

use self::calculator::OsuPerformanceCalculator;

use super::{
    attributes::{OsuDifficultyAttributes, OsuPerformanceAttributes},
    score_state::OsuScoreState,
};

mod calculator;

pub const PERFORMANCE_BASE_MULTIPLIER: f64 = 1.15;

/// Performance calculator on osu!standard maps.
///
/// # Example
///
/// ```
/// use rosu_reading_pp::Beatmap;
/// use rosu_reading_pp::model::hit_object::{HitObject, Pos};
/// use rosu_reading_pp::osu::OsuPerformance;
///
/// let map = Beatmap::new(vec![
///     HitObject::circle(Pos::new(100.0, 100.0), 500.0),
///     HitObject::circle(Pos::new(300.0, 200.0), 750.0),
///     HitObject::circle(Pos::new(100.0, 300.0), 1000.0),
/// ]);
///
/// let attrs = OsuPerformance::new(&map)
///     .mods(8) // HD
///     .n100(1)
///     .misses(0)
///     .calculate();
///
/// assert_eq!(attrs.difficulty.n_circles, 3);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[must_use]
pub struct OsuPerformance<'map> {
    pub(crate) map_or_attrs: MapOrAttrs<'map>,
    pub(crate) difficulty: Difficulty,
    pub(crate) acc: Option<f64>,
    pub(crate) combo: Option<u32>,

    pub(crate) n300: Option<u32>,
    pub(crate) n100: Option<u32>,
    pub(crate) n50: Option<u32>,
    pub(crate) misses: Option<u32>,
    pub(crate) lazer: bool,
}

impl<'map> OsuPerformance<'map> {
    /// See [`osu::VERSION`](crate::osu::VERSION).
    pub const VERSION: u32 = super::VERSION;

    /// See [`osu::VERSION_MESSAGE`](crate::osu::VERSION_MESSAGE).
    pub const VERSION_MESSAGE: &'static str = super::VERSION_MESSAGE;

    /// Create a new performance calculator for osu!standard maps.
    pub fn new(map: &'map Beatmap) -> Self {
        map.into()
    }

    /// Provide the result of a previous difficulty or performance calculation.
    /// If you already calculated the attributes for the current map-mod combination,
    /// be sure to put them in here so that they don't have to be recalculated.
    pub fn attributes(mut self, attributes: impl Into<OsuDifficultyAttributes>) -> Self {
        self.map_or_attrs = MapOrAttrs::Attrs(attributes.into());

        self
    }

    /// Specify mods.
    ///
    /// Accepted types are
    /// - `u32`
    /// - [`rosu_mods::GameModsLegacy`]
    /// - [`rosu_mods::GameModsIntermode`]
    /// - [`&rosu_mods::GameModsIntermode`](rosu_mods::GameModsIntermode)
    ///
    /// See <https://github.com/ppy/osu-api/wiki#mods>
    pub fn mods(mut self, mods: impl Into<GameMods>) -> Self {
        self.difficulty = self.difficulty.mods(mods);

        self
    }

    /// Use the specified settings of the given [`Difficulty`].
    pub fn difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;

        self
    }

    /// Amount of passed objects for partial plays, e.g. a fail.
    pub fn passed_objects(mut self, passed_objects: u32) -> Self {
        self.difficulty = self.difficulty.passed_objects(passed_objects);

        self
    }

    /// Adjust the clock rate used in the calculation.
    ///
    /// If none is specified, it will take the clock rate based on the mods
    /// i.e. 1.5 for DT, 0.75 for HT and 1.0 otherwise.
    pub fn clock_rate(mut self, clock_rate: f64) -> Self {
        self.difficulty = self.difficulty.clock_rate(clock_rate);

        self
    }

    /// Whether the score was set on osu!lazer.
    ///
    /// On lazer, sliders count towards accuracy.
    pub const fn lazer(mut self, lazer: bool) -> Self {
        self.lazer = lazer;

        self
    }

    /// Specify the max combo of the play.
    pub const fn combo(mut self, combo: u32) -> Self {
        self.combo = Some(combo);

        self
    }

    /// Specify the amount of 300s of a play.
    pub const fn n300(mut self, n300: u32) -> Self {
        self.n300 = Some(n300);

        self
    }

    /// Specify the amount of 100s of a play.
    pub const fn n100(mut self, n100: u32) -> Self {
        self.n100 = Some(n100);

        self
    }

    /// Specify the amount of 50s of a play.
    pub const fn n50(mut self, n50: u32) -> Self {
        self.n50 = Some(n50);

        self
    }

    /// Specify the amount of misses of a play.
    pub const fn misses(mut self, misses: u32) -> Self {
        self.misses = Some(misses);

        self
    }

    /// Provide parameters through an [`OsuScoreState`].
    #[allow(clippy::needless_pass_by_value)]
    pub const fn state(mut self, state: OsuScoreState) -> Self {
        let OsuScoreState {
            max_combo,
            n300,
            n100,
            n50,
            misses,
        } = state;

        self.combo = Some(max_combo);
        self.n300 = Some(n300);
        self.n100 = Some(n100);
        self.n50 = Some(n50);
        self.misses = Some(misses);

        self
    }

    /// Specify the accuracy of a play between `0.0` and `100.0`.
    /// This will be used to generate matching hitresults.
    pub fn accuracy(mut self, acc: f64) -> Self {
        self.acc = Some(acc.clamp(0.0, 100.0) / 100.0);

        self
    }

    /// Create the [`OsuScoreState`] that will be used for performance calculation.
    ///
    /// Judgements that were not specified are inferred. If an accuracy was
    /// given, they are chosen to match it as closely as possible. Otherwise
    /// all remaining hits count as the best judgement that was not specified.
    pub fn generate_state(&mut self) -> OsuScoreState {
        let attrs = self.map_or_attrs.attrs_or_calculate(&self.difficulty);
        let n_objects = attrs.n_objects();
        let max_possible_combo = attrs.max_combo;

        let misses = self.misses.map_or(0, |n| n.min(n_objects));
        let max_possible_combo = max_possible_combo.saturating_sub(misses);

        let mut judgements = Judgements::new([self.n300, self.n100, self.n50], n_objects - misses);

        match self.acc {
            Some(acc) => judgements.fill_for_accuracy(acc * f64::from(6 * n_objects)),
            None => judgements.fill_remaining(),
        }

        let [n300, n100, n50] = judgements.counts;

        OsuScoreState {
            max_combo: self
                .combo
                .map_or(max_possible_combo, |combo| combo.min(max_possible_combo)),
            n300,
            n100,
            n50,
            misses,
        }
    }

    /// Calculate all performance related values, including pp and stars.
    pub fn calculate(mut self) -> OsuPerformanceAttributes {
        let state = self.generate_state();

        let attrs = match self.map_or_attrs {
            MapOrAttrs::Attrs(attrs) => attrs,
            MapOrAttrs::Map(map) => self.difficulty.calculate(map),
        };

        OsuPerformanceCalculator::new(attrs, self.difficulty.get_mods(), state, self.lazer)
            .calculate()
    }
}

impl<'map> From<&'map Beatmap> for OsuPerformance<'map> {
    fn from(map: &'map Beatmap) -> Self {
        Self::from_map_or_attrs(map.into())
    }
}

impl From<OsuDifficultyAttributes> for OsuPerformance<'_> {
    fn from(attrs: OsuDifficultyAttributes) -> Self {
        Self::from_map_or_attrs(attrs.into())
    }
}

impl From<OsuPerformanceAttributes> for OsuPerformance<'_> {
    fn from(attrs: OsuPerformanceAttributes) -> Self {
        attrs.difficulty.into()
    }
}

impl<'map> OsuPerformance<'map> {
    fn from_map_or_attrs(map_or_attrs: MapOrAttrs<'map>) -> Self {
        Self {
            map_or_attrs,
            difficulty: Difficulty::new(),
            acc: None,
            combo: None,

            n300: None,
            n100: None,
            n50: None,
            misses: None,
            lazer: false,
        }
    }
}

/// Judgement counts of a score while unspecified ones are being inferred.
///
/// Counts are ordered as 300s, 100s, and 50s.
struct Judgements {
    counts: [u32; 3],
    open: [bool; 3],
    left: u32,
}

impl Judgements {
    /// How much each judgement adds to the accuracy numerator.
    const WEIGHTS: [u32; 3] = [6, 2, 1];

    /// Given counts are capped in order so that they never exceed `n_hits`.
    fn new(given: [Option<u32>; 3], n_hits: u32) -> Self {
        let mut left = n_hits;

        let counts = given.map(|count| {
            let count = count.map_or(0, |n| n.min(left));
            left -= count;

            count
        });

        Self {
            counts,
            open: given.map(|count| count.is_none()),
            left,
        }
    }

    fn numerator(&self) -> u32 {
        self.counts
            .iter()
            .zip(Self::WEIGHTS)
            .map(|(count, weight)| count * weight)
            .sum()
    }

    /// Assign all remaining hits to the best open judgement or to 300s if
    /// every judgement was given.
    fn fill_remaining(&mut self) {
        let idx = self.open.iter().position(|&open| open).unwrap_or(0);
        self.counts[idx] += mem::take(&mut self.left);
    }

    /// Distribute the remaining hits across the open judgements so that the
    /// accuracy numerator gets as close as possible to `target`.
    fn fill_for_accuracy(&mut self, target: f64) {
        match self.open {
            [true, true, true] => self.fill_all(target),
            [true, true, false] => self.split(0, 1, target),
            [true, false, true] => self.split(0, 2, target),
            [false, true, true] => self.split(1, 2, target),
            _ => self.fill_remaining(),
        }
    }

    /// Split the remaining hits between the judgements `hi` and `lo`.
    fn split(&mut self, hi: usize, lo: usize, target: f64) {
        let (w_hi, w_lo) = (Self::WEIGHTS[hi], Self::WEIGHTS[lo]);

        // Numerator if every remaining hit was a `lo`
        let base = f64::from(self.numerator() + w_lo * self.left);
        let raw = (target - base) / f64::from(w_hi - w_lo);
        let n_hi = raw.round().clamp(0.0, f64::from(self.left)) as u32;

        self.counts[hi] += n_hi;
        self.counts[lo] += self.left - n_hi;
        self.left = 0;
    }

    fn fill_all(&mut self, target: f64) {
        let left = self.left;

        // With `left` hits the numerator is `left + 5 * n300 + n100`
        let excess = target - f64::from(left);
        let n300 = (excess / 5.0).floor().clamp(0.0, f64::from(left)) as u32;
        let n100 = (excess - f64::from(5 * n300))
            .round()
            .clamp(0.0, f64::from(left - n300)) as u32;
        let n50 = left - n300 - n100;

        // One 300 and four 50s are worth as much as five 100s
        let traded = n300.min(n50 / 4);

        self.counts = [n300 - traded, n100 + 5 * traded, n50 - 4 * traded];
        self.left = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const N_OBJECTS: u32 = 601;

    fn attrs() -> OsuDifficultyAttributes {
        OsuDifficultyAttributes {
            aim: 2.5,
            speed: 2.3,
            slider_factor: 0.98,
            speed_note_count: 300.0,
            aim_difficult_strain_count: 100.0,
            speed_difficult_strain_count: 80.0,
            ar: 9.3,
            od: 8.8,
            hp: 5.0,
            n_circles: 307,
            n_sliders: 293,
            n_spinners: 1,
            max_combo: 909,
            stars: 5.2,
            ..Default::default()
        }
    }

    fn performance() -> OsuPerformance<'static> {
        OsuPerformance::from(attrs())
    }

    #[test]
    fn state_without_anything() {
        let state = performance().generate_state();

        assert_eq!(
            state,
            OsuScoreState {
                max_combo: 909,
                n300: N_OBJECTS,
                n100: 0,
                n50: 0,
                misses: 0,
            }
        );
    }

    #[test]
    fn misses_reduce_combo_and_hits() {
        let state = performance().misses(2).n100(10).generate_state();

        assert_eq!(state.total_hits(), N_OBJECTS);
        assert_eq!(state.misses, 2);
        assert_eq!(state.n100, 10);
        assert_eq!(state.n300, N_OBJECTS - 12);
        assert_eq!(state.max_combo, 907);
    }

    #[test]
    fn accuracy_generates_closest_state() {
        let mut perf = performance().accuracy(95.0).misses(1);
        let state = perf.generate_state();

        assert_eq!(state.total_hits(), N_OBJECTS);
        assert!((state.accuracy() - 0.95).abs() < 0.005, "{}", state.accuracy());
    }

    #[test]
    fn remaining_hits_fill_best_open_judgement() {
        let state = performance().n300(500).generate_state();

        assert_eq!(state.n300, 500);
        assert_eq!(state.n100, N_OBJECTS - 500);
        assert_eq!(state.n50, 0);
    }

    #[test]
    fn given_counts_are_capped() {
        let state = performance().n300(700).n100(50).misses(3).generate_state();

        assert_eq!(state.misses, 3);
        assert_eq!(state.n300, N_OBJECTS - 3);
        assert_eq!(state.n100, 0);
        assert_eq!(state.total_hits(), N_OBJECTS);
    }

    #[test]
    fn accuracy_respects_given_hundreds() {
        let state = performance().n100(20).accuracy(97.0).generate_state();

        assert_eq!(state.n100, 20);
        assert_eq!(state.total_hits(), N_OBJECTS);
        assert!((state.accuracy() - 0.97).abs() < 0.001, "{}", state.accuracy());
    }

    #[test]
    fn accuracy_avoids_fifties() {
        let state = performance().accuracy(90.0).generate_state();

        assert_eq!(state.total_hits(), N_OBJECTS);
        assert!(state.n50 < 4, "{state:?}");
        assert!((state.accuracy() - 0.9).abs() < 0.001, "{}", state.accuracy());
    }
}
