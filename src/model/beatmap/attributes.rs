use crate::{model::mods::GameMods, Difficulty};

use super::Beatmap;

/// Difficulty settings of a [`Beatmap`] after applying mods, custom
/// overrides, and the clock rate of a [`Difficulty`].
#[derive(Clone, Debug, PartialEq)]
pub struct BeatmapAttributes {
    /// The approach rate.
    pub ar: f64,
    /// The overall difficulty.
    pub od: f64,
    /// The circle size.
    pub cs: f64,
    /// The health drain rate.
    pub hp: f64,
    /// The clock rate with respect to mods.
    pub clock_rate: f64,
    /// Milliseconds between an object fading in and its start time, scaled
    /// by the clock rate.
    pub preempt: f64,
    /// Milliseconds within which a hit still counts as 300, scaled by the
    /// clock rate.
    pub great_hit_window: f64,
}

/// A value that is either final or still to be adjusted by mods.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ModsDependent {
    pub value: f32,
    pub with_mods: bool,
}

impl ModsDependent {
    pub const fn new(value: f32) -> Self {
        Self {
            value,
            with_mods: false,
        }
    }

    fn adjusted(self, mods: &GameMods, hr_multiplier: f32) -> f32 {
        if self.with_mods {
            self.value
        } else if mods.hr() {
            (self.value * hr_multiplier).min(10.0)
        } else if mods.ez() {
            self.value * 0.5
        } else {
            self.value
        }
    }
}

/// Milliseconds that a difficulty setting maps to at `0`, `5`, and `10`.
#[derive(Copy, Clone)]
struct DifficultyRange {
    at_zero: f64,
    at_five: f64,
    at_ten: f64,
}

impl DifficultyRange {
    fn value_at(self, difficulty: f64) -> f64 {
        let step = if difficulty >= 5.0 {
            self.at_ten - self.at_five
        } else {
            self.at_five - self.at_zero
        };

        self.at_five + step * (difficulty - 5.0) / 5.0
    }

    /// Inverse of [`value_at`](Self::value_at) for ranges that decrease with
    /// difficulty.
    fn difficulty_of(self, value: f64) -> f64 {
        if value > self.at_five {
            5.0 * (self.at_zero - value) / (self.at_zero - self.at_five)
        } else {
            5.0 + 5.0 * (self.at_five - value) / (self.at_five - self.at_ten)
        }
    }
}

impl BeatmapAttributes {
    const PREEMPT: DifficultyRange = DifficultyRange {
        at_zero: 1800.0,
        at_five: 1200.0,
        at_ten: 450.0,
    };

    const GREAT: DifficultyRange = DifficultyRange {
        at_zero: 80.0,
        at_five: 50.0,
        at_ten: 20.0,
    };

    /// Settings of `map` as they apply to a calculation with `difficulty`.
    pub fn new(map: &Beatmap, difficulty: &Difficulty) -> Self {
        let mods = difficulty.get_mods();
        let clock_rate = difficulty.get_clock_rate();

        let ar = difficulty.get_ar().unwrap_or(ModsDependent::new(map.ar));
        let od = difficulty.get_od().unwrap_or(ModsDependent::new(map.od));
        let cs = difficulty.get_cs().unwrap_or(ModsDependent::new(map.cs));
        let hp = difficulty.get_hp().unwrap_or(ModsDependent::new(map.hp));

        // Values that already include mods are not sped up either
        let rate_for = |value: ModsDependent| if value.with_mods { 1.0 } else { clock_rate };

        let preempt = Self::PREEMPT.value_at(f64::from(ar.adjusted(mods, 1.4))) / rate_for(ar);
        let great_hit_window =
            Self::GREAT.value_at(f64::from(od.adjusted(mods, 1.4))) / rate_for(od);

        Self {
            ar: Self::PREEMPT.difficulty_of(preempt),
            od: Self::GREAT.difficulty_of(great_hit_window),
            cs: f64::from(cs.adjusted(mods, 1.3)),
            hp: f64::from(hp.adjusted(mods, 1.4).min(10.0)),
            clock_rate,
            preempt,
            great_hit_window,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::util::float_ext::FloatExt;

    use super::*;

    fn map() -> Beatmap {
        Beatmap::new(Vec::new())
    }

    #[test]
    fn double_time_raises_approach_rate() {
        let difficulty = Difficulty::new().ar(8.5, false).mods(64);
        let attrs = BeatmapAttributes::new(&map(), &difficulty);

        assert!(attrs.ar.almost_eq(10.0, 1e-9), "{}", attrs.ar);
        assert!(attrs.preempt.almost_eq(450.0, 1e-9), "{}", attrs.preempt);
    }

    #[test]
    fn values_with_mods_stay() {
        let difficulty = Difficulty::new().ar(8.5, true).mods(64);
        let attrs = BeatmapAttributes::new(&map(), &difficulty);

        assert!(attrs.ar.almost_eq(8.5, 1e-9), "{}", attrs.ar);
    }

    #[test]
    fn hardrock_caps() {
        let map = Beatmap {
            ar: 9.0,
            od: 8.0,
            cs: 8.0,
            hp: 8.0,
            ..map()
        };

        let attrs = BeatmapAttributes::new(&map, &Difficulty::new().mods(16));

        assert!(attrs.ar.almost_eq(10.0, 1e-9), "{}", attrs.ar);
        assert!(attrs.od.almost_eq(10.0, 1e-9), "{}", attrs.od);
        assert!(attrs.cs.almost_eq(10.0, 1e-9), "{}", attrs.cs);
        assert!(attrs.hp.almost_eq(10.0, 1e-9), "{}", attrs.hp);
    }

    #[test]
    fn easy_halves() {
        let map = Beatmap {
            cs: 4.0,
            od: 6.0,
            ..map()
        };

        let attrs = BeatmapAttributes::new(&map, &Difficulty::new().mods(2));

        assert!(attrs.cs.almost_eq(2.0, 1e-6), "{}", attrs.cs);
        assert!(attrs.od.almost_eq(3.0, 1e-6), "{}", attrs.od);
    }

    #[test]
    fn nomod_keeps_map_values() {
        let map = Beatmap {
            ar: 3.0,
            od: 7.0,
            ..map()
        };

        let attrs = BeatmapAttributes::new(&map, &Difficulty::new());

        assert!(attrs.ar.almost_eq(3.0, 1e-9), "{}", attrs.ar);
        assert!(attrs.od.almost_eq(7.0, 1e-9), "{}", attrs.od);
        assert!(attrs.preempt.almost_eq(1440.0, 1e-9), "{}", attrs.preempt);
        assert!(attrs.great_hit_window.almost_eq(38.0, 1e-9));
    }
}
