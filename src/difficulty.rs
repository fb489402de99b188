use crate::{
    model::{
        beatmap::{Beatmap, ModsDependent, TooSuspicious},
        mods::GameMods,
    },
    osu::{
        difficulty as osu_difficulty, strains, OsuDifficultyAttributes, OsuGradualDifficulty,
        OsuStrains,
    },
};

/// Difficulty calculator on osu!standard maps.
///
/// # Example
///
/// ```
/// use rosu_reading_pp::{Beatmap, Difficulty};
/// use rosu_reading_pp::model::hit_object::{HitObject, Pos};
///
/// let map = Beatmap::new(vec![
///     HitObject::circle(Pos::new(100.0, 100.0), 500.0),
///     HitObject::circle(Pos::new(300.0, 200.0), 750.0),
/// ]);
///
/// let attrs = Difficulty::new()
///     .mods(8 + 64) // HDDT
///     .ar(9.5, false)
///     .calculate(&map);
///
/// assert_eq!(attrs.max_combo, 2);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
#[must_use]
pub struct Difficulty {
    mods: GameMods,
    passed_objects: Option<u32>,
    clock_rate: Option<f64>,
    ar: Option<ModsDependent>,
    cs: Option<ModsDependent>,
    hp: Option<ModsDependent>,
    od: Option<ModsDependent>,
}

impl Difficulty {
    /// See [`osu::VERSION`](crate::osu::VERSION).
    pub const VERSION: u32 = crate::osu::VERSION;

    /// See [`osu::VERSION_MESSAGE`](crate::osu::VERSION_MESSAGE).
    pub const VERSION_MESSAGE: &'static str = crate::osu::VERSION_MESSAGE;

    /// Create a new difficulty calculator.
    pub fn new() -> Self {
        Self::default()
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
    pub fn mods(self, mods: impl Into<GameMods>) -> Self {
        Self {
            mods: mods.into(),
            ..self
        }
    }

    /// Amount of passed objects for partial plays, e.g. a fail.
    pub const fn passed_objects(mut self, passed_objects: u32) -> Self {
        self.passed_objects = Some(passed_objects);

        self
    }

    /// Adjust the clock rate used in the calculation.
    ///
    /// If none is specified, it will take the clock rate based on the mods
    /// i.e. 1.5 for DT, 0.75 for HT and 1.0 otherwise.
    ///
    /// | Minimum | Maximum |
    /// | :-----: | :-----: |
    /// | 0.01    | 100     |
    pub fn clock_rate(self, clock_rate: f64) -> Self {
        Self {
            clock_rate: Some(clock_rate.clamp(0.01, 100.0)),
            ..self
        }
    }

    /// Override a beatmap's set AR.
    ///
    /// `with_mods` determines if the given value should be used before
    /// or after accounting for mods, e.g. on `true` the value will be
    /// used as is and on `false` it will be modified based on the mods.
    ///
    /// | Minimum | Maximum |
    /// | :-----: | :-----: |
    /// | -20     | 20      |
    pub fn ar(self, ar: f32, with_mods: bool) -> Self {
        Self {
            ar: Some(ModsDependent {
                value: ar.clamp(-20.0, 20.0),
                with_mods,
            }),
            ..self
        }
    }

    /// Override a beatmap's set CS.
    ///
    /// `with_mods` determines if the given value should be used before
    /// or after accounting for mods, e.g. on `true` the value will be
    /// used as is and on `false` it will be modified based on the mods.
    ///
    /// | Minimum | Maximum |
    /// | :-----: | :-----: |
    /// | -20     | 20      |
    pub fn cs(self, cs: f32, with_mods: bool) -> Self {
        Self {
            cs: Some(ModsDependent {
                value: cs.clamp(-20.0, 20.0),
                with_mods,
            }),
            ..self
        }
    }

    /// Override a beatmap's set HP.
    ///
    /// `with_mods` determines if the given value should be used before
    /// or after accounting for mods, e.g. on `true` the value will be
    /// used as is and on `false` it will be modified based on the mods.
    ///
    /// | Minimum | Maximum |
    /// | :-----: | :-----: |
    /// | -20     | 20      |
    pub fn hp(self, hp: f32, with_mods: bool) -> Self {
        Self {
            hp: Some(ModsDependent {
                value: hp.clamp(-20.0, 20.0),
                with_mods,
            }),
            ..self
        }
    }

    /// Override a beatmap's set OD.
    ///
    /// `with_mods` determines if the given value should be used before
    /// or after accounting for mods, e.g. on `true` the value will be
    /// used as is and on `false` it will be modified based on the mods.
    ///
    /// | Minimum | Maximum |
    /// | :-----: | :-----: |
    /// | -20     | 20      |
    pub fn od(self, od: f32, with_mods: bool) -> Self {
        Self {
            od: Some(ModsDependent {
                value: od.clamp(-20.0, 20.0),
                with_mods,
            }),
            ..self
        }
    }

    /// Perform the difficulty calculation.
    pub fn calculate(&self, map: &Beatmap) -> OsuDifficultyAttributes {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            mods = self.mods.bits(),
            n_objects = map.hit_objects.len(),
            clock_rate = self.get_clock_rate(),
            "Starting difficulty calculation"
        );

        osu_difficulty::difficulty(self, map)
    }

    /// Same as [`Difficulty::calculate`] but verifies first that the map
    /// is not too suspicious.
    pub fn checked_calculate(&self, map: &Beatmap) -> Result<OsuDifficultyAttributes, TooSuspicious> {
        if let Err(err) = map.check_suspicion() {
            #[cfg(feature = "tracing")]
            tracing::warn!(reason = %err, "Rejecting suspicious map");

            return Err(err);
        }

        Ok(self.calculate(map))
    }

    /// Perform the difficulty calculation but instead of evaluating the skill
    /// values, return them as is.
    ///
    /// Suitable to plot the difficulty of a map over time.
    pub fn strains(&self, map: &Beatmap) -> OsuStrains {
        strains::strains(self, map)
    }

    /// Create a gradual difficulty calculator for the given map.
    pub fn gradual(&self, map: &Beatmap) -> OsuGradualDifficulty {
        OsuGradualDifficulty::new(self.clone(), map)
    }

    /// Collect the difficulty attributes after every hit object.
    pub fn gradual_attributes(&self, map: &Beatmap) -> Vec<OsuDifficultyAttributes> {
        self.gradual(map).collect()
    }

    /// Returns the mods that are used.
    pub const fn get_mods(&self) -> &GameMods {
        &self.mods
    }

    /// Returns the clock rate, either the custom one or the mods' one.
    pub fn get_clock_rate(&self) -> f64 {
        self.clock_rate.unwrap_or_else(|| self.mods.clock_rate())
    }

    /// Returns the amount of objects to process; unbounded by default.
    pub fn get_passed_objects(&self) -> usize {
        self.passed_objects.map_or(usize::MAX, |n| n as usize)
    }

    pub const fn get_ar(&self) -> Option<ModsDependent> {
        self.ar
    }

    pub const fn get_cs(&self) -> Option<ModsDependent> {
        self.cs
    }

    pub const fn get_hp(&self) -> Option<ModsDependent> {
        self.hp
    }

    pub const fn get_od(&self) -> Option<ModsDependent> {
        self.od
    }
}

#[cfg(test)]
mod tests {
    use crate::model::hit_object::{HitObject, Pos};

    use super::*;

    #[test]
    fn clock_rate_falls_back_to_mods() {
        assert!((Difficulty::new().mods(64).get_clock_rate() - 1.5).abs() < 1e-12);
        assert!((Difficulty::new().mods(256).get_clock_rate() - 0.75).abs() < 1e-12);
        assert!((Difficulty::new().mods(64).clock_rate(1.2).get_clock_rate() - 1.2).abs() < 1e-12);
    }

    #[test]
    fn passed_objects_default_is_unbounded() {
        assert_eq!(Difficulty::new().get_passed_objects(), usize::MAX);
        assert_eq!(Difficulty::new().passed_objects(3).get_passed_objects(), 3);
    }

    #[test]
    fn overrides_are_clamped() {
        let difficulty = Difficulty::new().ar(30.0, true).od(-30.0, false);

        assert_eq!(
            difficulty.get_ar(),
            Some(ModsDependent {
                value: 20.0,
                with_mods: true
            })
        );
        assert_eq!(
            difficulty.get_od(),
            Some(ModsDependent {
                value: -20.0,
                with_mods: false
            })
        );
        assert!(difficulty.get_cs().is_none());
    }

    #[test]
    fn gradual_attributes_per_object() {
        let map = Beatmap::new(
            (0..5)
                .map(|i| HitObject::circle(Pos::new(64.0 * i as f32, 192.0), 300.0 * f64::from(i)))
                .collect(),
        );

        let attrs = Difficulty::new().gradual_attributes(&map);

        assert_eq!(attrs.len(), 5);
        assert_eq!(attrs[4].max_combo, 5);
    }
}
