use crate::{osu::OsuPerformance, Difficulty, OsuGradualDifficulty};

pub use self::{
    attributes::{BeatmapAttributes, ModsDependent},
    suspicious::TooSuspicious,
};

use super::hit_object::HitObject;

mod attributes;
mod suspicious;

/// All beatmap data that is relevant for difficulty and performance
/// calculation.
///
/// Hit objects must be sorted by their start time.
#[derive(Clone, Debug, PartialEq)]
pub struct Beatmap {
    // Difficulty
    pub ar: f32,
    pub cs: f32,
    pub hp: f32,
    pub od: f32,

    // HitObjects
    pub hit_objects: Vec<HitObject>,
}

impl Beatmap {
    /// Create a [`Beatmap`] with the given hit objects and all attributes set
    /// to `5.0`.
    pub fn new(hit_objects: Vec<HitObject>) -> Self {
        Self {
            hit_objects,
            ..Self::default()
        }
    }

    /// Difficulty settings of this [`Beatmap`] after applying the given
    /// [`Difficulty`].
    pub fn attributes(&self, difficulty: &Difficulty) -> BeatmapAttributes {
        BeatmapAttributes::new(self, difficulty)
    }

    /// Create a performance calculator for this [`Beatmap`].
    pub fn performance(&self) -> OsuPerformance<'_> {
        OsuPerformance::new(self)
    }

    /// Create a gradual difficulty calculator for this [`Beatmap`].
    pub fn gradual_difficulty(&self, difficulty: Difficulty) -> OsuGradualDifficulty {
        OsuGradualDifficulty::new(difficulty, self)
    }

    /// Check whether hitobjects appear too suspicious for further calculation.
    ///
    /// Sometimes a [`Beatmap`] isn't created for gameplay but rather to test
    /// the limits of osu! itself. Difficulty- and/or performance calculation
    /// should likely be avoided on these maps due to potential performance
    /// issues.
    pub fn check_suspicion(&self) -> Result<(), TooSuspicious> {
        match TooSuspicious::new(self) {
            None => Ok(()),
            Some(err) => Err(err),
        }
    }
}

impl Default for Beatmap {
    fn default() -> Self {
        Self {
            ar: 5.0,
            cs: 5.0,
            hp: 5.0,
            od: 5.0,
            hit_objects: Vec::default(),
        }
    }
}

impl From<Vec<HitObject>> for Beatmap {
    fn from(hit_objects: Vec<HitObject>) -> Self {
        Self::new(hit_objects)
    }
}
