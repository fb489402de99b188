use rosu_map::util::Pos;

pub use self::{
    attributes::{OsuDifficultyAttributes, OsuPerformanceAttributes},
    difficulty::gradual::OsuGradualDifficulty,
    performance::OsuPerformance,
    score_state::OsuScoreState,
    strains::OsuStrains,
};

mod attributes;
mod convert;
pub(crate) mod difficulty;
mod object;
mod performance;
mod score_state;
pub(crate) mod strains;

/// The version of the difficulty and performance formulas.
///
/// Bumped whenever a formula changes in a way that affects results.
pub const VERSION: u32 = 20_241_018;

/// Short description of the formulas' [`VERSION`].
pub const VERSION_MESSAGE: &str = "2024-10-18: reading rework";

const PLAYFIELD_BASE_SIZE: Pos = Pos::new(512.0, 384.0);
