use crate::model::mods::GameMods;

use self::{
    aim::Aim, flashlight::Flashlight, reading_hidden::ReadingHidden,
    reading_high_ar::ReadingHighAr, reading_low_ar::ReadingLowAr, speed::Speed,
};

use super::object::OsuDifficultyObject;

pub mod aim;
pub mod flashlight;
pub mod reading_hidden;
pub mod reading_high_ar;
pub mod reading_low_ar;
pub mod speed;
pub mod strain;

/// All skills of a calculation, processed in lockstep.
#[derive(Clone)]
pub struct OsuSkills {
    pub aim: Aim,
    /// Only needed for the slider factor.
    pub aim_no_sliders: Option<Aim>,
    pub speed: Speed,
    pub flashlight: Flashlight,
    pub reading_low_ar: ReadingLowAr,
    pub reading_high_ar: ReadingHighAr,
    /// Only present with the hidden mod.
    pub reading_hidden: Option<ReadingHidden>,
}

impl OsuSkills {
    /// If `step` is set, skills keep their difficulty up to date after every
    /// processed object.
    ///
    /// Aim without sliders is only processed if `slider_factor` is set.
    pub fn new(mods: &GameMods, step: bool, slider_factor: bool) -> Self {
        Self {
            aim: Aim::new(true, step),
            aim_no_sliders: slider_factor.then(|| Aim::new(false, step)),
            speed: Speed::new(step),
            flashlight: Flashlight::default(),
            reading_low_ar: ReadingLowAr::new(step),
            reading_high_ar: ReadingHighAr::default(),
            reading_hidden: mods.hd().then(|| ReadingHidden::new(step)),
        }
    }

    pub fn process(&mut self, curr: &OsuDifficultyObject, objects: &[OsuDifficultyObject]) {
        self.aim.process(curr, objects);

        if let Some(ref mut aim_no_sliders) = self.aim_no_sliders {
            aim_no_sliders.process(curr, objects);
        }

        self.speed.process(curr, objects);
        self.flashlight.process(curr, objects);
        self.reading_low_ar.process(curr, objects);
        self.reading_high_ar.process(curr, objects);

        if let Some(ref mut reading_hidden) = self.reading_hidden {
            reading_hidden.process(curr, objects);
        }
    }
}
