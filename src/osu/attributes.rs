use crate::osu::performance::OsuPerformance;

/// Difficulty of an osu!standard map, split into its skills.
///
/// Reading values are raw skill values just like `aim` and `speed`. Only
/// `stars` is scaled into a star rating.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OsuDifficultyAttributes {
    // Mechanical skills
    pub aim: f64,
    pub speed: f64,
    pub flashlight: f64,

    // Reading skills
    /// Many visible and overlapping objects at low approach rates.
    pub reading_low_ar: f64,
    /// Little time to react at high approach rates.
    pub reading_high_ar: f64,
    /// Objects that fade out before being hit. Zero without hidden.
    pub hidden: f64,

    /// Aim difficulty without sliders relative to aim with sliders.
    pub slider_factor: f64,
    /// Clickable objects weighted by their speed difficulty.
    pub speed_note_count: f64,

    // Weighted amounts of difficult strains, used for miss penalties
    pub aim_difficult_strain_count: f64,
    pub speed_difficult_strain_count: f64,
    pub low_ar_difficult_strain_count: f64,
    pub hidden_difficult_strain_count: f64,

    // Map settings after mods
    pub ar: f64,
    pub od: f64,
    pub hp: f64,
    /// Clock rate adjusted window of a 300 on one side of the object.
    pub great_hit_window: f64,

    pub n_circles: u32,
    pub n_sliders: u32,
    pub n_spinners: u32,
    pub max_combo: u32,

    pub stars: f64,
}

impl OsuDifficultyAttributes {
    /// Circles, sliders, and spinners combined.
    pub const fn n_objects(&self) -> u32 {
        self.n_circles + self.n_sliders + self.n_spinners
    }

    /// Continue with a performance calculation based on these attributes.
    pub fn performance<'a>(self) -> OsuPerformance<'a> {
        self.into()
    }
}

/// Performance points of a score on an osu!standard map.
///
/// `pp_reading` and `pp_flashlight` are the two shares of the cognition
/// value after it has been capped by the mechanical values.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OsuPerformanceAttributes {
    /// Attributes that the score was rated with.
    pub difficulty: OsuDifficultyAttributes,
    pub pp: f64,
    pub pp_acc: f64,
    pub pp_aim: f64,
    pub pp_speed: f64,
    pub pp_flashlight: f64,
    pub pp_reading: f64,
    /// Uncapped low AR reading value.
    pub pp_low_ar: f64,
    /// Uncapped high AR reading value.
    pub pp_high_ar: f64,
    /// Uncapped hidden reading value.
    pub pp_hidden: f64,
    /// Misses plus an estimate of slider breaks.
    pub effective_miss_count: f64,
}

impl OsuPerformanceAttributes {
    pub const fn stars(&self) -> f64 {
        self.difficulty.stars
    }

    pub const fn pp(&self) -> f64 {
        self.pp
    }

    /// Capped cognition value, i.e. reading and flashlight combined.
    pub fn pp_cognition(&self) -> f64 {
        self.pp_reading + self.pp_flashlight
    }

    pub const fn n_objects(&self) -> u32 {
        self.difficulty.n_objects()
    }

    /// Rate another score on the same map with the same attributes.
    pub fn performance<'a>(self) -> OsuPerformance<'a> {
        self.difficulty.into()
    }
}

impl From<OsuPerformanceAttributes> for OsuDifficultyAttributes {
    fn from(attributes: OsuPerformanceAttributes) -> Self {
        attributes.difficulty
    }
}
