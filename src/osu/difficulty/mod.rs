use std::cmp;

use crate::{
    model::{
        beatmap::Beatmap,
        mods::GameMods,
    },
    osu::{
        attributes::OsuDifficultyAttributes,
        convert::convert_objects,
        difficulty::{
            object::{ObjectTimings, OsuDifficultyObject},
            scaling_factor::ScalingFactor,
        },
        object::OsuObject,
        performance::PERFORMANCE_BASE_MULTIPLIER,
    },
    util::difficulty::{power_mean, softmin},
    Difficulty,
};

use self::skills::{
    aim::Aim, flashlight::Flashlight, reading_hidden::ReadingHidden, reading_high_ar::ReadingHighAr,
    reading_low_ar::ReadingLowAr, strain::difficulty_to_performance, OsuSkills,
};

pub mod evaluators;
pub mod gradual;
pub mod object;
pub mod reading;
pub mod scaling_factor;
pub mod skills;

/// Turns raw skill values into star ratings.
pub const DIFFICULTY_MULTIPLIER: f64 = 0.0668;

const HD_FADE_IN_DURATION_MULTIPLIER: f64 = 0.4;
const HD_FADE_OUT_DURATION_MULTIPLIER: f64 = 0.3;

pub fn difficulty(difficulty: &Difficulty, map: &Beatmap) -> OsuDifficultyAttributes {
    let DifficultyValues { skills, mut attrs } =
        DifficultyValues::calculate(difficulty, map, true);

    DifficultyValues::eval(&mut attrs, difficulty.get_mods(), &skills);

    attrs
}

pub struct OsuDifficultySetup {
    pub scaling_factor: ScalingFactor,
    pub attrs: OsuDifficultyAttributes,
    pub timings: ObjectTimings,
}

impl OsuDifficultySetup {
    pub fn new(difficulty: &Difficulty, map: &Beatmap) -> Self {
        let mods = difficulty.get_mods();
        let clock_rate = difficulty.get_clock_rate();

        let map_attrs = map.attributes(difficulty);

        let scaling_factor = ScalingFactor::new(map_attrs.cs);

        let attrs = OsuDifficultyAttributes {
            ar: map_attrs.ar,
            hp: map_attrs.hp,
            od: map_attrs.od,
            great_hit_window: map_attrs.great_hit_window,
            ..Default::default()
        };

        let time_preempt = map_attrs.preempt * clock_rate;

        // * Preempt time can go below 450ms. Normally, this is achieved via the DT mod
        // * which uniformly speeds up all animations game wide regardless of AR.
        // * This uniform speedup is hard to match 1:1, however we can at least make
        // * AR>10 (via mods) feel good by extending the upper linear function above.
        let time_fade_in = if mods.hd() {
            time_preempt * HD_FADE_IN_DURATION_MULTIPLIER
        } else {
            400.0 * (time_preempt / OsuObject::PREEMPT_MIN).min(1.0)
        };

        let timings = ObjectTimings {
            clock_rate,
            time_preempt,
            time_fade_in,
            great_hit_window: 2.0 * map_attrs.great_hit_window * clock_rate,
            hidden: mods.hd(),
        };

        Self {
            scaling_factor,
            attrs,
            timings,
        }
    }
}

pub struct DifficultyValues {
    pub skills: OsuSkills,
    pub attrs: OsuDifficultyAttributes,
}

impl DifficultyValues {
    /// Process all passed objects.
    ///
    /// The slider factor is only evaluated if `slider_factor` is set.
    pub fn calculate(difficulty: &Difficulty, map: &Beatmap, slider_factor: bool) -> Self {
        let mods = difficulty.get_mods();
        let take = difficulty.get_passed_objects();

        let OsuDifficultySetup {
            scaling_factor,
            mut attrs,
            timings,
        } = OsuDifficultySetup::new(difficulty, map);

        let mut osu_objects = convert_objects(map, &scaling_factor, mods.hr(), take, &mut attrs);

        let diff_objects =
            Self::create_difficulty_objects(&mut osu_objects, &scaling_factor, &timings);

        let mut skills = OsuSkills::new(mods, false, slider_factor);

        // The first hit object has no difficulty object
        let take_diff_objects = cmp::min(map.hit_objects.len(), take).saturating_sub(1);

        for hit_object in diff_objects.iter().take(take_diff_objects) {
            skills.process(hit_object, &diff_objects);
        }

        Self { skills, attrs }
    }

    /// Process the difficulty values and store the results in `attrs`.
    ///
    /// Without the aim skill for sliderless aim, the slider factor is `1.0`.
    pub fn eval(attrs: &mut OsuDifficultyAttributes, mods: &GameMods, skills: &OsuSkills) {
        let aim = skills.aim.difficulty_value();

        let raw = RawDifficultyValues {
            aim,
            aim_no_sliders: skills
                .aim_no_sliders
                .as_ref()
                .map_or(aim, Aim::difficulty_value),
            speed: skills.speed.difficulty_value(),
            flashlight: skills.flashlight.difficulty_value(),
            reading_low_ar: skills.reading_low_ar.difficulty_value(),
            reading_high_ar: skills.reading_high_ar.difficulty_value(),
            hidden: skills
                .reading_hidden
                .as_ref()
                .map_or(0.0, ReadingHidden::difficulty_value),
        };

        let ratings = StarRatings::new(&raw, mods);

        attrs.aim = ratings.aim;
        attrs.speed = ratings.speed;
        attrs.flashlight = ratings.flashlight;
        attrs.reading_low_ar = ratings.reading_low_ar;
        attrs.reading_high_ar = ratings.reading_high_ar;
        attrs.hidden = ratings.hidden;
        attrs.slider_factor = ratings.slider_factor;
        attrs.stars = ratings.stars;

        attrs.speed_note_count = skills.speed.relevant_note_count();
        attrs.aim_difficult_strain_count = skills.aim.difficult_strain_count(raw.aim);
        attrs.speed_difficult_strain_count = skills.speed.difficult_strain_count(raw.speed);
        attrs.low_ar_difficult_strain_count = skills
            .reading_low_ar
            .difficult_strain_count(raw.reading_low_ar);
        attrs.hidden_difficult_strain_count = skills
            .reading_hidden
            .as_ref()
            .map_or(0.0, |skill| skill.difficult_strain_count(raw.hidden));
    }

    /// Annotate all hit objects; the first one has no difficulty object.
    ///
    /// Slider cursor positions are computed in place beforehand.
    pub fn create_difficulty_objects(
        osu_objects: &mut [OsuObject],
        scaling_factor: &ScalingFactor,
        timings: &ObjectTimings,
    ) -> Vec<OsuDifficultyObject> {
        for h in osu_objects.iter_mut() {
            OsuDifficultyObject::compute_slider_cursor_pos(h, scaling_factor.radius);
        }

        let mut diff_objects = Vec::with_capacity(osu_objects.len().saturating_sub(1));

        for (i, window) in osu_objects.windows(2).enumerate() {
            let [last, h] = window else { continue };
            let last_last = i.checked_sub(1).and_then(|idx| osu_objects.get(idx));

            let diff_object = OsuDifficultyObject::new(
                h,
                last,
                last_last,
                &diff_objects,
                scaling_factor,
                timings,
            );

            diff_objects.push(diff_object);
        }

        diff_objects
    }
}

/// Aggregated skill values before any conversion.
#[derive(Clone, Debug, Default)]
pub struct RawDifficultyValues {
    pub aim: f64,
    pub aim_no_sliders: f64,
    pub speed: f64,
    pub flashlight: f64,
    pub reading_low_ar: f64,
    pub reading_high_ar: f64,
    pub hidden: f64,
}

impl RawDifficultyValues {
    /// Whether no skill recorded any strain, e.g. for maps with a single
    /// object.
    pub fn is_zero(&self) -> bool {
        [
            self.aim,
            self.aim_no_sliders,
            self.speed,
            self.flashlight,
            self.reading_low_ar,
            self.reading_high_ar,
            self.hidden,
        ]
        .iter()
        .all(|&value| value <= 0.0)
    }
}

/// Mod adjusted star ratings of every skill and their combination.
///
/// The total star rating is derived from a base performance value. Aim and
/// speed are combined into a mechanical value and all reading skills into a
/// cognition value. The latter is capped through
/// [`adjust_cognition_performance`] before both are added up.
#[derive(Clone, Debug, Default)]
pub struct StarRatings {
    pub aim: f64,
    pub speed: f64,
    pub flashlight: f64,
    pub reading_low_ar: f64,
    pub reading_high_ar: f64,
    pub hidden: f64,
    pub slider_factor: f64,
    pub stars: f64,
}

impl StarRatings {
    /// Convert raw skill values into ratings for the given mods.
    ///
    /// Touch device and relax scale the ratings. Hidden and flashlight only
    /// contribute to the total if their mod is enabled, although the
    /// flashlight value always takes part in the cognition cap.
    pub fn new(raw: &RawDifficultyValues, mods: &GameMods) -> Self {
        // Base performances are never zero so the star rating would be too
        if raw.is_zero() {
            return Self {
                slider_factor: 1.0,
                ..Self::default()
            };
        }

        let rating = |value: f64| value.sqrt() * DIFFICULTY_MULTIPLIER;

        let mut aim = rating(raw.aim);
        let aim_no_sliders = rating(raw.aim_no_sliders);
        let mut speed = rating(raw.speed);
        let mut flashlight = rating(raw.flashlight);
        let mut reading_low_ar = rating(raw.reading_low_ar);
        let mut reading_high_ar = rating(raw.reading_high_ar);
        let mut hidden = rating(raw.hidden);

        let slider_factor = if aim > 1e-5 {
            aim_no_sliders / aim
        } else {
            1.0
        };

        if mods.td() {
            aim = aim.powf(0.8);
            flashlight = flashlight.powf(0.8);
            reading_low_ar = reading_low_ar.powf(0.8);
            reading_high_ar = reading_high_ar.powf(0.9);
            hidden = hidden.powf(0.8);
        }

        if mods.rx() {
            aim *= 0.9;
            speed = 0.0;
            flashlight *= 0.7;
            reading_low_ar *= 0.95;
            reading_high_ar *= 0.7;
            hidden *= 0.7;
        }

        let base_aim_performance = difficulty_to_performance(aim);
        let base_speed_performance = difficulty_to_performance(speed);

        let base_low_ar_performance = ReadingLowAr::difficulty_to_performance(reading_low_ar);
        let base_high_ar_performance = ReadingHighAr::difficulty_to_performance(reading_high_ar);

        let potential_flashlight_performance = Flashlight::difficulty_to_performance(flashlight);

        let base_flashlight_performance = if mods.fl() {
            potential_flashlight_performance
        } else {
            0.0
        };

        let base_hidden_performance = if mods.hd() {
            ReadingHidden::difficulty_to_performance(hidden)
        } else {
            0.0
        };

        let base_mechanical_performance =
            power_mean(base_aim_performance, base_speed_performance, 1.1);

        let base_cognition_performance = cognition_performance(
            base_low_ar_performance,
            base_high_ar_performance,
            base_flashlight_performance,
            base_hidden_performance,
        );

        let base_cognition_performance = adjust_cognition_performance(
            base_cognition_performance,
            base_mechanical_performance,
            potential_flashlight_performance,
        );

        let base_performance = base_mechanical_performance + base_cognition_performance;

        let stars = if base_performance > 1e-5 {
            PERFORMANCE_BASE_MULTIPLIER.cbrt()
                * 0.027
                * ((100_000.0 / 2.0_f64.powf(1.0 / 1.1) * base_performance).cbrt() + 4.0)
        } else {
            0.0
        };

        Self {
            aim,
            speed,
            flashlight,
            reading_low_ar,
            reading_high_ar,
            hidden,
            slider_factor,
            stars,
        }
    }
}

/// Combine all reading values into a single cognition value.
///
/// Both approach rate values are merged through a power mean with exponent
/// `1.1`, the result with flashlight through one with exponent `1.5`.
/// Hidden is added on top.
pub fn cognition_performance(low_ar: f64, high_ar: f64, flashlight: f64, hidden: f64) -> f64 {
    let ar_performance = power_mean(low_ar, high_ar, 1.1);
    let flashlight_ar_performance = power_mean(ar_performance, flashlight, 1.5);

    flashlight_ar_performance + hidden
}

/// Smoothly cap the cognition value relative to the mechanical value.
///
/// The cap is the mechanical value plus the flashlight value plus `25`.
/// Less than 25pp aren't considered worth memorizing. The ratio of cognition
/// to cap is passed through [`softmin`] with `10` and base `5` so the result
/// approaches the cap but never exceeds it. Ratios above `50` return the cap
/// directly.
pub fn adjust_cognition_performance(
    cognition_performance: f64,
    mechanical_performance: f64,
    flashlight_performance: f64,
) -> f64 {
    let cap_performance = mechanical_performance + flashlight_performance + 25.0;

    let ratio = cognition_performance / cap_performance;

    if ratio > 50.0 {
        return cap_performance;
    }

    softmin(ratio * 10.0, 10.0, 5.0) / 10.0 * cap_performance
}

#[cfg(test)]
mod tests {
    use crate::util::float_ext::FloatExt;

    use super::*;

    #[test]
    fn no_raw_values_no_stars() {
        let ratings = StarRatings::new(&RawDifficultyValues::default(), &GameMods::default());

        assert!(ratings.stars.eq(0.0));
        assert!(ratings.slider_factor.eq(1.0));
    }

    #[test]
    fn single_object_short_circuits() {
        let mods = GameMods::from(8 + 1024);
        let ratings = StarRatings::new(&RawDifficultyValues::default(), &mods);

        assert!(ratings.stars.eq(0.0));
        assert!(ratings.hidden.eq(0.0));

        let raw = RawDifficultyValues {
            speed: 1e-3,
            ..Default::default()
        };

        assert!(StarRatings::new(&raw, &mods).stars > 0.0);
    }

    #[test]
    fn relax_removes_speed() {
        let raw = RawDifficultyValues {
            aim: 1000.0,
            aim_no_sliders: 900.0,
            speed: 1000.0,
            ..Default::default()
        };

        let nomod = StarRatings::new(&raw, &GameMods::default());
        let relax = StarRatings::new(&raw, &GameMods::from(128));

        assert!(relax.speed.eq(0.0));
        assert!(relax.aim.almost_eq(nomod.aim * 0.9, 1e-12));
        assert!(relax.stars < nomod.stars);
        assert!(nomod.slider_factor.almost_eq(0.9_f64.sqrt(), 1e-12));
    }

    #[test]
    fn cognition_is_capped() {
        let capped = adjust_cognition_performance(1e6, 100.0, 0.0);
        assert!(capped.eq(125.0));

        let small = adjust_cognition_performance(10.0, 100.0, 0.0);
        assert!(small > 0.0 && small < 10.0, "{small}");

        let large = adjust_cognition_performance(500.0, 100.0, 0.0);
        assert!(large > small && large <= 125.0, "{large}");
    }

    #[test]
    fn flashlight_raises_cognition_cap() {
        let without = adjust_cognition_performance(1e6, 100.0, 0.0);
        let with = adjust_cognition_performance(1e6, 100.0, 50.0);

        assert!(with.eq(175.0), "{with}");
        assert!(with > without);
    }

    #[test]
    fn hidden_adds_to_cognition() {
        let base = cognition_performance(30.0, 40.0, 0.0, 0.0);
        let hidden = cognition_performance(30.0, 40.0, 0.0, 12.0);

        assert!((hidden - base).almost_eq(12.0, 1e-9));
        assert!(base > 40.0, "{base}");
    }
}
