use crate::{Beatmap, Difficulty};

use super::difficulty::{skills::OsuSkills, DifficultyValues, RawDifficultyValues, StarRatings};

/// The result of calculating the strains on a osu! map.
///
/// Suitable to plot the difficulty of a map over time.
#[derive(Clone, Debug, PartialEq)]
pub struct OsuStrains {
    /// Strain peaks of the aim skill.
    pub aim: Vec<f64>,
    /// Strain peaks of the speed skill.
    pub speed: Vec<f64>,
    /// Strain peaks of the flashlight skill.
    pub flashlight: Vec<f64>,
    /// Strain peaks of the low AR reading skill.
    pub reading_low_ar: Vec<f64>,
    /// Strain peaks of the high AR reading skill.
    pub reading_high_ar: Vec<f64>,
    /// Strain peaks of the hidden skill.
    ///
    /// All zeros without the hidden mod.
    pub hidden: Vec<f64>,
    /// Star rating of every section based on its skill peaks.
    pub total: Vec<f64>,
}

impl OsuStrains {
    /// Time between two strains in ms.
    pub const SECTION_LEN: f64 = 400.0;

    /// Returns the number of strain peaks per skill.
    pub fn len(&self) -> usize {
        self.aim.len()
    }

    /// Whether no sections were recorded.
    pub fn is_empty(&self) -> bool {
        self.aim.is_empty()
    }
}

pub fn strains(difficulty: &Difficulty, map: &Beatmap) -> OsuStrains {
    let DifficultyValues {
        skills:
            OsuSkills {
                aim,
                aim_no_sliders: _,
                speed,
                flashlight,
                reading_low_ar,
                reading_high_ar,
                reading_hidden,
            },
        attrs: _,
    } = DifficultyValues::calculate(difficulty, map, false);

    let aim = aim.curr_strain_peaks();
    let speed = speed.curr_strain_peaks();
    let flashlight = flashlight.curr_strain_peaks();
    let reading_low_ar = reading_low_ar.curr_strain_peaks();
    let reading_high_ar = reading_high_ar.curr_strain_peaks();

    let hidden = reading_hidden.map_or_else(
        || vec![0.0; aim.len()],
        |reading_hidden| reading_hidden.curr_strain_peaks(),
    );

    let peak_at = |peaks: &[f64], i: usize| peaks.get(i).copied().unwrap_or(0.0);

    // Section peaks are treated as raw values. Sliderless aim is not
    // processed so the slider factor stays neutral.
    let total = (0..aim.len())
        .map(|i| {
            let raw = RawDifficultyValues {
                aim: aim[i],
                aim_no_sliders: aim[i],
                speed: peak_at(&speed, i),
                flashlight: peak_at(&flashlight, i),
                reading_low_ar: peak_at(&reading_low_ar, i),
                reading_high_ar: peak_at(&reading_high_ar, i),
                hidden: peak_at(&hidden, i),
            };

            StarRatings::new(&raw, difficulty.get_mods()).stars
        })
        .collect();

    OsuStrains {
        aim,
        speed,
        flashlight,
        reading_low_ar,
        reading_high_ar,
        hidden,
        total,
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        model::hit_object::{HitObject, Pos},
        util::float_ext::FloatExt,
    };

    use super::*;

    #[test]
    fn total_uses_star_conversion() {
        let hit_objects = (0..40)
            .map(|i| {
                let x = if i % 2 == 0 { 100.0 } else { 400.0 };

                HitObject::circle(Pos::new(x, 200.0), 1000.0 + f64::from(i) * 180.0)
            })
            .collect();

        let map = Beatmap::new(hit_objects);
        let difficulty = Difficulty::new().mods(8);
        let strains = strains(&difficulty, &map);

        assert!(!strains.is_empty());
        assert_eq!(strains.total.len(), strains.len());
        assert_eq!(strains.hidden.len(), strains.len());

        let i = strains.len() / 2;

        let raw = RawDifficultyValues {
            aim: strains.aim[i],
            aim_no_sliders: strains.aim[i],
            speed: strains.speed[i],
            flashlight: strains.flashlight[i],
            reading_low_ar: strains.reading_low_ar[i],
            reading_high_ar: strains.reading_high_ar[i],
            hidden: strains.hidden[i],
        };

        let expected = StarRatings::new(&raw, difficulty.get_mods()).stars;

        assert!(strains.total[i].almost_eq(expected, 1e-12));
    }
}
