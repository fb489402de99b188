use crate::{
    osu::{
        convert::convert_objects,
        object::{OsuObject, OsuObjectKind},
    },
    Beatmap, Difficulty,
};

use super::{
    object::OsuDifficultyObject, skills::OsuSkills, DifficultyValues, OsuDifficultyAttributes,
    OsuDifficultySetup,
};

/// Gradually calculate the difficulty attributes of an osu!standard map.
///
/// Note that this struct implements [`Iterator`].
/// On every call of [`Iterator::next`], the map's next hit object will
/// be processed and the [`OsuDifficultyAttributes`] will be updated and
/// returned.
///
/// Skills keep their difficulty up to date after every object so the
/// values may differ slightly from a full calculation with the same amount
/// of passed objects.
///
/// # Example
///
/// ```
/// use rosu_reading_pp::{Beatmap, Difficulty};
/// use rosu_reading_pp::osu::OsuGradualDifficulty;
///
/// let map = Beatmap::default();
///
/// let difficulty = Difficulty::new().mods(64); // DT
/// let mut iter = OsuGradualDifficulty::new(difficulty, &map);
///
/// // the difficulty of the map after the first hit object
/// let attrs1 = iter.next();
/// // ... after the second hit object
/// let attrs2 = iter.next();
///
/// // Remaining hit objects
/// for difficulty in iter {
///     // ...
/// }
/// ```
pub struct OsuGradualDifficulty {
    pub(crate) difficulty: Difficulty,
    attrs: OsuDifficultyAttributes,
    skills: OsuSkills,
    diff_objects: Box<[OsuDifficultyObject]>,
    n_objects: usize,
    remaining: usize,
}

impl OsuGradualDifficulty {
    /// Create a new difficulty attributes iterator for osu!standard maps.
    pub fn new(difficulty: Difficulty, map: &Beatmap) -> Self {
        let mods = difficulty.get_mods();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            mods = mods.bits(),
            n_objects = map.hit_objects.len(),
            hidden = mods.hd(),
            "Starting gradual difficulty calculation"
        );

        let OsuDifficultySetup {
            scaling_factor,
            mut attrs,
            timings,
        } = OsuDifficultySetup::new(&difficulty, map);

        let mut osu_objects = convert_objects(
            map,
            &scaling_factor,
            mods.hr(),
            map.hit_objects.len(),
            &mut attrs,
        );

        // Counts are accumulated while iterating
        let mut attrs = OsuDifficultyAttributes {
            n_circles: 0,
            n_sliders: 0,
            n_spinners: 0,
            max_combo: 0,
            ..attrs
        };

        // The first object has no difficulty object so it's counted upfront
        if let Some(first) = osu_objects.first() {
            count_object(first, &mut attrs);
        }

        let n_objects = osu_objects.len();

        let diff_objects =
            DifficultyValues::create_difficulty_objects(&mut osu_objects, &scaling_factor, &timings);

        // Reading skills are stepped just like the mechanical ones
        let skills = OsuSkills::new(mods, true, false);

        Self {
            difficulty,
            attrs,
            skills,
            diff_objects: diff_objects.into_boxed_slice(),
            n_objects,
            remaining: n_objects,
        }
    }

    /// Process the next hit object without evaluating the skills.
    fn process_next(&mut self) {
        let passed = self.n_objects - self.remaining;
        self.remaining -= 1;

        let Some(curr) = passed
            .checked_sub(1)
            .and_then(|idx| self.diff_objects.get(idx))
        else {
            return;
        };

        self.skills.process(curr, &self.diff_objects);
        count_object(&curr.base, &mut self.attrs);
    }

    /// Skip `skip` hit objects and evaluate after the one following them.
    fn advance(&mut self, skip: usize) -> Option<OsuDifficultyAttributes> {
        if skip >= self.remaining {
            self.remaining = 0;

            return None;
        }

        for _ in 0..=skip {
            self.process_next();
        }

        let mut attrs = self.attrs.clone();
        DifficultyValues::eval(&mut attrs, self.difficulty.get_mods(), &self.skills);

        Some(attrs)
    }
}

fn count_object(h: &OsuObject, attrs: &mut OsuDifficultyAttributes) {
    attrs.max_combo += 1;

    match h.kind {
        OsuObjectKind::Circle => attrs.n_circles += 1,
        OsuObjectKind::Slider(ref slider) => {
            attrs.n_sliders += 1;
            attrs.max_combo += slider.nested_objects.len() as u32;
        }
        OsuObjectKind::Spinner { .. } => attrs.n_spinners += 1,
    }
}

impl Iterator for OsuGradualDifficulty {
    type Item = OsuDifficultyAttributes;

    fn next(&mut self) -> Option<Self::Item> {
        self.advance(0)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }

    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        self.advance(n)
    }
}

impl ExactSizeIterator for OsuGradualDifficulty {
    fn len(&self) -> usize {
        self.remaining
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        model::hit_object::{HitObject, Pos},
        util::float_ext::FloatExt,
    };

    use super::*;

    fn stream(n: usize) -> Beatmap {
        let hit_objects = (0..n)
            .map(|i| {
                let pos = Pos::new(100.0 + (i % 4) as f32 * 60.0, 200.0);

                HitObject::circle(pos, 1000.0 + i as f64 * 120.0)
            })
            .collect();

        Beatmap {
            ar: 9.0,
            cs: 4.0,
            od: 8.0,
            ..Beatmap::new(hit_objects)
        }
    }

    #[test]
    fn empty() {
        let map = Beatmap::default();
        let mut gradual = OsuGradualDifficulty::new(Difficulty::new(), &map);
        assert_eq!(gradual.len(), 0);
        assert!(gradual.next().is_none());
    }

    #[test]
    fn yields_once_per_object() {
        let map = stream(20);
        let gradual = OsuGradualDifficulty::new(Difficulty::new(), &map);

        assert_eq!(gradual.len(), 20);
        assert_eq!(gradual.count(), 20);
    }

    #[test]
    fn skipping_matches_stepping() {
        let map = stream(30);
        let all: Vec<_> = OsuGradualDifficulty::new(Difficulty::new(), &map).collect();

        for step in 1..=3 {
            let mut skipping = OsuGradualDifficulty::new(Difficulty::new(), &map);
            let mut expected = all.iter().skip(step - 1).step_by(step);

            while let Some(attrs) = skipping.nth(step - 1) {
                assert_eq!(Some(&attrs), expected.next());
            }

            assert!(expected.next().is_none());
        }

        for (i, attrs) in all.iter().enumerate() {
            assert_eq!(attrs.max_combo, i as u32 + 1);
            assert_eq!(attrs.n_circles, i as u32 + 1);
        }
    }

    #[test]
    fn nth_past_the_end() {
        let map = stream(5);
        let mut gradual = OsuGradualDifficulty::new(Difficulty::new(), &map);

        assert!(gradual.nth(5).is_none());
        assert_eq!(gradual.len(), 0);
        assert!(gradual.next().is_none());
    }

    #[test]
    fn last_matches_full_calculation() {
        let map = stream(40);
        let difficulty = Difficulty::new();

        let last = OsuGradualDifficulty::new(difficulty.clone(), &map)
            .last()
            .unwrap();
        let full = difficulty.calculate(&map);

        assert_eq!(last.max_combo, full.max_combo);
        assert!(last.aim.almost_eq(full.aim, 1e-6), "{} vs {}", last.aim, full.aim);
        assert!(last.speed.almost_eq(full.speed, 1e-6));
    }
}
