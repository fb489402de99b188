use std::{error, fmt};

use rosu_map::util::Pos;

use crate::model::hit_object::{HitObject, HitObjectKind};

use super::Beatmap;

/// Resulting error type of [`Beatmap::check_suspicion`].
///
/// [`Beatmap::check_suspicion`]: crate::model::beatmap::Beatmap::check_suspicion
/// [`Beatmap`]: crate::model::beatmap::Beatmap
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum TooSuspicious {
    /// Notes are too dense time-wise.
    Density,
    /// The map seems too long.
    Length,
    /// Too many objects.
    ObjectCount,
    /// General red flag.
    RedFlag,
    /// Too many sliders' positions were suspicious.
    SliderPositions,
    /// Too many sliders had a very high amount of repeats.
    SliderRepeats,
}

impl TooSuspicious {
    const OBJECT_THRESHOLD: usize = 500_000;
    /// 100 notes per 1s = 6000BPM
    const DENSITY_THRESHOLD_1S: usize = 100;
    /// 250 notes per 10s = 1500BPM
    const DENSITY_THRESHOLD_10S: usize = 250;
    /// The playfield is `512x384`
    const POS_THRESHOLD: f32 = 10_000.0;
    const REPEATS_THRESHOLD: usize = 1000;
    const SLIDER_COUNT_THRESHOLD: usize = 256;

    pub(crate) fn new(map: &Beatmap) -> Option<Self> {
        fn too_long(hit_objects: &[HitObject]) -> bool {
            const DAY_MS: f64 = (60 * 60 * 24 * 1000) as f64;

            match hit_objects {
                [first, .., last] => last.start_time - first.start_time > DAY_MS,
                _ => false,
            }
        }

        fn too_dense(i: usize, curr: &HitObject, hit_objects: &[HitObject]) -> bool {
            let within = |offset: usize, ms: f64| {
                hit_objects
                    .get(i + offset)
                    .is_some_and(|h| h.start_time - curr.start_time < ms)
            };

            within(TooSuspicious::DENSITY_THRESHOLD_1S, 1000.0)
                || within(TooSuspicious::DENSITY_THRESHOLD_10S, 10_000.0)
        }

        fn check_pos(pos: Pos) -> bool {
            pos.x.abs() > TooSuspicious::POS_THRESHOLD || pos.y.abs() > TooSuspicious::POS_THRESHOLD
        }

        if map.hit_objects.len() > Self::OBJECT_THRESHOLD {
            return Some(Self::ObjectCount);
        } else if too_long(&map.hit_objects) {
            return Some(Self::Length);
        }

        let mut pos_beyond_threshold = 0;
        let mut repeats_beyond_threshold = 0;

        for (i, h) in map.hit_objects.iter().enumerate() {
            if too_dense(i, h, &map.hit_objects) {
                return Some(Self::Density);
            }

            if let HitObjectKind::Slider(ref slider) = h.kind {
                if slider.repeats > Self::REPEATS_THRESHOLD {
                    if check_pos(h.pos) {
                        return Some(Self::RedFlag);
                    }

                    repeats_beyond_threshold += 1;
                } else if check_pos(h.pos) {
                    pos_beyond_threshold += 1;
                }
            }
        }

        if pos_beyond_threshold > Self::SLIDER_COUNT_THRESHOLD {
            Some(Self::SliderPositions)
        } else if repeats_beyond_threshold > Self::SLIDER_COUNT_THRESHOLD {
            Some(Self::SliderRepeats)
        } else {
            None
        }
    }
}

impl error::Error for TooSuspicious {}

impl fmt::Display for TooSuspicious {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "the map seems too suspicious for further calculation (reason={self:?})",
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::model::hit_object::{Slider, SliderPath};

    use super::*;

    #[test]
    fn regular_map_passes() {
        let hit_objects = (0..500)
            .map(|i| HitObject::circle(Pos::new(256.0, 192.0), f64::from(i) * 200.0))
            .collect();

        assert_eq!(Beatmap::new(hit_objects).check_suspicion(), Ok(()));
    }

    #[test]
    fn dense_map() {
        let hit_objects = (0..200)
            .map(|i| HitObject::circle(Pos::new(256.0, 192.0), f64::from(i)))
            .collect();

        assert_eq!(
            Beatmap::new(hit_objects).check_suspicion(),
            Err(TooSuspicious::Density)
        );
    }

    #[test]
    fn long_map() {
        let hit_objects = vec![
            HitObject::circle(Pos::default(), 0.0),
            HitObject::circle(Pos::default(), 1e10),
        ];

        assert_eq!(
            Beatmap::new(hit_objects).check_suspicion(),
            Err(TooSuspicious::Length)
        );
    }

    #[test]
    fn red_flag_slider() {
        let slider = Slider::new(SliderPath::linear(Pos::new(10.0, 0.0)), 10.0, 5000, 10.0);
        let hit_objects = vec![HitObject::slider(Pos::new(50_000.0, 0.0), 0.0, slider)];

        assert_eq!(
            Beatmap::new(hit_objects).check_suspicion(),
            Err(TooSuspicious::RedFlag)
        );
    }

    #[test]
    fn displays_reason() {
        let msg = TooSuspicious::Length.to_string();

        assert!(msg.contains("Length"), "{msg}");
    }
}
