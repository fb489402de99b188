use crate::model::beatmap::Beatmap;

use super::{
    attributes::OsuDifficultyAttributes,
    difficulty::scaling_factor::ScalingFactor,
    object::{OsuObject, OsuObjectKind},
};

/// Convert the map's hit objects, apply HardRock's reflection and stack
/// offsets, and count the first `take` objects into `attrs`.
pub fn convert_objects(
    map: &Beatmap,
    scaling_factor: &ScalingFactor,
    hr: bool,
    mut take: usize,
    attrs: &mut OsuDifficultyAttributes,
) -> Vec<OsuObject> {
    let mut osu_objects: Vec<_> = map
        .hit_objects
        .iter()
        .map(OsuObject::new)
        .inspect(|h| {
            if take == 0 {
                return;
            }

            take -= 1;
            attrs.max_combo += 1;

            match h.kind {
                OsuObjectKind::Circle => attrs.n_circles += 1,
                OsuObjectKind::Slider(ref slider) => {
                    attrs.n_sliders += 1;
                    attrs.max_combo += slider.nested_objects.len() as u32;
                }
                OsuObjectKind::Spinner { .. } => attrs.n_spinners += 1,
            }
        })
        .collect();

    if hr {
        osu_objects
            .iter_mut()
            .for_each(OsuObject::reflect_vertically);
    }

    for h in osu_objects.iter_mut() {
        h.stack_offset = scaling_factor.stack_offset(h.stack_height);

        if let OsuObjectKind::Slider(ref mut slider) = h.kind {
            slider.lazy_end_pos += h.stack_offset;
        }
    }

    osu_objects
}

#[cfg(test)]
mod tests {
    use rosu_map::util::Pos;

    use crate::model::hit_object::{HitObject, Slider, SliderPath};

    use super::*;

    fn map() -> Beatmap {
        let slider = Slider::new(SliderPath::linear(Pos::new(100.0, 0.0)), 500.0, 1, 50.0);

        Beatmap::new(vec![
            HitObject::circle(Pos::new(100.0, 100.0), 0.0).with_stack_height(1),
            HitObject::slider(Pos::new(200.0, 50.0), 500.0, slider),
            HitObject::spinner(Pos::new(256.0, 192.0), 2000.0, 1000.0),
        ])
    }

    #[test]
    fn counts_objects_and_combo() {
        let mut attrs = OsuDifficultyAttributes::default();
        let scaling_factor = ScalingFactor::new(5.0);
        let objects = convert_objects(&map(), &scaling_factor, false, usize::MAX, &mut attrs);

        assert_eq!(objects.len(), 3);
        assert_eq!((attrs.n_circles, attrs.n_sliders, attrs.n_spinners), (1, 1, 1));

        // head + (ticks, repeat, tail) of the slider
        let OsuObjectKind::Slider(ref slider) = objects[1].kind else {
            unreachable!()
        };

        assert_eq!(attrs.max_combo, 3 + slider.nested_objects.len() as u32);
    }

    #[test]
    fn only_counts_passed_objects() {
        let mut attrs = OsuDifficultyAttributes::default();
        let scaling_factor = ScalingFactor::new(5.0);
        let objects = convert_objects(&map(), &scaling_factor, false, 1, &mut attrs);

        assert_eq!(objects.len(), 3);
        assert_eq!(attrs.n_circles, 1);
        assert_eq!(attrs.n_sliders, 0);
        assert_eq!(attrs.max_combo, 1);
    }

    #[test]
    fn applies_stack_offset_and_reflection() {
        let mut attrs = OsuDifficultyAttributes::default();
        let scaling_factor = ScalingFactor::new(5.0);
        let objects = convert_objects(&map(), &scaling_factor, true, usize::MAX, &mut attrs);

        let circle = &objects[0];

        assert_eq!(circle.pos, Pos::new(100.0, 284.0));
        assert!(circle.stacked_pos().x < circle.pos.x);
        assert_eq!(objects[1].stack_offset, Pos::default());
    }
}
