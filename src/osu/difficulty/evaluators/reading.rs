use crate::{
    osu::{difficulty::object::OsuDifficultyObject, object::OsuObjectKind},
    util::difficulty::{rhythm_difference, sigmoid},
};

/// Evaluators for the perception of a pattern: density of visible objects,
/// overlaps, approach rate and predictability.
pub struct ReadingEvaluator;

impl ReadingEvaluator {
    /// Power with which mechanical difficulty is turned into performance.
    pub const MECHANICAL_PP_POWER: f64 = 0.6;

    const READING_WINDOW_SIZE: f64 = 3000.0;
    const OVERLAP_MULTIPLIER: f64 = 1.0;

    pub fn evaluate_low_ar_diff_of(
        curr: &OsuDifficultyObject,
        diff_objects: &[OsuDifficultyObject],
    ) -> f64 {
        if curr.base.is_spinner() || curr.idx == 0 {
            return 0.0;
        }

        let density = Self::evaluate_density_of(curr, diff_objects, true, true, 1.0).max(1.0);
        let difficulty = (4.0 * density.ln()).powf(2.5);

        let overlap_bonus = Self::evaluate_overlap_diff_of(curr, diff_objects) * difficulty;

        difficulty + overlap_bonus
    }

    pub fn evaluate_hidden_diff_of(
        curr: &OsuDifficultyObject,
        diff_objects: &[OsuDifficultyObject],
    ) -> f64 {
        if curr.base.is_spinner() || curr.idx == 0 {
            return 0.0;
        }

        let density = Self::evaluate_density_of(curr, diff_objects, false, false, 1.0);
        let preempt = curr.preempt / 1000.0;

        let density_factor = (density.max(0.0) / 6.2).powf(1.5);

        // AR11+DT and faster gets nothing unless the density is high. Otherwise
        // accelerating growth until around AR0 and then linear, three times as
        // fast starting from AR5.
        let invisibility_factor = if preempt < 0.2 {
            0.0
        } else {
            (preempt * 2.4 - 0.2)
                .powf(5.0)
                .min(preempt.max(preempt * 3.0 - 2.4))
        };

        let difficulty = invisibility_factor + density_factor;

        // At most 1.1x
        difficulty * (0.96 + 0.1 * Self::evaluate_unpredictability_of(curr, diff_objects))
    }

    pub fn evaluate_high_ar_diff_of(
        curr: &OsuDifficultyObject,
        diff_objects: &[OsuDifficultyObject],
        apply_adjust: bool,
    ) -> f64 {
        let mut result = Self::high_ar_scaling(curr.preempt);

        if apply_adjust {
            let mut unpredictability = Self::evaluate_unpredictability_of(curr, diff_objects);

            // Nerf objects that aren't new combos
            unpredictability *= 1.0
                + 0.1 * (OsuDifficultyObject::FOLLOW_LINE_DURATION - curr.follow_line_time)
                    / OsuDifficultyObject::FOLLOW_LINE_DURATION;

            result *= 0.98 + 0.6 * unpredictability;
        }

        result
    }

    /// Bonus curve for high approach rates based on the clock-rate-adjusted
    /// preempt in milliseconds.
    pub fn high_ar_scaling(preempt: f64) -> f64 {
        let preempt = preempt / 1000.0;

        let value = if preempt < 0.375 {
            // Continuous at AR10.5 with the exponential part
            0.63 * (8.0 - 20.0 * preempt).powf(2.0 / 3.0)
        } else {
            (9.07583 - 80.0 * preempt / 3.0).exp()
        };

        value.powf(Self::MECHANICAL_PP_POWER.recip())
    }

    pub fn evaluate_density_of(
        curr: &OsuDifficultyObject,
        diff_objects: &[OsuDifficultyObject],
        apply_distance_nerf: bool,
        apply_slider_body_density: bool,
        angle_nerf_multiplier: f64,
    ) -> f64 {
        let mut density = 0.0;
        let mut density_angles_nerf = -2.0;

        let mut prev_obj = curr;

        let reading_objects = &curr.reading_objects;

        for (i, reading_obj) in reading_objects.iter().enumerate() {
            let Some(loop_obj) = diff_objects.get(reading_obj.idx) else {
                continue;
            };

            // The first object of the map is always easy to read
            if loop_obj.idx < 1 {
                continue;
            }

            let mut loop_difficulty = curr.opacity_at(loop_obj.start_time);

            if apply_distance_nerf {
                loop_difficulty *= (sigmoid((loop_obj.min_jump_dist - 80.0) / 10.0) + 0.2) / 1.2;
            }

            if apply_slider_body_density {
                if let OsuObjectKind::Slider(ref slider) = curr.base.kind {
                    let body_len = (slider.path_length / curr.radius)
                        .max(1.0)
                        .min(1.0 + f64::from(slider.lazy_travel_dist) / 8.0);

                    let body_buff = body_len.log10();

                    let mut max_buff = 0.5;

                    if i > 0 {
                        max_buff += 1.0;
                    }

                    if i + 1 < reading_objects.len() {
                        max_buff += 1.0;
                    }

                    loop_difficulty *= 1.0 + 1.5 * body_buff.min(max_buff);
                }
            }

            loop_difficulty *= Self::time_nerf_factor(curr.start_time - loop_obj.start_time);

            if loop_obj.strain_time > prev_obj.strain_time {
                loop_difficulty *= Self::rhythm_similarity(loop_obj, prev_obj);
            }

            density += loop_difficulty;

            let angle_nerf = loop_obj.angle_predictability / 2.0 + 0.5;
            density_angles_nerf += angle_nerf * loop_difficulty * angle_nerf_multiplier;

            prev_obj = loop_obj;
        }

        density - density_angles_nerf.max(0.0)
    }

    pub fn evaluate_overlap_diff_of(
        curr: &OsuDifficultyObject,
        diff_objects: &[OsuDifficultyObject],
    ) -> f64 {
        const DECAY_WEIGHT: f64 = 0.5;
        const THRESHOLD: f64 = 0.6;

        let target_start_time = curr.start_time - curr.preempt;

        let mut overlap_difficulties: Vec<(usize, f64)> = curr
            .reading_objects
            .iter()
            .filter_map(|reading_obj| {
                let loop_obj = diff_objects.get(reading_obj.idx)?;

                // Reading objects are ordered most recent first so the last
                // one that appeared no earlier than the target is the
                // partition point minus one
                let visible = loop_obj.reading_objects.partition_point(|h| {
                    diff_objects
                        .get(h.idx)
                        .is_some_and(|h| h.start_time >= target_start_time)
                });

                let overlapness = loop_obj.reading_objects[..visible].last()?.overlapness;

                (overlapness > 0.0).then_some((loop_obj.idx, overlapness))
            })
            .collect();

        if overlap_difficulties.is_empty() {
            return 0.0;
        }

        overlap_difficulties.sort_unstable_by(|(_, a), (_, b)| b.total_cmp(a));

        // Nerf easier objects that are in the same place as harder ones
        for i in 0..overlap_difficulties.len() {
            let (harder_idx, _) = overlap_difficulties[i];

            for (easier_idx, easier_overlapness) in &mut overlap_difficulties[i + 1..] {
                let (later, earlier) = if harder_idx > *easier_idx {
                    (harder_idx, *easier_idx)
                } else {
                    (*easier_idx, harder_idx)
                };

                let overlap_value = diff_objects
                    .get(later)
                    .and_then(|h| h.overlap_values.get(&earlier))
                    .copied()
                    .unwrap_or(0.0);

                *easier_overlapness *= (1.0 - overlap_value).powf(2.0);
            }
        }

        let mut weight = 1.0;
        let mut difficulty = 0.0;

        for (_, overlapness) in overlap_difficulties {
            if overlapness > THRESHOLD {
                difficulty += (overlapness - THRESHOLD) * weight;
                weight *= DECAY_WEIGHT;
            }
        }

        Self::OVERLAP_MULTIPLIER * difficulty.max(0.0)
    }

    pub fn evaluate_aiming_density_factor_of(
        curr: &OsuDifficultyObject,
        diff_objects: &[OsuDifficultyObject],
    ) -> f64 {
        let difficulty = Self::evaluate_density_of(curr, diff_objects, true, false, 0.5);

        (difficulty.max(0.0).powf(1.37) - 1.0).max(0.0)
    }

    pub fn evaluate_unpredictability_of(
        curr: &OsuDifficultyObject,
        diff_objects: &[OsuDifficultyObject],
    ) -> f64 {
        const VELOCITY_CHANGE_PART: f64 = 0.8;
        const ANGLE_CHANGE_PART: f64 = 0.1;
        const RHYTHM_CHANGE_PART: f64 = 0.1;

        if curr.base.is_spinner() || curr.idx == 0 {
            return 0.0;
        }

        let Some(last) = curr
            .previous(0, diff_objects)
            .filter(|last| !last.base.is_spinner())
        else {
            return 0.0;
        };

        let rhythm_similarity = Self::rhythm_similarity(curr, last);

        let velocity_change_bonus = Self::velocity_change_factor(curr, last) * rhythm_similarity;

        let curr_vel = curr.lazy_jump_dist / curr.strain_time;
        let prev_vel = last.lazy_jump_dist / last.strain_time;

        let mut angle_change_bonus = 0.0;

        if curr.angle.is_some() && last.angle.is_some() && curr_vel > 0.0 && prev_vel > 0.0 {
            // Scaled by the velocity ratio to prevent cheesing
            angle_change_bonus =
                (1.0 - curr.angle_predictability) * curr_vel.min(prev_vel) / curr_vel.max(prev_vel);
        }

        angle_change_bonus *= rhythm_similarity;

        let mut rhythm_change_bonus = 0.0;

        if let Some(last_last) = curr.previous(1, diff_objects) {
            let curr_delta = Self::delta_without_slider(curr, last);
            let last_delta = Self::delta_without_slider(last, last_last);

            rhythm_change_bonus = rhythm_difference(curr_delta, last_delta);
        }

        VELOCITY_CHANGE_PART * velocity_change_bonus
            + ANGLE_CHANGE_PART * angle_change_bonus
            + RHYTHM_CHANGE_PART * rhythm_change_bonus
    }

    fn velocity_change_factor(curr: &OsuDifficultyObject, last: &OsuDifficultyObject) -> f64 {
        let curr_vel = curr.lazy_jump_dist / curr.strain_time;
        let prev_vel = last.lazy_jump_dist / last.strain_time;

        if curr_vel <= 0.0 && prev_vel <= 0.0 {
            return 0.0;
        }

        let min_vel = curr_vel.min(prev_vel);
        let max_vel = curr_vel.max(prev_vel);

        let velocity_change = ((prev_vel - curr_vel).abs() - 0.5 * min_vel)
            .min((curr.radius / curr.strain_time.max(last.strain_time)).max(min_vel))
            .max(0.0);

        // At most 0.4
        velocity_change / max_vel / 0.4
    }

    /// Strain time of `curr` without the duration of the previous slider.
    fn delta_without_slider(curr: &OsuDifficultyObject, last: &OsuDifficultyObject) -> f64 {
        if last.base.is_slider() {
            (curr.strain_time - (last.end_time - last.start_time)).max(0.0)
        } else {
            curr.strain_time
        }
    }

    /// `0` for rhythms at least 2x apart, `1` for rhythms at most 4/3x apart.
    fn rhythm_similarity(a: &OsuDifficultyObject, b: &OsuDifficultyObject) -> f64 {
        let similarity = 1.0 - rhythm_difference(a.strain_time, b.strain_time);

        4.0 * (similarity.clamp(0.5, 0.75) - 0.5)
    }

    fn time_nerf_factor(delta_time: f64) -> f64 {
        (2.0 - delta_time / (Self::READING_WINDOW_SIZE / 2.0)).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use crate::util::float_ext::FloatExt;

    use super::*;

    #[test]
    fn high_ar_scaling_is_continuous() {
        let below = ReadingEvaluator::high_ar_scaling(374.999_99);
        let above = ReadingEvaluator::high_ar_scaling(375.0);

        assert!(below.almost_eq(above, 1e-3), "{below} vs {above}");
    }

    #[test]
    fn high_ar_scaling_decreases_with_preempt() {
        let ar11 = ReadingEvaluator::high_ar_scaling(300.0);
        let ar10 = ReadingEvaluator::high_ar_scaling(450.0);
        let ar9 = ReadingEvaluator::high_ar_scaling(600.0);

        assert!(ar11 > ar10);
        assert!(ar10 > ar9);
        assert!(ar9 > 0.0);
    }

    #[test]
    fn time_nerf_window() {
        assert!(ReadingEvaluator::time_nerf_factor(0.0).eq(1.0));
        assert!(ReadingEvaluator::time_nerf_factor(1500.0).eq(1.0));
        assert!(ReadingEvaluator::time_nerf_factor(2250.0).eq(0.5));
        assert!(ReadingEvaluator::time_nerf_factor(3000.0).eq(0.0));
    }

    mod random_maps {
        use proptest::prelude::*;

        use crate::{
            model::hit_object::{HitObject, Pos, Slider, SliderPath},
            osu::{
                convert::convert_objects,
                difficulty::{
                    evaluators::ReadingEvaluator, object::OsuDifficultyObject, DifficultyValues,
                    OsuDifficultySetup,
                },
            },
            Beatmap, Difficulty,
        };

        fn diff_objects(map: &Beatmap, difficulty: &Difficulty) -> Vec<OsuDifficultyObject> {
            let OsuDifficultySetup {
                scaling_factor,
                mut attrs,
                timings,
            } = OsuDifficultySetup::new(difficulty, map);

            let mut osu_objects = convert_objects(
                map,
                &scaling_factor,
                difficulty.get_mods().hr(),
                map.hit_objects.len(),
                &mut attrs,
            );

            DifficultyValues::create_difficulty_objects(&mut osu_objects, &scaling_factor, &timings)
        }

        fn arb_map() -> impl Strategy<Value = Beatmap> {
            let object = (0.0_f32..512.0, 0.0_f32..384.0, 20.0..400.0, any::<bool>());

            (prop::collection::vec(object, 2..40), 0.0_f32..11.0, 2.0_f32..7.0).prop_map(
                |(objects, ar, cs)| {
                    let mut time = 1000.0;
                    let mut hit_objects = Vec::with_capacity(objects.len());

                    for (x, y, gap, is_slider) in objects {
                        let pos = Pos::new(x, y);

                        if is_slider {
                            let path = SliderPath::linear(Pos::new(60.0, -30.0));
                            hit_objects.push(HitObject::slider(pos, time, Slider::new(path, 180.0, 0, 45.0)));
                            time += 180.0;
                        } else {
                            hit_objects.push(HitObject::circle(pos, time));
                        }

                        time += gap;
                    }

                    Beatmap {
                        ar,
                        cs,
                        ..Beatmap::new(hit_objects)
                    }
                },
            )
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(48))]

            #[test]
            fn reading_values_are_finite_and_non_negative(
                map in arb_map(),
                mods in prop::sample::select(vec![0_u32, 8, 16, 64, 72]),
            ) {
                let difficulty = Difficulty::new().mods(mods);
                let diff_objects = diff_objects(&map, &difficulty);

                for curr in diff_objects.iter() {
                    let values = [
                        ReadingEvaluator::evaluate_density_of(curr, &diff_objects, true, true, 1.0),
                        ReadingEvaluator::evaluate_density_of(curr, &diff_objects, false, false, 0.5),
                        ReadingEvaluator::evaluate_overlap_diff_of(curr, &diff_objects),
                        ReadingEvaluator::evaluate_unpredictability_of(curr, &diff_objects),
                    ];

                    for value in values {
                        prop_assert!(value.is_finite() && value >= 0.0, "{values:?} at {}", curr.idx);
                    }
                }
            }
        }
    }
}
