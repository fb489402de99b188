//! Perception related annotations: how much earlier objects visually overlap
//! the current one and how predictable the current angle is.

use std::{
    f64::consts::{FRAC_PI_2, PI},
    ptr,
};

use crate::util::{float_ext::FloatExt, index_hasher::IndexMap};

use super::object::OsuDifficultyObject;

/// An earlier object that is still visible when the current one appears.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ReadingObject {
    /// Index of the earlier difficulty object.
    pub idx: usize,
    /// Overlapness accumulated up to and including this object.
    pub overlapness: f64,
}

const NORMALIZED_RADIUS: f64 = OsuDifficultyObject::NORMALIZED_RADIUS as f64;

/// Collect all earlier objects that are visible at the time `curr` appears,
/// most recent first, alongside the raw pairwise overlap with each of them.
pub fn reading_objects(
    curr: &OsuDifficultyObject,
    prev_objects: &[OsuDifficultyObject],
    radius: f64,
) -> (Vec<ReadingObject>, IndexMap<f64>) {
    let visible_objects = visible_objects(curr, prev_objects);

    let mut reading_objects = Vec::with_capacity(visible_objects.len());
    let mut overlap_values = IndexMap::default();

    let mut total_overlapness = 0.0;
    let mut curr_time = curr.delta_time;
    let mut historic_times = Vec::new();
    let mut historic_angles = Vec::new();

    let mut prev = curr;

    for loop_obj in visible_objects {
        let mut curr_overlapness = overlapness(curr, loop_obj, radius);

        if curr_overlapness > 0.0 {
            overlap_values.insert(loop_obj.idx, curr_overlapness);
        }

        // Reversed order so the angle belongs to the object after `loop_obj`
        let Some(angle) = prev.angle else {
            curr_time += prev.delta_time;

            continue;
        };

        let prev_overlap_values = if ptr::eq(prev, curr) {
            &overlap_values
        } else {
            &prev.overlap_values
        };

        // Overlap between the previous object and this one so streams get no buff
        let instant_overlapness = prev_overlap_values
            .get(&loop_obj.idx)
            .copied()
            .unwrap_or(0.0);

        // 2 for wide angles, 1 for acute angles
        let angle_factor = 1.0 + (1.0 - angle.cos()) / 2.0;
        let instant_overlapness = ((0.5 + instant_overlapness) * angle_factor).min(1.0);

        curr_overlapness *= (1.0 - instant_overlapness) * 2.0;

        if curr_overlapness > 0.0 {
            curr_overlapness *= opacity_multiplier(curr, loop_obj);

            let mut curr_min_overlapness = curr_overlapness;
            let mut cumulative_time_with_curr = curr_time;

            let angle_nerf = |historic_angle: f64| {
                1.0 - angle_similarity(angle, historic_angle)
                    * (1.0 - time_difference(loop_obj.strain_time, prev.strain_time))
            };

            for i in (0..historic_times.len()).rev() {
                let mut cumulative_time_without_curr = 0.0;

                for j in (0..=i).rev() {
                    cumulative_time_without_curr += historic_times[j];
                    let nerf = angle_nerf(historic_angles[j]);

                    let potential = curr_overlapness
                        * time_difference(cumulative_time_with_curr, cumulative_time_without_curr)
                        * nerf;
                    curr_min_overlapness = curr_min_overlapness.min(potential);

                    let potential = curr_overlapness
                        * time_difference(curr_time, cumulative_time_without_curr)
                        * nerf;
                    curr_min_overlapness = curr_min_overlapness.min(potential);

                    // No better match from here on
                    if cumulative_time_without_curr >= cumulative_time_with_curr {
                        break;
                    }
                }

                cumulative_time_with_curr += historic_times[i];
            }

            curr_overlapness = curr_min_overlapness;

            historic_times.push(curr_time);
            historic_angles.push(angle);

            curr_time = prev.delta_time;
        } else {
            curr_time += prev.delta_time;
        }

        total_overlapness += curr_overlapness;

        reading_objects.push(ReadingObject {
            idx: loop_obj.idx,
            overlapness: total_overlapness,
        });

        prev = loop_obj;
    }

    (reading_objects, overlap_values)
}

/// Earlier objects whose start time lies within `curr`'s preempt, most
/// recent first.
fn visible_objects<'a>(
    curr: &OsuDifficultyObject,
    prev_objects: &'a [OsuDifficultyObject],
) -> Vec<&'a OsuDifficultyObject> {
    let min_start_time = curr.start_time - curr.preempt;

    (0..=curr.idx)
        .map_while(|i| curr.previous(i, prev_objects))
        .take_while(|h| h.start_time >= min_start_time)
        .collect()
}

/// Fraction of the circle area shared by both objects plus a bonus for
/// (almost) perfect stacks.
fn overlapness(a: &OsuDifficultyObject, b: &OsuDifficultyObject, radius: f64) -> f64 {
    const AREA_COEF: f64 = 0.85;
    const STACK_DISTANCE_RATIO: f64 = 0.141_421_356_237_3;

    let dist = f64::from((a.base.stacked_pos() - b.base.stacked_pos()).length());

    if dist > radius * 2.0 {
        return 0.0;
    }

    let dist_sqr = dist * dist;
    let radius_sqr = radius * radius;

    let sector_area = (dist / (2.0 * radius)).acos() * radius_sqr;
    let triangle_area = dist * (radius_sqr - dist_sqr / 4.0).sqrt() / 2.0;

    let overlapping_area = (sector_area - triangle_area) * 2.0 / (PI * radius_sqr);

    // 0 on a regular stack, 1 on a perfect stack
    let perfect_stack_buff =
        ((STACK_DISTANCE_RATIO - dist / radius) / STACK_DISTANCE_RATIO).max(0.0);

    overlapping_area * AREA_COEF + perfect_stack_buff * (1.0 - AREA_COEF)
}

/// Opacity of `curr` at the time `loop_obj` is hit, rescaled so that
/// opacities of `0.7` or more count as fully visible.
fn opacity_multiplier(curr: &OsuDifficultyObject, loop_obj: &OsuDifficultyObject) -> f64 {
    const THRESHOLD: f64 = 0.3;

    let opacity = curr.opacity_at(loop_obj.start_time);

    (((opacity + THRESHOLD).min(1.0) - THRESHOLD) / (1.0 - THRESHOLD)).sqrt()
}

/// Goes from `1` to `0` as the ratio of both times goes from `0.75` to `0.9`.
pub fn time_difference(time_a: f64, time_b: f64) -> f64 {
    let max = time_a.max(time_b);

    let similarity = if max.eq(0.0) {
        1.0
    } else {
        time_a.min(time_b) / max
    };

    if similarity < 0.75 {
        1.0
    } else if similarity > 0.9 {
        0.0
    } else {
        (((similarity - 0.75) * PI / 0.15).cos() + 1.0) / 2.0
    }
}

fn angle_similarity(angle_a: f64, angle_b: f64) -> f64 {
    const THRESHOLD: f64 = PI / 12.0;

    let difference = (angle_a - angle_b).abs();

    if difference > THRESHOLD {
        0.0
    } else {
        1.0 - difference / THRESHOLD
    }
}

/// How similar two movements are, `1` if either is missing.
fn general_similarity(a: Option<&OsuDifficultyObject>, b: Option<&OsuDifficultyObject>) -> f64 {
    let Some((a, b)) = a.zip(b) else {
        return 1.0;
    };

    let (a_angle, b_angle) = match (a.angle_signed, b.angle_signed) {
        (Some(a_angle), Some(b_angle)) => (a_angle, b_angle),
        (None, None) => return 1.0,
        _ => return 0.0,
    };

    let time_similarity = 1.0 - time_difference(a.strain_time, b.strain_time);

    let angle_delta = ((a_angle - b_angle).abs() - 0.1).clamp(0.0, 0.15);
    let angle_similarity = 1.0 - angle_delta / 0.15;

    let dist_delta = (a.lazy_jump_dist - b.lazy_jump_dist).abs() / NORMALIZED_RADIUS;
    let dist_similarity = 1.0 / dist_delta.max(1.0);

    time_similarity * angle_similarity * dist_similarity
}

/// How predictable the angle of `curr` is given the angles before it, in
/// `[0, 1]`.
pub fn angle_predictability(curr: &OsuDifficultyObject, prev_objects: &[OsuDifficultyObject]) -> f64 {
    let prev0 = curr.previous(0, prev_objects);
    let prev1 = curr.previous(1, prev_objects);
    let prev2 = curr.previous(2, prev_objects);

    let (Some(curr_angle), Some(prev0)) = (curr.angle, prev0) else {
        return 1.0;
    };

    let Some(prev0_angle) = prev0.angle else {
        return 1.0;
    };

    let mut angle_diff = (prev0_angle - curr_angle).abs();

    // Angles barely matter on very low spacing
    if prev0.lazy_jump_dist < NORMALIZED_RADIUS {
        angle_diff *= (prev0.lazy_jump_dist / NORMALIZED_RADIUS).powf(2.0);
    }

    if curr.lazy_jump_dist < NORMALIZED_RADIUS {
        angle_diff *= (curr.lazy_jump_dist / NORMALIZED_RADIUS).powf(2.0);
    }

    let mut angle_diff_prev = 0.0;
    let mut zero_angle_factor = 1.0;

    // Alternating angles
    if let Some(prev1_angle) = prev1.filter(|_| prev2.is_some()).and_then(|h| h.angle) {
        angle_diff_prev = (prev1_angle - curr_angle).abs();
        zero_angle_factor = (1.0 - curr_angle.min(prev0_angle) / PI).powf(10.0);
    }

    let rescale_factor = (1.0 - angle_diff_prev / PI).powf(5.0);

    // 0 on different rhythm, 1 on same rhythm
    let mut rhythm_factor = 1.0 - time_difference(curr.strain_time, prev0.strain_time);

    if let Some(prev1) = prev1 {
        rhythm_factor *= 1.0 - time_difference(prev0.strain_time, prev1.strain_time);

        if let Some(prev2) = prev2 {
            rhythm_factor *= 1.0 - time_difference(prev1.strain_time, prev2.strain_time);
        }
    }

    let prev_angle_adjust = (angle_diff - angle_diff_prev).max(0.0)
        * rescale_factor
        * rhythm_factor
        * zero_angle_factor;

    angle_diff -= prev_angle_adjust;

    let prev3 = curr.previous(3, prev_objects);
    let prev4 = curr.previous(4, prev_objects);
    let prev5 = curr.previous(5, prev_objects);

    // Same pattern repeating every 3 objects
    let similarity3 = general_similarity(Some(curr), prev2)
        * general_similarity(Some(prev0), prev3)
        * general_similarity(prev1, prev4);

    // ... or every 4 objects
    let similarity4 = general_similarity(Some(curr), prev3)
        * general_similarity(Some(prev0), prev4)
        * general_similarity(prev1, prev5);

    let wideness = if curr_angle > FRAC_PI_2 {
        let wideness = (curr_angle / PI - 0.5) * 2.0;

        1.0 - (1.0 - wideness).powf(3.0)
    } else {
        0.0
    };

    angle_diff /= 1.0 + wideness;

    // More than 15 degrees gets no penalty
    let adjusted_angle_diff = angle_diff.min(PI / 12.0);
    let predictability = (6.0 * adjusted_angle_diff).min(FRAC_PI_2).cos() * rhythm_factor;

    1.0 - (1.0 - predictability) * (1.0 - similarity3.max(similarity4))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_difference_bounds() {
        assert!(time_difference(100.0, 100.0).eq(0.0));
        assert!(time_difference(100.0, 50.0).eq(1.0));
        assert!(time_difference(0.0, 0.0).eq(0.0));

        let mid = time_difference(100.0, 82.5);
        assert!(mid > 0.0 && mid < 1.0, "{mid}");
    }

    #[test]
    fn angle_similarity_threshold() {
        assert!(angle_similarity(1.0, 1.0).eq(1.0));
        assert!(angle_similarity(0.0, PI / 6.0).eq(0.0));
        assert!(angle_similarity(0.0, PI / 24.0).almost_eq(0.5, 1e-12));
    }
}
