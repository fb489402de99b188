use std::cell::OnceCell;

use rosu_map::util::Pos;

use crate::{
    osu::object::{OsuObject, OsuObjectKind},
    util::index_hasher::IndexMap,
};

use super::{
    reading::{self, ReadingObject},
    scaling_factor::ScalingFactor,
    HD_FADE_OUT_DURATION_MULTIPLIER,
};

/// Timing and visibility values shared by all difficulty objects of a map.
///
/// Durations are **not** adjusted by the clock rate.
#[derive(Clone, Debug)]
pub struct ObjectTimings {
    pub clock_rate: f64,
    pub time_preempt: f64,
    pub time_fade_in: f64,
    /// Hit window of a 300 in both directions.
    pub great_hit_window: f64,
    pub hidden: bool,
}

/// A hit object annotated with everything the evaluators need.
///
/// Times are adjusted by the clock rate.
pub struct OsuDifficultyObject {
    pub idx: usize,
    pub base: OsuObject,
    pub start_time: f64,
    pub end_time: f64,
    pub delta_time: f64,
    pub strain_time: f64,

    pub lazy_jump_dist: f64,
    pub min_jump_dist: f64,
    pub min_jump_time: f64,
    pub travel_dist: f64,
    pub travel_time: f64,
    pub angle: Option<f64>,
    pub angle_signed: Option<f64>,

    pub hit_window: f64,
    /// Circle radius in osu!pixels, not adjusted for small circles.
    pub radius: f64,
    pub preempt: f64,
    pub fade_in: f64,
    pub hidden: bool,
    pub follow_line_time: f64,

    pub angle_predictability: f64,
    pub reading_objects: Vec<ReadingObject>,
    pub overlap_values: IndexMap<f64>,

    rhythm: OnceCell<f64>,
}

impl OsuDifficultyObject {
    pub const NORMALIZED_RADIUS: i32 = 50;
    pub const NORMALIZED_DIAMETER: i32 = Self::NORMALIZED_RADIUS * 2;

    pub const MIN_DELTA_TIME: f64 = 25.0;
    const MAX_SLIDER_RADIUS: f32 = Self::NORMALIZED_RADIUS as f32 * 2.4;
    const ASSUMED_SLIDER_RADIUS: f32 = Self::NORMALIZED_RADIUS as f32 * 1.8;

    pub const FOLLOW_LINE_DURATION: f64 = 800.0;

    /// Annotate `hit_object` based on its predecessors.
    ///
    /// `prev_objects` must contain exactly the difficulty objects that were
    /// created before this one, i.e. its length is `idx`.
    pub fn new(
        hit_object: &OsuObject,
        last_object: &OsuObject,
        last_last_object: Option<&OsuObject>,
        prev_objects: &[Self],
        scaling_factor: &ScalingFactor,
        timings: &ObjectTimings,
    ) -> Self {
        let clock_rate = timings.clock_rate;
        let idx = prev_objects.len();

        let delta_time = (hit_object.start_time - last_object.start_time) / clock_rate;
        let strain_time = delta_time.max(Self::MIN_DELTA_TIME);

        let follow_line_time = if hit_object.new_combo {
            0.0
        } else {
            Self::FOLLOW_LINE_DURATION / clock_rate
        };

        let mut this = Self {
            idx,
            base: hit_object.clone(),
            start_time: hit_object.start_time / clock_rate,
            end_time: hit_object.end_time() / clock_rate,
            delta_time,
            strain_time,
            lazy_jump_dist: 0.0,
            min_jump_dist: 0.0,
            min_jump_time: 0.0,
            travel_dist: 0.0,
            travel_time: 0.0,
            angle: None,
            angle_signed: None,
            hit_window: timings.great_hit_window / clock_rate,
            radius: scaling_factor.radius,
            preempt: timings.time_preempt / clock_rate,
            fade_in: timings.time_fade_in / clock_rate,
            hidden: timings.hidden,
            follow_line_time,
            angle_predictability: 1.0,
            reading_objects: Vec::new(),
            overlap_values: IndexMap::default(),
            rhythm: OnceCell::new(),
        };

        this.set_distances(last_object, last_last_object, clock_rate, scaling_factor);
        this.angle_predictability = reading::angle_predictability(&this, prev_objects);

        let (reading_objects, overlap_values) =
            reading::reading_objects(&this, prev_objects, scaling_factor.radius);

        this.reading_objects = reading_objects;
        this.overlap_values = overlap_values;

        this
    }

    /// The object that was created `backwards_idx + 1` objects before this one.
    pub fn previous<'a>(&self, backwards_idx: usize, objects: &'a [Self]) -> Option<&'a Self> {
        self.idx
            .checked_sub(backwards_idx + 1)
            .and_then(|idx| objects.get(idx))
    }

    /// The object that was created `forwards_idx + 1` objects after this one.
    pub fn next<'a>(&self, forwards_idx: usize, objects: &'a [Self]) -> Option<&'a Self> {
        objects.get(self.idx + (forwards_idx + 1))
    }

    /// Visibility of this object at the given clock-rate-adjusted `time`.
    pub fn opacity_at(&self, time: f64) -> f64 {
        if time > self.start_time {
            // * Consider a hitobject as being invisible when its start time is passed.
            // * In reality the hitobject will be visible beyond its start time up until its hittable window has passed,
            // * but this is an approximation and such a case is unlikely to be hit where this function is used.
            return 0.0;
        }

        let fade_in_start_time = self.start_time - self.preempt;
        let fade_in = ((time - fade_in_start_time) / self.fade_in).clamp(0.0, 1.0);

        if self.hidden {
            let fade_out_start_time = fade_in_start_time + self.fade_in;
            let fade_out_duration = self.preempt * HD_FADE_OUT_DURATION_MULTIPLIER;

            fade_in.min(1.0 - ((time - fade_out_start_time) / fade_out_duration).clamp(0.0, 1.0))
        } else {
            fade_in
        }
    }

    pub fn get_doubletapness(&self, next: Option<&Self>) -> f64 {
        let Some(next) = next else { return 0.0 };

        let curr_delta_time = self.delta_time.max(1.0);
        let next_delta_time = next.delta_time.max(1.0);
        let delta_diff = (next_delta_time - curr_delta_time).abs();
        let speed_ratio = curr_delta_time / curr_delta_time.max(delta_diff);
        let window_ratio = (curr_delta_time / self.hit_window).min(1.0).powf(2.0);

        1.0 - speed_ratio.powf(1.0 - window_ratio)
    }

    /// The rhythm difficulty of this object, computed on first access.
    pub fn rhythm_difficulty(&self, compute: impl FnOnce() -> f64) -> f64 {
        *self.rhythm.get_or_init(compute)
    }

    fn set_distances(
        &mut self,
        last_object: &OsuObject,
        last_last_object: Option<&OsuObject>,
        clock_rate: f64,
        scaling_factor: &ScalingFactor,
    ) {
        if let OsuObjectKind::Slider(ref slider) = self.base.kind {
            self.travel_dist = f64::from(
                slider.lazy_travel_dist
                    * ((1.0 + slider.repeats as f64 / 2.5).powf(1.0 / 2.5)) as f32,
            );

            self.travel_time =
                (self.base.lazy_travel_time() / clock_rate).max(Self::MIN_DELTA_TIME);
        }

        if self.base.is_spinner() || last_object.is_spinner() {
            return;
        }

        let scaling_factor = scaling_factor.factor;

        let last_cursor_pos = Self::get_end_cursor_pos(last_object);

        self.lazy_jump_dist = f64::from(
            (self.base.stacked_pos() * scaling_factor - last_cursor_pos * scaling_factor).length(),
        );
        self.min_jump_time = self.strain_time;
        self.min_jump_dist = self.lazy_jump_dist;

        if last_object.is_slider() {
            let last_travel_time =
                (last_object.lazy_travel_time() / clock_rate).max(Self::MIN_DELTA_TIME);
            self.min_jump_time = (self.strain_time - last_travel_time).max(Self::MIN_DELTA_TIME);

            // * There are two types of slider-to-object patterns to consider in order to better approximate the real movement a player will take to jump between the hitobjects.
            // *
            // * 1. The anti-flow pattern, where players cut the slider short in order to move to the next hitobject.
            // * 2. The flow pattern, where players follow through the slider to its visual extent into the next hitobject.
            // *
            // * Thus, the player is assumed to jump the minimum of these two distances in all cases.
            let tail_jump_dist =
                (last_object.stacked_tail_pos() - self.base.stacked_pos()).length() * scaling_factor;

            let diff = f64::from(Self::MAX_SLIDER_RADIUS - Self::ASSUMED_SLIDER_RADIUS);
            let min = f64::from(tail_jump_dist - Self::MAX_SLIDER_RADIUS);

            self.min_jump_dist = (self.lazy_jump_dist - diff).min(min).max(0.0);
        }

        if let Some(last_last_object) = last_last_object.filter(|h| !h.is_spinner()) {
            let last_last_cursor_pos = Self::get_end_cursor_pos(last_last_object);

            let v1 = last_last_cursor_pos - last_object.stacked_pos();
            let v2 = self.base.stacked_pos() - last_cursor_pos;

            let dot = v1.dot(v2);
            let det = v1.x * v2.y - v1.y * v2.x;

            let angle_signed = f64::from(det.atan2(dot));

            self.angle_signed = Some(angle_signed);
            self.angle = Some(angle_signed.abs());
        }
    }

    /// Move a virtual cursor along the slider's nested objects, only as far
    /// as necessary to stay within the follow circle, and store the resulting
    /// travel distance and end position.
    pub fn compute_slider_cursor_pos(h: &mut OsuObject, radius: f64) {
        let pos = h.pos;
        let stack_offset = h.stack_offset;

        let OsuObjectKind::Slider(ref mut slider) = h.kind else {
            return;
        };

        let mut curr_cursor_pos = pos + stack_offset;
        let scaling_factor = f64::from(Self::NORMALIZED_RADIUS) / radius;
        let nested_len = slider.nested_objects.len();

        for (i, curr_movement_obj) in slider.nested_objects.iter().enumerate() {
            let is_last = i + 1 == nested_len;

            let mut curr_movement = curr_movement_obj.pos + stack_offset - curr_cursor_pos;
            let mut curr_movement_len = scaling_factor * f64::from(curr_movement.length());
            let mut required_movement = f64::from(Self::ASSUMED_SLIDER_RADIUS);

            if is_last {
                // * The end of a slider has special aim rules due to the relaxed time constraint on position.
                // * There is both a lazy end position as well as the actual end slider position. We assume the player takes the simpler movement.
                // * For sliders that are circular, the lazy end position may actually be farther away than the sliders true end.
                // * This code is designed to prevent buffing situations where lazy end is actually a less efficient movement.
                let lazy_movement = slider.lazy_end_pos - curr_cursor_pos;

                if lazy_movement.length() < curr_movement.length() {
                    curr_movement = lazy_movement;
                }

                curr_movement_len = scaling_factor * f64::from(curr_movement.length());
            } else if curr_movement_obj.is_repeat() {
                // * For a slider repeat, assume a tighter movement threshold to better assess repeat sliders.
                required_movement = f64::from(Self::NORMALIZED_RADIUS);
            }

            if curr_movement_len > required_movement {
                // * this finds the positional delta from the required radius and the current position, and updates the currCursorPosition accordingly, as well as rewarding distance.
                let ratio = (curr_movement_len - required_movement) / curr_movement_len;
                curr_cursor_pos += curr_movement * ratio as f32;
                curr_movement_len *= ratio;
                slider.lazy_travel_dist += curr_movement_len as f32;
            }

            if is_last {
                slider.lazy_end_pos = curr_cursor_pos;
            }
        }
    }

    fn get_end_cursor_pos(hit_object: &OsuObject) -> Pos {
        if let OsuObjectKind::Slider(ref slider) = hit_object.kind {
            slider.lazy_end_pos
        } else {
            hit_object.stacked_pos()
        }
    }
}
