use rosu_map::util::Pos;

use crate::model::hit_object::{HitObject, HitObjectKind, Slider, SliderPath, Spinner};

use super::PLAYFIELD_BASE_SIZE;

#[derive(Clone, Debug)]
pub struct OsuObject {
    pub pos: Pos,
    pub start_time: f64,
    pub stack_height: i32,
    pub stack_offset: Pos,
    pub new_combo: bool,
    pub kind: OsuObjectKind,
}

impl OsuObject {
    pub const OBJECT_RADIUS: f32 = 64.0;
    pub const PREEMPT_MIN: f64 = 450.0;

    /// The legacy tail is placed this many ms before the actual slider end.
    const LEGACY_LAST_TICK_OFFSET: f64 = 36.0;

    pub fn new(h: &HitObject) -> Self {
        let kind = match h.kind {
            HitObjectKind::Circle => OsuObjectKind::Circle,
            HitObjectKind::Slider(ref slider) => OsuObjectKind::Slider(OsuSlider::new(h, slider)),
            HitObjectKind::Spinner(Spinner { duration }) => OsuObjectKind::Spinner {
                end_time: h.start_time + duration,
            },
        };

        Self {
            pos: h.pos,
            start_time: h.start_time,
            stack_height: h.stack_height,
            stack_offset: Pos::default(),
            new_combo: h.new_combo,
            kind,
        }
    }

    /// Mirror the object along the horizontal axis of the playfield.
    pub fn reflect_vertically(&mut self) {
        fn reflect_y(y: &mut f32) {
            *y = PLAYFIELD_BASE_SIZE.y - *y;
        }

        reflect_y(&mut self.pos.y);

        if let OsuObjectKind::Slider(ref mut slider) = self.kind {
            reflect_y(&mut slider.lazy_end_pos.y);
            reflect_y(&mut slider.end_pos.y);

            for nested in slider.nested_objects.iter_mut() {
                reflect_y(&mut nested.pos.y);
            }
        }
    }

    pub const fn end_time(&self) -> f64 {
        match self.kind {
            OsuObjectKind::Circle => self.start_time,
            OsuObjectKind::Slider(ref slider) => slider.end_time,
            OsuObjectKind::Spinner { end_time } => end_time,
        }
    }

    pub fn stacked_pos(&self) -> Pos {
        self.pos + self.stack_offset
    }

    pub fn end_pos(&self) -> Pos {
        match self.kind {
            OsuObjectKind::Circle | OsuObjectKind::Spinner { .. } => self.pos,
            OsuObjectKind::Slider(ref slider) => slider.end_pos,
        }
    }

    pub fn stacked_end_pos(&self) -> Pos {
        self.end_pos() + self.stack_offset
    }

    /// Position of the legacy tail which is not necessarily the end position
    /// for sliders that end in a short repeat.
    pub fn stacked_tail_pos(&self) -> Pos {
        match self.kind {
            OsuObjectKind::Slider(ref slider) => {
                slider.tail().map_or(self.pos, |tail| tail.pos) + self.stack_offset
            }
            OsuObjectKind::Circle | OsuObjectKind::Spinner { .. } => self.stacked_pos(),
        }
    }

    pub fn lazy_travel_time(&self) -> f64 {
        match self.kind {
            OsuObjectKind::Circle | OsuObjectKind::Spinner { .. } => 0.0,
            OsuObjectKind::Slider(ref slider) => slider.lazy_travel_time,
        }
    }

    pub const fn is_slider(&self) -> bool {
        matches!(self.kind, OsuObjectKind::Slider { .. })
    }

    pub const fn is_spinner(&self) -> bool {
        matches!(self.kind, OsuObjectKind::Spinner { .. })
    }
}

#[derive(Clone, Debug)]
pub enum OsuObjectKind {
    Circle,
    Slider(OsuSlider),
    Spinner { end_time: f64 },
}

#[derive(Clone, Debug)]
pub struct OsuSlider {
    pub end_time: f64,
    /// Unstacked position at the end of the last span.
    pub end_pos: Pos,
    pub path_length: f64,
    pub repeats: usize,
    /// Where the cursor ends up when following the slider lazily.
    ///
    /// Unstacked until the conversion applies stack offsets.
    pub lazy_end_pos: Pos,
    pub lazy_travel_dist: f32,
    pub lazy_travel_time: f64,
    pub nested_objects: Vec<NestedSliderObject>,
}

impl OsuSlider {
    fn new(h: &HitObject, slider: &Slider) -> Self {
        let start_time = h.start_time;
        let span_count = slider.span_count();
        let span_duration = slider.span_duration;
        let path = &slider.path;

        let duration = slider.duration();
        let end_time = start_time + duration;

        let mut nested_objects = Vec::new();
        generate_nested(h, slider, &mut nested_objects);

        // Even span counts end where they started
        let end_progress = if span_count % 2 == 0 { 0.0 } else { 1.0 };
        let end_pos = h.pos + path.position_at(end_progress);

        let lazy_travel_time = nested_objects
            .last()
            .map_or(0.0, |nested| nested.start_time - start_time);

        let lazy_end_pos = if span_duration > 0.0 {
            let mut end_time_min = lazy_travel_time / span_duration;

            if end_time_min % 2.0 >= 1.0 {
                end_time_min = 1.0 - end_time_min % 1.0;
            } else {
                end_time_min %= 1.0;
            }

            h.pos + path.position_at(end_time_min)
        } else {
            h.pos
        };

        Self {
            end_time,
            end_pos,
            path_length: path.dist(),
            repeats: slider.repeats,
            lazy_end_pos,
            lazy_travel_dist: 0.0,
            lazy_travel_time,
            nested_objects,
        }
    }

    pub const fn span_count(&self) -> usize {
        self.repeats + 1
    }

    pub fn tail(&self) -> Option<&NestedSliderObject> {
        self.nested_objects
            .iter()
            // The tail is not necessarily the last nested object, e.g. on very
            // short and fast buzz sliders
            .rfind(|nested| matches!(nested.kind, NestedSliderObjectKind::Tail))
    }
}

/// Ticks and repeats for every span followed by the legacy tail, sorted by
/// time.
fn generate_nested(h: &HitObject, slider: &Slider, nested: &mut Vec<NestedSliderObject>) {
    let path: &SliderPath = &slider.path;
    let length = path.dist();
    let span_duration = slider.span_duration;
    let span_count = slider.span_count();
    let start_time = h.start_time;

    let velocity = slider.velocity();
    let min_dist_from_end = velocity * 10.0;

    let tick_dist = if slider.tick_distance.is_finite() && slider.tick_distance > 0.0 {
        slider.tick_distance.min(length)
    } else {
        0.0
    };

    let mut tick_offsets = Vec::new();

    if tick_dist > 0.0 {
        let mut d = tick_dist;

        while d <= length {
            if d >= length - min_dist_from_end {
                break;
            }

            tick_offsets.push(d);
            d += tick_dist;
        }
    }

    let at_progress = |progress: f64| h.pos + path.position_at(progress);

    for span in 0..span_count {
        let span_start_time = start_time + span as f64 * span_duration;
        let reversed = span % 2 == 1;

        let mut push_tick = |d: f64| {
            let path_progress = d / length;

            let time_progress = if reversed {
                1.0 - path_progress
            } else {
                path_progress
            };

            nested.push(NestedSliderObject {
                pos: at_progress(path_progress),
                start_time: span_start_time + time_progress * span_duration,
                kind: NestedSliderObjectKind::Tick,
            });
        };

        if reversed {
            tick_offsets.iter().rev().copied().for_each(&mut push_tick);
        } else {
            tick_offsets.iter().copied().for_each(&mut push_tick);
        }

        if span < span_count - 1 {
            nested.push(NestedSliderObject {
                pos: at_progress(((span + 1) % 2) as f64),
                start_time: span_start_time + span_duration,
                kind: NestedSliderObjectKind::Repeat,
            });
        }
    }

    let duration = slider.duration();
    let end_time = start_time + duration;

    let tail_time =
        (start_time + duration / 2.0).max(end_time - OsuObject::LEGACY_LAST_TICK_OFFSET);

    let final_span_start = start_time + (span_count - 1) as f64 * span_duration;

    let final_progress = if span_duration > 0.0 {
        ((tail_time - final_span_start) / span_duration).clamp(0.0, 1.0)
    } else {
        1.0
    };

    let tail_progress = if span_count % 2 == 0 {
        1.0 - final_progress
    } else {
        final_progress
    };

    nested.push(NestedSliderObject {
        pos: at_progress(tail_progress),
        start_time: tail_time,
        kind: NestedSliderObjectKind::Tail,
    });

    nested.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
}

#[derive(Clone, Debug)]
pub struct NestedSliderObject {
    pub pos: Pos,
    pub start_time: f64,
    pub kind: NestedSliderObjectKind,
}

impl NestedSliderObject {
    pub const fn is_repeat(&self) -> bool {
        matches!(self.kind, NestedSliderObjectKind::Repeat)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NestedSliderObjectKind {
    Repeat,
    Tail,
    Tick,
}
