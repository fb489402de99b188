use std::cmp::Ordering;

pub use rosu_map::util::Pos;

/// All hitobject related data required for difficulty and performance
/// calculation.
///
/// Stack heights are expected to be resolved already, e.g. by the beatmap
/// parser that produced the objects.
#[derive(Clone, Debug, PartialEq)]
pub struct HitObject {
    pub pos: Pos,
    pub start_time: f64,
    pub stack_height: i32,
    pub new_combo: bool,
    pub kind: HitObjectKind,
}

impl HitObject {
    /// Create a new circle.
    pub const fn circle(pos: Pos, start_time: f64) -> Self {
        Self {
            pos,
            start_time,
            stack_height: 0,
            new_combo: false,
            kind: HitObjectKind::Circle,
        }
    }

    /// Create a new slider.
    pub const fn slider(pos: Pos, start_time: f64, slider: Slider) -> Self {
        Self {
            pos,
            start_time,
            stack_height: 0,
            new_combo: false,
            kind: HitObjectKind::Slider(slider),
        }
    }

    /// Create a new spinner lasting `duration` milliseconds.
    pub const fn spinner(pos: Pos, start_time: f64, duration: f64) -> Self {
        Self {
            pos,
            start_time,
            stack_height: 0,
            new_combo: false,
            kind: HitObjectKind::Spinner(Spinner { duration }),
        }
    }

    /// Specify the stack height.
    #[must_use]
    pub fn with_stack_height(mut self, stack_height: i32) -> Self {
        self.stack_height = stack_height;

        self
    }

    /// Specify whether the object starts a new combo.
    #[must_use]
    pub fn with_new_combo(mut self, new_combo: bool) -> Self {
        self.new_combo = new_combo;

        self
    }

    /// Whether the hitobject is a circle.
    pub const fn is_circle(&self) -> bool {
        matches!(&self.kind, HitObjectKind::Circle)
    }

    /// Whether the hitobject is a slider.
    pub const fn is_slider(&self) -> bool {
        matches!(&self.kind, HitObjectKind::Slider(_))
    }

    /// Whether the hitobject is a spinner.
    pub const fn is_spinner(&self) -> bool {
        matches!(&self.kind, HitObjectKind::Spinner(_))
    }

    /// The end time of the object.
    pub fn end_time(&self) -> f64 {
        match &self.kind {
            HitObjectKind::Circle => self.start_time,
            HitObjectKind::Slider(slider) => self.start_time + slider.duration(),
            HitObjectKind::Spinner(Spinner { duration }) => self.start_time + *duration,
        }
    }
}

impl PartialOrd for HitObject {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.start_time.partial_cmp(&other.start_time)
    }
}

/// Additional data for a [`HitObject`].
#[derive(Clone, Debug, PartialEq)]
pub enum HitObjectKind {
    Circle,
    Slider(Slider),
    Spinner(Spinner),
}

/// A slider.
#[derive(Clone, Debug, PartialEq)]
pub struct Slider {
    /// The resolved path relative to the slider head.
    pub path: SliderPath,
    /// Duration of a single span in milliseconds.
    pub span_duration: f64,
    /// Amount of repeats i.e. the span count minus one.
    pub repeats: usize,
    /// Distance between ticks in osu!pixels.
    ///
    /// Non-finite or non-positive values generate no ticks.
    pub tick_distance: f64,
}

impl Slider {
    pub fn new(path: SliderPath, span_duration: f64, repeats: usize, tick_distance: f64) -> Self {
        Self {
            path,
            span_duration,
            repeats,
            tick_distance,
        }
    }

    /// The amount of spans of the slider.
    pub const fn span_count(&self) -> usize {
        self.repeats + 1
    }

    /// Total duration of all spans.
    pub fn duration(&self) -> f64 {
        self.span_duration * self.span_count() as f64
    }

    /// Slider ball velocity in osu!pixels per millisecond.
    pub fn velocity(&self) -> f64 {
        if self.span_duration > 0.0 {
            self.path.dist() / self.span_duration
        } else {
            0.0
        }
    }
}

/// A polyline starting at the slider head, i.e. at `(0, 0)`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SliderPath {
    points: Vec<Pos>,
    cumulative_lengths: Vec<f64>,
}

impl SliderPath {
    /// Create a path through the given points, each relative to the head.
    pub fn new(points: impl IntoIterator<Item = Pos>) -> Self {
        let mut path = Self {
            points: vec![Pos::default()],
            cumulative_lengths: vec![0.0],
        };

        for point in points {
            let last = path.points[path.points.len() - 1];
            let len = path.cumulative_lengths[path.cumulative_lengths.len() - 1];

            path.cumulative_lengths
                .push(len + f64::from((point - last).length()));
            path.points.push(point);
        }

        path
    }

    /// A straight path from the head to `end`.
    pub fn linear(end: Pos) -> Self {
        Self::new([end])
    }

    /// Total length of the path.
    pub fn dist(&self) -> f64 {
        self.cumulative_lengths.last().copied().unwrap_or(0.0)
    }

    /// The position at the given progress along the path, relative to the
    /// head. `progress` is clamped to `[0, 1]`.
    pub fn position_at(&self, progress: f64) -> Pos {
        let dist = self.dist();

        if dist <= 0.0 {
            return self.points.last().copied().unwrap_or_default();
        }

        let d = progress.clamp(0.0, 1.0) * dist;

        let i = self
            .cumulative_lengths
            .partition_point(|&len| len < d)
            .clamp(1, self.points.len() - 1);

        let start = self.cumulative_lengths[i - 1];
        let end = self.cumulative_lengths[i];
        let (p0, p1) = (self.points[i - 1], self.points[i]);

        if end - start <= f64::EPSILON {
            return p0;
        }

        let w = ((d - start) / (end - start)) as f32;

        p0 + (p1 - p0) * w
    }

    /// The path's points including the implicit origin.
    pub fn points(&self) -> &[Pos] {
        &self.points
    }
}

/// A spinner.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Spinner {
    pub duration: f64,
}

#[cfg(test)]
mod tests {
    use crate::util::float_ext::FloatExt;

    use super::*;

    #[test]
    fn path_length_and_positions() {
        let path = SliderPath::new([Pos::new(100.0, 0.0), Pos::new(100.0, 100.0)]);

        assert!(path.dist().eq(200.0));
        assert_eq!(path.position_at(0.0), Pos::new(0.0, 0.0));
        assert_eq!(path.position_at(0.25), Pos::new(50.0, 0.0));
        assert_eq!(path.position_at(0.75), Pos::new(100.0, 50.0));
        assert_eq!(path.position_at(1.0), Pos::new(100.0, 100.0));
        assert_eq!(path.position_at(7.0), Pos::new(100.0, 100.0));
    }

    #[test]
    fn empty_path() {
        let path = SliderPath::default();

        assert!(path.dist().eq(0.0));
        assert_eq!(path.position_at(0.5), Pos::default());
    }

    #[test]
    fn slider_timing() {
        let slider = Slider::new(SliderPath::linear(Pos::new(150.0, 0.0)), 300.0, 2, 50.0);
        let h = HitObject::slider(Pos::new(100.0, 100.0), 1000.0, slider);

        assert!(h.end_time().eq(1900.0));

        let HitObjectKind::Slider(ref slider) = h.kind else {
            unreachable!()
        };

        assert_eq!(slider.span_count(), 3);
        assert!(slider.velocity().eq(0.5));
    }

    #[test]
    fn builders_keep_slider_data() {
        let slider = Slider::new(SliderPath::linear(Pos::new(80.0, 0.0)), 200.0, 1, 40.0);

        let h = HitObject::slider(Pos::new(10.0, 20.0), 500.0, slider)
            .with_stack_height(-2)
            .with_new_combo(true);

        assert_eq!(h.stack_height, -2);
        assert!(h.new_combo);
        assert!(h.is_slider());
        assert!(h.end_time().eq(900.0));
    }
}
