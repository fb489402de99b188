use rosu_map::util::Pos;

use crate::osu::object::OsuObject;

use super::object::OsuDifficultyObject;

const BROKEN_GAMEFIELD_ROUNDING_ALLOWANCE: f32 = 1.00041;
const CIRCLE_SIZE_BUFF_THRESHOLD: f32 = 30.0;

/// Fields around the scaling of hit objects.
///
/// All objects share the same circle size so these are only stored once.
#[derive(Clone, Debug)]
pub struct ScalingFactor {
    /// `NORMALIZED_RADIUS / radius`, buffed for small circles.
    pub factor: f32,
    pub radius: f64,
    pub scale: f32,
}

impl ScalingFactor {
    pub fn new(cs: f64) -> Self {
        let scale = (f64::from(1.0_f32) - f64::from(0.7_f32) * ((cs - 5.0) / 5.0)) as f32 / 2.0
            * BROKEN_GAMEFIELD_ROUNDING_ALLOWANCE;

        let radius = f64::from(OsuObject::OBJECT_RADIUS * scale);
        let factor = OsuDifficultyObject::NORMALIZED_RADIUS as f32 / radius as f32;

        let factor = if (radius as f32) < CIRCLE_SIZE_BUFF_THRESHOLD {
            let small_circle_bonus = (CIRCLE_SIZE_BUFF_THRESHOLD - radius as f32).min(5.0) / 50.0;

            factor * (1.0 + small_circle_bonus)
        } else {
            factor
        };

        Self {
            factor,
            radius,
            scale,
        }
    }

    pub fn stack_offset(&self, stack_height: i32) -> Pos {
        let stack_offset = stack_height as f32 * self.scale * -6.4;

        Pos::new(stack_offset, stack_offset)
    }
}
