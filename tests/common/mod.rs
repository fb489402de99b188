#![allow(unused)]

use rosu_reading_pp::{
    model::hit_object::{HitObject, Pos, Slider, SliderPath},
    Beatmap,
};

pub use self::mods::*;

/// Bit values for mods
mod mods {
    pub const NM: u32 = 0;
    pub const NF: u32 = 1 << 0;
    pub const EZ: u32 = 1 << 1;
    pub const TD: u32 = 1 << 2;
    pub const HD: u32 = 1 << 3;
    pub const HR: u32 = 1 << 4;
    pub const DT: u32 = 1 << 6;
    pub const RX: u32 = 1 << 7;
    pub const HT: u32 = 1 << 8;
    pub const FL: u32 = 1 << 10;
    pub const SO: u32 = 1 << 12;
}

/// Circles jumping back and forth across the playfield.
pub fn jumps(n: usize, interval: f64) -> Beatmap {
    let hit_objects = (0..n)
        .map(|i| {
            let x = if i % 2 == 0 { 96.0 } else { 416.0 };
            let y = 96.0 + (i % 5) as f32 * 48.0;

            HitObject::circle(Pos::new(x, y), 1000.0 + i as f64 * interval)
        })
        .collect();

    with_settings(Beatmap::new(hit_objects), 9.0, 4.0, 8.0)
}

/// Circles tightly packed in a small square.
pub fn stream(n: usize, interval: f64) -> Beatmap {
    let hit_objects = (0..n)
        .map(|i| {
            let pos = Pos::new(240.0 + (i % 4) as f32 * 12.0, 180.0 + (i % 3) as f32 * 12.0);

            HitObject::circle(pos, 1000.0 + i as f64 * interval)
        })
        .collect();

    with_settings(Beatmap::new(hit_objects), 9.0, 4.0, 8.0)
}

/// Alternating circles and sliders with a spinner at the end.
pub fn mixed(n: usize) -> Beatmap {
    let mut hit_objects = Vec::with_capacity(n + 1);
    let mut time = 1000.0;

    for i in 0..n {
        let pos = Pos::new(64.0 + (i % 7) as f32 * 60.0, 64.0 + (i % 4) as f32 * 80.0);

        if i % 3 == 2 {
            let path = SliderPath::linear(Pos::new(80.0, 40.0));
            let slider = Slider::new(path, 300.0, i % 2, 50.0);
            hit_objects.push(HitObject::slider(pos, time, slider));
            time += 300.0 * (1 + i % 2) as f64 + 200.0;
        } else {
            hit_objects.push(HitObject::circle(pos, time).with_new_combo(i % 8 == 0));
            time += 250.0;
        }
    }

    hit_objects.push(HitObject::spinner(Pos::new(256.0, 192.0), time + 500.0, 2000.0));

    with_settings(Beatmap::new(hit_objects), 8.0, 4.0, 7.0)
}

pub fn with_settings(map: Beatmap, ar: f32, cs: f32, od: f32) -> Beatmap {
    Beatmap { ar, cs, od, ..map }
}

#[track_caller]
pub fn assert_almost_eq(a: f64, b: f64, tolerance: f64) {
    assert!((a - b).abs() <= tolerance, "{a} != {b} (tolerance {tolerance})");
}
