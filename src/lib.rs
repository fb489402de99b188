//! Library to calculate difficulty and performance attributes for [osu!]standard maps
//! based on the 2024-10-18 reading rework.
//!
//! ## Description
//!
//! On top of the well known aim, speed, and flashlight skills, the reading
//! rework rates how hard objects are to *read*:
//!   - low approach rates, where many objects are visible at the same time
//!     and overlap each other,
//!   - high approach rates, where objects appear shortly before they have
//!     to be hit,
//!   - hidden, where objects fade out before they are hit.
//!
//! Both the aim and speed values as well as the reading values are then
//! combined into a single star rating and pp value.
//!
//! ## Usage
//!
//! ```
//! use rosu_reading_pp::{Beatmap, Difficulty};
//! use rosu_reading_pp::model::hit_object::{HitObject, Pos};
//!
//! // Hit objects are usually provided by a beatmap parser
//! let hit_objects = (0..100)
//!     .map(|i| {
//!         let pos = Pos::new(64.0 + (i % 8) as f32 * 48.0, 192.0);
//!
//!         HitObject::circle(pos, 1000.0 + f64::from(i) * 150.0)
//!     })
//!     .collect();
//!
//! let map = Beatmap {
//!     ar: 9.0,
//!     od: 8.0,
//!     ..Beatmap::new(hit_objects)
//! };
//!
//! // Calculate difficulty attributes
//! let diff_attrs = Difficulty::new()
//!     .mods(8 + 16) // HDHR
//!     .calculate(&map);
//!
//! let stars = diff_attrs.stars;
//!
//! // Calculate performance attributes
//! let perf_attrs = map.performance()
//!     // To speed up the calculation significantly, we can re-use the previous
//!     // attributes.
//!     // **Note** that this should only be done if the map, mods, and
//!     // amount of passed objects stay the same. Otherwise, the resulting
//!     // attributes will be incorrect.
//!     .attributes(diff_attrs)
//!     .mods(24) // HDHR, same as before
//!     .combo(80)
//!     .accuracy(99.2)
//!     .misses(1)
//!     .calculate();
//!
//! let pp = perf_attrs.pp();
//!
//! // Again, we re-use the previous attributes for maximum efficiency.
//! let max_pp = perf_attrs.performance()
//!     .mods(24) // Still the same
//!     .calculate()
//!     .pp();
//!
//! println!("Stars: {stars} | PP: {pp}/{max_pp}");
//! ```
//!
//! ## Gradual calculation
//!
//! Calculating the difficulty after every hit object is possible through
//! [`OsuGradualDifficulty`], or [`Difficulty::gradual_attributes`] to
//! collect all attributes at once.
//!
//! ## Features
//!
//! | Flag | Description | Dependencies
//! | - | - | -
//! | `default` | Enables the `tracing` feature |
//! | `tracing` | Calculations emit `tracing::debug` events and rejected suspicious maps are logged through `tracing::warn`. | [`tracing`]
//!
//! [osu!]: https://osu.ppy.sh/home
//! [`tracing`]: https://docs.rs/tracing

#![deny(rustdoc::broken_intra_doc_links)]
#![warn(clippy::missing_const_for_fn, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::struct_excessive_bools,
    clippy::match_same_arms,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::explicit_iter_loop,
    clippy::similar_names,
    clippy::cast_possible_wrap
)]

#[doc(inline)]
pub use self::{
    difficulty::Difficulty,
    model::{beatmap::Beatmap, mods::GameMods},
    osu::OsuGradualDifficulty,
};

mod difficulty;

/// Types for osu!standard calculations.
pub mod osu;

/// Types used in and around this crate.
pub mod model;

mod util;
