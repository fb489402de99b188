pub use self::{
    aim::AimEvaluator, flashlight::FlashlightEvaluator, reading::ReadingEvaluator,
    rhythm::RhythmEvaluator, speed::SpeedEvaluator,
};

mod aim;
mod flashlight;
mod reading;
mod rhythm;
mod speed;
