pub mod basic_models;
pub mod payload;

pub use basic_models::{ErrorBody, InferenceStatus, Intensity, RoastRequest, RoastResult, Score};
