mod errors;
mod trigger;

pub use errors::Error;
pub use trigger::{GenerationSummary, trigger_generation};
