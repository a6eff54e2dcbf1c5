pub mod openai;
pub mod prediction;

pub use openai::OpenAiPredictionStrategy;
pub use prediction::{PredictionError, PredictionStrategy};
