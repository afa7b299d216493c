pub mod avatar;
pub mod credentials;
pub mod estimate;
pub mod ids;
pub mod job;
mod model_types;
pub mod project;
pub mod script;
pub mod time;
pub mod video;

pub use model_types::{Provider, DEFAULT_MODEL_ID};
