//! chatbench models - shared data types
//!
//! Everything that crosses a crate or wire boundary lives here: chat
//! messages, completion parameters, the `/trigger` request body and the
//! persisted preset record.

pub mod message;
pub mod params;
pub mod preset;
pub mod request;

pub use message::{Message, Role};
pub use params::{CompletionParams, GenerationParameters, ParamError, ParamRange};
pub use preset::{NewPreset, Preset, PresetSummary};
pub use request::CompletionRequest;
