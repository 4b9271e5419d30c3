pub mod chat;
pub mod preset;
