pub mod presets;

pub use presets::PresetClient;
