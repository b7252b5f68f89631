pub mod config;
pub mod format;
pub mod presets;
pub mod sounds;
pub mod timer;
