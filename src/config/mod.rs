//! `config.toml` handling.

mod defaults;
mod io;
mod types;


pub use io::{config_path, load_from, load_or_default, save, save_to_path};
pub use types::{
    AppConfig, ConfigError, DurationOptions, ExportOptions, HistoryOptions, PlaybackOptions,
};
