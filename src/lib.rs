// Library surface for the binary, headless/integration tests and reuse.
// The terminal setup and CLI parsing stay in main.rs.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod export;
pub mod format;
pub mod kv;
pub mod logging;
pub mod record;
pub mod runtime;
pub mod selection;
pub mod stats;
pub mod stopwatch;
pub mod store;
pub mod time_series;
pub mod ui;
pub mod util;

pub use format::format_duration;
pub use record::{Category, TimerRecord};
pub use store::{RecordIndex, RecordStore, StoreError};
