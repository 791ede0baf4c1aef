//! Application shell.
//!
//! `Playground` owns the backend, the UI and every GPU object, and runs one
//! frame at a time. Hosting it in a window is `window::Runtime`'s job.

mod config;
mod control;
mod shell;

pub use config::PlaygroundConfig;
pub use control::AppControl;
pub use shell::Playground;
