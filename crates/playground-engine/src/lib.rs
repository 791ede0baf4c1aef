//! Playground engine crate.
//!
//! A single-window rendering playground: device bootstrap, render target,
//! a fixed triangle pipeline and an egui debug overlay, driven one frame at a
//! time by `core::Playground` inside `window::Runtime`.

pub mod core;
pub mod device;
pub mod input;
pub mod logging;
pub mod render;
pub mod ui;
pub mod window;

#[cfg(test)]
mod testing;
