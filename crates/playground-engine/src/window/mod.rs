//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and Window and hosts the playground in them.

mod runtime;

pub use runtime::Runtime;
