//! Input subsystem.
//!
//! The runtime translates winit window events into `Event`s and queues them;
//! the shell drains the queue once per frame.

mod event;
mod types;

pub use event::{Event, EventKind, EventQueue};
pub use types::Key;
