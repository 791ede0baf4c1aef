use std::collections::VecDeque;

use winit::dpi::PhysicalSize;
use winit::event::{ElementState, WindowEvent};

use super::types::{map_key, Key};

/// What the shell does with an event.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum EventKind {
    Quit,
    KeyDown(Key),
    /// New client size in physical pixels.
    WindowResized { width: u32, height: u32 },
    /// Not handled by the shell; still forwarded to the UI.
    Other,
}

/// One queued window event.
///
/// `native` keeps the original winit event for the UI backend; synthetic
/// events have none.
#[derive(Debug, Clone)]
pub struct Event {
    pub kind: EventKind,
    pub native: Option<WindowEvent>,
}

impl Event {
    pub fn new(kind: EventKind) -> Self {
        Self { kind, native: None }
    }

    /// Classifies a winit event. `inner_size` is the window's current client
    /// size, used for scale-factor changes.
    pub fn from_window_event(event: &WindowEvent, inner_size: PhysicalSize<u32>) -> Self {
        let kind = match event {
            WindowEvent::CloseRequested => EventKind::Quit,

            WindowEvent::KeyboardInput { event: key, .. }
                if key.state == ElementState::Pressed && !key.repeat =>
            {
                EventKind::KeyDown(map_key(key.physical_key))
            }

            WindowEvent::Resized(size) => EventKind::WindowResized {
                width: size.width,
                height: size.height,
            },

            WindowEvent::ScaleFactorChanged { .. } => EventKind::WindowResized {
                width: inner_size.width,
                height: inner_size.height,
            },

            _ => EventKind::Other,
        };

        Self {
            kind,
            native: Some(event.clone()),
        }
    }
}

/// FIFO of events waiting for the next pump.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<Event>,
}

impl EventQueue {
    pub fn push(&mut self, event: Event) {
        self.events.push_back(event);
    }

    pub fn pop(&mut self) -> Option<Event> {
        self.events.pop_front()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_request_is_quit() {
        let ev = Event::from_window_event(&WindowEvent::CloseRequested, PhysicalSize::new(1, 1));
        assert_eq!(ev.kind, EventKind::Quit);
        assert!(ev.native.is_some());
    }

    #[test]
    fn resize_carries_physical_size() {
        let ev = Event::from_window_event(
            &WindowEvent::Resized(PhysicalSize::new(1024, 768)),
            PhysicalSize::new(800, 600),
        );
        assert_eq!(ev.kind, EventKind::WindowResized { width: 1024, height: 768 });
    }

    #[test]
    fn unrelated_events_are_other() {
        let ev = Event::from_window_event(&WindowEvent::Focused(true), PhysicalSize::new(1, 1));
        assert_eq!(ev.kind, EventKind::Other);
    }

    #[test]
    fn queue_is_fifo() {
        let mut q = EventQueue::default();
        q.push(Event::new(EventKind::Other));
        q.push(Event::new(EventKind::Quit));
        assert_eq!(q.len(), 2);
        assert_eq!(q.pop().map(|e| e.kind), Some(EventKind::Other));
        assert_eq!(q.pop().map(|e| e.kind), Some(EventKind::Quit));
        assert!(q.is_empty());
    }
}
