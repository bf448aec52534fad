//! Pointer state tracking
//!
//! Hosts feed raw pointer events in; the tick reads the latest position for
//! hover and drains queued primary presses for click handling. Events arriving
//! between ticks are buffered so none are applied mid-draw.

use crate::core::types::Vec2;

/// Pointer event delivered by the host window system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    /// Pointer moved to a position in surface pixels.
    Moved(Vec2),
    /// Primary button pressed at a position, on the render surface.
    PrimaryDown(Vec2),
    /// Pointer left the render surface.
    Left,
}

/// Tracks the pointer across frames.
pub struct PointerState {
    /// Last known position, `None` while the pointer is outside the surface.
    position: Option<Vec2>,
    /// Primary presses since the last drain, in arrival order.
    pending_presses: Vec<Vec2>,
}

impl PointerState {
    pub fn new() -> Self {
        Self {
            position: None,
            pending_presses: Vec::new(),
        }
    }

    /// Process a pointer event
    pub fn process_event(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Moved(p) => self.position = Some(p),
            PointerEvent::PrimaryDown(p) => {
                self.position = Some(p);
                self.pending_presses.push(p);
            }
            PointerEvent::Left => self.position = None,
        }
    }

    /// Current pointer position, if over the surface.
    pub fn position(&self) -> Option<Vec2> {
        self.position
    }

    /// Take all presses queued since the previous call.
    pub fn drain_presses(&mut self) -> Vec<Vec2> {
        std::mem::take(&mut self.pending_presses)
    }
}

impl Default for PointerState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_and_leave() {
        let mut pointer = PointerState::new();
        assert!(pointer.position().is_none());

        pointer.process_event(PointerEvent::Moved(Vec2::new(3.0, 4.0)));
        assert_eq!(pointer.position(), Some(Vec2::new(3.0, 4.0)));

        pointer.process_event(PointerEvent::Left);
        assert!(pointer.position().is_none());
    }

    #[test]
    fn test_presses_drain_in_order() {
        let mut pointer = PointerState::new();
        pointer.process_event(PointerEvent::PrimaryDown(Vec2::new(1.0, 1.0)));
        pointer.process_event(PointerEvent::PrimaryDown(Vec2::new(2.0, 2.0)));

        let presses = pointer.drain_presses();
        assert_eq!(presses, vec![Vec2::new(1.0, 1.0), Vec2::new(2.0, 2.0)]);
        assert!(pointer.drain_presses().is_empty());
        assert_eq!(pointer.position(), Some(Vec2::new(2.0, 2.0)));
    }
}
