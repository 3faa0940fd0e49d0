//! Drawing state and the bounded save/restore stack.
//!
//! One `DrawState` is active at a time; `save` pushes a copy and
//! `restore` pops back to the previous one. The stack is bounded and
//! misuse (overflow, restore at the floor) is a logged no-op rather than
//! an error, so a broken save/restore pairing cannot take down a render
//! loop.

use tracing::warn;

use crate::basics::{CompositeOperation, CompositeOperationState, LineCap, LineJoin};
use crate::color::Color;
use crate::paint::Paint;
use crate::transform::Transform;

/// Maximum number of saved states, including the active one.
pub const MAX_STATES: usize = 32;

// ============================================================================
// Scissor
// ============================================================================

/// Scissor rectangle: a transform centered on the rect plus half-extents.
/// Negative extents mean scissoring is disabled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scissor {
    pub xform: Transform,
    pub extent: [f32; 2],
}

impl Scissor {
    pub fn none() -> Self {
        Self {
            xform: Transform::identity(),
            extent: [-1.0, -1.0],
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.extent[0] >= 0.0
    }
}

impl Default for Scissor {
    fn default() -> Self {
        Self::none()
    }
}

// ============================================================================
// DrawState
// ============================================================================

/// The full set of drawing parameters affected by save/restore.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawState {
    pub composite_operation: CompositeOperationState,
    pub shape_anti_alias: bool,
    pub fill: Paint,
    pub stroke: Paint,
    pub stroke_width: f32,
    pub miter_limit: f32,
    pub line_cap: LineCap,
    pub line_join: LineJoin,
    pub alpha: f32,
    pub xform: Transform,
    pub scissor: Scissor,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            composite_operation: CompositeOperationState::new(CompositeOperation::SourceOver),
            shape_anti_alias: true,
            fill: Paint::color(Color::WHITE),
            stroke: Paint::color(Color::BLACK),
            stroke_width: 1.0,
            miter_limit: 10.0,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            alpha: 1.0,
            xform: Transform::identity(),
            scissor: Scissor::none(),
        }
    }
}

// ============================================================================
// StateStack
// ============================================================================

/// Bounded stack of drawing states. Always holds at least one entry.
#[derive(Debug)]
pub struct StateStack {
    states: Vec<DrawState>,
}

impl StateStack {
    pub fn new() -> Self {
        let mut states = Vec::with_capacity(MAX_STATES);
        states.push(DrawState::default());
        Self { states }
    }

    pub fn current(&self) -> &DrawState {
        self.states.last().expect("state stack is never empty")
    }

    pub fn current_mut(&mut self) -> &mut DrawState {
        self.states.last_mut().expect("state stack is never empty")
    }

    /// Push a copy of the current state. Ignored when the stack is full.
    pub fn save(&mut self) {
        if self.states.len() >= MAX_STATES {
            warn!(depth = self.states.len(), "state stack overflow, save ignored");
            return;
        }
        let top = *self.current();
        self.states.push(top);
    }

    /// Pop back to the previous state. Ignored when only the initial
    /// state remains.
    pub fn restore(&mut self) {
        if self.states.len() <= 1 {
            return;
        }
        self.states.pop();
    }

    /// Reset the current state to defaults without changing the depth.
    pub fn reset(&mut self) {
        *self.current_mut() = DrawState::default();
    }

    /// Drop everything and start over with a single default state.
    pub fn clear(&mut self) {
        self.states.clear();
        self.states.push(DrawState::default());
    }

    pub fn depth(&self) -> usize {
        self.states.len()
    }
}

impl Default for StateStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let stack = StateStack::new();
        let s = stack.current();
        assert_eq!(s.fill.inner_color, Color::WHITE);
        assert_eq!(s.stroke.inner_color, Color::BLACK);
        assert_eq!(s.stroke_width, 1.0);
        assert_eq!(s.miter_limit, 10.0);
        assert_eq!(s.line_cap, LineCap::Butt);
        assert_eq!(s.line_join, LineJoin::Miter);
        assert_eq!(s.alpha, 1.0);
        assert!(s.shape_anti_alias);
        assert!(!s.scissor.is_enabled());
    }

    #[test]
    fn test_save_restore_round_trip() {
        let mut stack = StateStack::new();
        let before = *stack.current();

        stack.save();
        {
            let s = stack.current_mut();
            s.fill = Paint::color(Color::rgb(255, 0, 0));
            s.stroke_width = 7.0;
            s.miter_limit = 2.0;
            s.line_cap = LineCap::Round;
            s.line_join = LineJoin::Bevel;
            s.alpha = 0.25;
            s.xform = Transform::translation(5.0, 5.0);
            s.scissor = Scissor {
                xform: Transform::identity(),
                extent: [10.0, 10.0],
            };
        }
        stack.restore();

        assert_eq!(*stack.current(), before);
    }

    #[test]
    fn test_saved_state_does_not_alias() {
        let mut stack = StateStack::new();
        stack.save();
        stack.current_mut().fill.xform.e = 42.0;
        stack.restore();
        assert_eq!(stack.current().fill.xform.e, 0.0);
    }

    #[test]
    fn test_overflow_and_underflow() {
        let mut stack = StateStack::new();
        // 40 saves on a 32-deep stack: the last 9 are no-ops.
        for _ in 0..40 {
            stack.save();
        }
        assert_eq!(stack.depth(), MAX_STATES);

        // 40 restores leave exactly one state.
        for _ in 0..40 {
            stack.restore();
        }
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn test_reset_keeps_depth() {
        let mut stack = StateStack::new();
        stack.save();
        stack.current_mut().alpha = 0.5;
        stack.reset();
        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.current().alpha, 1.0);
    }
}
