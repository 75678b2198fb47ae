//! Turtle state and the symbol alphabet it understands.

use crate::skeleton::SegmentId;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Draw a segment and move forward.
pub const FORWARD: char = 'F';
/// Move forward without drawing.
pub const NOTHING: char = 'f';
/// Turn by `+angle` around the rotation axis.
pub const PLUS: char = '+';
/// Turn by `-angle` around the rotation axis.
pub const MINUS: char = '-';
/// Save the turtle state.
pub const BRANCH_LEFT: char = '[';
/// Restore the most recently saved turtle state.
pub const BRANCH_RIGHT: char = ']';

/// The state of the tree-drawing turtle.
///
/// `Copy`, so a snapshot pushed at `[` is independent of the live state.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurtleState {
    /// Current world-space position of the cursor.
    pub position: Vec3,

    /// Current heading, kept at unit length.
    pub direction: Vec3,

    /// Width the next segment starts with.
    pub width: f32,

    /// The segment most recently drawn in this state.
    /// The NEXT drawn segment becomes its child.
    pub current_owner: Option<SegmentId>,
}

impl Default for TurtleState {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            direction: Vec3::Y,
            width: 1.0,
            current_owner: None,
        }
    }
}

impl TurtleState {
    /// Moves the cursor `distance` units along the current heading.
    pub fn advance(&mut self, distance: f32) {
        self.position += self.direction * distance;
    }

    /// Rotates the heading around the world-space `axis` by `angle` radians.
    ///
    /// `axis` must be normalized.
    pub fn turn(&mut self, axis: Vec3, angle: f32) {
        let rot = Quat::from_axis_angle(axis, angle);
        self.direction = (rot * self.direction).normalize_or(self.direction);
    }
}

/// Operations that can be performed by the tree turtle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TurtleOp {
    /// Spawn a segment and advance (`F`).
    Draw,
    /// Advance without spawning geometry (`f`).
    Move,
    /// Rotate around the growth-plane normal (`+`/`-`), carrying the sign.
    Turn(f32),
    /// Save the full turtle state onto the stack (`[`).
    Push,
    /// Restore the most recently pushed turtle state (`]`).
    Pop,
    /// No-op, symbol has no registered meaning.
    Ignore,
}

impl TurtleOp {
    /// Maps a symbol to its operation; unknown characters become [`TurtleOp::Ignore`].
    pub fn from_char(c: char) -> Self {
        match c {
            FORWARD => Self::Draw,
            NOTHING => Self::Move,
            PLUS => Self::Turn(1.0),
            MINUS => Self::Turn(-1.0),
            BRANCH_LEFT => Self::Push,
            BRANCH_RIGHT => Self::Pop,
            _ => Self::Ignore,
        }
    }

    /// The conventional symbol for each operation, used to resolve symbol tables.
    pub(crate) const STANDARD_SYMBOLS: [(&'static str, TurtleOp); 6] = [
        ("F", TurtleOp::Draw),
        ("f", TurtleOp::Move),
        ("+", TurtleOp::Turn(1.0)),
        ("-", TurtleOp::Turn(-1.0)),
        ("[", TurtleOp::Push),
        ("]", TurtleOp::Pop),
    ];
}
