//! Interpreter that converts an L-System symbol sequence into a [`TreeSkeleton`].
//!
//! The entry point is [`TurtleInterpreter`]. Configure it with [`TurtleParams`],
//! then call [`TurtleInterpreter::interpret`] with an expanded string, or
//! [`TurtleInterpreter::interpret_state`] with a [`symbios::SymbiosState`].
//! Segment ids come from a caller-owned [`GenerationContext`].

use crate::error::{Result, TreeError};
use crate::skeleton::{Segment, SegmentId, TreeSkeleton};
use crate::turtle::{TurtleOp, TurtleState};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use symbios::{SymbiosState, SymbolTable};
use tracing::{debug, warn};

/// Default cap on `[` nesting.
pub const DEFAULT_MAX_STACK_DEPTH: usize = 1024;

/// Geometric parameters of a turtle run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurtleParams {
    /// Distance covered by `F` and `f`. Must be positive.
    pub step_length: f32,
    /// Angle applied by `+` and `-`, in degrees.
    pub turn_angle_degrees: f32,
    /// Width of the first segment. Must not be negative.
    pub start_width: f32,
    /// Each drawn segment multiplies the width by this factor.
    pub width_decay: f32,
    pub start_position: Vec3,
    /// Initial heading. Normalized before use.
    pub start_direction: Vec3,
    /// Normal of the growth plane. A `+` turn rotates the heading
    /// counter-clockwise around it.
    pub rotation_axis: Vec3,
}

impl Default for TurtleParams {
    fn default() -> Self {
        Self {
            step_length: 2.0,
            turn_angle_degrees: 20.0,
            start_width: 0.8,
            width_decay: 0.9,
            start_position: Vec3::ZERO,
            start_direction: Vec3::Y,
            // `+` turns +Y toward +X.
            rotation_axis: Vec3::NEG_Z,
        }
    }
}

impl TurtleParams {
    /// Checks every parameter, returning a copy with unit-length direction and axis.
    pub fn validated(&self) -> Result<Self> {
        check_step_length(self.step_length)?;
        check_turn_angle(self.turn_angle_degrees)?;
        if !self.start_width.is_finite() || self.start_width < 0.0 {
            return Err(TreeError::invalid(
                "start_width",
                format!("must be non-negative and finite, got {}", self.start_width),
            ));
        }
        if !self.width_decay.is_finite() || self.width_decay < 0.0 {
            return Err(TreeError::invalid(
                "width_decay",
                format!("must be non-negative and finite, got {}", self.width_decay),
            ));
        }
        if !self.start_position.is_finite() {
            return Err(TreeError::invalid("start_position", "must be finite"));
        }
        let start_direction = self.start_direction.try_normalize().ok_or_else(|| {
            TreeError::invalid("start_direction", "must be a non-zero finite vector")
        })?;
        let rotation_axis = self.rotation_axis.try_normalize().ok_or_else(|| {
            TreeError::invalid("rotation_axis", "must be a non-zero finite vector")
        })?;

        Ok(Self {
            start_direction,
            rotation_axis,
            ..self.clone()
        })
    }
}

fn check_step_length(value: f32) -> Result<f32> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(TreeError::invalid(
            "step_length",
            format!("must be positive and finite, got {value}"),
        ))
    }
}

fn check_turn_angle(value: f32) -> Result<f32> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(TreeError::invalid(
            "turn_angle_degrees",
            format!("must be finite, got {value}"),
        ))
    }
}

/// Per-symbol parameters obey the same rules as the defaults they replace.
fn check_overrides(ops: &[(TurtleOp, Option<f32>)]) -> Result<()> {
    for &(op, param) in ops {
        let Some(value) = param else { continue };
        match op {
            TurtleOp::Draw | TurtleOp::Move => {
                check_step_length(value)?;
            }
            TurtleOp::Turn(_) => {
                check_turn_angle(value)?;
            }
            _ => {}
        }
    }
    Ok(())
}

/// Which segment owns new children after a `]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParentRestore {
    /// The owner stored in the restored snapshot. Siblings on either side of a
    /// bracket share the segment drawn before the `[`.
    #[default]
    Snapshot,
    /// The owner stored in the snapshot left on top of the stack after the pop,
    /// or none when the stack is empty.
    StackTop,
}

/// Per-run identifier allocator.
///
/// Owned by the caller so independent runs never share a counter. Reuse one
/// context across runs to keep ids unique across all of them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GenerationContext {
    next_id: SegmentId,
}

impl GenerationContext {
    /// Creates a context whose first segment gets id 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context whose first segment gets `first_id`.
    pub fn starting_at(first_id: SegmentId) -> Self {
        Self { next_id: first_id }
    }

    /// The id the next drawn segment will receive.
    pub fn next_id(&self) -> SegmentId {
        self.next_id
    }

    /// Restarts numbering at 0, for a full regeneration.
    pub fn reset(&mut self) {
        self.next_id = 0;
    }
}

/// Scans `symbols` for bracket balance without interpreting them.
///
/// Returns the deepest nesting level reached. Fails at the first `]` that
/// has no open `[`. Unclosed `[` are accepted.
pub fn validate_brackets(symbols: &str) -> Result<usize> {
    check_nesting(symbols.chars().map(TurtleOp::from_char), usize::MAX)
}

fn check_nesting(ops: impl Iterator<Item = TurtleOp>, max_stack_depth: usize) -> Result<usize> {
    let mut depth = 0usize;
    let mut deepest = 0usize;
    for (position, op) in ops.enumerate() {
        match op {
            TurtleOp::Push => {
                if depth >= max_stack_depth {
                    return Err(TreeError::StackTooDeep {
                        limit: max_stack_depth,
                    });
                }
                depth += 1;
                deepest = deepest.max(depth);
            }
            TurtleOp::Pop => {
                depth = depth
                    .checked_sub(1)
                    .ok_or(TreeError::MalformedSequence { position })?;
            }
            _ => {}
        }
    }
    Ok(deepest)
}

/// Interprets L-System output to build a TreeSkeleton.
#[derive(Clone, Debug)]
pub struct TurtleInterpreter {
    params: TurtleParams,
    max_stack_depth: usize,
    parent_restore: ParentRestore,
}

impl TurtleInterpreter {
    /// Creates an interpreter with the default stack depth and [`ParentRestore::Snapshot`].
    pub fn new(params: TurtleParams) -> Self {
        Self {
            params,
            max_stack_depth: DEFAULT_MAX_STACK_DEPTH,
            parent_restore: ParentRestore::default(),
        }
    }

    /// Sets the deepest `[` nesting accepted before a run fails (builder pattern).
    pub fn with_max_stack_depth(mut self, max_stack_depth: usize) -> Self {
        self.max_stack_depth = max_stack_depth;
        self
    }

    /// Sets how the owner is chosen after `]` (builder pattern).
    pub fn with_parent_restore(mut self, parent_restore: ParentRestore) -> Self {
        self.parent_restore = parent_restore;
        self
    }

    /// Returns the geometric parameters, as given (not normalized).
    pub fn params(&self) -> &TurtleParams {
        &self.params
    }

    /// Interprets an expanded symbol string.
    ///
    /// Characters outside the turtle alphabet are ignored.
    pub fn interpret(&self, symbols: &str, ctx: &mut GenerationContext) -> Result<TreeSkeleton> {
        self.interpret_ops(symbols.chars().map(|c| (TurtleOp::from_char(c), None)), ctx)
    }

    /// Interprets a [`SymbiosState`] derivation.
    ///
    /// `F f + - [ ]` are looked up in `interner`; symbols missing from it are
    /// never produced, every other id is ignored. The first module parameter,
    /// when present, replaces the step length (`F`, `f`) or the angle in degrees (`+`, `-`).
    pub fn interpret_state(
        &self,
        state: &SymbiosState,
        interner: &SymbolTable,
        ctx: &mut GenerationContext,
    ) -> Result<TreeSkeleton> {
        let mut op_map: Vec<TurtleOp> = Vec::new();
        for (sym, op) in TurtleOp::STANDARD_SYMBOLS {
            if let Some(id) = interner.resolve_id(sym) {
                let idx = id as usize;
                if idx >= op_map.len() {
                    op_map.resize(idx + 1, TurtleOp::Ignore);
                }
                op_map[idx] = op;
            }
        }

        let ops = (0..state.len())
            .map_while(|i| state.get_view(i))
            .map(|view| {
                let op = op_map
                    .get(view.sym as usize)
                    .copied()
                    .unwrap_or(TurtleOp::Ignore);
                (op, view.params.first().map(|&x| x as f32))
            });
        self.interpret_ops(ops, ctx)
    }

    /// Walks `ops` in order and returns the drawn segments.
    ///
    /// Parameters, per-symbol overrides and bracket balance are checked before
    /// the first op runs. On error nothing is returned and `ctx` is left untouched.
    ///
    /// # Push / Pop
    ///
    /// `[` saves the full turtle state (position, direction, width, owner).
    /// `]` restores it, then picks the owner according to [`ParentRestore`].
    pub fn interpret_ops<I>(&self, ops: I, ctx: &mut GenerationContext) -> Result<TreeSkeleton>
    where
        I: IntoIterator<Item = (TurtleOp, Option<f32>)>,
    {
        let params = self
            .params
            .validated()
            .inspect_err(|e| warn!("rejected turtle parameters: {e}"))?;
        let ops: Vec<(TurtleOp, Option<f32>)> = ops.into_iter().collect();
        check_overrides(&ops).inspect_err(|e| warn!("rejected symbol parameter: {e}"))?;
        let max_depth = check_nesting(ops.iter().map(|&(op, _)| op), self.max_stack_depth)
            .inspect_err(|e| warn!("rejected turtle program: {e}"))?;

        let mut turtle = TurtleState {
            position: params.start_position,
            direction: params.start_direction,
            width: params.start_width,
            current_owner: None,
        };
        let mut stack: Vec<TurtleState> = Vec::with_capacity(max_depth);
        let mut segments = Vec::new();
        let mut next_id = ctx.next_id;

        for (position, (op, param)) in ops.into_iter().enumerate() {
            match op {
                TurtleOp::Draw => {
                    let id = next_id;
                    next_id = next_id.checked_add(1).ok_or(TreeError::IdsExhausted)?;

                    let start = turtle.position;
                    turtle.advance(param.unwrap_or(params.step_length));
                    let end_width = turtle.width * params.width_decay;

                    segments.push(Segment {
                        id,
                        start,
                        end: turtle.position,
                        start_width: turtle.width,
                        end_width,
                        parent: turtle.current_owner,
                    });
                    turtle.current_owner = Some(id);
                    turtle.width = end_width;
                }
                TurtleOp::Move => turtle.advance(param.unwrap_or(params.step_length)),
                TurtleOp::Turn(s) => turtle.turn(
                    params.rotation_axis,
                    param.unwrap_or(params.turn_angle_degrees).to_radians() * s,
                ),
                TurtleOp::Push => stack.push(turtle),
                TurtleOp::Pop => {
                    let Some(saved) = stack.pop() else {
                        return Err(TreeError::MalformedSequence { position });
                    };
                    turtle = saved;
                    if self.parent_restore == ParentRestore::StackTop {
                        turtle.current_owner = stack.last().and_then(|s| s.current_owner);
                    }
                }
                TurtleOp::Ignore => {}
            }
        }

        ctx.next_id = next_id;
        debug!(
            segments = segments.len(),
            max_depth,
            unclosed = stack.len(),
            "interpreted turtle program"
        );
        Ok(TreeSkeleton::from_segments(segments))
    }
}
