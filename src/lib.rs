//! # symbios-tree
//!
//! Grows engine-agnostic tree skeletons from bracketed L-Systems.
//!
//! Generation runs in two sequential stages. The [`grammar`] module rewrites an
//! axiom under a single `F` production; the [`interpreter`] walks the result with
//! a stack-based turtle and emits a [`TreeSkeleton`]: tapered line segments with
//! parent links, ready for a renderer or scene graph to instantiate.
//!
//! ```rust
//! use symbios_tree::{GenerationContext, TurtleInterpreter, TurtleParams, expand};
//!
//! let symbols = expand("F", "F[+F]F", 1);
//! let interpreter = TurtleInterpreter::new(TurtleParams::default());
//! let tree = interpreter.interpret(&symbols, &mut GenerationContext::new())?;
//! assert_eq!(tree.len(), 3);
//! assert_eq!(tree.leaves().count(), 2);
//! # Ok::<(), symbios_tree::TreeError>(())
//! ```

pub mod error;
pub mod generator;
pub mod grammar;
pub mod interpreter;
pub mod skeleton;
pub mod turtle;

pub use error::*;
pub use generator::*;
pub use grammar::*;
pub use interpreter::*;
pub use skeleton::*;
pub use turtle::*;
