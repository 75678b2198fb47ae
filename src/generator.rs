//! Config-driven pipeline: expand the grammar, then interpret it.

use crate::error::{Result, TreeError};
use crate::grammar::Grammar;
use crate::interpreter::{
    DEFAULT_MAX_STACK_DEPTH, GenerationContext, ParentRestore, TurtleInterpreter, TurtleParams,
};
use crate::skeleton::TreeSkeleton;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default upper bound on the expanded symbol count.
pub const DEFAULT_MAX_SYMBOLS: usize = 500_000;

/// Default upper bound on rewriting passes.
pub const DEFAULT_MAX_ITERATIONS: u32 = 32;

/// Everything needed to grow one tree.
///
/// Missing fields fall back to their defaults when deserializing, so a config
/// file only has to name what it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    pub grammar: Grammar,
    pub iterations: u32,
    /// Requests for more passes than this fail before any rewriting. Keeps
    /// rules with a single `F`, which grow linearly, from running for ages.
    pub max_iterations: u32,
    pub turtle: TurtleParams,
    /// Expansion fails instead of producing more symbols than this.
    pub max_symbols: usize,
    pub max_stack_depth: usize,
    pub parent_restore: ParentRestore,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            grammar: Grammar::default(),
            iterations: 2,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            turtle: TurtleParams::default(),
            max_symbols: DEFAULT_MAX_SYMBOLS,
            max_stack_depth: DEFAULT_MAX_STACK_DEPTH,
            parent_restore: ParentRestore::default(),
        }
    }
}

impl TreeConfig {
    /// Parses a (possibly partial) JSON config.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builds the interpreter these settings describe.
    pub fn interpreter(&self) -> TurtleInterpreter {
        TurtleInterpreter::new(self.turtle.clone())
            .with_max_stack_depth(self.max_stack_depth)
            .with_parent_restore(self.parent_restore)
    }
}

/// Grows tree skeletons from a [`TreeConfig`].
///
/// The caller owns every returned skeleton; regenerating never touches a
/// previous one.
#[derive(Clone, Debug, Default)]
pub struct TreeGenerator {
    config: TreeConfig,
    ctx: GenerationContext,
}

impl TreeGenerator {
    /// Creates a generator whose first tree starts numbering at 0.
    pub fn new(config: TreeConfig) -> Self {
        Self {
            config,
            ctx: GenerationContext::new(),
        }
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Lets the caller pick another rule or parameters between regenerations.
    pub fn config_mut(&mut self) -> &mut TreeConfig {
        &mut self.config
    }

    /// Expands the grammar and returns the symbol string the turtle would read.
    pub fn expand(&self) -> Result<String> {
        let iterations = self.config.iterations;
        let max_iterations = self.config.max_iterations;
        if iterations > max_iterations {
            return Err(TreeError::TooManyIterations {
                requested: iterations,
                limit: max_iterations,
            });
        }
        self.config
            .grammar
            .expand_bounded(iterations, self.config.max_symbols)
    }

    /// Grows a fresh tree. Segment ids restart at 0 on every call.
    pub fn generate(&mut self) -> Result<TreeSkeleton> {
        self.ctx.reset();
        let mut ctx = std::mem::take(&mut self.ctx);
        let result = self.generate_with(&mut ctx);
        self.ctx = ctx;
        result
    }

    /// Grows a tree drawing ids from `ctx`, so several trees can share one numbering.
    pub fn generate_with(&self, ctx: &mut GenerationContext) -> Result<TreeSkeleton> {
        let symbols = self.expand()?;
        let tree = self.config.interpreter().interpret(&symbols, ctx)?;
        debug!(
            rule = %self.config.grammar.rule,
            iterations = self.config.iterations,
            segments = tree.len(),
            leaves = tree.leaves().count(),
            "generated tree"
        );
        Ok(tree)
    }
}
