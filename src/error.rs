//! Error taxonomy shared by the expander, the interpreter and the generator.

/// Everything that can go wrong while turning a grammar into a [`crate::TreeSkeleton`].
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// A `]` was found while the state stack was empty.
    #[error("unbalanced branch markers: `]` at symbol {position} has no matching `[`")]
    MalformedSequence { position: usize },

    /// Expansion would produce more symbols than the configured maximum.
    ///
    /// Prediction stops once the limit is passed, so `required` is a lower
    /// bound on the full length, not the exact count.
    #[error("expansion needs at least {required} symbols, limit is {limit}")]
    ExpansionTooLong {
        required: usize,
        limit: usize,
    },

    /// More rewriting passes were requested than the configured maximum.
    #[error("{requested} iterations requested, limit is {limit}")]
    TooManyIterations {
        requested: u32,
        limit: u32,
    },

    /// Branch nesting went deeper than the configured stack limit.
    #[error("branch nesting exceeds the maximum stack depth of {limit}")]
    StackTooDeep { limit: usize },

    /// The context handed out its last segment id.
    #[error("segment ids exhausted: the generation context cannot number another segment")]
    IdsExhausted,

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        name: &'static str,
        reason: String,
    },

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TreeError>;

impl TreeError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
