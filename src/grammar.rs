//! Parallel rewriting of the axiom under a single `F` production.
//!
//! Every `F` in the current string is replaced by the rule body; every other
//! character is copied through unchanged. Iterating zero times returns the
//! axiom verbatim.

use crate::error::{Result, TreeError};
use crate::turtle::FORWARD;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Candidate tree rules. Picking one of them between regenerations is left to the caller.
pub const PRESET_RULES: [&str; 5] = [
    "FF+[+F-F-F]-[-F+F+F]",
    "F+F-F-F+F",
    "FF+[+F-F]-[-F+F]",
    "F+F+[F-F]-[F+F]",
    "F-F+[F+F]-[F-F]",
];

/// An axiom plus the body that every `F` rewrites to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Grammar {
    pub axiom: String,
    pub rule: String,
}

impl Default for Grammar {
    fn default() -> Self {
        Self {
            axiom: FORWARD.to_string(),
            rule: PRESET_RULES[0].to_string(),
        }
    }
}

impl Grammar {
    /// Creates a grammar from an axiom and the body `F` rewrites to.
    pub fn new(axiom: impl Into<String>, rule: impl Into<String>) -> Self {
        Self {
            axiom: axiom.into(),
            rule: rule.into(),
        }
    }

    /// See [`expand`].
    pub fn expand(&self, iterations: u32) -> String {
        expand(&self.axiom, &self.rule, iterations)
    }

    /// See [`expand_bounded`].
    pub fn expand_bounded(&self, iterations: u32, max_len: usize) -> Result<String> {
        expand_bounded(&self.axiom, &self.rule, iterations, max_len)
    }
}

/// Rewrites `axiom` `iterations` times, replacing each `F` with `rule`.
///
/// Output length grows exponentially with the number of `F`s in `rule`; callers
/// that take `iterations` from untrusted input should use [`expand_bounded`].
pub fn expand(axiom: &str, rule: &str, iterations: u32) -> String {
    let mut current = axiom.to_string();

    // `F -> F` rewrites every string to itself.
    let identity = rule.len() == 1 && rule.starts_with(FORWARD);
    let iterations = if identity { 0 } else { iterations };

    for _ in 0..iterations {
        // Once no `F` is left every further pass is the identity.
        if !current.contains(FORWARD) {
            break;
        }
        let mut next = String::with_capacity(current.len());
        for c in current.chars() {
            if c == FORWARD {
                next.push_str(rule);
            } else {
                next.push(c);
            }
        }
        current = next;
    }

    debug!(iterations, symbols = current.chars().count(), "expanded L-System");
    current
}

/// Predicts the symbol count of `expand(axiom, rule, iterations)` without building it.
///
/// Returns `None` if the count does not fit in a `usize`.
pub fn expanded_len(axiom: &str, rule: &str, iterations: u32) -> Option<usize> {
    predict_len(axiom, rule, iterations, usize::MAX)
}

/// Like [`expand`] but refuses to allocate more than `max_len` symbols.
///
/// The final length is predicted up front, so an oversized request fails
/// before any rewriting happens.
pub fn expand_bounded(axiom: &str, rule: &str, iterations: u32, max_len: usize) -> Result<String> {
    match predict_len(axiom, rule, iterations, max_len) {
        Some(required) if required <= max_len => Ok(expand(axiom, rule, iterations)),
        Some(required) => Err(TreeError::ExpansionTooLong {
            required,
            limit: max_len,
        }),
        None => Err(TreeError::ExpansionTooLong {
            required: usize::MAX,
            limit: max_len,
        }),
    }
}

/// Length recurrence: `len' = len + forwards * (rule_len - 1)`, `forwards' = forwards * k`.
///
/// Stops early once the length passes `cap`, returning the first length above it
/// (a lower bound on the true length in that case).
fn predict_len(axiom: &str, rule: &str, iterations: u32, cap: usize) -> Option<usize> {
    let count_forwards = |s: &str| s.chars().filter(|&c| c == FORWARD).count();

    let mut len = axiom.chars().count();
    let mut forwards = count_forwards(axiom);
    let rule_len = rule.chars().count();
    let k = count_forwards(rule);

    if k == 1 {
        // Linear growth, forwards stays constant.
        let per_pass = forwards.checked_mul(rule_len)?.checked_sub(forwards)?;
        return per_pass.checked_mul(iterations as usize)?.checked_add(len);
    }

    for _ in 0..iterations {
        if forwards == 0 || len > cap {
            break;
        }
        len = (len - forwards).checked_add(forwards.checked_mul(rule_len)?)?;
        forwards = forwards.checked_mul(k)?;
    }
    Some(len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_iterations_is_identity() {
        assert_eq!(expand("F[+F]x", "FF", 0), "F[+F]x");
    }

    #[test]
    fn single_pass_replaces_every_forward() {
        assert_eq!(expand("F", "F+F-F", 1), "F+F-F");
        assert_eq!(expand("F", "F[+F]F", 1), "F[+F]F");
        assert_eq!(expand("F+F", "FF", 1), "FF+FF");
    }

    #[test]
    fn two_passes_nest_the_rule() {
        assert_eq!(expand("F", "F+F", 2), "F+F+F+F");
    }

    #[test]
    fn literals_are_copied_through() {
        assert_eq!(expand("AfF", "FB", 2), "AfFBB");
    }

    #[test]
    fn empty_rule_erases_forwards() {
        assert_eq!(expand("F[F]+F", "", 3), "[]+");
        assert_eq!(expand("", "FF", 4), "");
    }

    #[test]
    fn predicted_length_matches_expansion() {
        for rule in PRESET_RULES {
            for n in 0..4 {
                let expanded = expand("F", rule, n);
                assert_eq!(expanded_len("F", rule, n), Some(expanded.chars().count()));
            }
        }
        assert_eq!(expanded_len("F+F", "F-", 5), Some(13));
        assert_eq!(expanded_len("F+F", "", 5), Some(1));
    }

    #[test]
    fn bounded_expansion_rejects_oversized_output() {
        let err = expand_bounded("F", "FF", 20, 1000).unwrap_err();
        match err {
            TreeError::ExpansionTooLong { required, limit } => {
                assert_eq!(limit, 1000);
                assert!(required > 1000);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(expand_bounded("F", "FF", 3, 8).unwrap(), "FFFFFFFF");
    }

    #[test]
    fn overflowing_prediction_is_reported() {
        assert_eq!(expanded_len("F", "FFFF", 200), None);
        assert!(matches!(
            expand_bounded("F", "FFFF", 200, 1 << 20),
            Err(TreeError::ExpansionTooLong { .. })
        ));
    }

    #[test]
    fn identity_rule_skips_rewriting() {
        assert_eq!(expand("F+F", "F", u32::MAX), "F+F");
        assert_eq!(expanded_len("F+F", "F", u32::MAX), Some(3));
        assert_eq!(expand_bounded("F", "F", u32::MAX, 1).unwrap(), "F");
    }

    #[test]
    fn grammar_default_uses_first_preset() {
        let grammar = Grammar::default();
        assert_eq!(grammar.axiom, "F");
        assert_eq!(grammar.expand(1), PRESET_RULES[0]);
    }
}
