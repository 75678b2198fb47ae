//! Property-based tests for expansion and turtle interpretation.

use proptest::prelude::*;
use std::collections::HashSet;
use symbios_tree::{
    GenerationContext, TreeError, TurtleInterpreter, TurtleParams, expand, expanded_len,
    validate_brackets,
};

fn count_forwards(s: &str) -> usize {
    s.chars().filter(|&c| c == 'F').count()
}

fn interpreter() -> TurtleInterpreter {
    TurtleInterpreter::new(TurtleParams {
        step_length: 1.0,
        turn_angle_degrees: 25.0,
        start_width: 1.0,
        width_decay: 0.9,
        ..Default::default()
    })
}

/// Generate a flat run of non-bracket symbols, literals included
fn flat_strategy() -> impl Strategy<Value = String> {
    "[Ff+\\-XA]{0,6}"
}

/// Generate a bracket-balanced turtle program
fn balanced_strategy() -> impl Strategy<Value = String> {
    flat_strategy().prop_recursive(4, 64, 4, |inner| {
        prop::collection::vec(
            prop_oneof![
                inner.clone().prop_map(|s| format!("[{s}]")),
                flat_strategy(),
            ],
            1..4,
        )
        .prop_map(|parts| parts.concat())
    })
}

proptest! {
    #[test]
    fn zero_iterations_is_identity(
        axiom in "[Ff+\\-\\[\\]X]{0,20}",
        rule in "[Ff+\\-\\[\\]]{0,10}"
    ) {
        prop_assert_eq!(expand(&axiom, &rule, 0), axiom);
    }

    #[test]
    fn forward_count_grows_geometrically(
        axiom in "[Ff+\\-X]{0,6}",
        rule in "[Ff+\\-\\[\\]]{0,8}",
        n in 0u32..4
    ) {
        let expanded = expand(&axiom, &rule, n);
        let m = count_forwards(&axiom);
        let k = count_forwards(&rule);
        prop_assert_eq!(count_forwards(&expanded), m * k.pow(n));
        prop_assert_eq!(expanded_len(&axiom, &rule, n), Some(expanded.chars().count()));
    }

    #[test]
    fn balanced_programs_interpret_cleanly(program in balanced_strategy()) {
        prop_assert!(validate_brackets(&program).is_ok());

        let mut ctx = GenerationContext::new();
        let tree = interpreter().interpret(&program, &mut ctx).unwrap();
        prop_assert_eq!(tree.len(), count_forwards(&program));
        prop_assert_eq!(ctx.next_id() as usize, tree.len());
    }

    #[test]
    fn parents_precede_children(program in balanced_strategy()) {
        let tree = interpreter().interpret(&program, &mut GenerationContext::new()).unwrap();
        let mut seen = HashSet::new();
        for segment in tree.segments() {
            if let Some(parent) = segment.parent {
                prop_assert!(seen.contains(&parent), "parent {} not yet emitted", parent);
            }
            seen.insert(segment.id);
        }
    }

    #[test]
    fn leaf_iff_unreferenced(program in balanced_strategy()) {
        let tree = interpreter().interpret(&program, &mut GenerationContext::new()).unwrap();
        let referenced: HashSet<_> = tree.segments().iter().filter_map(|s| s.parent).collect();
        for segment in tree.segments() {
            prop_assert_eq!(tree.is_leaf(segment.id), !referenced.contains(&segment.id));
        }
    }

    #[test]
    fn interpretation_is_deterministic(program in balanced_strategy()) {
        let a = interpreter().interpret(&program, &mut GenerationContext::new()).unwrap();
        let b = interpreter().interpret(&program, &mut GenerationContext::new()).unwrap();
        prop_assert_eq!(a.segments(), b.segments());
    }

    #[test]
    fn early_close_is_malformed(prefix in flat_strategy(), program in balanced_strategy()) {
        let bad = format!("{prefix}]{program}");
        let result = interpreter().interpret(&bad, &mut GenerationContext::new());
        let is_malformed = matches!(result, Err(TreeError::MalformedSequence { .. }));
        prop_assert!(is_malformed);
    }
}
