//! Property-based tests for line de-duplication
//!
//! Checks that block structure survives de-duplication, that the result is a
//! subsequence of the input, and that running it twice changes nothing.

use proptest::prelude::*;
use sdvgen_codegen::emit::{Line, dedup};

// Strategy: a small vocabulary so repeats are common
fn arb_line() -> impl Strategy<Value = Line> {
    prop_oneof![
        (0..4usize).prop_map(|n| Line::decl(format!("jclass cls_T{n} = findClass(env, \"p/T{n}\");"))),
        (0..4usize, 0..2usize).prop_map(|(n, v)| Line::decl(format!("jmethodID ctor_T{n} = lookup{v};"))),
        (0..6usize).prop_map(|n| Line::code(format!("env->DeleteLocalRef(v{n});"))),
        Just(Line::code("return {};")),
        Just(Line::code("if (env->ExceptionCheck()) {")),
        Just(Line::code("}")),
    ]
}

fn texts(lines: &[Line]) -> Vec<String> {
    lines.iter().map(|l| l.text().to_string()).collect()
}

fn is_structural(text: &str) -> bool {
    text.contains('{') || text.contains('}')
}

proptest! {
    /// Property: every line opening or closing a block is kept, in order
    #[test]
    fn proptest_structural_lines_preserved(lines in prop::collection::vec(arb_line(), 0..40)) {
        let before: Vec<String> = texts(&lines).into_iter().filter(|t| is_structural(t)).collect();

        let after: Vec<String> = texts(&dedup(lines)).into_iter().filter(|t| is_structural(t)).collect();

        prop_assert_eq!(before, after);
    }

    /// Property: output is an order-preserving subsequence of the input
    #[test]
    fn proptest_output_is_subsequence(lines in prop::collection::vec(arb_line(), 0..40)) {
        let input = texts(&lines);
        let output = texts(&dedup(lines));

        let mut remaining = input.iter();
        for text in &output {
            prop_assert!(remaining.any(|candidate| candidate == text));
        }
    }

    /// Property: de-duplicating twice equals de-duplicating once
    #[test]
    fn proptest_dedup_idempotent(lines in prop::collection::vec(arb_line(), 0..40)) {
        let once = dedup(lines);
        let twice = dedup(once.clone());

        prop_assert_eq!(once, twice);
    }

    /// Property: no non-structural text survives twice
    #[test]
    fn proptest_plain_lines_unique(lines in prop::collection::vec(arb_line(), 0..40)) {
        let output = texts(&dedup(lines));
        let plain: Vec<&String> = output.iter().filter(|t| !is_structural(t)).collect();
        let unique: std::collections::HashSet<&String> = plain.iter().copied().collect();

        prop_assert_eq!(plain.len(), unique.len());
    }
}
