//! Nesting limit tests.
//!
//! Deep inputs run on a thread with a generous stack so the depth check, not
//! the native stack, is what stops them.

use cal_parse::{parse_str, ParseError, Position, MAX_NESTING_DEPTH};
use std::thread;

fn with_big_stack<T: Send + 'static>(f: impl FnOnce() -> T + Send + 'static) -> T {
    thread::Builder::new()
        .stack_size(64 * 1024 * 1024)
        .spawn(f)
        .unwrap()
        .join()
        .unwrap()
}

fn nested_blocks(depth: usize) -> String {
    format!(
        "main begin {}skip; {}end",
        "begin ".repeat(depth),
        "end ".repeat(depth)
    )
}

#[test]
fn moderate_nesting_works() {
    let src = nested_blocks(50);
    assert_eq!(parse_str("<test>", &src), Ok(()));
}

#[test]
fn nesting_up_to_the_limit_is_accepted() {
    let src = nested_blocks(MAX_NESTING_DEPTH);
    assert_eq!(with_big_stack(move || parse_str("<test>", &src)), Ok(()));
}

#[test]
fn nested_blocks_past_the_limit_are_rejected() {
    let src = nested_blocks(MAX_NESTING_DEPTH + 1);
    let err = with_big_stack(move || parse_str("<test>", &src)).unwrap_err();
    // `main begin ` is 11 columns, every inner `begin ` is 6
    assert_eq!(
        err,
        ParseError::TooDeep {
            limit: MAX_NESTING_DEPTH,
            position: Position::new(1, 12 + 6 * MAX_NESTING_DEPTH as u32),
        }
    );
    assert!(err.to_string().starts_with("Nesting depth exceeds 256"));
}

#[test]
fn deep_negation_is_rejected() {
    let src = format!(
        "main begin if {}a = b begin skip; end end",
        "not ".repeat(1_000)
    );
    let err = with_big_stack(move || parse_str("<test>", &src)).unwrap_err();
    assert!(matches!(err, ParseError::TooDeep { .. }), "{err:?}");
}

#[test]
fn deep_expression_blocks_are_rejected() {
    let src = format!(
        "main begin x := {}1{}; end",
        "begin ".repeat(1_000),
        " end".repeat(1_000)
    );
    let err = with_big_stack(move || parse_str("<test>", &src)).unwrap_err();
    assert!(matches!(err, ParseError::TooDeep { .. }), "{err:?}");
}

#[test]
fn deep_parenthesised_conditions_are_rejected() {
    let src = format!(
        "main begin while {}a = b{} begin skip; end end",
        "(".repeat(1_000),
        ")".repeat(1_000)
    );
    let err = with_big_stack(move || parse_str("<test>", &src)).unwrap_err();
    assert!(matches!(err, ParseError::TooDeep { .. }), "{err:?}");
}

#[test]
fn long_flat_condition_chains_do_not_nest() {
    let mut src = String::from("main begin if a = b");
    for _ in 0..10_000 {
        src.push_str(" and a = b");
    }
    src.push_str(" begin skip; end end");
    assert_eq!(parse_str("<test>", &src), Ok(()));
}
