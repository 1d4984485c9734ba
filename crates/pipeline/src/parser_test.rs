//! Tests for the pipeline description parser

use super::{format_chain, parse, StageSpec};
use crate::PipelineError;

#[test]
fn test_parse_single_segment_no_args() {
    let chain = parse("null").unwrap();
    assert_eq!(chain, vec![StageSpec::new("null", vec![])]);
}

#[test]
fn test_parse_chain_with_args() {
    let chain = parse("roll(30) > disk('/data/%Y%m%d')").unwrap();
    assert_eq!(chain.len(), 2);
    assert_eq!(chain[0].kind, "roll");
    assert_eq!(chain[0].args, vec!["30"]);
    assert_eq!(chain[1].kind, "disk");
    assert_eq!(chain[1].args, vec!["/data/%Y%m%d"]);
}

#[test]
fn test_parse_is_case_insensitive() {
    let chain = parse("Roll(30) > DISK(/tmp)").unwrap();
    assert_eq!(chain[0].kind, "roll");
    assert_eq!(chain[1].kind, "disk");
}

#[test]
fn test_quoted_arg_may_contain_comma() {
    let chain = parse("a(x,'y,z') > b > c(1)").unwrap();
    assert_eq!(chain[0].args, vec!["x", "y,z"]);
    assert_eq!(chain[1].args, Vec::<String>::new());
    assert_eq!(chain[2].args, vec!["1"]);
}

#[test]
fn test_bare_args_are_trimmed() {
    let chain = parse("a( x , y )").unwrap();
    assert_eq!(chain[0].args, vec!["x", "y"]);
}

#[test]
fn test_quoted_whitespace_is_preserved() {
    let chain = parse("a(' padded ')").unwrap();
    assert_eq!(chain[0].args, vec![" padded "]);
}

#[test]
fn test_empty_parens_yield_no_args() {
    let chain = parse("a()").unwrap();
    assert!(chain[0].args.is_empty());
}

#[test]
fn test_round_trip_preserves_order_and_values() {
    let chain = parse("a(x,'y,z')>b>c(1)").unwrap();
    let rendered = format_chain(&chain);
    let reparsed = parse(&rendered).unwrap();
    assert_eq!(reparsed, chain);
}

#[test]
fn test_unterminated_args_is_config_error() {
    match parse("a(x") {
        Err(PipelineError::Config(_)) => {}
        other => panic!("expected Config error, got {:?}", other),
    }
}

#[test]
fn test_unterminated_quote_is_config_error() {
    assert!(matches!(parse("a('x)"), Err(PipelineError::Config(_))));
}

#[test]
fn test_empty_segment_is_config_error() {
    assert!(matches!(parse("a > > b"), Err(PipelineError::Config(_))));
    assert!(matches!(parse(""), Err(PipelineError::Config(_))));
}

#[test]
fn test_invalid_identifier_is_config_error() {
    assert!(matches!(parse("bad kind(1)"), Err(PipelineError::Config(_))));
}
