use alloc::{format, string::String, string::ToString};

use regex::Regex;
use rstest::rstest;

use crate::{DataType, JsonError, JsonErrorReason, JsonOptions, Tree};

fn parse_err(input: &str) -> (Tree, JsonError) {
    let mut tree = Tree::new();
    let err = tree.from_json(input).unwrap_err();
    (tree, err)
}

fn nested(levels: usize) -> String {
    format!("{}{}", "[".repeat(levels), "]".repeat(levels))
}

#[test]
fn bare_label_is_rejected() {
    let (tree, err) = parse_err("{badlabel:1}");
    assert_eq!(err.reason, JsonErrorReason::MissingLabel);
    assert_eq!(err.to_string(), "Missing Label at character 1, found: badlabel:1...");
    assert_eq!(tree.json_parse_error(), err.to_string());
    assert!(tree.is_empty());
}

#[test]
fn unbalanced_open_keeps_outer_member() {
    let (tree, err) = parse_err(r#"{"extraopen":{{}"#);
    assert_eq!(err.to_string(), "Expected } at character 14, found: {}...");
    assert_eq!(tree.type_at("/extraopen").unwrap(), DataType::Node);
    assert_eq!(tree.children_at("/extraopen").unwrap().count(), 0);
}

#[rstest]
#[case("", JsonErrorReason::UnexpectedCharacter, 0)]
#[case("  42", JsonErrorReason::UnexpectedCharacter, 2)]
#[case(r#"{"a":1"#, JsonErrorReason::ExpectedObjectEnd, 6)]
#[case("[1,2", JsonErrorReason::ExpectedArrayEnd, 4)]
#[case(r#"{"a":"b}"#, JsonErrorReason::UnterminatedString, 5)]
#[case(r#"{"a":@}"#, JsonErrorReason::UnexpectedCharacter, 5)]
#[case(r#"{"a":--}"#, JsonErrorReason::UnexpectedCharacter, 5)]
#[case(r#"{"a" 1 "b" 2}"#, JsonErrorReason::ExpectedObjectEnd, 7)]
#[case(r#"{"x":1e400}"#, JsonErrorReason::UnexpectedCharacter, 5)]
#[case(r#"{"x":1,"y":-1e999}"#, JsonErrorReason::UnexpectedCharacter, 11)]
fn error_reason_and_offset(#[case] input: &str, #[case] reason: JsonErrorReason, #[case] offset: usize) {
    let (_, err) = parse_err(input);
    assert_eq!((err.reason, err.offset), (reason, offset));
}

#[test]
fn error_text_has_fixed_shape() {
    let shape = Regex::new(r"^[A-Z][A-Za-z ]+\]?\}? at character \d+, found: .{0,10}\.\.\.$").unwrap();
    for input in ["{x}", "[1 2]", "{\"a\":\"", "{\"a\":{\"b\":[1,}", "nothing here at all"] {
        let (_, err) = parse_err(input);
        let text = err.to_string();
        assert!(shape.is_match(&text), "unexpected error text: {text}");
    }
}

#[test]
fn depth_limit_counts_nested_containers() {
    let mut tree = Tree::new();
    tree.from_json(nested(11)).unwrap();
    let err = tree.from_json(nested(12)).unwrap_err();
    assert_eq!((err.reason, err.offset), (JsonErrorReason::TooDeep, 11));

    let shallow = JsonOptions {
        max_depth: 2,
        ..JsonOptions::default()
    };
    tree.from_json_with("[[[]]]", shallow).unwrap();
    let err = tree.from_json_with("[[[[]]]]", shallow).unwrap_err();
    assert_eq!((err.reason, err.offset), (JsonErrorReason::TooDeep, 3));
}

#[test]
fn success_resets_error_text() {
    let (mut tree, _) = parse_err("{");
    assert_ne!(tree.json_parse_error(), "OK");
    tree.from_json("{}").unwrap();
    assert_eq!(tree.json_parse_error(), "OK");
}
