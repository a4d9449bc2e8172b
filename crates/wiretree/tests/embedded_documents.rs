#![expect(missing_docs)]

use wiretree::{DataType, Tree, TreeError};

const EXPECTED: &str = r#"{"grandparent":"{\"parent\":\"{\\\"child\\\":\\\"Message Data\\\"}\"}"}"#;

#[test]
fn json_nested_inside_string_values() {
    let mut inner = Tree::new();
    inner
        .set_data(DataType::String, r#"{"child":"Message Data"}"#, "/parent")
        .unwrap();

    let mut outer = Tree::new();
    outer
        .set_data(DataType::String, inner.to_json(), "/grandparent")
        .unwrap();
    assert_eq!(outer.to_json(), EXPECTED);

    let mut reparsed = Tree::new();
    reparsed.from_json(EXPECTED).unwrap();
    assert_eq!(reparsed, outer);

    reparsed.expand_from_json("/grandparent").unwrap();
    reparsed.expand_from_json("/grandparent/parent").unwrap();
    assert_eq!(
        reparsed.get_data("/grandparent/parent/child").unwrap().unwrap(),
        "Message Data"
    );
    assert_eq!(
        reparsed.to_json(),
        r#"{"grandparent":{"parent":{"child":"Message Data"}}}"#
    );
}

#[test]
fn protobuf_nested_inside_json() {
    let mut msg = Tree::new();
    msg.set_uint(DataType::Uint64, 42, "/f1").unwrap();

    let mut doc = Tree::new();
    doc.set_data(DataType::Data, msg.to_protobuf(), "/payload").unwrap();
    doc.expand_from_protobuf("/payload").unwrap();
    assert_eq!(doc.to_json(), r#"{"payload":{"f1":42}}"#);
}

#[test]
fn failed_expansion_reports_and_keeps_value() {
    let mut tree = Tree::new();
    tree.set_data(DataType::String, "{\"open\":", "/blob").unwrap();
    let err = tree.expand_from_json("/blob").unwrap_err();
    let TreeError::Json(json) = err else {
        panic!("expected a JSON error, got {err:?}");
    };
    assert_eq!(tree.json_parse_error(), json.to_string());
    assert_eq!(tree.get_data("/blob").unwrap().unwrap(), "{\"open\":");
}

#[test]
fn copies_between_documents() {
    let mut source = Tree::new();
    source.from_json(r#"{"a":1,"b":{"c":2}}"#).unwrap();

    let mut dest = Tree::new();
    dest.from_json(r#"{"keep":true,"into":{"b":{"d":3},"z":0}}"#).unwrap();
    dest.paste_copy("/into", &source, true).unwrap();
    assert_eq!(
        dest.to_json(),
        r#"{"keep":true,"into":{"b":{"d":3,"c":2},"z":0,"a":1}}"#
    );

    dest.paste_copy("/into", &source, false).unwrap();
    assert_eq!(dest.to_json(), r#"{"keep":true,"into":{"a":1,"b":{"c":2}}}"#);

    dest.copy_within("/into/b/copy", "/into", false).unwrap();
    assert_eq!(
        dest.to_json(),
        r#"{"keep":true,"into":{"a":1,"b":{"c":2,"copy":{"a":1,"b":{"c":2}}}}}"#
    );
}
