#![no_main]
use libfuzzer_sys::fuzz_target;
use wiretree::{DataType, Tree};

fn protobuf(data: &[u8]) {
    let mut tree = Tree::new();
    if tree.from_protobuf(data).is_err() {
        assert!(tree.is_empty());
        return;
    }

    // re-encoding is canonical, so compare decoded trees rather than bytes
    let bytes = tree.to_protobuf();
    let mut again = Tree::new();
    again.from_protobuf(&bytes).expect("re-encoded message decodes");
    assert_eq!(again, tree);

    let blobs: Vec<String> = tree
        .top()
        .filter(|&id| tree.node_type(id) == Some(DataType::Data))
        .filter_map(|id| tree.label(id).map(|label| format!("/{label}")))
        .collect();
    for path in blobs {
        // repeated labels resolve to the first match, which may already
        // have been expanded
        let _ = tree.expand_from_protobuf(&path);
    }
    let _ = tree.to_json();
    let _ = tree.to_protobuf();
}

fuzz_target!(|data: &[u8]| protobuf(data));
