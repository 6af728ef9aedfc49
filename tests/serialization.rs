//! Save/restore through Node and the serde surface.

use tensorview::{Error, Node, Storage, Tensor};

#[test]
fn test_json_layout() {
    let t = Tensor::<i32>::from_data(&[1, 2, 3, 4, 5, 6], &[2, 3]).unwrap();
    let json = serde_json::to_string(&t).unwrap();
    assert_eq!(json, r#"{"data":[1,2,3,4,5,6],"dims":[2,3]}"#);
}

#[test]
fn test_json_restores_strided_view_in_row_major_order() {
    let t = Tensor::<f64>::from_data(&[1.5, 2.5, 3.5, 4.5], &[2, 2]).unwrap();
    let tt = t.transpose(0, 1).unwrap();

    let json = serde_json::to_string(&tt).unwrap();
    let back: Tensor<f64> = serde_json::from_str(&json).unwrap();

    assert_eq!(back.shape(), &[2, 2]);
    assert!(back.is_contiguous());
    assert_eq!(back.to_vec(), vec![1.5, 3.5, 2.5, 4.5]);
}

#[test]
fn test_json_integral_floats() {
    let back: Tensor<f32> = serde_json::from_str(r#"{"dims":[3],"data":[1,2.0,-3]}"#).unwrap();
    assert_eq!(back.to_vec(), vec![1.0, 2.0, -3.0]);

    let ints: Tensor<u32> = serde_json::from_str(r#"{"dims":[2],"data":[4.0,5]}"#).unwrap();
    assert_eq!(ints.to_vec(), vec![4, 5]);
}

#[test]
fn test_json_rejects_bad_documents() {
    let err = serde_json::from_str::<Tensor<f32>>(r#"{"dims":[2,2],"data":[1,2,3]}"#)
        .unwrap_err();
    assert!(err.to_string().contains("element count mismatch"));

    let err = serde_json::from_str::<Tensor<u32>>(r#"{"dims":[1],"data":[-1]}"#).unwrap_err();
    assert!(err.to_string().contains("malformed node"));

    assert!(serde_json::from_str::<Tensor<f32>>(r#"{"data":[]}"#).is_err());
    assert!(serde_json::from_str::<Tensor<f32>>(r#"[1,2,3]"#).is_err());
}

#[test]
fn test_json_keeps_large_unsigned_values() {
    let t = Tensor::from_slice(&[u64::MAX - 1, 1 << 63, 3]);
    let json = serde_json::to_string(&t).unwrap();
    assert_eq!(
        json,
        r#"{"data":[18446744073709551614,9223372036854775808,3],"dims":[3]}"#
    );

    let back: Tensor<u64> = serde_json::from_str(&json).unwrap();
    assert_eq!(back.to_vec(), t.to_vec());
    assert_eq!(Tensor::<u64>::from_node(&t.save()).unwrap().to_vec(), t.to_vec());
}

#[test]
fn test_json_rejects_booleans_and_overflowing_dims() {
    let err = serde_json::from_str::<Tensor<i32>>(r#"{"dims":[1],"data":[true]}"#).unwrap_err();
    assert!(err.to_string().contains("malformed node"));

    let doc = r#"{"dims":[4294967296,4294967296,4294967296],"data":[]}"#;
    let err = serde_json::from_str::<Tensor<f32>>(doc).unwrap_err();
    assert!(err.to_string().contains("overflows"));
}

#[test]
fn test_node_contract_by_key_and_index() {
    let t = Tensor::<i64>::from_data(&[7, 8, 9], &[3]).unwrap();
    let mut node = t.save();

    assert_eq!(node.get("dims").and_then(|d| d.at(0)).and_then(Node::as_usize), Some(3));

    // Edit a value in place, then restore
    let mut data = node.get("data").cloned().unwrap();
    data.set_at(1, Node::from(80i64)).unwrap();
    node.set("data", data);

    let back = Tensor::<i64>::try_from(&node).unwrap();
    assert_eq!(back.to_vec(), vec![7, 80, 9]);
}

#[test]
fn test_storage_save_is_flat_list() {
    let s = Storage::from(vec![1.0f32, 2.0]);
    let json = serde_json::to_string(&s.save()).unwrap();
    assert_eq!(json, "[1.0,2.0]");

    let node: Node = serde_json::from_str(&json).unwrap();
    assert_eq!(Storage::<f32>::from_node(&node).unwrap(), s);
}

#[test]
fn test_node_from_json_types() {
    let node: Node = serde_json::from_str(r#"{"a":null,"b":true,"c":1,"d":1.5,"e":"x","f":[]}"#)
        .unwrap();
    assert_eq!(node.get("a"), Some(&Node::Null));
    assert_eq!(node.get("b"), Some(&Node::Bool(true)));
    assert_eq!(node.get("c"), Some(&Node::Int(1)));
    assert_eq!(node.get("d"), Some(&Node::Float(1.5)));
    assert_eq!(node.get("e").and_then(Node::as_str), Some("x"));
    assert_eq!(node.get("f").and_then(Node::len), Some(0));
    assert!(matches!(node.require("g"), Err(Error::Node(_))));
}
