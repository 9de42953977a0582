//! Small ONNX classifiers with the same input and output contract as the
//! real NSFW model: NHWC `1x224x224x3` in, softmax probabilities out.

#![allow(dead_code)]

use prost::Message;
use std::fs;
use std::path::{Path, PathBuf};
use tract_onnx::pb::tensor_proto::DataType;
use tract_onnx::pb::tensor_shape_proto::{Dimension, dimension};
use tract_onnx::pb::type_proto;
use tract_onnx::pb::{
    GraphProto, ModelProto, NodeProto, OperatorSetIdProto, TensorProto, TensorShapeProto,
    TypeProto, ValueInfoProto,
};

const PIXELS: i64 = 224 * 224 * 3;

fn float_value(name: &str, dims: Option<&[i64]>) -> ValueInfoProto {
    let shape = dims.map(|dims| TensorShapeProto {
        dim: dims
            .iter()
            .map(|&d| Dimension {
                value: Some(dimension::Value::DimValue(d)),
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    });

    ValueInfoProto {
        name: name.to_string(),
        r#type: Some(TypeProto {
            value: Some(type_proto::Value::TensorType(type_proto::Tensor {
                elem_type: DataType::Float as i32,
                shape,
                ..Default::default()
            })),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn node(op_type: &str, inputs: &[&str], output: &str) -> NodeProto {
    NodeProto {
        input: inputs.iter().map(|s| s.to_string()).collect(),
        output: vec![output.to_string()],
        name: output.to_string(),
        op_type: op_type.to_string(),
        ..Default::default()
    }
}

/// `Flatten -> MatMul(weights [150528, classes]) -> Softmax`.
pub fn classifier(classes: usize) -> ModelProto {
    let weights = TensorProto {
        dims: vec![PIXELS, classes as i64],
        data_type: DataType::Float as i32,
        float_data: (0..PIXELS as usize * classes)
            .map(|i| ((i % 7) as f32 - 3.0) * 1e-4)
            .collect(),
        name: "weights".to_string(),
        ..Default::default()
    };

    let graph = GraphProto {
        name: "nsfw-fixture".to_string(),
        node: vec![
            node("Flatten", &["input"], "flat"),
            node("MatMul", &["flat", "weights"], "logits"),
            node("Softmax", &["logits"], "probs"),
        ],
        initializer: vec![weights],
        input: vec![float_value("input", Some(&[1, 224, 224, 3]))],
        output: vec![float_value("probs", None)],
        ..Default::default()
    };

    ModelProto {
        ir_version: 7,
        opset_import: vec![OperatorSetIdProto {
            domain: String::new(),
            version: 13,
            ..Default::default()
        }],
        producer_name: "nsfw-check-tests".to_string(),
        graph: Some(graph),
        ..Default::default()
    }
}

pub fn write_classifier(path: &Path, classes: usize) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, classifier(classes).encode_to_vec()).unwrap();
    path.to_path_buf()
}

pub fn write_image(path: &Path, width: u32, height: u32) -> PathBuf {
    image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x * y) % 256) as u8])
    })
    .save(path)
    .unwrap();
    path.to_path_buf()
}
