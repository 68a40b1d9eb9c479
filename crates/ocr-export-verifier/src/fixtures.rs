//! Small ONNX models for tests.

use prost_tract_compat::Message;
use tract_onnx::pb::{
    GraphProto, ModelProto, NodeProto, OperatorSetIdProto, TensorProto, TypeProto,
    ValueInfoProto, type_proto,
};

const FLOAT: i32 = 1;

/// `output = Sigmoid(input * scale)`, shaped like an exported OCR head.
pub fn ocr_model(input: &str, output: &str) -> ModelProto {
    let graph = GraphProto {
        name: "ocr".to_string(),
        node: vec![
            node("mul_0", "Mul", &[input, "scale"], &["hidden"]),
            node("sigmoid_0", "Sigmoid", &["hidden"], &[output]),
        ],
        initializer: vec![TensorProto {
            name: "scale".to_string(),
            data_type: FLOAT,
            dims: vec![1],
            float_data: vec![0.5],
            ..Default::default()
        }],
        input: vec![float_value(input)],
        output: vec![float_value(output)],
        ..Default::default()
    };

    ModelProto {
        ir_version: 7,
        producer_name: "ocr-export-fixtures".to_string(),
        opset_import: vec![OperatorSetIdProto {
            domain: String::new(),
            version: 13,
        }],
        graph: Some(graph),
        ..Default::default()
    }
}

pub fn ocr_model_bytes(input: &str, output: &str) -> Vec<u8> {
    encode(&ocr_model(input, output))
}

pub fn encode(model: &ModelProto) -> Vec<u8> {
    model.encode_to_vec()
}

fn node(name: &str, op_type: &str, inputs: &[&str], outputs: &[&str]) -> NodeProto {
    NodeProto {
        name: name.to_string(),
        op_type: op_type.to_string(),
        input: inputs.iter().map(|s| s.to_string()).collect(),
        output: outputs.iter().map(|s| s.to_string()).collect(),
        ..Default::default()
    }
}

fn float_value(name: &str) -> ValueInfoProto {
    ValueInfoProto {
        name: name.to_string(),
        r#type: Some(TypeProto {
            value: Some(type_proto::Value::TensorType(type_proto::Tensor {
                elem_type: FLOAT,
                ..Default::default()
            })),
            ..Default::default()
        }),
        ..Default::default()
    }
}
