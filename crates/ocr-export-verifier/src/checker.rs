use std::collections::HashSet;

use tract_onnx::pb::{GraphProto, ModelProto, ValueInfoProto};

use crate::CheckError;

const DEFAULT_DOMAINS: &[&str] = &["", "ai.onnx"];

/// Structural well-formedness check for a decoded ONNX model.
///
/// Covers the model header (IR version, default opset), declared graph
/// inputs and outputs, and single-assignment dataflow over the top-level
/// nodes in order. Subgraphs of control-flow nodes are not descended into.
pub fn check_model(model: &ModelProto) -> Result<(), CheckError> {
    if model.ir_version <= 0 {
        return Err(CheckError::MissingIrVersion);
    }

    let has_default_opset = model
        .opset_import
        .iter()
        .any(|opset| DEFAULT_DOMAINS.contains(&opset.domain.as_str()) && opset.version > 0);
    if !has_default_opset {
        return Err(CheckError::MissingDefaultOpset);
    }

    let graph = model.graph.as_ref().ok_or(CheckError::MissingGraph)?;
    check_graph(graph)
}

fn check_graph(graph: &GraphProto) -> Result<(), CheckError> {
    let mut defined: HashSet<&str> = HashSet::new();

    check_declared(&graph.input, "input")?;
    for input in &graph.input {
        if !defined.insert(input.name.as_str()) {
            return Err(CheckError::DuplicateName(input.name.clone()));
        }
    }

    let mut initializers: HashSet<&str> = HashSet::new();
    for (index, tensor) in graph.initializer.iter().enumerate() {
        if tensor.name.is_empty() {
            return Err(CheckError::UnnamedValue {
                kind: "initializer",
                index,
            });
        }
        if !initializers.insert(tensor.name.as_str()) {
            return Err(CheckError::DuplicateName(tensor.name.clone()));
        }
    }
    // Older IR versions list initializers among the graph inputs as well.
    defined.extend(initializers);

    for (index, node) in graph.node.iter().enumerate() {
        let label = node_label(&node.name, index);
        if node.op_type.is_empty() {
            return Err(CheckError::MissingOpType { node: label });
        }
        for input in node.input.iter().filter(|name| !name.is_empty()) {
            if !defined.contains(input.as_str()) {
                return Err(CheckError::UndefinedInput {
                    node: label,
                    input: input.clone(),
                });
            }
        }
        for output in node.output.iter().filter(|name| !name.is_empty()) {
            if !defined.insert(output.as_str()) {
                return Err(CheckError::DuplicateName(output.clone()));
            }
        }
    }

    check_declared(&graph.output, "output")?;
    for output in &graph.output {
        if !defined.contains(output.name.as_str()) {
            return Err(CheckError::UndefinedOutput(output.name.clone()));
        }
    }

    Ok(())
}

fn check_declared(values: &[ValueInfoProto], kind: &'static str) -> Result<(), CheckError> {
    for (index, value) in values.iter().enumerate() {
        if value.name.is_empty() {
            return Err(CheckError::UnnamedValue { kind, index });
        }
        if value.r#type.is_none() {
            return Err(CheckError::UntypedValue {
                kind,
                name: value.name.clone(),
            });
        }
    }
    Ok(())
}

fn node_label(name: &str, index: usize) -> String {
    if name.is_empty() {
        format!("#{index}")
    } else {
        format!("'{name}'")
    }
}
