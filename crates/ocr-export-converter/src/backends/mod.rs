pub mod paddle2onnx;
