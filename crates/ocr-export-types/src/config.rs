/// Fixed parameters for translating a Paddle graph into ONNX.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionConfig {
    pub opset_version: u32,
    pub auto_upgrade_opset: bool,
    pub run_checker: bool,
}

impl ConversionConfig {
    pub const DEFAULT: ConversionConfig = ConversionConfig {
        opset_version: 13,
        auto_upgrade_opset: true,
        run_checker: true,
    };
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
