use std::future::Future;
use std::ops::RangeInclusive;

use ocr_export_types::{ConversionConfig, SourceModelHandle};

use crate::ConversionError;

/// ONNX opsets the Paddle converter can target.
pub const SUPPORTED_OPSETS: RangeInclusive<u32> = 7..=19;

/// Translates a Paddle inference model into serialized ONNX bytes.
pub trait GraphConverter {
    fn name(&self) -> &'static str;

    fn convert(
        &self,
        handle: &SourceModelHandle,
        config: &ConversionConfig,
    ) -> impl Future<Output = Result<Vec<u8>, ConversionError>>;
}
