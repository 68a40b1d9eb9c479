pub mod cli;
/// Export pipeline: locate, convert, extract, verify.
pub mod pipeline;
pub mod progress;
pub mod settings;
