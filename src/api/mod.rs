pub mod format;
pub mod xml;

/// Model label used by both export encodings.
pub const MODEL_LABEL: &str = "main.footballitem";
