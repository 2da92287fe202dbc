//! Conversion of one uploaded file into a UTF-8 result record.

use tracing::info;

use super::encoding_resolver::EncodingResolver;
use super::error::{ConvertError, Result};
use super::output_naming::derive_output_name;
use crate::utils::encoding::Codec;

/// Result of converting one file.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionResult {
    pub original_name: String,
    pub output_name: String,
    pub content: String,
    pub encoding: String,
    /// Detection score; `None` when the caller supplied the encoding.
    pub score: Option<i64>,
    pub message: String,
}

impl ConversionResult {
    /// The converted content as it is written to disk.
    pub fn utf8_bytes(&self) -> &[u8] {
        self.content.as_bytes()
    }

    pub fn was_detected(&self) -> bool {
        self.score.is_some()
    }
}

/// Decode `bytes` and package the outcome under the derived output name.
pub fn convert<C: Codec>(
    resolver: &EncodingResolver<C>,
    file_name: &str,
    bytes: &[u8],
    hint: Option<&str>,
) -> Result<ConversionResult> {
    if file_name.trim().is_empty() {
        return Err(ConvertError::InvalidInput("file name is missing".to_string()));
    }

    let resolution = resolver.resolve(bytes, hint)?;
    let message = format!(
        "Successfully converted {} from {} to UTF-8",
        file_name, resolution.encoding
    );
    info!(file = file_name, encoding = %resolution.encoding, "converted file");

    Ok(ConversionResult {
        original_name: file_name.to_string(),
        output_name: derive_output_name(file_name),
        content: resolution.text,
        encoding: resolution.encoding,
        score: resolution.score,
        message,
    })
}
