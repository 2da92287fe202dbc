//! Request/response boundary for file conversion.
//!
//! Requests carry the file name and base64 content; responses carry the
//! converted UTF-8 bytes back as base64 along with the chosen encoding.

use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::converter::{self, ConversionResult};
use crate::core::encoding_resolver::EncodingResolver;
use crate::core::error::{ConvertError, Result};
use crate::core::output_naming::has_extension;
use crate::utils::encoding::Codec;

/// Conversion request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertRequest {
    #[serde(default)]
    pub file_name: Option<String>,
    /// Base64-encoded file content.
    #[serde(default)]
    pub content: Option<String>,
    /// Source encoding; detection runs when absent.
    #[serde(default)]
    pub encoding: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertResponse {
    pub success: bool,
    pub original_name: String,
    pub output_name: String,
    /// Base64-encoded UTF-8 content.
    pub content: String,
    pub encoding: String,
    pub message: String,
}

impl From<ConversionResult> for ConvertResponse {
    fn from(result: ConversionResult) -> Self {
        Self {
            success: true,
            content: BASE64_STANDARD.encode(result.utf8_bytes()),
            original_name: result.original_name,
            output_name: result.output_name,
            encoding: result.encoding,
            message: result.message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub kind: String,
    pub message: String,
}

impl From<&ConvertError> for ErrorResponse {
    fn from(err: &ConvertError) -> Self {
        Self {
            success: false,
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

/// Validate a request, convert its content and wrap the result.
pub fn handle_convert<C: Codec>(
    resolver: &EncodingResolver<C>,
    request: &ConvertRequest,
    allowed_extension: &str,
) -> Result<ConvertResponse> {
    let file_name = request
        .file_name
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| ConvertError::InvalidInput("file name is missing".to_string()))?;

    let content = request
        .content
        .as_deref()
        .filter(|content| !content.is_empty())
        .ok_or_else(|| ConvertError::InvalidInput("file content is missing".to_string()))?;

    if !has_extension(file_name, allowed_extension) {
        return Err(ConvertError::InvalidInput(format!(
            "only {} files are accepted, got {}",
            allowed_extension, file_name
        )));
    }

    let bytes = BASE64_STANDARD
        .decode(content.trim())
        .map_err(|e| ConvertError::InvalidInput(format!("content is not valid base64: {}", e)))?;

    let hint = request.encoding.as_deref().filter(|e| !e.trim().is_empty());
    let result = converter::convert(resolver, file_name, &bytes, hint)?;
    Ok(result.into())
}

/// JSON entry point: always answers with a response or an error body.
pub fn handle_convert_json<C: Codec>(
    resolver: &EncodingResolver<C>,
    body: &str,
    allowed_extension: &str,
) -> String {
    let outcome = serde_json::from_str::<ConvertRequest>(body)
        .map_err(|e| ConvertError::InvalidInput(format!("malformed request: {}", e)))
        .and_then(|request| handle_convert(resolver, &request, allowed_extension));

    let json = match outcome {
        Ok(response) => serde_json::to_string(&response),
        Err(err) => {
            warn!(kind = err.kind(), error = %err, "conversion request failed");
            serde_json::to_string(&ErrorResponse::from(&err))
        }
    };

    json.unwrap_or_else(|e| {
        format!(
            r#"{{"success":false,"kind":"Io","message":"failed to serialize response: {}"}}"#,
            e.to_string().replace('"', "'")
        )
    })
}
