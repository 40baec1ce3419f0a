use super::value::RawValue;
use super::ParameterError;
use crate::error::{FieldError, SpecError};
use crate::router::Operation;
use crate::server::ApiRequest;
use encoding_rs::Encoding;
use serde_json::Value;
use std::borrow::Cow;
use tracing::debug;

/// Decode the request body according to the operation's `consumes`.
///
/// Returns `Ok(None)` when the request carries neither a body nor a
/// content type, so the missing-value policy of the body parameter applies.
///
/// # Errors
///
/// - [`FieldError::InvalidBodyFormat`] when the content type is not consumed
/// - [`FieldError::InvalidBodyContent`] when the body does not decode
/// - [`SpecError::UnsupportedContentType`] when a consumed type has no decoder
pub fn read_body(
    operation: &Operation,
    request: &ApiRequest,
) -> Result<Option<RawValue>, ParameterError> {
    let Some(content_type) = request.content_type() else {
        if request.body.is_empty() {
            return Ok(None);
        }
        return Err(FieldError::InvalidBodyFormat {
            content_type: String::new(),
            consumes: operation.consumes().to_vec(),
        }
        .into());
    };

    let consumed = operation
        .consumes()
        .iter()
        .any(|c| c.eq_ignore_ascii_case(&content_type.essence));
    if !consumed {
        return Err(FieldError::InvalidBodyFormat {
            content_type: content_type.essence,
            consumes: operation.consumes().to_vec(),
        }
        .into());
    }

    let invalid_content = |message: String| FieldError::InvalidBodyContent {
        content_type: content_type.essence.clone(),
        message,
    };
    let is_json = content_type.is_json();
    if !is_json && content_type.essence != "text/plain" {
        return Err(SpecError::UnsupportedContentType {
            content_type: content_type.essence.clone(),
        }
        .into());
    }

    let text = decode_text(&request.body, content_type.charset.as_deref()).map_err(invalid_content)?;
    debug!(
        operation_id = %operation.id(),
        content_type = %content_type.essence,
        body_bytes = request.body.len(),
        "Decoding request body"
    );
    if is_json {
        let value: Value =
            serde_json::from_str(&text).map_err(|e| invalid_content(e.to_string()))?;
        Ok(Some(RawValue::Json(value)))
    } else {
        Ok(Some(RawValue::Text(text)))
    }
}

/// Decode bytes in the declared charset; UTF-8 when none is declared.
///
/// Charset labels follow the WHATWG Encoding Standard, so `latin1` and
/// `ascii` both name windows-1252.
fn decode_text(body: &[u8], charset: Option<&str>) -> Result<String, String> {
    let Some(label) = charset else {
        return String::from_utf8(body.to_vec()).map_err(|e| e.to_string());
    };
    let encoding = Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| format!("unsupported charset {label}"))?;
    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .map(Cow::into_owned)
        .ok_or_else(|| format!("body is not valid {}", encoding.name()))
}
