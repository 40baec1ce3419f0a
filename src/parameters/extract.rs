use super::body::read_body;
use super::value::RawValue;
use super::ParameterError;
use crate::error::FieldError;
use crate::router::{Operation, PathParams};
use crate::server::{header_meta_key, ApiRequest};
use crate::spec::{ParameterLocation, ParameterSpec};
use percent_encoding::percent_decode_str;
use std::borrow::Cow;

/// Pull the raw value of one parameter out of the request.
///
/// `Ok(None)` means the value is absent and the missing-value policy
/// (default, required, omit) applies.
pub fn get_parameter_value(
    operation: &Operation,
    request: &ApiRequest,
    path_params: &PathParams,
    parameter: &ParameterSpec,
) -> Result<Option<RawValue>, ParameterError> {
    let name = parameter.name();
    if parameter.is_file() {
        return Ok(request.files.get(name).cloned().map(RawValue::File));
    }
    let raw = match parameter.location() {
        ParameterLocation::Query | ParameterLocation::FormData => {
            let source = if parameter.location() == ParameterLocation::Query {
                &request.query
            } else {
                &request.form
            };
            if parameter.is_multi() {
                let values = source.get_all(name);
                // No occurrences at all counts as absent, not as an empty list.
                (!values.is_empty()).then(|| RawValue::List(values.to_vec()))
            } else {
                source.get(name).map(|v| RawValue::Text(v.to_string()))
            }
        }
        ParameterLocation::Path => path_params
            .get(name)
            .map(|raw| decode_path_segment(raw))
            .transpose()?
            .map(RawValue::Text),
        ParameterLocation::Header => request
            .headers
            .get(&header_meta_key(name))
            .cloned()
            .map(RawValue::Text),
        ParameterLocation::Body => read_body(operation, request)?,
    };
    Ok(raw)
}

/// Percent-decode a path capture. Matching runs against the raw request
/// path, so a `%2F` inside a segment never splits it.
fn decode_path_segment(raw: &str) -> Result<String, FieldError> {
    percent_decode_str(raw)
        .decode_utf8()
        .map(Cow::into_owned)
        .map_err(|e| FieldError::InvalidPathSegment {
            value: raw.to_string(),
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn test_path_segment_is_percent_decoded() {
        assert_eq!(decode_path_segment("J%C3%BCrgen%20M").unwrap(), "Jürgen M");
        assert_eq!(decode_path_segment("a%2Fb").unwrap(), "a/b");
        assert_eq!(decode_path_segment("plain").unwrap(), "plain");
    }

    #[test]
    fn test_invalid_utf8_segment() {
        let err = decode_path_segment("%FF%FE").unwrap_err();
        assert_eq!(err.kind(), "invalid_path_segment");
        assert!(err.to_string().contains("%FF%FE"));
    }
}
