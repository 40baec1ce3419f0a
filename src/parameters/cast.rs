use super::value::{ParamValue, RawValue};
use super::ParameterError;
use crate::error::{FieldError, SpecError};
use crate::router::Router;
use crate::schema::SchemaCheck;
use crate::spec::CollectionFormat;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};

/// Keywords of a non-body parameter declaration that are checked with
/// JSON Schema after casting
pub const VALIDATION_KEYWORDS: [&str; 12] = [
    "maximum",
    "exclusiveMaximum",
    "minimum",
    "exclusiveMinimum",
    "maxLength",
    "minLength",
    "pattern",
    "maxItems",
    "minItems",
    "uniqueItems",
    "enum",
    "multipleOf",
];

/// Cast a raw value against a parameter declaration (or an `items` sub-declaration).
///
/// Arrays are split by `collectionFormat` unless already a list, then every
/// element is cast against `items`. Declarations with a `schema` are
/// validated against it (including discriminator dispatch) and returned as
/// JSON. Everything else goes through [`cast_primitive_value`] and then the
/// [`VALIDATION_KEYWORDS`] check.
pub fn cast_parameter_value(
    router: &Router,
    declaration: &Value,
    name: &str,
    raw: RawValue,
) -> Result<ParamValue, ParameterError> {
    let value = if declaration.get("type").and_then(Value::as_str) == Some("array") {
        let format = CollectionFormat::of(declaration, name)?;
        let items = declaration.get("items").ok_or_else(|| SpecError::MissingItems {
            name: name.to_string(),
        })?;
        let elements = split_array(raw, format)?;
        let cast = elements
            .into_iter()
            .map(|element| cast_parameter_value(router, items, name, element))
            .collect::<Result<Vec<_>, _>>()?;
        RawOrCast::Cast(ParamValue::Array(cast))
    } else {
        RawOrCast::Raw(raw)
    };

    if let Some(schema) = declaration.get("schema") {
        let instance = match &value {
            RawOrCast::Raw(raw) => raw.to_json(),
            RawOrCast::Cast(cast) => cast.to_json(),
        };
        validate_schema(router, schema, &instance)?;
        return Ok(ParamValue::Json(instance));
    }

    let value = match value {
        RawOrCast::Raw(raw) => cast_primitive_value(declaration, raw)?,
        RawOrCast::Cast(cast) => cast,
    };

    let keywords: Map<String, Value> = VALIDATION_KEYWORDS
        .iter()
        .filter_map(|&k| declaration.get(k).map(|v| (k.to_string(), v.clone())))
        .collect();
    if !keywords.is_empty() {
        let check = router
            .schemas()
            .check(&Value::Object(keywords), &value.to_json())?;
        if let SchemaCheck::Invalid(err) = check {
            return Err(err.into());
        }
    }
    Ok(value)
}

enum RawOrCast {
    Raw(RawValue),
    Cast(ParamValue),
}

fn split_array(raw: RawValue, format: CollectionFormat) -> Result<Vec<RawValue>, FieldError> {
    match raw {
        RawValue::List(items) => Ok(items.into_iter().map(RawValue::Text).collect()),
        RawValue::Json(Value::Array(items)) => Ok(items.into_iter().map(RawValue::Json).collect()),
        other => {
            let text = other.as_text().ok_or_else(|| FieldError::SchemaViolation {
                messages: vec!["expected an array".to_string()],
            })?;
            Ok(match format.separator() {
                Some(sep) => text.split(sep).map(|s| RawValue::Text(s.to_string())).collect(),
                // A multi array that arrived as a single scalar is one element.
                None => vec![RawValue::Text(text)],
            })
        }
    }
}

/// Validate a body-style `schema`, then re-validate against the concrete
/// definition named by its `discriminator`, if any.
fn validate_schema(router: &Router, schema: &Value, instance: &Value) -> Result<(), ParameterError> {
    let schema = router.document().maybe_resolve(schema)?;
    if let SchemaCheck::Invalid(err) = router.schemas().check(schema, instance)? {
        return Err(err.into());
    }

    let Some(property) = schema.get("discriminator").and_then(Value::as_str) else {
        return Ok(());
    };
    let discriminator_error = |message: String| FieldError::Discriminator {
        property: property.to_string(),
        message,
    };
    let type_name = instance
        .get(property)
        .and_then(Value::as_str)
        .ok_or_else(|| discriminator_error("value is missing or not a string".to_string()))?;
    let concrete = router
        .resolve_reference(&format!("#/definitions/{type_name}"))
        .map_err(|_| discriminator_error(format!("unknown type {type_name:?}")))?;
    if let SchemaCheck::Invalid(err) = router.schemas().check(concrete, instance)? {
        return Err(err.into());
    }
    Ok(())
}

/// Cast a scalar by `type` and `format`; unrecognised declarations pass the value through.
pub fn cast_primitive_value(declaration: &Value, raw: RawValue) -> Result<ParamValue, FieldError> {
    let type_name = declaration.get("type").and_then(Value::as_str);
    let format = declaration.get("format").and_then(Value::as_str);

    if type_name == Some("boolean") {
        let text = scalar_text(&raw, "boolean")?;
        let truthy = matches!(text.to_lowercase().as_str(), "1" | "yes" | "true");
        return Ok(ParamValue::Bool(truthy));
    }
    if type_name == Some("integer") || matches!(format, Some("integer" | "long")) {
        let text = scalar_text(&raw, "integer")?;
        return text
            .trim()
            .parse::<i64>()
            .map(ParamValue::Integer)
            .map_err(|e| FieldError::InvalidInteger {
                value: text.clone(),
                message: e.to_string(),
            });
    }
    if type_name == Some("number") || matches!(format, Some("float" | "double")) {
        let text = scalar_text(&raw, "number")?;
        return text
            .trim()
            .parse::<f64>()
            .map(ParamValue::Number)
            .map_err(|e| FieldError::InvalidNumber {
                value: text.clone(),
                message: e.to_string(),
            });
    }
    match format {
        Some("byte") => {
            let text = scalar_text(&raw, "base64 string")?;
            return STANDARD
                .decode(text.trim())
                .map(ParamValue::Bytes)
                .map_err(|e| FieldError::InvalidBase64 {
                    message: e.to_string(),
                });
        }
        Some("binary") => {
            return Ok(match raw {
                RawValue::File(file) => ParamValue::Bytes(file.data),
                other => ParamValue::Bytes(scalar_text(&other, "binary")?.into_bytes()),
            });
        }
        Some("date") => {
            let text = scalar_text(&raw, "date")?;
            return parse_date(&text)
                .map(ParamValue::Date)
                .ok_or(FieldError::InvalidDate { value: text });
        }
        Some("dateTime" | "date-time") => {
            let text = scalar_text(&raw, "date-time")?;
            return parse_date_time(&text)
                .map(ParamValue::DateTime)
                .ok_or(FieldError::InvalidDateTime { value: text });
        }
        _ => {}
    }
    if type_name == Some("string") {
        return Ok(ParamValue::Text(match raw {
            RawValue::Text(s) | RawValue::Json(Value::String(s)) => s,
            other => other.to_json().to_string(),
        }));
    }
    Ok(match raw {
        RawValue::Text(s) => ParamValue::Text(s),
        RawValue::List(items) => ParamValue::Array(items.into_iter().map(ParamValue::Text).collect()),
        RawValue::Json(v) => ParamValue::Json(v),
        RawValue::File(f) => ParamValue::File(f),
    })
}

fn scalar_text(raw: &RawValue, expected: &str) -> Result<String, FieldError> {
    raw.as_text().ok_or_else(|| FieldError::SchemaViolation {
        messages: vec![format!("expected a {expected} value")],
    })
}

/// ISO-8601 calendar date; a full timestamp is accepted and truncated to its date.
fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_date_time(text).map(|dt| dt.date_naive()))
}

/// ISO-8601 timestamp. Missing offsets are taken as UTC; a bare date is midnight UTC.
fn parse_date_time(text: &str) -> Option<DateTime<FixedOffset>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt);
    }
    let utc = FixedOffset::east_opt(0)?;
    for layout in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, layout) {
            return Some(naive.and_utc().with_timezone(&utc));
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().with_timezone(&utc))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::server::UploadedFile;
    use chrono::{Datelike, Timelike};
    use serde_json::json;

    fn router() -> Router {
        let api: Value = serde_yaml::from_str(
            r#"
swagger: "2.0"
paths: {}
definitions:
  Pet:
    type: object
    discriminator: petType
    required: [name, petType]
    properties:
      name: { type: string }
      petType: { type: string }
  Cat:
    type: object
    required: [huntingSkill]
    properties:
      huntingSkill: { type: string, enum: [clueless, lazy, adventurous] }
"#,
        )
        .unwrap();
        Router::new(&api).unwrap()
    }

    fn text(s: &str) -> RawValue {
        RawValue::Text(s.to_string())
    }

    #[test]
    fn test_integer_cast() {
        let decl = json!({ "type": "integer" });
        assert_eq!(cast_primitive_value(&decl, text("42")).unwrap(), ParamValue::Integer(42));
        assert!(matches!(
            cast_primitive_value(&decl, text("abc")),
            Err(FieldError::InvalidInteger { .. })
        ));
        let long = json!({ "type": "string", "format": "long" });
        assert_eq!(cast_primitive_value(&long, text("-7")).unwrap(), ParamValue::Integer(-7));
    }

    #[test]
    fn test_boolean_cast() {
        let decl = json!({ "type": "boolean" });
        assert_eq!(cast_primitive_value(&decl, text("YES")).unwrap(), ParamValue::Bool(true));
        assert_eq!(cast_primitive_value(&decl, text("1")).unwrap(), ParamValue::Bool(true));
        assert_eq!(cast_primitive_value(&decl, text("no")).unwrap(), ParamValue::Bool(false));
        assert_eq!(cast_primitive_value(&decl, text("on")).unwrap(), ParamValue::Bool(false));
    }

    #[test]
    fn test_number_and_bytes() {
        let num = json!({ "type": "number" });
        assert_eq!(cast_primitive_value(&num, text("2.5")).unwrap(), ParamValue::Number(2.5));
        assert!(cast_primitive_value(&num, text("two")).is_err());

        let byte = json!({ "type": "string", "format": "byte" });
        assert_eq!(
            cast_primitive_value(&byte, text("aGVsbG8=")).unwrap(),
            ParamValue::Bytes(b"hello".to_vec())
        );
        assert!(matches!(
            cast_primitive_value(&byte, text("***")),
            Err(FieldError::InvalidBase64 { .. })
        ));

        let binary = json!({ "type": "string", "format": "binary" });
        let file = RawValue::File(UploadedFile::new("a.bin", vec![1u8, 2]));
        assert_eq!(cast_primitive_value(&binary, file).unwrap(), ParamValue::Bytes(vec![1, 2]));
    }

    #[test]
    fn test_dates() {
        let date = json!({ "type": "string", "format": "date" });
        let ParamValue::Date(d) = cast_primitive_value(&date, text("2023-07-14")).unwrap() else {
            panic!("expected a date");
        };
        assert_eq!((d.year(), d.month(), d.day()), (2023, 7, 14));
        assert!(matches!(
            cast_primitive_value(&date, text("14/07/2023")),
            Err(FieldError::InvalidDate { .. })
        ));

        let dt = json!({ "type": "string", "format": "dateTime" });
        let ParamValue::DateTime(t) =
            cast_primitive_value(&dt, text("2023-07-14T10:30:00+02:00")).unwrap()
        else {
            panic!("expected a date-time");
        };
        assert_eq!(t.hour(), 10);
        assert_eq!(t.offset().local_minus_utc(), 7200);

        let ParamValue::DateTime(naive) =
            cast_primitive_value(&dt, text("2023-07-14T10:30:00")).unwrap()
        else {
            panic!("expected a date-time");
        };
        assert_eq!(naive.offset().local_minus_utc(), 0);
    }

    #[test]
    fn test_untyped_values_pass_through() {
        let decl = json!({});
        assert_eq!(cast_primitive_value(&decl, text("x")).unwrap(), ParamValue::Text("x".into()));
        let obj = RawValue::Json(json!({ "a": 1 }));
        assert_eq!(
            cast_primitive_value(&decl, obj).unwrap(),
            ParamValue::Json(json!({ "a": 1 }))
        );
    }

    #[test]
    fn test_csv_integer_array() {
        let router = router();
        let decl = json!({ "type": "array", "items": { "type": "integer" } });
        let value = cast_parameter_value(&router, &decl, "ids", text("1,2,3")).unwrap();
        assert_eq!(value.to_json(), json!([1, 2, 3]));
    }

    #[test]
    fn test_collection_formats_and_lists() {
        let router = router();
        let pipes = json!({ "type": "array", "collectionFormat": "pipes", "items": { "type": "string" } });
        let value = cast_parameter_value(&router, &pipes, "tags", text("a|b")).unwrap();
        assert_eq!(value.to_json(), json!(["a", "b"]));

        let multi = json!({ "type": "array", "collectionFormat": "multi", "items": { "type": "integer" } });
        let list = RawValue::List(vec!["4".into(), "5".into()]);
        let value = cast_parameter_value(&router, &multi, "n", list).unwrap();
        assert_eq!(value.to_json(), json!([4, 5]));

        let nested = json!({
            "type": "array", "collectionFormat": "pipes",
            "items": { "type": "array", "items": { "type": "integer" } }
        });
        let value = cast_parameter_value(&router, &nested, "grid", text("1,2|3")).unwrap();
        assert_eq!(value.to_json(), json!([[1, 2], [3]]));
    }

    #[test]
    fn test_array_element_failure_is_a_field_error() {
        let router = router();
        let decl = json!({ "type": "array", "items": { "type": "integer" } });
        assert!(matches!(
            cast_parameter_value(&router, &decl, "ids", text("1,x")),
            Err(ParameterError::Field(FieldError::InvalidInteger { .. }))
        ));
    }

    #[test]
    fn test_validation_keywords() {
        let router = router();
        let decl = json!({ "type": "integer", "minimum": 1, "maximum": 100 });
        assert!(cast_parameter_value(&router, &decl, "limit", text("50")).is_ok());
        assert!(matches!(
            cast_parameter_value(&router, &decl, "limit", text("500")),
            Err(ParameterError::Field(FieldError::SchemaViolation { .. }))
        ));

        let items = json!({ "type": "array", "maxItems": 2, "items": { "type": "string" } });
        assert!(cast_parameter_value(&router, &items, "tags", text("a,b,c")).is_err());

        let pattern = json!({ "type": "string", "pattern": "^[a-z]+$" });
        assert!(cast_parameter_value(&router, &pattern, "slug", text("Nope")).is_err());
    }

    #[test]
    fn test_unsupported_collection_format_is_fatal() {
        let router = router();
        let decl = json!({ "type": "array", "collectionFormat": "semicolon", "items": { "type": "string" } });
        assert!(matches!(
            cast_parameter_value(&router, &decl, "x", text("a;b")),
            Err(ParameterError::Spec(SpecError::UnsupportedCollectionFormat { .. }))
        ));
    }

    #[test]
    fn test_schema_with_discriminator() {
        let router = router();
        let decl = json!({ "name": "pet", "in": "body", "schema": { "$ref": "#/definitions/Pet" } });

        let cat = json!({ "name": "Tom", "petType": "Cat", "huntingSkill": "lazy" });
        let value = cast_parameter_value(&router, &decl, "pet", RawValue::Json(cat.clone())).unwrap();
        assert_eq!(value, ParamValue::Json(cat));

        let lazy_cat = json!({ "name": "Tom", "petType": "Cat" });
        assert!(matches!(
            cast_parameter_value(&router, &decl, "pet", RawValue::Json(lazy_cat)),
            Err(ParameterError::Field(FieldError::SchemaViolation { .. }))
        ));

        let dragon = json!({ "name": "Smaug", "petType": "Dragon" });
        assert!(matches!(
            cast_parameter_value(&router, &decl, "pet", RawValue::Json(dragon)),
            Err(ParameterError::Field(FieldError::Discriminator { .. }))
        ));

        let missing = json!({ "petType": "Cat", "huntingSkill": "lazy" });
        assert!(matches!(
            cast_parameter_value(&router, &decl, "pet", RawValue::Json(missing)),
            Err(ParameterError::Field(FieldError::SchemaViolation { .. }))
        ));
    }
}
