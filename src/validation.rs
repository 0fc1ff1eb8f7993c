//! Request body validation.
//!
//! Bodies are checked in two passes: shape (every declared field present and
//! of the right JSON type) and then field constraints through
//! [`validator::Validate`]. Either pass reports every offending field at once
//! as an [`ApiError::Validation`].

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::{header, HeaderMap},
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use validator::{Validate, ValidationErrors};

use crate::error::{ApiError, FieldError};

/// Field-by-field reader over a JSON object body.
pub struct Fields<'a> {
    obj: &'a Map<String, Value>,
    errors: Vec<FieldError>,
}

impl<'a> Fields<'a> {
    pub fn new(obj: &'a Map<String, Value>) -> Self {
        Self {
            obj,
            errors: Vec::new(),
        }
    }

    /// Reads a required field, recording a `missing` or `invalid_type` error
    /// when it is absent or does not deserialize as `T`.
    pub fn required<T: DeserializeOwned>(&mut self, name: &str) -> Option<T> {
        let Some(raw) = self.obj.get(name) else {
            self.errors
                .push(FieldError::body(name, "Field required", "missing"));
            return None;
        };
        match serde_json::from_value::<T>(raw.clone()) {
            Ok(v) => Some(v),
            Err(e) => {
                self.errors
                    .push(FieldError::body(name, e.to_string(), "invalid_type"));
                None
            }
        }
    }

    /// Reads a required integer field. Besides JSON integers this accepts
    /// whole-number floats (`60.0`) and digit strings (`"60"`, `" -3 "`).
    pub fn integer(&mut self, name: &str) -> Option<i64> {
        let Some(raw) = self.obj.get(name) else {
            self.errors
                .push(FieldError::body(name, "Field required", "missing"));
            return None;
        };
        let parsed = match raw {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(whole_f64)),
            Value::String(s) => parse_int_str(s),
            _ => None,
        };
        if parsed.is_none() {
            self.errors.push(FieldError::body(
                name,
                "Input should be a valid integer",
                "invalid_type",
            ));
        }
        parsed
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }
}

fn whole_f64(f: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, hence the strict upper bound
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn parse_int_str(s: &str) -> Option<i64> {
    let s = s.trim();
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Types that can be assembled from a JSON object body.
pub trait FromBody: Sized {
    /// Returns `None` if any field failed; failures are recorded on `fields`.
    fn from_fields(fields: &mut Fields<'_>) -> Option<Self>;
}

/// Parses and validates an object body.
pub fn parse_body<T>(value: Value) -> Result<T, ApiError>
where
    T: FromBody + Validate,
{
    let Value::Object(obj) = value else {
        return Err(ApiError::Validation(vec![FieldError::new(
            &["body"],
            "Input should be a valid dictionary",
            "dict_type",
        )]));
    };

    let mut fields = Fields::new(&obj);
    let parsed = T::from_fields(&mut fields);
    let errors = fields.into_errors();
    let item = match parsed {
        Some(item) if errors.is_empty() => item,
        _ => return Err(ApiError::Validation(errors)),
    };

    item.validate()
        .map_err(|e| ApiError::Validation(constraint_errors(&e)))?;
    Ok(item)
}

fn constraint_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let field = field.to_string();
            errs.iter().map(move |e| {
                let msg = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("invalid value for {}", field));
                FieldError::body(&field, msg, e.code.to_string())
            })
        })
        .collect();
    // field_errors() is a HashMap; keep the response stable
    out.sort_by(|a, b| a.loc.cmp(&b.loc));
    out
}

/// JSON body extractor that rejects with a 422 and field-level detail.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: FromBody + Validate + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !json_content_type(req.headers()) {
            return Err(invalid_json("Expected request with `Content-Type: application/json`"));
        }
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| invalid_json(rejection.body_text()))?;
        let value: Value = serde_json::from_slice(&bytes)
            .map_err(|e| invalid_json(format!("JSON decode error: {e}")))?;
        parse_body(value).map(ValidatedJson)
    }
}

fn invalid_json(msg: impl Into<String>) -> ApiError {
    ApiError::Validation(vec![FieldError::new(&["body"], msg, "json_invalid")])
}

/// A missing Content-Type counts as JSON; otherwise it must be
/// `application/json` or an `application/*+json` type.
fn json_content_type(headers: &HeaderMap) -> bool {
    let Some(value) = headers.get(header::CONTENT_TYPE) else {
        return true;
    };
    let Ok(value) = value.to_str() else {
        return false;
    };
    let essence = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match essence.split_once('/') {
        Some(("application", subtype)) => subtype == "json" || subtype.ends_with("+json"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Validate)]
    struct Sample {
        #[validate(length(min = 1, code = "string_too_short"))]
        name: String,
        #[validate(range(min = 10, code = "greater_than", message = "too small"))]
        size: i64,
    }

    impl FromBody for Sample {
        fn from_fields(fields: &mut Fields<'_>) -> Option<Self> {
            let name = fields.required("name");
            let size = fields.integer("size");
            Some(Self {
                name: name?,
                size: size?,
            })
        }
    }

    fn errors_of(value: Value) -> Vec<FieldError> {
        match parse_body::<Sample>(value) {
            Err(ApiError::Validation(errs)) => errs,
            other => panic!("expected validation error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn accepts_valid_object() {
        let s: Sample = parse_body(json!({ "name": "a", "size": 12, "extra": true })).unwrap();
        assert_eq!(s.name, "a");
        assert_eq!(s.size, 12);
    }

    #[test]
    fn reports_every_missing_field() {
        let errs = errors_of(json!({}));
        assert_eq!(errs.len(), 2);
        assert!(errs.iter().all(|e| e.kind == "missing"));
        assert_eq!(errs[0].loc, vec!["body", "name"]);
        assert_eq!(errs[1].loc, vec!["body", "size"]);
    }

    #[test]
    fn reports_wrong_types() {
        let errs = errors_of(json!({ "name": 3, "size": "big" }));
        assert_eq!(errs.len(), 2);
        assert!(errs.iter().all(|e| e.kind == "invalid_type"));
    }

    #[test]
    fn runs_constraints_after_shape() {
        let errs = errors_of(json!({ "name": "", "size": 1 }));
        assert_eq!(errs.len(), 2);
        assert_eq!(errs[0].loc, vec!["body", "name"]);
        assert_eq!(errs[0].kind, "string_too_short");
        assert_eq!(errs[1].kind, "greater_than");
        assert_eq!(errs[1].msg, "too small");
    }

    #[test]
    fn integers_accept_whole_floats_and_digit_strings() {
        for raw in [json!(60), json!(60.0), json!("60"), json!(" 60 "), json!("+60")] {
            let s: Sample = parse_body(json!({ "name": "a", "size": raw })).unwrap();
            assert_eq!(s.size, 60);
        }
        // a signed string parses, then fails the range check rather than the type check
        let errs = errors_of(json!({ "name": "a", "size": "-3" }));
        assert_eq!(errs[0].kind, "greater_than");
    }

    #[test]
    fn integers_reject_fractions_and_words() {
        for raw in [json!(60.5), json!("long"), json!("6 0"), json!("60.0"), json!(true), json!(null), json!("")] {
            let errs = errors_of(json!({ "name": "a", "size": raw.clone() }));
            assert_eq!(errs.len(), 1, "for {raw}");
            assert_eq!(errs[0].loc, vec!["body", "size"]);
            assert_eq!(errs[0].kind, "invalid_type");
        }
    }

    #[test]
    fn content_type_rules() {
        let with = |ct: &str| {
            let mut h = HeaderMap::new();
            h.insert(header::CONTENT_TYPE, ct.parse().unwrap());
            json_content_type(&h)
        };
        assert!(json_content_type(&HeaderMap::new()));
        assert!(with("application/json"));
        assert!(with("Application/JSON; charset=utf-8"));
        assert!(with("application/vnd.api+json"));
        assert!(!with("text/plain"));
        assert!(!with("application/x-www-form-urlencoded"));
    }

    #[test]
    fn rejects_non_object() {
        let errs = errors_of(json!([1, 2, 3]));
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].kind, "dict_type");
        assert_eq!(errs[0].loc, vec!["body"]);
    }
}
