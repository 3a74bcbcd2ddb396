//! Decodes recommendation API bodies into `RecommendationResult`
//!
//! Decoding is lenient: missing or malformed fields fall back to defaults
//! so a reply from an older or newer server still renders. Only a body
//! that is not a JSON object at all is rejected.

use serde_json::Value;
use thiserror::Error;

use super::types::{CropPick, HealthStatus, RainfallProvenance, RecommendationResult, ResponseStatus};

const DEFAULT_CONFIDENCE: &str = "0%";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("body is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// Parse a raw response body
pub fn parse_body(body: &str) -> Result<RecommendationResult, ParseError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| ParseError::InvalidJson(e.to_string()))?;
    if !value.is_object() {
        return Err(ParseError::NotAnObject(kind_of(&value)));
    }
    Ok(parse(&value))
}

/// Build a result from an already-decoded JSON value. Never fails.
pub fn parse(json: &Value) -> RecommendationResult {
    let status = match json.get("status").and_then(Value::as_str) {
        Some("success") => ResponseStatus::Success,
        _ => ResponseStatus::Error,
    };

    let recommendations = json
        .get("recommendations")
        .and_then(Value::as_array)
        .map(|picks| picks.iter().filter_map(parse_pick).collect())
        .unwrap_or_default();

    RecommendationResult {
        status,
        recommendations,
        warnings: string_list(json.get("warnings")),
        metadata: json.get("metadata").and_then(parse_metadata),
        message: json
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
        errors: string_list(json.get("errors")),
    }
}

/// Numeric form of a confidence string such as `"95%"`.
///
/// Anything unreadable, including NaN and infinities, becomes 0.0.
pub fn confidence_value(confidence: &str) -> f64 {
    let trimmed = confidence.trim();
    let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
    match number.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

/// Decode the `GET /` health body. Returns `None` unless it is a JSON object.
pub fn parse_health(body: &str) -> Option<HealthStatus> {
    let value: Value = serde_json::from_str(body).ok()?;
    let object = value.as_object()?;
    let text = |key: &str| object.get(key).and_then(Value::as_str).map(str::to_string);
    Some(HealthStatus {
        status: text("status").unwrap_or_else(|| "unknown".to_string()),
        service: text("service"),
        model_status: text("model_status"),
    })
}

fn parse_pick(entry: &Value) -> Option<CropPick> {
    let object = entry.as_object()?;
    let crop = object.get("crop").and_then(Value::as_str)?.to_string();
    let confidence = match object.get("confidence") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => format!("{}%", n),
        _ => DEFAULT_CONFIDENCE.to_string(),
    };
    let confidence_value = confidence_value(&confidence);
    Some(CropPick {
        crop,
        confidence,
        confidence_value,
    })
}

fn parse_metadata(value: &Value) -> Option<RainfallProvenance> {
    let object = value.as_object()?;
    Some(RainfallProvenance {
        source: object
            .get("rainfall_source")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string(),
        value_used: object.get("rainfall_value_used").and_then(Value::as_f64),
    })
}

/// Collect string entries. Absent, non-array or empty lists become `None`.
fn string_list(value: Option<&Value>) -> Option<Vec<String>> {
    let items: Vec<String> = value?
        .as_array()?
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect();
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_success_body() {
        let result = parse_body(
            r#"{"status":"success","recommendations":[{"crop":"Rice","confidence":"95%"}]}"#,
        )
        .unwrap();
        assert!(result.is_success());
        assert_eq!(result.recommendations.len(), 1);
        assert_eq!(result.recommendations[0].crop, "Rice");
        assert_eq!(result.recommendations[0].confidence, "95%");
        assert_eq!(result.recommendations[0].confidence_value, 95.0);
        assert!(result.warnings.is_none());
        assert!(result.metadata.is_none());
    }

    #[test]
    fn test_parse_full_success_body() {
        let body = r#"{
            "status": "success",
            "recommendations": [
                {"crop": "Rice", "confidence": "71%"},
                {"crop": "Jute", "confidence": "18%"},
                {"crop": "Coconut", "confidence": "4%"}
            ],
            "warnings": ["Input Humidity (120.0) is above the expected maximum (100)."],
            "metadata": {"rainfall_source": "sensor", "rainfall_value_used": 202.9}
        }"#;
        let result = parse_body(body).unwrap();
        assert_eq!(result.recommendations.len(), 3);
        assert_eq!(result.top_pick().unwrap().crop, "Rice");
        assert_eq!(result.warnings.as_ref().unwrap().len(), 1);
        let metadata = result.metadata.unwrap();
        assert_eq!(metadata.source, "sensor");
        assert_eq!(metadata.value_used, Some(202.9));
    }

    #[test]
    fn test_missing_status_defaults_to_error() {
        let result = parse(&serde_json::json!({"recommendations": []}));
        assert_eq!(result.status, ResponseStatus::Error);
        assert!(!result.is_success());
    }

    #[test]
    fn test_error_body_fields() {
        let result = parse(&serde_json::json!({
            "status": "error",
            "message": "Bad input",
            "errors": ["N must be >0"]
        }));
        assert_eq!(result.message.as_deref(), Some("Bad input"));
        assert_eq!(result.errors, Some(vec!["N must be >0".to_string()]));
        assert!(result.recommendations.is_empty());
    }

    #[test]
    fn test_malformed_recommendations_default_to_empty() {
        let result = parse(&serde_json::json!({"status": "success", "recommendations": "Rice"}));
        assert!(result.recommendations.is_empty());
    }

    #[test]
    fn test_missing_confidence_defaults() {
        let result = parse(&serde_json::json!({
            "status": "success",
            "recommendations": [{"crop": "Maize"}]
        }));
        assert_eq!(result.recommendations[0].confidence, "0%");
        assert_eq!(result.recommendations[0].confidence_value, 0.0);
    }

    #[test]
    fn test_numeric_confidence_is_accepted() {
        let result = parse(&serde_json::json!({
            "status": "success",
            "recommendations": [{"crop": "Wheat", "confidence": 64}]
        }));
        assert_eq!(result.recommendations[0].confidence, "64%");
        assert_eq!(result.recommendations[0].confidence_value, 64.0);
    }

    #[test]
    fn test_malformed_confidence_is_zero() {
        assert_eq!(confidence_value("abc%"), 0.0);
        assert_eq!(confidence_value(""), 0.0);
        assert_eq!(confidence_value("%"), 0.0);
        assert_eq!(confidence_value("NaN%"), 0.0);
        assert_eq!(confidence_value(" 42.5 % "), 42.5);
        assert_eq!(confidence_value("88"), 88.0);
    }

    #[test]
    fn test_empty_lists_become_none() {
        let result = parse(&serde_json::json!({"status": "success", "warnings": [], "errors": []}));
        assert!(result.warnings.is_none());
        assert!(result.errors.is_none());
    }

    #[test]
    fn test_non_object_body_is_rejected() {
        assert!(matches!(
            parse_body("not json"),
            Err(ParseError::InvalidJson(_))
        ));
        assert_eq!(
            parse_body("[1, 2]"),
            Err(ParseError::NotAnObject("an array"))
        );
    }

    #[test]
    fn test_parsing_is_idempotent() {
        let body = r#"{"status":"success","recommendations":[{"crop":"Rice","confidence":"95%"}],"warnings":["w"]}"#;
        assert_eq!(parse_body(body).unwrap(), parse_body(body).unwrap());
    }

    #[test]
    fn test_parse_health() {
        let health = parse_health(
            r#"{"status":"ok","service":"AgriSense AI","model_status":"loaded"}"#,
        )
        .unwrap();
        assert!(health.is_ok());
        assert!(health.model_loaded());
        assert_eq!(health.service.as_deref(), Some("AgriSense AI"));
        assert!(parse_health("<html>").is_none());
    }

    proptest! {
        #[test]
        fn confidence_value_never_panics(s in ".*") {
            let value = confidence_value(&s);
            prop_assert!(value.is_finite());
        }

        #[test]
        fn parse_body_never_panics(s in ".*") {
            let _ = parse_body(&s);
        }
    }
}
