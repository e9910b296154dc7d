//! Response envelope classification (decoded-payload path).
//!
//! Given the value decoded from a legacy response, resolve it into exactly
//! one [`Envelope`] variant. Evaluation order is strict and documented:
//! no-data sentinel first, business-error descriptor second, success last.
//! The exception path (thrown transport failures) is classified in
//! `transport::classify`, not here — this function is pure and
//! side-effect-free so it can be tested exhaustively from literal shapes.

use serde_json::Value;
use types::Envelope;

/// Key marking the well-formed "no data" sentinel.
const NO_DATA_KEY: &str = "noData";
/// Key carrying the business-error descriptor.
const ERROR_INFO_KEY: &str = "errorInfo";

/// Classify one decoded legacy payload.
///
/// - `None` or JSON null → [`Envelope::Empty`]
/// - object tagged `noData` → [`Envelope::Empty`]
/// - object carrying `errorInfo { code, message }` → [`Envelope::BusinessError`]
/// - anything else → [`Envelope::Success`] with the payload cloned through
///
/// Empty is never an error at this layer; callers decide whether absence
/// of data is itself exceptional.
pub fn classify(decoded: Option<&Value>) -> Envelope<Value> {
    let Some(payload) = decoded else {
        return Envelope::Empty;
    };
    if payload.is_null() {
        return Envelope::Empty;
    }
    if let Some(object) = payload.as_object() {
        if object.contains_key(NO_DATA_KEY) {
            return Envelope::Empty;
        }
        if let Some(info) = object.get(ERROR_INFO_KEY) {
            return Envelope::BusinessError {
                code: info.get("code").and_then(Value::as_i64).unwrap_or(500),
                message: info
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            };
        }
    }
    Envelope::Success(payload.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_payload_is_empty() {
        assert_eq!(classify(None), Envelope::Empty);
        assert_eq!(classify(Some(&Value::Null)), Envelope::Empty);
    }

    #[test]
    fn no_data_sentinel_is_empty() {
        // { noData: true } → Empty
        let payload = json!({ "noData": true });
        assert_eq!(classify(Some(&payload)), Envelope::Empty);
    }

    #[test]
    fn error_descriptor_is_business_error() {
        // errorInfo { 404, "not found" } → BusinessError
        let payload = json!({ "errorInfo": { "code": 404, "message": "not found" } });
        assert_eq!(
            classify(Some(&payload)),
            Envelope::BusinessError {
                code: 404,
                message: "not found".to_string(),
            }
        );
    }

    #[test]
    fn plain_payload_is_success() {
        let payload = json!({ "archiveUrl": ["http://example/1.zip"] });
        assert_eq!(classify(Some(&payload)), Envelope::Success(payload.clone()));
    }

    #[test]
    fn sentinel_wins_over_error_descriptor() {
        // Strict evaluation order: sentinel first, then error descriptor.
        let payload = json!({
            "noData": true,
            "errorInfo": { "code": 1, "message": "ignored" }
        });
        assert_eq!(classify(Some(&payload)), Envelope::Empty);
    }

    #[test]
    fn malformed_error_descriptor_still_classifies_as_error() {
        let payload = json!({ "errorInfo": {} });
        assert_eq!(
            classify(Some(&payload)),
            Envelope::BusinessError {
                code: 500,
                message: String::new(),
            }
        );
    }

    #[test]
    fn every_shape_matches_exactly_one_variant() {
        // Exhaustiveness over the three decoded shapes plus null.
        let shapes = [
            json!({ "noData": true }),
            json!({ "errorInfo": { "code": 7, "message": "x" } }),
            json!({ "contractList": {} }),
            Value::Null,
        ];
        let mut seen = Vec::new();
        for shape in &shapes {
            let variants = [
                matches!(classify(Some(shape)), Envelope::Empty),
                matches!(classify(Some(shape)), Envelope::BusinessError { .. }),
                matches!(classify(Some(shape)), Envelope::Success(_)),
            ];
            assert_eq!(variants.iter().filter(|v| **v).count(), 1);
            seen.push(variants);
        }
        assert_eq!(seen[0], [true, false, false]);
        assert_eq!(seen[1], [false, true, false]);
        assert_eq!(seen[2], [false, false, true]);
        assert_eq!(seen[3], [true, false, false]);
    }

    #[test]
    fn non_object_scalar_payload_is_success() {
        let payload = json!("raw-token");
        assert_eq!(classify(Some(&payload)), Envelope::Success(payload.clone()));
    }
}
