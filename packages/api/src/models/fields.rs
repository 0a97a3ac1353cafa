//! Field-level helpers shared by the payload validators.

use serde::{Deserialize, Deserializer};
use uuid::Uuid;

use crate::error::ApiError;

/// Empty or whitespace-only strings become `None`.
pub(crate) fn optional(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// A present, non-blank string.
pub(crate) fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.trim().is_empty())
}

/// Parse the `id` field of update/delete payloads.
pub(crate) fn require_id(id: Option<String>) -> Result<Uuid, ApiError> {
    let id = optional(id).ok_or_else(|| ApiError::bad_request("Missing required field: id"))?;
    Uuid::parse_str(id.trim()).map_err(|_| ApiError::bad_request(format!("Invalid id: {id}")))
}

/// Body of the delete functions: `{"id": "..."}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IdInput {
    pub id: Option<String>,
}

impl IdInput {
    pub fn validate(self) -> Result<Uuid, ApiError> {
        require_id(self.id)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

/// Accepts `"2004"` as well as `2004`; `null` and absent map to `None`.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<StringOrNumber>::deserialize(deserializer)?.map(|value| match value {
            StringOrNumber::String(s) => s,
            StringOrNumber::Number(n) => n.to_string(),
        }),
    )
}

/// Accepts `1.7` as well as `"1.7"`; blank strings map to `None`.
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<StringOrNumber>::deserialize(deserializer)? {
        None => Ok(None),
        Some(StringOrNumber::Number(n)) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("number out of range: {n}"))),
        Some(StringOrNumber::String(s)) if s.trim().is_empty() => Ok(None),
        Some(StringOrNumber::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("not a number: {s}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "lenient_string")]
        text: Option<String>,
        #[serde(default, deserialize_with = "lenient_f64")]
        number: Option<f64>,
    }

    #[test]
    fn test_lenient_fields() {
        let probe: Probe = serde_json::from_str(r#"{"text": 2004, "number": "1.7"}"#).unwrap();
        assert_eq!(probe.text.as_deref(), Some("2004"));
        assert_eq!(probe.number, Some(1.7));

        let probe: Probe = serde_json::from_str(r#"{"text": null, "number": ""}"#).unwrap();
        assert_eq!(probe.text, None);
        assert_eq!(probe.number, None);

        let probe: Probe = serde_json::from_str("{}").unwrap();
        assert_eq!(probe.text, None);
        assert_eq!(probe.number, None);

        assert!(serde_json::from_str::<Probe>(r#"{"number": "abc"}"#).is_err());
    }

    #[test]
    fn test_require_id() {
        assert_eq!(
            require_id(None),
            Err(ApiError::bad_request("Missing required field: id"))
        );
        assert_eq!(
            require_id(Some("".into())),
            Err(ApiError::bad_request("Missing required field: id"))
        );
        assert!(matches!(require_id(Some("nope".into())), Err(ApiError::BadRequest(_))));

        let id = Uuid::new_v4();
        assert_eq!(require_id(Some(id.to_string())), Ok(id));
    }
}
