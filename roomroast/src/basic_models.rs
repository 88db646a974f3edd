use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumString, IntoStaticStr, VariantArray};

/// How hard the room gets roasted. Picks both the prompt and the scores.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr,
    VariantArray,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Intensity {
    Gentle,
    #[default]
    Medium,
    Savage,
}

impl Intensity {
    /// Resolve the intensity sent by a caller.
    /// Anything missing or unrecognized is treated as `Medium`.
    pub fn from_label(label: Option<&str>) -> Self {
        label.and_then(|l| l.parse().ok()).unwrap_or_default()
    }
}

/// What the presentation layer sends to `/api/roast`.
#[derive(Deserialize, Serialize, Clone, Default)]
pub struct RoastRequest {
    /// Base64 image, optionally with a `data:image/...;base64,` header
    #[serde(default, deserialize_with = "string_or_empty")]
    pub image: String,
    #[serde(default, deserialize_with = "string_or_none")]
    pub intensity: Option<String>,
}

/// Anything a browser might put in a text field.
#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Text(String),
    Other(serde::de::IgnoredAny),
}

/// Strings pass through; null, numbers, objects and the like become `None`.
fn string_or_none<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Loose::deserialize(d)? {
        Loose::Text(s) => Some(s),
        Loose::Other(_) => None,
    })
}

fn string_or_empty<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(string_or_none(d)?.unwrap_or_default())
}

impl std::fmt::Debug for RoastRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoastRequest")
            .field("image", &self.image.len())
            .field("intensity", &self.intensity)
            .finish()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Score {
    pub label: String,
    pub value: u8,
}

impl Score {
    pub fn new(label: &str, value: u8) -> Self {
        Self {
            label: label.to_string(),
            value,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct RoastResult {
    pub roast: String,
    pub scores: Vec<Score>,
}

/// Body of every failed response.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
    pub details: String,
}

/// Whether the inference server answers, and what it has installed.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, Default)]
pub struct InferenceStatus {
    pub online: bool,
    #[serde(default)]
    pub models: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_labels_parse() {
        assert_eq!(Intensity::from_label(Some("gentle")), Intensity::Gentle);
        assert_eq!(Intensity::from_label(Some("medium")), Intensity::Medium);
        assert_eq!(Intensity::from_label(Some("savage")), Intensity::Savage);
    }

    #[test]
    fn unknown_or_missing_labels_fall_back_to_medium() {
        assert_eq!(Intensity::from_label(None), Intensity::Medium);
        assert_eq!(Intensity::from_label(Some("")), Intensity::Medium);
        assert_eq!(Intensity::from_label(Some("nuclear")), Intensity::Medium);
        // Matching is exact, like the browser client sends it
        assert_eq!(Intensity::from_label(Some("Savage")), Intensity::Medium);
    }

    #[test]
    fn intensity_displays_lowercase() {
        assert_eq!(Intensity::Savage.to_string(), "savage");
        let name: &'static str = Intensity::Gentle.into();
        assert_eq!(name, "gentle");
    }

    #[test]
    fn request_fields_are_optional_on_the_wire() {
        let request: RoastRequest = serde_json::from_str("{}").unwrap();
        assert!(request.image.is_empty());
        assert!(request.intensity.is_none());

        let request: RoastRequest =
            serde_json::from_str(r#"{"image": "abc", "intensity": "savage"}"#).unwrap();
        assert_eq!(request.image, "abc");
        assert_eq!(request.intensity.as_deref(), Some("savage"));
    }

    #[test]
    fn non_string_fields_are_treated_as_missing() {
        let request: RoastRequest =
            serde_json::from_str(r#"{"image": null, "intensity": 5}"#).unwrap();
        assert!(request.image.is_empty());
        assert!(request.intensity.is_none());

        for intensity in ["true", "null", "{}", "[\"savage\"]"] {
            let body = format!(r#"{{"image": "QUJD", "intensity": {}}}"#, intensity);
            let request: RoastRequest = serde_json::from_str(&body).unwrap();
            assert_eq!(request.image, "QUJD");
            assert_eq!(Intensity::from_label(request.intensity.as_deref()), Intensity::Medium);
        }
    }

    #[test]
    fn debug_does_not_dump_the_image() {
        let request = RoastRequest {
            image: "A".repeat(5000),
            intensity: None,
        };
        let printed = format!("{:?}", request);
        assert!(printed.contains("5000"));
        assert!(printed.len() < 100);
    }

    #[test]
    fn offline_status_omits_empty_detail() {
        let status = InferenceStatus {
            online: true,
            models: vec!["moondream:latest".into()],
            detail: None,
        };
        let json = serde_json::to_value(&status).unwrap();
        assert!(json.get("detail").is_none());
        assert_eq!(json["models"][0], "moondream:latest");
    }
}
