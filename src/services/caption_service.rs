use base64::{engine::general_purpose, Engine as _};
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;

use crate::config;
use crate::config::CaptionConfig;

/// Pre-fill values the detect endpoint hands back to the report form.
#[derive(Debug, Clone, Serialize)]
pub struct CaptionDetection {
    pub description: String,
    #[serde(rename = "typeOfIssue")]
    pub type_of_issue: String,
    pub location: String,
}

/// Ordered keyword table mapping caption/filename text to the issue-type
/// taxonomy. First matching rule wins.
const CATEGORY_RULES: &[(&str, &[&str])] = &[
    ("pothole", &["pothole", "hole", "crack"]),
    ("streetlight", &["streetlight", "street light", "lamp"]),
    ("garbage", &["garbage", "trash", "waste", "dump"]),
    ("water", &["water leak", "sewage", "flood"]),
    ("tree", &["tree", "branch", "fallen tree"]),
    ("signal", &["signal", "traffic"]),
];

const FALLBACK_CATEGORY: &str = "other";

pub struct CaptionService {
    client: reqwest::Client,
    config: CaptionConfig,
}

impl CaptionService {
    pub fn new() -> Self {
        Self::with_config(config::config().caption.clone())
    }

    pub fn with_config(config: CaptionConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Best-effort description/category for an uploaded photo. Never fails on
    /// captioning trouble: an unreachable service degrades to text synthesized
    /// from the detected category and the filename hint.
    pub async fn detect(
        &self,
        image: &[u8],
        filename: &str,
        location: Option<&str>,
    ) -> CaptionDetection {
        let encoded = general_purpose::STANDARD.encode(image);
        let caption = self.fetch_caption(&encoded).await.unwrap_or_default();

        let hint = filename_hint(filename);
        let combined = format!("{} {}", caption, hint).to_lowercase();
        let category = classify(&combined);

        let location = location.map(str::trim).filter(|s| !s.is_empty());
        let description = compose_description(&caption, category, &hint, location);

        CaptionDetection {
            description,
            type_of_issue: category.to_string(),
            location: location.unwrap_or_default().to_string(),
        }
    }

    /// Walk the model candidate list; the first 2xx response with an
    /// extractable caption wins. Every failure mode per attempt (timeout,
    /// network error, non-2xx, unusable body) means "try the next model".
    async fn fetch_caption(&self, encoded_image: &str) -> Option<String> {
        for model in &self.config.models {
            match self.try_model(model, encoded_image).await {
                Ok(Some(caption)) => {
                    tracing::debug!(model = %model, "caption obtained");
                    return Some(caption);
                }
                Ok(None) => {
                    tracing::debug!(model = %model, "no usable caption in response");
                }
                Err(e) => {
                    tracing::warn!(model = %model, error = %e, "caption attempt failed");
                }
            }
        }
        None
    }

    async fn try_model(
        &self,
        model: &str,
        encoded_image: &str,
    ) -> Result<Option<String>, reqwest::Error> {
        let url = format!("{}/{}", self.config.endpoint.trim_end_matches('/'), model);

        let mut request = self
            .client
            .post(&url)
            .timeout(Duration::from_secs(self.config.attempt_timeout_secs))
            .json(&json!({ "inputs": encoded_image }));

        if let Some(token) = &self.config.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            tracing::debug!(model, status = %response.status(), "non-success from caption model");
            return Ok(None);
        }

        let body: Value = response.json().await?;
        Ok(extract_caption(&body))
    }
}

impl Default for CaptionService {
    fn default() -> Self {
        Self::new()
    }
}

/// Pull a caption string out of the service response. Model variants disagree
/// on the field name and on whether the payload is wrapped in an array, so
/// several known shapes are probed before giving up.
fn extract_caption(body: &Value) -> Option<String> {
    let candidate = match body {
        Value::Array(items) => items.first()?,
        other => other,
    };

    if let Some(s) = candidate.as_str() {
        let s = s.trim();
        if !s.is_empty() {
            return Some(s.to_string());
        }
    }

    for key in ["generated_text", "caption", "description", "text"] {
        if let Some(s) = candidate.get(key).and_then(Value::as_str) {
            let s = s.trim();
            if !s.is_empty() {
                return Some(s.to_string());
            }
        }
    }

    None
}

/// Hint derived from the upload's filename: numeric/timestamp prefix and
/// extension stripped, separators spaced out.
/// "2023-pothole-main-street.jpg" becomes "pothole main street".
fn filename_hint(filename: &str) -> String {
    let stem = filename
        .rsplit_once('.')
        .map(|(stem, _ext)| stem)
        .unwrap_or(filename);

    let spaced = stem.replace(['-', '_', '.'], " ");
    spaced
        .split_whitespace()
        .skip_while(|word| word.chars().all(|c| c.is_ascii_digit()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Match lowercased caption+hint text against the category table; no match
/// falls back to "other".
fn classify(text: &str) -> &'static str {
    for (category, keywords) in CATEGORY_RULES {
        if keywords.iter().any(|kw| text.contains(kw)) {
            return category;
        }
    }
    FALLBACK_CATEGORY
}

/// A caption worth showing verbatim: long enough to mean something and not an
/// error string leaked from the captioning service.
fn caption_usable(caption: &str) -> bool {
    if caption.len() <= 5 {
        return false;
    }
    let lower = caption.to_lowercase();
    !(lower.contains("error") || lower.contains("not found") || lower.contains("unavailable"))
}

fn compose_description(
    caption: &str,
    category: &str,
    hint: &str,
    location: Option<&str>,
) -> String {
    let normalized = caption.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut sentences: Vec<String> = Vec::new();

    if caption_usable(&normalized) {
        if normalized.ends_with(['.', '!', '?']) {
            sentences.push(normalized);
        } else {
            sentences.push(format!("{}.", normalized));
        }
    } else {
        if category == FALLBACK_CATEGORY {
            sentences.push("There seems to be a civic issue in the area.".to_string());
        } else {
            sentences.push(format!(
                "There seems to be a {} problem in the area.",
                category
            ));
        }
        if !hint.is_empty() {
            sentences.push(format!("The uploaded photo is labelled \"{}\".", hint));
        }
    }

    if let Some(loc) = location {
        sentences.push(format!("The problem was noticed near {}.", loc));
    }

    sentences.push("Please review and take the necessary action.".to_string());
    sentences.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_hint_strips_prefix_and_extension() {
        assert_eq!(
            filename_hint("2023-pothole-main-street.jpg"),
            "pothole main street"
        );
        assert_eq!(
            filename_hint("1693246512345_broken_lamp.png"),
            "broken lamp"
        );
        assert_eq!(filename_hint("garbage.jpeg"), "garbage");
        assert_eq!(filename_hint("12345.jpg"), "");
    }

    #[test]
    fn classify_matches_spec_taxonomy() {
        assert_eq!(classify("a large pothole on the road"), "pothole");
        assert_eq!(classify("a broken street light at night"), "streetlight");
        assert_eq!(classify("trash piled on the corner"), "garbage");
        assert_eq!(classify("sewage overflowing the drain"), "water");
        assert_eq!(classify("fallen tree near the park"), "tree");
        assert_eq!(classify("the traffic signal is dark"), "signal");
        assert_eq!(classify("a cat on a sofa"), "other");
    }

    #[test]
    fn classify_first_rule_wins() {
        // "crack" belongs to the pothole rule, which precedes water.
        assert_eq!(classify("water leak through a crack"), "pothole");
    }

    #[test]
    fn extract_caption_probes_known_shapes() {
        let array_shape = serde_json::json!([{"generated_text": "a pothole"}]);
        assert_eq!(extract_caption(&array_shape).as_deref(), Some("a pothole"));

        let caption_field = serde_json::json!({"caption": "a lamp post"});
        assert_eq!(extract_caption(&caption_field).as_deref(), Some("a lamp post"));

        let bare_string = serde_json::json!(["fallen tree"]);
        assert_eq!(extract_caption(&bare_string).as_deref(), Some("fallen tree"));

        let nothing = serde_json::json!({"score": 0.93});
        assert_eq!(extract_caption(&nothing), None);

        let empty = serde_json::json!([]);
        assert_eq!(extract_caption(&empty), None);
    }

    #[test]
    fn unusable_captions_are_rejected() {
        assert!(!caption_usable("err"));
        assert!(!caption_usable("Internal Server Error"));
        assert!(!caption_usable("model not found"));
        assert!(caption_usable("a pothole in the street"));
    }

    #[test]
    fn description_falls_back_to_category_sentence() {
        let text = compose_description("", "pothole", "pothole main street", None);
        assert!(text.contains("There seems to be a pothole problem in the area."));
        assert!(text.contains("pothole main street"));
        assert!(text.ends_with("Please review and take the necessary action."));
    }

    #[test]
    fn description_uses_caption_verbatim_when_usable() {
        let text = compose_description(
            "a  fallen tree   blocking the road",
            "tree",
            "",
            Some("Sector 12"),
        );
        assert!(text.starts_with("a fallen tree blocking the road."));
        assert!(text.contains("The problem was noticed near Sector 12."));
    }

    #[tokio::test]
    async fn detect_degrades_without_a_reachable_service() {
        // Point the service at a closed port so every attempt errors fast.
        let service = CaptionService::with_config(CaptionConfig {
            endpoint: "http://127.0.0.1:9".to_string(),
            api_token: None,
            models: vec!["any/model".to_string()],
            attempt_timeout_secs: 1,
        });

        let result = service
            .detect(b"not really an image", "2023-pothole-main-street.jpg", None)
            .await;

        assert_eq!(result.type_of_issue, "pothole");
        assert!(!result.description.is_empty());
        assert_eq!(result.location, "");
    }
}
