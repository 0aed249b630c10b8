//! Artifact extraction over opaque completion payloads
//!
//! The generation collaborator does not guarantee the shape of a completed
//! operation's `response` object — the video URI has been observed at
//! several different paths across API revisions. Extraction is a tagged
//! search over an ordered table of known variants, probed in sequence; the
//! first present path wins. New response shapes get a new table row, not a
//! new branch.

use serde_json::Value;

/// Known completion-payload variants, in probe order.
///
/// Each entry is `(variant tag, JSON pointer to the video URI)`.
pub const ARTIFACT_VARIANTS: &[(&str, &str)] = &[
    (
        "generate_video_response.samples.uri",
        "/generateVideoResponse/generatedSamples/0/uri",
    ),
    (
        "generate_video_response.samples.video.uri",
        "/generateVideoResponse/generatedSamples/0/video/uri",
    ),
    ("generated_video.uri", "/generatedVideo/uri"),
    ("candidates.video.uri", "/candidates/0/video/uri"),
];

/// An extracted artifact reference, tagged with the variant that matched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub url: String,
    /// Which table row produced the URL
    pub variant: &'static str,
}

/// Probe the completion payload against [`ARTIFACT_VARIANTS`] in order.
/// Returns `None` when no known variant is present.
pub fn extract_artifact_url(response: &Value) -> Option<Artifact> {
    for (variant, pointer) in ARTIFACT_VARIANTS {
        if let Some(url) = response.pointer(pointer).and_then(Value::as_str) {
            return Some(Artifact {
                url: url.to_string(),
                variant,
            });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_samples_uri_variant() {
        let response = json!({
            "generateVideoResponse": {
                "generatedSamples": [{ "uri": "https://video.example/a.mp4" }]
            }
        });
        let artifact = extract_artifact_url(&response).expect("variant A");
        assert_eq!(artifact.url, "https://video.example/a.mp4");
        assert_eq!(artifact.variant, "generate_video_response.samples.uri");
    }

    #[test]
    fn extracts_nested_video_uri_variant() {
        let response = json!({
            "generateVideoResponse": {
                "generatedSamples": [{ "video": { "uri": "https://video.example/b.mp4" } }]
            }
        });
        let artifact = extract_artifact_url(&response).expect("variant B");
        assert_eq!(artifact.url, "https://video.example/b.mp4");
        assert_eq!(artifact.variant, "generate_video_response.samples.video.uri");
    }

    #[test]
    fn extracts_generated_video_variant() {
        let response = json!({ "generatedVideo": { "uri": "https://video.example/c.mp4" } });
        let artifact = extract_artifact_url(&response).expect("variant C");
        assert_eq!(artifact.url, "https://video.example/c.mp4");
        assert_eq!(artifact.variant, "generated_video.uri");
    }

    #[test]
    fn extracts_candidates_variant() {
        let response = json!({
            "candidates": [{ "video": { "uri": "https://video.example/d.mp4" } }]
        });
        let artifact = extract_artifact_url(&response).expect("variant D");
        assert_eq!(artifact.url, "https://video.example/d.mp4");
        assert_eq!(artifact.variant, "candidates.video.uri");
    }

    #[test]
    fn first_present_variant_wins() {
        // both variant A and variant C present; A is earlier in the table
        let response = json!({
            "generateVideoResponse": {
                "generatedSamples": [{ "uri": "https://video.example/a.mp4" }]
            },
            "generatedVideo": { "uri": "https://video.example/c.mp4" }
        });
        let artifact = extract_artifact_url(&response).expect("some variant");
        assert_eq!(artifact.url, "https://video.example/a.mp4");
    }

    #[test]
    fn unknown_shape_yields_none() {
        let response = json!({ "somethingElse": { "uri": "https://video.example/x.mp4" } });
        assert!(extract_artifact_url(&response).is_none());
    }

    #[test]
    fn non_string_uri_yields_none() {
        let response = json!({ "generatedVideo": { "uri": 42 } });
        assert!(extract_artifact_url(&response).is_none());
    }
}
