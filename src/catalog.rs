use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One product in the assessment catalog.
///
/// The catalog is loaded once at startup and never mutated; an assessment's
/// identifier is its position in the catalog vector, stable for the process
/// lifetime. The two support flags are stored as `"Yes"`/`"No"` strings in
/// the catalog JSON and round-trip through the same representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub url: String,
    #[serde(default)]
    pub test_type: Vec<String>,
    /// Duration in minutes; `None` when the catalog does not know it.
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(with = "yes_no", default)]
    pub adaptive_support: bool,
    #[serde(with = "yes_no", default = "default_true")]
    pub remote_support: bool,
}

fn default_true() -> bool {
    true
}

impl Assessment {
    /// The canonical text a corpus embedding is computed from.
    ///
    /// Unknown durations are written as 30 minutes in the text so that the
    /// embedding input is always fully populated.
    pub fn embedding_text(&self) -> String {
        format!(
            "{}. {}. Test types: {}. Duration: {} minutes. Adaptive: {}.",
            self.name,
            self.description,
            self.test_type.join(" "),
            self.duration.unwrap_or(30),
            if self.adaptive_support { "Yes" } else { "No" },
        )
    }
}

/// Load the assessment catalog from a JSON array file.
pub fn load_catalog(path: &Path) -> Result<Vec<Assessment>> {
    let raw = std::fs::read_to_string(path)?;
    let assessments: Vec<Assessment> = serde_json::from_str(&raw)?;
    Ok(assessments)
}

mod yes_no {
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "Yes" } else { "No" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let raw = String::deserialize(deserializer)?;
        match raw.as_str() {
            "Yes" | "yes" | "true" => Ok(true),
            "No" | "no" | "false" => Ok(false),
            other => Err(de::Error::custom(format!(
                "expected \"Yes\" or \"No\", got {other:?}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"[
            {
                "name": "Java 8 (New)",
                "description": "Multi-choice test measuring Java 8 knowledge.",
                "url": "https://example.com/java-8-new/",
                "test_type": ["Knowledge & Skills"],
                "duration": 18,
                "adaptive_support": "No",
                "remote_support": "Yes"
            },
            {
                "name": "OPQ",
                "url": "https://example.com/opq/",
                "test_type": ["Personality & Behaviour"],
                "adaptive_support": "Yes",
                "remote_support": "No"
            }
        ]"#
    }

    #[test]
    fn parse_catalog_json() {
        let assessments: Vec<Assessment> = serde_json::from_str(sample_json()).unwrap();
        assert_eq!(assessments.len(), 2);

        let java = &assessments[0];
        assert_eq!(java.name, "Java 8 (New)");
        assert_eq!(java.duration, Some(18));
        assert!(!java.adaptive_support);
        assert!(java.remote_support);

        let opq = &assessments[1];
        assert_eq!(opq.description, "");
        assert_eq!(opq.duration, None);
        assert!(opq.adaptive_support);
        assert!(!opq.remote_support);
    }

    #[test]
    fn support_flags_serialize_as_yes_no() {
        let assessments: Vec<Assessment> = serde_json::from_str(sample_json()).unwrap();
        let out = serde_json::to_string(&assessments[0]).unwrap();
        assert!(out.contains("\"adaptive_support\":\"No\""));
        assert!(out.contains("\"remote_support\":\"Yes\""));
    }

    #[test]
    fn embedding_text_includes_all_fields() {
        let assessments: Vec<Assessment> = serde_json::from_str(sample_json()).unwrap();
        let text = assessments[0].embedding_text();
        assert!(text.starts_with("Java 8 (New). "));
        assert!(text.contains("Test types: Knowledge & Skills."));
        assert!(text.contains("Duration: 18 minutes."));
        assert!(text.contains("Adaptive: No."));
    }

    #[test]
    fn embedding_text_defaults_unknown_duration() {
        let assessments: Vec<Assessment> = serde_json::from_str(sample_json()).unwrap();
        let text = assessments[1].embedding_text();
        assert!(text.contains("Duration: 30 minutes."));
    }

    #[test]
    fn load_catalog_from_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("catalog.json");
        std::fs::write(&path, sample_json()).unwrap();

        let assessments = load_catalog(&path).unwrap();
        assert_eq!(assessments.len(), 2);
    }

    #[test]
    fn load_catalog_rejects_malformed_json() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("catalog.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(load_catalog(&path).is_err());
    }
}
