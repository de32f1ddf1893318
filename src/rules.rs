use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Current rule-table revision. Bump whenever a keyword list or weight
/// changes so tuning runs can be told apart.
pub const RULES_VERSION: u32 = 1;

/// Relative weights of the four ranking signals. Must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub tech_sim: f32,
    pub soft_skill: f32,
    pub context_sim: f32,
    pub level: f32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            tech_sim: 0.60,
            soft_skill: 0.20,
            context_sim: 0.10,
            level: 0.10,
        }
    }
}

/// Every keyword table, stop word and scoring constant the pipeline uses,
/// hoisted into one auditable structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleConfig {
    pub version: u32,

    /// Matched as substrings of the lower-cased query.
    pub soft_skill_keywords: Vec<String>,
    /// Checked before `senior_keywords`; entry wins when both families match.
    pub entry_keywords: Vec<String>,
    pub senior_keywords: Vec<String>,
    /// Removed from the cleaned tech query along with the level and
    /// soft-skill words.
    pub duration_keywords: Vec<String>,
    /// Unit tokens recognized by the duration scans ("30 minutes").
    pub duration_units: Vec<String>,
    /// Qualifier tokens recognized by the duration scans ("less than").
    pub duration_qualifiers: Vec<String>,
    /// Filler words stripped from the cleaned tech query.
    pub stop_words: Vec<String>,

    /// Marks a candidate as a soft-skill document when found in its name or
    /// description.
    pub collab_keywords: Vec<String>,
    /// Test-type tag that marks a soft-skill document outright.
    pub personality_test_type: String,

    pub weights: ScoreWeights,
    /// Multiplier applied when a soft-skill request meets a soft-skill
    /// document.
    pub soft_skill_boost: f32,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            version: RULES_VERSION,
            soft_skill_keywords: to_strings(&[
                "collaborat",
                "team",
                "teamwork",
                "lead",
                "manag",
                "supervisor",
                "personality",
                "behaviour",
                "communication",
                "opq",
            ]),
            entry_keywords: to_strings(&["entry", "junior", "graduate", "intern"]),
            senior_keywords: to_strings(&["senior", "lead", "expert", "principal"]),
            duration_keywords: to_strings(&[
                "minute", "min", "mins", "less", "maximum", "max", "under", "within", "duration",
                "time",
            ]),
            duration_units: to_strings(&["minute", "min", "minutes", "mins"]),
            duration_qualifiers: to_strings(&["less", "maximum", "max", "under", "within"]),
            stop_words: to_strings(&[
                "looking",
                "to",
                "hire",
                "who",
                "are",
                "proficient",
                "in",
                "need",
                "an",
                "assessment",
                "package",
                "that",
                "can",
                "test",
                "all",
                "skills",
                "with",
                "for",
                "a",
            ]),
            collab_keywords: to_strings(&[
                "personality",
                "behaviour",
                "communication",
                "team",
                "opq",
            ]),
            personality_test_type: "Personality & Behaviour".to_string(),
            weights: ScoreWeights::default(),
            soft_skill_boost: 1.10,
        }
    }
}

impl RuleConfig {
    /// Every word removed from the query when building the tech-only string.
    pub fn noise_words(&self) -> Vec<&str> {
        self.soft_skill_keywords
            .iter()
            .chain(&self.entry_keywords)
            .chain(&self.senior_keywords)
            .chain(&self.duration_keywords)
            .map(String::as_str)
            .collect()
    }

    /// Reject tables that cannot drive the pipeline.
    pub fn validate(&self) -> Result<()> {
        let sum = self.weights.tech_sim
            + self.weights.soft_skill
            + self.weights.context_sim
            + self.weights.level;
        if (sum - 1.0).abs() > 1e-6 {
            return Err(Error::Config(format!(
                "score weights must sum to 1.0, got {sum}"
            )));
        }
        if self.soft_skill_boost < 1.0 {
            return Err(Error::Config(format!(
                "soft_skill_boost must be >= 1.0, got {}",
                self.soft_skill_boost
            )));
        }
        if self.duration_keywords.is_empty()
            || self.duration_units.is_empty()
            || self.duration_qualifiers.is_empty()
            || self.stop_words.is_empty()
        {
            return Err(Error::Config(
                "keyword tables must be non-empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn to_strings(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rules_are_valid() {
        RuleConfig::default().validate().unwrap();
    }

    #[test]
    fn default_weights_match_reference() {
        let w = ScoreWeights::default();
        assert_eq!(w.tech_sim, 0.60);
        assert_eq!(w.soft_skill, 0.20);
        assert_eq!(w.context_sim, 0.10);
        assert_eq!(w.level, 0.10);
    }

    #[test]
    fn unbalanced_weights_rejected() {
        let mut rules = RuleConfig::default();
        rules.weights.tech_sim = 0.9;
        assert!(rules.validate().is_err());
    }

    #[test]
    fn penalizing_boost_rejected() {
        let rules = RuleConfig {
            soft_skill_boost: 0.5,
            ..Default::default()
        };
        assert!(rules.validate().is_err());
    }

    #[test]
    fn noise_words_cover_all_families() {
        let rules = RuleConfig::default();
        let noise = rules.noise_words();
        assert!(noise.contains(&"collaborat"));
        assert!(noise.contains(&"junior"));
        assert!(noise.contains(&"principal"));
        assert!(noise.contains(&"minute"));
    }

    #[test]
    fn serde_roundtrip() {
        let rules = RuleConfig::default();
        let json = serde_json::to_string(&rules).unwrap();
        let back: RuleConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(rules, back);
    }
}
