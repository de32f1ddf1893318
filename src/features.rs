use regex::Regex;

use crate::{
    error::{Error, Result},
    rules::RuleConfig,
};

/// Seniority implied by the query. Defaults to `Mid` when nothing matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoleLevel {
    Entry,
    #[default]
    Mid,
    Senior,
}

/// Structured intent derived from a raw query.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Features {
    pub soft_skill_requested: bool,
    pub role_level: RoleLevel,
    pub max_duration: Option<u32>,
}

/// Rule-based feature extraction over a raw query string.
///
/// All regexes are compiled once at construction from the rule tables;
/// `extract` itself never fails on non-empty input.
pub struct FeatureExtractor {
    rules: RuleConfig,
    noise_re: Regex,
    stop_re: Regex,
    whitespace_re: Regex,
    /// "30 minutes ... less/max/under/within"
    duration_leading_re: Regex,
    /// "less/max/under/within ... 30 minutes"
    duration_trailing_re: Regex,
}

impl FeatureExtractor {
    pub fn new(rules: RuleConfig) -> Result<Self> {
        rules.validate()?;

        let noise_re = word_alternation(&rules.noise_words())?;
        let stop_re = word_alternation(
            &rules.stop_words.iter().map(String::as_str).collect::<Vec<_>>(),
        )?;

        let units = escape_join(&rules.duration_units);
        let qualifiers = escape_join(&rules.duration_qualifiers);
        let duration_leading_re =
            compile(&format!(r"(\d+)\s*(?:{units}).*?(?:{qualifiers})"))?;
        let duration_trailing_re =
            compile(&format!(r"(?:{qualifiers}).*?(\d+)\s*(?:{units})"))?;

        Ok(Self {
            rules,
            noise_re,
            stop_re,
            whitespace_re: compile(r"\s+")?,
            duration_leading_re,
            duration_trailing_re,
        })
    }

    pub fn rules(&self) -> &RuleConfig {
        &self.rules
    }

    /// Derive `(Features, cleaned_tech_query)` from a raw query.
    ///
    /// Keyword detection runs on the lower-cased query; the cleaned string
    /// keeps the original casing. If cleaning strips everything, the raw
    /// query is returned unchanged so retrieval always has input.
    pub fn extract(&self, query: &str) -> (Features, String) {
        let query_lower = query.to_lowercase();

        let soft_skill_requested = self
            .rules
            .soft_skill_keywords
            .iter()
            .any(|w| query_lower.contains(w.as_str()));

        let role_level = self.detect_level(&query_lower);
        let max_duration = self.detect_duration(&query_lower);

        let cleaned = self.noise_re.replace_all(query, "");
        let cleaned = self.stop_re.replace_all(&cleaned, "");
        let cleaned = self
            .whitespace_re
            .replace_all(&cleaned, " ")
            .trim()
            .to_string();

        let cleaned_tech_query = if cleaned.is_empty() {
            query.to_string()
        } else {
            cleaned
        };

        (
            Features {
                soft_skill_requested,
                role_level,
                max_duration,
            },
            cleaned_tech_query,
        )
    }

    /// Entry beats senior when both families match; no match keeps `Mid`.
    fn detect_level(&self, query_lower: &str) -> RoleLevel {
        let mentions_level = self
            .rules
            .entry_keywords
            .iter()
            .chain(&self.rules.senior_keywords)
            .any(|w| query_lower.contains(w.as_str()));
        if !mentions_level {
            return RoleLevel::Mid;
        }

        if self
            .rules
            .entry_keywords
            .iter()
            .any(|w| query_lower.contains(w.as_str()))
        {
            RoleLevel::Entry
        } else if self
            .rules
            .senior_keywords
            .iter()
            .any(|w| query_lower.contains(w.as_str()))
        {
            RoleLevel::Senior
        } else {
            RoleLevel::Mid
        }
    }

    /// The number-leading scan wins over the qualifier-leading one, and only
    /// the first (leftmost) match of the winning scan is used.
    fn detect_duration(&self, query_lower: &str) -> Option<u32> {
        if let Some(caps) = self.duration_leading_re.captures(query_lower) {
            return caps[1].parse().ok();
        }
        self.duration_trailing_re
            .captures(query_lower)
            .and_then(|caps| caps[1].parse().ok())
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::Config(format!("invalid rule regex: {e}")))
}

/// Whole-word, case-insensitive alternation over a keyword list.
fn word_alternation(words: &[&str]) -> Result<Regex> {
    let escaped: Vec<String> = words.iter().map(|w| regex::escape(w)).collect();
    compile(&format!(r"(?i)\b(?:{})\b", escaped.join("|")))
}

fn escape_join(words: &[String]) -> String {
    words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|")
}
