use regex::Regex;

use crate::error::{Error, Result};

/// Splits a cleaned tech-only query into atomic sub-queries.
///
/// `"Python, SQL and JavaScript"` becomes `["Python", "SQL", "JavaScript"]`.
pub struct QueryPlanner {
    split_re: Regex,
}

impl QueryPlanner {
    pub fn new() -> Result<Self> {
        let split_re = Regex::new(r"(?i),\s*|\s+and\s+")
            .map_err(|e| Error::Config(format!("invalid split regex: {e}")))?;
        Ok(Self { split_re })
    }

    /// Never returns an empty sequence: when every piece is blank the input
    /// string is returned as the single sub-query.
    pub fn plan(&self, cleaned_query: &str) -> Vec<String> {
        let queries: Vec<String> = self
            .split_re
            .split(cleaned_query)
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_string)
            .collect();

        if queries.is_empty() {
            vec![cleaned_query.to_string()]
        } else {
            queries
        }
    }
}
