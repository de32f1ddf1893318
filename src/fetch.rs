use std::time::Duration;

use regex::Regex;

use crate::error::{Error, Result};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// The text-fetch collaborator: URL in, plain text (or nothing) out.
///
/// The pipeline never parses HTML itself; an implementation that wants
/// content extraction does it behind this boundary.
pub trait TextFetcher {
    /// `Ok(None)` means the source yielded no usable text; transport
    /// failures are `Err(Error::Fetch)`.
    fn fetch(&self, url: &str) -> Result<Option<String>>;
}

/// Plain HTTP fetcher: downloads the response body as text with a browser
/// user agent and a request timeout, collapsing whitespace.
pub struct HttpTextFetcher {
    client: reqwest::blocking::Client,
    whitespace_re: Regex,
}

impl HttpTextFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| Error::Fetch(format!("failed to build HTTP client: {e}")))?;
        let whitespace_re =
            Regex::new(r"\s+").map_err(|e| Error::Config(format!("invalid regex: {e}")))?;
        Ok(Self {
            client,
            whitespace_re,
        })
    }

    fn normalize(&self, raw: &str) -> Option<String> {
        let collapsed = self.whitespace_re.replace_all(raw, " ");
        let trimmed = collapsed.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

impl TextFetcher for HttpTextFetcher {
    fn fetch(&self, url: &str) -> Result<Option<String>> {
        let response = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::Fetch(format!("{url}: {e}")))?;
        let body = response
            .text()
            .map_err(|e| Error::Fetch(format!("{url}: {e}")))?;
        Ok(self.normalize(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_whitespace() {
        let fetcher = HttpTextFetcher::new().unwrap();
        assert_eq!(
            fetcher.normalize("  a\n\t b   c \r\n"),
            Some("a b c".to_string())
        );
    }

    #[test]
    fn normalize_blank_body_is_none() {
        let fetcher = HttpTextFetcher::new().unwrap();
        assert_eq!(fetcher.normalize("   \n\t "), None);
    }
}
