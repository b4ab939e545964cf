use serde::Deserialize;
use std::cell::Cell;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::app::ports::{NameMatch, NameMatcher};
use crate::config::NameServiceConfig;
use crate::error::NameServiceError;

/// Blocking client for the TNRS `matchNames` endpoint.
pub struct TnrsClient {
    client: reqwest::blocking::Client,
    base_url: reqwest::Url,
    max_retries: u32,
    backoff: Duration,
    delay: Duration,
    last_request: Cell<Option<Instant>>,
}

#[derive(Debug, Deserialize)]
struct MatchResponse {
    #[serde(default)]
    items: Vec<MatchItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MatchItem {
    accepted_name: Option<String>,
    accepted_author: Option<String>,
    scientific_score: Option<serde_json::Value>,
}

impl TnrsClient {
    pub fn new(config: &NameServiceConfig) -> Result<Self, NameServiceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .user_agent(concat!("specimen_migrator/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let base_url = reqwest::Url::parse(config.url.trim_end_matches('?'))
            .map_err(|e| NameServiceError::InvalidUrl(format!("{}: {}", config.url, e)))?;
        Ok(Self {
            client,
            base_url,
            max_retries: config.max_retries,
            backoff: Duration::from_millis(config.backoff_ms),
            delay: Duration::from_millis(config.delay_ms),
            last_request: Cell::new(None),
        })
    }

    /// Request URL for a candidate name; words are joined with `%20`.
    pub fn request_url(&self, candidate: &str) -> String {
        let words = candidate.split_whitespace().collect::<Vec<_>>().join(" ");
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("retrieve", "best")
            .append_pair("names", &words);
        // Form encoding writes spaces as '+' and a literal '+' as %2B
        let query = url.query().map(|q| q.replace('+', "%20"));
        url.set_query(query.as_deref());
        url.to_string()
    }

    fn throttle(&self) {
        if let Some(last) = self.last_request.get() {
            let elapsed = last.elapsed();
            if elapsed < self.delay {
                std::thread::sleep(self.delay - elapsed);
            }
        }
        self.last_request.set(Some(Instant::now()));
    }

    fn fetch(&self, candidate: &str) -> Result<NameMatch, NameServiceError> {
        self.throttle();
        let url = self.request_url(candidate);
        debug!(%url, "Querying name service");
        let resp = self.client.get(&url).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(NameServiceError::Status(status.as_u16()));
        }
        let body = resp.text()?;
        parse_response(&body, candidate)
    }
}

impl NameMatcher for TnrsClient {
    fn best_match(&self, candidate: &str) -> Result<NameMatch, NameServiceError> {
        let mut attempt = 0;
        loop {
            match self.fetch(candidate) {
                Ok(found) => return Ok(found),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    let wait = self.backoff * 2u32.saturating_pow(attempt);
                    warn!(
                        candidate,
                        attempt = attempt + 1,
                        wait_ms = wait.as_millis() as u64,
                        "Name service request failed, retrying: {}",
                        e
                    );
                    std::thread::sleep(wait);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Extract the first (best) match from a `matchNames` response body.
pub fn parse_response(body: &str, candidate: &str) -> Result<NameMatch, NameServiceError> {
    let response: MatchResponse = serde_json::from_str(body)?;
    let best = response
        .items
        .into_iter()
        .next()
        .ok_or_else(|| NameServiceError::NoMatches(candidate.to_string()))?;

    let (raw, parsed) = match &best.scientific_score {
        Some(serde_json::Value::String(s)) => (s.clone(), s.trim().parse::<f64>().ok()),
        Some(serde_json::Value::Number(n)) => (n.to_string(), n.as_f64()),
        other => (other.as_ref().map(|v| v.to_string()).unwrap_or_default(), None),
    };
    // Scores are probabilities; NaN fails the range check too
    let score = parsed
        .filter(|score| (0.0..=1.0).contains(score))
        .ok_or(NameServiceError::InvalidScore(raw))?;

    Ok(NameMatch {
        accepted_name: best.accepted_name.unwrap_or_default(),
        accepted_author: best.accepted_author.unwrap_or_default(),
        score,
    })
}
