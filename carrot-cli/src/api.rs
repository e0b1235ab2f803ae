/// Client for the contest platform's public JSON API.
///
/// Every method returns the `result` field of the `{status, result, comment}`
/// envelope, or a human-readable error that includes the response body.
use carrot_core::constants::RATING_CHANGES_UNAVAILABLE;
use carrot_core::contest::{Contest, ContestPhase, RatedUser, RatingChange, Standings};
use carrot_core::RatingChangesLookup;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://codeforces.com/api";

/// Configuration for the API endpoint.
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    status: String,
    result: Option<T>,
}

/// Unwrap an API envelope. The raw text is kept in errors so callers can
/// match on the remote's message.
fn parse_envelope<T: DeserializeOwned>(text: &str) -> Result<T, String> {
    let envelope: Envelope<T> =
        serde_json::from_str(text).map_err(|_| format!("API: Invalid JSON: {text}"))?;
    match envelope {
        Envelope { status, result: Some(result) } if status == "OK" => Ok(result),
        _ => Err(format!("API: Error: {text}")),
    }
}

/// Map the outcome of a rating-changes request onto what it says about the contest.
pub fn classify_rating_changes(result: Result<Vec<RatingChange>, String>) -> RatingChangesLookup {
    match result {
        Ok(changes) => RatingChangesLookup::Fetched(changes),
        Err(e) if e.contains(RATING_CHANGES_UNAVAILABLE) => RatingChangesLookup::Unavailable,
        Err(e) => {
            tracing::warn!("Unable to fetch rating changes: {e}");
            RatingChangesLookup::NotFetched
        }
    }
}

pub struct ContestApi {
    client: Client,
    base_url: String,
}

impl ContestApi {
    pub fn new(config: &ApiConfig) -> Result<Self, String> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {e}"))?;
        Ok(ContestApi {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch<T: DeserializeOwned>(&self, method: &str, query: &[(&str, String)]) -> Result<T, String> {
        let url = format!("{}/{}", self.base_url, method);
        tracing::debug!(%url, ?query, "API request");

        let resp = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| format!("HTTP request failed: {e}"))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| format!("Failed to read API response: {e}"))?;

        if !status.is_success() {
            let body: String = text.chars().take(500).collect();
            return Err(format!("API: HTTP error {status}: {body}"));
        }
        parse_envelope(&text)
    }

    pub async fn contest_standings(&self, contest_id: i64) -> Result<Standings, String> {
        self.fetch("contest.standings", &[("contestId", contest_id.to_string())]).await
    }

    pub async fn contest_rating_changes(&self, contest_id: i64) -> Result<Vec<RatingChange>, String> {
        self.fetch("contest.ratingChanges", &[("contestId", contest_id.to_string())]).await
    }

    pub async fn user_rated_list(&self, active_only: bool) -> Result<Vec<RatedUser>, String> {
        self.fetch("user.ratedList", &[("activeOnly", active_only.to_string())]).await
    }

    /// Rating changes only exist for finished contests, so nothing is fetched before that.
    pub async fn lookup_rating_changes(&self, contest: &Contest) -> RatingChangesLookup {
        if contest.phase != ContestPhase::Finished {
            return RatingChangesLookup::NotFetched;
        }
        classify_rating_changes(self.contest_rating_changes(contest.id).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_envelope_ok() {
        let text = r#"{"status":"OK","result":[{"handle":"a","rating":1500}]}"#;
        let users: Vec<RatedUser> = parse_envelope(text).unwrap();
        assert_eq!(users[0].handle, "a");
        assert_eq!(users[0].rating, 1500);
    }

    #[test]
    fn test_parse_envelope_failed_status() {
        let text = r#"{"status":"FAILED","comment":"contestId: Contest with id 99999 not found"}"#;
        let err = parse_envelope::<Vec<RatedUser>>(text).unwrap_err();
        assert!(err.starts_with("API: Error"), "{err}");
        assert!(err.contains("not found"), "{err}");
    }

    #[test]
    fn test_parse_envelope_not_json() {
        let err = parse_envelope::<Vec<RatedUser>>("<html>").unwrap_err();
        assert!(err.starts_with("API: Invalid JSON"), "{err}");
    }

    #[test]
    fn test_classify_rating_changes() {
        let unavailable = Err(format!(
            "API: HTTP error 400 Bad Request: {{\"status\":\"FAILED\",\"comment\":\"contestId: {RATING_CHANGES_UNAVAILABLE}\"}}"
        ));
        assert_eq!(classify_rating_changes(unavailable), RatingChangesLookup::Unavailable);

        let flaky = Err("HTTP request failed: timed out".to_string());
        assert_eq!(classify_rating_changes(flaky), RatingChangesLookup::NotFetched);

        assert_eq!(classify_rating_changes(Ok(vec![])), RatingChangesLookup::Fetched(vec![]));
    }
}
