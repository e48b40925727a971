use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{FetchError, ParseError};
use crate::stats::Stats;

pub const DEFAULT_BASE_URL: &str = "https://projecteuler.net";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

// Fallback columns: Username,Country,Language,SolvedCount,Level,...
const SOLVED_INDEX: usize = 3;
const LEVEL_INDEX: usize = 4;

#[derive(Clone)]
pub struct EulerClient {
    base_url: Arc<String>,
    http: Arc<Client>,
}

impl EulerClient {
    /// Create a client for the profile text files under `base_url`.
    /// Every request is bounded by `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent("euler-badge")
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: Arc::new(base_url.trim_end_matches('/').to_string()),
            http: Arc::new(http),
        })
    }

    fn profile_url(&self, username: &str) -> String {
        format!("{}/profile/{username}.txt", self.base_url)
    }

    /// Fetch and parse the public profile of `username`.
    ///
    /// One request, no retries. The returned stats carry the requested
    /// username, not the one found in the file.
    pub async fn fetch_stats(&self, username: &str) -> Result<Stats, FetchError> {
        let url = self.profile_url(username);
        debug!(%url, "fetching profile");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(transport_error)?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(username.to_string()));
        }
        if !status.is_success() {
            return Err(FetchError::UpstreamStatus(status));
        }

        let body = resp.text().await.map_err(transport_error)?;

        let (solved_count, level) = parse_profile(&body).inspect_err(|err| {
            let line = body.trim().lines().next().unwrap_or_default();
            warn!(username, error = %err, line, "could not parse profile stats");
        })?;

        Ok(Stats {
            username: username.to_string(),
            solved_count,
            level,
        })
    }
}

fn transport_error(err: reqwest::Error) -> FetchError {
    if err.is_builder() {
        FetchError::Internal(err.to_string())
    } else {
        FetchError::Unreachable(err)
    }
}

/// Extract `(solved_count, level)` from a profile text file.
///
/// Only the first line is read. Its comma-separated fields after the
/// username are scanned for digit-only values and the first two win. With
/// fewer than two such values the fixed solved/level columns are used.
/// This guesses rather than validates: a reordered upstream format yields
/// wrong numbers, not an error.
pub fn parse_profile(body: &str) -> Result<(u64, u64), ParseError> {
    let Some(line) = body.trim().lines().next() else {
        return Err(ParseError::NoData);
    };

    let parts: Vec<&str> = line.split(',').map(str::trim).collect();

    let mut numbers = Vec::with_capacity(2);
    for (index, part) in parts.iter().enumerate().skip(1) {
        if is_digits(part) {
            // Values beyond u64 fail here instead of being accepted.
            numbers.push(parse_field(&parts, index)?);
            if numbers.len() == 2 {
                return Ok((numbers[0], numbers[1]));
            }
        }
    }

    let solved_count = parse_field(&parts, SOLVED_INDEX)?;
    let level = parse_field(&parts, LEVEL_INDEX)?;
    Ok((solved_count, level))
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn parse_field(parts: &[&str], index: usize) -> Result<u64, ParseError> {
    let value = parts
        .get(index)
        .ok_or(ParseError::MissingField { index })?;

    value.parse::<u64>().map_err(|_| ParseError::InvalidNumber {
        index,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn takes_first_two_digit_fields() {
        let body = "alice,GB,Python,1234,5,2020-01-01,2024-01-01";
        assert_eq!(parse_profile(body), Ok((1234, 5)));
    }

    #[test]
    fn digit_fields_win_over_fixed_columns() {
        // Scan order, not column position, decides.
        let body = "carol,7,FR,Rust,x,42,9";
        assert_eq!(parse_profile(body), Ok((7, 42)));
    }

    #[test]
    fn only_first_line_is_read() {
        let body = "  \n alice , GB , Python , 10 , 2 \n99,98,97\n";
        assert_eq!(parse_profile(body), Ok((10, 2)));
    }

    #[test]
    fn username_column_is_never_a_number() {
        let body = "12345,GB,Python,x,y,6";
        assert!(parse_profile(body).is_err());
    }

    #[test]
    fn falls_back_to_fixed_columns() {
        let body = "dave,US,C,+17,3";
        assert_eq!(parse_profile(body), Ok((17, 3)));
    }

    #[test]
    fn fallback_with_non_numeric_level_fails() {
        let body = "bob,US,,99,,x,y";
        assert_eq!(
            parse_profile(body),
            Err(ParseError::InvalidNumber {
                index: 4,
                value: String::new(),
            })
        );
    }

    #[test]
    fn fallback_with_too_few_fields_fails() {
        assert_eq!(
            parse_profile("eve,NL,Go"),
            Err(ParseError::MissingField { index: 3 })
        );
    }

    #[test]
    fn empty_body_is_no_data() {
        assert_eq!(parse_profile(""), Err(ParseError::NoData));
        assert_eq!(parse_profile(" \n\t\n"), Err(ParseError::NoData));
    }

    #[test]
    fn crlf_line_endings_are_tolerated() {
        let body = "alice,GB,Python,300,12\r\nmore\r\n";
        assert_eq!(parse_profile(body), Ok((300, 12)));
    }

    #[test]
    fn oversized_number_is_a_parse_failure() {
        let body = "alice,GB,Python,99999999999999999999999,5";
        assert!(matches!(
            parse_profile(body),
            Err(ParseError::InvalidNumber { index: 3, .. })
        ));
    }

    fn client_for(server: &MockServer) -> EulerClient {
        EulerClient::new(&server.uri(), Duration::from_secs(2)).expect("client")
    }

    #[tokio::test]
    async fn fetches_and_parses_profile() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/profile/alice.txt"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("Alice,GB,Python,1234,5,2020-01-01,2024-01-01\n"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let stats = client_for(&server)
            .fetch_stats("alice")
            .await
            .expect("stats");

        assert_eq!(
            stats,
            Stats {
                username: "alice".to_string(),
                solved_count: 1234,
                level: 5,
            }
        );
    }

    #[tokio::test]
    async fn upstream_404_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_stats("doesnotexist")
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::NotFound(ref u) if u == "doesnotexist"));
    }

    #[tokio::test]
    async fn other_error_statuses_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_stats("alice").await.unwrap_err();

        assert!(matches!(
            err,
            FetchError::UpstreamStatus(StatusCode::SERVICE_UNAVAILABLE)
        ));
    }

    #[tokio::test]
    async fn empty_body_is_parse_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("   \n"))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_stats("alice").await.unwrap_err();

        assert!(matches!(err, FetchError::Parse(ParseError::NoData)));
    }

    #[tokio::test]
    async fn slow_upstream_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("alice,GB,Python,1,1")
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let client =
            EulerClient::new(&server.uri(), Duration::from_millis(100)).expect("client");
        let err = client.fetch_stats("alice").await.unwrap_err();

        assert!(matches!(err, FetchError::Unreachable(ref e) if e.is_timeout()));
    }

    #[tokio::test]
    async fn connection_refused_is_unreachable() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client =
            EulerClient::new(&format!("http://{addr}"), Duration::from_secs(1)).expect("client");
        let err = client.fetch_stats("alice").await.unwrap_err();

        assert!(matches!(err, FetchError::Unreachable(_)));
    }

    #[tokio::test]
    async fn unbuildable_url_is_internal() {
        let client = EulerClient::new("not a url", Duration::from_secs(1)).expect("client");
        let err = client.fetch_stats("alice").await.unwrap_err();

        assert!(matches!(err, FetchError::Internal(_)));
    }

    #[test]
    fn trailing_slash_on_base_url_is_ignored() {
        let client = EulerClient::new("https://example.org/", DEFAULT_TIMEOUT).expect("client");
        assert_eq!(
            client.profile_url("bob"),
            "https://example.org/profile/bob.txt"
        );
    }
}
