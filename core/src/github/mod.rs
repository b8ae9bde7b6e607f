//! GitHub issue links and title lookup for support threads

use crate::config::GithubConfig;
use crate::error::GithubError;
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, warn};

static ISSUE_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://github\.com/([^/]+)/([^/]+)/issues/(\d+)(?:#issuecomment-\d+)?$").unwrap()
});

/// An issue on a GitHub repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRef {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

impl IssueRef {
    /// Parse an issue URL, optionally pointing at a comment
    pub fn parse(url: &str) -> Result<Self, GithubError> {
        let caps = ISSUE_URL_RE
            .captures(url)
            .ok_or_else(|| GithubError::NotAnIssue(url.to_string()))?;
        let number = caps[3]
            .parse()
            .map_err(|_| GithubError::NotAnIssue(url.to_string()))?;
        Ok(Self {
            owner: caps[1].to_string(),
            repo: caps[2].to_string(),
            number,
        })
    }

    /// `owner/repo#number`
    pub fn short(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for IssueRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}

/// Looks up issue metadata
#[async_trait]
pub trait IssueLookup: Send + Sync {
    async fn issue_title(&self, issue: &IssueRef) -> Result<String, GithubError>;
}

#[derive(Debug, Deserialize)]
struct IssueResponse {
    title: String,
}

/// REST client for the GitHub API
#[derive(Clone)]
pub struct GithubClient {
    client: reqwest::Client,
    api_base: String,
    token: Option<String>,
}

impl GithubClient {
    pub fn new(client: reqwest::Client, config: &GithubConfig) -> Self {
        Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        }
    }
}

#[async_trait]
impl IssueLookup for GithubClient {
    async fn issue_title(&self, issue: &IssueRef) -> Result<String, GithubError> {
        let url = format!(
            "{}/repos/{}/{}/issues/{}",
            self.api_base, issue.owner, issue.repo, issue.number
        );
        debug!("looking up issue {}", url);

        let mut request = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, "endermite")
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .timeout(Duration::from_secs(15));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GithubError::Status(status.as_u16()));
        }

        let data: IssueResponse = response.json().await?;
        Ok(data.title)
    }
}

/// Thread title for an issue, falling back to the short reference when the lookup fails
pub async fn thread_title<L>(lookup: &L, issue: &IssueRef) -> String
where
    L: IssueLookup + ?Sized,
{
    match lookup.issue_title(issue).await {
        Ok(title) => format!("[{}] {}", issue, title),
        Err(e) => {
            warn!("issue lookup for {} failed, using short title: {}", issue, e);
            issue.short()
        }
    }
}
