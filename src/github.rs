//! GitHub API adapter.
//!
//! Wraps octocrab behind the handful of calls the reporter needs: open and
//! closed pull request listings, organization membership, and user
//! profiles. API failures are classified into `GithubError` variants the
//! CLI knows how to explain.

use chrono::{DateTime, Duration, Utc};
use octocrab::models::pulls::{Review, ReviewState};
use octocrab::Octocrab;
use serde::Deserialize;

/// Errors raised by the GitHub adapter.
#[derive(Debug, thiserror::Error)]
pub enum GithubError {
    #[error("invalid GitHub authentication token")]
    AuthInvalid,

    #[error("GitHub organization '{0}' not found or access denied")]
    OrgNotFound(String),

    #[error("repository '{0}' not found or access denied")]
    RepoNotFound(String),

    #[error(transparent)]
    Api(octocrab::Error),
}

/// One open pull request, reduced to the fields the aggregator consumes.
#[derive(Clone, Debug)]
pub struct PullRequestRecord {
    pub number: u64,
    pub title: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub comments: u64,
    pub approved: bool,
    pub ready_for_review: bool,
    pub draft: bool,
}

/// One closed pull request within the analysis window.
#[derive(Clone, Debug)]
pub struct ClosedPullRequest {
    pub number: u64,
    pub created_at: DateTime<Utc>,
    pub closed_at: DateTime<Utc>,
    pub author: Option<String>,
}

/// An organization member, as returned by the members listing.
#[derive(Clone, Debug, Deserialize)]
pub struct OrgMember {
    pub login: String,
}

/// The public profile of a single user.
#[derive(Clone, Debug, Deserialize)]
pub struct UserProfile {
    pub login: String,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrgSummary {
    #[allow(dead_code)]
    login: String,
}

pub struct GithubClient {
    octocrab: Octocrab,
}

impl GithubClient {
    pub fn new(token: &str, base_url: Option<&str>) -> anyhow::Result<Self> {
        let mut builder = Octocrab::builder().personal_token(token.to_string());
        if let Some(url) = base_url {
            builder = builder.base_uri(url)?;
        }

        Ok(Self {
            octocrab: builder.build()?,
        })
    }

    /// Confirms the organization exists and the token can see it.
    ///
    /// Done once up front so a bad token or a typo in the org name fails
    /// before any repository work starts.
    pub async fn verify_org(&self, org: &str) -> Result<(), GithubError> {
        self.octocrab
            .get::<OrgSummary, _, _>(format!("/orgs/{org}"), None::<&()>)
            .await
            .map(|_| ())
            .map_err(|e| classify(e, GithubError::OrgNotFound(org.to_string())))
    }

    /// Retrieves all open pull requests for a repository.
    ///
    /// The listing endpoint does not carry comment counts, so each PR is
    /// followed up with a detail fetch and a review listing, matching what
    /// the report needs per record.
    pub async fn fetch_open_pull_requests(
        &self,
        org: &str,
        repo: &str,
    ) -> Result<Vec<PullRequestRecord>, GithubError> {
        tracing::info!(org, repo, "fetching open pull requests");

        let not_found = || GithubError::RepoNotFound(repo.to_string());

        let mut current_page = self
            .octocrab
            .pulls(org, repo)
            .list()
            .state(octocrab::params::State::Open)
            .per_page(100)
            .send()
            .await
            .map_err(|e| classify(e, not_found()))?;

        let mut records = Vec::new();

        loop {
            for pr in &current_page {
                let Some(created_at) = pr.created_at else {
                    continue;
                };

                let detail = self
                    .octocrab
                    .pulls(org, repo)
                    .get(pr.number)
                    .await
                    .map_err(|e| classify(e, not_found()))?;

                let reviews = self.fetch_reviews(org, repo, pr.number).await?;
                let approved = reviews
                    .iter()
                    .any(|r| matches!(r.state, Some(ReviewState::Approved)));

                let draft = detail.draft.unwrap_or(false);

                records.push(PullRequestRecord {
                    number: pr.number,
                    title: detail.title.clone().unwrap_or_default(),
                    url: detail
                        .html_url
                        .as_ref()
                        .map(|u| u.to_string())
                        .unwrap_or_default(),
                    created_at,
                    comments: detail.comments.unwrap_or(0),
                    approved,
                    ready_for_review: !draft,
                    draft,
                });
            }

            match self
                .octocrab
                .get_page(&current_page.next)
                .await
                .map_err(|e| classify(e, not_found()))?
            {
                Some(next_page) => current_page = next_page,
                None => break,
            }
        }

        tracing::debug!(org, repo, count = records.len(), "open PR fetch complete");
        Ok(records)
    }

    /// Retrieves pull requests closed within the last `since_days` days.
    ///
    /// Results come back sorted by update time descending; the scan stops
    /// at the first PR closed before the window start.
    pub async fn fetch_closed_pull_requests(
        &self,
        org: &str,
        repo: &str,
        since_days: i64,
    ) -> Result<Vec<ClosedPullRequest>, GithubError> {
        tracing::info!(org, repo, since_days, "fetching closed pull requests");

        let not_found = || GithubError::RepoNotFound(repo.to_string());
        let window_start = Utc::now() - Duration::days(since_days);

        let mut current_page = self
            .octocrab
            .pulls(org, repo)
            .list()
            .state(octocrab::params::State::Closed)
            .sort(octocrab::params::pulls::Sort::Updated)
            .direction(octocrab::params::Direction::Descending)
            .per_page(100)
            .send()
            .await
            .map_err(|e| classify(e, not_found()))?;

        let mut records = Vec::new();

        loop {
            let mut reached_cutoff = false;

            for pr in &current_page {
                let (Some(created_at), Some(closed_at)) = (pr.created_at, pr.closed_at) else {
                    continue;
                };

                if closed_at < window_start {
                    reached_cutoff = true;
                    break;
                }

                records.push(ClosedPullRequest {
                    number: pr.number,
                    created_at,
                    closed_at,
                    author: pr.user.as_ref().map(|u| u.login.clone()),
                });
            }

            if reached_cutoff {
                break;
            }

            match self
                .octocrab
                .get_page(&current_page.next)
                .await
                .map_err(|e| classify(e, not_found()))?
            {
                Some(next_page) => current_page = next_page,
                None => break,
            }
        }

        Ok(records)
    }

    /// Lists the members of an organization visible to the token.
    pub async fn list_org_members(&self, org: &str) -> Result<Vec<OrgMember>, GithubError> {
        self.octocrab
            .get::<Vec<OrgMember>, _, _>(
                format!("/orgs/{org}/members"),
                Some(&[("per_page", "100")]),
            )
            .await
            .map_err(|e| classify(e, GithubError::OrgNotFound(org.to_string())))
    }

    /// Fetches the public profile for a user login.
    pub async fn user_profile(&self, login: &str) -> Result<UserProfile, GithubError> {
        self.octocrab
            .get::<UserProfile, _, _>(format!("/users/{login}"), None::<&()>)
            .await
            .map_err(GithubError::Api)
    }

    async fn fetch_reviews(
        &self,
        org: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<Review>, GithubError> {
        self.octocrab
            .get::<Vec<Review>, _, _>(
                format!("/repos/{org}/{repo}/pulls/{number}/reviews"),
                Some(&[("per_page", "100")]),
            )
            .await
            .map_err(GithubError::Api)
    }
}

/// Maps an octocrab error onto the adapter's taxonomy.
///
/// The GitHub API reports both bad tokens and missing resources through
/// the error message body; anything unrecognized passes through as a
/// generic API failure.
fn classify(err: octocrab::Error, not_found: GithubError) -> GithubError {
    if let octocrab::Error::GitHub { source, .. } = &err {
        let message = source.message.to_lowercase();
        if message.contains("bad credentials") {
            return GithubError::AuthInvalid;
        }
        if message.contains("not found") {
            return not_found;
        }
    }
    GithubError::Api(err)
}
