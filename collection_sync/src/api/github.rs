//! GitHub contents API client for the remote collection file
//!
//! The file's blob `sha` is the revision token: reads return it and updates
//! must send it back, so a write based on a stale read is rejected by GitHub.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use super::USER_AGENT;
use crate::error::{Result, SyncError};

/// Public GitHub REST API
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Current content of the remote file and its revision token
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteSnapshot {
    pub content: String,
    pub sha: String,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    #[serde(default)]
    content: String,
    sha: String,
    #[serde(default)]
    encoding: Option<String>,
}

#[derive(Debug, Serialize)]
struct PutRequest<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct GitHubMessage {
    message: Option<String>,
}

/// One file in one repository branch, read and written through the contents API
pub struct GitHubStore {
    client: reqwest::blocking::Client,
    base_url: String,
    repo: String,
    path: String,
    branch: String,
    token: Option<String>,
}

impl GitHubStore {
    pub fn new(base_url: &str, repo: &str, path: &str, branch: &str, token: Option<String>) -> Self {
        log::debug!("Creating GitHub store for {repo}:{branch}/{path}");
        Self {
            client: reqwest::blocking::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            repo: repo.to_string(),
            path: path.trim_start_matches('/').to_string(),
            branch: branch.to_string(),
            token,
        }
    }

    /// Path of the file inside the repository
    pub fn path(&self) -> &str {
        &self.path
    }

    fn contents_url(&self) -> String {
        format!("{}/repos/{}/contents/{}", self.base_url, self.repo, self.path)
    }

    fn request(&self, method: reqwest::Method) -> reqwest::blocking::RequestBuilder {
        let builder = self
            .client
            .request(method, self.contents_url())
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github+json");
        match &self.token {
            Some(token) => builder.header("Authorization", format!("token {token}")),
            None => builder,
        }
    }

    /// Reads the file. `Ok(None)` means the file does not exist yet.
    pub fn fetch(&self) -> Result<Option<RemoteSnapshot>> {
        log::info!("Reading {} from {} ({})", self.path, self.repo, self.branch);

        let response = self
            .request(reqwest::Method::GET)
            .query(&[("ref", self.branch.as_str())])
            .send()?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            log::info!("No remote file at {}, starting from an empty snapshot", self.path);
            return Ok(None);
        }
        if !status.is_success() {
            return Err(store_error(status, &response.text().unwrap_or_default()));
        }

        let body: ContentResponse = serde_json::from_str(&response.text()?)?;
        if body.encoding.as_deref() == Some("none") {
            return Err(SyncError::Decode(format!(
                "{} is too large for the contents API",
                self.path
            )));
        }

        // GitHub wraps the base64 payload at 60 columns
        let cleaned: String = body
            .content
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let content = String::from_utf8(STANDARD.decode(cleaned)?)?;

        log::debug!("Read {} bytes at revision {}", content.len(), body.sha);
        Ok(Some(RemoteSnapshot {
            content,
            sha: body.sha,
        }))
    }

    /// Writes the file. Pass the `sha` from the last read when the file exists;
    /// a stale or missing token makes GitHub reject the write.
    pub fn put(&self, content: &str, message: &str, sha: Option<&str>) -> Result<()> {
        log::info!(
            "Writing {} bytes to {} ({}), revision {}",
            content.len(),
            self.path,
            self.branch,
            sha.unwrap_or("<new file>")
        );

        let payload = PutRequest {
            message,
            content: STANDARD.encode(content.as_bytes()),
            branch: &self.branch,
            sha,
        };

        let response = self.request(reqwest::Method::PUT).json(&payload).send()?;
        let status = response.status();
        if status.is_success() {
            log::info!("Remote file saved (status {status})");
            Ok(())
        } else {
            let error = store_error(status, &response.text().unwrap_or_default());
            log::error!("Remote write failed: {error}");
            Err(error)
        }
    }
}

fn store_error(status: reqwest::StatusCode, body: &str) -> SyncError {
    let message = serde_json::from_str::<GitHubMessage>(body)
        .ok()
        .and_then(|m| m.message)
        .unwrap_or_else(|| "Unknown error".to_string());
    SyncError::Store { status, message }
}

#[cfg(test)]
#[path = "github_tests.rs"]
mod tests;
