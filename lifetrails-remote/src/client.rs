//! HTTP client for the per-user remote record file.
//!
//! Uses reqwest with JSON serialization. Every call carries the bearer
//! token explicitly; the client itself holds no credential state, so a
//! cleared session cache cannot leave a stale token behind here.

use crate::config::RemoteConfig;
use crate::error::{RemoteError, RemoteResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use lifetrails_crypto::AccessToken;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;

/// A fetched remote record file: decoded JSON content plus the opaque
/// version tag needed for optimistic-concurrency writes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteRecordFile {
    pub content: String,
    pub sha: String,
}

#[derive(Deserialize)]
struct ContentResponse {
    content: Option<String>,
    encoding: Option<String>,
    sha: String,
}

#[derive(Deserialize)]
struct WriteResponse {
    content: WrittenContent,
}

#[derive(Deserialize)]
struct WrittenContent {
    sha: String,
}

/// HTTP client for the remote record store.
pub struct RecordApiClient {
    client: Client,
    config: RemoteConfig,
}

impl RecordApiClient {
    pub fn new(config: RemoteConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");

        Self { client, config }
    }

    fn record_url(&self, user_id: &str) -> String {
        format!(
            "{}/{}/{}/data.json",
            self.config.base_url, self.config.data_folder_path, user_id
        )
    }

    /// Fetches the user's record file. `Ok(None)` means the file does not
    /// exist yet: a new user, not an error.
    pub async fn fetch_record(
        &self,
        user_id: &str,
        token: &AccessToken,
    ) -> RemoteResult<Option<RemoteRecordFile>> {
        let url = self.record_url(user_id);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(token.as_str())
            .header("Accept", "application/vnd.github+json")
            .send()
            .await
            .map_err(transport_error)?;

        if resp.status() == StatusCode::NOT_FOUND {
            debug!(user_id, "no remote record yet (404)");
            return Ok(None);
        }
        let resp = check_status(resp)?;

        let body: ContentResponse = resp
            .json()
            .await
            .map_err(|e| RemoteError::MalformedResponse(e.to_string()))?;

        let encoded = match (body.content, body.encoding.as_deref()) {
            (Some(content), Some("base64")) => content,
            _ => {
                return Err(RemoteError::MalformedResponse(
                    "expected base64-encoded file content".to_string(),
                ))
            }
        };

        // The store wraps base64 bodies across lines
        let compact: String = encoded.split_whitespace().collect();
        let raw = STANDARD
            .decode(compact)
            .map_err(|e| RemoteError::MalformedResponse(format!("invalid base64 content: {e}")))?;
        let content = String::from_utf8(raw)
            .map_err(|e| RemoteError::MalformedResponse(format!("content is not UTF-8: {e}")))?;

        Ok(Some(RemoteRecordFile {
            content,
            sha: body.sha,
        }))
    }

    /// Creates or updates the user's record file.
    ///
    /// Pass the previously-fetched `sha` to update; `None` creates. The
    /// returned sha tags the new version.
    pub async fn put_record(
        &self,
        user_id: &str,
        token: &AccessToken,
        content: &str,
        prior_sha: Option<&str>,
    ) -> RemoteResult<String> {
        let url = self.record_url(user_id);
        let message = if prior_sha.is_some() {
            &self.config.commit_message_update
        } else {
            &self.config.commit_message_add
        };

        let mut body = serde_json::json!({
            "message": message,
            "committer": {
                "name": self.config.committer_name,
                "email": self.config.committer_email,
            },
            "content": STANDARD.encode(content),
        });
        if let Some(sha) = prior_sha {
            body["sha"] = serde_json::Value::String(sha.to_string());
        }

        let resp = self
            .client
            .put(&url)
            .bearer_auth(token.as_str())
            .header("Accept", "application/vnd.github+json")
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;
        let resp = check_status(resp)?;

        let written: WriteResponse = resp
            .json()
            .await
            .map_err(|e| RemoteError::MalformedResponse(e.to_string()))?;

        debug!(user_id, "remote record written");
        Ok(written.content.sha)
    }

    /// Deletes the user's record file. Requires the current version tag.
    pub async fn delete_record(
        &self,
        user_id: &str,
        token: &AccessToken,
        sha: &str,
    ) -> RemoteResult<()> {
        let url = self.record_url(user_id);
        let body = serde_json::json!({
            "message": self.config.commit_message_update,
            "committer": {
                "name": self.config.committer_name,
                "email": self.config.committer_email,
            },
            "sha": sha,
        });

        let resp = self
            .client
            .delete(&url)
            .bearer_auth(token.as_str())
            .header("Accept", "application/vnd.github+json")
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;
        check_status(resp)?;

        debug!(user_id, "remote record deleted");
        Ok(())
    }
}

fn transport_error(e: reqwest::Error) -> RemoteError {
    RemoteError::Unreachable(e.to_string())
}

fn check_status(resp: Response) -> RemoteResult<Response> {
    match resp.status() {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(RemoteError::InvalidCredential),
        status if !status.is_success() => Err(RemoteError::Api(format!(
            "unexpected status {status} from remote store"
        ))),
        _ => Ok(resp),
    }
}
