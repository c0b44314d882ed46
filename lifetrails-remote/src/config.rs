//! Remote store configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the remote record store client.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteConfig {
    /// Contents-API base, e.g. a repository contents endpoint.
    pub base_url: String,

    /// Folder under which per-user directories live.
    pub data_folder_path: String,

    /// Committer identity attached to writes.
    pub committer_name: String,
    pub committer_email: String,

    /// Commit messages for first write vs. update.
    pub commit_message_add: String,
    pub commit_message_update: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.github.com/repos/life-trails/life-trails-data/contents"
                .to_string(),
            data_folder_path: "life-trails".to_string(),
            committer_name: "Life Trails".to_string(),
            committer_email: "bot@life.trails.click".to_string(),
            commit_message_add: "Add user data".to_string(),
            commit_message_update: "Update user data".to_string(),
        }
    }
}
