use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use secrecy::Secret;

use super::ObjectStore;
use super::ObjectStoreError;
use crate::artifacts::ArtifactMime;
use crate::artifacts::Slot;
use crate::domain::TeamId;

/// A thin HTTP client over an S3-compatible object store, shaped the same
/// way as the mail client: a reused `reqwest::Client`, a base URL, and a
/// bearer credential.
pub struct ObjectStoreClient {
    http_client: Client,
    base_url: String,
    bucket: String,
    authorization_token: Secret<String>,
}

impl ObjectStoreClient {
    pub fn new(
        base_url: String,
        bucket: String,
        authorization_token: Secret<String>,
        timeout: std::time::Duration,
    ) -> Self {
        let http_client = Client::builder().timeout(timeout).build().expect("failed to build http client");
        Self { http_client, base_url, bucket, authorization_token }
    }

    fn object_url(
        &self,
        namespace: &str,
        team_id: &TeamId,
        slot: Slot,
        mime: ArtifactMime,
    ) -> String {
        let path = slot.object_path(namespace, team_id, mime);
        format!("{}/{}/{}", self.base_url, self.bucket, path)
    }
}

#[async_trait]
impl ObjectStore for ObjectStoreClient {
    async fn put(
        &self,
        namespace: &str,
        team_id: &TeamId,
        slot: Slot,
        mime: ArtifactMime,
        bytes: &[u8],
    ) -> Result<String, ObjectStoreError> {
        let url = self.object_url(namespace, team_id, slot, mime);
        let response = self
            .http_client
            .put(&url)
            .bearer_auth(self.authorization_token.expose_secret())
            .header("Content-Type", mime.to_string())
            .body(bytes.to_vec())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ObjectStoreError::UnexpectedStatus { status: response.status().as_u16() });
        }
        Ok(url)
    }

    async fn copy(
        &self,
        from_namespace: &str,
        to_namespace: &str,
        team_id: &TeamId,
        slot: Slot,
        mime: ArtifactMime,
    ) -> Result<String, ObjectStoreError> {
        let source = self.object_url(from_namespace, team_id, slot, mime);
        let destination = self.object_url(to_namespace, team_id, slot, mime);

        let response = self
            .http_client
            .post(format!("{}/copy", self.base_url))
            .bearer_auth(self.authorization_token.expose_secret())
            .json(&serde_json::json!({ "source": source, "destination": destination }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ObjectStoreError::UnexpectedStatus { status: response.status().as_u16() });
        }

        self.delete(from_namespace, team_id, slot, mime).await.ok();
        Ok(destination)
    }

    async fn delete(
        &self,
        namespace: &str,
        team_id: &TeamId,
        slot: Slot,
        mime: ArtifactMime,
    ) -> Result<(), ObjectStoreError> {
        let url = self.object_url(namespace, team_id, slot, mime);
        let response =
            self.http_client.delete(&url).bearer_auth(self.authorization_token.expose_secret()).send().await?;

        if !response.status().is_success() && response.status().as_u16() != 404 {
            return Err(ObjectStoreError::UnexpectedStatus { status: response.status().as_u16() });
        }
        Ok(())
    }
}
