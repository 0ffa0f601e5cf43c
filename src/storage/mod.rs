mod client;

pub use client::ObjectStoreClient;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::artifacts::ArtifactMime;
use crate::artifacts::ArtifactUpload;
use crate::artifacts::Slot;
use crate::domain::TeamId;

#[derive(Debug, thiserror::Error)]
pub enum ObjectStoreError {
    #[error("transport error talking to the object store")]
    Transport(#[from] reqwest::Error),
    #[error("object store returned {status}")]
    UnexpectedStatus { status: u16 },
}

/// The pending/confirmed/rejected artifact transport, kept behind a trait so
/// call sites can be exercised against a `wiremock::MockServer` without a
/// live object store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(
        &self,
        namespace: &str,
        team_id: &TeamId,
        slot: Slot,
        mime: ArtifactMime,
        bytes: &[u8],
    ) -> Result<String, ObjectStoreError>;

    async fn copy(
        &self,
        from_namespace: &str,
        to_namespace: &str,
        team_id: &TeamId,
        slot: Slot,
        mime: ArtifactMime,
    ) -> Result<String, ObjectStoreError>;

    async fn delete(
        &self,
        namespace: &str,
        team_id: &TeamId,
        slot: Slot,
        mime: ArtifactMime,
    ) -> Result<(), ObjectStoreError>;
}

/// Upload every artifact in `uploads` under `pending/<team_id>/…`, bounded by
/// `concurrency` simultaneous requests. Returns a slot → url map on success;
/// a terminal failure surfaces the first error and leaves whatever succeeded
/// for the caller to compensate with `delete_all`.
pub async fn upload_pending(
    store: &dyn ObjectStore,
    team_id: &TeamId,
    uploads: &[ArtifactUpload],
    concurrency: usize,
) -> Result<HashMap<Slot, String>, ObjectStoreError> {
    use futures::stream::StreamExt;

    let results: Vec<_> = futures::stream::iter(uploads.iter())
        .map(|upload| async move {
            let url = store
                .put("pending", team_id, upload.slot, upload.mime, &upload.bytes)
                .await?;
            Ok::<_, ObjectStoreError>((upload.slot, url))
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let mut urls = HashMap::with_capacity(results.len());
    for result in results {
        let (slot, url) = result?;
        urls.insert(slot, url);
    }
    Ok(urls)
}

/// Move every known slot for `team_id` from `from_namespace` to
/// `to_namespace`. Partial failure is tolerated: failed slots are simply
/// absent from the returned map, leaving their URL pointed at the original
/// namespace.
pub async fn move_all(
    store: &dyn ObjectStore,
    team_id: &TeamId,
    from_namespace: &str,
    to_namespace: &str,
    slots: &[(Slot, ArtifactMime)],
) -> HashMap<Slot, String> {
    let mut moved = HashMap::with_capacity(slots.len());
    for (slot, mime) in slots {
        match store.copy(from_namespace, to_namespace, team_id, *slot, *mime).await {
            Ok(url) => {
                moved.insert(*slot, url);
            }
            Err(e) => {
                tracing::warn!(e.cause_chain = ?e, slot = %slot, "failed to move artifact");
            }
        }
    }
    moved
}

/// Best-effort compensation: delete every known slot for `team_id` under
/// `namespace`. Failures are logged, never propagated — this runs on an
/// already-failing path.
pub async fn delete_all(
    store: &dyn ObjectStore,
    team_id: &TeamId,
    namespace: &str,
    slots: &[(Slot, ArtifactMime)],
) {
    for (slot, mime) in slots {
        if let Err(e) = store.delete(namespace, team_id, *slot, *mime).await {
            tracing::warn!(e.cause_chain = ?e, slot = %slot, "failed to delete artifact during compensation");
        }
    }
}
