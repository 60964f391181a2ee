//! Signature registry and the user/document records the workflow builds on.

use tracing::{info, instrument, warn};

use signet_blob::ResolvedBlob;
use signet_core::{Document, NewDocument, NewUser, Requester, Signature, User, UserId};
use signet_store::StoreError;

use crate::engine::WorkflowEngine;
use crate::error::WorkflowError;
use crate::views::{SignatureView, Upload};

const SIGNATURE_FILES: &str = "signatures";
const DOCUMENT_FILES: &str = "documents";

impl WorkflowEngine {
    /// Store `upload` as the requester's signature, replacing any earlier one.
    ///
    /// Only users with the signer role may hold a signature.
    #[instrument(name = "workflow.upload_signature", skip_all, fields(requester = %requester.user_id))]
    pub async fn upload_or_replace_signature(
        &self,
        requester: Requester,
        upload: Upload,
    ) -> Result<SignatureView, WorkflowError> {
        if !requester.role.can_sign() {
            return Err(WorkflowError::PermissionDenied(
                "only signers can upload signatures".into(),
            ));
        }
        if upload.data.is_empty() {
            return Err(WorkflowError::InvalidArgument("file is empty".into()));
        }

        let blob = self
            .blobs
            .put(
                SIGNATURE_FILES,
                &upload.filename,
                &upload.content_type,
                upload.data,
            )
            .await?;

        let upsert = match self.store.upsert_signature(requester.user_id, &blob.key).await {
            Ok(upsert) => upsert,
            Err(e) => {
                self.discard_blob(&blob.key).await;
                return Err(e.into());
            }
        };

        if let Some(previous) = upsert.replaced_file.as_deref()
            && previous != blob.key
            && let Err(e) = self.blobs.delete(previous).await
        {
            warn!(key = previous, error = %e, "failed to delete replaced signature file");
        }

        let replaced = upsert.replaced_file.is_some();
        info!(signature_id = %upsert.signature.id, replaced, "signature stored");
        Ok(SignatureView {
            signature: upsert.signature,
            replaced,
        })
    }

    /// All signatures newest first, or only those owned by `owner`.
    pub async fn list_signatures(
        &self,
        owner: Option<UserId>,
    ) -> Result<Vec<Signature>, WorkflowError> {
        Ok(self.store.list_signatures(owner).await?)
    }

    /// Store an uploaded document owned by the requester.
    #[instrument(name = "workflow.create_document", skip_all, fields(requester = %requester.user_id))]
    pub async fn create_document(
        &self,
        requester: Requester,
        title: &str,
        upload: Upload,
    ) -> Result<Document, WorkflowError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(WorkflowError::InvalidArgument("title is required".into()));
        }
        if upload.data.is_empty() {
            return Err(WorkflowError::InvalidArgument("file is empty".into()));
        }

        let blob = self
            .blobs
            .put(
                DOCUMENT_FILES,
                &upload.filename,
                &upload.content_type,
                upload.data,
            )
            .await?;

        let created = self
            .store
            .create_document(NewDocument {
                title: title.to_owned(),
                file: blob.key.clone(),
                owner_id: requester.user_id,
            })
            .await;
        match created {
            Ok(document) => {
                info!(document_id = %document.id, "document stored");
                Ok(document)
            }
            Err(e) => {
                self.discard_blob(&blob.key).await;
                Err(match e {
                    StoreError::MissingReference(_) => {
                        WorkflowError::NotFound(format!("user {} not found", requester.user_id))
                    }
                    other => other.into(),
                })
            }
        }
    }

    /// Register a user account.
    pub async fn register_user(&self, user: NewUser) -> Result<User, WorkflowError> {
        if user.username.trim().is_empty() {
            return Err(WorkflowError::InvalidArgument("username is required".into()));
        }
        match self.store.create_user(user).await {
            Ok(user) => {
                info!(user_id = %user.id, username = %user.username, "user registered");
                Ok(user)
            }
            Err(StoreError::Conflict(_)) => {
                Err(WorkflowError::Conflict("username already taken".into()))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get_user(&self, id: UserId) -> Result<User, WorkflowError> {
        self.store
            .get_user(id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound(format!("user {id} not found")))
    }

    /// Read back a stored file by key.
    pub async fn open_file(&self, key: &str) -> Result<ResolvedBlob, WorkflowError> {
        match self.blobs.get(key).await {
            Ok(Some(blob)) => Ok(blob),
            Ok(None) | Err(signet_blob::BlobError::InvalidKey(_)) => {
                Err(WorkflowError::NotFound(format!("file {key} not found")))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bytes::Bytes;
    use signet_blob::MemoryBlobStore;
    use signet_core::Role;
    use signet_store_memory::MemoryWorkflowStore;

    use super::*;
    use crate::WorkflowEngineBuilder;

    fn engine() -> (WorkflowEngine, Arc<MemoryBlobStore>) {
        let blobs = Arc::new(MemoryBlobStore::new());
        let engine = WorkflowEngineBuilder::new()
            .store(Arc::new(MemoryWorkflowStore::new()))
            .blobs(blobs.clone())
            .build()
            .unwrap();
        (engine, blobs)
    }

    async fn user(engine: &WorkflowEngine, name: &str, role: Role) -> Requester {
        let u = engine
            .register_user(NewUser {
                username: name.into(),
                email: format!("{name}@example.com"),
                role,
                post: None,
            })
            .await
            .unwrap();
        Requester::new(u.id, u.role)
    }

    fn png(bytes: &'static [u8]) -> Upload {
        Upload::new("sig.png", "image/png", Bytes::from_static(bytes))
    }

    #[tokio::test]
    async fn non_signers_cannot_upload() {
        let (engine, blobs) = engine();
        for role in [Role::Admin, Role::Viewer] {
            let requester = user(&engine, role.as_str(), role).await;
            let err = engine
                .upload_or_replace_signature(requester, png(b"x"))
                .await
                .unwrap_err();
            assert!(matches!(err, WorkflowError::PermissionDenied(_)));
        }
        assert!(blobs.is_empty());
    }

    #[tokio::test]
    async fn reupload_replaces_file_and_keeps_id() {
        let (engine, blobs) = engine();
        let signer = user(&engine, "sam", Role::Signer).await;

        let first = engine
            .upload_or_replace_signature(signer, png(b"one"))
            .await
            .unwrap();
        assert!(!first.replaced);
        let second = engine
            .upload_or_replace_signature(signer, png(b"two"))
            .await
            .unwrap();
        assert!(second.replaced);
        assert_eq!(first.signature.id, second.signature.id);
        assert_ne!(first.signature.file, second.signature.file);

        assert_eq!(blobs.len(), 1, "old signature file removed");
        let stored = engine.open_file(&second.signature.file).await.unwrap();
        assert_eq!(stored.data, Bytes::from_static(b"two"));
        assert!(matches!(
            engine.open_file(&first.signature.file).await,
            Err(WorkflowError::NotFound(_))
        ));

        let listed = engine.list_signatures(Some(signer.user_id)).await.unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn document_requires_title() {
        let (engine, blobs) = engine();
        let owner = user(&engine, "olga", Role::Admin).await;
        let err = engine
            .create_document(owner, "  ", png(b"pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidArgument(_)));

        let doc = engine
            .create_document(owner, "Lease", png(b"pdf"))
            .await
            .unwrap();
        assert_eq!(doc.owner_id, owner.user_id);
        assert!(doc.file.starts_with("documents/"));
        assert_eq!(blobs.len(), 1);
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let (engine, _) = engine();
        user(&engine, "dana", Role::Signer).await;
        let err = engine
            .register_user(NewUser {
                username: "dana".into(),
                email: "other@example.com".into(),
                role: Role::Viewer,
                post: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Conflict(_)));
    }

    #[tokio::test]
    async fn traversal_keys_are_not_found() {
        let (engine, _) = engine();
        assert!(matches!(
            engine.open_file("../etc/passwd").await,
            Err(WorkflowError::NotFound(_))
        ));
    }
}
