//! Storing and serving uploaded files.

use std::sync::Arc;

use serde_json::json;
use tracing::{error, info};

use crate::domain::ports::{FileStorage, FileStorageError};
use crate::domain::{
    Capability, Error, MediaType, Principal, StorageKey, UploadScope, UploadValidationError,
    validate_upload,
};

/// Bytes of a stored file with the media type derived from its key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub media_type: MediaType,
    pub bytes: Vec<u8>,
}

pub(crate) fn upload_invalid(err: UploadValidationError) -> Error {
    Error::invalid_request(err.to_string()).with_details(json!({ "code": err.code() }))
}

fn map_storage_error(err: FileStorageError) -> Error {
    match err {
        FileStorageError::Unavailable { message } => {
            error!(%message, "file storage unavailable");
            Error::service_unavailable("file storage unavailable")
        }
        FileStorageError::Io { message } => Error::internal(format!("file storage: {message}")),
    }
}

/// Capability needed besides [`Capability::UploadFiles`] for a scope.
fn scope_capability(scope: UploadScope) -> Option<Capability> {
    match scope {
        UploadScope::Vehicles | UploadScope::Brands => Some(Capability::ManageCatalogue),
        UploadScope::Faqs | UploadScope::News => Some(Capability::ManageContent),
        UploadScope::Tickets => None,
    }
}

#[derive(Clone)]
pub struct UploadService {
    storage: Arc<dyn FileStorage>,
}

impl UploadService {
    pub fn new(storage: Arc<dyn FileStorage>) -> Self {
        Self { storage }
    }

    /// Validate and store an upload, returning its new key.
    pub async fn upload(
        &self,
        principal: &Principal,
        scope: UploadScope,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<StorageKey, Error> {
        principal.require(Capability::UploadFiles)?;
        if let Some(capability) = scope_capability(scope) {
            principal.require(capability)?;
        }
        let media = validate_upload(scope, content_type, bytes.len()).map_err(upload_invalid)?;
        let key = StorageKey::generate(scope, media);
        let size = bytes.len();
        self.storage
            .put(&key, bytes)
            .await
            .map_err(map_storage_error)?;
        info!(key = %key, size, user_id = %principal.profile.id, "file uploaded");
        Ok(key)
    }

    /// Read a stored file back.
    pub async fn download(&self, key: &StorageKey) -> Result<StoredFile, Error> {
        let media_type = key
            .media_type()
            .ok_or_else(|| upload_invalid(UploadValidationError::InvalidKey))?;
        let bytes = self
            .storage
            .get(key)
            .await
            .map_err(map_storage_error)?
            .ok_or_else(|| Error::not_found("file not found"))?;
        Ok(StoredFile { media_type, bytes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockFileStorage;
    use crate::domain::test_support::principal;
    use crate::domain::{ErrorCode, Role};
    use crate::outbound::memory::MemoryFileStorage;
    use rstest::{fixture, rstest};

    #[fixture]
    fn service() -> UploadService {
        UploadService::new(Arc::new(MemoryFileStorage::new()))
    }

    #[rstest]
    #[tokio::test]
    async fn stored_files_can_be_read_back(service: UploadService) {
        let admin = principal(Role::Admin);
        let key = service
            .upload(&admin, UploadScope::Vehicles, "image/png", vec![1, 2, 3])
            .await
            .expect("upload");
        assert_eq!(key.scope(), UploadScope::Vehicles);
        assert!(key.name().ends_with(".png"));

        let file = service.download(&key).await.expect("download");
        assert_eq!(file.media_type, MediaType::Png);
        assert_eq!(file.bytes, [1, 2, 3]);
    }

    #[rstest]
    #[case(Role::Customer, UploadScope::Tickets, true)]
    #[case(Role::Customer, UploadScope::Vehicles, false)]
    #[case(Role::Broker, UploadScope::News, false)]
    #[case(Role::Admin, UploadScope::Faqs, true)]
    #[tokio::test]
    async fn scopes_need_matching_capability(
        service: UploadService,
        #[case] role: Role,
        #[case] scope: UploadScope,
        #[case] allowed: bool,
    ) {
        let result = service
            .upload(&principal(role), scope, "image/jpeg", vec![0xff, 0xd8])
            .await;
        match result {
            Ok(_) => assert!(allowed),
            Err(err) => {
                assert!(!allowed);
                assert_eq!(err.code(), ErrorCode::Forbidden);
            }
        }
    }

    #[rstest]
    #[tokio::test]
    async fn pdf_is_only_accepted_for_tickets(service: UploadService) {
        let admin = principal(Role::Admin);
        let err = service
            .upload(&admin, UploadScope::News, "application/pdf", vec![b'%'])
            .await
            .expect_err("pdf in news");
        assert_eq!(err.detail_code(), Some("unsupported_media_type"));
        service
            .upload(&admin, UploadScope::Tickets, "application/pdf", vec![b'%'])
            .await
            .expect("pdf ticket attachment");
    }

    #[rstest]
    #[tokio::test]
    async fn missing_files_are_not_found(service: UploadService) {
        let key = StorageKey::generate(UploadScope::Brands, MediaType::Webp);
        let err = service.download(&key).await.expect_err("missing");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn storage_outage_is_unavailable() {
        let mut storage = MockFileStorage::new();
        storage
            .expect_put()
            .return_once(|_, _| Err(FileStorageError::unavailable("disk detached")));
        let service = UploadService::new(Arc::new(storage));
        let err = service
            .upload(&principal(Role::Customer), UploadScope::Tickets, "image/png", vec![1])
            .await
            .expect_err("outage");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }
}
