//! Upload scopes, accepted media types and storage keys.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Largest accepted upload in bytes (10 MiB).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadValidationError {
    #[error("unknown upload scope: {value}")]
    UnknownScope { value: String },
    #[error("content type {content_type} is not accepted for {scope}")]
    UnsupportedMediaType { scope: UploadScope, content_type: String },
    #[error("upload exceeds {max} bytes")]
    TooLarge { max: usize },
    #[error("upload body is empty")]
    Empty,
    #[error("storage key is malformed")]
    InvalidKey,
}

impl UploadValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownScope { .. } => "invalid_scope",
            Self::UnsupportedMediaType { .. } => "unsupported_media_type",
            Self::TooLarge { .. } => "file_too_large",
            Self::Empty => "empty_upload",
            Self::InvalidKey => "invalid_key",
        }
    }
}

/// Folder a file is stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadScope {
    Vehicles,
    Brands,
    Faqs,
    News,
    Tickets,
}

impl UploadScope {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vehicles => "vehicles",
            Self::Brands => "brands",
            Self::Faqs => "faqs",
            Self::News => "news",
            Self::Tickets => "tickets",
        }
    }

    fn accepts(self, media: MediaType) -> bool {
        match media {
            MediaType::Pdf => self == Self::Tickets,
            MediaType::Jpeg | MediaType::Png | MediaType::Webp => true,
        }
    }
}

impl fmt::Display for UploadScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UploadScope {
    type Err = UploadValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vehicles" => Ok(Self::Vehicles),
            "brands" => Ok(Self::Brands),
            "faqs" => Ok(Self::Faqs),
            "news" => Ok(Self::News),
            "tickets" => Ok(Self::Tickets),
            other => Err(UploadValidationError::UnknownScope {
                value: other.to_owned(),
            }),
        }
    }
}

/// Accepted media types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Jpeg,
    Png,
    Webp,
    Pdf,
}

impl MediaType {
    /// Parse a `Content-Type` value, ignoring parameters.
    pub fn from_content_type(raw: &str) -> Option<Self> {
        let essence = raw.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/webp" => Some(Self::Webp),
            "application/pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    /// Derive the media type from a stored file name.
    pub fn from_extension(name: &str) -> Option<Self> {
        match name.rsplit_once('.')?.1 {
            "jpg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "webp" => Some(Self::Webp),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
            Self::Pdf => "pdf",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
            Self::Pdf => "application/pdf",
        }
    }
}

/// Storage location of an uploaded file, `{scope}/{uuid}.{ext}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StorageKey {
    scope: UploadScope,
    name: String,
}

impl StorageKey {
    /// Fresh key for a new upload.
    pub fn generate(scope: UploadScope, media: MediaType) -> Self {
        Self {
            scope,
            name: format!("{}.{}", Uuid::new_v4(), media.extension()),
        }
    }

    /// Parse a key from its scope and file name parts.
    ///
    /// Names must be a UUID with a known extension, which keeps callers from
    /// escaping the scope directory.
    pub fn from_parts(scope: &str, name: &str) -> Result<Self, UploadValidationError> {
        let scope = scope.parse::<UploadScope>()?;
        let (stem, _) = name
            .rsplit_once('.')
            .ok_or(UploadValidationError::InvalidKey)?;
        if Uuid::parse_str(stem).is_err() || MediaType::from_extension(name).is_none() {
            return Err(UploadValidationError::InvalidKey);
        }
        Ok(Self {
            scope,
            name: name.to_owned(),
        })
    }

    pub fn scope(&self) -> UploadScope {
        self.scope
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media_type(&self) -> Option<MediaType> {
        MediaType::from_extension(&self.name)
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.scope, self.name)
    }
}

impl From<StorageKey> for String {
    fn from(value: StorageKey) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for StorageKey {
    type Error = UploadValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let (scope, name) = value
            .split_once('/')
            .ok_or(UploadValidationError::InvalidKey)?;
        Self::from_parts(scope, name)
    }
}

/// Check an upload against the scope's media and size rules.
///
/// # Examples
/// ```
/// use fleet_backend::domain::{validate_upload, MediaType, UploadScope};
///
/// let media = validate_upload(UploadScope::Tickets, "application/pdf", 1024).expect("pdf");
/// assert_eq!(media, MediaType::Pdf);
/// assert!(validate_upload(UploadScope::Vehicles, "application/pdf", 1024).is_err());
/// ```
pub fn validate_upload(
    scope: UploadScope,
    content_type: &str,
    size: usize,
) -> Result<MediaType, UploadValidationError> {
    if size == 0 {
        return Err(UploadValidationError::Empty);
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(UploadValidationError::TooLarge {
            max: MAX_UPLOAD_BYTES,
        });
    }
    MediaType::from_content_type(content_type)
        .filter(|media| scope.accepts(*media))
        .ok_or_else(|| UploadValidationError::UnsupportedMediaType {
            scope,
            content_type: content_type.to_owned(),
        })
}
