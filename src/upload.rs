use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::api::UploadRequest;
use crate::error::UploadError;

pub const ALLOWED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// A file picked by the user, already read into memory.
#[derive(Clone, Debug)]
pub struct SelectedFile {
    pub name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// A file name split into base name and lowercased extension.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FinalName {
    pub base: String,
    pub extension: String,
}

impl FinalName {
    /// Without a dot the whole name stands in for both parts.
    pub fn derive(file_name: &str) -> Self {
        match file_name.rsplit_once('.') {
            Some((base, ext)) => Self {
                base: base.to_string(),
                extension: ext.to_lowercase(),
            },
            None => Self {
                base: file_name.to_string(),
                extension: file_name.to_lowercase(),
            },
        }
    }

    pub fn is_allowed(&self) -> bool {
        ALLOWED_EXTENSIONS.contains(&self.extension.as_str())
    }

    pub fn validate(self) -> Result<Self, UploadError> {
        if self.is_allowed() {
            Ok(self)
        } else {
            Err(UploadError::UnsupportedExtension {
                extension: self.extension,
            })
        }
    }
}

impl std::fmt::Display for FinalName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.base, self.extension)
    }
}

pub fn encode_content(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Declared type first, then the image signature, then a generic binary type.
pub fn resolve_content_type(declared: Option<&str>, bytes: &[u8]) -> String {
    if let Some(declared) = declared.map(str::trim).filter(|value| !value.is_empty()) {
        return declared.to_string();
    }
    detect_mime_type(bytes)
        .unwrap_or(FALLBACK_CONTENT_TYPE)
        .to_string()
}

pub fn detect_mime_type(bytes: &[u8]) -> Option<&'static str> {
    match image::guess_format(bytes).ok()? {
        image::ImageFormat::Png => Some("image/png"),
        image::ImageFormat::Jpeg => Some("image/jpeg"),
        _ => None,
    }
}

/// Validates the file and assembles the request; nothing is sent here.
pub fn prepare_upload(
    file: &SelectedFile,
    bucket: &str,
    custom_labels: &str,
) -> Result<UploadRequest, UploadError> {
    let final_name = FinalName::derive(&file.name).validate()?;
    Ok(UploadRequest {
        bucket: bucket.to_string(),
        filename: final_name.to_string(),
        content: encode_content(&file.bytes),
        content_type: resolve_content_type(file.content_type.as_deref(), &file.bytes),
        custom_labels: custom_labels.to_string(),
    })
}
