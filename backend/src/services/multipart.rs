//! Reads uploaded files out of a `multipart/form-data` body.

use crate::services::error::ApiError;
use actix_multipart::Multipart;
use futures_util::StreamExt;
use std::path::Path;

#[derive(Debug)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn has_extension(&self, extension: &str) -> bool {
        Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(extension))
    }
}

/// Collects every part that carries a file name. Other parts are drained and
/// ignored. Fails once the total size goes over `limit`.
pub async fn read_files(mut payload: Multipart, limit: usize) -> Result<Vec<UploadedFile>, ApiError> {
    let mut files = Vec::new();
    let mut total = 0usize;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| ApiError::Upload(e.to_string()))?;
        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename().map(|f| f.to_string()));

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| ApiError::Upload(e.to_string()))?;
            total += chunk.len();
            if total > limit {
                return Err(ApiError::TooLarge { limit });
            }
            if file_name.is_some() {
                bytes.extend_from_slice(&chunk);
            }
        }

        if let Some(file_name) = file_name {
            files.push(UploadedFile { file_name, bytes });
        }
    }

    if files.is_empty() {
        return Err(ApiError::Upload("no file was sent".to_string()));
    }
    Ok(files)
}
