//! Multipart form reading shared by the upload endpoints.
//!
//! Upload endpoints take a `payload` text field holding the JSON body plus
//! any number of named file fields.

use std::collections::HashMap;

use axum::extract::Multipart;
use serde::de::DeserializeOwned;

use crate::error::{AppError, AppResult};

/// Name of the multipart field carrying the JSON body.
pub const PAYLOAD_FIELD: &str = "payload";

/// One uploaded file.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// A fully read multipart request.
#[derive(Debug, Default)]
pub struct UploadForm {
    payload: Option<String>,
    files: HashMap<String, Vec<Upload>>,
}

impl UploadForm {
    /// Drain `multipart`. A repeated file field accumulates its files in
    /// order; empty file parts are skipped.
    pub async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            let name = field.name().unwrap_or("").to_string();
            if name == PAYLOAD_FIELD {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                form.payload = Some(text);
                continue;
            }

            let Some(filename) = field.file_name().map(str::to_string) else {
                continue; // ignore unknown text fields
            };
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            if data.is_empty() {
                continue;
            }
            form.files.entry(name).or_default().push(Upload {
                filename,
                bytes: data.to_vec(),
            });
        }

        Ok(form)
    }

    /// Parse the `payload` field. A missing payload parses as `{}`.
    pub fn payload<T: DeserializeOwned>(&self) -> AppResult<T> {
        let raw = self.payload.as_deref().unwrap_or("{}");
        serde_json::from_str(raw)
            .map_err(|e| AppError::BadRequest(format!("Invalid '{PAYLOAD_FIELD}' field: {e}")))
    }

    /// Take the single file under `name`. With several, the last one wins.
    pub fn take_file(&mut self, name: &str) -> Option<Upload> {
        self.files.remove(name).and_then(|mut files| files.pop())
    }

    /// Take every file under `name`.
    pub fn take_files(&mut self, name: &str) -> Vec<Upload> {
        self.files.remove(name).unwrap_or_default()
    }
}
