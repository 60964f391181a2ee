//! Collects multipart form fields into memory.

use std::collections::HashMap;

use axum::extract::{FromRequest, Multipart, Request};

use signet_core::SignatureId;
use signet_workflow::Upload;

use crate::error::ServerError;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Text fields and uploaded files from one multipart body.
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, Vec<String>>,
    files: HashMap<String, Upload>,
}

impl<S> FromRequest<S> for FormData
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| ServerError::BadRequest(e.body_text()))?;
        Self::read(multipart).await
    }
}

impl FormData {
    /// Drain a multipart stream.
    ///
    /// A part is treated as a file when it carries a filename.
    pub async fn read(mut multipart: Multipart) -> Result<Self, ServerError> {
        let mut form = Self::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ServerError::BadRequest(format!("invalid multipart body: {e}")))?
        {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };
            if let Some(filename) = field.file_name().map(str::to_owned) {
                let content_type = field
                    .content_type()
                    .unwrap_or(DEFAULT_CONTENT_TYPE)
                    .to_owned();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ServerError::BadRequest(format!("invalid file part: {e}")))?;
                form.files
                    .insert(name, Upload::new(filename, content_type, data));
            } else {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ServerError::BadRequest(format!("invalid form field: {e}")))?;
                form.fields.entry(name).or_default().push(text);
            }
        }
        Ok(form)
    }

    /// First value of a text field.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Remove and return the uploaded file named `name`.
    pub fn take_file(&mut self, name: &str) -> Result<Upload, ServerError> {
        self.files
            .remove(name)
            .ok_or_else(|| ServerError::BadRequest(format!("{name} is required")))
    }

    /// Signature ids from every `signature_id` field.
    ///
    /// Each field may hold one id or a comma-separated list.
    pub fn signature_ids(&self) -> Result<Vec<SignatureId>, ServerError> {
        parse_ids(
            self.fields
                .get("signature_id")
                .into_iter()
                .flatten()
                .map(String::as_str),
        )
    }
}

fn parse_ids<'a>(values: impl Iterator<Item = &'a str>) -> Result<Vec<SignatureId>, ServerError> {
    values
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| {
            v.parse::<i64>()
                .map(SignatureId::new)
                .map_err(|_| ServerError::BadRequest(format!("invalid signature id: {v}")))
        })
        .collect()
}
