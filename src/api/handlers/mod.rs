//! HTTP request handlers.

pub mod admin_handler;
pub mod auth_handler;
pub mod escrow_handler;
pub mod kyc_handler;
pub mod payment_handler;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::errors::{AppError, AppResult};
use crate::services::AttachmentUpload;

/// A base64-encoded file attachment as carried in JSON request bodies.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AttachmentPayload {
    /// Client-supplied file name
    #[schema(example = "receipt.pdf")]
    pub filename: String,
    /// Base64-encoded file content
    pub content: String,
}

/// Decode base64 attachment payloads into raw uploads. Any undecodable
/// attachment fails the whole request before blobs are written.
pub(crate) fn decode_attachments(
    payloads: Vec<AttachmentPayload>,
) -> AppResult<Vec<AttachmentUpload>> {
    payloads
        .into_iter()
        .map(|payload| {
            let bytes = BASE64.decode(&payload.content).map_err(|_| {
                AppError::BadRequest(format!(
                    "Attachment '{}' is not valid base64",
                    payload.filename
                ))
            })?;
            Ok(AttachmentUpload {
                file_name: payload.filename,
                bytes,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_valid_base64_attachments() {
        let payloads = vec![AttachmentPayload {
            filename: "notes.txt".into(),
            content: BASE64.encode(b"hello"),
        }];
        let uploads = decode_attachments(payloads).unwrap();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].file_name, "notes.txt");
        assert_eq!(uploads[0].bytes, b"hello");
    }

    #[test]
    fn rejects_malformed_base64() {
        let payloads = vec![AttachmentPayload {
            filename: "bad.bin".into(),
            content: "not-base64!!!".into(),
        }];
        let err = decode_attachments(payloads).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
