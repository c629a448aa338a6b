//! Multipart file upload: validation, dated directory layout, and linking
//! uploads to articles as cover image or attachment.

use std::path::PathBuf;

use anyhow::{Context, Result};
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use pressroom_shared::{text, AttachmentRef};

use crate::state::AppState;

/// Upload kinds that influence where a file lands and how it is linked.
pub const UPLOAD_TYPE_COVER_IMAGE: &str = "cover_image";
pub const UPLOAD_TYPE_ATTACHMENT: &str = "attachment";
pub const UPLOAD_TYPE_GENERAL: &str = "general";

/// Allowed extensions grouped by the directory they are stored under.
const ALLOWED_EXTENSIONS: &[(&str, &[&str])] = &[
    ("images", &["jpg", "jpeg", "png", "gif", "webp", "svg"]),
    ("documents", &["pdf", "doc", "docx", "xls", "xlsx", "txt", "csv", "md"]),
    ("videos", &["mp4", "webm", "mov"]),
    ("audio", &["mp3", "wav", "ogg"]),
];

/// Metadata returned for each stored file.
#[derive(Debug, Clone, Serialize)]
pub struct UploadedFile {
    pub id: String,
    pub original_name: String,
    pub filename: String,
    pub file_type: String,
    pub file_size: u64,
    pub human_size: String,
    pub url: String,
    pub mime_type: String,
    pub uploaded_at: DateTime<Utc>,
    pub upload_type: String,
    pub article_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadError {
    pub filename: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub uploaded: usize,
    pub failed: usize,
    pub files: Vec<UploadedFile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<UploadError>>,
}

struct IncomingFile {
    filename: String,
    content_type: Option<String>,
    data: Vec<u8>,
}

/// POST /api/upload — accept one or more files plus optional `article_id`
/// and `type` form fields. 201 when at least one file was stored, 400
/// otherwise; per-file failures are reported alongside successes.
pub async fn upload_files(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> (StatusCode, Json<UploadResponse>) {
    let mut files: Vec<IncomingFile> = Vec::new();
    let mut oversized: Vec<UploadError> = Vec::new();
    let mut article_id: Option<String> = None;
    let mut upload_type = UPLOAD_TYPE_GENERAL.to_string();

    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "files" | "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                if filename.is_empty() {
                    continue;
                }
                let content_type = field.content_type().map(ToOwned::to_owned);
                match field.bytes().await {
                    Ok(bytes) if bytes.len() as u64 > state.max_upload_bytes() => {
                        oversized.push(UploadError {
                            filename,
                            error: format!(
                                "File too large. Maximum size: {}",
                                text::format_file_size(state.max_upload_bytes())
                            ),
                        });
                    },
                    Ok(bytes) => files.push(IncomingFile {
                        filename,
                        content_type,
                        data: bytes.to_vec(),
                    }),
                    Err(err) => {
                        tracing::warn!("failed to read upload field {filename}: {err}");
                        oversized.push(UploadError {
                            filename,
                            error: "Failed to read file data".to_string(),
                        });
                    },
                }
            },
            "article_id" => {
                if let Ok(value) = field.text().await {
                    if !value.trim().is_empty() {
                        article_id = Some(value.trim().to_string());
                    }
                }
            },
            "type" => {
                if let Ok(value) = field.text().await {
                    if !value.trim().is_empty() {
                        upload_type = value.trim().to_string();
                    }
                }
            },
            _ => {},
        }
    }

    let mut uploaded = Vec::new();
    let mut errors = oversized;

    if files.is_empty() && errors.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(UploadResponse {
                success: false,
                uploaded: 0,
                failed: 1,
                files: vec![],
                errors: Some(vec![UploadError {
                    filename: String::new(),
                    error: "No files provided".to_string(),
                }]),
            }),
        );
    }

    for file in files {
        match store_file(&state, &file, article_id.as_deref(), &upload_type).await {
            Ok(info) => {
                tracing::info!(url = %info.url, "file uploaded");
                uploaded.push(info);
            },
            Err(err) => {
                tracing::warn!("upload of {} failed: {err:#}", file.filename);
                errors.push(UploadError {
                    filename: file.filename,
                    error: err.to_string(),
                });
            },
        }
    }

    let status = if uploaded.is_empty() { StatusCode::BAD_REQUEST } else { StatusCode::CREATED };
    let response = UploadResponse {
        success: !uploaded.is_empty(),
        uploaded: uploaded.len(),
        failed: errors.len(),
        files: uploaded,
        errors: if errors.is_empty() { None } else { Some(errors) },
    };
    (status, Json(response))
}

async fn store_file(
    state: &AppState,
    file: &IncomingFile,
    article_id: Option<&str>,
    upload_type: &str,
) -> Result<UploadedFile> {
    let original_name = sanitize_filename(&file.filename);
    let extension = file_extension(&original_name)
        .with_context(|| format!("file {original_name} has no extension"))?;
    let file_type = file_kind(&extension).with_context(|| {
        format!("file type not allowed: .{extension} (allowed: {})", allowed_extension_list())
    })?;

    let now = Utc::now();
    let date_folder = now.format("%Y/%m/%d").to_string();
    let unique_filename = format!("{}_{}.{extension}", Uuid::new_v4().simple(), now.timestamp());

    let target_dir: PathBuf = state.upload_dir().join(file_type).join(&date_folder);
    tokio::fs::create_dir_all(&target_dir)
        .await
        .with_context(|| format!("failed to create {}", target_dir.display()))?;
    let target = target_dir.join(&unique_filename);
    tokio::fs::write(&target, &file.data)
        .await
        .with_context(|| format!("failed to write {}", target.display()))?;

    let url = format!("/static/uploads/{file_type}/{date_folder}/{unique_filename}");
    let mime_type = file
        .content_type
        .clone()
        .or_else(|| guess_mime_type(&extension))
        .unwrap_or_else(|| "application/octet-stream".to_string());

    let info = UploadedFile {
        id: Uuid::new_v4().simple().to_string(),
        original_name,
        filename: unique_filename,
        file_type: file_type.to_string(),
        file_size: file.data.len() as u64,
        human_size: text::format_file_size(file.data.len() as u64),
        url,
        mime_type,
        uploaded_at: now,
        upload_type: upload_type.to_string(),
        article_id: article_id.map(ToOwned::to_owned),
    };

    if let Some(article_id) = article_id {
        link_to_article(state, article_id, upload_type, &info).await?;
    }

    Ok(info)
}

/// Attach a stored file to its article as cover image or attachment. An
/// unknown article id is logged but does not fail the upload.
async fn link_to_article(
    state: &AppState,
    article_id: &str,
    upload_type: &str,
    info: &UploadedFile,
) -> Result<()> {
    if upload_type != UPLOAD_TYPE_COVER_IMAGE && upload_type != UPLOAD_TYPE_ATTACHMENT {
        return Ok(());
    }

    let attachment = AttachmentRef {
        id: info.id.clone(),
        original_name: info.original_name.clone(),
        filename: info.filename.clone(),
        url: info.url.clone(),
        file_size: info.file_size,
        human_size: info.human_size.clone(),
        mime_type: info.mime_type.clone(),
        uploaded_at: info.uploaded_at,
    };
    let url = info.url.clone();
    let kind = upload_type.to_string();

    let updated = state
        .store()
        .update(article_id, move |article| {
            if kind == UPLOAD_TYPE_COVER_IMAGE {
                article.cover_image = Some(url);
            } else {
                article.attachments.push(attachment);
            }
        })
        .await?;

    if updated.is_none() {
        tracing::warn!("upload linked to unknown article {article_id}");
    }
    Ok(())
}

/// Keep the basename only and replace anything outside `[A-Za-z0-9._-]`.
pub fn sanitize_filename(filename: &str) -> String {
    let basename = filename.rsplit(['/', '\\']).next().unwrap_or_default();
    basename
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '.' || ch == '-' || ch == '_' {
                ch
            } else {
                '_'
            }
        })
        .collect()
}

fn file_extension(filename: &str) -> Option<String> {
    let (stem, extension) = filename.rsplit_once('.')?;
    if stem.is_empty() || extension.is_empty() {
        return None;
    }
    Some(extension.to_lowercase())
}

/// Storage directory for an extension, or `None` when the type is not
/// allowed.
pub fn file_kind(extension: &str) -> Option<&'static str> {
    ALLOWED_EXTENSIONS
        .iter()
        .find(|(_, extensions)| extensions.contains(&extension))
        .map(|(kind, _)| *kind)
}

fn allowed_extension_list() -> String {
    ALLOWED_EXTENSIONS
        .iter()
        .flat_map(|(_, extensions)| extensions.iter().copied())
        .collect::<Vec<_>>()
        .join(", ")
}

fn guess_mime_type(extension: &str) -> Option<String> {
    let mime = match extension {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "md" => "text/markdown",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        _ => return None,
    };
    Some(mime.to_string())
}
