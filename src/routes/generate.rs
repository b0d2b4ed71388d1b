//! Form submission: talk fields (+ optional PDF) in, .ics download out

use std::collections::HashMap;

use axum::{
    Router,
    body::Bytes,
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
    routing::post,
};
use talkcal_core::{CalendarDocument, TalkEvent};
use tracing::info;

use crate::routes::AppError;
use crate::state::AppState;

/// Multipart part carrying the optional attachment
const FILE_FIELD: &str = "pdfFile";

const TEXT_FIELDS: &[&str] = &[
    "title",
    "speaker",
    "starttime",
    "endtime",
    "venue",
    "affiliation",
    "host",
    "description",
    "remark",
];

pub fn router() -> Router<AppState> {
    Router::new().route("/generate-ical", post(generate_ical))
}

struct UploadedFile {
    file_name: Option<String>,
    content_type: Option<String>,
    data: Bytes,
}

/// POST /generate-ical - Generate the calendar file for a talk
///
/// The upload (if any) is written only after the document was generated,
/// so rejected submissions leave nothing behind.
async fn generate_ical(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let mut fields: HashMap<String, String> = HashMap::new();
    let mut upload = None;

    while let Some(field) = multipart.next_field().await.map_err(AppError::bad_request)? {
        let name = field.name().unwrap_or_default().to_string();

        if name == FILE_FIELD {
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let data = field.bytes().await.map_err(AppError::bad_request)?;

            // Browsers send an empty part when no file was picked
            if !data.is_empty() {
                upload = Some(UploadedFile {
                    file_name,
                    content_type,
                    data,
                });
            }
        } else if TEXT_FIELDS.contains(&name.as_str()) {
            let value = field.text().await.map_err(AppError::bad_request)?;
            fields.insert(name, value);
        }
    }

    let pending = upload.as_ref().map(|file| {
        state.uploads.plan(
            file.file_name.as_deref(),
            file.content_type.as_deref(),
            state.calendar.now(),
        )
    });

    let talk = TalkEvent::from_fields(&fields)
        .with_attachment(pending.as_ref().map(|p| p.attachment()));
    let document = state.calendar.generate(&talk)?;

    if let (Some(pending), Some(file)) = (pending, upload) {
        let path = state.uploads.store(&pending, &file.data).await?;
        info!(path = %path.display(), bytes = file.data.len(), "Stored upload");
    }

    info!(
        title = %talk.title,
        filename = %document.filename(),
        "Generated calendar file"
    );

    Ok(download(document))
}

fn download(document: CalendarDocument) -> Response {
    let content_type = format!("{}; charset=utf-8", document.mime_type());
    let disposition = content_disposition(document.filename());
    let (content, _) = document.into_parts();

    (
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        content,
    )
        .into_response()
}

/// `attachment` disposition with an ASCII fallback and the RFC 5987 UTF-8 name.
fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii() && !c.is_ascii_control() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        percent_encode(filename)
    )
}

/// Percent-encode everything outside the RFC 5987 `attr-char` set.
fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len() * 3);
    for byte in input.bytes() {
        let keep = byte.is_ascii_alphanumeric()
            || matches!(
                byte,
                b'!' | b'#' | b'$' | b'&' | b'+' | b'-' | b'.' | b'^' | b'_' | b'`' | b'|' | b'~'
            );
        if keep {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}
