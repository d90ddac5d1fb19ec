//! Submission boundary: `POST /upload`.

use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use metrics::counter;
use tracing::instrument;

use scribe_core::{JobRecord, NewJob};
use scribe_transcribe::model::normalize_model_name;

use crate::errors::ApiError;
use crate::metrics::HTTP_REQUESTS_TOTAL;
use crate::state::AppState;

/// Accept an audio upload and start a transcription job.
///
/// Multipart fields: `file` (required), `model` and `language` (optional,
/// defaulted from settings / auto-detect). Replies `202 Accepted` with the
/// pending job record — transcription runs off the request path.
#[instrument(skip(state, multipart))]
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<JobRecord>), ApiError> {
    counter!(HTTP_REQUESTS_TOTAL, "route" => "upload").increment(1);

    let mut audio: Option<Vec<u8>> = None;
    let mut filename: Option<String> = None;
    let mut model: Option<String> = None;
    let mut language: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::invalid(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                filename = field.file_name().map(ToString::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::invalid(format!("failed to read upload: {e}")))?;
                audio = Some(bytes.to_vec());
            }
            "model" => {
                model = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::invalid(format!("bad 'model' field: {e}")))?,
                );
            }
            "language" => {
                language = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::invalid(format!("bad 'language' field: {e}")))?,
                );
            }
            _ => {}
        }
    }

    let audio = audio.ok_or_else(|| ApiError::invalid("missing 'file' field"))?;
    if audio.is_empty() {
        return Err(ApiError::invalid("empty audio payload"));
    }

    let model = normalize_model_name(
        &model
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| state.default_model.clone()),
    );
    let language = language
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty() && l != "auto");
    let filename = filename
        .filter(|f| !f.trim().is_empty())
        .unwrap_or_else(|| "upload.wav".to_string());

    let job = state.executor.submit(
        NewJob {
            filename,
            model,
            language,
        },
        &audio,
    )?;

    Ok((StatusCode::ACCEPTED, Json(job)))
}
