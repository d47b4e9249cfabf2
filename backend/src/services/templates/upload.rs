use crate::config::AppConfig;
use crate::engine::error::LEGACY_DOC_HINT;
use crate::services::error::ApiError;
use crate::services::multipart::read_files;
use crate::services::SessionState;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::model::template::TemplateReport;

const TEMPLATE_EXTENSION: &str = "docx";
const LEGACY_EXTENSION: &str = "doc";

pub(crate) async fn process(
    payload: Multipart,
    session: web::Data<SessionState>,
    config: web::Data<AppConfig>,
) -> impl Responder {
    match upload_templates(payload, &session, &config).await {
        Ok(reports) => HttpResponse::Ok().json(reports),
        Err(e) => e.error_response(),
    }
}

/// Reads every uploaded file and replaces the session's template set with them.
async fn upload_templates(
    payload: Multipart,
    session: &SessionState,
    config: &AppConfig,
) -> Result<Vec<TemplateReport>, ApiError> {
    let files = read_files(payload, config.server.max_upload_bytes).await?;
    if let Some(file) = files.iter().find(|f| f.has_extension(LEGACY_EXTENSION)) {
        return Err(ApiError::Upload(format!("`{}`: {}", file.file_name, LEGACY_DOC_HINT)));
    }
    if let Some(file) = files.iter().find(|f| !f.has_extension(TEMPLATE_EXTENSION)) {
        return Err(ApiError::Upload(format!(
            "`{}` is not a .docx template",
            file.file_name
        )));
    }

    let files = files
        .into_iter()
        .map(|file| (file.file_name, file.bytes))
        .collect();
    let reports = session.lock().load_templates(files)?;
    Ok(reports)
}
