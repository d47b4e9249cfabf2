use crate::config::AppConfig;
use crate::engine::table::CsvTableReader;
use crate::services::error::ApiError;
use crate::services::multipart::read_files;
use crate::services::SessionState;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::model::csv::TableUploadReport;
use log::info;

/// HTTP handler wrapper that converts the upload result into an `HttpResponse`.
///
/// - On success: `200 OK` with the `TableUploadReport` as JSON.
/// - On failure: the status of the `ApiError` with its message.
pub async fn process(
    payload: Multipart,
    session: web::Data<SessionState>,
    config: web::Data<AppConfig>,
) -> impl Responder {
    match upload_data_source(payload, &session, &config).await {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(e) => e.error_response(),
    }
}

/// Reads the single uploaded CSV file and replaces the session's dataset.
pub async fn upload_data_source(
    payload: Multipart,
    session: &SessionState,
    config: &AppConfig,
) -> Result<TableUploadReport, ApiError> {
    let files = read_files(payload, config.server.max_upload_bytes).await?;
    let [file] = <[_; 1]>::try_from(files).map_err(|files| {
        ApiError::Upload(format!("expected one CSV file, got {}", files.len()))
    })?;
    if !file.has_extension("csv") {
        return Err(ApiError::Upload("The file must end with .csv".to_string()));
    }

    let report = session.lock().load_table(&CsvTableReader, &file.bytes)?;
    info!(
        "Data source `{}` loaded: {} rows, md5 {}{}",
        file.file_name,
        report.row_count,
        report.fingerprint,
        if report.unchanged { " (unchanged)" } else { "" }
    );
    Ok(report)
}
