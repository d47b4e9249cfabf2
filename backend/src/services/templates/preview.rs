use crate::engine::ports::PreviewRenderer;
use crate::engine::preview::HtmlPreview;
use crate::services::error::ApiError;
use crate::services::SessionState;
use actix_web::{web, HttpResponse, Responder, ResponseError};

pub(crate) async fn process(
    template_id: web::Path<String>,
    session: web::Data<SessionState>,
) -> impl Responder {
    match preview_template(&template_id, &session) {
        Ok(html) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(html),
        Err(e) => e.error_response(),
    }
}

fn preview_template(template_id: &str, session: &SessionState) -> Result<String, ApiError> {
    let session = session.lock();
    let template = session
        .template(template_id)
        .ok_or_else(|| ApiError::NotFound(format!("template `{}`", template_id)))?;
    Ok(HtmlPreview.to_preview_markup(template.content())?)
}
