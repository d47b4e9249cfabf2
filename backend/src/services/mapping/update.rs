use crate::services::error::ApiError;
use crate::services::SessionState;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::requests::{SetPlaceholderMappingRequest, SetRowTemplateRequest};
use common::responses::MappingView;
use log::debug;

pub(crate) async fn set_placeholder(
    session: web::Data<SessionState>,
    payload: web::Json<SetPlaceholderMappingRequest>,
) -> impl Responder {
    respond(apply_placeholder(&session, payload.into_inner()))
}

pub(crate) async fn set_row_template(
    session: web::Data<SessionState>,
    payload: web::Json<SetRowTemplateRequest>,
) -> impl Responder {
    respond(apply_row_template(&session, payload.into_inner()))
}

fn respond(result: Result<MappingView, ApiError>) -> HttpResponse {
    match result {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(e) => e.error_response(),
    }
}

fn apply_placeholder(
    session: &SessionState,
    req: SetPlaceholderMappingRequest,
) -> Result<MappingView, ApiError> {
    let mut session = session.lock();
    session.set_mapping(&req.placeholder, req.column.as_deref())?;
    debug!("Placeholder `{}` bound to {:?}", req.placeholder, req.column);
    Ok(session.mapping_view())
}

fn apply_row_template(
    session: &SessionState,
    req: SetRowTemplateRequest,
) -> Result<MappingView, ApiError> {
    let mut session = session.lock();
    session.set_row_template(req.row_index, req.template.as_deref())?;
    debug!("Row {} uses template {:?}", req.row_index + 1, req.template);
    Ok(session.mapping_view())
}
