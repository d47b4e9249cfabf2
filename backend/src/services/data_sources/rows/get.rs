use super::{DEFAULT_ROWS_PAGE, MAX_ROWS_PAGE};
use crate::services::SessionState;
use actix_web::{web, HttpResponse, Responder};
use common::requests::RowsQuery;
use log::debug;

pub(crate) async fn process(
    session: web::Data<SessionState>,
    query: web::Query<RowsQuery>,
) -> impl Responder {
    let limit = query.limit.unwrap_or(DEFAULT_ROWS_PAGE).min(MAX_ROWS_PAGE);
    debug!("Rows requested from {} (limit {})", query.offset, limit);
    let page = session.lock().rows_page(query.offset, limit);
    HttpResponse::Ok().json(page)
}
