use crate::services::SessionState;
use actix_web::{web, HttpResponse, Responder};

pub(crate) async fn process(session: web::Data<SessionState>) -> impl Responder {
    let view = session.lock().templates_view();
    HttpResponse::Ok().json(view)
}
