use actix_web::{web, App, HttpServer};
use docmerge::config::AppConfig;
use docmerge::engine::session::MergeSession;
use docmerge::job_controller::state::{start_job_updater, JobsState};
use docmerge::services::{self, SessionState};
use env_logger::Env;
use log::info;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = AppConfig::load().map_err(std::io::Error::other)?;
    env_logger::init_from_env(Env::default().default_filter_or(config.server.log_filter.as_str()));

    // Initialize job controller state
    let (jobs_state, rx) = JobsState::with_retained_reports(config.server.retained_reports);
    let updater_state = jobs_state.clone();
    tokio::spawn(async move {
        start_job_updater(updater_state, rx).await;
    });

    let options = config.merge_options();
    info!(
        "Merge session ready ({} mode{})",
        if options.multi_template { "multi-template" } else { "single-template" },
        if options.parallel { ", parallel rendering" } else { "" }
    );
    let session = web::Data::new(SessionState::new(MergeSession::new(options)));
    let jobs = web::Data::new(jobs_state);
    let json_limit = config.server.max_upload_bytes;
    let address = config.address();
    let config = web::Data::new(config);

    info!("Server running at http://{}", address);

    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(json_limit))
            .app_data(session.clone())
            .app_data(jobs.clone())
            .app_data(config.clone())
            .configure(services::configure)
    })
    .bind(address)?
    .run()
    .await
}
