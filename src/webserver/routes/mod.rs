use crate::webserver::state::AppState;
use axum::{
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;

pub mod data;
pub mod status;

const INDEX_TEXT: &str = "\
minestats - minesweeper game record API

GET  /data      filtered game records (JSON array)
                  solved=true|false                       default true
                  difficulty=beginner|intermediate|expert default expert
                  3bv_threshold=<number>                  minimum 3BV
                  efficiency_threshold=<number>           minimum efficiency
                  solved_percent_threshold=<number>       minimum solve %, default 50
                                                          (only when solved=false)
                  start_date=YYYY-MM-DD                   inclusive, UTC
                  end_date=YYYY-MM-DD                     inclusive, UTC
GET  /latest    timestamp of the newest cached record
GET  /status    snapshot cache status
POST /refresh   rebuild the snapshot now
GET  /health    liveness check
";

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .merge(data::routes())
        .merge(status::routes())
        .with_state(state)
}

/// GET /
async fn index() -> Response {
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], INDEX_TEXT).into_response()
}
