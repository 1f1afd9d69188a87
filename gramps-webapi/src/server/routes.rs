//! Route handlers.

use axum::{routing::get, Json, Router};
use serde::Serialize;

use super::{AppState, RequestDb};
use crate::error::ApiResult;
use crate::models::Researcher;

/// Routes mounted under the API prefix.
pub fn api_router() -> Router<AppState> {
    Router::new().route("/metadata", get(get_metadata))
}

/// `GET|POST /` - name of the tree and its researcher as plain text.
pub async fn dummy_root(db: RequestDb) -> ApiResult<String> {
    let state = db.get_db()?;
    let dbname = state.db.get_dbname();
    let researcher = state.db.get_researcher()?;
    Ok(format!(
        "Database: {}, Researcher: {}",
        dbname,
        researcher.get_name()
    ))
}

#[derive(Debug, Serialize)]
pub struct DatabaseSummary {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct MetadataResponse {
    pub database: DatabaseSummary,
    pub researcher: Researcher,
}

async fn get_metadata(db: RequestDb) -> ApiResult<Json<MetadataResponse>> {
    let state = db.get_db()?;
    Ok(Json(MetadataResponse {
        database: DatabaseSummary {
            id: state.db.get_dbid().to_string(),
            name: state.db.get_dbname().to_string(),
        },
        researcher: state.db.get_researcher()?,
    }))
}
