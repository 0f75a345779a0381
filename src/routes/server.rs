use crate::context::ServerSelections;
use crate::error::app_error::AppError;
use crate::service::presence::server_url;
use rocket::serde::json::Json;
use rocket::{State, post, routes};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct SelectServerRequest {
    /// Chat channel issuing the command; scopes the selection.
    #[validate(length(min = 1))]
    pub conversation_id: String,
    #[validate(length(min = 1))]
    pub server_id: String,
}

#[derive(Debug, Serialize)]
pub struct SelectServerResponse {
    pub message: String,
    pub server_url: String,
}

#[post("/select", data = "<request>")]
pub async fn select_server(
    selections: &State<Arc<ServerSelections>>,
    request: Json<SelectServerRequest>,
) -> Result<Json<SelectServerResponse>, AppError> {
    request.validate()?;

    selections.select(&request.conversation_id, &request.server_id).await;

    let server_url = server_url(&request.server_id);
    Ok(Json(SelectServerResponse {
        message: format!("Server ID has been set to {}", server_url),
        server_url,
    }))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![select_server]
}
