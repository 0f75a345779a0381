use crate::context::ServerSelections;
use crate::error::app_error::AppError;
use crate::models::player::PlayerReport;
use crate::service::presence::PresenceService;
use rocket::serde::json::Json;
use rocket::{State, get, routes};
use std::sync::Arc;

fn require(name: &str, value: Option<String>) -> Result<String, AppError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("Missing {} query parameter", name)))
}

/// Look up a player by display name on the conversation's selected server.
#[get("/by-name?<conversation_id>&<name>")]
pub async fn lookup_by_name(
    selections: &State<Arc<ServerSelections>>,
    service: &State<Arc<PresenceService>>,
    conversation_id: Option<String>,
    name: Option<String>,
) -> Result<Json<PlayerReport>, AppError> {
    let conversation_id = require("conversation_id", conversation_id)?;
    let name = require("name", name)?;

    let server_id = selections.selected(&conversation_id).await?;
    Ok(Json(service.lookup_by_name(&server_id, &name).await?))
}

/// Look up a player by external account id: the id is resolved to a display
/// name through the identity source first, then treated as a name lookup.
#[get("/by-account?<conversation_id>&<account_id>")]
pub async fn lookup_by_account(
    selections: &State<Arc<ServerSelections>>,
    service: &State<Arc<PresenceService>>,
    conversation_id: Option<String>,
    account_id: Option<String>,
) -> Result<Json<PlayerReport>, AppError> {
    let conversation_id = require("conversation_id", conversation_id)?;
    let account_id = require("account_id", account_id)?;

    let server_id = selections.selected(&conversation_id).await?;
    Ok(Json(service.lookup_by_account(&server_id, &account_id).await?))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![lookup_by_name, lookup_by_account]
}
