use rocket::http::Status;
use rocket::response::Responder;
use rocket::{Request, Response};
use std::io::Cursor;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum AppError {
    /// A remote source answered with a non-success status. The fetch loop
    /// degrades to "no more data" instead of surfacing this (see sources),
    /// so it only reaches a handler when the very first call fails.
    #[error("{source_name} is unavailable right now, try again later")]
    SourceUnavailable { source_name: &'static str, status: u16 },
    #[error("Malformed timestamp: {value}")]
    MalformedTimestamp { value: String },
    #[error("Please select a server first using the select-server command")]
    NoActiveServer,
    #[error("No player found on the specified server")]
    PlayerNotFound,
    #[error("No session data available for the specified player")]
    NoSessionData,
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationErrors),
    #[error("Internal server error")]
    ConfigurationError {
        message: String,
        #[source]
        source: figment::Error,
    },
    #[error("{source_name} is unavailable right now, try again later")]
    Http {
        source_name: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

impl AppError {
    pub fn unavailable(source_name: &'static str, status: u16) -> Self {
        Self::SourceUnavailable { source_name, status }
    }

    pub fn malformed_timestamp(value: impl Into<String>) -> Self {
        Self::MalformedTimestamp { value: value.into() }
    }

    pub fn http(source_name: &'static str, source: reqwest::Error) -> Self {
        Self::Http { source_name, source }
    }
}

impl From<figment::Error> for AppError {
    fn from(e: figment::Error) -> Self {
        AppError::ConfigurationError {
            message: "Failed to read configuration".to_string(),
            source: e,
        }
    }
}

impl From<&AppError> for Status {
    fn from(e: &AppError) -> Self {
        match e {
            AppError::SourceUnavailable { .. } => Status::BadGateway,
            AppError::MalformedTimestamp { .. } => Status::BadGateway,
            AppError::NoActiveServer => Status::Conflict,
            AppError::PlayerNotFound => Status::NotFound,
            AppError::NoSessionData => Status::NotFound,
            AppError::BadRequest(_) => Status::BadRequest,
            AppError::ValidationError(_) => Status::BadRequest,
            AppError::ConfigurationError { .. } => Status::InternalServerError,
            AppError::Http { .. } => Status::BadGateway,
        }
    }
}

impl<'r> Responder<'r, 'static> for AppError {
    fn respond_to(self, req: &Request<'_>) -> rocket::response::Result<'static> {
        let method = req.method();
        let uri = req.uri();

        let request_id = req
            .local_cache(|| None::<crate::middleware::RequestId>)
            .as_ref()
            .map(|r| r.0.as_str())
            .unwrap_or("unknown");

        error!(
            error = ?self,
            request_id = %request_id,
            method = %method,
            uri = %uri,
            "command failed"
        );

        // The chat frontend relays this message verbatim to the user.
        let status = Status::from(&self);
        let body = serde_json::json!({ "message": self.to_string() }).to_string();

        Response::build()
            .status(status)
            .header(rocket::http::ContentType::JSON)
            .sized_body(body.len(), Cursor::new(body))
            .ok()
    }
}
