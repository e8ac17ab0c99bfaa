//! Error types for the play tracker

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("database error: {0}")]
  Db(#[from] sea_orm::DbErr),

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("remote returned status {status}: {body}")]
  BadStatus { status: u16, body: String },

  #[error("remote data still not ready after {attempts} attempts")]
  NotReady { attempts: u32 },

  #[error("malformed remote document: {0}")]
  Xml(#[from] quick_xml::DeError),

  #[error("user not found or inactive")]
  UserNotFound,
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      Error::Db(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Database error"),
      Error::Http(_)
      | Error::BadStatus { .. }
      | Error::NotReady { .. }
      | Error::Xml(_) => (StatusCode::BAD_GATEWAY, "Upstream service error"),
      Error::UserNotFound => {
        (StatusCode::NOT_FOUND, "User not found or inactive")
      }
    };

    let body = json::json!({
      "success": false,
      "error": message
    });

    (status, axum::Json(body)).into_response()
  }
}
