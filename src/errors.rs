use rocket::Request;
use rocket::http::{ContentType, Status};
use rocket::response::{self, Responder, Response};
use serde_json::json;
use thiserror::Error;

/// Failures surfaced by the connection lifecycle and the document helpers.
///
/// Every variant maps to an HTTP response through the [`Responder`] impl, so
/// handlers can return `Result<_, Error>` and bubble failures with `?`.
#[derive(Error, Debug)]
pub enum Error {
    #[error("no database binding; is the Docket fairing attached?")]
    Unbound,
    #[error("authentication rejected for the configured user")]
    Authentication,
    #[error("document not found")]
    NotFound,
    #[error("malformed document id: {0}")]
    MalformedId(#[from] mongodb::bson::oid::Error),
    #[error("document `{0}` is not registered")]
    UnregisteredDocument(String),
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("database error: {0}")]
    Driver(#[from] mongodb::error::Error),
}

impl Error {
    /// HTTP status this error responds with.
    pub fn status(&self) -> Status {
        match self {
            Error::NotFound => Status::NotFound,
            Error::MalformedId(_) => Status::BadRequest,
            Error::MissingField(_) => Status::UnprocessableEntity,
            Error::Unbound
            | Error::Authentication
            | Error::UnregisteredDocument(_)
            | Error::Driver(_) => Status::InternalServerError,
        }
    }
}

impl<'r> Responder<'r, 'static> for Error {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status();
        let body = json!({
            "error": self.to_string(),
            "status": status.code
        })
        .to_string();

        Response::build()
            .status(status)
            .header(ContentType::JSON)
            .sized_body(body.len(), std::io::Cursor::new(body))
            .ok()
    }
}
