use std::fmt;

use mongodb::bson::oid::ObjectId;
use rocket::request::FromParam;

use crate::errors::Error;

/// Path-segment form of a document id.
///
/// Accepts exactly the canonical 24-character hex encoding and converts it
/// to an [`ObjectId`]; anything else fails the parameter with
/// [`Error::MalformedId`], which responds as HTTP 400 when the handler takes
/// the parameter as a `Result`:
///
/// ```rust,no_run
/// use docket::mongodb::bson::Document;
/// use docket::{Db, Error, ObjectIdParam};
/// use rocket::get;
/// use rocket::serde::json::Json;
///
/// #[get("/tasks/<id>")]
/// async fn show_task(
///     db: Db<'_>,
///     id: Result<ObjectIdParam, Error>,
/// ) -> Result<Json<Document>, Error> {
///     let task = db.documents("Task").await?.get_or_404(*id?).await?;
///     Ok(Json(task))
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectIdParam(pub ObjectId);

impl<'r> FromParam<'r> for ObjectIdParam {
    type Error = Error;

    fn from_param(param: &'r str) -> Result<Self, Self::Error> {
        Ok(ObjectIdParam(ObjectId::parse_str(param)?))
    }
}

impl fmt::Display for ObjectIdParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_hex())
    }
}

impl std::ops::Deref for ObjectIdParam {
    type Target = ObjectId;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<ObjectIdParam> for ObjectId {
    fn from(param: ObjectIdParam) -> Self {
        param.0
    }
}
