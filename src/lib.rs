//! # Docket - MongoDB document mapping for Rocket applications
//!
//! Docket binds the MongoDB driver to Rocket's request lifecycle: a
//! connection is opened lazily the first time a request touches the
//! database, the registered document descriptors are attached to it, and
//! the connection is closed when the response goes out, whatever the
//! outcome.
//!
//! ## Configuration
//!
//! Settings are read from the application's figment under the `mongodb` key
//! (`Rocket.toml` or `ROCKET_MONGODB_*` environment variables); every field
//! is optional:
//!
//! - `host` (default `127.0.0.1`) and `port` (default `27017`)
//! - `database` (default `docket`)
//! - `secondary_reads` - allow reads from secondaries (default `false`)
//! - `username` / `password` - authenticate at the configured database
//!
//! ## Usage
//!
//! ```rust,no_run
//! use docket::mongodb::bson::{Document, doc};
//! use docket::{Db, Docket, DocumentSpec, Error};
//! use rocket::serde::json::Json;
//! use rocket::{get, launch, routes};
//!
//! static TASK: DocumentSpec = DocumentSpec {
//!     name: "Task",
//!     collection: "tasks",
//!     required_fields: &["title"],
//!     defaults: Some(task_defaults),
//! };
//!
//! fn task_defaults() -> Document {
//!     doc! { "done": false }
//! }
//!
//! #[get("/tasks")]
//! async fn list_tasks(db: Db<'_>) -> Result<Json<Vec<Document>>, Error> {
//!     use rocket::futures::TryStreamExt;
//!
//!     let tasks = db.documents("Task").await?;
//!     let all: Vec<Document> = tasks.find(doc! {}).await?.try_collect().await?;
//!     Ok(Json(all))
//! }
//!
//! #[launch]
//! fn rocket() -> _ {
//!     let documents = Docket::new();
//!     documents.register_one(&TASK);
//!
//!     rocket::build()
//!         .attach(documents.fairing())
//!         .mount("/", routes![list_tasks])
//! }
//! ```

pub mod collection;
pub mod config;
pub mod documents;
pub mod errors;
pub mod fairing;
pub mod param;
pub mod scope;

pub use collection::DocumentCollection;
pub use config::MongoConfig;
pub use documents::{Docket, DocumentSpec};
pub use errors::Error;
pub use fairing::{Db, DocketFairing};
pub use param::ObjectIdParam;
pub use scope::{Binding, Scope};

pub use mongodb;
