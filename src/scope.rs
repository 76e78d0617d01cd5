//! The connection lifecycle: bindings and per-request scopes.

use std::sync::Mutex;

use mongodb::bson::{Document, doc};
use mongodb::error::ErrorKind;
use mongodb::{Client, Collection, Database};

use crate::collection::DocumentCollection;
use crate::config::MongoConfig;
use crate::documents::{Docket, DocumentSpec};
use crate::errors::Error;

/// Immutable association between one application and its configuration.
///
/// Created at ignite time by the fairing, or directly through
/// [`Docket::bind`] in code that manages its own scopes. Clones share the
/// underlying manager.
#[derive(Clone)]
pub struct Binding {
    docket: Docket,
    config: MongoConfig,
}

impl Binding {
    pub(crate) fn new(docket: Docket, config: MongoConfig) -> Self {
        Self { docket, config }
    }

    pub fn config(&self) -> &MongoConfig {
        &self.config
    }

    pub fn docket(&self) -> &Docket {
        &self.docket
    }

    /// An empty scope for one unit of work. No connection is made until the
    /// scope is first used.
    pub fn scope(&self) -> Scope {
        Scope {
            binding: self.clone(),
            live: Mutex::new(None),
        }
    }
}

/// State that exists only while a scope is connected. The client and its
/// database reference are created together and destroyed together.
struct Live {
    client: Client,
    database: Database,
    attached: Vec<&'static DocumentSpec>,
}

/// Per-request connection slot.
///
/// A scope starts empty; the first data access opens the connection, and
/// [`release`](Scope::release) tears it down. One scope serves exactly one
/// unit of work, so concurrent requests never contend on a slot.
pub struct Scope {
    binding: Binding,
    live: Mutex<Option<Live>>,
}

impl Scope {
    /// The binding this scope was created from.
    pub fn binding(&self) -> &Binding {
        &self.binding
    }

    /// True iff the slot holds a live database reference.
    pub fn is_connected(&self) -> bool {
        self.live.lock().map(|live| live.is_some()).unwrap_or(false)
    }

    /// Opens the connection if the slot is empty; a no-op otherwise.
    ///
    /// Opening selects the configured database, attaches the descriptors
    /// registered at that moment, and, when credentials are configured,
    /// validates them against the server. Rejected credentials surface as
    /// [`Error::Authentication`] and leave the slot empty.
    pub async fn ensure_connected(&self) -> Result<(), Error> {
        self.database().await.map(|_| ())
    }

    /// The live database handle, connecting first if needed.
    pub async fn database(&self) -> Result<Database, Error> {
        if let Some(database) = self.snapshot(|live| live.database.clone()) {
            return Ok(database);
        }
        self.establish().await
    }

    /// A collection handle on the live database, connecting first if needed.
    pub async fn collection(&self, name: &str) -> Result<Collection<Document>, Error> {
        Ok(self.database().await?.collection(name))
    }

    /// Access to a registered document descriptor by name, connecting first
    /// if needed. Descriptors registered after this scope connected are not
    /// visible to it.
    pub async fn documents(&self, name: &str) -> Result<DocumentCollection, Error> {
        self.ensure_connected().await?;
        self.snapshot(|live| {
            live.attached
                .iter()
                .copied()
                .find(|spec| spec.name == name)
                .map(|spec| {
                    DocumentCollection::new(spec, live.database.collection(spec.collection))
                })
        })
        .flatten()
        .ok_or_else(|| Error::UnregisteredDocument(name.to_string()))
    }

    /// Shuts the connection down and clears the slot. A no-op when the scope
    /// never connected or was already released.
    pub async fn release(&self) {
        let live = self.live.lock().ok().and_then(|mut slot| slot.take());
        if let Some(live) = live {
            live.client.shutdown().await;
        }
    }

    fn snapshot<T>(&self, read: impl FnOnce(&Live) -> T) -> Option<T> {
        self.live.lock().ok().and_then(|slot| slot.as_ref().map(read))
    }

    async fn establish(&self) -> Result<Database, Error> {
        let config = self.binding.config();
        let client = Client::with_options(config.client_options())?;
        let database = client.database(&config.database);

        if config.has_credentials() {
            if let Err(err) = database.run_command(doc! { "ping": 1 }, None).await {
                return Err(if is_authentication_failure(&err) {
                    Error::Authentication
                } else {
                    err.into()
                });
            }
        }

        let attached = self.binding.docket().registered();
        if let Ok(mut slot) = self.live.lock() {
            if let Some(live) = slot.as_ref() {
                // A concurrent caller on this scope won the race; keep its
                // connection and drop ours.
                return Ok(live.database.clone());
            }
            *slot = Some(Live {
                client,
                database: database.clone(),
                attached,
            });
        }
        Ok(database)
    }
}

/// The server rejected the configured credentials, as opposed to being
/// unreachable. Code 18 is the server-side AuthenticationFailed.
fn is_authentication_failure(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Authentication { .. } => true,
        ErrorKind::Command(command) => command.code == 18,
        _ => false,
    }
}
