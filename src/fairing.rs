//! Rocket adapter: the fairing and the request guard.

use rocket::fairing::{self, Fairing, Info, Kind};
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome, Request};
use rocket::{Build, Data, Response, Rocket};

use crate::config::MongoConfig;
use crate::documents::Docket;
use crate::errors::Error;
use crate::scope::{Binding, Scope};

/// Wires a [`Docket`] into an application's request lifecycle.
///
/// - At ignition the connection settings are bound and the manager handle is
///   placed into managed state, where other code can discover it.
/// - Each request gets its own empty [`Scope`] before routing.
/// - The scope is released when the response goes out, for every outcome.
///
/// Attaching twice with equal settings is a no-op; conflicting settings
/// abort ignition.
pub struct DocketFairing {
    docket: Docket,
    config: Option<MongoConfig>,
}

impl DocketFairing {
    pub(crate) fn new(docket: Docket, config: Option<MongoConfig>) -> Self {
        Self { docket, config }
    }
}

#[rocket::async_trait]
impl Fairing for DocketFairing {
    fn info(&self) -> Info {
        Info {
            name: "Docket MongoDB documents",
            kind: Kind::Ignite | Kind::Request | Kind::Response,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> fairing::Result {
        let config = match &self.config {
            Some(config) => config.clone(),
            None => match MongoConfig::from_figment(rocket.figment()) {
                Ok(config) => config,
                Err(err) => {
                    log::error!("invalid `{}` configuration: {}", MongoConfig::KEY, err);
                    return Err(rocket);
                }
            },
        };

        if let Some(bound) = rocket.state::<Binding>() {
            if bound.config() != &config {
                log::error!(
                    "application is already bound with different `{}` settings",
                    MongoConfig::KEY
                );
                return Err(rocket);
            }
            return Ok(rocket);
        }

        let binding = self.docket.bind(config);
        Ok(rocket.manage(binding).manage(self.docket.clone()))
    }

    async fn on_request(&self, request: &mut Request<'_>, _data: &mut Data<'_>) {
        request_scope(request);
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, _response: &mut Response<'r>) {
        if let Some(scope) = request_scope(request).get() {
            scope.release().await;
        }
    }
}

/// Request-local scope slot. Empty when no binding is managed, which means
/// the fairing was never attached.
struct RequestScope(Option<Scope>);

impl RequestScope {
    fn get(&self) -> Option<&Scope> {
        self.0.as_ref()
    }
}

fn request_scope<'r>(request: &'r Request<'_>) -> &'r RequestScope {
    request.local_cache(|| {
        RequestScope(
            request
                .rocket()
                .state::<Binding>()
                .map(|binding| binding.scope()),
        )
    })
}

/// Handler access to the request's database scope.
///
/// Dereferences to [`Scope`], so handlers call straight through:
///
/// ```rust,no_run
/// use docket::Db;
/// use rocket::get;
///
/// #[get("/name")]
/// async fn database_name(db: Db<'_>) -> Result<String, docket::Error> {
///     Ok(db.database().await?.name().to_string())
/// }
/// ```
pub struct Db<'r>(&'r Scope);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Db<'r> {
    type Error = Error;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match request_scope(request).get() {
            Some(scope) => Outcome::Success(Db(scope)),
            None => Outcome::Error((Status::InternalServerError, Error::Unbound)),
        }
    }
}

impl std::ops::Deref for Db<'_> {
    type Target = Scope;

    fn deref(&self) -> &Self::Target {
        self.0
    }
}
