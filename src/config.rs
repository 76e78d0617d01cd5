//! # Connection configuration
//!
//! Settings are read from the application's figment under the `mongodb` key,
//! so they can come from `Rocket.toml`, `ROCKET_MONGODB_*` environment
//! variables, or a custom figment in tests:
//!
//! ```toml
//! [default.mongodb]
//! host = "db.internal"
//! port = 27017
//! database = "todo"
//! ```
//!
//! Every field has a default, and a missing `mongodb` table is equivalent to
//! an empty one.

use mongodb::options::{
    ClientOptions, Credential, ReadPreference, SelectionCriteria, ServerAddress,
};
use rocket::figment::Figment;
use serde::Deserialize;

/// Connection settings for one bound application.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MongoConfig {
    /// Server hostname or IP address.
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Database selected for this binding; also the authentication source
    /// when credentials are set.
    #[serde(default = "default_database")]
    pub database: String,
    /// Allow reads from secondary replica-set members.
    #[serde(default)]
    pub secondary_reads: bool,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    27017
}

fn default_database() -> String {
    "docket".to_string()
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database: default_database(),
            secondary_reads: false,
            username: None,
            password: None,
        }
    }
}

impl MongoConfig {
    /// Figment key the settings live under.
    pub const KEY: &'static str = "mongodb";

    /// Extracts the settings from a figment, falling back to defaults when
    /// the `mongodb` table is absent entirely.
    pub fn from_figment(figment: &Figment) -> Result<Self, rocket::figment::Error> {
        if figment.find_value(Self::KEY).is_ok() {
            figment.extract_inner(Self::KEY)
        } else {
            Ok(Self::default())
        }
    }

    /// Whether this binding authenticates at connection time.
    pub fn has_credentials(&self) -> bool {
        self.username.is_some()
    }

    /// Driver options for this configuration.
    pub fn client_options(&self) -> ClientOptions {
        let mut options = ClientOptions::default();
        options.hosts = vec![ServerAddress::Tcp {
            host: self.host.clone(),
            port: Some(self.port),
        }];

        if self.secondary_reads {
            options.selection_criteria = Some(SelectionCriteria::ReadPreference(
                ReadPreference::SecondaryPreferred {
                    options: Default::default(),
                },
            ));
        }

        if let Some(username) = &self.username {
            let mut credential = Credential::default();
            credential.username = Some(username.clone());
            credential.password = self.password.clone();
            credential.source = Some(self.database.clone());
            options.credential = Some(credential);
        }

        options
    }
}
