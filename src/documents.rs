//! Document descriptors and the registry they live in.

use std::sync::{Arc, RwLock};

use mongodb::bson::Document;

use crate::config::MongoConfig;
use crate::fairing::DocketFairing;
use crate::scope::Binding;

/// Schema descriptor for one mapped document type.
///
/// Descriptors are declared as `static` items and registered with a
/// [`Docket`] before any connection exists; when a request scope connects,
/// the set registered at that moment is attached to it and becomes reachable
/// through [`Scope::documents`](crate::Scope::documents).
///
/// # Example
///
/// ```rust
/// use docket::DocumentSpec;
/// use docket::mongodb::bson::{Document, doc};
///
/// fn task_defaults() -> Document {
///     doc! { "done": false }
/// }
///
/// static TASK: DocumentSpec = DocumentSpec {
///     name: "Task",
///     collection: "tasks",
///     required_fields: &["title"],
///     defaults: Some(task_defaults),
/// };
/// ```
#[derive(Debug)]
pub struct DocumentSpec {
    /// Name the descriptor is looked up by.
    pub name: &'static str,
    /// Collection the documents live in.
    pub collection: &'static str,
    /// Fields that must be present when saving.
    pub required_fields: &'static [&'static str],
    /// Produces values merged into saved documents that lack them; called
    /// once per save, so computed values stay fresh.
    pub defaults: Option<fn() -> Document>,
}

/// The document manager bound to one or more Rocket applications.
///
/// Holds the descriptor registry and hands out [`Binding`]s and the fairing.
/// Clones are cheap and share the registry.
#[derive(Clone, Default)]
pub struct Docket {
    registry: Arc<RwLock<Vec<&'static DocumentSpec>>>,
}

impl Docket {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a single descriptor, returning it unchanged so the call
    /// chains at a declaration site. Registering the same `static` twice is
    /// a no-op; the registry keeps first-occurrence order.
    pub fn register_one(&self, spec: &'static DocumentSpec) -> &'static DocumentSpec {
        if let Ok(mut registry) = self.registry.write() {
            if !registry.iter().any(|known| std::ptr::eq(*known, spec)) {
                registry.push(spec);
            }
        }
        spec
    }

    /// Registers a batch of descriptors and returns the updated registry.
    pub fn register_many(&self, specs: &[&'static DocumentSpec]) -> Vec<&'static DocumentSpec> {
        for spec in specs {
            self.register_one(spec);
        }
        self.registered()
    }

    /// Snapshot of the registry in registration order.
    pub fn registered(&self) -> Vec<&'static DocumentSpec> {
        self.registry
            .read()
            .map(|registry| registry.clone())
            .unwrap_or_default()
    }

    /// Associates a configuration with this manager, yielding the binding
    /// request scopes are created from.
    pub fn bind(&self, config: MongoConfig) -> Binding {
        Binding::new(self.clone(), config)
    }

    /// The Rocket fairing wiring this manager into an application, with
    /// settings read from the application's figment.
    pub fn fairing(&self) -> DocketFairing {
        DocketFairing::new(self.clone(), None)
    }

    /// Like [`fairing`](Self::fairing), but with explicit settings instead
    /// of the figment.
    pub fn fairing_with(&self, config: MongoConfig) -> DocketFairing {
        DocketFairing::new(self.clone(), Some(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    static FIRST: DocumentSpec = DocumentSpec {
        name: "First",
        collection: "first",
        required_fields: &[],
        defaults: None,
    };

    static SECOND: DocumentSpec = DocumentSpec {
        name: "Second",
        collection: "second",
        required_fields: &["title"],
        defaults: Some(second_defaults),
    };

    fn second_defaults() -> Document {
        doc! { "rank": 0 }
    }

    #[test]
    fn register_one_returns_its_input() {
        let docket = Docket::new();
        let spec = docket.register_one(&FIRST);
        assert!(std::ptr::eq(spec, &FIRST));
        assert_eq!(docket.registered().len(), 1);
    }

    #[test]
    fn duplicate_registration_is_suppressed() {
        let docket = Docket::new();
        docket.register_one(&FIRST);
        docket.register_one(&FIRST);
        docket.register_many(&[&FIRST, &SECOND, &FIRST]);

        let registered = docket.registered();
        assert_eq!(registered.len(), 2);
        assert!(std::ptr::eq(registered[0], &FIRST));
        assert!(std::ptr::eq(registered[1], &SECOND));
    }

    #[test]
    fn register_many_returns_the_updated_registry() {
        let docket = Docket::new();
        let registered = docket.register_many(&[&SECOND, &FIRST]);
        assert_eq!(registered.len(), 2);
        assert!(std::ptr::eq(registered[0], &SECOND));
        assert!(std::ptr::eq(registered[1], &FIRST));
    }

    #[test]
    fn clones_share_the_registry() {
        let docket = Docket::new();
        let clone = docket.clone();
        clone.register_one(&FIRST);
        assert_eq!(docket.registered().len(), 1);
    }
}
