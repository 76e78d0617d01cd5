use mongodb::bson::{Bson, Document, doc, oid::ObjectId};
use mongodb::{Collection, Cursor};

use crate::documents::DocumentSpec;
use crate::errors::Error;

/// A registered descriptor bound to a live collection.
///
/// Obtained from [`Scope::documents`](crate::Scope::documents). Wraps the
/// underlying collection with the descriptor's save-time semantics and
/// lookup helpers that raise [`Error::NotFound`] instead of returning
/// nothing.
pub struct DocumentCollection {
    spec: &'static DocumentSpec,
    collection: Collection<Document>,
}

impl DocumentCollection {
    pub(crate) fn new(spec: &'static DocumentSpec, collection: Collection<Document>) -> Self {
        Self { spec, collection }
    }

    pub fn spec(&self) -> &'static DocumentSpec {
        self.spec
    }

    /// The underlying driver collection, for operations not covered here.
    pub fn collection(&self) -> &Collection<Document> {
        &self.collection
    }

    /// Inserts a document after filling the descriptor's defaults for absent
    /// fields and checking required fields. Returns the inserted id.
    pub async fn save(&self, mut document: Document) -> Result<Bson, Error> {
        if let Some(defaults) = self.spec.defaults {
            for (field, value) in defaults() {
                if !document.contains_key(&field) {
                    document.insert(field, value);
                }
            }
        }

        for &field in self.spec.required_fields {
            if !document.contains_key(field) {
                return Err(Error::MissingField(field));
            }
        }

        let result = self.collection.insert_one(document, None).await?;
        Ok(result.inserted_id)
    }

    /// Looks a document up by id, raising [`Error::NotFound`] on a miss.
    pub async fn get_or_404(&self, id: ObjectId) -> Result<Document, Error> {
        self.collection
            .find_one(doc! { "_id": id }, None)
            .await?
            .ok_or(Error::NotFound)
    }

    /// Like [`find_one`](Self::find_one), but raising [`Error::NotFound`]
    /// when nothing matches.
    pub async fn find_one_or_404(&self, filter: Document) -> Result<Document, Error> {
        self.collection
            .find_one(filter, None)
            .await?
            .ok_or(Error::NotFound)
    }

    pub async fn find_one(&self, filter: Document) -> Result<Option<Document>, Error> {
        Ok(self.collection.find_one(filter, None).await?)
    }

    pub async fn find(&self, filter: Document) -> Result<Cursor<Document>, Error> {
        Ok(self.collection.find(filter, None).await?)
    }
}
