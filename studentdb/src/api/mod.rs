use crate::error::{Result, StudentDbError};
use crate::query;
use crate::record::StudentView;
use crate::store::RecordStore;
use crate::validation::{self, ValidationIssue};

/// CRUD and sort operations over the student collection.
///
/// Every call loads the full collection, acts on it in memory, and writes
/// it back for mutations. Validation runs before anything is changed, so a
/// failed call never touches the store.
pub struct RecordService {
    store: Box<dyn RecordStore + Send + Sync>,
}

impl RecordService {
    pub fn new(store: impl RecordStore + Send + Sync + 'static) -> Self {
        RecordService {
            store: Box::new(store),
        }
    }

    /// The whole collection as an object of id → student, in collection order.
    pub fn list(&self) -> Result<serde_json::Map<String, serde_json::Value>> {
        self.store.load()?.views_by_id()
    }

    pub fn get(&self, id: &str) -> Result<StudentView> {
        let collection = self.store.load()?;
        collection
            .get(id)
            .map(StudentView::from)
            .ok_or_else(|| StudentDbError::NotFound { id: id.to_string() })
    }

    /// Insert a new student. The payload must carry its own `id`.
    pub fn create(&self, payload: &serde_json::Value) -> Result<()> {
        let data = validation::validate(payload)?;
        let id = match payload.get("id") {
            Some(serde_json::Value::String(id)) if !id.trim().is_empty() => id.clone(),
            Some(serde_json::Value::String(_)) => {
                return Err(StudentDbError::schema("id", "must not be empty"))
            }
            Some(_) => return Err(StudentDbError::schema("id", "expected string")),
            None => return Err(StudentDbError::schema("id", "is required")),
        };

        let mut collection = self.store.load()?;
        collection.insert(&id, data)?;
        self.store.save(&collection)?;
        log::info!("Created student '{id}'");
        Ok(())
    }

    /// Replace a student wholesale. The `id` argument is authoritative;
    /// any `id` inside the payload is ignored.
    pub fn update(&self, id: &str, payload: &serde_json::Value) -> Result<()> {
        let data = validation::validate(payload)?;
        let mut collection = self.store.load()?;
        collection.replace(id, data)?;
        self.store.save(&collection)?;
        log::info!("Updated student '{id}'");
        Ok(())
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        let mut collection = self.store.load()?;
        collection.remove(id)?;
        self.store.save(&collection)?;
        log::info!("Deleted student '{id}'");
        Ok(())
    }

    /// Students ordered by `field` (name, age, department) in `direction` (asc, desc).
    pub fn sort(&self, field: &str, direction: &str) -> Result<Vec<StudentView>> {
        let collection = self.store.load()?;
        let sorted = query::sort(&collection, field, direction)?;
        Ok(sorted.iter().map(StudentView::from).collect())
    }

    pub fn count(&self) -> Result<usize> {
        Ok(self.store.load()?.len())
    }

    /// Stored records that fail the current validation rules.
    pub fn validate_all(&self) -> Result<Vec<ValidationIssue>> {
        Ok(validation::validate_collection(&self.store.load()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Collection;
    use crate::store::{JsonFileStore, MemoryStore};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;

    /// Lets a test keep a handle on the store it gave to the service.
    struct Shared(Arc<MemoryStore>);

    impl RecordStore for Shared {
        fn load(&self) -> Result<Collection> {
            self.0.load()
        }
        fn save(&self, collection: &Collection) -> Result<()> {
            self.0.save(collection)
        }
    }

    fn setup() -> (Arc<MemoryStore>, RecordService) {
        let store = Arc::new(MemoryStore::new());
        let service = RecordService::new(Shared(store.clone()));
        (store, service)
    }

    fn payload(id: &str, name: &str, age: i64) -> serde_json::Value {
        json!({
            "id": id,
            "name": name,
            "age": age,
            "gender": "female",
            "department": "physics",
            "email": format!("{}@gmail.com", name.to_lowercase()),
            "password": "secret-pass",
            "height": 1.65,
            "weight": 60.0
        })
    }

    fn dana() -> serde_json::Value {
        json!({
            "id": "S010",
            "name": "Dana",
            "age": 20,
            "gender": "male",
            "department": "Mathematics",
            "email": "dana@student.com",
            "password": "abcdefgh",
            "height": 1.8,
            "weight": 75
        })
    }

    #[test]
    fn test_create_and_get() {
        let (_store, service) = setup();
        service.create(&dana()).unwrap();

        let view = service.get("S010").unwrap();
        assert_eq!(view.name, "Dana");
        assert_eq!(view.bmi, 23.15);
        assert_eq!(view.confirm_password, "abcdefgh");
    }

    #[test]
    fn test_create_conflict_leaves_store_unchanged() {
        let (store, service) = setup();
        service.create(&payload("S1", "Alice", 20)).unwrap();
        let before = store.document();

        let err = service.create(&payload("S1", "Bobby", 30)).unwrap_err();
        assert!(matches!(err, StudentDbError::Conflict { .. }));
        assert_eq!(store.document(), before);
    }

    #[test]
    fn test_create_requires_id() {
        let (store, service) = setup();
        let mut body = dana();
        body.as_object_mut().unwrap().remove("id");
        let err = service.create(&body).unwrap_err();
        assert!(matches!(err, StudentDbError::Schema { ref field, .. } if field == "id"));

        body["id"] = json!(42);
        assert!(service.create(&body).is_err());
        body["id"] = json!("  ");
        assert!(service.create(&body).is_err());
        assert_eq!(store.document().as_deref(), Some("{}"));
    }

    #[test]
    fn test_invalid_payload_never_saves() {
        let (store, service) = setup();
        let mut body = dana();
        body["email"] = json!("x@yahoo.com");
        let err = service.create(&body).unwrap_err();
        assert!(matches!(err, StudentDbError::Domain { .. }));
        assert_eq!(store.document().as_deref(), Some("{}"));
    }

    #[test]
    fn test_get_missing() {
        let (_store, service) = setup();
        assert!(matches!(
            service.get("ghost"),
            Err(StudentDbError::NotFound { .. })
        ));
    }

    #[test]
    fn test_update_replaces_and_ignores_payload_id() {
        let (_store, service) = setup();
        service.create(&payload("S1", "Alice", 20)).unwrap();
        service.create(&payload("S2", "Bobby", 21)).unwrap();

        service.update("S1", &payload("OTHER", "Alicia", 25)).unwrap();

        let list = service.list().unwrap();
        let ids: Vec<&str> = list.keys().map(String::as_str).collect();
        assert_eq!(ids, vec!["S1", "S2"]);
        assert_eq!(list["S1"]["name"], json!("Alicia"));
        assert_eq!(list["S1"]["age"], json!(25));
        assert!(service.get("OTHER").is_err());
    }

    #[test]
    fn test_update_missing_leaves_store_unchanged() {
        let (store, service) = setup();
        service.create(&payload("S1", "Alice", 20)).unwrap();
        let before = store.document();

        let err = service.update("ghost", &payload("ghost", "Ghost", 30)).unwrap_err();
        assert!(matches!(err, StudentDbError::NotFound { .. }));
        assert_eq!(store.document(), before);
    }

    #[test]
    fn test_update_validates_before_lookup() {
        let (_store, service) = setup();
        let mut body = payload("x", "Ghost", 30);
        body["age"] = json!(5);
        assert!(matches!(
            service.update("ghost", &body),
            Err(StudentDbError::Schema { .. })
        ));
    }

    #[test]
    fn test_delete() {
        let (store, service) = setup();
        service.create(&payload("S1", "Alice", 20)).unwrap();
        service.delete("S1").unwrap();
        assert_eq!(service.count().unwrap(), 0);

        let before = store.document();
        assert!(matches!(
            service.delete("S1"),
            Err(StudentDbError::NotFound { .. })
        ));
        assert_eq!(store.document(), before);
    }

    #[test]
    fn test_sort_through_service() {
        let (_store, service) = setup();
        service.create(&payload("a", "Carol", 30)).unwrap();
        service.create(&payload("b", "Alice", 20)).unwrap();

        let sorted = service.sort("age", "asc").unwrap();
        assert_eq!(sorted[0].id, "b");
        assert!(matches!(
            service.sort("invalid", "asc"),
            Err(StudentDbError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_corrupt_document_is_storage_error() {
        let service = RecordService::new(MemoryStore::with_document("not json"));
        assert_eq!(service.list().unwrap_err().kind(), "StorageError");
        assert_eq!(service.create(&dana()).unwrap_err().kind(), "StorageError");
    }

    #[test]
    fn test_file_backed_service() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("students.json");
        let store = JsonFileStore::new(&path);
        store.create_if_missing().unwrap();

        let service = RecordService::new(store);
        service.create(&dana()).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["S010"]["name"], json!("Dana"));
        assert!(raw["S010"].get("bmi").is_none());
        assert!(raw["S010"].get("id").is_none());

        let reopened = RecordService::new(JsonFileStore::new(&path));
        assert_eq!(reopened.get("S010").unwrap().bmi, 23.15);
    }
}
