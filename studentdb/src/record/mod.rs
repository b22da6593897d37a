// Student records and the ordered collection they are persisted in

use crate::error::{Result, StudentDbError};
use crate::schema::{Department, Gender};
use serde::{Deserialize, Serialize};

/// The persisted fields of a student. Derived values are not stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentData {
    pub name: String,
    pub age: i64,
    pub gender: Gender,
    pub department: Department,
    pub email: String,
    pub password: String,
    pub height: f64,
    pub weight: f64,
}

impl StudentData {
    /// Body mass index, `weight / height²`, rounded to 2 decimal places
    pub fn bmi(&self) -> f64 {
        round2(self.weight / (self.height * self.height))
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A stored student keyed by its id
#[derive(Debug, Clone, PartialEq)]
pub struct StudentRecord {
    pub id: String,
    pub data: StudentData,
}

/// Read-side projection of a record, with derived fields computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentView {
    pub id: String,
    pub name: String,
    pub age: i64,
    pub gender: Gender,
    pub department: Department,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub height: f64,
    pub weight: f64,
    pub bmi: f64,
}

impl From<&StudentRecord> for StudentView {
    fn from(record: &StudentRecord) -> Self {
        let data = &record.data;
        StudentView {
            id: record.id.clone(),
            name: data.name.clone(),
            age: data.age,
            gender: data.gender,
            department: data.department,
            email: data.email.clone(),
            password: data.password.clone(),
            confirm_password: data.password.clone(),
            height: data.height,
            weight: data.weight,
            bmi: data.bmi(),
        }
    }
}

/// All records, in insertion order. Ids are unique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    records: Vec<StudentRecord>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StudentRecord> {
        self.records.iter()
    }

    pub fn get(&self, id: &str) -> Option<&StudentRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Append a new record. Fails with `Conflict` if the id is taken.
    pub fn insert(&mut self, id: &str, data: StudentData) -> Result<()> {
        if self.contains(id) {
            return Err(StudentDbError::Conflict { id: id.to_string() });
        }
        self.records.push(StudentRecord {
            id: id.to_string(),
            data,
        });
        Ok(())
    }

    /// Replace the data of an existing record in place, keeping its position.
    pub fn replace(&mut self, id: &str, data: StudentData) -> Result<()> {
        let record = self
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StudentDbError::NotFound { id: id.to_string() })?;
        record.data = data;
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Result<StudentRecord> {
        let pos = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| StudentDbError::NotFound { id: id.to_string() })?;
        Ok(self.records.remove(pos))
    }

    /// The collection as an id-keyed object of views, in collection order.
    pub fn views_by_id(&self) -> Result<serde_json::Map<String, serde_json::Value>> {
        let mut map = serde_json::Map::with_capacity(self.records.len());
        for record in &self.records {
            map.insert(
                record.id.clone(),
                serde_json::to_value(StudentView::from(record))?,
            );
        }
        Ok(map)
    }

    /// Build a collection from a persisted document: an object of id → fields.
    /// Extra keys inside a record (e.g. legacy `bmi`) are ignored.
    pub fn from_json(document: serde_json::Value) -> Result<Self> {
        let map = match document {
            serde_json::Value::Object(map) => map,
            other => {
                return Err(StudentDbError::Storage(format!(
                    "document root must be an object, got {}",
                    type_name(&other)
                )))
            }
        };

        let mut records = Vec::with_capacity(map.len());
        for (id, value) in map {
            let data: StudentData = serde_json::from_value(value)
                .map_err(|e| StudentDbError::Storage(format!("record '{id}': {e}")))?;
            records.push(StudentRecord { id, data });
        }

        Ok(Collection { records })
    }

    pub fn to_json(&self) -> Result<serde_json::Value> {
        let mut map = serde_json::Map::with_capacity(self.records.len());
        for record in &self.records {
            map.insert(record.id.clone(), serde_json::to_value(&record.data)?);
        }
        Ok(serde_json::Value::Object(map))
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a StudentRecord;
    type IntoIter = std::slice::Iter<'a, StudentRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

pub(crate) fn type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "list",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    pub(crate) fn sample_data(name: &str, age: i64, department: Department) -> StudentData {
        StudentData {
            name: name.to_string(),
            age,
            gender: Gender::Female,
            department,
            email: format!("{}@student.com", name.to_lowercase()),
            password: "abcdefgh".into(),
            height: 1.8,
            weight: 75.0,
        }
    }

    #[test]
    fn test_bmi_rounds_to_two_places() {
        let data = sample_data("Dana", 20, Department::Mathematics);
        assert_eq!(data.bmi(), 23.15);
    }

    #[test]
    fn test_view_derives_confirm_password() {
        let record = StudentRecord {
            id: "S1".into(),
            data: sample_data("Dana", 20, Department::Physics),
        };
        let view = StudentView::from(&record);
        assert_eq!(view.confirm_password, view.password);
        assert_eq!(view.bmi, 23.15);
    }

    #[test]
    fn test_insert_conflict() {
        let mut col = Collection::new();
        col.insert("S1", sample_data("Alice", 20, Department::Physics)).unwrap();
        let err = col
            .insert("S1", sample_data("Bob", 21, Department::Physics))
            .unwrap_err();
        assert!(matches!(err, StudentDbError::Conflict { .. }));
        assert_eq!(col.len(), 1);
        assert_eq!(col.get("S1").unwrap().data.name, "Alice");
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut col = Collection::new();
        col.insert("a", sample_data("Alice", 20, Department::Physics)).unwrap();
        col.insert("b", sample_data("Bobby", 21, Department::Physics)).unwrap();
        col.replace("a", sample_data("Alicia", 22, Department::Physics)).unwrap();

        let ids: Vec<&str> = col.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(col.get("a").unwrap().data.name, "Alicia");
    }

    #[test]
    fn test_remove_missing() {
        let mut col = Collection::new();
        assert!(matches!(
            col.remove("nope"),
            Err(StudentDbError::NotFound { .. })
        ));
    }

    #[test]
    fn test_json_preserves_order_and_drops_derived_fields() {
        let doc = serde_json::json!({
            "zed": {
                "name": "Zed", "age": 30, "gender": "male", "department": "Physics",
                "email": "zed@gmail.com", "password": "password1",
                "height": 1.7, "weight": 70.0, "bmi": 24.22, "confirm_password": "password1"
            },
            "amy": {
                "name": "Amy", "age": 19, "gender": "female", "department": "Mathematics",
                "email": "amy@student.com", "password": "password2",
                "height": 1.6, "weight": 55.0
            }
        });

        let col = Collection::from_json(doc).unwrap();
        let ids: Vec<&str> = col.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["zed", "amy"]);

        let out = col.to_json().unwrap();
        assert!(out["zed"].get("bmi").is_none());
        assert!(out["zed"].get("confirm_password").is_none());
        assert_eq!(Collection::from_json(out).unwrap(), col);
    }

    #[test]
    fn test_views_by_id_keeps_order_and_derived_fields() {
        let mut col = Collection::new();
        col.insert("b", sample_data("Bobby", 21, Department::Physics)).unwrap();
        col.insert("a", sample_data("Alice", 20, Department::Physics)).unwrap();

        let map = col.views_by_id().unwrap();
        let ids: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(map["a"]["bmi"], serde_json::json!(23.15));
        assert_eq!(map["a"]["confirm_password"], serde_json::json!("abcdefgh"));
        assert!(Collection::new().views_by_id().unwrap().is_empty());
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        let err = Collection::from_json(serde_json::json!([1, 2])).unwrap_err();
        assert!(matches!(err, StudentDbError::Storage(_)));
    }

    #[test]
    fn test_from_json_rejects_malformed_record() {
        let doc = serde_json::json!({ "x": { "name": "No fields" } });
        let err = Collection::from_json(doc).unwrap_err();
        assert!(err.to_string().contains("record 'x'"));
    }
}
