// Ordering of the collection by a requested field

use crate::error::{Result, StudentDbError};
use crate::record::{Collection, StudentRecord};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Fields a collection can be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    Age,
    Department,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortField {
    type Err = StudentDbError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "name" => Ok(SortField::Name),
            "age" => Ok(SortField::Age),
            "department" => Ok(SortField::Department),
            _ => Err(StudentDbError::InvalidArgument {
                name: "sort_by".into(),
                value: format!("'{s}', expected one of: name, age, department"),
            }),
        }
    }
}

impl FromStr for SortOrder {
    type Err = StudentDbError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(StudentDbError::InvalidArgument {
                name: "order".into(),
                value: format!("'{s}', expected asc or desc"),
            }),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortField::Name => "name",
            SortField::Age => "age",
            SortField::Department => "department",
        })
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        })
    }
}

/// Sort the collection by `field` in `direction`.
///
/// The field name is checked before the direction. The sort is stable in
/// both directions: records with equal keys keep collection order.
pub fn sort(collection: &Collection, field: &str, direction: &str) -> Result<Vec<StudentRecord>> {
    let field: SortField = field.parse()?;
    let order: SortOrder = direction.parse()?;
    Ok(sort_by(collection, field, order))
}

/// Typed variant of [`sort`] for callers that already parsed their arguments.
pub fn sort_by(collection: &Collection, field: SortField, order: SortOrder) -> Vec<StudentRecord> {
    let mut records: Vec<StudentRecord> = collection.iter().cloned().collect();
    records.sort_by(|a, b| {
        let ordering = compare(a, b, field);
        match order {
            SortOrder::Asc => ordering,
            // Reversing the comparator (not the output) keeps ties in place
            SortOrder::Desc => ordering.reverse(),
        }
    });
    records
}

fn compare(a: &StudentRecord, b: &StudentRecord, field: SortField) -> Ordering {
    match field {
        SortField::Name => a.data.name.cmp(&b.data.name),
        SortField::Age => a.data.age.cmp(&b.data.age),
        SortField::Department => a.data.department.as_str().cmp(b.data.department.as_str()),
    }
}
