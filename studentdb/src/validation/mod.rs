use crate::error::{Result, StudentDbError};
use crate::record::{type_name, Collection, StudentData};
use crate::schema::{
    Department, Gender, AGE_RANGE, ALLOWED_EMAIL_DOMAINS, NAME_LENGTH, PASSWORD_LENGTH,
};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_%+\-]+(?:\.[A-Za-z0-9_%+\-]+)*@[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?)+$")
            .expect("email pattern is valid")
    })
}

/// Validate an incoming student payload and normalize it.
///
/// Checks run in a fixed order and the first failure is returned:
/// presence, type and range of every field, then enum membership,
/// then email syntax, then the email domain allow-list.
/// Keys not part of the record (including `id`) are ignored.
pub fn validate(payload: &serde_json::Value) -> Result<StudentData> {
    let fields = payload
        .as_object()
        .ok_or_else(|| {
            StudentDbError::schema(
                "payload",
                format!("expected object, got {}", type_name(payload)),
            )
        })?;
    let get = |name: &str| fields.get(name).filter(|v| !v.is_null());

    let name = require_string(get("name"), "name")?;
    check_length(name, "name", &NAME_LENGTH)?;

    let age = match get("age") {
        None => return Err(missing("age")),
        Some(v) => v.as_i64().ok_or_else(|| {
            StudentDbError::schema("age", format!("expected integer, got {v}"))
        })?,
    };
    if !AGE_RANGE.contains(&age) {
        return Err(StudentDbError::schema(
            "age",
            format!("must be greater than 17 and less than 100, got {age}"),
        ));
    }

    let gender = require_string(get("gender"), "gender")?;
    let department = require_string(get("department"), "department")?;
    let email = require_string(get("email"), "email")?;

    let password = require_string(get("password"), "password")?;
    check_length(password, "password", &PASSWORD_LENGTH)?;

    let height = require_positive(get("height"), "height")?;
    let weight = require_positive(get("weight"), "weight")?;

    let gender: Gender = gender
        .parse()
        .map_err(|e: String| StudentDbError::schema("gender", e))?;
    let department: Department = department
        .parse()
        .map_err(|e: String| StudentDbError::schema("department", e))?;

    if !email_regex().is_match(email) {
        return Err(StudentDbError::schema(
            "email",
            format!("'{email}' is not a valid email address"),
        ));
    }
    check_email_domain(email)?;

    Ok(StudentData {
        name: name.to_string(),
        age,
        gender,
        department,
        email: email.to_string(),
        password: password.to_string(),
        height,
        weight,
    })
}

/// Reject emails whose domain is outside the allow-list.
pub fn check_email_domain(email: &str) -> Result<()> {
    let domain = email.rsplit_once('@').map(|(_, d)| d).unwrap_or_default();
    if ALLOWED_EMAIL_DOMAINS.contains(&domain) {
        Ok(())
    } else {
        Err(StudentDbError::Domain {
            domain: domain.to_string(),
        })
    }
}

fn missing(field: &str) -> StudentDbError {
    StudentDbError::schema(field, "is required")
}

fn require_string<'v>(value: Option<&'v serde_json::Value>, field: &str) -> Result<&'v str> {
    match value {
        None => Err(missing(field)),
        Some(v) => v.as_str().ok_or_else(|| {
            StudentDbError::schema(field, format!("expected string, got {}", type_name(v)))
        }),
    }
}

fn require_positive(value: Option<&serde_json::Value>, field: &str) -> Result<f64> {
    let v = value.ok_or_else(|| missing(field))?;
    let n = v.as_f64().ok_or_else(|| {
        StudentDbError::schema(field, format!("expected number, got {}", type_name(v)))
    })?;
    if !n.is_finite() || n <= 0.0 {
        return Err(StudentDbError::schema(
            field,
            format!("must be greater than 0, got {n}"),
        ));
    }
    Ok(n)
}

fn check_length(
    value: &str,
    field: &str,
    bounds: &std::ops::RangeInclusive<usize>,
) -> Result<()> {
    let len = value.chars().count();
    if bounds.contains(&len) {
        Ok(())
    } else {
        Err(StudentDbError::schema(
            field,
            format!(
                "length must be between {} and {} characters, got {len}",
                bounds.start(),
                bounds.end()
            ),
        ))
    }
}

/// A stored record that no longer passes validation
#[derive(Debug, Clone, Serialize)]
pub struct ValidationIssue {
    pub id: String,
    pub kind: &'static str,
    pub error: String,
}

/// Re-run validation over every stored record.
///
/// Records are deserialized through the typed model on load, so this mostly
/// catches hand-edited documents (out-of-range ages, foreign email domains).
pub fn validate_collection(collection: &Collection) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for record in collection {
        let result = serde_json::to_value(&record.data)
            .map_err(StudentDbError::from)
            .and_then(|value| validate(&value));
        if let Err(e) = result {
            log::warn!("Stored student '{}' fails validation: {e}", record.id);
            issues.push(ValidationIssue {
                id: record.id.clone(),
                kind: e.kind(),
                error: e.to_string(),
            });
        }
    }
    issues
}
