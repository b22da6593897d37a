use actix_web::{error, web, HttpRequest, HttpResponse};
use serde::Deserialize;
use std::sync::MutexGuard;
use studentdb::{RecordService, StudentDbError};

use crate::AppState;

/// Configure all API routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/status", web::get().to(status))
        // Students
        .route("/student/view", web::get().to(list_students))
        .route("/student/view/", web::get().to(list_students))
        .route("/student/view/{id}", web::get().to(get_student))
        .route("/student/sort", web::get().to(sort_students))
        .route("/student/sort/", web::get().to(sort_students))
        .route("/student/add", web::post().to(create_student))
        .route("/update/{id}", web::put().to(update_student))
        .route("/delete/{id}", web::delete().to(delete_student));
}

/// Reject unparseable JSON bodies with the same error shape as everything else
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req: &HttpRequest| {
        let response = HttpResponse::BadRequest().json(serde_json::json!({
            "error": err.to_string(),
            "kind": "InvalidBody",
        }));
        error::InternalError::from_response(err, response).into()
    })
}

// ── Helpers ─────────────────────────────────────────────────────────

fn service(state: &AppState) -> MutexGuard<'_, RecordService> {
    state
        .service
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Run a service call on the blocking thread pool; file I/O stays off the workers.
async fn with_service<T, F>(state: web::Data<AppState>, op: F) -> studentdb::Result<T>
where
    F: FnOnce(&RecordService) -> studentdb::Result<T> + Send + 'static,
    T: Send + 'static,
{
    web::block(move || op(&service(&state)))
        .await
        .unwrap_or_else(|e| Err(StudentDbError::Storage(format!("blocking task failed: {e}"))))
}

fn ok_json(value: impl serde::Serialize) -> HttpResponse {
    HttpResponse::Ok().json(value)
}

fn message(text: &str, id: &str) -> serde_json::Value {
    serde_json::json!({ "message": text, "id": id })
}

fn err_response(e: StudentDbError) -> HttpResponse {
    let mut body = serde_json::json!({
        "error": e.to_string(),
        "kind": e.kind(),
    });
    match &e {
        StudentDbError::Schema { field, .. } => {
            body["field"] = field.clone().into();
            HttpResponse::UnprocessableEntity().json(body)
        }
        StudentDbError::Domain { .. } => {
            body["field"] = "email".into();
            HttpResponse::UnprocessableEntity().json(body)
        }
        StudentDbError::InvalidArgument { name, .. } => {
            body["field"] = name.clone().into();
            HttpResponse::BadRequest().json(body)
        }
        StudentDbError::NotFound { id } => {
            body["id"] = id.clone().into();
            HttpResponse::NotFound().json(body)
        }
        StudentDbError::Conflict { id } => {
            body["id"] = id.clone().into();
            HttpResponse::Conflict().json(body)
        }
        StudentDbError::Storage(_) | StudentDbError::Io(_) | StudentDbError::Json(_) => {
            log::error!("Storage failure: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error",
                "kind": e.kind(),
            }))
        }
    }
}

// ── Status ──────────────────────────────────────────────────────────

async fn status(state: web::Data<AppState>) -> HttpResponse {
    let data_file = state.data_file.display().to_string();
    let result = with_service(state, |service| {
        let count = service.count()?;
        Ok((count, service.validate_all()?))
    })
    .await;
    match result {
        Ok((records, issues)) => ok_json(serde_json::json!({
            "records": records,
            "issues": issues,
            "data_file": data_file,
        })),
        Err(e) => err_response(e),
    }
}

// ── Students ────────────────────────────────────────────────────────

async fn list_students(state: web::Data<AppState>) -> HttpResponse {
    match with_service(state, |service| service.list()).await {
        Ok(students) => ok_json(students),
        Err(e) => err_response(e),
    }
}

async fn get_student(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let id = path.into_inner();
    match with_service(state, move |service| service.get(&id)).await {
        Ok(student) => ok_json(student),
        Err(e) => err_response(e),
    }
}

#[derive(Deserialize)]
struct SortQuery {
    sort_by: Option<String>,
    #[serde(default = "default_order")]
    order: String,
}

fn default_order() -> String {
    "asc".to_string()
}

async fn sort_students(
    state: web::Data<AppState>,
    query: web::Query<SortQuery>,
) -> HttpResponse {
    let SortQuery { sort_by, order } = query.into_inner();
    let Some(sort_by) = sort_by else {
        return err_response(StudentDbError::InvalidArgument {
            name: "sort_by".into(),
            value: "is required, expected one of: name, age, department".into(),
        });
    };
    match with_service(state, move |service| service.sort(&sort_by, &order)).await {
        Ok(students) => ok_json(students),
        Err(e) => err_response(e),
    }
}

async fn create_student(
    state: web::Data<AppState>,
    body: web::Json<serde_json::Value>,
) -> HttpResponse {
    let body = body.into_inner();
    let result = with_service(state, move |service| {
        service.create(&body)?;
        Ok(body["id"].as_str().unwrap_or_default().to_string())
    })
    .await;
    match result {
        Ok(id) => HttpResponse::Created().json(message("Student created successfully", &id)),
        Err(e) => err_response(e),
    }
}

async fn update_student(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<serde_json::Value>,
) -> HttpResponse {
    let id = path.into_inner();
    let body = body.into_inner();
    let target = id.clone();
    match with_service(state, move |service| service.update(&target, &body)).await {
        Ok(()) => ok_json(message("Student updated successfully", &id)),
        Err(e) => err_response(e),
    }
}

async fn delete_student(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let id = path.into_inner();
    let target = id.clone();
    match with_service(state, move |service| service.delete(&target)).await {
        Ok(()) => ok_json(message("Student deleted successfully", &id)),
        Err(e) => err_response(e),
    }
}
