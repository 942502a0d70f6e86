use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use chrono::Utc;
use database::{consts::consts::EntityId, database::database::Database};
use serde_json::json;

use crate::{
    errors::{json_error_handler, ApiError},
    schema::{CreatePersonRequest, UpdatePersonRequest},
};

#[get("/")]
async fn root() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "message": "Welcome to Person API. Visit /persons to manage people and /health to check the service."
    }))
}

/// Reports whether the backing store answers a trivial read
#[get("/health")]
async fn health(database: web::Data<Database>) -> HttpResponse {
    match database.health().await {
        Ok(report) => HttpResponse::Ok().json(json!({
            "status": "healthy",
            "database": "connected",
            "engine": report.engine,
            "timestamp": report.checked_at.to_rfc3339(),
        })),
        Err(e) => HttpResponse::ServiceUnavailable().json(json!({
            "detail": {
                "status": "unhealthy",
                "database": "disconnected",
                "error": e.to_string(),
                "timestamp": Utc::now().to_rfc3339(),
            }
        })),
    }
}

#[post("/persons")]
async fn create_person(
    database: web::Data<Database>,
    body: web::Json<CreatePersonRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = body.into_inner();
    request.validate()?;

    let person = database
        .create(request.name, request.age, request.email)
        .await?;

    Ok(HttpResponse::Created().json(person))
}

#[get("/persons")]
async fn list_persons(database: web::Data<Database>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(database.list().await?))
}

#[get("/persons/{id}")]
async fn get_person(
    database: web::Data<Database>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = EntityId(id.into_inner());

    Ok(HttpResponse::Ok().json(database.get(&id).await?))
}

#[put("/persons/{id}")]
async fn update_person(
    database: web::Data<Database>,
    id: web::Path<String>,
    body: web::Json<UpdatePersonRequest>,
) -> Result<HttpResponse, ApiError> {
    let id = EntityId(id.into_inner());
    let update = body.into_inner().into_update()?;

    Ok(HttpResponse::Ok().json(database.update(&id, update).await?))
}

#[delete("/persons/{id}")]
async fn delete_person(
    database: web::Data<Database>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = EntityId(id.into_inner());

    database.delete(&id).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Registers every route plus the JSON extractor configuration. Expects a `Data<Database>` to be
/// registered on the app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .service(root)
        .service(health)
        .service(create_person)
        .service(list_persons)
        .service(get_person)
        .service(update_person)
        .service(delete_person);
}
