use actix_cors::Cors;
use actix_multipart::form::{bytes::Bytes as UploadedFile, MultipartForm};
use actix_web::{dev::Server, get, post, web, App, HttpResponse, HttpServer, Responder};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::application::use_cases::ingestion::IngestionService;
use crate::domain::equipment::{EquipmentRecord, HistoryEntry, Summary};
use crate::domain::error::AppError;

pub struct HttpState {
    pub ingestion: Arc<IngestionService>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ErrorBody {
    fn from(err: &AppError) -> Self {
        Self {
            error: err.to_string(),
        }
    }
}

#[derive(MultipartForm)]
struct UploadForm {
    file: Option<UploadedFile>,
}

#[derive(Serialize)]
struct UploadResponse<'a> {
    id: &'a Uuid,
    filename: &'a str,
    data: &'a [EquipmentRecord],
    summary: &'a Summary,
}

#[derive(Serialize)]
struct HistoryResponse {
    history: Vec<HistoryEntry>,
}

fn error_response(err: &AppError) -> HttpResponse {
    if err.is_validation() {
        HttpResponse::BadRequest().json(ErrorBody::from(err))
    } else {
        error!(error = %err, "Request failed");
        HttpResponse::InternalServerError().json(ErrorBody::from(err))
    }
}

#[post("/upload/")]
async fn upload(
    data: web::Data<HttpState>,
    MultipartForm(form): MultipartForm<UploadForm>,
) -> impl Responder {
    let Some(file) = form.file else {
        return error_response(&AppError::MissingFile);
    };
    let filename = file
        .file_name
        .clone()
        .unwrap_or_else(|| "upload.csv".to_string());

    info!(filename, bytes = file.data.len(), "Received upload");

    match data.ingestion.ingest(&file.data, &filename).await {
        Ok(entry) => HttpResponse::Created().json(UploadResponse {
            id: &entry.id,
            filename: &entry.filename,
            data: &entry.records,
            summary: &entry.summary,
        }),
        Err(err) => error_response(&err),
    }
}

#[get("/history/")]
async fn history(data: web::Data<HttpState>) -> impl Responder {
    match data.ingestion.history().await {
        Ok(entries) => HttpResponse::Ok().json(HistoryResponse { history: entries }),
        Err(err) => error_response(&err),
    }
}

pub fn start_server(ingestion: Arc<IngestionService>, bind_addr: &str) -> std::io::Result<Server> {
    let state = web::Data::new(HttpState { ingestion });

    let server = HttpServer::new(move || {
        let cors = Cors::permissive(); // Dashboard frontends run on their own origin

        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .service(web::scope("/api").service(upload).service(history))
    })
    .bind(bind_addr)?
    .run();

    Ok(server)
}
