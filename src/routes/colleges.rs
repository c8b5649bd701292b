use actix_web::{web, HttpResponse};

use crate::college::CollegeKb;
use crate::error::{AppError, AppResult};

/// GET /api/colleges
/// Lists the colleges the knowledge base covers
pub async fn list_colleges(kb: web::Data<CollegeKb>) -> HttpResponse {
    HttpResponse::Ok().json(kb.list())
}

/// GET /api/colleges/faq
/// The shared FAQ, grouped by section
pub async fn get_faq(kb: web::Data<CollegeKb>) -> AppResult<HttpResponse> {
    let faq = kb
        .common_questions()
        .ok_or_else(|| AppError::NotFound("FAQ content not available".to_string()))?;
    Ok(HttpResponse::Ok().json(faq))
}

/// GET /api/colleges/{college}
/// General information about one college
pub async fn get_college(
    kb: web::Data<CollegeKb>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let college = path.into_inner();
    let info = kb
        .general_info(&college)
        .ok_or_else(|| AppError::NotFound(format!("College {} not found", college)))?;
    Ok(HttpResponse::Ok().json(info))
}

/// GET /api/colleges/{college}/fees
/// Tuition-fee tables for one college
pub async fn get_fees(
    kb: web::Data<CollegeKb>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let college = path.into_inner();
    let fees = kb
        .tuition_fees(&college)
        .ok_or_else(|| AppError::NotFound(format!("Fees for {} not found", college)))?;
    Ok(HttpResponse::Ok().json(fees))
}

/// Configure knowledge-base routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/colleges")
            .route("", web::get().to(list_colleges))
            // Fixed segment before the parameterised one
            .route("/faq", web::get().to(get_faq))
            .route("/{college}", web::get().to(get_college))
            .route("/{college}/fees", web::get().to(get_fees)),
    );
}
