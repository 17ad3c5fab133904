use actix_multipart::Multipart;
use actix_web::{http::header, web, HttpRequest, HttpResponse};
use futures::StreamExt;

use crate::{
    error::{RelayError, Result},
    models::{GenerationRequest, HealthStatus, ReframeRequest, RemixRequest},
    pipeline::Pipeline,
};

/// Largest remix upload or JSON body accepted.
pub const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthStatus {
        status: "ok".to_string(),
        message: "Image relay is running".to_string(),
    })
}

pub async fn generate(
    pipeline: web::Data<Pipeline>,
    request: web::Json<GenerationRequest>,
) -> Result<HttpResponse> {
    let result = pipeline.generate(request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(result))
}

pub async fn reframe(
    pipeline: web::Data<Pipeline>,
    request: web::Json<ReframeRequest>,
) -> Result<HttpResponse> {
    let result = pipeline.reframe(request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// Accepts either multipart/form-data (`image` file plus text fields) or a
/// JSON body with `image_url`.
pub async fn remix(
    pipeline: web::Data<Pipeline>,
    req: HttpRequest,
    payload: web::Payload,
) -> Result<HttpResponse> {
    let request = if is_multipart(&req) {
        read_multipart(Multipart::new(req.headers(), payload)).await?
    } else {
        read_json(payload).await?
    };

    let result = pipeline.remix(request).await?;
    Ok(HttpResponse::Ok().json(result))
}

fn is_multipart(req: &HttpRequest) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map_or(false, |value| {
            value.to_ascii_lowercase().starts_with("multipart/form-data")
        })
}

fn too_large() -> RelayError {
    RelayError::ValidationError(format!(
        "Request body exceeds {} bytes",
        MAX_BODY_BYTES
    ))
}

async fn read_json(mut payload: web::Payload) -> Result<RemixRequest> {
    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| {
            RelayError::ValidationError(format!("Failed to read request body: {}", e))
        })?;
        if body.len() + chunk.len() > MAX_BODY_BYTES {
            return Err(too_large());
        }
        body.extend_from_slice(&chunk);
    }

    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(RemixRequest::default());
    }

    serde_json::from_slice(&body)
        .map_err(|e| RelayError::ValidationError(format!("Invalid request body: {}", e)))
}

async fn read_multipart(mut payload: Multipart) -> Result<RemixRequest> {
    let mut request = RemixRequest::default();

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| {
            RelayError::ValidationError(format!("Invalid multipart data: {}", e))
        })?;

        let name = match field.name() {
            Some(name) => name.to_string(),
            None => continue,
        };

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| {
                RelayError::ValidationError(format!("Invalid multipart data: {}", e))
            })?;
            if data.len() + chunk.len() > MAX_BODY_BYTES {
                return Err(too_large());
            }
            data.extend_from_slice(&chunk);
        }

        match name.as_str() {
            "image" => request.image = Some(data),
            "image_url" => request.image_url = Some(String::from_utf8_lossy(&data).into_owned()),
            "prompt" => request.prompt = Some(String::from_utf8_lossy(&data).into_owned()),
            "aspect_ratio" => {
                request.aspect_ratio = Some(String::from_utf8_lossy(&data).into_owned())
            }
            other => log::debug!("Ignoring multipart field '{}'", other),
        }
    }

    Ok(request)
}
