use rocket::Request;
use rocket::serde::json::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[rocket::catch(401)]
pub fn unauthorized(_req: &Request) -> Json<ErrorBody> {
    Json(ErrorBody {
        error: "Authentication required".to_string(),
    })
}

#[rocket::catch(403)]
pub fn forbidden(_req: &Request) -> Json<ErrorBody> {
    Json(ErrorBody {
        error: "Insufficient permissions".to_string(),
    })
}

#[rocket::catch(404)]
pub fn not_found(req: &Request) -> Json<ErrorBody> {
    Json(ErrorBody {
        error: format!("Resource not found: {}", req.uri()),
    })
}

#[rocket::catch(409)]
pub fn conflict(_req: &Request) -> Json<ErrorBody> {
    Json(ErrorBody {
        error: "Resource already exists".to_string(),
    })
}
