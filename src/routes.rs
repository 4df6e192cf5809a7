mod challenges;

pub use challenges::{
    SubmitRequest, get_challenge_by_id_handler, get_challenges_handler,
    mark_completed_handler, submit_challenge_handler,
};

use actix_web::error::{InternalError, JsonPayloadError, QueryPayloadError};
use actix_web::{HttpRequest, HttpResponse};
use serde::Serialize;

/// Header set by the upstream authentication middleware; the service trusts
/// the identity it carries without re-validating.
pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Serialize)]
struct ErrorResponse {
    reason: &'static str,
    code: u32,
}

#[derive(Serialize)]
struct MessageResponse {
    msg: &'static str,
}

pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = HttpResponse::BadRequest().json(ErrorResponse {
        reason: "ERR_INVALID_ARGUMENT",
        code: 1,
    });
    InternalError::from_response(err, response).into()
}

pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = HttpResponse::BadRequest().json(ErrorResponse {
        reason: "ERR_INVALID_ARGUMENT",
        code: 1,
    });
    InternalError::from_response(err, response).into()
}

/// Identity supplied by the auth middleware, if present
fn authenticated_user(req: &HttpRequest) -> Option<i64> {
    req.headers()
        .get(USER_ID_HEADER)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}
