use actix_web::{HttpRequest, HttpResponse, Responder, get, post, web};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqlitePool;

use super::{ErrorResponse, MessageResponse, authenticated_user};
use crate::config::{ChallengeConfig, Difficulty};
use crate::database as db;
use crate::judge::Evaluator;

#[derive(Deserialize, Debug)]
pub struct SubmitRequest {
    pub code: String,
    pub language: String,
}

#[derive(Serialize)]
struct ChallengeSummary<'a> {
    id: u32,
    title: &'a str,
    difficulty: Difficulty,
    is_completed: bool,
}

#[derive(Serialize)]
struct ChallengeDetail<'a> {
    id: u32,
    title: &'a str,
    difficulty: Difficulty,
    instructions: &'a str,
    languages: &'a [String],
    is_completed: bool,
    previous_submission: Option<db::SubmissionRecord>,
}

fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(ErrorResponse {
        reason: "ERR_UNAUTHORIZED",
        code: 2,
    })
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse {
        reason: "ERR_NOT_FOUND",
        code: 3,
    })
}

fn external_error() -> HttpResponse {
    HttpResponse::InternalServerError().json(ErrorResponse {
        reason: "ERR_EXTERNAL",
        code: 5,
    })
}

#[get("/challenges")]
pub async fn get_challenges_handler(
    req: HttpRequest,
    challenges: web::Data<Vec<ChallengeConfig>>,
    pool: web::Data<SqlitePool>,
) -> impl Responder {
    let Some(user_id) = authenticated_user(&req) else {
        return unauthorized();
    };

    let progress = match db::fetch_progress(user_id, pool.into_inner()).await {
        Ok(progress) => progress,
        Err(e) => {
            log::error!("Failed to fetch progress for user {user_id}: {e}");
            return external_error();
        }
    };
    let completed_id = progress.filter(|p| p.completed).map(|p| p.challenge_id);

    let summaries: Vec<ChallengeSummary> = challenges
        .iter()
        .map(|challenge| ChallengeSummary {
            id: challenge.id,
            title: &challenge.title,
            difficulty: challenge.difficulty,
            is_completed: completed_id == Some(challenge.id),
        })
        .collect();

    HttpResponse::Ok().json(summaries)
}

#[get("/challenges/{challenge_id}")]
pub async fn get_challenge_by_id_handler(
    req: HttpRequest,
    path: web::Path<u32>,
    challenges: web::Data<Vec<ChallengeConfig>>,
    pool: web::Data<SqlitePool>,
) -> impl Responder {
    let Some(user_id) = authenticated_user(&req) else {
        return unauthorized();
    };

    let challenge_id = path.into_inner();
    let Some(challenge) = challenges.iter().find(|c| c.id == challenge_id) else {
        return not_found();
    };

    let pool = pool.into_inner();
    let progress = match db::fetch_progress(user_id, pool.clone()).await {
        Ok(progress) => progress,
        Err(e) => {
            log::error!("Failed to fetch progress for user {user_id}: {e}");
            return external_error();
        }
    };
    let is_completed = progress
        .map(|p| p.completed && p.challenge_id == challenge_id)
        .unwrap_or(false);

    let previous_submission = match db::latest_submission(user_id, challenge_id, pool).await {
        Ok(submission) => submission,
        Err(e) => {
            log::error!("Failed to fetch submissions for user {user_id}: {e}");
            return external_error();
        }
    };

    HttpResponse::Ok().json(ChallengeDetail {
        id: challenge.id,
        title: &challenge.title,
        difficulty: challenge.difficulty,
        instructions: &challenge.instructions,
        languages: &challenge.languages,
        is_completed,
        previous_submission,
    })
}

#[post("/challenges/{challenge_id}/submit")]
pub async fn submit_challenge_handler(
    req: HttpRequest,
    path: web::Path<u32>,
    challenges: web::Data<Vec<ChallengeConfig>>,
    evaluator: web::Data<dyn Evaluator>,
    pool: web::Data<SqlitePool>,
    body: web::Json<SubmitRequest>,
) -> impl Responder {
    let Some(user_id) = authenticated_user(&req) else {
        return unauthorized();
    };

    let challenge_id = path.into_inner();
    let Some(challenge) = challenges.iter().find(|c| c.id == challenge_id) else {
        return not_found();
    };

    if body.code.trim().is_empty() || body.language.trim().is_empty() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            reason: "ERR_INVALID_ARGUMENT",
            code: 1,
        });
    }

    let result = evaluator
        .evaluate(&body.code, &body.language, &challenge.cases)
        .await;

    // The ledger write is fatal for this attempt; the evaluation itself is
    // never retried
    let record = match db::record_submission(
        user_id,
        challenge_id,
        &body.code,
        &body.language,
        &result,
        pool.into_inner(),
    )
    .await
    {
        Ok(record) => record,
        Err(e) => {
            log::error!("Failed to record submission for user {user_id}: {e}");
            return external_error();
        }
    };

    log::info!(
        "User {user_id} submitted challenge {challenge_id} as submission {} (passed: {})",
        record.id,
        record.passed
    );

    HttpResponse::Ok().json(result)
}

#[post("/challenges/{challenge_id}/mark-completed")]
pub async fn mark_completed_handler(
    req: HttpRequest,
    path: web::Path<u32>,
    challenges: web::Data<Vec<ChallengeConfig>>,
    pool: web::Data<SqlitePool>,
) -> impl Responder {
    let Some(user_id) = authenticated_user(&req) else {
        return unauthorized();
    };

    let challenge_id = path.into_inner();
    if !challenges.iter().any(|c| c.id == challenge_id) {
        return not_found();
    }

    // Completion tracks the attempt, not correctness: the flag is set even
    // when every recorded submission failed
    if let Err(e) = db::mark_attempted(user_id, challenge_id, pool.into_inner()).await {
        log::error!("Failed to mark challenge {challenge_id} completed for user {user_id}: {e}");
        return external_error();
    }

    HttpResponse::Ok().json(MessageResponse {
        msg: "Challenge marked as completed",
    })
}
