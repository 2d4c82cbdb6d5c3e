use std::collections::HashSet;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_number_from_string;
use sqlx::SqlitePool;
use thiserror::Error;

use crate::{
    db::{
        queries::questions::{get_all_questions, get_questions_for_category},
        Question,
    },
    server::app::AppState,
    telemetry::QUIZ_QUESTIONS_SERVED,
};

use super::{ApiError, ApiResponse};

/// `quiz_category.id == 0` selects every question.
const ALL_CATEGORIES: i64 = 0;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuizError {
    #[error("no questions to pick from")]
    EmptyPool,
    #[error("every candidate question was already served")]
    Exhausted,
}

#[derive(Deserialize)]
struct QuizRequest {
    #[serde(default)]
    previous_questions: Vec<i64>,
    quiz_category: Option<QuizCategory>,
}

#[derive(Deserialize)]
struct QuizCategory {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    id: i64,
    #[serde(rename = "type", default)]
    kind: Option<CategoryRef>,
}

#[derive(Deserialize)]
struct CategoryRef {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    id: i64,
}

impl QuizCategory {
    /// `None` means no filter. Any other selector must carry `type.id`.
    fn filter(&self) -> Result<Option<i64>, ApiError> {
        if self.id == ALL_CATEGORIES {
            return Ok(None);
        }
        self.kind
            .as_ref()
            .map(|kind| Some(kind.id))
            .ok_or_else(|| ApiError::Unprocessable("quiz_category.type.id is missing".to_owned()))
    }
}

#[derive(Serialize)]
struct QuizQuestion {
    success: bool,
    question: Question,
}

/// Draws uniformly random candidates until one has not been served yet.
///
/// An empty pool, or one made only of served questions, is an error rather
/// than an endless draw.
pub fn pick_question<'a, R>(
    candidates: &'a [Question],
    previous: &HashSet<i64>,
    rng: &mut R,
) -> Result<&'a Question, QuizError>
where
    R: Rng + ?Sized,
{
    if candidates.is_empty() {
        return Err(QuizError::EmptyPool);
    }
    if candidates.iter().all(|q| previous.contains(&q.id)) {
        return Err(QuizError::Exhausted);
    }
    loop {
        let candidate = &candidates[rng.gen_range(0..candidates.len())];
        if !previous.contains(&candidate.id) {
            return Ok(candidate);
        }
    }
}

async fn next_quiz_question(
    State(pool): State<SqlitePool>,
    body: Result<Json<QuizRequest>, JsonRejection>,
) -> ApiResponse<Json<QuizQuestion>> {
    let Json(request) = body.map_err(|rejection| match rejection {
        JsonRejection::JsonDataError(e) => ApiError::Unprocessable(e.body_text()),
        other => ApiError::from(other),
    })?;
    let category = request
        .quiz_category
        .ok_or_else(|| ApiError::Unprocessable("quiz_category is missing".to_owned()))?;

    let filter = category.filter()?;
    let candidates = match filter {
        None => get_all_questions(&pool).await,
        Some(id) => get_questions_for_category(&pool, id).await,
    }
    .map_err(|e| ApiError::Unprocessable(e.to_string()))?;

    let previous: HashSet<i64> = request.previous_questions.into_iter().collect();
    let question = pick_question(&candidates, &previous, &mut rand::thread_rng())
        .map_err(|e| {
            tracing::info!("Quiz over for category {:?}: {}", filter, e);
            ApiError::Unprocessable(e.to_string())
        })?
        .clone();

    let label = filter.map_or_else(|| "all".to_owned(), |id| id.to_string());
    QUIZ_QUESTIONS_SERVED.with_label_values(&[label.as_str()]).inc();

    Ok(Json(QuizQuestion {
        success: true,
        question,
    }))
}

pub fn quizzes_router() -> Router<AppState> {
    Router::new().route("/quizzes", post(next_quiz_question))
}
