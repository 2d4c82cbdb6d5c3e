use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_option_number_from_string;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{
            categories::get_all_categories,
            questions::{self, get_all_questions, get_question_by_id, search_questions},
        },
        Category, Question,
    },
    server::{
        app::AppState,
        error::ApiError,
        pagination::{paginate, PageQuery},
    },
    telemetry::QUESTION_MUTATIONS,
};

use super::ApiResponse;

#[derive(Deserialize)]
struct NewQuestion {
    question: Option<String>,
    answer: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    category: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    difficulty: Option<i64>,
}

#[derive(Deserialize)]
struct SearchBody {
    #[serde(rename = "searchTerm", default)]
    search_term: Option<String>,
}

#[derive(Serialize)]
struct QuestionsPage {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    created: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deleted: Option<i64>,
    count: usize,
    questions: Vec<Question>,
    categories: Vec<Category>,
}

#[derive(Serialize)]
struct SearchResults {
    success: bool,
    total_questions: usize,
    questions: Vec<Question>,
}

async fn questions_page(pool: &SqlitePool, page: i64) -> Result<QuestionsPage, ApiError> {
    let questions = get_all_questions(pool).await?;
    let categories = get_all_categories(pool).await?;
    Ok(QuestionsPage {
        success: true,
        created: None,
        deleted: None,
        count: questions.len(),
        questions: paginate(page, questions),
        categories,
    })
}

async fn list_questions(
    State(pool): State<SqlitePool>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResponse<Json<QuestionsPage>> {
    let Query(PageQuery { page }) = query?;
    let listing = questions_page(&pool, page).await?;
    if listing.count == 0 {
        return Err(ApiError::NotFound("no questions".to_owned()));
    }
    if listing.categories.is_empty() {
        return Err(ApiError::NotFound("no categories".to_owned()));
    }
    Ok(Json(listing))
}

async fn delete_question(
    State(pool): State<SqlitePool>,
    id: Result<Path<i64>, PathRejection>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResponse<Json<QuestionsPage>> {
    let Path(id) = id?;
    let Query(PageQuery { page }) = query?;
    if get_question_by_id(&pool, id).await?.is_none() {
        return Err(ApiError::NotFound(format!("question {id}")));
    }
    // a concurrent delete may still win between the lookup and this statement
    if !questions::delete_question(&pool, id).await? {
        return Err(ApiError::NotFound(format!("question {id}")));
    }
    QUESTION_MUTATIONS.with_label_values(&["deleted"]).inc();
    tracing::info!("Deleted question {id}");

    Ok(Json(QuestionsPage {
        deleted: Some(id),
        ..questions_page(&pool, page).await?
    }))
}

async fn create_question(
    State(pool): State<SqlitePool>,
    query: Result<Query<PageQuery>, QueryRejection>,
    body: Result<Json<NewQuestion>, JsonRejection>,
) -> ApiResponse<Json<QuestionsPage>> {
    let Query(PageQuery { page }) = query?;
    let Json(new_question) = body?;
    let text = match new_question.question.as_deref() {
        Some(text) if !text.is_empty() => text,
        _ => return Err(ApiError::NotFound("question text is empty".to_owned())),
    };

    let id = questions::create_question(
        &pool,
        text,
        new_question.answer.as_deref(),
        new_question.category,
        new_question.difficulty,
    )
    .await
    .map_err(|e| {
        tracing::warn!("Unable to store question: {}", e);
        ApiError::BadRequest(e.to_string())
    })?;
    QUESTION_MUTATIONS.with_label_values(&["created"]).inc();
    tracing::info!("Created question {id}");

    Ok(Json(QuestionsPage {
        created: Some(id),
        ..questions_page(&pool, page).await?
    }))
}

async fn search(
    State(pool): State<SqlitePool>,
    body: Result<Json<SearchBody>, JsonRejection>,
) -> ApiResponse<Json<SearchResults>> {
    let Json(SearchBody { search_term }) = body?;
    let questions = search_questions(&pool, search_term.as_deref().unwrap_or_default()).await?;
    Ok(Json(SearchResults {
        success: true,
        total_questions: questions.len(),
        questions,
    }))
}

pub fn questions_router() -> Router<AppState> {
    Router::new()
        .route("/questions", get(list_questions).post(create_question))
        .route("/questions/{id}", delete(delete_question))
        .route("/questions/search", post(search))
}
