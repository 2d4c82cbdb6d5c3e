use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::get,
    Json, Router,
};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{categories::get_all_categories, questions::get_questions_for_category},
        Category, Question,
    },
    server::{
        app::AppState,
        error::ApiError,
        pagination::{paginate, PageQuery},
    },
};

use super::ApiResponse;

#[derive(Serialize)]
struct CategoriesBody {
    success: bool,
    categories: Vec<Category>,
}

#[derive(Serialize)]
struct CategoryQuestionsBody {
    success: bool,
    total_questions: usize,
    current_category: i64,
    questions: Vec<Question>,
}

async fn get_categories(
    State(pool): State<SqlitePool>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResponse<Json<CategoriesBody>> {
    let Query(PageQuery { page }) = query?;
    let categories = get_all_categories(&pool).await?;
    if categories.is_empty() {
        return Err(ApiError::NotFound("no categories".to_owned()));
    }
    Ok(Json(CategoriesBody {
        success: true,
        categories: paginate(page, categories),
    }))
}

async fn category_questions(
    State(pool): State<SqlitePool>,
    id: Result<Path<i64>, PathRejection>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResponse<Json<CategoryQuestionsBody>> {
    let Path(id) = id?;
    let Query(PageQuery { page }) = query?;
    let questions = get_questions_for_category(&pool, id).await?;
    let total_questions = questions.len();
    let questions = paginate(page, questions);
    if questions.is_empty() {
        return Err(ApiError::NotFound(format!(
            "no questions in category {id} on page {page}"
        )));
    }
    Ok(Json(CategoryQuestionsBody {
        success: true,
        total_questions,
        current_category: id,
        questions,
    }))
}

pub fn category_router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(get_categories))
        .route("/categories/{id}/questions", get(category_questions))
}
