mod categories;
mod questions;
mod quizzes;

use axum::Router;

use super::{app::AppState, error::ApiError};

pub use categories::category_router;
pub use questions::questions_router;
pub use quizzes::{pick_question, quizzes_router, QuizError};

pub type ApiResponse<T> = Result<T, ApiError>;

/// Every trivia route, with wrong-method requests answered by the error envelope.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .merge(category_router())
        .merge(questions_router())
        .merge(quizzes_router())
        .method_not_allowed_fallback(method_not_allowed)
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
