use std::path::Path;

use prometheus::{register_int_counter_vec, IntCounterVec};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use lazy_static::lazy_static;

lazy_static! {
    pub static ref QUESTION_MUTATIONS: IntCounterVec = register_int_counter_vec!(
        "trivia_questions_mutated_total",
        "Number of created and deleted questions",
        &["operation"]
    )
    .unwrap();
    pub static ref QUIZ_QUESTIONS_SERVED: IntCounterVec = register_int_counter_vec!(
        "trivia_quiz_questions_served_total",
        "Number of questions handed out to quiz players",
        &["category"]
    )
    .unwrap();
}

/// `LOG_LEVEL` (from the environment or `.env`) takes precedence over `default_directive`.
fn env_filter(dotenv_file: Option<&Path>, default_directive: &str) -> EnvFilter {
    match dotenv_file {
        Some(path) => dotenv::from_path(path).ok(),
        None => dotenv::dotenv().ok().map(|_| ()),
    };
    EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new(default_directive))
}

pub fn init_tracing(default_directive: &str) {
    let filter_layer = env_filter(None, default_directive);
    let mut fmt_layer = fmt::layer();
    if std::env::var("INCLUDE_SPAN_EVENTS").is_ok_and(|value| value.eq_ignore_ascii_case("true")) {
        fmt_layer = fmt_layer.with_span_events(FmtSpan::ENTER | FmtSpan::EXIT);
    }

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
