pub mod queries;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{Error, Executor};

pub use queries::categories::Category;
pub use queries::questions::Question;

/// Opens a pool against `url` (`sqlite:trivia.db`, `sqlite::memory:`, ...).
///
/// Every connection gets `case_sensitive_like` switched on so that question
/// search matches substrings case-sensitively.
pub async fn establish_connection(url: &str, max_connections: u32) -> Result<SqlitePool, Error> {
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
    pool_options()
        .max_connections(max_connections)
        .connect_with(options)
        .await
}

/// Single-connection pool over a private in-memory database.
///
/// The connection is never recycled, otherwise the database would vanish with it.
pub async fn establish_in_memory() -> Result<SqlitePool, Error> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
    pool_options()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
}

fn pool_options() -> SqlitePoolOptions {
    SqlitePoolOptions::new().after_connect(|conn, _meta| {
        Box::pin(async move {
            conn.execute("PRAGMA case_sensitive_like = ON").await?;
            Ok(())
        })
    })
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), Error> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
