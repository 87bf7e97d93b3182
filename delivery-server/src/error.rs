//! Service-layer error type
//!
//! `ServiceError` bridges storage errors (`sqlx::Error`, `BoxError`) and the
//! API-layer `AppError`, so handlers and repositories can use `?` directly.

use axum::extract::rejection::JsonRejection;
use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// - `Db`: storage/infrastructure errors (logged, mapped to InternalError)
/// - `App`: business-rule errors (passed through to the client)
#[derive(Debug)]
pub enum ServiceError {
    Db(BoxError),
    App(AppError),
}

/// Driver reported a UNIQUE constraint violation
pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// Driver reported a FOREIGN KEY constraint violation
pub fn is_foreign_key_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}

/// Driver reported a UNIQUE violation on `column` (`table.column`)
///
/// SQLite names the violated columns in the message, e.g.
/// `UNIQUE constraint failed: reviews.order_id`.
pub fn is_unique_violation_on(e: &sqlx::Error, column: &str) -> bool {
    match e {
        sqlx::Error::Database(db) if db.is_unique_violation() => db
            .message()
            .strip_prefix("UNIQUE constraint failed: ")
            .is_some_and(|cols| cols.split(", ").any(|c| c == column)),
        _ => false,
    }
}

impl ServiceError {
    /// Map a unique violation on one of `columns` to `code`
    ///
    /// Any other unique violation (e.g. an id collision) is a storage error.
    pub fn unique_as(e: sqlx::Error, columns: &[&str], code: ErrorCode) -> Self {
        if columns.iter().any(|c| is_unique_violation_on(&e, c)) {
            ServiceError::App(AppError::new(code))
        } else if is_unique_violation(&e) {
            ServiceError::Db(e.into())
        } else {
            e.into()
        }
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        if is_unique_violation(&e) {
            return ServiceError::App(AppError::new(ErrorCode::AlreadyExists));
        }
        ServiceError::Db(e.into())
    }
}

impl From<BoxError> for ServiceError {
    fn from(e: BoxError) -> Self {
        ServiceError::Db(e)
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<JsonRejection> for ServiceError {
    fn from(rejection: JsonRejection) -> Self {
        ServiceError::App(AppError::validation(rejection.body_text()))
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Db(db_err) => {
                tracing::error!(error = %db_err, "Service database error");
                AppError::new(ErrorCode::InternalError)
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_errors_become_internal_without_detail() {
        let err = ServiceError::Db("disk I/O error at page 42".into());
        let app: AppError = err.into();
        assert_eq!(app.code, ErrorCode::InternalError);
        assert!(!app.message.contains("page 42"));
    }

    #[test]
    fn app_errors_pass_through() {
        let err: ServiceError = AppError::new(ErrorCode::OrderAlreadyPaid).into();
        let app: AppError = err.into();
        assert_eq!(app.code, ErrorCode::OrderAlreadyPaid);
    }

    #[test]
    fn non_constraint_sqlx_errors_are_db() {
        let err: ServiceError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, ServiceError::Db(_)));
    }

    #[tokio::test]
    async fn unique_as_only_maps_the_named_columns() {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::query("CREATE TABLE tickets (id INTEGER PRIMARY KEY, code TEXT NOT NULL UNIQUE)")
            .execute(&pool)
            .await
            .unwrap();
        let insert = |id: i64, code: &'static str| {
            sqlx::query("INSERT INTO tickets (id, code) VALUES (?1, ?2)")
                .bind(id)
                .bind(code)
                .execute(&pool)
        };
        insert(1, "a").await.unwrap();

        let dup_code = insert(2, "a").await.unwrap_err();
        assert!(is_unique_violation_on(&dup_code, "tickets.code"));
        let app: AppError =
            ServiceError::unique_as(dup_code, &["tickets.code"], ErrorCode::AlreadyExists).into();
        assert_eq!(app.code, ErrorCode::AlreadyExists);

        // Id collision is not the domain conflict
        let dup_id = insert(1, "b").await.unwrap_err();
        assert!(!is_unique_violation_on(&dup_id, "tickets.code"));
        let err = ServiceError::unique_as(dup_id, &["tickets.code"], ErrorCode::AlreadyExists);
        assert!(matches!(err, ServiceError::Db(_)));
        let app: AppError = err.into();
        assert_eq!(app.code, ErrorCode::InternalError);
    }
}
