use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Outcomes of `/add` and `/remove` other than "ok".
///
/// Existing clients match on the body text, so the first four keep status 200.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("not all parameters specified")]
    MissingParameters,
    #[error("wrong key")]
    WrongKey,
    #[error("version already present")]
    AlreadyPresent,
    #[error("version doesnt exist")]
    NotFound,
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),
    #[error("database error")]
    Database(#[from] sqlx::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingParameters
            | ApiError::WrongKey
            | ApiError::AlreadyPresent
            | ApiError::NotFound => StatusCode::OK,
            ApiError::InvalidParameter(_) => StatusCode::BAD_REQUEST,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Database(e) = &self {
            tracing::error!("Database error: {}", e);
        }
        (self.status(), self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compat_messages_keep_ok_status() {
        for (err, text) in [
            (ApiError::MissingParameters, "not all parameters specified"),
            (ApiError::WrongKey, "wrong key"),
            (ApiError::AlreadyPresent, "version already present"),
            (ApiError::NotFound, "version doesnt exist"),
        ] {
            assert_eq!(err.status(), StatusCode::OK);
            assert_eq!(err.to_string(), text);
        }
    }

    #[test]
    fn test_error_statuses() {
        let invalid = ApiError::InvalidParameter("b");
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
        assert_eq!(invalid.to_string(), "invalid parameter: b");

        let db = ApiError::from(sqlx::Error::PoolClosed);
        assert_eq!(db.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(db.to_string(), "database error");
    }
}
