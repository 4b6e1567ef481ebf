use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;
use tracing::error;

/// Every failure the auth flow can surface to a client. The variant decides
/// the HTTP status; the Display message becomes the response body.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    #[error("An account with this email already exists")]
    DuplicateAccount,

    #[error("Account not found")]
    AccountNotFound,

    #[error("Account is already verified")]
    AlreadyVerified,

    #[error("Invalid OTP code")]
    InvalidCode,

    #[error("OTP code has expired. Please request a new one")]
    CodeExpired,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account is not verified. Please verify your email first")]
    UnverifiedAccount,

    #[error("Missing authorization token")]
    MissingToken,

    #[error("Invalid or expired token")]
    InvalidToken,

    // Store, SMTP or token-provider failure. The report is logged, the
    // client only sees the generic message.
    #[error("Internal server error")]
    Dependency(eyre::Report),
}

impl From<eyre::Report> for AuthError {
    fn from(report: eyre::Report) -> Self {
        Self::Dependency(report)
    }
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_)
            | Self::DuplicateAccount
            | Self::AlreadyVerified
            | Self::InvalidCode
            | Self::CodeExpired => StatusCode::BAD_REQUEST,
            Self::AccountNotFound => StatusCode::NOT_FOUND,
            Self::InvalidCredentials | Self::MissingToken => StatusCode::UNAUTHORIZED,
            Self::UnverifiedAccount | Self::InvalidToken => StatusCode::FORBIDDEN,
            Self::Dependency(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let Self::Dependency(report) = self {
            error!("dependency failure: {report:?}");
        }

        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "message": self.to_string()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_error_taxonomy() {
        assert_eq!(
            AuthError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::DuplicateAccount.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::AccountNotFound.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AuthError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::MissingToken.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::UnverifiedAccount.status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(AuthError::InvalidToken.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            AuthError::Dependency(eyre::eyre!("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn dependency_errors_keep_the_body_generic() {
        let err = AuthError::Dependency(eyre::eyre!("smtp connection refused"));
        assert_eq!(err.to_string(), "Internal server error");
    }
}
