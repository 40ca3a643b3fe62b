//! Service error to HTTP error conversion.

use super::http_error::{Error as HttpError, ErrorKind};
use crate::utility::tracing_targets::HANDLER as TRACING_TARGET;
use crate::{Error as ServiceError, ErrorKind as ServiceErrorKind};

impl From<ServiceError> for HttpError<'static> {
    fn from(error: ServiceError) -> Self {
        let kind = match error.kind() {
            ServiceErrorKind::Validation => ErrorKind::BadRequest,
            ServiceErrorKind::Conflict => ErrorKind::Conflict,
            ServiceErrorKind::Authentication => ErrorKind::Unauthorized,
            ServiceErrorKind::Storage | ServiceErrorKind::Config | ServiceErrorKind::Internal => {
                ErrorKind::InternalServerError
            }
        };

        if error.kind().is_client_facing() {
            tracing::debug!(
                target: TRACING_TARGET,
                error_kind = %error.kind(),
                message = error.message(),
                "Request rejected"
            );

            return kind.with_message(error.message().to_owned());
        }

        tracing::error!(
            target: TRACING_TARGET,
            error_kind = %error.kind(),
            error = %error,
            source = ?std::error::Error::source(&error),
            "Service operation failed"
        );

        kind.with_context(error.message().to_owned())
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    use super::*;

    #[test]
    fn client_facing_messages_pass_through() {
        let error = HttpError::from(ServiceError::conflict(
            "An account with this email already exists.",
        ));

        assert_eq!(error.kind(), ErrorKind::Conflict);
        assert_eq!(
            error.message(),
            Some("An account with this email already exists.")
        );
    }

    #[test]
    fn server_errors_hide_details() {
        let error = HttpError::from(ServiceError::storage("rename of users.json.tmp failed"));

        assert_eq!(error.kind(), ErrorKind::InternalServerError);
        assert_eq!(error.message(), None);
        assert_eq!(
            error.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn authentication_maps_to_unauthorized() {
        let error = HttpError::from(ServiceError::authentication("Invalid credentials."));
        assert_eq!(error.kind().status_code(), StatusCode::UNAUTHORIZED);
    }
}
