use actix_web::{error, http::header, http::StatusCode, HttpResponse, HttpResponseBuilder};
use derive_more::{Display, Error};

/// Response sent to a client whose request the gateway denied.
///
/// Every [`AuthFailure`](super::AuthFailure) collapses into the same
/// `Unauthorized` answer so a client cannot tell which check rejected it.
#[derive(Debug, Display, Error)]
pub enum AuthError {
    #[display("unauthorized")]
    Unauthorized,
}

impl error::ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match *self {
            AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponseBuilder::new(self.status_code())
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .body(format!(r#"{{"success":false,"errMsg":"{}"}}"#, self))
    }
}
