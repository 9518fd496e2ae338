use actix_web::{HttpResponse, ResponseError};
use log::debug;
use thiserror::Error;

/// Application-level failures and how they render over HTTP.
///
/// Authorization failures redirect to the login entry point instead of
/// producing an error page; everything else maps to a plain status code.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("not logged in")]
    Unauthorized,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error("database error")]
    Storage(#[from] sled::Error),

    #[error("template error")]
    Template(#[from] tera::Error),
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Unauthorized => HttpResponse::Found().header("location", "/").finish(),
            AppError::NotFound(_) => HttpResponse::NotFound().body(self.to_string()),
            AppError::Validation(_) => HttpResponse::BadRequest().body(self.to_string()),
            AppError::Storage(err) => {
                debug!("{:?}", err);
                HttpResponse::InternalServerError().body("Database error")
            }
            AppError::Template(err) => {
                debug!("{:?}", err);
                HttpResponse::InternalServerError().body("Template error")
            }
        }
    }
}
