use std::process::ExitCode;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::application::AppError;

pub const CLIENT_ERROR: &str = "CLIENT_ERROR";
pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";

/// What a caller sees when a command fails.
///
/// Every caller-caused failure is reported under the single client error
/// class with its message; anything else is an internal error.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub request_info: String,
}

impl ErrorReport {
    pub fn new(err: &anyhow::Error, request_info: impl Into<String>) -> Self {
        let (client, message) = match err.downcast_ref::<AppError>() {
            Some(app_err) => (app_err.is_client_error(), app_err.to_string()),
            None => (false, format!("{:#}", err)),
        };

        Self {
            status: if client { CLIENT_ERROR } else { INTERNAL_ERROR }.to_string(),
            timestamp: Utc::now(),
            message,
            request_info: request_info.into(),
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status == CLIENT_ERROR
    }

    /// 2 for client errors, 1 for everything else.
    pub fn exit_code(&self) -> ExitCode {
        if self.is_client_error() {
            ExitCode::from(2)
        } else {
            ExitCode::FAILURE
        }
    }

    pub fn print(&self, json: bool) {
        if json {
            match serde_json::to_string_pretty(self) {
                Ok(body) => eprintln!("{}", body),
                Err(_) => eprintln!("Error: {}", self.message),
            }
        } else {
            eprintln!("Error: {}", self.message);
        }
    }
}
