// Copyright 2025 RustFS Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use snafu::Snafu;
use tracing::warn;

use crate::types;

/// Console API 错误类型
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Bad request: {}", message))]
    BadRequest { message: String },

    #[snafu(display("Unsupported workload kind: {}", kind))]
    UnsupportedKind { kind: String },

    #[snafu(display("Invalid manifest: {}", source))]
    Manifest { source: types::error::Error },
}

/// API 错误响应格式
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type, message, details) = match &self {
            Error::BadRequest { message } => {
                (StatusCode::BAD_REQUEST, "BadRequest", message.clone(), None)
            }
            Error::UnsupportedKind { kind } => (
                StatusCode::BAD_REQUEST,
                "UnsupportedKind",
                format!("Unsupported workload kind: {}", kind),
                None,
            ),
            Error::Manifest { source } if source.is_input_error() => (
                StatusCode::BAD_REQUEST,
                "InvalidManifest",
                "Manifest could not be parsed".to_string(),
                Some(source.to_string()),
            ),
            Error::Manifest { source } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "RenderError",
                "Manifest could not be rendered".to_string(),
                Some(source.to_string()),
            ),
        };

        if status.is_server_error() {
            warn!(error = %self, "console request failed");
        }

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Result type for Console API
pub type Result<T> = std::result::Result<T, Error>;
