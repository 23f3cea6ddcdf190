//! # Response Envelope
//!
//! Every successful response is `{ success: true, message, data }`.

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// The success envelope returned by every student endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_serializes_success_message_and_data() {
        let response = ApiResponse::ok("Found 0 matching students.", Vec::<u8>::new());
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({ "success": true, "message": "Found 0 matching students.", "data": [] })
        );
    }
}
