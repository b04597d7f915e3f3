//! Error responses.
//!
//! Every failure leaves the API as `{"error": CODE, "message": text}`, with a
//! `details` object mapping request fields to messages for validation errors.

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use caja_core::drawer::DrawerError;
use serde_json::{Map, Value, json};
use tracing::error;
use validator::ValidationErrors;

/// Converts a drawer error into an HTTP response.
pub fn drawer_error_response(err: &DrawerError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if status.is_server_error() {
        error!(error = %err, "Drawer operation failed");
        return (
            status,
            Json(json!({
                "error": err.error_code(),
                "message": "An error occurred"
            })),
        )
            .into_response();
    }

    let mut body = json!({
        "error": err.error_code(),
        "message": err.to_string()
    });
    if let Some(field) = err.field() {
        body["details"] = field_details(field, &err.to_string());
    }

    (status, Json(body)).into_response()
}

/// Converts `validator` failures into a 400 response keyed by wire field names.
pub fn validation_response(errors: &ValidationErrors) -> Response {
    let details: BTreeMap<String, Vec<String>> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map_or_else(|| e.code.to_string(), ToString::to_string)
                })
                .collect();
            (camel_case(&field), messages)
        })
        .collect();

    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "VALIDATION_ERROR",
            "message": "Request validation failed",
            "details": details
        })),
    )
        .into_response()
}

/// Converts a malformed JSON body into a 400 response.
pub fn json_rejection_response(rejection: &JsonRejection) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "VALIDATION_ERROR",
            "message": rejection.body_text()
        })),
    )
        .into_response()
}

/// Converts an unparsable path parameter into a 400 response naming the parameter.
pub fn path_rejection_response(field: &str, rejection: &PathRejection) -> Response {
    let message = rejection.body_text();
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "VALIDATION_ERROR",
            "message": message,
            "details": field_details(field, &message)
        })),
    )
        .into_response()
}

/// Converts an unparsable query string into a 400 response.
pub fn query_rejection_response(rejection: &QueryRejection) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "VALIDATION_ERROR",
            "message": rejection.body_text()
        })),
    )
        .into_response()
}

/// Rejects a request missing a field that has no body-level default.
pub fn missing_field_response(field: &str, message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "VALIDATION_ERROR",
            "message": format!("Invalid {field}: {message}"),
            "details": field_details(field, message)
        })),
    )
        .into_response()
}

fn field_details(field: &str, message: &str) -> Value {
    let mut details = Map::new();
    details.insert(field.to_string(), json!([message]));
    Value::Object(details)
}

/// `monto_inicial` -> `montoInicial`.
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
