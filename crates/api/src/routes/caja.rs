//! Cash drawer routes.
//!
//! Request bodies and query strings keep the field names the admin front end
//! sends (`montoInicial`, `sedeId`, ...). Responses are the camelCase domain types.

use std::borrow::Cow;
use std::str::FromStr;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use caja_core::drawer::{
    CloseDrawerInput, DrawerError, DrawerFilter, MovementType, OpenDrawerInput,
    RecordMovementInput, validation,
};
use caja_shared::types::{BranchId, CompanyId, DrawerSessionId};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    AppState,
    error::{
        drawer_error_response, json_rejection_response, missing_field_response,
        path_rejection_response, query_rejection_response, validation_response,
    },
    middleware::Caller,
};

/// Creates the drawer routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/caja", get(list_cajas))
        .route("/caja/abrir", post(abrir_caja))
        .route("/caja/movimiento", post(create_movimiento))
        .route("/caja/activa/{sede_id}", get(get_caja_activa))
        .route("/caja/{id}", get(get_caja))
        .route("/caja/{id}/cerrar", patch(cerrar_caja))
        .route("/caja/{id}/movimientos", get(list_movimientos))
        .route("/caja/{id}/resumen", get(get_resumen))
}

// ============================================================================
// Request Types
// ============================================================================

/// Request body for opening a drawer.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AbrirCajaRequest {
    /// Declared starting cash.
    #[validate(custom(function = "non_negative_amount"))]
    pub monto_inicial: Decimal,
    /// Company owning the drawer.
    pub empresa_id: Uuid,
    /// Branch of the drawer.
    pub sede_id: Uuid,
    /// User opening the drawer; defaults to the caller.
    pub usuario_id: Option<Uuid>,
    /// Opening notes.
    #[validate(length(min = 1, max = 1000))]
    pub observaciones: Option<String>,
}

/// Request body for closing a drawer.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CerrarCajaRequest {
    /// Counted cash.
    #[validate(custom(function = "non_negative_amount"))]
    pub monto_final: Decimal,
    /// User closing the drawer; defaults to the caller.
    pub usuario_id: Option<Uuid>,
    /// Closing notes.
    #[validate(length(min = 1, max = 1000))]
    pub observaciones: Option<String>,
}

/// Request body for recording a movement.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MovimientoRequest {
    /// `INFLOW`, `OUTFLOW`, `ADJUSTMENT_IN` or `ADJUSTMENT_OUT`.
    #[validate(length(min = 1))]
    pub tipo: String,
    /// Positive amount.
    #[validate(custom(function = "positive_amount"))]
    pub monto: Decimal,
    /// Category.
    #[validate(length(min = 1, max = 100))]
    pub concepto: String,
    /// Drawer to record against.
    pub caja_id: Uuid,
    /// Originating payment.
    pub pago_id: Option<Uuid>,
    /// Description.
    #[validate(length(min = 1, max = 1000))]
    pub observaciones: Option<String>,
    /// When the cash moved; defaults to now.
    pub fecha: Option<DateTime<Utc>>,
}

/// Query parameters for listing drawers.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCajasQuery {
    /// Filter by company.
    pub empresa_id: Option<Uuid>,
    /// Filter by branch.
    pub sede_id: Option<Uuid>,
    /// Opened on or after this date (YYYY-MM-DD).
    pub fecha_inicio: Option<NaiveDate>,
    /// Opened on or before this date (YYYY-MM-DD), inclusive.
    pub fecha_fin: Option<NaiveDate>,
}

fn amount_error(err: &DrawerError) -> ValidationError {
    let message = match err {
        DrawerError::Validation { message, .. } => message.clone(),
        other => other.to_string(),
    };
    ValidationError::new("amount").with_message(Cow::Owned(message))
}

fn non_negative_amount(value: &Decimal) -> Result<(), ValidationError> {
    validation::validate_non_negative_amount("amount", *value).map_err(|e| amount_error(&e))
}

fn positive_amount(value: &Decimal) -> Result<(), ValidationError> {
    validation::validate_positive_amount("amount", *value).map_err(|e| amount_error(&e))
}

/// Unwraps a single UUID path parameter.
fn path_id(path: Result<Path<Uuid>, PathRejection>, field: &str) -> Result<Uuid, Response> {
    path.map(|Path(id)| id)
        .map_err(|rejection| path_rejection_response(field, &rejection))
}

/// Unwraps a JSON body and runs its field validators.
fn validated<T: Validate>(payload: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    let Json(body) = payload.map_err(|rejection| json_rejection_response(&rejection))?;
    body.validate().map_err(|errors| validation_response(&errors))?;
    Ok(body)
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/caja/abrir` - Open a drawer for a branch.
async fn abrir_caja(
    State(state): State<AppState>,
    caller: Caller,
    payload: Result<Json<AbrirCajaRequest>, JsonRejection>,
) -> Response {
    let body = match validated(payload) {
        Ok(body) => body,
        Err(response) => return response,
    };

    let Some(opened_by) = caller.or_explicit(body.usuario_id.map(Into::into)) else {
        return missing_field_response("usuarioId", "is required");
    };

    let input = OpenDrawerInput {
        company_id: CompanyId::from_uuid(body.empresa_id),
        branch_id: BranchId::from_uuid(body.sede_id),
        opened_by,
        opening_amount: body.monto_inicial,
        notes: body.observaciones,
    };

    match state.store.open(input).await {
        Ok(session) => (StatusCode::CREATED, Json(session)).into_response(),
        Err(e) => drawer_error_response(&e),
    }
}

/// PATCH `/caja/{id}/cerrar` - Count and close a drawer.
async fn cerrar_caja(
    State(state): State<AppState>,
    caller: Caller,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<CerrarCajaRequest>, JsonRejection>,
) -> Response {
    let id = match path_id(path, "id") {
        Ok(id) => id,
        Err(response) => return response,
    };
    let body = match validated(payload) {
        Ok(body) => body,
        Err(response) => return response,
    };

    let Some(closed_by) = caller.or_explicit(body.usuario_id.map(Into::into)) else {
        return missing_field_response("usuarioId", "is required");
    };

    let input = CloseDrawerInput {
        session_id: DrawerSessionId::from_uuid(id),
        closed_by,
        closing_amount: body.monto_final,
        notes: body.observaciones,
    };

    match state.store.close(input).await {
        Ok(session) => (StatusCode::OK, Json(session)).into_response(),
        Err(e) => drawer_error_response(&e),
    }
}

/// GET `/caja/activa/{sede_id}` - The open drawer of a branch, or `null`.
async fn get_caja_activa(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Response {
    let sede_id = match path_id(path, "sedeId") {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state
        .store
        .find_open_for_branch(BranchId::from_uuid(sede_id))
        .await
    {
        Ok(open) => (StatusCode::OK, Json(open)).into_response(),
        Err(e) => drawer_error_response(&e),
    }
}

/// GET `/caja` - List drawers, newest first.
async fn list_cajas(
    State(state): State<AppState>,
    query: Result<Query<ListCajasQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return query_rejection_response(&rejection),
    };

    let filter = DrawerFilter {
        company_id: query.empresa_id.map(CompanyId::from_uuid),
        branch_id: query.sede_id.map(BranchId::from_uuid),
        ..DrawerFilter::default()
    }
    .with_date_range(query.fecha_inicio, query.fecha_fin);

    let filter = match filter {
        Ok(filter) => filter,
        Err(e) => return drawer_error_response(&e),
    };

    match state.store.list(filter).await {
        Ok(sessions) => (StatusCode::OK, Json(sessions)).into_response(),
        Err(e) => drawer_error_response(&e),
    }
}

/// GET `/caja/{id}` - A drawer with its movements.
async fn get_caja(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Response {
    let id = match path_id(path, "id") {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.store.get_session(DrawerSessionId::from_uuid(id)).await {
        Ok(session) => (StatusCode::OK, Json(session)).into_response(),
        Err(e) => drawer_error_response(&e),
    }
}

/// POST `/caja/movimiento` - Record a movement against an open drawer.
async fn create_movimiento(
    State(state): State<AppState>,
    payload: Result<Json<MovimientoRequest>, JsonRejection>,
) -> Response {
    let body = match validated(payload) {
        Ok(body) => body,
        Err(response) => return response,
    };

    let movement_type = match MovementType::from_str(&body.tipo) {
        Ok(kind) => kind,
        Err(e) => return drawer_error_response(&e),
    };

    let input = RecordMovementInput {
        session_id: DrawerSessionId::from_uuid(body.caja_id),
        movement_type,
        amount: body.monto,
        category: Some(body.concepto),
        description: body.observaciones,
        payment_id: body.pago_id.map(Into::into),
        effective_at: body.fecha,
    };

    match state.store.record_movement(input).await {
        Ok(movement) => (StatusCode::CREATED, Json(movement)).into_response(),
        Err(e) => drawer_error_response(&e),
    }
}

/// GET `/caja/{id}/movimientos` - Movements by effective time.
async fn list_movimientos(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Response {
    let id = match path_id(path, "id") {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state
        .store
        .list_movements(DrawerSessionId::from_uuid(id))
        .await
    {
        Ok(movements) => (StatusCode::OK, Json(movements)).into_response(),
        Err(e) => drawer_error_response(&e),
    }
}

/// GET `/caja/{id}/resumen` - Totals, balance and variance.
async fn get_resumen(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Response {
    let id = match path_id(path, "id") {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.store.summarize(DrawerSessionId::from_uuid(id)).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => drawer_error_response(&e),
    }
}
