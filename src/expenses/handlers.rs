use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::AuthUser,
    error::ApiResult,
    expenses::{
        dto::{CreateExpenseRequest, ListQuery, MessageResponse, SummaryResponse, UpdateExpenseRequest},
        repo_types::Expense,
        services,
    },
    state::AppState,
};

pub fn expense_routes() -> Router<AppState> {
    Router::new()
        .route("/expenses", get(list_expenses).post(create_expense))
        .route("/expenses/summary", get(get_summary))
        .route("/expenses/:id", put(update_expense).delete(delete_expense))
}

#[instrument(skip(state))]
pub async fn list_expenses(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Expense>>> {
    let Query(query) = query?;
    let expenses = services::list(state.expenses.as_ref(), user_id, query).await?;
    Ok(Json(expenses))
}

#[instrument(skip(state, payload))]
pub async fn create_expense(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<CreateExpenseRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Expense>)> {
    let Json(payload) = payload?;
    let expense = services::create(state.expenses.as_ref(), user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

#[instrument(skip(state, payload))]
pub async fn update_expense(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    id: Result<Path<String>, PathRejection>,
    payload: Result<Json<UpdateExpenseRequest>, JsonRejection>,
) -> ApiResult<Json<Expense>> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    let expense = services::update(state.expenses.as_ref(), user_id, &id, payload).await?;
    Ok(Json(expense))
}

#[instrument(skip(state))]
pub async fn delete_expense(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    id: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Path(id) = id?;
    services::delete(state.expenses.as_ref(), user_id, &id).await?;
    Ok(Json(MessageResponse {
        message: "Expense deleted successfully".into(),
    }))
}

#[instrument(skip(state))]
pub async fn get_summary(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<SummaryResponse>> {
    let summary = services::summary(state.expenses.as_ref(), user_id).await?;
    Ok(Json(summary))
}
