use axum::{
    Extension, Json, Router,
    extract::{Query, State},
    http::StatusCode,
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::{get, patch},
};
use db::models::column::{BoardColumn, ColumnWithTasks, CreateColumn, UpdateColumn};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    AppState,
    error::ApiError,
    middleware::load_column_middleware,
    routes::{Deleted, params},
};

#[derive(Debug, Deserialize)]
pub struct ColumnQuery {
    #[serde(rename = "boardId")]
    pub board_id: Option<String>,
}

pub async fn get_columns(
    State(state): State<AppState>,
    Query(query): Query<ColumnQuery>,
) -> Result<ResponseJson<Vec<ColumnWithTasks>>, ApiError> {
    let board_id = query
        .board_id
        .as_deref()
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .ok_or_else(|| ApiError::BadRequest("boardId is required".to_string()))?;

    let columns = BoardColumn::find_by_board_with_tasks(&state.db().pool, board_id).await?;
    Ok(ResponseJson(columns))
}

pub async fn create_column(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, ResponseJson<BoardColumn>), ApiError> {
    let board_id = params::require_id_field(&body, "boardId")?;
    let name = params::require_string_field(&body, "name")?;
    let order = params::order_field(&body, "order").unwrap_or(0);

    let column = BoardColumn::create(
        &state.db().pool,
        &CreateColumn {
            board_id,
            name,
            order,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, ResponseJson(column)))
}

pub async fn update_column(
    Extension(existing): Extension<BoardColumn>,
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<ResponseJson<BoardColumn>, ApiError> {
    // Wrong-shaped optional fields are dropped rather than rejected.
    let payload = UpdateColumn {
        name: params::string_field(&body, "name"),
        order: params::order_field(&body, "order"),
        board_id: params::id_field(&body, "boardId"),
    };

    let column = BoardColumn::update(&state.db().pool, existing.id, &payload).await?;
    Ok(ResponseJson(column))
}

pub async fn delete_column(
    Extension(column): Extension<BoardColumn>,
    State(state): State<AppState>,
) -> Result<ResponseJson<Deleted>, ApiError> {
    let rows_affected = BoardColumn::delete(&state.db().pool, column.id).await?;

    if rows_affected == 0 {
        return Err(ApiError::NotFound("Column not found".to_string()));
    }

    Ok(ResponseJson(Deleted::ok()))
}

pub fn router(state: &AppState) -> Router<AppState> {
    let column_id_router = Router::new()
        .route("/", patch(update_column).delete(delete_column))
        .layer(from_fn_with_state(state.clone(), load_column_middleware));

    let columns_router = Router::new()
        .route("/", get(get_columns).post(create_column))
        .nest("/{id}", column_id_router);

    Router::new().nest("/columns", columns_router)
}
