use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::board::{Board, BoardError, BoardWithColumns, CreateBoard, UpdateBoard};
use serde_json::Value;

use crate::{
    AppState,
    error::ApiError,
    middleware::load_board_middleware,
    routes::{Deleted, params},
};

pub async fn get_boards(
    State(state): State<AppState>,
) -> Result<ResponseJson<Vec<BoardWithColumns>>, ApiError> {
    let boards = Board::find_all_with_columns(&state.db().pool).await?;
    Ok(ResponseJson(boards))
}

pub async fn create_board(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, ResponseJson<Board>), ApiError> {
    let name = params::require_string_field(&body, "name")?;
    tracing::debug!("Creating board '{}'", name);

    let board = Board::create(&state.db().pool, &CreateBoard { name }).await?;
    Ok((StatusCode::CREATED, ResponseJson(board)))
}

pub async fn get_board(
    Extension(board): Extension<Board>,
    State(state): State<AppState>,
) -> Result<ResponseJson<BoardWithColumns>, ApiError> {
    let board = Board::find_by_id_with_columns(&state.db().pool, board.id)
        .await?
        .ok_or(BoardError::NotFound)?;
    Ok(ResponseJson(board))
}

pub async fn update_board(
    Extension(existing): Extension<Board>,
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<ResponseJson<Board>, ApiError> {
    let name = params::require_string_field(&body, "name")?;
    let board = Board::update(&state.db().pool, existing.id, &UpdateBoard { name }).await?;
    Ok(ResponseJson(board))
}

pub async fn delete_board(
    Extension(board): Extension<Board>,
    State(state): State<AppState>,
) -> Result<ResponseJson<Deleted>, ApiError> {
    let rows_affected = Board::delete(&state.db().pool, board.id).await?;

    if rows_affected == 0 {
        return Err(ApiError::NotFound("Board not found".to_string()));
    }

    Ok(ResponseJson(Deleted::ok()))
}

pub fn router(state: &AppState) -> Router<AppState> {
    let board_id_router = Router::new()
        .route(
            "/",
            get(get_board).patch(update_board).delete(delete_board),
        )
        .layer(from_fn_with_state(state.clone(), load_board_middleware));

    let boards_router = Router::new()
        .route("/", get(get_boards).post(create_board))
        .nest("/{id}", board_id_router);

    Router::new().nest("/boards", boards_router)
}
