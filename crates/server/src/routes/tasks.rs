use axum::{
    Extension, Json, Router,
    extract::{Query, State},
    http::StatusCode,
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::{get, patch},
};
use db::models::task::{CreateTask, Task, UpdateTask};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    AppState,
    error::ApiError,
    middleware::load_task_middleware,
    routes::{Deleted, params},
};

#[derive(Debug, Deserialize)]
pub struct TaskQuery {
    #[serde(rename = "columnId")]
    pub column_id: Option<String>,
}

pub async fn get_tasks(
    State(state): State<AppState>,
    Query(query): Query<TaskQuery>,
) -> Result<ResponseJson<Vec<Task>>, ApiError> {
    let column_id = query
        .column_id
        .as_deref()
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .ok_or_else(|| ApiError::BadRequest("columnId is required".to_string()))?;

    let tasks = Task::find_by_column(&state.db().pool, column_id).await?;
    Ok(ResponseJson(tasks))
}

pub async fn create_task(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, ResponseJson<Task>), ApiError> {
    let column_id = params::require_id_field(&body, "columnId")?;
    let title = params::require_string_field(&body, "title")?;
    let description = params::raw_string_field(&body, "description");
    let order = params::order_field(&body, "order").unwrap_or(0);

    tracing::debug!("Creating task '{}' in column {}", title, column_id);

    let task = Task::create(
        &state.db().pool,
        &CreateTask {
            column_id,
            title,
            description,
            order,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, ResponseJson(task)))
}

pub async fn update_task(
    Extension(existing): Extension<Task>,
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<ResponseJson<Task>, ApiError> {
    // Wrong-shaped optional fields are dropped rather than rejected.
    let payload = UpdateTask {
        title: params::string_field(&body, "title"),
        description: params::raw_string_field(&body, "description"),
        order: params::order_field(&body, "order"),
        column_id: params::id_field(&body, "columnId"),
    };

    let task = Task::update(&state.db().pool, existing.id, &payload).await?;
    Ok(ResponseJson(task))
}

pub async fn delete_task(
    Extension(task): Extension<Task>,
    State(state): State<AppState>,
) -> Result<ResponseJson<Deleted>, ApiError> {
    let rows_affected = Task::delete(&state.db().pool, task.id).await?;

    if rows_affected == 0 {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    Ok(ResponseJson(Deleted::ok()))
}

pub fn router(state: &AppState) -> Router<AppState> {
    let task_id_router = Router::new()
        .route("/", patch(update_task).delete(delete_task))
        .layer(from_fn_with_state(state.clone(), load_task_middleware));

    let tasks_router = Router::new()
        .route("/", get(get_tasks).post(create_task))
        .nest("/{id}", task_id_router);

    Router::new().nest("/tasks", tasks_router)
}
