use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    entities::{board, column, task},
    models::{
        column::{BoardColumn, ColumnWithTasks},
        task::Task,
    },
};

#[derive(Debug, Error)]
pub enum BoardError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Board not found")]
    NotFound,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Board with its columns and their tasks eagerly attached, the shape the
/// board listing endpoints return.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardWithColumns {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub columns: Vec<ColumnWithTasks>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBoard {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBoard {
    pub name: String,
}

impl Board {
    pub(crate) fn from_model(model: board::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }

    /// All boards ascending by id, each with columns ascending by `order`
    /// (ties broken by id) and tasks nested the same way.
    pub async fn find_all_with_columns<C: ConnectionTrait>(
        db: &C,
    ) -> Result<Vec<BoardWithColumns>, DbErr> {
        let boards = board::Entity::find()
            .order_by_asc(board::Column::Id)
            .all(db)
            .await?;
        let board_ids: Vec<i64> = boards.iter().map(|b| b.id).collect();

        let columns = column::Entity::find()
            .filter(column::Column::BoardId.is_in(board_ids))
            .order_by_asc(column::Column::Order)
            .order_by_asc(column::Column::Id)
            .all(db)
            .await?;
        let column_ids: Vec<i64> = columns.iter().map(|c| c.id).collect();

        let tasks = task::Entity::find()
            .filter(task::Column::ColumnId.is_in(column_ids))
            .order_by_asc(task::Column::Order)
            .order_by_asc(task::Column::Id)
            .all(db)
            .await?;

        let mut tasks_by_column: HashMap<i64, Vec<Task>> = HashMap::new();
        for record in tasks {
            tasks_by_column
                .entry(record.column_id)
                .or_default()
                .push(Task::from_model(record));
        }

        let mut columns_by_board: HashMap<i64, Vec<ColumnWithTasks>> = HashMap::new();
        for record in columns {
            let tasks = tasks_by_column.remove(&record.id).unwrap_or_default();
            columns_by_board
                .entry(record.board_id)
                .or_default()
                .push(ColumnWithTasks::new(BoardColumn::from_model(record), tasks));
        }

        Ok(boards
            .into_iter()
            .map(|record| {
                let columns = columns_by_board.remove(&record.id).unwrap_or_default();
                BoardWithColumns {
                    id: record.id,
                    name: record.name,
                    created_at: record.created_at.into(),
                    updated_at: record.updated_at.into(),
                    columns,
                }
            })
            .collect())
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i64) -> Result<Option<Self>, DbErr> {
        let record = board::Entity::find_by_id(id).one(db).await?;
        Ok(record.map(Self::from_model))
    }

    pub async fn find_by_id_with_columns<C: ConnectionTrait>(
        db: &C,
        id: i64,
    ) -> Result<Option<BoardWithColumns>, DbErr> {
        let Some(record) = board::Entity::find_by_id(id).one(db).await? else {
            return Ok(None);
        };
        let columns = BoardColumn::find_by_board_with_tasks(db, record.id).await?;
        Ok(Some(BoardWithColumns {
            id: record.id,
            name: record.name,
            created_at: record.created_at.into(),
            updated_at: record.updated_at.into(),
            columns,
        }))
    }

    pub async fn create<C: ConnectionTrait>(db: &C, data: &CreateBoard) -> Result<Self, DbErr> {
        let now = Utc::now();
        let active = board::ActiveModel {
            name: Set(data.name.clone()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };
        let model = active.insert(db).await?;
        Ok(Self::from_model(model))
    }

    pub async fn update<C: ConnectionTrait>(
        db: &C,
        id: i64,
        payload: &UpdateBoard,
    ) -> Result<Self, BoardError> {
        let record = board::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or(BoardError::NotFound)?;

        let mut active: board::ActiveModel = record.into();
        active.name = Set(payload.name.clone());
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(db).await.map_err(BoardError::Database)?;
        Ok(Self::from_model(updated))
    }

    pub async fn delete<C: ConnectionTrait>(db: &C, id: i64) -> Result<u64, DbErr> {
        let result = board::Entity::delete_many()
            .filter(board::Column::Id.eq(id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{
            column::CreateColumn,
            task::{CreateTask, Task as TaskModel},
        },
        test_support::EphemeralDb,
    };

    #[tokio::test]
    async fn create_assigns_id_and_returns_name() {
        let env = EphemeralDb::new().await;
        let board = Board::create(
            &env.db.pool,
            &CreateBoard {
                name: "Sprint".to_string(),
            },
        )
        .await
        .unwrap();

        assert!(board.id > 0);
        assert_eq!(board.name, "Sprint");
    }

    #[tokio::test]
    async fn update_missing_board_is_not_found() {
        let env = EphemeralDb::new().await;
        let err = Board::update(
            &env.db.pool,
            4242,
            &UpdateBoard {
                name: "Renamed".to_string(),
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, BoardError::NotFound));
    }

    #[tokio::test]
    async fn find_all_with_columns_nests_and_sorts() {
        let env = EphemeralDb::new().await;
        let board = Board::create(
            &env.db.pool,
            &CreateBoard {
                name: "Sprint".to_string(),
            },
        )
        .await
        .unwrap();

        // Insert out of display order; the listing must sort by `order`.
        let done = BoardColumn::create(
            &env.db.pool,
            &CreateColumn {
                board_id: board.id,
                name: "Done".to_string(),
                order: 2,
            },
        )
        .await
        .unwrap();
        let todo = BoardColumn::create(
            &env.db.pool,
            &CreateColumn {
                board_id: board.id,
                name: "To Do".to_string(),
                order: 0,
            },
        )
        .await
        .unwrap();

        TaskModel::create(
            &env.db.pool,
            &CreateTask {
                column_id: todo.id,
                title: "Second".to_string(),
                description: None,
                order: 1,
            },
        )
        .await
        .unwrap();
        TaskModel::create(
            &env.db.pool,
            &CreateTask {
                column_id: todo.id,
                title: "First".to_string(),
                description: None,
                order: 0,
            },
        )
        .await
        .unwrap();

        let boards = Board::find_all_with_columns(&env.db.pool).await.unwrap();
        assert_eq!(boards.len(), 1);
        let names: Vec<&str> = boards[0]
            .columns
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["To Do", "Done"]);

        let todo_tasks: Vec<&str> = boards[0].columns[0]
            .tasks
            .iter()
            .map(|t| t.title.as_str())
            .collect();
        assert_eq!(todo_tasks, vec!["First", "Second"]);
        assert!(boards[0].columns[1].tasks.is_empty());
        let _ = done;
    }

    #[tokio::test]
    async fn delete_cascades_to_columns_and_tasks() {
        let env = EphemeralDb::new().await;
        let board = Board::create(
            &env.db.pool,
            &CreateBoard {
                name: "Sprint".to_string(),
            },
        )
        .await
        .unwrap();
        let column = BoardColumn::create(
            &env.db.pool,
            &CreateColumn {
                board_id: board.id,
                name: "To Do".to_string(),
                order: 0,
            },
        )
        .await
        .unwrap();
        let task = TaskModel::create(
            &env.db.pool,
            &CreateTask {
                column_id: column.id,
                title: "Write spec".to_string(),
                description: None,
                order: 0,
            },
        )
        .await
        .unwrap();

        let rows = Board::delete(&env.db.pool, board.id).await.unwrap();
        assert_eq!(rows, 1);

        assert!(
            BoardColumn::find_by_id(&env.db.pool, column.id)
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            TaskModel::find_by_id(&env.db.pool, task.id)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn delete_missing_board_affects_no_rows() {
        let env = EphemeralDb::new().await;
        let rows = Board::delete(&env.db.pool, 999).await.unwrap();
        assert_eq!(rows, 0);
    }
}
