use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    entities::{column, task},
    models::task::Task,
};

#[derive(Debug, Error)]
pub enum ColumnError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Column not found")]
    NotFound,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardColumn {
    pub id: i64,
    pub board_id: i64,
    pub name: String,
    pub order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnWithTasks {
    pub id: i64,
    pub board_id: i64,
    pub name: String,
    pub order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateColumn {
    pub board_id: i64,
    pub name: String,
    pub order: i64,
}

/// Partial update; only `Some` fields are applied.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateColumn {
    pub name: Option<String>,
    pub order: Option<i64>,
    pub board_id: Option<i64>,
}

impl ColumnWithTasks {
    pub(crate) fn new(column: BoardColumn, tasks: Vec<Task>) -> Self {
        Self {
            id: column.id,
            board_id: column.board_id,
            name: column.name,
            order: column.order,
            created_at: column.created_at,
            updated_at: column.updated_at,
            tasks,
        }
    }
}

impl BoardColumn {
    pub(crate) fn from_model(model: column::Model) -> Self {
        Self {
            id: model.id,
            board_id: model.board_id,
            name: model.name,
            order: model.order,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }

    /// Columns of one board ascending by `order` (ties by id), each with its
    /// tasks sorted the same way.
    pub async fn find_by_board_with_tasks<C: ConnectionTrait>(
        db: &C,
        board_id: i64,
    ) -> Result<Vec<ColumnWithTasks>, DbErr> {
        let columns = column::Entity::find()
            .filter(column::Column::BoardId.eq(board_id))
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

        Ok(columns
            .into_iter()
            .map(|record| {
                let tasks = tasks_by_column.remove(&record.id).unwrap_or_default();
                ColumnWithTasks::new(Self::from_model(record), tasks)
            })
            .collect())
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i64) -> Result<Option<Self>, DbErr> {
        let record = column::Entity::find_by_id(id).one(db).await?;
        Ok(record.map(Self::from_model))
    }

    pub async fn create<C: ConnectionTrait>(db: &C, data: &CreateColumn) -> Result<Self, DbErr> {
        let now = Utc::now();
        let active = column::ActiveModel {
            board_id: Set(data.board_id),
            name: Set(data.name.clone()),
            order: Set(data.order),
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
        payload: &UpdateColumn,
    ) -> Result<Self, ColumnError> {
        let record = column::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or(ColumnError::NotFound)?;

        let mut active: column::ActiveModel = record.into();
        if let Some(name) = payload.name.clone() {
            active.name = Set(name);
        }
        if let Some(order) = payload.order {
            active.order = Set(order);
        }
        if let Some(board_id) = payload.board_id {
            active.board_id = Set(board_id);
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(db).await.map_err(ColumnError::Database)?;
        Ok(Self::from_model(updated))
    }

    pub async fn delete<C: ConnectionTrait>(db: &C, id: i64) -> Result<u64, DbErr> {
        let result = column::Entity::delete_many()
            .filter(column::Column::Id.eq(id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::board::{Board, CreateBoard},
        test_support::EphemeralDb,
    };

    async fn board_fixture(env: &EphemeralDb) -> Board {
        Board::create(
            &env.db.pool,
            &CreateBoard {
                name: "Sprint".to_string(),
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn listing_returns_only_columns_of_that_board() {
        let env = EphemeralDb::new().await;
        let first = board_fixture(&env).await;
        let second = board_fixture(&env).await;

        BoardColumn::create(
            &env.db.pool,
            &CreateColumn {
                board_id: first.id,
                name: "Mine".to_string(),
                order: 0,
            },
        )
        .await
        .unwrap();
        BoardColumn::create(
            &env.db.pool,
            &CreateColumn {
                board_id: second.id,
                name: "Other".to_string(),
                order: 0,
            },
        )
        .await
        .unwrap();

        let columns = BoardColumn::find_by_board_with_tasks(&env.db.pool, first.id)
            .await
            .unwrap();
        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].name, "Mine");
    }

    #[tokio::test]
    async fn duplicate_orders_fall_back_to_insertion_order() {
        let env = EphemeralDb::new().await;
        let board = board_fixture(&env).await;

        for name in ["A", "B"] {
            BoardColumn::create(
                &env.db.pool,
                &CreateColumn {
                    board_id: board.id,
                    name: name.to_string(),
                    order: 1,
                },
            )
            .await
            .unwrap();
        }

        let columns = BoardColumn::find_by_board_with_tasks(&env.db.pool, board.id)
            .await
            .unwrap();
        let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn partial_update_leaves_absent_fields_alone() {
        let env = EphemeralDb::new().await;
        let board = board_fixture(&env).await;
        let column = BoardColumn::create(
            &env.db.pool,
            &CreateColumn {
                board_id: board.id,
                name: "To Do".to_string(),
                order: 3,
            },
        )
        .await
        .unwrap();

        let updated = BoardColumn::update(
            &env.db.pool,
            column.id,
            &UpdateColumn {
                name: Some("Doing".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.name, "Doing");
        assert_eq!(updated.order, 3);
        assert_eq!(updated.board_id, board.id);
    }

    #[tokio::test]
    async fn reassigning_to_missing_board_hits_the_foreign_key() {
        let env = EphemeralDb::new().await;
        let board = board_fixture(&env).await;
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

        let err = BoardColumn::update(
            &env.db.pool,
            column.id,
            &UpdateColumn {
                board_id: Some(9999),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ColumnError::Database(_)));
    }
}
