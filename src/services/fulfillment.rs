use std::sync::Arc;

use chrono::Utc;
use metrics::counter;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::{fulfillment_task, order},
    errors::ServiceError,
    lifecycle::{note_transition, Badged, FulfillmentTaskStatus, StatusView},
};

use super::db_err;

/// Warehouse step a task stands for
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema,
    Display, EnumString, AsRefStr, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TaskType {
    Pick,
    Pack,
    QualityCheck,
    Label,
    Ship,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateTaskRequest {
    pub order_id: Uuid,
    pub task_type: TaskType,
    /// Lower runs first
    #[serde(default = "default_priority")]
    #[validate(range(min = 0, message = "Priority cannot be negative"))]
    pub priority: i32,
    pub assigned_to: Option<Uuid>,
    pub notes: Option<String>,
}

fn default_priority() -> i32 {
    5
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateTaskStatusRequest {
    pub status: String,
    pub assigned_to: Option<Uuid>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TaskRow {
    #[schema(value_type = Object)]
    pub task: fulfillment_task::Model,
    pub status: StatusView,
    pub order_number: Option<String>,
}

#[derive(Clone)]
pub struct FulfillmentService {
    db_pool: Arc<DbPool>,
}

impl FulfillmentService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Work queue: priority ascending, oldest first within a priority.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<TaskRow>, ServiceError> {
        let rows = fulfillment_task::Entity::find()
            .find_also_related(order::Entity)
            .order_by_asc(fulfillment_task::Column::Priority)
            .order_by_asc(fulfillment_task::Column::CreatedAt)
            .all(&*self.db_pool)
            .await
            .map_err(db_err("Failed to list fulfillment tasks"))?;

        Ok(rows
            .into_iter()
            .map(|(task, order)| TaskRow {
                status: task.status_view(),
                order_number: order.map(|o| o.order_number),
                task,
            })
            .collect())
    }

    #[instrument(skip(self, request), fields(order_id = %request.order_id, task_type = %request.task_type))]
    pub async fn create_task(
        &self,
        request: CreateTaskRequest,
    ) -> Result<fulfillment_task::Model, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;

        let known = order::Entity::find()
            .filter(order::Column::Id.eq(request.order_id))
            .one(db)
            .await
            .map_err(db_err("Failed to load order for task"))?;
        if known.is_none() {
            return Err(ServiceError::not_found("Order", request.order_id));
        }

        let task = fulfillment_task::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(request.order_id),
            task_type: Set(request.task_type.to_string()),
            status: Set(FulfillmentTaskStatus::Pending.to_string()),
            priority: Set(request.priority),
            assigned_to: Set(request.assigned_to),
            notes: Set(request.notes.filter(|n| !n.trim().is_empty())),
            completed_at: Set(None),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(db_err("Failed to insert fulfillment task"))?;

        counter!("oms.fulfillment.tasks_created", 1, "task_type" => task.task_type.clone());
        info!(task_id = %task.id, "fulfillment task created");
        Ok(task)
    }

    #[instrument(skip(self, update), fields(new_status = %update.status))]
    pub async fn update_status(
        &self,
        task_id: Uuid,
        update: UpdateTaskStatusRequest,
    ) -> Result<fulfillment_task::Model, ServiceError> {
        let next = FulfillmentTaskStatus::parse(&update.status)?;
        let task = fulfillment_task::Entity::find_by_id(task_id)
            .one(&*self.db_pool)
            .await
            .map_err(db_err("Failed to load fulfillment task"))?
            .ok_or_else(|| ServiceError::not_found("Fulfillment task", task_id))?;

        note_transition(task.id, &task.status, next);
        let mut active: fulfillment_task::ActiveModel = task.into();
        active.status = Set(next.to_string());
        if let Some(assignee) = update.assigned_to {
            active.assigned_to = Set(Some(assignee));
        }
        if let Some(notes) = update.notes.filter(|n| !n.trim().is_empty()) {
            active.notes = Set(Some(notes));
        }
        active.completed_at = Set((next == FulfillmentTaskStatus::Completed).then(Utc::now));

        active
            .update(&*self.db_pool)
            .await
            .map_err(db_err("Failed to update fulfillment task"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn task_types_use_snake_case() {
        assert_eq!(TaskType::QualityCheck.to_string(), "quality_check");
        assert_eq!(TaskType::from_str("label").ok(), Some(TaskType::Label));
    }

    #[test]
    fn priority_defaults_when_omitted() {
        let parsed: CreateTaskRequest = serde_json::from_value(serde_json::json!({
            "order_id": Uuid::nil(),
            "task_type": "pick"
        }))
        .unwrap();
        assert_eq!(parsed.priority, 5);
        assert_eq!(parsed.task_type, TaskType::Pick);
    }
}
