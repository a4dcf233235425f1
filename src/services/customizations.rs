use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use metrics::counter;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    auth::Viewer,
    db::DbPool,
    entities::{
        customization_comment, customization_request, order, order_item, product, profile,
        workflow_step,
    },
    errors::ServiceError,
    lifecycle::{
        note_transition, Badged, CustomizationStatus, Priority, StatusView, WorkflowStepStatus,
    },
};

use super::{db_err, visible_to};

pub const REQUIRED_FIELDS_MESSAGE: &str = "Please fill in all required fields";

/// Steps every new request starts with, in order.
pub const WORKFLOW_TEMPLATE: [&str; 4] = [
    "Initial Review",
    "Design Phase",
    "Approval",
    "Production Setup",
];

/// Free-form specification text is kept as JSON. Anything that does not parse
/// is wrapped as `{"notes": text}`.
pub fn parse_specifications(raw: Option<&str>) -> JsonValue {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => json!({}),
        Some(text) => serde_json::from_str(text).unwrap_or_else(|_| json!({ "notes": text })),
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CreateCustomizationRequest {
    pub order_item_id: Option<Uuid>,
    #[serde(default)]
    pub request_type: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub specifications: Option<String>,
    pub priority: Option<Priority>,
    #[schema(value_type = Option<String>)]
    pub estimated_cost: Option<Decimal>,
    pub estimated_days: Option<i32>,
}

impl CreateCustomizationRequest {
    fn required_fields(&self) -> Result<Uuid, ServiceError> {
        let blank = |s: &str| s.trim().is_empty();
        match self.order_item_id {
            Some(id) if !blank(&self.request_type) && !blank(&self.title) && !blank(&self.description) => Ok(id),
            _ => Err(ServiceError::ValidationError(REQUIRED_FIELDS_MESSAGE.to_string())),
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ReviewCustomizationRequest {
    pub status: String,
    pub review_notes: Option<String>,
    pub assigned_to: Option<Uuid>,
    #[schema(value_type = Option<String>)]
    pub estimated_cost: Option<Decimal>,
    pub estimated_days: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateStepRequest {
    pub status: String,
    pub assigned_to: Option<Uuid>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AddCommentRequest {
    pub comment: String,
    #[serde(default)]
    pub is_internal: bool,
}

/// Order line a customization can be requested for
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EligibleItem {
    pub order_item_id: Uuid,
    pub order_id: Uuid,
    pub order_number: Option<String>,
    pub product_name: String,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CustomizationRow {
    #[schema(value_type = Object)]
    pub request: customization_request::Model,
    pub status: StatusView,
    pub priority: StatusView,
    pub product_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StepView {
    #[schema(value_type = Object)]
    pub step: workflow_step::Model,
    pub status: StatusView,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CommentView {
    #[schema(value_type = Object)]
    pub comment: customization_comment::Model,
    pub author_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CustomizationDetail {
    #[schema(value_type = Object)]
    pub request: customization_request::Model,
    pub status: StatusView,
    pub priority: StatusView,
    #[schema(value_type = Option<Object>)]
    pub order_item: Option<order_item::Model>,
    #[schema(value_type = Option<Object>)]
    pub product: Option<product::Model>,
    #[schema(value_type = Option<Object>)]
    pub order: Option<order::Model>,
    pub steps: Vec<StepView>,
    pub comments: Vec<CommentView>,
}

#[derive(Clone)]
pub struct CustomizationService {
    db_pool: Arc<DbPool>,
}

impl CustomizationService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Pending order lines whose product accepts customization. Clients only
    /// see lines on their own orders.
    #[instrument(skip(self, viewer), fields(profile_id = %viewer.profile_id))]
    pub async fn eligible_items(&self, viewer: &Viewer) -> Result<Vec<EligibleItem>, ServiceError> {
        let db = &*self.db_pool;
        let scope = viewer.scope();
        let rows = order_item::Entity::find()
            .filter(order_item::Column::Status.eq(order_item::PENDING))
            .find_also_related(product::Entity)
            .filter(product::Column::IsCustomizable.eq(true))
            .order_by_desc(order_item::Column::CreatedAt)
            .all(db)
            .await
            .map_err(db_err("Failed to list customizable items"))?;

        let order_ids: Vec<Uuid> = rows.iter().map(|(item, _)| item.order_id).collect();
        let orders: HashMap<Uuid, order::Model> = order::Entity::find()
            .filter(order::Column::Id.is_in(order_ids))
            .all(db)
            .await
            .map_err(db_err("Failed to load orders of customizable items"))?
            .into_iter()
            .map(|o| (o.id, o))
            .collect();

        Ok(rows
            .into_iter()
            .filter_map(|(item, product)| {
                let order = orders.get(&item.order_id)?;
                if !visible_to(scope, order.customer_id) {
                    return None;
                }
                Some(EligibleItem {
                    order_item_id: item.id,
                    order_id: item.order_id,
                    order_number: Some(order.order_number.clone()),
                    product_name: product.map(|p| p.name).unwrap_or_default(),
                    quantity: item.quantity,
                })
            })
            .collect())
    }

    /// Files a request and seeds its four workflow steps atomically.
    #[instrument(skip(self, request, viewer), fields(profile_id = %viewer.profile_id))]
    pub async fn create(
        &self,
        request: CreateCustomizationRequest,
        viewer: &Viewer,
    ) -> Result<customization_request::Model, ServiceError> {
        let order_item_id = request.required_fields()?;

        let txn = self
            .db_pool
            .begin()
            .await
            .map_err(db_err("Failed to start customization transaction"))?;

        let (item, order) = order_item::Entity::find_by_id(order_item_id)
            .find_also_related(order::Entity)
            .one(&txn)
            .await
            .map_err(db_err("Failed to load order item"))?
            .ok_or_else(|| ServiceError::not_found("Order item", order_item_id))?;
        let owned = order
            .as_ref()
            .map(|o| visible_to(viewer.scope(), o.customer_id))
            .unwrap_or(false);
        if !owned {
            return Err(ServiceError::not_found("Order item", order_item_id));
        }

        let created = customization_request::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_item_id: Set(item.id),
            requested_by: Set(viewer.profile_id),
            request_type: Set(request.request_type.trim().to_string()),
            title: Set(request.title.trim().to_string()),
            description: Set(request.description.trim().to_string()),
            specifications: Set(parse_specifications(request.specifications.as_deref())),
            status: Set(CustomizationStatus::Pending.to_string()),
            priority: Set(request.priority.unwrap_or_default().to_string()),
            estimated_cost: Set(request.estimated_cost),
            estimated_days: Set(request.estimated_days),
            assigned_to: Set(None),
            reviewed_by: Set(None),
            review_notes: Set(None),
            approved_at: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(db_err("Failed to insert customization request"))?;

        for (position, name) in WORKFLOW_TEMPLATE.iter().enumerate() {
            workflow_step::ActiveModel {
                id: Set(Uuid::new_v4()),
                customization_request_id: Set(created.id),
                step_name: Set(name.to_string()),
                step_order: Set(position as i32 + 1),
                status: Set(WorkflowStepStatus::Pending.to_string()),
                assigned_to: Set(None),
                notes: Set(None),
                completed_at: Set(None),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(db_err("Failed to insert workflow step"))?;
        }

        txn.commit()
            .await
            .map_err(db_err("Failed to commit customization request"))?;

        counter!("oms.customizations.requested", 1);
        info!(request_id = %created.id, "customization request filed");
        Ok(created)
    }

    /// Staff see every request, clients only their own.
    #[instrument(skip(self, viewer), fields(profile_id = %viewer.profile_id))]
    pub async fn list(&self, viewer: &Viewer) -> Result<Vec<CustomizationRow>, ServiceError> {
        let db = &*self.db_pool;
        let mut query = customization_request::Entity::find();
        if viewer.is_client() {
            query = query.filter(customization_request::Column::RequestedBy.eq(viewer.profile_id));
        }
        let requests = query
            .order_by_desc(customization_request::Column::CreatedAt)
            .all(db)
            .await
            .map_err(db_err("Failed to list customization requests"))?;

        let item_ids: Vec<Uuid> = requests.iter().map(|r| r.order_item_id).collect();
        let items = order_item::Entity::find()
            .filter(order_item::Column::Id.is_in(item_ids))
            .find_also_related(product::Entity)
            .all(db)
            .await
            .map_err(db_err("Failed to load customized items"))?;
        let names: HashMap<Uuid, String> = items
            .into_iter()
            .filter_map(|(item, product)| product.map(|p| (item.id, p.name)))
            .collect();

        Ok(requests
            .into_iter()
            .map(|request| CustomizationRow {
                status: request.status_view(),
                priority: request.priority_view(),
                product_name: names.get(&request.order_item_id).cloned(),
                request,
            })
            .collect())
    }

    async fn load_for(
        &self,
        request_id: Uuid,
        viewer: &Viewer,
    ) -> Result<customization_request::Model, ServiceError> {
        customization_request::Entity::find_by_id(request_id)
            .one(&*self.db_pool)
            .await
            .map_err(db_err("Failed to load customization request"))?
            .filter(|r| !viewer.is_client() || r.requested_by == viewer.profile_id)
            .ok_or_else(|| ServiceError::not_found("Customization request", request_id))
    }

    #[instrument(skip(self, viewer), fields(profile_id = %viewer.profile_id))]
    pub async fn detail(
        &self,
        request_id: Uuid,
        viewer: &Viewer,
    ) -> Result<CustomizationDetail, ServiceError> {
        let db = &*self.db_pool;
        let request = self.load_for(request_id, viewer).await?;

        let mut comments_query = customization_comment::Entity::find()
            .filter(customization_comment::Column::CustomizationRequestId.eq(request.id));
        if viewer.is_client() {
            comments_query = comments_query.filter(customization_comment::Column::IsInternal.eq(false));
        }

        let (item, steps, comments) = tokio::try_join!(
            order_item::Entity::find_by_id(request.order_item_id)
                .find_also_related(product::Entity)
                .one(db),
            workflow_step::Entity::find()
                .filter(workflow_step::Column::CustomizationRequestId.eq(request.id))
                .order_by_asc(workflow_step::Column::StepOrder)
                .all(db),
            comments_query
                .find_also_related(profile::Entity)
                .order_by_asc(customization_comment::Column::CreatedAt)
                .all(db),
        )
        .map_err(db_err("Failed to load customization detail"))?;

        let (order_item, product) = match item {
            Some((item, product)) => (Some(item), product),
            None => (None, None),
        };
        let order = match order_item.as_ref() {
            Some(item) => order::Entity::find_by_id(item.order_id)
                .one(db)
                .await
                .map_err(db_err("Failed to load customized order"))?,
            None => None,
        };

        Ok(CustomizationDetail {
            status: request.status_view(),
            priority: request.priority_view(),
            steps: steps
                .into_iter()
                .map(|step| StepView {
                    status: step.status_view(),
                    step,
                })
                .collect(),
            comments: comments
                .into_iter()
                .map(|(comment, author)| CommentView {
                    author_name: author.map(|a| a.full_name.unwrap_or(a.email)),
                    comment,
                })
                .collect(),
            request,
            order_item,
            product,
            order,
        })
    }

    /// Records a review decision. Approval stamps `approved_at`.
    #[instrument(skip(self, review, reviewer), fields(new_status = %review.status))]
    pub async fn review(
        &self,
        request_id: Uuid,
        review: ReviewCustomizationRequest,
        reviewer: Uuid,
    ) -> Result<customization_request::Model, ServiceError> {
        let next = CustomizationStatus::parse(&review.status)?;
        let request = customization_request::Entity::find_by_id(request_id)
            .one(&*self.db_pool)
            .await
            .map_err(db_err("Failed to load customization request"))?
            .ok_or_else(|| ServiceError::not_found("Customization request", request_id))?;

        note_transition(request.id, &request.status, next);
        let mut active: customization_request::ActiveModel = request.into();
        active.status = Set(next.to_string());
        active.reviewed_by = Set(Some(reviewer));
        active.review_notes = Set(review.review_notes.filter(|n| !n.trim().is_empty()));
        if let Some(assignee) = review.assigned_to {
            active.assigned_to = Set(Some(assignee));
        }
        if let Some(cost) = review.estimated_cost {
            active.estimated_cost = Set(Some(cost));
        }
        if let Some(days) = review.estimated_days {
            active.estimated_days = Set(Some(days));
        }
        if next == CustomizationStatus::Approved {
            active.approved_at = Set(Some(Utc::now()));
        }

        active
            .update(&*self.db_pool)
            .await
            .map_err(db_err("Failed to update customization request"))
    }

    /// Updates one workflow step. Clients only reach steps of requests they filed.
    #[instrument(skip(self, update, viewer), fields(new_status = %update.status))]
    pub async fn update_step(
        &self,
        step_id: Uuid,
        update: UpdateStepRequest,
        viewer: &Viewer,
    ) -> Result<workflow_step::Model, ServiceError> {
        let next = WorkflowStepStatus::parse(&update.status)?;
        let step = workflow_step::Entity::find_by_id(step_id)
            .one(&*self.db_pool)
            .await
            .map_err(db_err("Failed to load workflow step"))?
            .ok_or_else(|| ServiceError::not_found("Workflow step", step_id))?;
        match self.load_for(step.customization_request_id, viewer).await {
            Err(ServiceError::NotFound(_)) => {
                return Err(ServiceError::not_found("Workflow step", step_id))
            }
            other => other?,
        };

        note_transition(step.id, &step.status, next);
        let mut active: workflow_step::ActiveModel = step.into();
        active.status = Set(next.to_string());
        if let Some(assignee) = update.assigned_to {
            active.assigned_to = Set(Some(assignee));
        }
        if let Some(notes) = update.notes.filter(|n| !n.trim().is_empty()) {
            active.notes = Set(Some(notes));
        }
        active.completed_at = Set((next == WorkflowStepStatus::Completed).then(Utc::now));

        active
            .update(&*self.db_pool)
            .await
            .map_err(db_err("Failed to update workflow step"))
    }

    /// Appends a comment. Clients may only comment on their own requests and
    /// never internally.
    #[instrument(skip(self, request, viewer), fields(profile_id = %viewer.profile_id))]
    pub async fn add_comment(
        &self,
        request_id: Uuid,
        request: AddCommentRequest,
        viewer: &Viewer,
    ) -> Result<customization_comment::Model, ServiceError> {
        let text = request.comment.trim();
        if text.is_empty() {
            return Err(ServiceError::ValidationError("Comment cannot be empty".to_string()));
        }
        if request.is_internal && viewer.is_client() {
            return Err(ServiceError::Forbidden(
                "Internal comments are limited to staff".to_string(),
            ));
        }
        let target = self.load_for(request_id, viewer).await?;

        customization_comment::ActiveModel {
            id: Set(Uuid::new_v4()),
            customization_request_id: Set(target.id),
            author_id: Set(viewer.profile_id),
            comment: Set(text.to_string()),
            is_internal: Set(request.is_internal),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db_pool)
        .await
        .map_err(db_err("Failed to insert comment"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_has_four_ordered_steps() {
        assert_eq!(WORKFLOW_TEMPLATE.len(), 4);
        assert_eq!(WORKFLOW_TEMPLATE[0], "Initial Review");
        assert_eq!(WORKFLOW_TEMPLATE[3], "Production Setup");
    }

    #[test]
    fn specifications_fall_back_to_notes() {
        assert_eq!(
            parse_specifications(Some(r#"{"color":"red"}"#)),
            json!({"color": "red"})
        );
        assert_eq!(
            parse_specifications(Some("engrave initials")),
            json!({"notes": "engrave initials"})
        );
        assert_eq!(parse_specifications(Some("   ")), json!({}));
        assert_eq!(parse_specifications(None), json!({}));
    }

    #[test]
    fn missing_fields_use_the_form_message() {
        let empty = CreateCustomizationRequest::default();
        match empty.required_fields() {
            Err(ServiceError::ValidationError(msg)) => assert_eq!(msg, REQUIRED_FIELDS_MESSAGE),
            other => panic!("unexpected: {other:?}"),
        }

        let complete = CreateCustomizationRequest {
            order_item_id: Some(Uuid::new_v4()),
            request_type: "engraving".into(),
            title: "Logo".into(),
            description: "Laser-etched logo".into(),
            ..Default::default()
        };
        assert!(complete.required_fields().is_ok());
    }
}
