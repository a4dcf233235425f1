use axum::{
    extract::{Path, State},
    response::Response,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    auth::{Capability, Viewer},
    entities::inventory_transaction,
    errors::ServiceError,
    handlers::common::{created_response, detail_path, Page},
    services::products::{CreateProductRequest, ProductRow},
    ApiResponse, ApiResult, AppState,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductDetail {
    pub product: ProductRow,
    #[schema(value_type = Vec<Object>)]
    pub movements: Vec<inventory_transaction::Model>,
}

#[utoipa::path(
    get,
    path = "/api/v1/products",
    responses(
        (status = 200, description = "Catalogue with stock badges, active first", body = ApiResponse<Page<Vec<ProductRow>>>),
    ),
    security(("Bearer" = [])),
    tag = "products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    viewer: Viewer,
) -> ApiResult<Page<Vec<ProductRow>>> {
    let rows = state
        .services
        .products
        .list()
        .await?
        .into_iter()
        .map(ProductRow::from)
        .collect();
    Ok(Json(ApiResponse::success(Page::new(
        &viewer,
        &[Capability::ManageProducts, Capability::AdjustInventory],
        rows,
    ))))
}

#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created, opening stock booked"),
        (status = 403, description = "Caller cannot manage products", body = crate::errors::ErrorResponse),
        (status = 409, description = "SKU already in use", body = crate::errors::ErrorResponse),
        (status = 400, description = "Validation error", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    viewer: Viewer,
    Json(payload): Json<CreateProductRequest>,
) -> Result<Response, ServiceError> {
    viewer.require(Capability::ManageProducts)?;
    let product = state
        .services
        .products
        .create(payload, Some(viewer.profile_id))
        .await?;
    Ok(created_response(
        detail_path("products", product.id),
        ProductRow::from(product),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product with its stock ledger", body = ApiResponse<Page<ProductDetail>>),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<Uuid>,
) -> ApiResult<Page<ProductDetail>> {
    let product = state.services.products.get(id).await?;
    let movements = state.services.inventory.product_history(id).await?;
    Ok(Json(ApiResponse::success(Page::new(
        &viewer,
        &[Capability::ManageProducts, Capability::AdjustInventory],
        ProductDetail {
            product: product.into(),
            movements,
        },
    ))))
}
