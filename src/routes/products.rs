use crate::{
    auth::AuthenticatedUser,
    config::MutationPolicy,
    error::AppError,
    filter::{FilterQuery, ProductFilter},
    models::{Product, ProductInput, ProductUpdate},
    state::AppState,
    uploads::{read_product_form, ProductForm},
};
use actix_multipart::Multipart;
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde_json::json;
use uuid::Uuid;

const NOT_FOUND: &str = "Product not found.";

/// Lists every product.
///
/// ## Responses:
/// - `200 OK`: JSON array of products, in the store's default order.
#[get("")]
pub async fn list_products(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let products = state.store.list_products(&ProductFilter::default()).await?;
    Ok(HttpResponse::Ok().json(products))
}

/// Lists products matching optional price bounds and availability.
///
/// ## Query Parameters:
/// - `minPrice` (optional): only products with `price >= minPrice`.
/// - `maxPrice` (optional): only products with `price <= maxPrice`.
/// - `available` (optional): `true` for products in stock, any other value for sold-out ones.
///
/// ## Responses:
/// - `200 OK`: JSON array of matching products. No parameters means every product.
/// - `400 Bad Request`: a price bound is not a number.
#[get("/filter")]
pub async fn filter_products(
    state: web::Data<AppState>,
    query: web::Query<FilterQuery>,
) -> Result<impl Responder, AppError> {
    let filter = query.into_inner().into_filter()?;
    let products = state.store.list_products(&filter).await?;
    Ok(HttpResponse::Ok().json(products))
}

/// Creates a product from a multipart form.
///
/// ## Request Body (multipart/form-data):
/// - `image`: the product picture (required).
/// - `name`, `price`, `description`, `quantity`: required text fields.
/// - `farmerId` (optional): owning user; defaults to the caller.
///
/// ## Responses:
/// - `201 Created`: `{message, product}`.
/// - `400 Bad Request`: no image, or a missing or invalid field. Nothing is stored.
/// - `401 Unauthorized`: no valid bearer token.
#[post("")]
pub async fn create_product(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    payload: Multipart,
) -> Result<impl Responder, AppError> {
    let ProductForm { fields, image } = read_product_form(payload, state.max_image_bytes).await?;
    let image = image.ok_or_else(|| AppError::ValidationError("Image is required.".into()))?;
    let input = ProductInput::from_fields(&fields)?;
    let farmer_id = input.farmer_id.unwrap_or(user.id);

    let image_url = state.images.save(image).await?;
    let product = state
        .store
        .insert_product(Product::new(input, image_url, farmer_id))
        .await?;

    log::info!("user {} created product {}", user.id, product.id);
    Ok(HttpResponse::Created().json(json!({
        "message": "Product created successfully",
        "product": product
    })))
}

/// Retrieves a product by id.
///
/// ## Responses:
/// - `200 OK`: the product.
/// - `404 Not Found`: no product has this id.
#[get("/{id}")]
pub async fn get_product(
    state: web::Data<AppState>,
    product_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let product = state
        .store
        .find_product(product_id.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))?;
    Ok(HttpResponse::Ok().json(product))
}

/// Partially updates a product from a multipart form.
///
/// Only the fields present in the form change. `imageUrl` is replaced only
/// when a new `image` part is attached.
///
/// ## Responses:
/// - `200 OK`: `{message, product}`.
/// - `400 Bad Request`: an invalid field.
/// - `401 Unauthorized`: no valid bearer token.
/// - `403 Forbidden`: the owner-only policy is active and the caller is not the owner.
/// - `404 Not Found`: no product has this id.
#[put("/{id}")]
pub async fn update_product(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    product_id: web::Path<Uuid>,
    payload: Multipart,
) -> Result<impl Responder, AppError> {
    let product_id = product_id.into_inner();
    let ProductForm { fields, image } = read_product_form(payload, state.max_image_bytes).await?;
    let update = ProductUpdate::from_fields(&fields)?;

    let existing = state
        .store
        .find_product(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))?;
    ensure_may_mutate(state.mutation_policy, &user, &existing)?;

    let image_url = match image {
        Some(image) => Some(state.images.save(image).await?),
        None => None,
    };

    let product = state
        .store
        .update_product(product_id, update.into_changes(image_url))
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))?;

    log::info!("user {} updated product {}", user.id, product.id);
    Ok(HttpResponse::Ok().json(json!({
        "message": "Product updated successfully",
        "product": product
    })))
}

/// Deletes a product.
///
/// ## Responses:
/// - `200 OK`: `{message}`.
/// - `401 Unauthorized`: no valid bearer token.
/// - `403 Forbidden`: the owner-only policy is active and the caller is not the owner.
/// - `404 Not Found`: no product has this id; nothing changes.
#[delete("/{id}")]
pub async fn delete_product(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    product_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let product_id = product_id.into_inner();

    if state.mutation_policy == MutationPolicy::OwnerOnly {
        let existing = state
            .store
            .find_product(product_id)
            .await?
            .ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))?;
        ensure_may_mutate(state.mutation_policy, &user, &existing)?;
    }

    if !state.store.delete_product(product_id).await? {
        return Err(AppError::NotFound(NOT_FOUND.into()));
    }

    log::info!("user {} deleted product {}", user.id, product_id);
    Ok(HttpResponse::Ok().json(json!({
        "message": "Product deleted successfully."
    })))
}

fn ensure_may_mutate(
    policy: MutationPolicy,
    user: &AuthenticatedUser,
    product: &Product,
) -> Result<(), AppError> {
    match policy {
        MutationPolicy::AnyAuthenticated => Ok(()),
        MutationPolicy::OwnerOnly if product.farmer_id == user.id => Ok(()),
        MutationPolicy::OwnerOnly => Err(AppError::Forbidden(
            "Only the owning farmer may modify this product.".into(),
        )),
    }
}
