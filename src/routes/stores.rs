use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::error::AppError;
use crate::repository::{store_name_taken, Store, StoreRepository};
use crate::routes::MessageResponse;
use crate::validators::is_valid_store_name;

#[derive(Serialize)]
pub struct StoreList {
    pub stores: Vec<Store>,
}

/// GET /store/{name}
pub async fn get_store(
    path: web::Path<String>,
    stores: web::Data<dyn StoreRepository>,
) -> Result<HttpResponse, AppError> {
    let name = is_valid_store_name(&path)?;

    let store = stores
        .find_by_name(&name)
        .await?
        .ok_or_else(|| AppError::not_found("Store not found"))?;

    Ok(HttpResponse::Ok().json(store))
}

/// POST /store/{name}
///
/// # Errors
/// - 400: Name already exists
/// - 500: Insert failed
pub async fn create_store(
    path: web::Path<String>,
    stores: web::Data<dyn StoreRepository>,
) -> Result<HttpResponse, AppError> {
    let name = is_valid_store_name(&path)?;

    if stores.find_by_name(&name).await?.is_some() {
        return Err(store_name_taken(&name));
    }

    let store = stores.insert(&name).await?;
    tracing::info!(store_id = %store.id, name = %store.name, "Store created");

    Ok(HttpResponse::Created().json(store))
}

/// DELETE /store/{name}
///
/// Answers the same whether or not the store existed.
pub async fn delete_store(
    path: web::Path<String>,
    stores: web::Data<dyn StoreRepository>,
) -> Result<HttpResponse, AppError> {
    let name = is_valid_store_name(&path)?;

    if stores.delete_by_name(&name).await? {
        tracing::info!(name = %name, "Store deleted");
    }

    Ok(HttpResponse::Ok().json(MessageResponse::new("Store deleted.")))
}

/// GET /stores
pub async fn list_stores(
    stores: web::Data<dyn StoreRepository>,
) -> Result<HttpResponse, AppError> {
    let stores = stores.find_all().await?;
    Ok(HttpResponse::Ok().json(StoreList { stores }))
}
