/// In-memory repositories for tests and the `memory` storage backend

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use uuid::Uuid;

use super::{store_name_taken, username_taken, Store, StoreRepository, User, UserRepository};
use crate::error::AppError;

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let users = self.users.read().unwrap_or_else(PoisonError::into_inner);
        Ok(users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let users = self.users.read().unwrap_or_else(PoisonError::into_inner);
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn insert(&self, username: &str, password_hash: &str) -> Result<User, AppError> {
        // Check and insert under one write lock, like a unique index
        let mut users = self.users.write().unwrap_or_else(PoisonError::into_inner);
        if users.values().any(|u| u.username == username) {
            return Err(username_taken());
        }

        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut users = self.users.write().unwrap_or_else(PoisonError::into_inner);
        Ok(users.remove(&id).is_some())
    }
}

#[derive(Default)]
pub struct InMemoryStoreRepository {
    stores: RwLock<HashMap<String, Store>>,
}

impl InMemoryStoreRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StoreRepository for InMemoryStoreRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<Store>, AppError> {
        let stores = self.stores.read().unwrap_or_else(PoisonError::into_inner);
        Ok(stores.get(name).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Store>, AppError> {
        let stores = self.stores.read().unwrap_or_else(PoisonError::into_inner);
        let mut all: Vec<Store> = stores.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn insert(&self, name: &str) -> Result<Store, AppError> {
        let mut stores = self.stores.write().unwrap_or_else(PoisonError::into_inner);
        if stores.contains_key(name) {
            return Err(store_name_taken(name));
        }

        let store = Store {
            id: Uuid::new_v4(),
            name: name.to_string(),
        };
        stores.insert(store.name.clone(), store.clone());
        Ok(store)
    }

    async fn delete_by_name(&self, name: &str) -> Result<bool, AppError> {
        let mut stores = self.stores.write().unwrap_or_else(PoisonError::into_inner);
        Ok(stores.remove(name).is_some())
    }
}
