use actix_web::{dev::Server, middleware::Logger, web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::{AuthService, InMemoryBlacklist, PgBlacklist, RevocationStore};
use crate::configuration::{DatabaseSettings, PasswordSettings, StorageBackend};
use crate::error::{AppError, ValidationError};
use crate::middleware::{AuthGuard, RequestLogger};
use crate::repository::memory::{InMemoryStoreRepository, InMemoryUserRepository};
use crate::repository::{PgStoreRepository, PgUserRepository, StoreRepository, UserRepository};
use crate::routes::{
    create_store, delete_store, get_store, get_user, delete_user, health_check, list_stores, login,
    logout, refresh, register,
};

/// Backends the handlers and the auth service run against
#[derive(Clone)]
pub struct Storage {
    pub users: Arc<dyn UserRepository>,
    pub stores: Arc<dyn StoreRepository>,
    pub revocations: Arc<dyn RevocationStore>,
}

impl Storage {
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            stores: Arc::new(InMemoryStoreRepository::new()),
            revocations: Arc::new(InMemoryBlacklist::new()),
        }
    }

    /// Connect to Postgres and bring the schema up to date
    pub async fn postgres(config: &DatabaseSettings) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.connection_string())
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AppError::Internal(format!("Migration failed: {}", e)))?;

        Ok(Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            stores: Arc::new(PgStoreRepository::new(pool.clone())),
            revocations: Arc::new(PgBlacklist::new(pool)),
        })
    }

    pub async fn build(backend: StorageBackend, config: &DatabaseSettings) -> Result<Self, AppError> {
        match backend {
            StorageBackend::Memory => Ok(Self::in_memory()),
            StorageBackend::Postgres => Self::postgres(config).await,
        }
    }
}

pub fn run(
    listener: TcpListener,
    storage: Storage,
    auth: AuthService,
    password_settings: PasswordSettings,
) -> Result<Server, std::io::Error> {
    let users = web::Data::from(storage.users);
    let stores = web::Data::from(storage.stores);
    let auth = web::Data::new(auth);
    let password_settings = web::Data::new(password_settings);

    let server = HttpServer::new(move || {
        App::new()
            // Global middleware
            .wrap(Logger::default())
            .wrap(RequestLogger)

            // Shared state
            .app_data(users.clone())
            .app_data(stores.clone())
            .app_data(auth.clone())
            .app_data(password_settings.clone())
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                tracing::debug!(error = %err, "Rejected request body");
                AppError::Validation(ValidationError::InvalidFormat("request body".to_string()))
                    .into()
            }))

            .route("/health_check", web::get().to(health_check))

            // Resources
            .service(
                web::resource("/store/{name}")
                    .route(web::get().to(get_store))
                    .route(web::post().to(create_store))
                    .route(web::delete().to(delete_store)),
            )
            .route("/stores", web::get().to(list_stores))
            .route("/register", web::post().to(register))
            .service(
                web::resource("/user/{id}")
                    .route(web::get().to(get_user))
                    .route(web::delete().to(delete_user)),
            )

            // Authentication
            .route("/login", web::post().to(login))
            .service(
                web::resource("/logout")
                    .wrap(AuthGuard::access(auth.clone()))
                    .route(web::post().to(logout)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(AuthGuard::refresh(auth.clone()))
                    .route(web::post().to(refresh)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
