use std::net::TcpListener;
use std::time::Duration;
use storekeeper::auth::{spawn_blacklist_sweeper, AuthService};
use storekeeper::configuration::get_configuration;
use storekeeper::startup::{run, Storage};
use storekeeper::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let configuration = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "Configuration error")
    })?;

    init_telemetry(&configuration.application.log_level);
    tracing::info!(
        storage = ?configuration.application.storage,
        "Configuration loaded successfully"
    );

    let storage = Storage::build(configuration.application.storage, &configuration.database)
        .await
        .map_err(|e| {
            tracing::error!("Failed to initialise storage: {}", e);
            std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "Storage error")
        })?;
    tracing::info!("Storage ready");

    let auth = AuthService::new(
        storage.users.clone(),
        storage.revocations.clone(),
        configuration.jwt.clone(),
        configuration.password.hash_cost,
    )
    .map_err(|e| {
        tracing::error!("Failed to build auth service: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "Auth configuration error")
    })?;

    let _sweeper = spawn_blacklist_sweeper(
        storage.revocations.clone(),
        Duration::from_secs(configuration.blacklist.sweep_interval_secs.max(1)),
    );

    let address = configuration.application.address();
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Server listening on: {}", address);

    let server = run(listener, storage, auth, configuration.password.clone())?;
    server.await
}
