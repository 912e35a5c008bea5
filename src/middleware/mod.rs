/// Middleware module
///
/// Route protection and per-request logging.

mod auth_guard;
mod request_logger;

pub use auth_guard::AuthGuard;
pub use request_logger::RequestLogger;
