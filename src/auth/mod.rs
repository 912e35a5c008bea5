/// Authentication module
///
/// JWT issuance and validation, password hashing, the token blacklist and
/// the service tying them together.

mod blacklist;
mod claims;
mod jwt;
mod password;
mod service;

pub use blacklist::spawn_blacklist_sweeper;
pub use blacklist::InMemoryBlacklist;
pub use blacklist::PgBlacklist;
pub use blacklist::RevocationStore;
pub use claims::Claims;
pub use claims::TokenKind;
pub use jwt::decode_token;
pub use jwt::encode_token;
pub use password::hash_password;
pub use password::verify_password;
pub use service::AuthService;
pub use service::Authenticated;
pub use service::TokenPair;
