mod auth;
mod models;
mod sqlite_wrap_store;
mod wrap_store;

pub use auth::{AuthToken, AuthTokenValue, AUTH_TOKEN_LENGTH};
pub use models::{SavedWrap, User, WrapSummary};
pub use sqlite_wrap_store::SqliteWrapStore;
pub use wrap_store::{AuthTokenStore, DuoStore, FullStore, UserStore, WrapStore};
