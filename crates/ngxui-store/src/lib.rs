// ABOUTME: Persistence-side collaborators for ngxui, backed by the shared SQLite database.
// ABOUTME: Currently provides the token store the auth gate validates credentials against.

pub mod tokens;

pub use tokens::{SqliteTokenStore, TokenStoreError};
