// ABOUTME: Core types for the ngxui entry layer: credentials, validators, and the route table.
// ABOUTME: Free of HTTP framework dependencies so the gate's decisions can be tested in isolation.

pub mod credential;
pub mod route;
pub mod validator;

pub use credential::{Credential, CredentialSource};
pub use route::{API_PREFIX, Access, HandlerId, ROUTES, RouteEntry, RouteMethod, routes_with};
pub use validator::{CredentialValidator, StaticTokens, ValidatorChain, ValidatorError};
