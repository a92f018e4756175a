//! Framework-agnostic OAuth2 grant-flow validation and dispatch.
//!
//! This crate turns raw request data (query string, body, headers) into typed
//! grant parameters or a single [`OAuth2Error`]. It never writes responses
//! itself; HTTP bindings such as `oauth2-actix` decide which handler receives
//! the outcome.

pub mod credentials;
pub mod dispatch;
pub mod fields;
pub mod models;
pub mod pkce;
pub mod request;
pub mod validate;

pub use credentials::*;
pub use dispatch::*;
pub use fields::FieldBag;
pub use models::*;
pub use request::{OAuth2Request, RawRequest};
pub use validate::*;
