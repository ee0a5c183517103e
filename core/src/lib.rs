//! Synchronous client core for the CreateSend (Campaign Monitor) API.
//!
//! # Overview
//! Every call goes through [`Dispatcher`]: it picks the authentication
//! scheme, resolves the URL against the configured base endpoint, performs
//! one blocking HTTP request (or answers it from a test [`Fixture`]), and
//! classifies the status code into the raw payload or a typed [`Error`].
//!
//! # Design
//! - Shared configuration (base endpoint, default credentials) lives in a
//!   [`Context`] handed to dispatchers explicitly; instance credentials are
//!   layered on top of it per call.
//! - Request construction is pure (`Dispatcher::build_request`), so URLs and
//!   headers are testable without I/O.
//! - Status classification is a pure function ([`response::classify`]).
//! - A call is one request; failures are returned, never retried.
//!
//! # Example
//!
//! ```rust,no_run
//! use createsend_core::{Context, CreateSend, Credentials};
//!
//! let mut account = CreateSend::with_credentials(Context::default(), Credentials::api_key("your-key"));
//! for client in account.clients()? {
//!     println!("{} {}", client.client_id, client.name);
//! }
//! # Ok::<(), createsend_core::Error>(())
//! ```

pub mod account;
pub mod auth;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod fixture;
pub mod http;
pub mod response;
pub mod transport;
pub mod types;

pub use account::CreateSend;
pub use auth::{BasicAuth, Credentials};
pub use config::{ClientConfig, Context, DEFAULT_BASE_URI};
pub use dispatcher::{Dispatcher, RequestSpec};
pub use error::{Error, ErrorBody, Result};
pub use fixture::{Fixture, FixtureError, FixtureSource};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use response::decode_json;
