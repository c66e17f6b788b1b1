//! Synchronous client SDK for the Routemaster HTTP API.
//!
//! # Overview
//! Routemaster runs state machines as a service: labels move through the
//! states of named state machines as their metadata changes. This crate wraps
//! its HTTP API with typed operations.
//!
//! # Design
//! - `RoutemasterClient` is stateless. Each operation is split into `build_*`
//!   (produces an `HttpRequest`) and `parse_*` (consumes an `HttpResponse`),
//!   so status mapping is testable without a network.
//! - `RoutemasterApi` retains a `Transport` handle and performs one blocking
//!   round-trip per call. `UreqTransport` is the default transport.
//! - Known status codes map to domain errors (`UnknownStateMachine`,
//!   `UnknownLabel`, `DeletedLabel`, `LabelAlreadyExists`) before the generic
//!   non-2xx check.
//!
//! ```no_run
//! use routemaster_core::{ClientConfig, LabelRef, Metadata};
//!
//! # fn main() -> Result<(), routemaster_core::ApiError> {
//! let api = ClientConfig::from_env()?.connect()?;
//! let label = LabelRef::new("order-66", "fulfilment");
//! match api.get_label(&label) {
//!     Ok(label) => println!("{} is in {}", label.label_ref, label.state),
//!     Err(e) if e.is_unknown_label() => {
//!         api.create_label(&label, &Metadata::new())?;
//!     }
//!     Err(e) => return Err(e),
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use api::RoutemasterApi;
pub use client::RoutemasterClient;
pub use config::ClientConfig;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::Transport;
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
pub use types::{Json, Label, LabelName, LabelRef, Metadata, State, StateMachine};
