//! Ticket-to-artifact scaffolding.
//!
//! A [`ticket::Ticket`] flows through three steps, each of which writes plain
//! files under the project root:
//!
//! ```text
//! Ticket ─▶ SpecWriter ─▶ docs/specs/<id>-spec.md
//!                      └▶ docs/specs/<id>-openapi.yaml ─▶ CodeGenerator ─▶ services/<name>/…
//!                                                         InfraGenerator ─▶ infra/cdk/…, .github/workflows/…
//! ```
//!
//! [`pipeline::Pipeline`] runs all three in order.

pub mod artifact;
pub mod backend;
pub mod codegen;
pub mod config;
pub mod error;
pub mod infra;
pub mod io;
pub mod openapi;
pub mod paths;
pub mod pipeline;
pub mod routes;
pub mod spec_writer;
pub mod template;
pub mod ticket;

pub use error::{ForgeError, Result};
