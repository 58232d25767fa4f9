//! # OPX Core
//!
//! Core business logic for the OPX surgical order management system.
//!
//! This crate contains the domain model and the Postgres storage layer:
//! - Surgical order lifecycle (status machine and wizard step validation)
//! - One repository per aggregate under [`repositories`]
//! - Runtime configuration resolved once at startup
//!
//! **No API concerns**: authentication cookies, HTTP servers, request/response
//! mapping and OpenAPI belong in `api-rest` and `api-shared`.

pub mod config;
pub mod error;
pub mod order_flow;
pub mod repositories;

pub use config::CoreConfig;
pub use error::{OpxError, OpxResult};
pub use order_flow::{OrderDraft, OrderStatus, WizardStep};
pub use opx_types::{
    AnvisaRegistration, CbhpmCode, CidCode, Cnpj, Cpf, Crm, EmailAddress, NonEmptyText,
};
