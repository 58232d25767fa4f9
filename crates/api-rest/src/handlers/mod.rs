//! Request handlers, one module per aggregate.

pub mod auth;
pub mod catalog;
pub mod contact;
pub mod health;
pub mod hospitals;
pub mod notifications;
pub mod orders;
pub mod patients;
pub mod reports;
pub mod suppliers;
pub mod uploads;
pub mod users;
