//! Postgres storage layer, one repository per aggregate.
//!
//! Every repository is a thin struct over a shared [`sqlx::PgPool`] whose
//! methods run parameterized queries and return the wire models from
//! `api-shared`. No repository reads environment variables or holds state
//! beyond the pool; construction is free and repositories are `Clone`.

pub mod appeals;
pub mod catalog;
pub mod contact;
pub mod helpers;
pub mod hospitals;
pub mod notifications;
pub mod orders;
pub mod patients;
pub mod reports;
pub mod sessions;
pub mod suppliers;
pub mod users;

pub use appeals::AppealsRepository;
pub use catalog::CatalogRepository;
pub use contact::ContactRepository;
pub use hospitals::HospitalsRepository;
pub use notifications::NotificationsRepository;
pub use orders::OrdersRepository;
pub use patients::PatientsRepository;
pub use reports::ReportsRepository;
pub use sessions::SessionsRepository;
pub use suppliers::SuppliersRepository;
pub use users::UsersRepository;
