//! Operator CLI for the OPX backend.
//!
//! Talks to the same Postgres database as the server; useful for seeding
//! the first admin account and for quick inspection without the API.

use clap::{Parser, Subcommand};
use opx_core::repositories::users::Role;
use opx_core::repositories::{OrdersRepository, SessionsRepository, UsersRepository};
use opx_core::OrderStatus;
use opx_types::{Crm, EmailAddress, NonEmptyText};

#[derive(Parser)]
#[command(name = "opx")]
#[command(about = "OPX surgical order system CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a user account
    CreateUser {
        /// Display name
        name: String,
        /// Login email
        email: String,
        /// Password (min 8 chars)
        password: String,
        /// Role: admin, doctor or assistant
        role: String,
        /// CRM registration, e.g. 123456-SP (required for doctors)
        #[arg(long)]
        crm: Option<String>,
    },
    /// List all users
    ListUsers,
    /// List orders, newest first
    ListOrders {
        /// Filter by status, e.g. submitted
        #[arg(long)]
        status: Option<String>,
    },
    /// Delete expired login sessions
    PurgeSessions,
    /// Delete staged uploads that were never attached to an order
    PurgeStaged {
        /// Minimum age in hours before a staged upload is swept
        #[arg(long, default_value_t = 24)]
        hours: u64,
    },
}

async fn connect() -> Result<sqlx::PgPool, Box<dyn std::error::Error>> {
    let url = std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?;
    Ok(sqlx::PgPool::connect(&url).await?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::CreateUser {
            name,
            email,
            password,
            role,
            crm,
        } => {
            let role = Role::from_str_opt(&role).ok_or(format!("unknown role: {role}"))?;
            let name = NonEmptyText::new(&name)?;
            let email = EmailAddress::parse(&email)?;
            let crm = crm.map(Crm::new).transpose()?;

            let pool = connect().await?;
            let user = UsersRepository::new(pool)
                .create(&name, &email, &password, role, crm.as_ref())
                .await?;
            println!("Created user {} <{}> ({})", user.name, user.email, user.role);
        }
        Commands::ListUsers => {
            let pool = connect().await?;
            let users = UsersRepository::new(pool).list().await?;
            if users.is_empty() {
                println!("No users found.");
            } else {
                for user in users {
                    println!(
                        "ID: {}, Name: {}, Email: {}, Role: {}, Active: {}",
                        user.id, user.name, user.email, user.role, user.active
                    );
                }
            }
        }
        Commands::ListOrders { status } => {
            let status = match status {
                Some(s) => {
                    Some(OrderStatus::from_db_str(&s).ok_or(format!("unknown status: {s}"))?)
                }
                None => None,
            };
            let pool = connect().await?;
            let orders = OrdersRepository::new(pool)
                .list(status, None, None, None, None)
                .await?;
            if orders.is_empty() {
                println!("No orders found.");
            } else {
                for order in orders {
                    println!(
                        "ID: {}, Status: {}, Doctor: {}, Patient: {}, Updated: {}",
                        order.id,
                        order.status,
                        order.doctor_name,
                        order.patient_name.as_deref().unwrap_or("-"),
                        order.updated_at
                    );
                }
            }
        }
        Commands::PurgeSessions => {
            let pool = connect().await?;
            let purged = SessionsRepository::new(pool).purge_expired().await?;
            println!("Purged {purged} expired sessions.");
        }
        Commands::PurgeStaged { hours } => {
            let upload_dir =
                std::env::var("OPX_UPLOAD_DIR").unwrap_or_else(|_| "./uploads".into());
            let uploads = opx_files::UploadService::new(std::path::Path::new(&upload_dir))?;
            let purged = uploads.purge_staged(std::time::Duration::from_secs(hours * 3600))?;
            println!("Purged {purged} stale staged uploads.");
        }
    }

    Ok(())
}
