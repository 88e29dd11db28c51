//! Schema migrations via [`refinery`].
//!
//! The `companies` and `jobs` tables are embedded from `migrations/` at build
//! time.
//!
//! # Example
//!
//! ```ignore
//! let (mut client, connection) = tokio_postgres::connect(&url, tokio_postgres::NoTls).await?;
//! tokio::spawn(connection);
//! jobstore::migrate::run(&mut client).await?;
//! ```

use crate::error::OrmResult;

pub use refinery::Report;

refinery::embed_migrations!("migrations");

/// Apply all pending migrations.
pub async fn run(client: &mut tokio_postgres::Client) -> OrmResult<Report> {
    let report = migrations::runner().run_async(client).await?;
    for migration in report.applied_migrations() {
        tracing::info!(
            target: "jobstore",
            version = migration.version(),
            name = migration.name(),
            "applied migration"
        );
    }
    Ok(report)
}
