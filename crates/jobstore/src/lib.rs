//! # jobstore
//!
//! Parameter-safe PostgreSQL data access for a job board's companies and jobs.
//!
//! ## Features
//!
//! - **Partial updates**: any non-empty subset of fields compiles to a `SET`
//!   list with `$1..$N` placeholders ([`compile_set`])
//! - **Optional filters**: per-entity criteria compile to a `WHERE` body, or
//!   nothing at all when no criteria are given ([`CompanyFilter`], [`JobFilter`])
//! - **No interpolation**: SQL text is built only from static templates and
//!   quoted identifiers; values travel as bound parameters ([`Sql`])
//! - **Transaction-friendly**: repository functions take any [`GenericClient`]
//! - **Logging**: [`TracingClient`] logs every statement via `tracing`
//!
//! ## Example
//!
//! ```ignore
//! use jobstore::{company, CompanyFilter, PartialData};
//!
//! let companies = company::find_all(&client, &CompanyFilter::default().min_employees(10)).await?;
//!
//! let data = PartialData::new().set("numEmployees", 42).set("logoUrl", "http://c1.img");
//! let updated = company::update(&client, "c1", &data).await?;
//! ```

pub mod client;
pub mod company;
pub mod config;
pub mod error;
pub mod fields;
pub mod filter;
pub mod ident;
pub mod job;
pub mod monitor;
pub mod row;
pub mod sql;
pub mod update;
pub mod value;

pub use client::GenericClient;
pub use company::{Company, CompanyDetail, CompanyFilter, NewCompany};
pub use config::StoreConfig;
pub use error::{OrmError, OrmResult};
pub use fields::FieldMapping;
pub use filter::{Filter, Op, Predicate};
pub use ident::Ident;
pub use job::{Job, JobDetail, JobFilter, NewJob};
pub use monitor::{QueryType, TracingClient};
pub use row::{FromRow, RowExt};
pub use sql::{Sql, sql};
pub use update::{PartialData, compile_set};
pub use value::SqlValue;

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_with_tls};

#[cfg(feature = "migrate")]
pub mod migrate;
