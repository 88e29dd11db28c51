//! Companies.
//!
//! Stateless repository functions over any [`GenericClient`]. Companies are
//! keyed by `handle` and listed by `name`.

use crate::client::GenericClient;
use crate::error::{OrmError, OrmResult};
use crate::fields::FieldMapping;
use crate::filter::Filter;
use crate::job::{self, Job};
use crate::row::{FromRow, RowExt};
use crate::sql::{Sql, sql};
use crate::update::{PartialData, compile_set};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

/// Request field → column renames for `companies`.
pub const FIELDS: FieldMapping =
    FieldMapping::new(&[("numEmployees", "num_employees"), ("logoUrl", "logo_url")]);

/// Fields a partial update may not touch.
const IMMUTABLE_FIELDS: &[&str] = &["handle"];

const COLUMNS: &str = "handle, name, description, num_employees, logo_url";

const SELECT: &str = "SELECT handle, name, description, num_employees, logo_url FROM companies";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

impl FromRow for Company {
    fn from_row(row: &Row) -> OrmResult<Self> {
        Ok(Self {
            handle: row.try_get_column("handle")?,
            name: row.try_get_column("name")?,
            description: row.try_get_column("description")?,
            num_employees: row.try_get_column("num_employees")?,
            logo_url: row.try_get_column("logo_url")?,
        })
    }
}

/// Data for a new company.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCompany {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

/// A company together with its jobs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<Job>,
}

/// Optional criteria for [`find_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyFilter {
    /// Case-insensitive substring of the company name.
    pub name: Option<String>,
    pub min_employees: Option<i32>,
    pub max_employees: Option<i32>,
}

impl CompanyFilter {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn min_employees(mut self, min: i32) -> Self {
        self.min_employees = Some(min);
        self
    }

    pub fn max_employees(mut self, max: i32) -> Self {
        self.max_employees = Some(max);
        self
    }

    /// Compile into a `WHERE` body (empty when no criteria are set).
    ///
    /// Predicate order is fixed: name, minimum, maximum.
    pub fn compile(&self) -> OrmResult<Sql> {
        if let (Some(min), Some(max)) = (self.min_employees, self.max_employees) {
            if min > max {
                return Err(OrmError::BadRange {
                    min: min.into(),
                    max: max.into(),
                });
            }
        }

        let mut filter = Filter::new();
        if let Some(name) = &self.name {
            filter.contains_ci("name", name)?;
        }
        if let Some(min) = self.min_employees {
            filter.gte("num_employees", min)?;
        }
        if let Some(max) = self.max_employees {
            filter.lte("num_employees", max)?;
        }
        Ok(filter.into_sql())
    }
}

fn by_handle(prefix: &'static str, handle: &str) -> Sql {
    let mut q = sql(prefix);
    q.push(" WHERE handle = ").push_bind(handle);
    q
}

fn not_found(handle: &str) -> OrmError {
    OrmError::not_found(format!("No company: {handle}"))
}

fn duplicate(handle: &str) -> OrmError {
    OrmError::duplicate(format!("Duplicate company: {handle}"))
}

/// Insert a company.
///
/// Fails with [`OrmError::Duplicate`] if the handle is taken, whether that is
/// seen by the existence check or reported by the insert itself.
pub async fn create(conn: &impl GenericClient, company: &NewCompany) -> OrmResult<Company> {
    let existing = by_handle("SELECT handle FROM companies", &company.handle)
        .fetch_opt(conn)
        .await?;
    if existing.is_some() {
        return Err(duplicate(&company.handle));
    }

    let mut q = sql(
        "INSERT INTO companies (handle, name, description, num_employees, logo_url) VALUES (",
    );
    q.push_bind(company.handle.as_str())
        .push(", ")
        .push_bind(company.name.as_str())
        .push(", ")
        .push_bind(company.description.as_str())
        .push(", ")
        .push_bind(company.num_employees)
        .push(", ")
        .push_bind(company.logo_url.as_deref())
        .push(") RETURNING ")
        .push(COLUMNS);

    match q.fetch_one_as::<Company>(conn).await {
        Err(e) if e.is_unique_violation() => Err(duplicate(&company.handle)),
        Err(e) => Err(e),
        Ok(created) => {
            tracing::debug!(target: "jobstore", "created company");
            Ok(created)
        }
    }
}

/// All companies matching `filter`, ordered by name.
///
/// Contradictory employee bounds fail with [`OrmError::BadRange`] before any
/// statement is sent.
pub async fn find_all(
    conn: &impl GenericClient,
    filter: &CompanyFilter,
) -> OrmResult<Vec<Company>> {
    let where_clause = filter.compile()?;

    let mut q = sql(SELECT);
    q.push_where(where_clause);
    q.push(" ORDER BY name");
    q.fetch_all_as(conn).await
}

/// A single company by handle.
pub async fn get(conn: &impl GenericClient, handle: &str) -> OrmResult<Company> {
    by_handle(SELECT, handle)
        .fetch_opt_as(conn)
        .await?
        .ok_or_else(|| not_found(handle))
}

/// A company with its jobs (ordered by job id).
pub async fn get_with_jobs(conn: &impl GenericClient, handle: &str) -> OrmResult<CompanyDetail> {
    let company = get(conn, handle).await?;
    let jobs = job::find_by_company(conn, handle).await?;
    Ok(CompanyDetail { company, jobs })
}

/// Apply a partial update and return the updated company.
///
/// Only the fields present in `data` change. `handle` cannot be updated.
pub async fn update(
    conn: &impl GenericClient,
    handle: &str,
    data: &PartialData,
) -> OrmResult<Company> {
    data.deny(IMMUTABLE_FIELDS)?;
    let set = compile_set(data, &FIELDS)?;

    let mut q = sql("UPDATE companies SET ");
    q.push_sql(set);
    q.push(" WHERE handle = ").push_bind(handle);
    q.push(" RETURNING ").push(COLUMNS);

    let updated = q
        .fetch_opt_as::<Company>(conn)
        .await?
        .ok_or_else(|| not_found(handle))?;
    tracing::debug!(target: "jobstore", fields = data.len(), "updated company");
    Ok(updated)
}

/// Delete a company (its jobs go with it).
pub async fn remove(conn: &impl GenericClient, handle: &str) -> OrmResult<()> {
    let mut q = by_handle("DELETE FROM companies", handle);
    q.push(" RETURNING handle");

    match q.fetch_opt(conn).await? {
        Some(_) => {
            tracing::debug!(target: "jobstore", "removed company");
            Ok(())
        }
        None => Err(not_found(handle)),
    }
}
