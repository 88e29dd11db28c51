//! Jobs.
//!
//! Stateless repository functions over any [`GenericClient`]. Jobs have a
//! serial `id`, belong to a company, and are listed by `title`.

use crate::client::GenericClient;
use crate::company::{self, Company};
use crate::error::{OrmError, OrmResult};
use crate::fields::FieldMapping;
use crate::filter::Filter;
use crate::row::{FromRow, RowExt};
use crate::sql::{Sql, sql};
use crate::update::{PartialData, compile_set};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use tokio_postgres::Row;

/// Request field → column renames for `jobs`.
pub const FIELDS: FieldMapping = FieldMapping::new(&[("companyHandle", "company_handle")]);

/// Fields a partial update may not touch.
const IMMUTABLE_FIELDS: &[&str] = &["id", "companyHandle"];

/// Literal that switches the equity filter on.
const HAS_EQUITY: &str = "true";

const COLUMNS: &str = "id, title, salary, equity, company_handle";

const SELECT: &str = "SELECT id, title, salary, equity, company_handle FROM jobs";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

impl FromRow for Job {
    fn from_row(row: &Row) -> OrmResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
            company_handle: row.try_get_column("company_handle")?,
        })
    }
}

/// Data for a new job; the id is assigned by the database.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

/// A job together with the company that posted it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobDetail {
    #[serde(flatten)]
    pub job: Job,
    pub company: Company,
}

/// Optional criteria for [`find_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobFilter {
    /// Case-insensitive substring of the title.
    pub title: Option<String>,
    pub min_salary: Option<i32>,
    /// Only the exact string `"true"` restricts results to jobs with equity.
    /// Any other value is ignored, including non-string JSON.
    #[serde(default, deserialize_with = "string_or_ignored")]
    pub has_equity: Option<String>,
}

/// Keep a JSON string; drop every other JSON value instead of failing.
fn string_or_ignored<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Some(s),
        _ => None,
    })
}

impl JobFilter {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn min_salary(mut self, min: i32) -> Self {
        self.min_salary = Some(min);
        self
    }

    pub fn has_equity(mut self, raw: impl Into<String>) -> Self {
        self.has_equity = Some(raw.into());
        self
    }

    /// Compile into a `WHERE` body (empty when no criteria are set).
    ///
    /// Predicate order is fixed: title, minimum salary, equity. The equity
    /// predicate binds no value.
    pub fn compile(&self) -> OrmResult<Sql> {
        let mut filter = Filter::new();
        if let Some(title) = &self.title {
            filter.contains_ci("title", title)?;
        }
        if let Some(min) = self.min_salary {
            filter.gte("salary", min)?;
        }
        if self.has_equity.as_deref() == Some(HAS_EQUITY) {
            filter.fixed("equity > 0");
        }
        Ok(filter.into_sql())
    }
}

fn by_id(prefix: &'static str, id: i32) -> Sql {
    let mut q = sql(prefix);
    q.push(" WHERE id = ").push_bind(id);
    q
}

fn not_found(id: i32) -> OrmError {
    OrmError::not_found(format!("No job: {id}"))
}

/// Insert a job.
///
/// A missing company surfaces as the store's foreign-key error.
pub async fn create(conn: &impl GenericClient, job: &NewJob) -> OrmResult<Job> {
    let mut q = sql("INSERT INTO jobs (title, salary, equity, company_handle) VALUES (");
    q.push_bind(job.title.as_str())
        .push(", ")
        .push_bind(job.salary)
        .push(", ")
        .push_bind(job.equity)
        .push(", ")
        .push_bind(job.company_handle.as_str())
        .push(") RETURNING ")
        .push(COLUMNS);

    let created: Job = q.fetch_one_as(conn).await?;
    tracing::debug!(target: "jobstore", id = created.id, "created job");
    Ok(created)
}

/// All jobs matching `filter`, ordered by title.
pub async fn find_all(conn: &impl GenericClient, filter: &JobFilter) -> OrmResult<Vec<Job>> {
    let where_clause = filter.compile()?;

    let mut q = sql(SELECT);
    q.push_where(where_clause);
    q.push(" ORDER BY title");
    q.fetch_all_as(conn).await
}

/// Jobs posted by one company, ordered by id.
pub async fn find_by_company(conn: &impl GenericClient, handle: &str) -> OrmResult<Vec<Job>> {
    let mut q = sql(SELECT);
    q.push(" WHERE company_handle = ").push_bind(handle);
    q.push(" ORDER BY id");
    q.fetch_all_as(conn).await
}

/// A single job by id.
pub async fn get(conn: &impl GenericClient, id: i32) -> OrmResult<Job> {
    by_id(SELECT, id)
        .fetch_opt_as(conn)
        .await?
        .ok_or_else(|| not_found(id))
}

/// A job with its company.
pub async fn get_with_company(conn: &impl GenericClient, id: i32) -> OrmResult<JobDetail> {
    let job = get(conn, id).await?;
    let company = company::get(conn, &job.company_handle).await?;
    Ok(JobDetail { job, company })
}

/// Apply a partial update and return the updated job.
///
/// `id` and `companyHandle` cannot be updated.
pub async fn update(conn: &impl GenericClient, id: i32, data: &PartialData) -> OrmResult<Job> {
    data.deny(IMMUTABLE_FIELDS)?;
    let set = compile_set(data, &FIELDS)?;

    let mut q = sql("UPDATE jobs SET ");
    q.push_sql(set);
    q.push(" WHERE id = ").push_bind(id);
    q.push(" RETURNING ").push(COLUMNS);

    let updated = q
        .fetch_opt_as::<Job>(conn)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::debug!(target: "jobstore", fields = data.len(), "updated job");
    Ok(updated)
}

/// Delete a job.
pub async fn remove(conn: &impl GenericClient, id: i32) -> OrmResult<()> {
    let mut q = by_id("DELETE FROM jobs", id);
    q.push(" RETURNING id");

    match q.fetch_opt(conn).await? {
        Some(_) => {
            tracing::debug!(target: "jobstore", "removed job");
            Ok(())
        }
        None => Err(not_found(id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::SqlValue;

    #[test]
    fn empty_filter_matches_everything() {
        let sql = JobFilter::default().compile().unwrap();
        assert!(sql.is_empty());
        assert!(sql.params().is_empty());
    }

    #[test]
    fn all_criteria_in_fixed_order() {
        let sql = JobFilter::default()
            .has_equity("true")
            .min_salary(50_000)
            .title("eng")
            .compile()
            .unwrap();
        assert_eq!(
            sql.to_sql(),
            r#""title" ILIKE $1 AND "salary" >= $2 AND equity > 0"#
        );
        assert_eq!(
            sql.params(),
            &[SqlValue::Text("%eng%".into()), SqlValue::Int(50_000)]
        );
    }

    #[test]
    fn equity_alone_binds_nothing() {
        let sql = JobFilter::default().has_equity("true").compile().unwrap();
        assert_eq!(sql.to_sql(), "equity > 0");
        assert!(sql.params().is_empty());
    }

    #[test]
    fn only_literal_true_enables_equity() {
        for raw in ["false", "TRUE", "1", "yes", "", " true"] {
            let sql = JobFilter::default().has_equity(raw).compile().unwrap();
            assert!(sql.is_empty(), "{raw:?} should be ignored");
        }
    }

    #[test]
    fn equity_does_not_shift_numbering() {
        let sql = JobFilter::default()
            .has_equity("true")
            .min_salary(0)
            .compile()
            .unwrap();
        assert_eq!(sql.to_sql(), r#""salary" >= $1 AND equity > 0"#);
        assert_eq!(sql.params(), &[SqlValue::Int(0)]);
    }

    #[test]
    fn filter_deserializes_from_camel_case() {
        let filter: JobFilter =
            serde_json::from_str(r#"{"title":"j","minSalary":10,"hasEquity":"true"}"#).unwrap();
        assert_eq!(
            filter,
            JobFilter::default().title("j").min_salary(10).has_equity("true")
        );
    }

    #[test]
    fn non_string_equity_flag_is_ignored() {
        for body in [
            r#"{"hasEquity":false}"#,
            r#"{"hasEquity":true}"#,
            r#"{"hasEquity":1}"#,
            r#"{"hasEquity":null}"#,
            r#"{"hasEquity":["true"]}"#,
        ] {
            let filter: JobFilter = serde_json::from_str(body).unwrap();
            assert_eq!(filter.has_equity, None, "{body}");
            assert!(filter.compile().unwrap().is_empty(), "{body}");
        }

        let filter: JobFilter =
            serde_json::from_str(r#"{"minSalary":5,"hasEquity":0}"#).unwrap();
        assert_eq!(filter.compile().unwrap().to_sql(), r#""salary" >= $1"#);
    }

    #[test]
    fn compiling_twice_is_identical() {
        let filter = JobFilter::default()
            .title("eng")
            .min_salary(1)
            .has_equity("true");
        let a = filter.compile().unwrap();
        let b = filter.compile().unwrap();
        assert_eq!(a.to_sql(), b.to_sql());
        assert_eq!(a.params(), b.params());
    }

    #[test]
    fn new_job_accepts_string_equity() {
        let job: NewJob = serde_json::from_str(
            r#"{"title":"J","salary":1,"equity":"0.5","companyHandle":"c1"}"#,
        )
        .unwrap();
        assert_eq!(job.equity, Some(Decimal::new(5, 1)));
    }
}
