//! Parameter-safe statement assembly.
//!
//! `Sql` stores SQL pieces and bound values separately and generates
//! `$1, $2, ...` placeholders only when the statement is rendered, so fragments
//! compiled independently (a `SET` list, a `WHERE` clause, a trailing key) can
//! be concatenated without tracking placeholder indices by hand.
//!
//! Text can only enter a statement three ways:
//! - `&'static str` templates written in this crate ([`Sql::push`])
//! - quoted identifiers ([`Sql::push_ident`])
//! - placeholders allocated for bound values ([`Sql::push_bind`])
//!
//! There is no way to append a runtime string as raw SQL.
//!
//! # Example
//!
//! ```ignore
//! use jobstore::sql;
//!
//! let mut q = sql("SELECT handle, name FROM companies WHERE name ILIKE ");
//! q.push_bind("%acme%");
//! q.push(" ORDER BY name");
//!
//! let rows = q.fetch_all(&conn).await?;
//! ```

use crate::client::GenericClient;
use crate::error::OrmResult;
use crate::ident::Ident;
use crate::row::FromRow;
use crate::value::SqlValue;
use std::borrow::Cow;
use std::fmt::Write;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

#[derive(Debug, Clone)]
enum SqlPart {
    Raw(Cow<'static, str>),
    Param,
}

/// A SQL statement or fragment with its bound values.
#[derive(Debug, Clone, Default)]
pub struct Sql {
    parts: Vec<SqlPart>,
    params: Vec<SqlValue>,
}

/// Start building a SQL statement.
pub fn sql(initial_sql: &'static str) -> Sql {
    Sql::new(initial_sql)
}

impl Sql {
    /// Create a new builder with an initial SQL template.
    pub fn new(initial_sql: &'static str) -> Self {
        let mut sql = Self::empty();
        sql.push(initial_sql);
        sql
    }

    /// Create an empty builder.
    pub fn empty() -> Self {
        Self::default()
    }

    fn push_raw(&mut self, text: Cow<'static, str>) {
        if text.is_empty() {
            return;
        }
        match self.parts.last_mut() {
            Some(SqlPart::Raw(last)) => last.to_mut().push_str(&text),
            _ => self.parts.push(SqlPart::Raw(text)),
        }
    }

    /// Append a static SQL template (no parameters).
    pub fn push(&mut self, sql: &'static str) -> &mut Self {
        self.push_raw(Cow::Borrowed(sql));
        self
    }

    /// Append a quoted identifier.
    pub fn push_ident(&mut self, ident: &Ident) -> &mut Self {
        let mut out = String::new();
        ident.write_sql(&mut out);
        self.push_raw(Cow::Owned(out));
        self
    }

    /// Append a placeholder and bind its value.
    pub fn push_bind(&mut self, value: impl Into<SqlValue>) -> &mut Self {
        self.parts.push(SqlPart::Param);
        self.params.push(value.into());
        self
    }

    /// Append another fragment, consuming it.
    ///
    /// The fragment's placeholders continue the numbering of `self`.
    pub fn push_sql(&mut self, other: Sql) -> &mut Self {
        for part in other.parts {
            match part {
                SqlPart::Raw(text) => self.push_raw(text),
                SqlPart::Param => self.parts.push(SqlPart::Param),
            }
        }
        self.params.extend(other.params);
        self
    }

    /// Append ` WHERE <filter>`.
    ///
    /// If `filter` is empty, nothing is appended (no dangling `WHERE`).
    pub fn push_where(&mut self, filter: Sql) -> &mut Self {
        if filter.is_empty() {
            return self;
        }
        self.push(" WHERE ");
        self.push_sql(filter)
    }

    /// Whether no text and no placeholders have been added.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Render SQL with `$1, $2, ...` placeholders.
    pub fn to_sql(&self) -> String {
        let mut out = String::new();
        let mut idx: usize = 0;

        for part in &self.parts {
            match part {
                SqlPart::Raw(s) => out.push_str(s),
                SqlPart::Param => {
                    idx += 1;
                    let _ = write!(&mut out, "${}", idx);
                }
            }
        }
        out
    }

    /// Bound values in placeholder order (`params()[i]` binds `$(i + 1)`).
    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }

    /// Consume the builder, returning its bound values.
    pub fn into_params(self) -> Vec<SqlValue> {
        self.params
    }

    /// Number of placeholders rendered by [`Sql::to_sql`].
    pub fn placeholder_count(&self) -> usize {
        self.parts
            .iter()
            .filter(|p| matches!(p, SqlPart::Param))
            .count()
    }

    /// Parameter refs compatible with `tokio-postgres`.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params
            .iter()
            .map(|p| p as &(dyn ToSql + Sync))
            .collect()
    }

    /// Execute the built SQL and return all rows.
    pub async fn fetch_all(&self, conn: &impl GenericClient) -> OrmResult<Vec<Row>> {
        let sql = self.to_sql();
        let params = self.params_ref();
        conn.query(&sql, &params).await
    }

    /// Execute the built SQL and return all rows mapped to `T`.
    pub async fn fetch_all_as<T: FromRow>(&self, conn: &impl GenericClient) -> OrmResult<Vec<T>> {
        let rows = self.fetch_all(conn).await?;
        rows.iter().map(T::from_row).collect()
    }

    /// Execute the built SQL and return the first row.
    ///
    /// Returns `OrmError::NotFound` if no rows are returned.
    pub async fn fetch_one(&self, conn: &impl GenericClient) -> OrmResult<Row> {
        let sql = self.to_sql();
        let params = self.params_ref();
        conn.query_one(&sql, &params).await
    }

    /// Execute the built SQL and return the first row mapped to `T`.
    pub async fn fetch_one_as<T: FromRow>(&self, conn: &impl GenericClient) -> OrmResult<T> {
        let row = self.fetch_one(conn).await?;
        T::from_row(&row)
    }

    /// Execute the built SQL and return at most one row.
    pub async fn fetch_opt(&self, conn: &impl GenericClient) -> OrmResult<Option<Row>> {
        let sql = self.to_sql();
        let params = self.params_ref();
        conn.query_opt(&sql, &params).await
    }

    /// Execute the built SQL and return at most one row mapped to `T`.
    pub async fn fetch_opt_as<T: FromRow>(
        &self,
        conn: &impl GenericClient,
    ) -> OrmResult<Option<T>> {
        let row = self.fetch_opt(conn).await?;
        row.as_ref().map(T::from_row).transpose()
    }

    /// Execute the built SQL and return affected row count.
    pub async fn execute(&self, conn: &impl GenericClient) -> OrmResult<u64> {
        let sql = self.to_sql();
        let params = self.params_ref();
        conn.execute(&sql, &params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_placeholders_in_order() {
        let mut q = sql("SELECT * FROM jobs WHERE salary >= ");
        q.push_bind(1).push(" AND title ILIKE ").push_bind("x");

        assert_eq!(
            q.to_sql(),
            "SELECT * FROM jobs WHERE salary >= $1 AND title ILIKE $2"
        );
        assert_eq!(q.params(), &[SqlValue::Int(1), SqlValue::Text("x".into())]);
    }

    #[test]
    fn can_compose_fragments() {
        let mut w = Sql::empty();
        w.push("handle = ").push_bind("acme");

        let mut q = sql("SELECT * FROM companies");
        q.push_where(w);

        assert_eq!(q.to_sql(), "SELECT * FROM companies WHERE handle = $1");
        assert_eq!(q.params_ref().len(), 1);
    }

    #[test]
    fn composed_fragments_continue_numbering() {
        let mut set = Sql::empty();
        set.push("a = ").push_bind(1).push(", b = ").push_bind(2);

        let mut q = sql("UPDATE t SET ");
        q.push_sql(set);
        q.push(" WHERE id = ").push_bind(3);

        assert_eq!(q.to_sql(), "UPDATE t SET a = $1, b = $2 WHERE id = $3");
        assert_eq!(q.placeholder_count(), q.params().len());
    }

    #[test]
    fn empty_where_is_omitted() {
        let mut q = sql("SELECT * FROM jobs");
        q.push_where(Sql::empty());
        q.push(" ORDER BY title");
        assert_eq!(q.to_sql(), "SELECT * FROM jobs ORDER BY title");
        assert!(q.params().is_empty());
    }

    #[test]
    fn ident_is_quoted_in_text() {
        let mut q = Sql::empty();
        q.push_ident(&Ident::quoted("logo_url").unwrap())
            .push("=")
            .push_bind("http://x");
        assert_eq!(q.to_sql(), r#""logo_url"=$1"#);
    }

    #[test]
    fn bound_text_never_reaches_sql() {
        let hostile = "'; DROP TABLE jobs; --";
        let mut q = sql("SELECT * FROM jobs WHERE title = ");
        q.push_bind(hostile);
        assert!(!q.to_sql().contains("DROP"));
        assert_eq!(q.params()[0].as_str(), Some(hostile));
    }

    #[test]
    fn empty_builder_is_empty() {
        assert!(Sql::empty().is_empty());
        assert!(!sql("SELECT 1").is_empty());
        assert!(sql("").is_empty());
    }
}
