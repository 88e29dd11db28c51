//! `WHERE` clause construction.
//!
//! A [`Filter`] collects [`Predicate`]s in the order they are added and joins
//! them with `AND`. Each predicate is either a comparison between a quoted
//! column and a bound value, or a fixed parameterless expression written in
//! this crate.
//!
//! An empty filter renders nothing; [`Sql::push_where`] then omits the `WHERE`
//! keyword, so "no criteria" means "all rows".

use crate::error::OrmResult;
use crate::ident::Ident;
use crate::sql::Sql;
use crate::value::SqlValue;

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// Equal: column = value
    Eq,
    /// Greater than or equal: column >= value
    Gte,
    /// Less than or equal: column <= value
    Lte,
    /// Greater than: column > value
    Gt,
    /// Case-insensitive LIKE (PostgreSQL ILIKE)
    Ilike,
}

impl Op {
    fn as_sql(self) -> &'static str {
        match self {
            Op::Eq => " = ",
            Op::Gte => " >= ",
            Op::Lte => " <= ",
            Op::Gt => " > ",
            Op::Ilike => " ILIKE ",
        }
    }
}

#[derive(Debug, Clone)]
enum PredicateInner {
    Compare {
        column: Ident,
        op: Op,
        value: SqlValue,
    },
    Fixed(&'static str),
}

/// A single filter predicate.
#[derive(Debug, Clone)]
pub struct Predicate(PredicateInner);

impl Predicate {
    /// `"column" <op> $n`
    pub fn compare(column: &str, op: Op, value: impl Into<SqlValue>) -> OrmResult<Self> {
        Ok(Predicate(PredicateInner::Compare {
            column: Ident::quoted(column)?,
            op,
            value: value.into(),
        }))
    }

    /// A parameterless predicate, e.g. `equity > 0`.
    ///
    /// Consumes no placeholder and binds no value.
    pub fn fixed(sql: &'static str) -> Self {
        Predicate(PredicateInner::Fixed(sql))
    }

    /// Whether this predicate binds a value.
    pub fn binds_value(&self) -> bool {
        matches!(self.0, PredicateInner::Compare { .. })
    }

    /// Append this predicate into a [`Sql`] builder.
    pub fn append_to_sql(&self, sql: &mut Sql) {
        match &self.0 {
            PredicateInner::Compare { column, op, value } => {
                sql.push_ident(column)
                    .push(op.as_sql())
                    .push_bind(value.clone());
            }
            PredicateInner::Fixed(s) => {
                sql.push(s);
            }
        }
    }
}

/// An ordered conjunction of predicates.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    predicates: Vec<Predicate>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a predicate.
    pub fn and(&mut self, predicate: Predicate) -> &mut Self {
        self.predicates.push(predicate);
        self
    }

    /// Case-insensitive substring match: `"column" ILIKE $n` bound to `%text%`.
    ///
    /// `%` and `_` inside `text` are not escaped and keep their wildcard meaning.
    pub fn contains_ci(&mut self, column: &str, text: &str) -> OrmResult<&mut Self> {
        let predicate = Predicate::compare(column, Op::Ilike, format!("%{text}%"))?;
        Ok(self.and(predicate))
    }

    /// `"column" >= $n`
    pub fn gte(&mut self, column: &str, value: impl Into<SqlValue>) -> OrmResult<&mut Self> {
        let predicate = Predicate::compare(column, Op::Gte, value)?;
        Ok(self.and(predicate))
    }

    /// `"column" <= $n`
    pub fn lte(&mut self, column: &str, value: impl Into<SqlValue>) -> OrmResult<&mut Self> {
        let predicate = Predicate::compare(column, Op::Lte, value)?;
        Ok(self.and(predicate))
    }

    /// `"column" = $n`
    pub fn eq(&mut self, column: &str, value: impl Into<SqlValue>) -> OrmResult<&mut Self> {
        let predicate = Predicate::compare(column, Op::Eq, value)?;
        Ok(self.and(predicate))
    }

    /// Add a fixed parameterless predicate.
    pub fn fixed(&mut self, sql: &'static str) -> &mut Self {
        self.and(Predicate::fixed(sql))
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Render the predicates joined by `AND`, without the `WHERE` keyword.
    ///
    /// The result is empty if no predicate was added.
    pub fn into_sql(self) -> Sql {
        let mut sql = Sql::empty();
        for (i, predicate) in self.predicates.iter().enumerate() {
            if i > 0 {
                sql.push(" AND ");
            }
            predicate.append_to_sql(&mut sql);
        }
        sql
    }
}
