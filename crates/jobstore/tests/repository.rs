//! Statement shapes produced by the repository functions, checked against a
//! recording executor (no database needed).

mod common;

use common::{LogBuffer, RecordingClient};
use jobstore::{
    CompanyFilter, JobFilter, NewCompany, NewJob, OrmError, PartialData, SqlValue, TracingClient,
    company, job,
};

const COMPANY_SELECT: &str =
    "SELECT handle, name, description, num_employees, logo_url FROM companies";
const JOB_SELECT: &str = "SELECT id, title, salary, equity, company_handle FROM jobs";

#[tokio::test]
async fn company_find_all_without_criteria_has_no_where() {
    let client = RecordingClient::new();
    let found = company::find_all(&client, &CompanyFilter::default())
        .await
        .unwrap();

    assert!(found.is_empty());
    let stmt = client.last();
    assert_eq!(stmt.sql, format!("{COMPANY_SELECT} ORDER BY name"));
    assert!(stmt.params.is_empty());
}

#[tokio::test]
async fn company_find_all_binds_criteria_in_order() {
    let client = RecordingClient::new();
    let filter = CompanyFilter::default()
        .name("Net")
        .min_employees(0)
        .max_employees(100);
    company::find_all(&client, &filter).await.unwrap();

    let stmt = client.last();
    assert_eq!(
        stmt.sql,
        format!(
            r#"{COMPANY_SELECT} WHERE "name" ILIKE $1 AND "num_employees" >= $2 AND "num_employees" <= $3 ORDER BY name"#
        )
    );
    assert_eq!(stmt.params, vec![r#"Text("%Net%")"#, "Int(0)", "Int(100)"]);
}

#[tokio::test]
async fn company_bad_range_fails_before_touching_the_store() {
    let client = RecordingClient::new();
    let filter = CompanyFilter::default()
        .min_employees(50)
        .max_employees(10);

    let err = company::find_all(&client, &filter).await.unwrap_err();
    assert!(matches!(err, OrmError::BadRange { min: 50, max: 10 }));
    assert!(client.statements().is_empty());
}

#[tokio::test]
async fn job_equity_filter_only_for_literal_true() {
    let client = RecordingClient::new();

    job::find_all(&client, &JobFilter::default().has_equity("true"))
        .await
        .unwrap();
    let stmt = client.last();
    assert_eq!(
        stmt.sql,
        format!("{JOB_SELECT} WHERE equity > 0 ORDER BY title")
    );
    assert!(stmt.params.is_empty());

    job::find_all(&client, &JobFilter::default().has_equity("false"))
        .await
        .unwrap();
    assert_eq!(client.last().sql, format!("{JOB_SELECT} ORDER BY title"));
}

#[tokio::test]
async fn job_title_filter_wraps_value_in_wildcards() {
    let client = RecordingClient::new();
    job::find_all(&client, &JobFilter::default().title("1"))
        .await
        .unwrap();

    let stmt = client.last();
    assert_eq!(
        stmt.sql,
        format!(r#"{JOB_SELECT} WHERE "title" ILIKE $1 ORDER BY title"#)
    );
    assert_eq!(stmt.params, vec![r#"Text("%1%")"#]);
}

#[tokio::test]
async fn company_update_appends_key_after_set_values() {
    let client = RecordingClient::new();
    let data = PartialData::new()
        .set("name", "New")
        .set("numEmployees", 10);

    let err = company::update(&client, "nope", &data).await.unwrap_err();
    assert!(err.is_not_found());

    let stmt = client.last();
    assert_eq!(
        stmt.sql,
        r#"UPDATE companies SET "name"=$1, "num_employees"=$2 WHERE handle = $3 RETURNING handle, name, description, num_employees, logo_url"#
    );
    assert_eq!(stmt.params, vec![r#"Text("New")"#, "Int(10)", r#"Text("nope")"#]);
    assert_eq!(client.statements().len(), 1);
}

#[tokio::test]
async fn update_with_no_data_sends_nothing() {
    let client = RecordingClient::new();

    let err = company::update(&client, "c1", &PartialData::new())
        .await
        .unwrap_err();
    assert!(matches!(err, OrmError::NoUpdateData));

    let err = job::update(&client, 1, &PartialData::new())
        .await
        .unwrap_err();
    assert!(matches!(err, OrmError::NoUpdateData));

    assert!(client.statements().is_empty());
}

#[tokio::test]
async fn identity_fields_cannot_be_updated() {
    let client = RecordingClient::new();

    let data = PartialData::new().set("handle", "c9");
    assert!(matches!(
        company::update(&client, "c1", &data).await,
        Err(OrmError::Validation(_))
    ));

    for field in ["id", "companyHandle"] {
        let data = PartialData::new().set("title", "t").set(field, "x");
        assert!(matches!(
            job::update(&client, 1, &data).await,
            Err(OrmError::Validation(_))
        ));
    }
    assert!(client.statements().is_empty());
}

#[tokio::test]
async fn job_update_uses_id_as_last_placeholder() {
    let client = RecordingClient::new();
    let data = PartialData::new()
        .set("salary", 500)
        .set("equity", SqlValue::Null)
        .set("title", "New");

    assert!(job::update(&client, 7, &data).await.unwrap_err().is_not_found());
    let stmt = client.last();
    assert_eq!(
        stmt.sql,
        r#"UPDATE jobs SET "salary"=$1, "equity"=$2, "title"=$3 WHERE id = $4 RETURNING id, title, salary, equity, company_handle"#
    );
    assert_eq!(stmt.params.last().map(String::as_str), Some("Int(7)"));
}

#[tokio::test]
async fn missing_rows_are_not_found() {
    let client = RecordingClient::new();

    assert!(company::get(&client, "nope").await.unwrap_err().is_not_found());
    assert!(company::remove(&client, "nope").await.unwrap_err().is_not_found());
    assert!(job::get(&client, 0).await.unwrap_err().is_not_found());
    assert!(job::remove(&client, 0).await.unwrap_err().is_not_found());

    let sql: Vec<String> = client.statements().into_iter().map(|s| s.sql).collect();
    assert_eq!(
        sql,
        vec![
            format!("{COMPANY_SELECT} WHERE handle = $1"),
            "DELETE FROM companies WHERE handle = $1 RETURNING handle".to_string(),
            format!("{JOB_SELECT} WHERE id = $1"),
            "DELETE FROM jobs WHERE id = $1 RETURNING id".to_string(),
        ]
    );
}

fn new_company() -> NewCompany {
    NewCompany {
        handle: "new".into(),
        name: "New".into(),
        description: "New Description".into(),
        num_employees: Some(1),
        logo_url: None,
    }
}

#[tokio::test]
async fn company_create_checks_existence_then_inserts() {
    let client = RecordingClient::new();
    let new = new_company();

    // No row comes back from RETURNING, which surfaces as NotFound.
    let err = company::create(&client, &new).await.unwrap_err();
    assert!(err.is_not_found());

    let statements = client.statements();
    assert_eq!(statements.len(), 2);
    assert_eq!(
        statements[0].sql,
        "SELECT handle FROM companies WHERE handle = $1"
    );
    assert_eq!(
        statements[1].sql,
        "INSERT INTO companies (handle, name, description, num_employees, logo_url) VALUES ($1, $2, $3, $4, $5) RETURNING handle, name, description, num_employees, logo_url"
    );
    assert_eq!(statements[1].params[3], "Int(1)");
    assert_eq!(statements[1].params[4], "Null");
}

#[tokio::test]
async fn company_create_stops_when_existence_check_fails() {
    let client = RecordingClient::failing("connection reset");

    let err = company::create(&client, &new_company()).await.unwrap_err();
    assert!(matches!(err, OrmError::Connection(_)));
    assert!(!err.is_duplicate());

    let statements = client.statements();
    assert_eq!(statements.len(), 1);
    assert!(statements[0].sql.starts_with("SELECT handle FROM companies"));
    assert_eq!(statements[0].params, vec![r#"Text("new")"#]);
}

#[tokio::test]
async fn job_create_is_a_single_insert() {
    let client = RecordingClient::new();
    let new = NewJob {
        title: "new".into(),
        salary: Some(100),
        equity: None,
        company_handle: "c1".into(),
    };

    let err = job::create(&client, &new).await.unwrap_err();
    assert!(err.is_not_found());

    let stmt = client.last();
    assert_eq!(client.statements().len(), 1);
    assert_eq!(
        stmt.sql,
        "INSERT INTO jobs (title, salary, equity, company_handle) VALUES ($1, $2, $3, $4) RETURNING id, title, salary, equity, company_handle"
    );
}

#[tokio::test]
async fn tracing_client_passes_statements_through() {
    let recording = RecordingClient::new();
    let client = TracingClient::new(&recording);

    job::find_all(&client, &JobFilter::default().min_salary(1))
        .await
        .unwrap();

    let stmt = recording.last();
    assert_eq!(
        stmt.sql,
        format!(r#"{JOB_SELECT} WHERE "salary" >= $1 ORDER BY title"#)
    );
    assert_eq!(stmt.params, vec!["Int(1)"]);
}

#[tokio::test]
async fn statement_logs_carry_no_bound_values() {
    let (logs, _guard) = LogBuffer::capture();
    let recording = RecordingClient::new();
    let client = TracingClient::new(&recording);

    let data = PartialData::new().set("description", "confidential-text");
    let err = company::update(&client, "secret-handle", &data)
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let output = logs.contents();
    assert!(output.contains("UPDATE companies SET"), "{output}");
    assert!(!output.contains("secret-handle"), "{output}");
    assert!(!output.contains("confidential-text"), "{output}");
}
