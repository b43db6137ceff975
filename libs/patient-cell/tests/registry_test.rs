use std::io::Write;
use std::sync::Arc;

use assert_matches::assert_matches;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::NaiveDate;
use tempfile::NamedTempFile;
use tower::ServiceExt;

use patient_cell::models::{PatientRecord, PatientStatus};
use patient_cell::router::patient_routes;
use patient_cell::services::PatientRegistry;
use shared_config::AppConfig;
use shared_store::TableFile;

const HEADER: &str = "patientid,Name,DOB,Email,Location,doctorid,InsuranceCarrier,MemberID,Group\n";

fn patient_file(rows: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(HEADER.as_bytes()).unwrap();
    file.write_all(rows.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn record(patient_id: Option<&str>) -> PatientRecord {
    PatientRecord {
        patient_id: patient_id.map(str::to_string),
        name: "Jane Doe".to_string(),
        date_of_birth: NaiveDate::from_ymd_opt(1990, 4, 2).unwrap(),
        email: "jane@example.com".to_string(),
        location: "Dublin".to_string(),
        doctor_id: None,
        insurance_carrier: None,
        member_id: None,
        group: None,
    }
}

#[test]
fn lookup_known_id_is_returning() {
    let file = patient_file("P1,Jane Doe,1990-04-02,jane@example.com,Dublin,D1,Aetna,M9,G7\n");
    let registry = PatientRegistry::from_path(file.path());

    let (status, row) = registry.lookup(Some("P1")).unwrap();

    assert_matches!(status, PatientStatus::Returning);
    let row = row.unwrap();
    assert_eq!(row.name, "Jane Doe");
    assert_eq!(row.doctor_id.as_deref(), Some("D1"));
    assert_eq!(row.insurance_carrier.as_deref(), Some("Aetna"));
}

#[test]
fn lookup_unknown_or_missing_id_is_new() {
    let file = patient_file("P1,Jane Doe,1990-04-02,jane@example.com,Dublin,,,,\n");
    let registry = PatientRegistry::from_path(file.path());

    let (status, row) = registry.lookup(Some("P2")).unwrap();
    assert_matches!(status, PatientStatus::New);
    assert!(row.is_none());

    let (status, row) = registry.lookup(None).unwrap();
    assert_matches!(status, PatientStatus::New);
    assert!(row.is_none());

    let (status, _) = registry.lookup(Some("   ")).unwrap();
    assert_matches!(status, PatientStatus::New);
}

#[test]
fn upsert_existing_id_overwrites_in_place() {
    let file = patient_file("P1,Old Name,1990-04-02,old@example.com,Cork,D1,Aetna,M9,G7\n");
    let registry = PatientRegistry::from_path(file.path());

    let updated = registry.upsert(&record(Some("P1"))).unwrap();

    assert_eq!(updated.name, "Jane Doe");
    let (table, _) = TableFile::new(file.path()).load().unwrap();
    assert_eq!(table.row_count(), 1);

    // Fields not supplied stay in place.
    assert_eq!(updated.doctor_id.as_deref(), Some("D1"));
    assert_eq!(updated.insurance_carrier.as_deref(), Some("Aetna"));
}

#[test]
fn upsert_new_id_appends_one_row() {
    let file = patient_file("P1,Jane Doe,1990-04-02,jane@example.com,Dublin,,,,\n");
    let registry = PatientRegistry::from_path(file.path());

    registry.upsert(&record(Some("P2"))).unwrap();

    let (table, _) = TableFile::new(file.path()).load().unwrap();
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.find_row("patientid", "P2"), Some(1));
}

#[test]
fn upsert_without_id_appends_one_row() {
    let file = patient_file("P1,Jane Doe,1990-04-02,jane@example.com,Dublin,,,,\n");
    let registry = PatientRegistry::from_path(file.path());

    registry.upsert(&record(None)).unwrap();

    let (table, _) = TableFile::new(file.path()).load().unwrap();
    assert_eq!(table.row_count(), 2);
}

#[test]
fn upsert_creates_missing_file_with_headers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("patients.csv");
    let registry = PatientRegistry::from_path(&path);

    registry.upsert(&record(Some("P1"))).unwrap();

    let (table, _) = TableFile::new(&path).load().unwrap();
    assert_eq!(table.headers().len(), 9);
    assert_eq!(table.row_count(), 1);
}

fn test_config(patient_db_path: &std::path::Path) -> AppConfig {
    AppConfig {
        smtp_email: String::new(),
        smtp_password: String::new(),
        smtp_host: "localhost".to_string(),
        smtp_port: 587,
        patient_db_path: patient_db_path.to_string_lossy().into_owned(),
        doctor_schedule_path: "unused.csv".to_string(),
        intake_form_path: "unused.pdf".to_string(),
    }
}

#[tokio::test]
async fn get_patient_endpoint_reports_status() {
    let file = patient_file("P1,Jane Doe,1990-04-02,jane@example.com,Dublin,,,,\n");
    let app = patient_routes(Arc::new(test_config(file.path())));

    let request = Request::builder()
        .method("GET")
        .uri("/P1")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "returning");
    assert_eq!(json["patient"]["name"], "Jane Doe");
}

#[tokio::test]
async fn upsert_endpoint_round_trips() {
    let file = patient_file("");
    let app = patient_routes(Arc::new(test_config(file.path())));

    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_vec(&record(Some("P9"))).unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["patient_id"], "P9");
}
