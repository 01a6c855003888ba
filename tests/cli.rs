//! Process-level behaviour of the `eco_reports` binary.

use serde_json::json;
use tokio::process::Command;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn command() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_eco_reports"));
    cmd.env_remove("NOTION_API_KEY")
        .env_remove("NOTION_DATABASE_ID")
        .env_remove("NOTION_API_URL")
        .env_remove("QUICKCHART_URL")
        .env("RUST_LOG", "warn");
    cmd
}

#[tokio::test]
async fn missing_configuration_exits_1_without_writing() {
    let out = tempfile::tempdir().unwrap();
    let reports = out.path().join("reports");

    let output = command()
        .env("NOTION_DATABASE_ID", "db-123")
        .arg("generate")
        .arg("--output-dir")
        .arg(&reports)
        .output()
        .await
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(!reports.exists());
    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn zero_valid_records_exits_0() {
    let notion = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/databases/db-123/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "id": "p1",
                "properties": {
                    "Organisation": { "title": [{ "plain_text": "No Url Ltd" }] },
                    "URL": { "url": null }
                }
            }],
            "has_more": false,
            "next_cursor": null
        })))
        .expect(1)
        .mount(&notion)
        .await;

    let out = tempfile::tempdir().unwrap();
    let reports = out.path().join("reports");

    let output = command()
        .env("NOTION_API_KEY", "test-key")
        .env("NOTION_DATABASE_ID", "db-123")
        .env("NOTION_API_URL", notion.uri())
        .env("QUICKCHART_URL", "http://127.0.0.1:9")
        .arg("generate")
        .arg("--output-dir")
        .arg(&reports)
        .output()
        .await
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    assert!(!reports.exists());
}

#[tokio::test]
async fn datastore_error_exits_1() {
    let notion = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&notion)
        .await;

    let out = tempfile::tempdir().unwrap();
    let output = command()
        .env("NOTION_API_KEY", "test-key")
        .env("NOTION_DATABASE_ID", "db-123")
        .env("NOTION_API_URL", notion.uri())
        .arg("generate")
        .arg("--output-dir")
        .arg(out.path().join("reports"))
        .output()
        .await
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
}
