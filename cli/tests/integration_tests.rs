use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper to create a temp directory that is cleaned up on drop.
struct TempDir {
    path: PathBuf,
}

impl TempDir {
    fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!("formctl_test_{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).expect("failed to create temp dir");
        Self { path }
    }

    fn path(&self) -> &PathBuf {
        &self.path
    }

    fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn contact_schema() -> serde_json::Value {
    json!({
        "title": "Contact",
        "fields": [
            {"id": "name", "type": "text", "label": "Name", "required": true, "placeholder": "Full name"},
            {"id": "topic", "type": "select", "label": "Topic", "options": ["Tax", "Permits"]},
            {"id": "agree", "type": "checkbox", "label": "I agree", "required": true}
        ]
    })
}

fn write_json(dir: &TempDir, name: &str, value: &serde_json::Value) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_string_pretty(value).unwrap()).expect("failed to write json");
    path
}

fn contact_record() -> serde_json::Value {
    json!({
        "id": 4,
        "title": "Contact",
        "schemaJson": contact_schema().to_string(),
        "context": "CONTACT",
        "active": true
    })
}

fn formctl(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_formctl"))
        .args(args)
        .env_remove("FORM_REGISTRY_URL")
        .env_remove("FORM_REGISTRY_TOKEN")
        .output()
        .expect("failed to run formctl")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ---------------------------------------------------------------------------
// Validate
// ---------------------------------------------------------------------------

#[test]
fn validate_accepts_schema_and_record_files() {
    let dir = TempDir::new("validate_ok");
    write_json(&dir, "contact.json", &contact_schema());
    write_json(&dir, "record.json", &contact_record());

    let out = formctl(&["validate", dir.path().to_str().unwrap()]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("Validated 2 form file(s)."));
}

#[test]
fn validate_reports_every_problem() {
    let dir = TempDir::new("validate_bad");
    let path = write_json(
        &dir,
        "bad.json",
        &json!({"fields": [
            {"id": "a", "type": "text", "label": "A"},
            {"id": "a", "type": "text", "label": "A again"},
            {"id": "pick", "type": "radio", "label": "Pick"}
        ]}),
    );

    let out = formctl(&["validate", path.to_str().unwrap()]);
    assert!(!out.status.success());
    let err = stderr(&out);
    assert!(err.contains("'a'"), "stderr: {err}");
    assert!(err.contains("'pick'"), "stderr: {err}");
    assert!(err.contains("error: 1 of 1 form file(s) failed validation"));
}

#[test]
fn validate_rejects_malformed_json() {
    let dir = TempDir::new("validate_malformed");
    let path = dir.join("broken.json");
    fs::write(&path, "{ \"fields\": [").unwrap();

    let out = formctl(&["validate", path.to_str().unwrap()]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("broken.json"));
}

// ---------------------------------------------------------------------------
// Render
// ---------------------------------------------------------------------------

#[test]
fn render_prints_html_form() {
    let dir = TempDir::new("render_stdout");
    let path = write_json(&dir, "contact.json", &contact_schema());

    let out = formctl(&["render", path.to_str().unwrap()]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let html = stdout(&out);
    assert!(html.contains("<h2 class=\"form-title\">Contact</h2>"));
    assert!(html.contains("Select an option"));
    assert!(html.contains(">Submit Form</button>"));
}

#[test]
fn render_prefills_values_and_writes_file() {
    let dir = TempDir::new("render_values");
    let schema = write_json(&dir, "contact.json", &contact_schema());
    let values = write_json(&dir, "values.json", &json!({"name": "Ada", "agree": true}));
    let output = dir.join("form.html");

    let out = formctl(&[
        "render",
        schema.to_str().unwrap(),
        "--values",
        values.to_str().unwrap(),
        "--submit-label",
        "Send",
        "--output",
        output.to_str().unwrap(),
    ]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let html = fs::read_to_string(&output).unwrap();
    assert!(html.contains("value=\"Ada\""));
    assert!(html.contains("checked"));
    assert!(html.contains(">Send</button>"));
}

#[test]
fn render_rejects_value_outside_options() {
    let dir = TempDir::new("render_bad_value");
    let schema = write_json(&dir, "contact.json", &contact_schema());
    let values = write_json(&dir, "values.json", &json!({"topic": "Weather"}));

    let out = formctl(&[
        "render",
        schema.to_str().unwrap(),
        "--values",
        values.to_str().unwrap(),
    ]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("Invalid value for 'topic'"));
}

#[test]
fn render_looks_up_catalog_context() {
    let dir = TempDir::new("render_catalog");
    write_json(&dir, "CONTACT.json", &contact_schema());

    let out = formctl(&[
        "render",
        "--catalog",
        dir.path().to_str().unwrap(),
        "--context",
        "CONTACT",
    ]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("Contact"));

    let missing = formctl(&[
        "render",
        "--catalog",
        dir.path().to_str().unwrap(),
        "--context",
        "BOOK",
    ]);
    assert!(!missing.status.success());
    assert!(stderr(&missing).contains("No form for context 'BOOK'"));
}

// ---------------------------------------------------------------------------
// Registry commands
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread")]
async fn list_prints_registry_forms() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/forms"))
        .and(query_param("context", "CONTACT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([contact_record()])))
        .mount(&server)
        .await;

    let out = formctl(&["list", "--context", "CONTACT", "--registry-url", &server.uri()]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let listing = stdout(&out);
    assert!(listing.contains("CONTACT"));
    assert!(listing.contains("Contact"));
}

#[tokio::test(flavor = "multi_thread")]
async fn fetch_by_context_prints_schema() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/forms/by-context/CONTACT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(contact_record()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/forms/by-context/BOOK"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let out = formctl(&["fetch", "--context", "CONTACT", "--registry-url", &server.uri()]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let schema: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(schema["fields"][0]["id"], "name");

    let missing = formctl(&["fetch", "--context", "BOOK", "--registry-url", &server.uri()]);
    assert!(!missing.status.success());
    assert!(stderr(&missing).contains("No form registered for context 'BOOK'"));
}

#[tokio::test(flavor = "multi_thread")]
async fn submit_checks_required_fields_before_posting() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/forms/4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(contact_record()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/submissions"))
        .and(body_json(json!({
            "formSchemaId": 4,
            "submissionData": "{\"agree\":true,\"name\":\"Ada\"}"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 11,
            "formSchemaId": 4,
            "submissionData": "{\"agree\":true,\"name\":\"Ada\"}"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new("submit");
    let partial = write_json(&dir, "partial.json", &json!({"name": "Ada"}));
    let complete = write_json(&dir, "complete.json", &json!({"name": "Ada", "agree": true}));

    let blocked = formctl(&[
        "submit",
        "--form-id",
        "4",
        "--values",
        partial.to_str().unwrap(),
        "--registry-url",
        &server.uri(),
    ]);
    assert!(!blocked.status.success());
    let err = stderr(&blocked);
    assert!(err.contains("Please fill in the following required fields:"));
    assert!(err.contains("• I agree"));

    let sent = formctl(&[
        "submit",
        "--form-id",
        "4",
        "--values",
        complete.to_str().unwrap(),
        "--registry-url",
        &server.uri(),
    ]);
    assert!(sent.status.success(), "stderr: {}", stderr(&sent));
    assert!(stdout(&sent).contains("(submission 11)"));
}

#[test]
fn registry_commands_reject_bad_url() {
    let out = formctl(&["list", "--registry-url", "ftp://forms.local"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("invalid configuration"));
}
