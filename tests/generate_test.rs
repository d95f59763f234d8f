use crd_to_openapischema::{generate, CrdError, Error, FetchError, Generator, GeneratorConfig};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

const WIDGET_CRD: &str = r#"
apiVersion: apiextensions.k8s.io/v1
kind: CustomResourceDefinition
metadata:
  name: widgets.example.com
spec:
  group: example.com
  names:
    kind: Widget
    plural: widgets
  scope: Namespaced
  versions:
    - name: v1alpha1
      served: true
      storage: false
      schema:
        openAPIV3Schema:
          type: object
          properties:
            spec:
              type: object
              properties:
                size:
                  type: integer
                  minimum: 1
    - name: v1beta1
      served: true
      storage: false
    - name: v1
      served: true
      storage: true
      schema:
        openAPIV3Schema:
          type: object
          properties:
            spec:
              type: object
              required: [size]
              properties:
                size:
                  type: integer
                color:
                  type: string
                  enum: [red, green, blue]
"#;

const LEGACY_CRD: &str = r#"
apiVersion: apiextensions.k8s.io/v1beta1
kind: CustomResourceDefinition
metadata:
  name: crontabs.stable.example.com
spec:
  group: stable.example.com
  version: v1beta1
  names:
    kind: CronTab
  validation:
    openAPIV3Schema:
      type: object
      properties:
        cronSpec:
          type: string
"#;

fn write_crd(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path.to_string_lossy().into_owned()
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Serve a single canned HTTP response and hand back the raw request
async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }

        let response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();

        String::from_utf8_lossy(&request).into_owned()
    });

    (format!("http://{addr}/crds/widget.yaml"), handle)
}

#[tokio::test]
async fn test_stable_crd_writes_one_file_per_schema() {
    let temp_dir = TempDir::new().unwrap();
    let crd = write_crd(temp_dir.path(), "widget.yaml", WIDGET_CRD);
    let output_dir = temp_dir.path().join("schemas");

    let files = generate(&crd, &output_dir).await.unwrap();

    assert_eq!(
        files,
        vec![
            output_dir.join("widget-v1-example.com.json"),
            output_dir.join("widget-v1alpha1-example.com.json"),
        ]
    );
    assert_eq!(
        file_names(&output_dir),
        vec!["widget-v1-example.com.json", "widget-v1alpha1-example.com.json"]
    );

    let v1 = read_json(&output_dir.join("widget-v1-example.com.json"));
    assert_eq!(
        v1,
        json!({
            "type": "object",
            "properties": {
                "spec": {
                    "type": "object",
                    "required": ["size"],
                    "properties": {
                        "size": {"type": "integer"},
                        "color": {"type": "string", "enum": ["red", "green", "blue"]}
                    }
                }
            }
        })
    );
}

#[tokio::test]
async fn test_legacy_crd_writes_single_file() {
    let temp_dir = TempDir::new().unwrap();
    let crd = write_crd(temp_dir.path(), "crontab.yaml", LEGACY_CRD);
    let output_dir = temp_dir.path().join("out");

    let files = generate(&crd, &output_dir).await.unwrap();

    assert_eq!(files, vec![output_dir.join("crontab-v1beta1-stable.example.com.json")]);
    assert_eq!(
        read_json(&files[0]),
        json!({"type": "object", "properties": {"cronSpec": {"type": "string"}}})
    );
}

#[tokio::test]
async fn test_json_manifest() {
    let temp_dir = TempDir::new().unwrap();
    let manifest = json!({
        "apiVersion": "apiextensions.k8s.io/v1",
        "kind": "CustomResourceDefinition",
        "spec": {
            "group": "example.com",
            "names": {"kind": "Gadget"},
            "versions": [{"name": "v2", "schema": {"openAPIV3Schema": {"type": "object"}}}]
        }
    });
    let crd = write_crd(temp_dir.path(), "gadget.json", &manifest.to_string());

    let files = generate(&crd, temp_dir.path()).await.unwrap();

    assert_eq!(files, vec![temp_dir.path().join("gadget-v2-example.com.json")]);
}

#[tokio::test]
async fn test_rerun_overwrites_with_identical_content() {
    let temp_dir = TempDir::new().unwrap();
    let crd = write_crd(temp_dir.path(), "widget.yaml", WIDGET_CRD);
    let output_dir = temp_dir.path().join("schemas");

    let first = generate(&crd, &output_dir).await.unwrap();
    let first_contents: Vec<Vec<u8>> = first.iter().map(|f| fs::read(f).unwrap()).collect();

    let second = generate(&crd, &output_dir).await.unwrap();
    let second_contents: Vec<Vec<u8>> = second.iter().map(|f| fs::read(f).unwrap()).collect();

    assert_eq!(first, second);
    assert_eq!(first_contents, second_contents);
    assert_eq!(file_names(&output_dir).len(), 2);
}

#[tokio::test]
async fn test_generate_schemas_does_not_write() {
    let temp_dir = TempDir::new().unwrap();
    let crd = write_crd(temp_dir.path(), "widget.yaml", WIDGET_CRD);
    let output_dir = temp_dir.path().join("never-created");

    let generator = Generator::new(GeneratorConfig::new(&output_dir));
    let set = generator.generate_schemas(&crd).await.unwrap();

    assert!(set.is_complete());
    assert_eq!(set.schemas().len(), 2);
    assert!(set.schemas().contains_key("widget-v1alpha1-example.com.json"));
    assert!(!output_dir.exists());
}

#[tokio::test]
async fn test_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("missing.yaml");
    let crd = missing.to_string_lossy().into_owned();

    let err = generate(&crd, temp_dir.path()).await.unwrap_err();

    assert!(matches!(err.root(), Error::NotFound(_)));
    assert_eq!(
        err.to_string(),
        format!("error on crd '{crd}': {} was not found", missing.display())
    );
}

#[tokio::test]
async fn test_malformed_manifest_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let crd = write_crd(temp_dir.path(), "broken.yaml", "apiVersion: [oops\n  kind");
    let output_dir = temp_dir.path().join("schemas");

    let err = generate(&crd, &output_dir).await.unwrap_err();

    match err.root() {
        Error::Crd(crd_err) => assert!(crd_err.is_decode()),
        other => panic!("expected decode error, got {other:?}"),
    }
    assert!(!output_dir.exists());
}

#[tokio::test]
async fn test_crd_without_schemas() {
    let temp_dir = TempDir::new().unwrap();
    let crd = write_crd(
        temp_dir.path(),
        "bare.yaml",
        r#"
apiVersion: apiextensions.k8s.io/v1
kind: CustomResourceDefinition
spec:
  group: example.com
  names:
    kind: Bare
  versions:
    - name: v1
      served: true
      storage: true
"#,
    );

    let err = generate(&crd, temp_dir.path()).await.unwrap_err();

    assert!(matches!(err.root(), Error::Crd(CrdError::NoSchema)));
    assert_eq!(err.to_string(), format!("error on crd '{crd}': no validation specified"));
}

#[tokio::test]
async fn test_partial_write_failure() {
    let temp_dir = TempDir::new().unwrap();
    let crd = write_crd(temp_dir.path(), "widget.yaml", WIDGET_CRD);
    let output_dir = temp_dir.path().join("schemas");
    let blocked = output_dir.join("widget-v1alpha1-example.com.json");
    fs::create_dir_all(blocked.join("occupied")).unwrap();

    let err = generate(&crd, &output_dir).await.unwrap_err();

    let Error::Write(report) = err.root() else {
        panic!("expected write error, got {err:?}");
    };
    assert_eq!(report.written, vec![output_dir.join("widget-v1-example.com.json")]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].path, blocked);
    assert!(output_dir.join("widget-v1-example.com.json").is_file());
    assert!(!err.to_string().contains("widget-v1-example.com.json"));
}

#[tokio::test]
async fn test_fetch_from_url() {
    let (url, server) = serve_once("200 OK", WIDGET_CRD).await;
    let temp_dir = TempDir::new().unwrap();

    let files = generate(&url, temp_dir.path()).await.unwrap();
    let request = server.await.unwrap();

    assert_eq!(files.len(), 2);
    assert!(request.starts_with("GET /crds/widget.yaml HTTP/1.1\r\n"));
    assert!(request
        .to_ascii_lowercase()
        .contains("user-agent: replicated_crdtoopenapischema/v1alpha1"));
}

#[tokio::test]
async fn test_fetch_not_found() {
    let (url, server) = serve_once("404 Not Found", "not here").await;
    let temp_dir = TempDir::new().unwrap();
    let output_dir = temp_dir.path().join("schemas");

    let err = generate(&url, &output_dir).await.unwrap_err();
    server.await.unwrap();

    assert!(matches!(err.root(), Error::Fetch(FetchError::Status(status)) if status == "404 Not Found"));
    assert_eq!(err.to_string(), format!("error on crd '{url}': 404 Not Found"));
    assert!(!output_dir.exists());
}

#[tokio::test]
async fn test_unreachable_url() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = generate(&format!("http://{addr}/crd.yaml"), "./")
        .await
        .unwrap_err();

    assert!(matches!(err.root(), Error::Fetch(FetchError::Request(_))));
}
