use std::path::Path;

use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinSet;

struct TestServer {
    base_url: String,
    shutdown: Option<oneshot::Sender<()>>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Helper: run the echo app on a random port with `scratch_dir` as its
/// scratch directory.
async fn start_server(scratch_dir: &Path) -> TestServer {
    let config = quecho_config::Echo {
        scratch_dir: scratch_dir.to_string_lossy().into_owned(),
        content_type: "applicaton/json".to_string(),
    };
    let app = quecho::app(&config).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel::<()>();

    tokio::spawn(app.serve(listener, async move {
        let _ = rx.await;
    }));

    TestServer {
        base_url: format!("http://{addr}"),
        shutdown: Some(tx),
    }
}

fn file_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

#[tokio::test]
async fn test_echo_with_partial_params() {
    let tmp = tempfile::tempdir().unwrap();
    let server = start_server(tmp.path()).await;

    let resp = reqwest::get(format!("{}/?q1=a&q2=b&q3=&q4=", server.base_url))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["content-type"], "applicaton/json");
    assert_eq!(
        resp.text().await.unwrap(),
        r#"{"queryParam1":"a","queryParam2":"b","queryParam3":"","queryParam4":""}"#
    );
    assert_eq!(file_count(tmp.path()), 0);
}

#[tokio::test]
async fn test_echo_without_params() {
    let tmp = tempfile::tempdir().unwrap();
    let server = start_server(tmp.path()).await;

    let resp = reqwest::get(format!("{}/", server.base_url)).await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.text().await.unwrap(),
        r#"{"queryParam1":"","queryParam2":"","queryParam3":"","queryParam4":""}"#
    );
}

#[tokio::test]
async fn test_any_method_and_path_is_echoed() {
    let tmp = tempfile::tempdir().unwrap();
    let server = start_server(tmp.path()).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/some/other/path?q3=x%26y&q4=hello+world", server.base_url))
        .body("ignored")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = serde_json::from_slice(&resp.bytes().await.unwrap()).unwrap();
    assert_eq!(body["queryParam1"], "");
    assert_eq!(body["queryParam3"], "x&y");
    assert_eq!(body["queryParam4"], "hello world");
}

#[tokio::test]
async fn test_concurrent_requests_do_not_leak_into_each_other() {
    let tmp = tempfile::tempdir().unwrap();
    let server = start_server(tmp.path()).await;
    let client = reqwest::Client::new();

    let mut requests = JoinSet::new();
    for i in 0..100 {
        let client = client.clone();
        let url = format!("{}/?q1={i}&q2=p{i}&q3=x&q4={}", server.base_url, i * 2);
        requests.spawn(async move {
            let body = client.get(url).send().await.unwrap().text().await.unwrap();
            (i, body)
        });
    }

    let mut seen = 0;
    while let Some(result) = requests.join_next().await {
        let (i, body) = result.unwrap();
        let expected = format!(
            r#"{{"queryParam1":"{i}","queryParam2":"p{i}","queryParam3":"x","queryParam4":"{}"}}"#,
            i * 2
        );
        assert_eq!(body, expected);
        seen += 1;
    }
    assert_eq!(seen, 100);
    assert_eq!(file_count(tmp.path()), 0);
}

#[tokio::test]
async fn test_missing_scratch_dir_fails_without_killing_server() {
    let tmp = tempfile::tempdir().unwrap();
    let scratch = tmp.path().join("json");
    let server = start_server(&scratch).await;

    let resp = reqwest::get(format!("{}/?q1=a", server.base_url)).await.unwrap();
    assert_eq!(resp.status(), 500);
    let body: serde_json::Value = serde_json::from_slice(&resp.bytes().await.unwrap()).unwrap();
    assert_eq!(body["status"], 500);
    assert!(body.get("queryParam1").is_none());

    std::fs::create_dir(&scratch).unwrap();
    let resp = reqwest::get(format!("{}/?q1=a", server.base_url)).await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.text().await.unwrap(),
        r#"{"queryParam1":"a","queryParam2":"","queryParam3":"","queryParam4":""}"#
    );
    assert_eq!(file_count(&scratch), 0);
}

#[tokio::test]
async fn test_html_characters_are_unicode_escaped_on_the_wire() {
    let tmp = tempfile::tempdir().unwrap();
    let server = start_server(tmp.path()).await;

    let resp = reqwest::get(format!("{}/?q1=%3Cscript%3E&q2=a%26b&q3=%zz&q4=x;y", server.base_url))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.text().await.unwrap(),
        r#"{"queryParam1":"\u003cscript\u003e","queryParam2":"a\u0026b","queryParam3":"","queryParam4":""}"#
    );
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let server = start_server(tmp.path()).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/?q1=a", server.base_url))
        .body(vec![b'x'; quecho_core::DEFAULT_BODY_LIMIT + 1])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 413);
    assert_eq!(file_count(tmp.path()), 0);
}
