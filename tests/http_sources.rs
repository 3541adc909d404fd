use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use pageturn::prefetch::{AssetLoader as _, HttpPrefetcher};
use predicates::prelude::*;

const MANIFEST: &str = r#"{
  "chapters": [
    { "number": 3, "title": "Storm", "pages": 4 },
    { "number": 0, "title": "Broken", "pages": 2 }
  ],
  "conceptArt": []
}"#;

struct Server {
    base_url: String,
    requests: mpsc::Receiver<String>,
    shutdown: mpsc::Sender<()>,
    handle: thread::JoinHandle<()>,
}

impl Server {
    fn stop(self) {
        let _ = self.shutdown.send(());
        let _ = self.handle.join();
    }
}

fn spawn_content_server() -> Server {
    let server = tiny_http::Server::http("127.0.0.1:0").expect("start tiny_http server");
    let addr = server.server_addr();
    let base_url = format!("http://{addr}");

    let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
    let (request_tx, request_rx) = mpsc::channel::<String>();

    let handle = thread::spawn(move || {
        loop {
            if shutdown_rx.try_recv().is_ok() {
                break;
            }

            let request = match server.recv_timeout(Duration::from_millis(50)) {
                Ok(Some(req)) => req,
                Ok(None) => continue,
                Err(_) => break,
            };

            let path = request.url().to_string();
            let _ = request_tx.send(path.clone());

            let response = match path.as_str() {
                "/manifest.json" => tiny_http::Response::from_string(MANIFEST),
                p if p.starts_with("/media/pages/") => {
                    tiny_http::Response::from_string("image bytes")
                }
                _ => tiny_http::Response::from_string("not found").with_status_code(404),
            };
            let _ = request.respond(response);
        }
    });

    Server {
        base_url,
        requests: request_rx,
        shutdown: shutdown_tx,
        handle,
    }
}

#[tokio::test]
async fn manifest_loads_over_http_and_drops_invalid_volumes() {
    let server = spawn_content_server();

    let manifest = pageturn::manifest::load(&format!("{}/manifest.json", server.base_url))
        .await
        .unwrap();
    assert_eq!(manifest.volumes.len(), 1);
    assert_eq!(manifest.volumes[0].number, 3);
    assert_eq!(manifest.volumes[0].page_count, 4);

    server.stop();
}

#[tokio::test]
async fn manifest_http_error_is_reported_with_status() {
    let server = spawn_content_server();

    let err = pageturn::manifest::load(&format!("{}/missing.json", server.base_url))
        .await
        .unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("404"), "{message}");

    assert!(
        pageturn::manifest::load_or_unavailable(&format!("{}/missing.json", server.base_url))
            .await
            .is_none()
    );

    server.stop();
}

#[tokio::test(flavor = "multi_thread")]
async fn prefetch_requests_asset_relative_to_base() {
    let server = spawn_content_server();

    let mut loader = HttpPrefetcher::new(&format!("{}/media", server.base_url)).unwrap();
    loader.prefetch("pages/chapter-03/002.jpg");

    let requested = server
        .requests
        .recv_timeout(Duration::from_secs(5))
        .unwrap();
    assert_eq!(requested, "/media/pages/chapter-03/002.jpg");

    server.stop();
}

#[test]
fn replay_reads_manifest_from_url() {
    let server = spawn_content_server();

    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("session.txt");
    std::fs::write(&script, "next\nnext\n").unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("pageturn");
    cmd.env_remove("PAGETURN_ASSET_ROOT")
        .args(["replay", "--start", "#/read/3/1", "--manifest"])
        .arg(format!("{}/manifest.json", server.base_url))
        .arg("--script")
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::contains(r##""fragment":"#/read/3/3""##))
        .stdout(predicate::str::contains(
            r#""src":"assets/pages/chapter-03/004.jpg""#,
        ));

    server.stop();
}
