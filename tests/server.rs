//! End-to-end tests: a real listener, real sockets, a real snapshot file.

use durin::commands::Router;
use durin::connection::ConnectionStats;
use durin::server::{accept_loop, open_store};
use durin::storage::{snapshot, Persister, PersisterConfig, Store};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};

async fn start_server(store: Arc<Store>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let stats = Arc::new(ConnectionStats::new());

    tokio::spawn(accept_loop(listener, Router::new(store), stats));
    addr
}

struct TestClient {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl TestClient {
    async fn connect(addr: SocketAddr) -> Self {
        let (reader, writer) = TcpStream::connect(addr).await.unwrap().into_split();
        Self {
            lines: BufReader::new(reader).lines(),
            writer,
        }
    }

    async fn send(&mut self, request: &str) -> String {
        self.writer.write_all(request.as_bytes()).await.unwrap();
        self.lines.next_line().await.unwrap().unwrap()
    }
}

#[tokio::test]
async fn set_then_get() {
    let addr = start_server(Arc::new(Store::new())).await;
    let mut client = TestClient::connect(addr).await;

    assert_eq!(client.send("set foo bar\n").await, "OK");
    assert_eq!(client.send("get foo\n").await, "bar");
}

#[tokio::test]
async fn get_missing_key() {
    let addr = start_server(Arc::new(Store::new())).await;
    let mut client = TestClient::connect(addr).await;

    assert_eq!(client.send("get missing\n").await, "(error) key not found");
}

#[tokio::test]
async fn keys_on_empty_store() {
    let addr = start_server(Arc::new(Store::new())).await;
    let mut client = TestClient::connect(addr).await;

    assert_eq!(client.send("keys\n").await, "[]");
}

#[tokio::test]
async fn keys_near_miss_is_a_distinct_syntax_error() {
    let addr = start_server(Arc::new(Store::new())).await;
    let mut client = TestClient::connect(addr).await;

    let near_miss = client.send("keysxyz\n").await;
    let plain = client.send("nonsense\n").await;

    assert!(near_miss.starts_with("(error) invalid syntax"));
    assert!(near_miss.contains("keys"));
    assert_ne!(near_miss, plain);
}

#[tokio::test]
async fn set_with_empty_value_leaves_store_unchanged() {
    let store = Arc::new(Store::new());
    let addr = start_server(Arc::clone(&store)).await;
    let mut client = TestClient::connect(addr).await;

    assert_eq!(client.send("set foo \n").await, "(error) invalid value");
    assert!(store.is_empty());

    // The connection is still usable.
    assert_eq!(client.send("set foo bar\n").await, "OK");
}

#[tokio::test]
async fn json_filters_by_prefix() {
    let addr = start_server(Arc::new(Store::new())).await;
    let mut client = TestClient::connect(addr).await;

    client.send("set prefix1 a\n").await;
    client.send("set other b\n").await;

    assert_eq!(client.send("json pre\n").await, "{\"prefix1\":\"a\"}");
}

#[tokio::test]
async fn concurrent_clients() {
    let store = Arc::new(Store::new());
    let addr = start_server(Arc::clone(&store)).await;

    let mut tasks = Vec::new();
    for i in 0..8 {
        tasks.push(tokio::spawn(async move {
            let mut client = TestClient::connect(addr).await;
            for j in 0..25 {
                let reply = client.send(&format!("set k{}-{} v{}\n", i, j, j)).await;
                assert_eq!(reply, "OK");
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(store.len(), 200);
}

async fn wait_for_snapshot(path: &Path, expected: &HashMap<String, String>) -> bool {
    for _ in 0..50 {
        if let Ok(on_disk) = snapshot::load(path).await {
            if &on_disk == expected {
                return true;
            }
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}

#[tokio::test]
async fn restart_restores_persisted_state() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("durin.db");
    let config = PersisterConfig::new(&path).with_interval(Duration::from_millis(20));

    {
        let store = Arc::new(open_store(Some(&path)).await.unwrap());
        let _persister = Persister::start(Arc::clone(&store), config.clone());
        let addr = start_server(Arc::clone(&store)).await;
        let mut client = TestClient::connect(addr).await;

        client.send("set a 1\n").await;
        client.send("set b 2\n").await;
        client.send("del b\n").await;

        let expected = HashMap::from([("a".to_string(), "1".to_string())]);
        assert!(wait_for_snapshot(&path, &expected).await);
    }

    let reopened = open_store(Some(&path)).await.unwrap();
    assert_eq!(reopened.get("a"), Some("1".to_string()));
    assert_eq!(reopened.get("b"), None);
}
