use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};
use serde_json::json;
use test_log::test;

use super::request::{ApiResponse, Method, JSON_CONTENT_TYPE};
use super::transport::MockHttpTransport;
use super::{ApiClient, ApiError};
use crate::config::{ApiConfig, DEFAULT_LIVE_API_URL, ENV_STORAGE_KEY, LOCAL_LIVE_API_URL, LOCAL_TEST_API_URL};
use crate::context::{BrowserSession, ExecutionContext};
use crate::storage::{EnvStore, MemoryStore};

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Project {
    id: u32,
    name: String,
}

fn server_client(transport: MockHttpTransport) -> ApiClient {
    ApiClient::new(ApiConfig::default(), Arc::new(ExecutionContext::Server), Arc::new(transport))
}

#[test(tokio::test)]
async fn test_get_attaches_json_header_and_timeout() {
    let mut transport = MockHttpTransport::new();
    transport
        .expect_send()
        .withf(|request| {
            request.method == Method::Get
                && request.url == format!("{}/projects", DEFAULT_LIVE_API_URL)
                && request.headers.len() == 1
                && request.header("Content-Type") == Some(JSON_CONTENT_TYPE)
                && request.timeout == Duration::from_millis(45_000)
                && request.body.is_none()
        })
        .times(1)
        .returning(|_| Ok(ApiResponse::new(200, "[]")));

    let response = server_client(transport).get("/projects").await.unwrap();
    assert_eq!(response.text(), "[]");
}

#[test(tokio::test)]
async fn test_post_serializes_body() {
    let mut transport = MockHttpTransport::new();
    transport
        .expect_send()
        .withf(|request| {
            request.method == Method::Post && request.body == Some(json!({"id": 1, "name": "Seoul"}))
        })
        .times(1)
        .returning(|_| Ok(ApiResponse::new(201, r#"{"id": 1, "name": "Seoul"}"#)));

    let project = Project {
        id: 1,
        name: "Seoul".to_string(),
    };
    let created: Project = server_client(transport).post_json("/projects", &project).await.unwrap();
    assert_eq!(created, project);
}

#[test(tokio::test)]
async fn test_put_patch_delete_methods() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&seen);

    let mut transport = MockHttpTransport::new();
    transport.expect_send().times(3).returning(move |request| {
        recorder.lock().unwrap().push(request.method);
        Ok(ApiResponse::new(204, ""))
    });

    let client = server_client(transport);
    client.put("/projects/1", &json!({"name": "a"})).await.unwrap();
    client.patch("/projects/1", &json!({"name": "b"})).await.unwrap();
    client.delete("/projects/1").await.unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![Method::Put, Method::Patch, Method::Delete]);
}

#[test(tokio::test)]
async fn test_status_error_is_returned_with_payload() {
    let mut transport = MockHttpTransport::new();
    transport
        .expect_send()
        .times(1)
        .returning(|_| Ok(ApiResponse::new(404, r#"{"detail":"not found"}"#)));

    let error = server_client(transport).get("/projects/99").await.unwrap_err();
    assert_eq!(
        error,
        ApiError::Status {
            status: 404,
            body: Some(r#"{"detail":"not found"}"#.to_string()),
        }
    );
    assert_eq!(error.diagnostic(), r#"{"detail":"not found"}"#);
}

#[test(tokio::test)]
async fn test_empty_error_body_has_no_payload() {
    let mut transport = MockHttpTransport::new();
    transport
        .expect_send()
        .times(1)
        .returning(|_| Ok(ApiResponse::new(500, "")));

    let error = server_client(transport).get("/health").await.unwrap_err();
    assert_eq!(error.payload(), None);
    assert_eq!(error.status(), Some(500));
}

#[test(tokio::test)]
async fn test_transport_error_is_propagated_unchanged() {
    let mut transport = MockHttpTransport::new();
    transport
        .expect_send()
        .times(1)
        .returning(|_| Err(ApiError::Network("connection reset".to_string())));

    let error = server_client(transport).get("/projects").await.unwrap_err();
    assert_eq!(error, ApiError::Network("connection reset".to_string()));
}

#[test(tokio::test)]
async fn test_decode_error_on_unexpected_body() {
    let mut transport = MockHttpTransport::new();
    transport
        .expect_send()
        .times(1)
        .returning(|_| Ok(ApiResponse::new(200, "<html></html>")));

    let result: Result<Project, ApiError> = server_client(transport).get_json("/projects/1").await;
    assert!(matches!(result, Err(ApiError::Decode(_))));
}

#[test(tokio::test)]
async fn test_base_url_is_resolved_per_request() {
    let urls = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&urls);

    let mut transport = MockHttpTransport::new();
    transport.expect_send().times(3).returning(move |request| {
        recorder.lock().unwrap().push(request.url);
        Ok(ApiResponse::new(200, "{}"))
    });

    let store = Arc::new(MemoryStore::new());
    let session = Arc::new(BrowserSession::open("http://localhost:5173/", store.clone()).unwrap());
    let client = ApiClient::new(ApiConfig::default(), session.clone(), Arc::new(transport));

    client.get("/summary").await.unwrap();

    session.navigate("http://localhost:5173/?env=test").unwrap();
    client.get("/summary").await.unwrap();

    // The selection sticks after the parameter is gone
    session.navigate("http://localhost:5173/reports").unwrap();
    client.get("/summary").await.unwrap();

    assert_eq!(
        *urls.lock().unwrap(),
        vec![
            format!("{}/summary", LOCAL_LIVE_API_URL),
            format!("{}/summary", LOCAL_TEST_API_URL),
            format!("{}/summary", LOCAL_TEST_API_URL),
        ]
    );
    assert_eq!(store.get(ENV_STORAGE_KEY), Some("test".to_string()));
}

#[test]
fn test_endpoint_uses_configured_timeout_and_urls() {
    let config = ApiConfig::default()
        .with_test_api_url("https://test.example.com/api/v1")
        .with_timeout(Duration::from_secs(5));
    let store: Arc<dyn EnvStore> = Arc::new(MemoryStore::with_entry(ENV_STORAGE_KEY, "dev"));
    let context = ExecutionContext::browser("https://console.pice.example/", store).unwrap();
    let client = ApiClient::new(config, Arc::new(context), Arc::new(MockHttpTransport::new()));

    let request = client.build_request(Method::Get, "/items", None);
    assert_eq!(request.url, "https://test.example.com/api/v1/items");
    assert_eq!(request.timeout, Duration::from_secs(5));
}

mod reqwest_transport {
    use super::*;
    use crate::api::ReqwestTransport;
    use pretty_assertions::assert_eq;
    use test_log::test;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn client_for(base_url: &str, timeout: Duration) -> ApiClient {
        let config = ApiConfig::default().with_live_api_url(base_url).with_timeout(timeout);
        ApiClient::new(config, Arc::new(ExecutionContext::Server), Arc::new(ReqwestTransport::new()))
    }

    /// Serve a single canned response and hand back the raw request head.
    async fn serve_once(listener: TcpListener, response: &'static str) -> String {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut received: Vec<u8> = Vec::new();
        let mut buf = [0u8; 1024];
        while !received.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            received.extend_from_slice(&buf[..n]);
        }
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        String::from_utf8_lossy(&received).to_string()
    }

    #[test(tokio::test)]
    async fn test_headers_reach_the_wire() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(serve_once(
            listener,
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 20\r\nConnection: close\r\n\r\n{\"id\":3,\"name\":\"ok\"}",
        ));

        let client = client_for(&format!("http://{}/api/v1", addr), Duration::from_secs(5));
        let project: Project = client.get_json("/projects/3").await.unwrap();
        assert_eq!(
            project,
            Project {
                id: 3,
                name: "ok".to_string()
            }
        );

        let head = server.await.unwrap().to_lowercase();
        assert!(head.starts_with("get /api/v1/projects/3 http/1.1"));
        assert!(head.contains("content-type: application/json"));
        assert!(!head.contains("authorization"));
    }

    #[test(tokio::test)]
    async fn test_slow_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(2)).await;
            drop(socket);
        });

        let timeout = Duration::from_millis(200);
        let client = client_for(&format!("http://{}/api/v1", addr), timeout);
        let error = client.get("/slow").await.unwrap_err();
        assert_eq!(error, ApiError::Timeout(timeout));

        server.abort();
    }

    #[test(tokio::test)]
    async fn test_refused_connection_is_network_error() {
        // Bind then drop to get a port nothing listens on
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap()
        };

        let client = client_for(&format!("http://{}/api/v1", addr), Duration::from_secs(5));
        let error = client.get("/projects").await.unwrap_err();
        assert!(matches!(error, ApiError::Network(_)), "unexpected error: {:?}", error);
    }
}
