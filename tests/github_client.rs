// Integration tests for GitHubClient against a canned local HTTP responder.

use std::time::{Duration, SystemTime};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use kle_cache::github::{GistApi, GistResponse};
use kle_cache::{Config, Credential, FetchError, GitHubClient};

/// Serve a single HTTP response and hand back the raw request text.
async fn serve_once(response: String) -> (Config, JoinHandle<String>) {
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
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
        String::from_utf8_lossy(&request).to_lowercase()
    });

    let config = Config::default()
        .with_api_root(format!("http://{addr}"))
        .unwrap();
    (config, handle)
}

fn http_response(status: &str, headers: &[(&str, &str)], body: &str) -> String {
    let mut out = format!("HTTP/1.1 {status}\r\n");
    for (name, value) in headers {
        out.push_str(&format!("{name}: {value}\r\n"));
    }
    out.push_str(&format!(
        "content-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    ));
    out
}

const GIST_JSON: &str = r#"{"id":"abc123","files":{"layout.kbd.json":{"filename":"layout.kbd.json","content":"[\n[\"Esc\"]\n]"}}}"#;

#[tokio::test]
async fn test_get_gist_sends_media_type_and_user_agent() {
    let (config, server) = serve_once(http_response(
        "200 OK",
        &[("content-type", "application/json")],
        GIST_JSON,
    ))
    .await;
    let mut client = GitHubClient::new(&config).unwrap();

    let response = client.get_gist("abc123", None, None).await.unwrap();

    let GistResponse::Body(gist) = response else {
        panic!("expected a gist body");
    };
    assert_eq!(gist.id, "abc123");
    assert_eq!(gist.files["layout.kbd.json"].content, "[\n[\"Esc\"]\n]");

    let request = server.await.unwrap();
    assert!(request.starts_with("get /gists/abc123 http/1.1"), "{request}");
    assert!(request.contains("accept: application/vnd.github.v3+json"));
    assert!(request.contains("user-agent: kle-cache/"));
    assert!(!request.contains("access_token"));
    assert!(!request.contains("if-modified-since"));
}

#[tokio::test]
async fn test_conditional_request_maps_304() {
    let (config, server) = serve_once(http_response("304 Not Modified", &[], "")).await;
    let mut client = GitHubClient::new(&config).unwrap();
    let stored_at = SystemTime::UNIX_EPOCH + Duration::from_secs(784_111_777);
    let credential = Credential::new("tok123");

    let response = client
        .get_gist("abc123", Some(&credential), Some(stored_at))
        .await
        .unwrap();

    assert!(matches!(response, GistResponse::NotModified));
    let request = server.await.unwrap();
    assert!(request.starts_with("get /gists/abc123?access_token=tok123 "), "{request}");
    assert!(request.contains("if-modified-since: sun, 06 nov 1994 08:49:37 gmt"));
}

#[tokio::test]
async fn test_list_gists_sends_paging_and_returns_link() {
    let link = r#"<https://api.github.com/gists?per_page=25&page=3>; rel="next", <https://api.github.com/gists?per_page=25&page=4>; rel="last""#;
    let (config, server) = serve_once(http_response(
        "200 OK",
        &[
            ("content-type", "application/json"),
            ("link", link),
            ("x-ratelimit-limit", "5000"),
            ("x-ratelimit-remaining", "4999"),
        ],
        r#"[{"id":"1","files":{"board.kbd.json":{"filename":"board.kbd.json"}}}]"#,
    ))
    .await;
    let mut client = GitHubClient::new(&config).unwrap();

    let page = client
        .list_gists(&Credential::new("tok"), 2, 25)
        .await
        .unwrap();

    assert_eq!(page.gists.len(), 1);
    assert_eq!(page.link.as_deref(), Some(link));
    assert_eq!(client.rate_limit().limit, 5000);
    assert_eq!(client.rate_limit().remaining, 4999);

    let request = server.await.unwrap();
    assert!(
        request.starts_with("get /gists?per_page=25&page=2&access_token=tok "),
        "{request}"
    );
}

#[tokio::test]
async fn test_not_found() {
    let (config, _server) =
        serve_once(http_response("404 Not Found", &[], r#"{"message":"Not Found"}"#)).await;
    let mut client = GitHubClient::new(&config).unwrap();

    let err = client.get_gist("missing", None, None).await.unwrap_err();
    assert!(matches!(err, FetchError::NotFound(_)));
}

#[tokio::test]
async fn test_rate_limited() {
    let (config, _server) = serve_once(http_response(
        "403 Forbidden",
        &[
            ("x-ratelimit-remaining", "0"),
            ("x-ratelimit-reset", "1700000000"),
        ],
        r#"{"message":"API rate limit exceeded"}"#,
    ))
    .await;
    let mut client = GitHubClient::new(&config).unwrap();

    let err = client.get_gist("abc123", None, None).await.unwrap_err();
    assert!(matches!(err, FetchError::RateLimited { .. }));
}

#[tokio::test]
async fn test_server_error_keeps_body() {
    let (config, _server) =
        serve_once(http_response("502 Bad Gateway", &[], "upstream down")).await;
    let mut client = GitHubClient::new(&config).unwrap();

    let err = client.get_gist("abc123", None, None).await.unwrap_err();
    match err {
        FetchError::Status { status, body } => {
            assert_eq!(status.as_u16(), 502);
            assert_eq!(body, "upstream down");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_malformed_json_is_transport_error() {
    let (config, _server) = serve_once(http_response(
        "200 OK",
        &[("content-type", "application/json")],
        "{not json",
    ))
    .await;
    let mut client = GitHubClient::new(&config).unwrap();

    let err = client.get_gist("abc123", None, None).await.unwrap_err();
    assert!(matches!(err, FetchError::Transport(_)));
}
