use std::sync::{Arc, Mutex};

use reqwest::StatusCode;
use services::{DriveError, DriveFetcher};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;

const SHARE_URL: &str = "https://drive.google.com/file/d/abc/view?usp=sharing";

/// One request as the local host saw it.
#[derive(Clone, Debug)]
struct Seen {
    target: String,
    cookie: Option<String>,
}

type Handler = fn(&str) -> String;

/// Serves `handler` on a loopback port, one request per connection.
async fn serve(handler: Handler) -> (Url, Arc<Mutex<Vec<Seen>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut head = Vec::new();
            let mut chunk = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                match socket.read(&mut chunk).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => head.extend_from_slice(&chunk[..n]),
                }
            }
            let head = String::from_utf8_lossy(&head).to_string();
            let target = head.split_whitespace().nth(1).unwrap_or_default().to_string();
            let cookie = head.lines().find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("cookie")
                    .then(|| value.trim().to_string())
            });
            log.lock().unwrap().push(Seen {
                target: target.clone(),
                cookie,
            });

            let _ = socket.write_all(handler(&target).as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    (Url::parse(&format!("http://{addr}/uc")).unwrap(), seen)
}

fn respond(status: &str, headers: &[(&str, &str)], body: &str) -> String {
    let mut out = format!(
        "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n",
        body.len()
    );
    for (name, value) in headers {
        out.push_str(&format!("{name}: {value}\r\n"));
    }
    out.push_str("\r\n");
    out.push_str(body);
    out
}

fn requests(seen: &Arc<Mutex<Vec<Seen>>>) -> Vec<Seen> {
    seen.lock().unwrap().clone()
}

#[tokio::test]
async fn follows_redirect_and_replays_confirm_token_with_cookies() {
    let (base, seen) = serve(|target| {
        if target.contains("confirm=T0k") {
            respond("200 OK", &[("Content-Type", "application/pdf")], "PDFDATA")
        } else if target.starts_with("/uc?") {
            respond(
                "302 Found",
                &[("Location", "/interstitial"), ("Set-Cookie", "NID=1; Path=/")],
                "",
            )
        } else if target == "/interstitial" {
            respond(
                "200 OK",
                &[("Content-Type", "text/html; charset=utf-8")],
                r#"<p>Too large to scan.</p><a href="/uc?export=download&amp;confirm=T0k&amp;id=abc">Download anyway</a>"#,
            )
        } else {
            respond("404 Not Found", &[], "")
        }
    })
    .await;

    let fetcher = DriveFetcher::with_download_base(base).unwrap();
    let file = fetcher.fetch(SHARE_URL).await.unwrap();
    assert_eq!(file.bytes, b"PDFDATA");
    assert_eq!(file.content_type.as_deref(), Some("application/pdf"));

    let seen = requests(&seen);
    let targets: Vec<&str> = seen.iter().map(|s| s.target.as_str()).collect();
    assert_eq!(
        targets,
        [
            "/uc?export=download&id=abc",
            "/interstitial",
            "/uc?export=download&id=abc&confirm=T0k",
        ]
    );
    assert_eq!(seen[0].cookie, None);
    assert_eq!(seen[1].cookie.as_deref(), Some("NID=1"));
    assert_eq!(seen[2].cookie.as_deref(), Some("NID=1"));
}

#[tokio::test]
async fn forbidden_response_is_access_denied() {
    let (base, _) = serve(|_| respond("403 Forbidden", &[], "")).await;
    let fetcher = DriveFetcher::with_download_base(base).unwrap();
    let err = fetcher.fetch(SHARE_URL).await.unwrap_err();
    assert!(matches!(err, DriveError::AccessDenied));
    assert!(err.to_string().contains("anyone with the link"));
}

#[tokio::test]
async fn sign_in_page_is_access_denied() {
    let (base, _) = serve(|_| {
        respond(
            "200 OK",
            &[("Content-Type", "text/html")],
            r#"<form action="https://accounts.google.com/ServiceLogin"><h1>Sign in</h1></form>"#,
        )
    })
    .await;
    let fetcher = DriveFetcher::with_download_base(base).unwrap();
    assert!(matches!(
        fetcher.fetch(SHARE_URL).await,
        Err(DriveError::AccessDenied)
    ));
}

#[tokio::test]
async fn endless_redirects_give_up() {
    let (base, seen) = serve(|_| respond("302 Found", &[("Location", "/again")], "")).await;
    let fetcher = DriveFetcher::with_download_base(base).unwrap();
    assert!(matches!(
        fetcher.fetch(SHARE_URL).await,
        Err(DriveError::TooManyRedirects)
    ));
    // The first request plus five redirects.
    assert_eq!(requests(&seen).len(), 6);
}

#[tokio::test]
async fn missing_file_reports_status() {
    let (base, _) = serve(|_| respond("404 Not Found", &[], "")).await;
    let fetcher = DriveFetcher::with_download_base(base).unwrap();
    match fetcher.fetch(SHARE_URL).await {
        Err(DriveError::HttpStatus(status)) => assert_eq!(status, StatusCode::NOT_FOUND),
        other => panic!("expected HTTP status error, got {other:?}"),
    }
}

#[tokio::test]
async fn share_link_without_id_is_rejected_before_any_request() {
    let (base, seen) = serve(|_| respond("200 OK", &[], "")).await;
    let fetcher = DriveFetcher::with_download_base(base).unwrap();
    assert!(matches!(
        fetcher.fetch("https://drive.google.com/drive/my-drive").await,
        Err(DriveError::InvalidShareUrl(_))
    ));
    assert!(requests(&seen).is_empty());
}
