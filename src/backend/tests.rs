use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

use crate::model::{Credentials, MAX_UPLOAD_BYTES, PhotoFile, UploadBatch};

use super::{
    ActionReply, Backend, BackendError, CacheStatus, ErrorBody, HttpBackend, MultipartForm,
    SearchReply, UserStats,
};

struct CapturedRequest {
    head: String,
    body: Vec<u8>,
}

/// Answers each accepted connection with the next canned response.
fn serve(responses: Vec<String>) -> (String, Receiver<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let address = listener.local_addr().expect("address");
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for response in responses {
            let (stream, _) = listener.accept().expect("accept");
            let mut reader = BufReader::new(stream.try_clone().expect("clone"));
            let mut head = String::new();
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).expect("read line") == 0 || line == "\r\n" {
                    break;
                }
                head.push_str(&line);
            }
            let length = head
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            let mut body = vec![0; length];
            reader.read_exact(&mut body).expect("read body");
            let _ = tx.send(CapturedRequest { head, body });
            let mut stream = stream;
            stream.write_all(response.as_bytes()).expect("write");
        }
    });
    (format!("http://{address}/api"), rx)
}

fn json_response(status: &str, extra_headers: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\
         Connection: close\r\n{extra_headers}\r\n{body}",
        body.len()
    )
}

fn backend(base_url: &str) -> HttpBackend {
    HttpBackend::new(base_url, Duration::from_secs(5))
}

#[test]
fn multipart_form_layout() {
    let photo = PhotoFile::new("a\"b.jpg", "image/jpeg", vec![1, 2, 3]);
    let mut form = MultipartForm::with_boundary("XYZ");
    form.add_file("album_photos", &photo);
    assert_eq!(form.content_type(), "multipart/form-data; boundary=XYZ");

    let body = form.finish();
    let mut expected = b"--XYZ\r\n\
        Content-Disposition: form-data; name=\"album_photos\"; filename=\"a%22b.jpg\"\r\n\
        Content-Type: image/jpeg\r\n\r\n"
        .to_vec();
    expected.extend_from_slice(&[1, 2, 3]);
    expected.extend_from_slice(b"\r\n--XYZ--\r\n");
    assert_eq!(body, expected);
}

#[test]
fn generated_boundaries_differ() {
    assert_ne!(
        MultipartForm::new().boundary(),
        MultipartForm::new().boundary()
    );
}

#[test]
fn error_body_prefers_message_over_error() {
    let body = ErrorBody {
        success: Some(false),
        message: Some("Invalid credentials".to_string()),
        error: Some("unauthorized".to_string()),
    };
    assert_eq!(body.best_message(), Some("Invalid credentials"));

    let body = ErrorBody {
        message: Some("  ".to_string()),
        error: Some("Please login first".to_string()),
        ..ErrorBody::default()
    };
    assert_eq!(body.best_message(), Some("Please login first"));
    assert_eq!(ErrorBody::default().best_message(), None);
}

#[test]
fn replies_tolerate_missing_fields() {
    let reply: ActionReply =
        serde_json::from_str(r#"{"error": "Upload failed"}"#).expect("action reply");
    assert!(!reply.success);
    assert_eq!(reply.best_message(), Some("Upload failed"));

    let reply: SearchReply = serde_json::from_str(
        r#"{"match_found": false, "message": "No face detected in the photo", "matches": []}"#,
    )
    .expect("search reply");
    assert!(reply.matches.is_empty());

    let stats: UserStats = serde_json::from_value(serde_json::json!({
        "username": "a",
        "photo_count": 3,
        "cached_embeddings": 2,
        "cache_status": "rebuilding",
    }))
    .expect("stats");
    assert_eq!(stats.cache_status, CacheStatus::Unknown);
}

#[test]
fn login_cookie_is_sent_on_later_calls() {
    let (base_url, requests) = serve(vec![
        json_response(
            "200 OK",
            "Set-Cookie: session=abc123; Path=/\r\n",
            r#"{"success": true, "username": "a", "message": "ok"}"#,
        ),
        json_response("200 OK", "", r#"{"isLoggedIn": true, "username": "a"}"#),
    ]);
    let backend = backend(&base_url);

    let reply = backend
        .login(&Credentials::new("a", "b"))
        .expect("login");
    assert!(reply.success);
    assert_eq!(reply.username.as_deref(), Some("a"));

    let status = backend.check_session().expect("session");
    assert!(status.is_logged_in);

    let login = requests.recv().expect("login request");
    assert!(login.head.starts_with("POST /api/login "));
    let sent: serde_json::Value = serde_json::from_slice(&login.body).expect("json body");
    assert_eq!(sent, serde_json::json!({"username": "a", "password": "b"}));

    let check = requests.recv().expect("check request");
    assert!(check.head.starts_with("GET /api/check_session "));
    assert!(check.head.to_ascii_lowercase().contains("cookie: session=abc123"));
}

#[test]
fn non_ok_status_carries_body() {
    let (base_url, _requests) = serve(vec![json_response(
        "413 Payload Too Large",
        "",
        r#"{"error": "File too large. Maximum size is 16MB"}"#,
    )]);
    let photo = PhotoFile::new("a.jpg", "image/jpeg", vec![0; 16]);
    let batch = UploadBatch::new(vec![photo], MAX_UPLOAD_BYTES).expect("batch");

    let error = backend(&base_url)
        .upload_album(&batch)
        .expect_err("must fail");
    assert_eq!(error.status(), Some(413));
    assert_eq!(
        error.server_message(),
        Some("File too large. Maximum size is 16MB")
    );
}

#[test]
fn upload_sends_one_multipart_request() {
    let (base_url, requests) = serve(vec![json_response(
        "200 OK",
        "",
        r#"{"success": true, "message": "Successfully uploaded 2 photos"}"#,
    )]);
    let files = vec![
        PhotoFile::new("one.jpg", "image/jpeg", vec![1; 4]),
        PhotoFile::new("two.png", "image/png", vec![2; 4]),
    ];
    let batch = UploadBatch::new(files, MAX_UPLOAD_BYTES).expect("batch");

    let reply = backend(&base_url).upload_album(&batch).expect("upload");
    assert_eq!(reply.best_message(), Some("Successfully uploaded 2 photos"));

    let request = requests.recv().expect("request");
    assert!(request.head.contains("multipart/form-data; boundary="));
    let body = String::from_utf8_lossy(&request.body);
    assert_eq!(body.matches("name=\"album_photos\"").count(), 2);
}

#[test]
fn unreachable_service_is_a_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let address = listener.local_addr().expect("address");
    drop(listener);

    let error = backend(&format!("http://{address}/api"))
        .check_session()
        .expect_err("must fail");
    assert!(matches!(error, BackendError::Network(_)));
}

#[test]
fn health_is_served_from_the_origin() {
    let (base_url, requests) = serve(vec![json_response(
        "200 OK",
        "",
        r#"{"status": "healthy", "service": "face-recognition-api", "models_loaded": true}"#,
    )]);
    let report = backend(&base_url).health().expect("health");
    assert!(report.models_loaded);
    let request = requests.recv().expect("request");
    assert!(request.head.starts_with("GET /health "));
}
