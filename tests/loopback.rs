use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

use rustynet_client::HttpMethod;
use rustynet_client::client::{RequestError, RequestFactory};
use rustynet_client::config::ClientConfig;
use rustynet_client::http::status::HttpStatus;

/// Accepts one connection, reads the request head and `body_len` body bytes,
/// answers with `response` and returns what it received.
fn serve_once(response: &'static [u8], body_len: usize) -> (String, thread::JoinHandle<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();

        let mut received = Vec::new();
        let mut buf = [0u8; 512];
        loop {
            if let Some(end) = received.windows(4).position(|w| w == b"\r\n\r\n") {
                if received.len() >= end + 4 + body_len {
                    break;
                }
            }
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            received.extend_from_slice(&buf[..n]);
        }

        stream.write_all(response).unwrap();
        received
    });

    (format!("http://{addr}"), handle)
}

fn test_config() -> ClientConfig {
    ClientConfig {
        connect_timeout: Duration::from_secs(2),
        read_timeout: Duration::from_secs(5),
        ..ClientConfig::default()
    }
}

#[test]
fn post_round_trip() {
    let (base, server) = serve_once(
        b"HTTP/1.1 201 Created\r\nContent-Type: application/json\r\nContent-Length: 11\r\n\r\n{\"id\": 42}\n",
        13,
    );

    let factory = RequestFactory::new(test_config());
    let mut request = factory
        .create_request(&format!("{base}/items?v=1"), HttpMethod::Post)
        .unwrap();
    request.headers_mut().set("Content-Type", "application/json").unwrap();
    request.headers_mut().add("Cookie", "a=1").unwrap();
    request.headers_mut().add("Cookie", "b=2").unwrap();
    request.body().unwrap().write_all(b"{\"name\":\"x\"}\n").unwrap();

    let mut response = request.execute().unwrap();
    assert_eq!(response.status().unwrap(), HttpStatus::Created);
    assert_eq!(response.status_text().unwrap(), "Created");
    assert_eq!(
        response.headers().unwrap().content_type().unwrap().unwrap().to_string(),
        "application/json"
    );
    assert_eq!(response.body().unwrap(), b"{\"id\": 42}\n");
    response.close();

    let received = String::from_utf8(server.join().unwrap()).unwrap();
    assert!(received.starts_with("POST /items?v=1 HTTP/1.1\r\n"));
    assert!(received.contains("\r\nContent-Type: application/json\r\n"));
    assert!(received.contains("\r\nCookie: a=1; b=2\r\n"));
    assert!(received.contains("\r\nContent-Length: 13\r\n"));
    assert!(received.contains("\r\nConnection: close\r\n"));
    assert!(received.ends_with("\r\n\r\n{\"name\":\"x\"}\n"));
}

#[test]
fn get_with_close_delimited_body() {
    let (base, server) = serve_once(b"HTTP/1.0 200 OK\r\nX-Served-By: test\r\n\r\nhello world", 0);

    let factory = RequestFactory::new(test_config());
    let mut request = factory.create_request(&base, HttpMethod::Get).unwrap();
    let mut response = request.execute().unwrap();

    assert_eq!(response.status_code().unwrap(), 200);
    assert_eq!(response.headers().unwrap().first("x-served-by"), Some("test"));
    assert_eq!(response.body().unwrap(), b"hello world");

    let received = String::from_utf8(server.join().unwrap()).unwrap();
    assert!(received.starts_with("GET / HTTP/1.1\r\n"));
    assert!(received.contains("\r\nContent-Length: 0\r\n"));
}

#[test]
fn get_with_buffered_body_sends_no_length() {
    let (base, server) = serve_once(b"HTTP/1.1 204 No Content\r\n\r\n", 0);

    let factory = RequestFactory::new(test_config());
    let mut request = factory.create_request(&base, HttpMethod::Get).unwrap();
    request.body().unwrap().write_all(b"hello").unwrap();
    let mut response = request.execute().unwrap();
    assert_eq!(response.status().unwrap(), HttpStatus::NoContent);
    response.close();

    let received = String::from_utf8(server.join().unwrap()).unwrap();
    assert!(received.starts_with("GET / HTTP/1.1\r\n"));
    assert!(!received.contains("Content-Length"));
    assert!(received.ends_with("\r\n\r\n"));
}

#[test]
fn header_with_line_break_is_never_sent() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());

    let factory = RequestFactory::new(test_config());
    let mut request = factory.create_request(&base, HttpMethod::Get).unwrap();
    request
        .headers_mut()
        .set("X-A", "v\r\nX-Injected: evil")
        .unwrap();
    assert!(matches!(
        request.execute(),
        Err(RequestError::InvalidHeader { name, .. }) if name == "X-A"
    ));
    assert!(!request.is_executed());
    drop(request);

    let (mut stream, _) = listener.accept().unwrap();
    stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
    let mut received = Vec::new();
    stream.read_to_end(&mut received).unwrap();
    assert!(received.is_empty());
}
