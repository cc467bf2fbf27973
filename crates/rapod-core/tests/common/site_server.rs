//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves a mutable route table (path + query → status, content type, body,
//! optional redirect). HEAD gets the headers only; unknown paths get an
//! HTML 404 page. Every request is recorded so tests can count hits.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Route {
    pub status: u16,
    pub content_type: String,
    pub body: Vec<u8>,
    pub location: Option<String>,
}

#[derive(Clone)]
pub struct SiteServer {
    base: String,
    routes: Arc<Mutex<HashMap<String, Route>>>,
    hits: Arc<Mutex<Vec<(String, String)>>>,
}

impl SiteServer {
    /// Starts the server in a background thread. It runs until the process exits.
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let server = SiteServer {
            base: format!("http://127.0.0.1:{}", port),
            routes: Arc::new(Mutex::new(HashMap::new())),
            hits: Arc::new(Mutex::new(Vec::new())),
        };
        let shared = server.clone();
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let shared = shared.clone();
                thread::spawn(move || shared.handle(stream));
            }
        });
        server
    }

    /// Base URL without trailing slash, e.g. "http://127.0.0.1:12345".
    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn html(&self, path: &str, body: &str) {
        self.route(path, 200, "text/html; charset=utf-8", body.as_bytes());
    }

    pub fn audio(&self, path: &str, body: &[u8]) {
        self.route(path, 200, "audio/mpeg", body);
    }

    pub fn redirect(&self, path: &str, to: &str) {
        self.routes.lock().unwrap().insert(
            path.to_string(),
            Route {
                status: 302,
                content_type: "text/html".to_string(),
                body: b"moved".to_vec(),
                location: Some(to.to_string()),
            },
        );
    }

    pub fn route(&self, path: &str, status: u16, content_type: &str, body: &[u8]) {
        self.routes.lock().unwrap().insert(
            path.to_string(),
            Route {
                status,
                content_type: content_type.to_string(),
                body: body.to_vec(),
                location: None,
            },
        );
    }

    /// Number of requests seen with `method` for `path`.
    pub fn hits(&self, method: &str, path: &str) -> usize {
        self.hits
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, p)| m == method && p == path)
            .count()
    }

    fn handle(&self, mut stream: TcpStream) {
        let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
        let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));

        let mut request = Vec::new();
        let mut buf = [0u8; 4096];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            match stream.read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => request.extend_from_slice(&buf[..n]),
            }
        }
        let request = String::from_utf8_lossy(&request);
        let mut parts = request.lines().next().unwrap_or("").split_whitespace();
        let method = parts.next().unwrap_or("").to_string();
        let path = parts.next().unwrap_or("").to_string();
        if method.is_empty() {
            return;
        }
        self.hits.lock().unwrap().push((method.clone(), path.clone()));

        let route = self.routes.lock().unwrap().get(&path).cloned().unwrap_or(Route {
            status: 404,
            content_type: "text/html".to_string(),
            body: b"<html><body><h1>Not found</h1></body></html>".to_vec(),
            location: None,
        });

        let location = route
            .location
            .as_deref()
            .map(|l| format!("Location: {}\r\n", l))
            .unwrap_or_default();
        let head = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\n{}Connection: close\r\n\r\n",
            route.status,
            reason(route.status),
            route.content_type,
            route.body.len(),
            location
        );
        let _ = stream.write_all(head.as_bytes());
        if !method.eq_ignore_ascii_case("HEAD") {
            let _ = stream.write_all(&route.body);
        }
        let _ = stream.flush();
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        302 => "Found",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}
