//! Shared helpers for binary tests: a loopback HTTP server standing in for
//! the GitHub API.

#![allow(dead_code)]

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

use assert_cmd::Command;

/// Returns a Command configured to run our binary, isolated from the
/// caller's token and log settings.
#[allow(deprecated)]
pub fn cmd() -> Command {
    let mut cmd = Command::cargo_bin(env!("CARGO_PKG_NAME")).unwrap();
    cmd.env_remove("GHTRACK_ACCESS_TOKEN")
        .env_remove("GHTRACK_LOG_PATH")
        .env_remove("GHTRACK_LOG_DIR")
        .env_remove("RUST_LOG");
    cmd
}

/// A canned HTTP response.
pub struct Reply {
    pub status: u16,
    pub body: String,
    pub link: Option<String>,
}

impl Reply {
    pub fn json(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            link: None,
        }
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            link: None,
        }
    }

    pub fn with_next(mut self, url: String) -> Self {
        self.link = Some(format!(r#"<{url}>; rel="next""#));
        self
    }
}

/// A request seen by the server.
#[derive(Debug, Clone)]
pub struct Seen {
    pub target: String,
    pub authorization: Option<String>,
}

/// Serves every connection with `handler(target, base_url)` on a background thread.
pub struct ApiServer {
    base: String,
    seen: Arc<Mutex<Vec<Seen>>>,
}

impl ApiServer {
    pub fn start<F>(handler: F) -> Self
    where
        F: Fn(&str, &str) -> Reply + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let thread_base = base.clone();
        let thread_seen = Arc::clone(&seen);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                serve(stream, &handler, &thread_base, &thread_seen);
            }
        });

        Self { base, seen }
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }

    pub fn targets(&self) -> Vec<String> {
        self.seen().into_iter().map(|s| s.target).collect()
    }

    /// A config file pointing the CLI at this server.
    pub fn config_yaml(&self) -> String {
        format!("github:\n  api_url: \"{}\"\n  timeout_secs: 5\n", self.base)
    }
}

fn serve<F>(stream: TcpStream, handler: &F, base: &str, seen: &Mutex<Vec<Seen>>)
where
    F: Fn(&str, &str) -> Reply,
{
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }
    let target = request_line
        .split_whitespace()
        .nth(1)
        .unwrap_or("/")
        .to_string();

    let mut authorization = None;
    loop {
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':')
            && name.eq_ignore_ascii_case("authorization")
        {
            authorization = Some(value.trim().to_string());
        }
    }

    seen.lock().unwrap().push(Seen {
        target: target.clone(),
        authorization,
    });

    let reply = handler(&target, base);
    let reason = match reply.status {
        200 => "OK",
        403 => "Forbidden",
        404 => "Not Found",
        _ => "Error",
    };
    let link = reply
        .link
        .map(|l| format!("Link: {l}\r\n"))
        .unwrap_or_default();
    let response = format!(
        "HTTP/1.1 {} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n{link}Connection: close\r\n\r\n{}",
        reply.status,
        reply.body.len(),
        reply.body
    );
    let mut stream = reader.into_inner();
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

/// JSON for an org listing.
pub fn repo_listing(org: &str, names: &[&str]) -> String {
    let repos: Vec<serde_json::Value> = names
        .iter()
        .map(|name| serde_json::json!({"name": name, "full_name": format!("{org}/{name}")}))
        .collect();
    serde_json::Value::Array(repos).to_string()
}

/// JSON array with `n` empty commit objects.
pub fn commits(n: usize) -> String {
    serde_json::Value::Array(vec![serde_json::json!({}); n]).to_string()
}
