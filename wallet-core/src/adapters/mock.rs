//! Test doubles for the wallet ports
//!
//! Recording fakes for `WalletStore` and `RiskOracle` so tests can assert
//! which collaborator calls happened, plus a mock HTTP risk service:
//! - GET /risk?email=<email> returns { "blocked": bool }

use std::collections::{HashMap, HashSet};
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use crate::domain::result::{Error, Result};
use crate::domain::Wallet;
use crate::ports::{IdGenerator, RiskOracle, WalletStore};

/// A call made against `MockWalletStore`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Save(String),
    FindById(String),
    ExistsByOwnerEmail(String),
}

/// In-memory store that records every port call
#[derive(Default)]
pub struct MockWalletStore {
    wallets: Mutex<HashMap<String, Wallet>>,
    calls: Mutex<Vec<StoreCall>>,
    save_error: Mutex<Option<String>>,
}

impl MockWalletStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a wallet without recording a call
    pub fn insert(&self, wallet: Wallet) {
        self.wallets
            .lock()
            .unwrap()
            .insert(wallet.id().to_string(), wallet);
    }

    /// Read a wallet without recording a call
    pub fn get(&self, id: &str) -> Option<Wallet> {
        self.wallets.lock().unwrap().get(id).cloned()
    }

    /// Make every later `save` fail with a database error
    pub fn fail_saves_with(&self, message: &str) {
        *self.save_error.lock().unwrap() = Some(message.to_string());
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: StoreCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl WalletStore for MockWalletStore {
    fn save(&self, wallet: Wallet) -> Result<Wallet> {
        self.record(StoreCall::Save(wallet.id().to_string()));
        if let Some(message) = self.save_error.lock().unwrap().clone() {
            return Err(Error::database(message));
        }
        self.insert(wallet.clone());
        Ok(wallet)
    }

    fn find_by_id(&self, id: &str) -> Result<Option<Wallet>> {
        self.record(StoreCall::FindById(id.to_string()));
        Ok(self.get(id))
    }

    fn exists_by_owner_email(&self, email: &str) -> Result<bool> {
        self.record(StoreCall::ExistsByOwnerEmail(email.to_string()));
        Ok(self
            .wallets
            .lock()
            .unwrap()
            .values()
            .any(|w| w.owner_email() == email))
    }
}

/// Risk oracle with a fixed answer that records every email it is asked about
pub struct MockRiskOracle {
    blocked: bool,
    calls: Mutex<Vec<String>>,
    failure: Mutex<Option<String>>,
}

impl MockRiskOracle {
    pub fn new(blocked: bool) -> Self {
        Self {
            blocked,
            calls: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
        }
    }

    /// Make every later query fail with a risk service error
    pub fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl RiskOracle for MockRiskOracle {
    fn is_blocked(&self, email: &str) -> Result<bool> {
        self.calls.lock().unwrap().push(email.to_string());
        if let Some(message) = self.failure.lock().unwrap().clone() {
            return Err(Error::risk(message));
        }
        Ok(self.blocked)
    }
}

/// Deterministic ids: `<prefix>-1`, `<prefix>-2`, ...
pub struct SequentialIds {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIds {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            next: AtomicU64::new(1),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        format!("{}-{}", self.prefix, self.next.fetch_add(1, Ordering::SeqCst))
    }
}

/// Configuration for the mock risk service
#[derive(Debug, Clone, Default)]
pub struct MockRiskConfig {
    /// Emails reported as blocked
    pub blocked: HashSet<String>,
    /// Respond 503 to every request
    pub unavailable: bool,
    /// Respond 200 with a body that is not the expected JSON
    pub malformed: bool,
}

/// Mock risk service for testing `HttpRiskOracle`
pub struct MockRiskServer {
    port: u16,
    running: Arc<AtomicBool>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

impl MockRiskServer {
    /// Start a new mock server on a random available port
    pub fn start(config: MockRiskConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();

        // Non-blocking so the accept loop can observe shutdown
        listener.set_nonblocking(true)?;

        let thread_handle = thread::spawn(move || {
            while running_clone.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => {
                        let cfg = config.clone();
                        thread::spawn(move || handle_connection(stream, &cfg));
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(std::time::Duration::from_millis(10));
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            port,
            running,
            thread_handle: Some(thread_handle),
        })
    }

    /// Get the base URL for this mock server
    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockRiskServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn handle_connection(mut stream: TcpStream, config: &MockRiskConfig) {
    // Accepted sockets may inherit non-blocking mode from the listener
    let _ = stream.set_nonblocking(false);
    let mut buffer = [0; 4096];

    let Ok(n) = stream.read(&mut buffer) else {
        return;
    };
    let request = String::from_utf8_lossy(&buffer[..n]);
    let first_line = request.lines().next().unwrap_or("");
    let parts: Vec<&str> = first_line.split_whitespace().collect();

    if parts.len() < 2 || parts[0] != "GET" {
        send_response(&mut stream, 405, "Method Not Allowed", r#"{"error": "Method not allowed"}"#);
        return;
    }

    if config.unavailable {
        send_response(&mut stream, 503, "Service Unavailable", r#"{"error": "down"}"#);
        return;
    }

    let (path, query) = parts[1].split_once('?').unwrap_or((parts[1], ""));
    if path != "/risk" {
        send_response(&mut stream, 404, "Not Found", r#"{"error": "Endpoint not found"}"#);
        return;
    }

    if config.malformed {
        send_response(&mut stream, 200, "OK", r#"{"status": "unknown"}"#);
        return;
    }

    let email = url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "email")
        .map(|(_, value)| value.into_owned())
        .unwrap_or_default();
    let body = serde_json::json!({ "blocked": config.blocked.contains(&email) }).to_string();
    send_response(&mut stream, 200, "OK", &body);
}

fn send_response(stream: &mut TcpStream, status: u16, status_text: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        status_text,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}
