#![allow(dead_code)]

use std::{
    sync::{
        Mutex,
        atomic::{AtomicU32, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use qrlogin_core::{
    LoginChallenge, LoginProvider, PollOutcome, ProviderError, SessionId, TokenResult,
};
use tokio::time::Instant;

/// Behaviour knobs for [`ScriptedProvider`].
#[derive(Debug, Clone, Default)]
pub struct Script {
    /// Login-init responses lack the challenge fields.
    pub missing_fields: bool,
    /// Handshakes numbered above this fail with missing fields.
    pub fail_begins_after: Option<u32>,
    /// Not-ready answers per connection before the token arrives.
    /// `None` never completes.
    pub ready_after: Option<u32>,
    /// Every poll fails at the transport level.
    pub fail_polls: bool,
    /// Simulated latency of each poll call.
    pub poll_latency: Duration,
}

/// Per-session transport state handed out by the fake.
#[derive(Debug)]
pub struct FakeConnection {
    pub serial: u32,
    polls: AtomicU32,
}

/// One recorded poll call.
#[derive(Debug, Clone, Copy)]
pub struct PollRecord {
    pub session_id: SessionId,
    pub serial: u32,
    pub at: Duration,
}

/// In-memory provider whose answers follow a [`Script`].
pub struct ScriptedProvider {
    script: Mutex<Script>,
    begins: AtomicU32,
    polls: Mutex<Vec<PollRecord>>,
    in_flight: AtomicU32,
    max_in_flight: AtomicU32,
    epoch: Instant,
}

impl ScriptedProvider {
    pub fn new(script: Script) -> Self {
        Self {
            script: Mutex::new(script),
            begins: AtomicU32::new(0),
            polls: Mutex::new(Vec::new()),
            in_flight: AtomicU32::new(0),
            max_in_flight: AtomicU32::new(0),
            epoch: Instant::now(),
        }
    }

    pub fn update(&self, f: impl FnOnce(&mut Script)) {
        f(&mut self.script.lock().unwrap());
    }

    pub fn begins(&self) -> u32 {
        self.begins.load(Ordering::SeqCst)
    }

    pub fn polls(&self) -> Vec<PollRecord> {
        self.polls.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> u32 {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LoginProvider for ScriptedProvider {
    type Connection = FakeConnection;

    async fn begin_challenge(
        &self,
        _session_id: SessionId,
    ) -> Result<(LoginChallenge, FakeConnection), ProviderError> {
        let serial = self.begins.fetch_add(1, Ordering::SeqCst) + 1;
        let script = self.script.lock().unwrap().clone();

        if script.missing_fields || script.fail_begins_after.is_some_and(|n| serial > n) {
            return Err(ProviderError::MissingFields(vec!["suuid"]));
        }

        let challenge =
            LoginChallenge::new(format!("C{serial}"), format!("S{serial}"), format!("T{serial}"));
        let connection = FakeConnection {
            serial,
            polls: AtomicU32::new(0),
        };
        Ok((challenge, connection))
    }

    async fn poll_once(
        &self,
        connection: &FakeConnection,
        session_id: SessionId,
    ) -> Result<PollOutcome, ProviderError> {
        let script = self.script.lock().unwrap().clone();
        self.polls.lock().unwrap().push(PollRecord {
            session_id,
            serial: connection.serial,
            at: self.epoch.elapsed(),
        });

        let in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(in_flight, Ordering::SeqCst);
        if !script.poll_latency.is_zero() {
            tokio::time::sleep(script.poll_latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if script.fail_polls {
            return Err(ProviderError::Transport {
                operation: "token poll",
                message: "connection refused".to_string(),
            });
        }

        let answered = connection.polls.fetch_add(1, Ordering::SeqCst);
        match script.ready_after {
            Some(n) if answered >= n => Ok(PollOutcome::Ready(TokenResult::new(
                serde_json::json!({ "serial": connection.serial, "login_token": format!("token-{}", connection.serial) }),
            ))),
            _ => Ok(PollOutcome::NotReady { status: 401 }),
        }
    }
}
