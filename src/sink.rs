use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{ActionEvent, SinkState};

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    /// Base URL of the transfer sink; actions go to `{url}/transfer` and
    /// the read surface lives at `{url}/status`.
    pub url: String,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8000".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to reach sink: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("sink rejected action: {0}")]
    Rejected(String),
}

/// Outbound notification seam. Calls are best-effort: the tracker logs a
/// failure and moves on without retrying or rolling back its own state.
pub trait ActionSink {
    fn send(&mut self, action: ActionEvent) -> Result<(), SinkError>;
}

impl<S: ActionSink + ?Sized> ActionSink for &mut S {
    fn send(&mut self, action: ActionEvent) -> Result<(), SinkError> {
        (**self).send(action)
    }
}

#[derive(Serialize)]
struct ActionRequest {
    action: ActionEvent,
}

#[derive(Debug, Deserialize)]
pub struct ActionReply {
    pub status: String,
    pub state: SinkSnapshot,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SinkSnapshot {
    pub status: SinkState,
    #[allow(dead_code)]
    pub image_url: String,
}

pub struct HttpSink {
    client: Client,
    transfer_url: String,
    status_url: String,
}

impl HttpSink {
    pub fn new(cfg: &SinkConfig) -> Self {
        let base = cfg.url.trim_end_matches('/');
        Self {
            client: Client::new(),
            transfer_url: format!("{base}/transfer"),
            status_url: format!("{base}/status"),
        }
    }

    /// Read the sink's current status. External consumers poll this surface
    /// too; the tracker itself never acts on it.
    #[allow(dead_code)]
    pub fn status(&self) -> Result<SinkSnapshot, SinkError> {
        let reply = self
            .client
            .get(&self.status_url)
            .send()?
            .error_for_status()?
            .json::<SinkSnapshot>()?;
        Ok(reply)
    }
}

impl ActionSink for HttpSink {
    fn send(&mut self, action: ActionEvent) -> Result<(), SinkError> {
        let reply = self
            .client
            .post(&self.transfer_url)
            .json(&ActionRequest { action })
            .send()?
            .error_for_status()?
            .json::<ActionReply>()?;

        if reply.status != "ok" {
            return Err(SinkError::Rejected(reply.status));
        }

        log::debug!("sink acknowledged {action:?}, state now {:?}", reply.state.status);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_request_wire_format() {
        let body = serde_json::to_string(&ActionRequest {
            action: ActionEvent::Grab,
        })
        .unwrap();
        assert_eq!(body, r#"{"action":"grab"}"#);

        let body = serde_json::to_string(&ActionRequest {
            action: ActionEvent::Release,
        })
        .unwrap();
        assert_eq!(body, r#"{"action":"release"}"#);

        let body = serde_json::to_string(&ActionRequest {
            action: ActionEvent::Reset,
        })
        .unwrap();
        assert_eq!(body, r#"{"action":"reset"}"#);
    }

    #[test]
    fn action_reply_parses() {
        let reply: ActionReply = serde_json::from_str(
            r#"{"status": "ok", "state": {"status": "grabbed", "image_url": "/images/pfp.png"}}"#,
        )
        .unwrap();
        assert_eq!(reply.status, "ok");
        assert_eq!(reply.state.status, SinkState::Grabbed);
    }

    #[test]
    fn status_snapshot_parses_all_states() {
        for (raw, expected) in [
            ("idle", SinkState::Idle),
            ("grabbed", SinkState::Grabbed),
            ("transferred", SinkState::Transferred),
        ] {
            let body = format!(r#"{{"status": "{raw}", "image_url": "/images/pfp.png"}}"#);
            let snapshot: SinkSnapshot = serde_json::from_str(&body).unwrap();
            assert_eq!(snapshot.status, expected);
        }
    }

    #[test]
    fn base_url_trailing_slash_is_tolerated() {
        let sink = HttpSink::new(&SinkConfig {
            url: "http://127.0.0.1:8000/".to_string(),
        });
        assert_eq!(sink.transfer_url, "http://127.0.0.1:8000/transfer");
        assert_eq!(sink.status_url, "http://127.0.0.1:8000/status");
    }
}
