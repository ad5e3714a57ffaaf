//! Chat session state and history log

use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::error::Result;

/// One question/answer exchange
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    /// When the question was asked
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// The user's question, verbatim
    pub question: String,
    /// The composed answer
    pub answer: String,
}

/// First line of every session log
#[derive(Debug, Serialize, Deserialize)]
struct SessionHeader {
    session_id: Uuid,
    user: String,
    model: String,
    started_at: chrono::DateTime<chrono::Utc>,
}

/// A chat session with an append-only JSON-lines history log
pub struct ChatSession {
    user: String,
    log_path: PathBuf,
    history: Vec<ChatTurn>,
}

impl ChatSession {
    /// Start a session, creating its log file under `sessions_dir`
    pub fn start(user: &str, model: &str, sessions_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(sessions_dir)?;

        let session_id = Uuid::new_v4();
        let started_at = chrono::Utc::now();
        let log_path = sessions_dir.join(format!(
            "session-{}-{}.jsonl",
            started_at.format("%Y%m%d-%H%M%S"),
            &session_id.to_string()[..8]
        ));

        let header = SessionHeader {
            session_id,
            user: user.to_string(),
            model: model.to_string(),
            started_at,
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;
        writeln!(file, "{}", serde_json::to_string(&header)?)?;

        tracing::info!("Session log: {}", log_path.display());

        Ok(Self {
            user: user.to_string(),
            log_path,
            history: Vec::new(),
        })
    }

    /// Record a turn in memory and append it to the log
    pub fn record(&mut self, question: &str, answer: &str) -> Result<()> {
        let turn = ChatTurn {
            timestamp: chrono::Utc::now(),
            question: question.to_string(),
            answer: answer.to_string(),
        };

        let mut file = OpenOptions::new().append(true).open(&self.log_path)?;
        writeln!(file, "{}", serde_json::to_string(&turn)?)?;

        self.history.push(turn);
        Ok(())
    }

    /// The user this session belongs to
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Turns recorded so far
    pub fn history(&self) -> &[ChatTurn] {
        &self.history
    }

    /// Path of the session log file
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }
}
