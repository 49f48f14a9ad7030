//! Transfer gateway to the chat platform's file-hosting endpoint.
//!
//! The gateway moves bytes only; which file to move and where is decided by
//! the dispatcher. Uses `#[async_trait]` so the dispatcher can hold a boxed
//! gateway and tests can substitute a mock.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::session::ConversationId;

/// User agent string for platform API calls.
const USER_AGENT: &str = "vaultbot/0.1";

/// Transfer failure classification.
///
/// Each variant produces a distinct user-facing message; all are
/// recoverable at the handler boundary.
#[derive(Error, Debug)]
pub enum TransferError {
    /// The transfer exceeded its bounded timeout.
    #[error("transfer timed out")]
    Timeout,

    /// Could not reach the platform endpoint.
    #[error("connection error: {0}")]
    Connection(String),

    /// Any other transfer failure.
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for TransferError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransferError::Timeout
        } else if e.is_connect() {
            TransferError::Connection(e.to_string())
        } else {
            TransferError::Other(e.to_string())
        }
    }
}

/// Kind of inbound attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    /// A document with a platform-supplied filename.
    Document,
    /// A photo; the platform supplies no filename.
    Photo,
    /// A video; the platform supplies no filename.
    Video,
    /// Any other content kind. Rejected by the upload handler.
    Other,
}

/// An inbound attachment as handed over by the chat transport.
#[derive(Debug, Clone)]
pub struct Attachment {
    /// Attachment kind.
    pub kind: AttachmentKind,
    /// Platform file handle used to fetch the bytes.
    pub file_id: String,
    /// Original filename, if the platform supplies one.
    pub file_name: Option<String>,
    /// Declared size in bytes.
    pub size: u64,
}

impl Attachment {
    /// Resolve the name to store the attachment under.
    ///
    /// Photos and videos arrive nameless and fall back to fixed names, as
    /// the platform convention goes.
    pub fn storage_name(&self) -> String {
        match (&self.file_name, self.kind) {
            (Some(name), _) => name.clone(),
            (None, AttachmentKind::Photo) => "photo.jpg".to_string(),
            (None, AttachmentKind::Video) => "video.mp4".to_string(),
            (None, _) => "document.bin".to_string(),
        }
    }
}

/// Byte transfer to and from the chat platform.
#[async_trait]
pub trait TransferGateway: Send + Sync {
    /// Fetch the attachment identified by `file_id` into `dest`.
    ///
    /// Returns the number of bytes written. A failed transfer may leave a
    /// truncated file at `dest`; it is not rolled back.
    async fn fetch(&self, file_id: &str, dest: &Path) -> Result<u64, TransferError>;

    /// Send the file at `src` to the conversation as a document.
    async fn send_document(
        &self,
        conversation: ConversationId,
        src: &Path,
    ) -> Result<(), TransferError>;
}

/// `getFile` response envelope.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

/// `getFile` result payload.
#[derive(Debug, Deserialize)]
struct RemoteFile {
    file_path: Option<String>,
}

/// Transfer gateway over the Telegram Bot API.
pub struct TelegramGateway {
    client: Client,
    api_base: String,
    token: String,
}

impl TelegramGateway {
    /// Create a gateway with the given API base, token, and bounded
    /// per-transfer timeout.
    pub fn new(api_base: &str, token: &str, timeout: Duration) -> Result<Self, TransferError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TransferError::Other(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    fn file_url(&self, file_path: &str) -> String {
        format!("{}/file/bot{}/{}", self.api_base, self.token, file_path)
    }

    /// Resolve a platform file handle into a fetchable path.
    async fn resolve_file_path(&self, file_id: &str) -> Result<String, TransferError> {
        let response = self
            .client
            .get(self.method_url("getFile"))
            .query(&[("file_id", file_id)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TransferError::Other(format!(
                "getFile returned HTTP {}",
                response.status()
            )));
        }

        let envelope: ApiResponse<RemoteFile> = response.json().await?;
        if !envelope.ok {
            return Err(TransferError::Other(
                envelope
                    .description
                    .unwrap_or_else(|| "getFile rejected".to_string()),
            ));
        }

        envelope
            .result
            .and_then(|f| f.file_path)
            .ok_or_else(|| TransferError::Other("getFile returned no file path".to_string()))
    }
}

#[async_trait]
impl TransferGateway for TelegramGateway {
    async fn fetch(&self, file_id: &str, dest: &Path) -> Result<u64, TransferError> {
        let file_path = self.resolve_file_path(file_id).await?;

        let response = self.client.get(self.file_url(&file_path)).send().await?;
        if !response.status().is_success() {
            return Err(TransferError::Other(format!(
                "file download returned HTTP {}",
                response.status()
            )));
        }

        let bytes = response.bytes().await?;
        tokio::fs::write(dest, &bytes)
            .await
            .map_err(|e| TransferError::Other(format!("write failed: {e}")))?;

        Ok(bytes.len() as u64)
    }

    async fn send_document(
        &self,
        conversation: ConversationId,
        src: &Path,
    ) -> Result<(), TransferError> {
        let file_name = src
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document.bin")
            .to_string();
        let content = tokio::fs::read(src)
            .await
            .map_err(|e| TransferError::Other(format!("read failed: {e}")))?;

        let part = reqwest::multipart::Part::bytes(content).file_name(file_name);
        let form = reqwest::multipart::Form::new()
            .text("chat_id", conversation.to_string())
            .part("document", part);

        let response = self
            .client
            .post(self.method_url("sendDocument"))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TransferError::Other(format!(
                "sendDocument returned HTTP {}",
                response.status()
            )));
        }

        let envelope: ApiResponse<serde_json::Value> = response.json().await?;
        if !envelope.ok {
            return Err(TransferError::Other(
                envelope
                    .description
                    .unwrap_or_else(|| "sendDocument rejected".to_string()),
            ));
        }

        Ok(())
    }
}

/// Helper for constructing the gateway from configuration.
pub fn telegram_gateway(
    api_base: &str,
    token: &str,
    timeout_secs: u64,
) -> Result<TelegramGateway, TransferError> {
    TelegramGateway::new(api_base, token, Duration::from_secs(timeout_secs))
}
