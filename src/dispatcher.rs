//! Command dispatcher for vaultbot.
//!
//! Routes one inbound message to its handler: authentication guard first,
//! then argument-shape validation, then index resolution against a fresh
//! listing, then the filesystem effect, then per-item replies. Every
//! command produces at least one reply; there is no silent success.

use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::command::{self, Command, Parsed};
use crate::config::{StorageConfig, TransferConfig};
use crate::index::{resolve_indices, Resolution};
use crate::report;
use crate::session::{ConversationId, SessionStore};
use crate::store::FileStore;
use crate::throttle::{CommandThrottle, ThrottleResult};
use crate::transfer::{Attachment, AttachmentKind, TransferError, TransferGateway};
use crate::VaultError;

/// Uniform reply for unauthenticated callers.
const LOGIN_REQUIRED: &str = "❌ You need to log in first. Please use the /login command.";

/// Command dispatcher owning the session store, file store, cooldown map,
/// and transfer gateway.
///
/// The stores are injected rather than process-global so each test can
/// construct a fresh dispatcher.
pub struct Dispatcher {
    sessions: SessionStore,
    store: FileStore,
    throttle: CommandThrottle,
    gateway: Box<dyn TransferGateway>,
    limits: StorageConfig,
}

impl Dispatcher {
    /// Create a dispatcher from its collaborators.
    pub fn new(
        sessions: SessionStore,
        store: FileStore,
        limits: StorageConfig,
        transfer: &TransferConfig,
        gateway: Box<dyn TransferGateway>,
    ) -> Self {
        Self {
            sessions,
            store,
            throttle: CommandThrottle::new(Duration::from_secs(transfer.upload_cooldown_secs)),
            gateway,
            limits,
        }
    }

    /// Access the session store (used by transports and tests).
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Access the file store.
    pub fn store(&self) -> &FileStore {
        &self.store
    }

    /// Whether a command requires an active session.
    ///
    /// Every file-reading or file-mutating command is guarded; login,
    /// logout, the welcome text, and unknown keywords are not.
    fn requires_auth(cmd: &Command) -> bool {
        !matches!(
            cmd,
            Command::Login { .. } | Command::Logout | Command::Help | Command::Unknown(_)
        )
    }

    /// Authentication guard: the acting principal, or `AuthRequired`.
    fn guard(&self, conversation: ConversationId) -> Result<String, VaultError> {
        self.sessions
            .principal(conversation)
            .ok_or(VaultError::AuthRequired)
    }

    /// Map a handler-boundary error to its user-facing reply.
    fn reply_for(err: &VaultError) -> String {
        match err {
            VaultError::AuthRequired => LOGIN_REQUIRED.to_string(),
            VaultError::InvalidArguments(usage) => format!("❓ Usage: {usage}"),
            VaultError::IndexOutOfRange(_) => "❌ Invalid file index.".to_string(),
            VaultError::NotFound(name) => format!("❌ File '{name}' not found."),
            VaultError::TooLarge { limit, .. } => format!(
                "🚫 Unsuccessful transfer! Maximum file size is {}MB.",
                limit / (1024 * 1024)
            ),
            VaultError::Validation(_) => "❌ Invalid file name.".to_string(),
            VaultError::Transfer(_) => {
                "❌ An error occurred during the file transfer.".to_string()
            }
            VaultError::Io(_) => "❌ Could not read the upload directory.".to_string(),
        }
    }

    /// Handle one inbound text message, returning the replies to send.
    pub async fn dispatch(&self, conversation: ConversationId, text: &str) -> Vec<String> {
        match command::parse(text) {
            Parsed::Plain(_) => {
                vec!["❓ Command not found. Use /help to see available commands.".to_string()]
            }
            // Auth guard comes before argument-shape validation, so a
            // malformed guarded command still answers with the uniform
            // login reply.
            Parsed::Malformed { command, usage } => {
                if command != "login" {
                    if let Err(e) = self.guard(conversation) {
                        return vec![Self::reply_for(&e)];
                    }
                }
                vec![Self::reply_for(&VaultError::InvalidArguments(
                    usage.to_string(),
                ))]
            }
            Parsed::Command(cmd) => {
                debug!(conversation, command = cmd.name(), "Dispatching");
                if Self::requires_auth(&cmd) {
                    if let Err(e) = self.guard(conversation) {
                        return vec![Self::reply_for(&e)];
                    }
                }
                match cmd {
                    Command::Login { username, password } => {
                        self.handle_login(conversation, &username, &password)
                    }
                    Command::Logout => self.handle_logout(conversation),
                    Command::Upload => self.handle_upload_prompt(conversation),
                    Command::List => self.handle_list(conversation),
                    Command::Download(tokens) => self.handle_download(conversation, &tokens).await,
                    Command::Rename { index, new_name } => {
                        self.handle_rename(conversation, &index, &new_name)
                    }
                    Command::Delete(tokens) => self.handle_delete(conversation, &tokens),
                    Command::Metadata(token) => self.handle_metadata(conversation, &token),
                    Command::Storage => self.handle_storage(conversation),
                    Command::Help => vec![command::welcome()],
                    Command::Unknown(_) => vec!["❓ Command not found.".to_string()],
                }
            }
        }
    }

    fn handle_login(
        &self,
        conversation: ConversationId,
        username: &str,
        password: &str,
    ) -> Vec<String> {
        match self.sessions.login(conversation, username, password) {
            Ok(principal) => vec![format!("✅ Welcome, {principal}! You are now logged in.")],
            Err(_) => vec!["❌ Invalid username or password.".to_string()],
        }
    }

    fn handle_logout(&self, conversation: ConversationId) -> Vec<String> {
        match self.sessions.logout(conversation) {
            Ok(_) => vec!["✅ You have been logged out.".to_string()],
            Err(_) => vec!["❌ You are not logged in.".to_string()],
        }
    }

    fn handle_upload_prompt(&self, conversation: ConversationId) -> Vec<String> {
        match self.throttle.check(conversation) {
            ThrottleResult::Allowed => {
                vec!["📁 Please attach a file with the /upload command.".to_string()]
            }
            ThrottleResult::Denied { .. } => {
                vec!["⏳ Please wait before using the command again.".to_string()]
            }
        }
    }

    /// Validate an inbound attachment, returning the name to store it under.
    fn admit_attachment(&self, attachment: &Attachment) -> Result<String, VaultError> {
        if attachment.kind == AttachmentKind::Other {
            return Err(VaultError::InvalidArguments(
                "attach a document, photo, or video".to_string(),
            ));
        }

        if attachment.size > self.limits.max_upload_bytes {
            return Err(VaultError::TooLarge {
                size: attachment.size,
                limit: self.limits.max_upload_bytes,
            });
        }

        let name = attachment.storage_name();
        FileStore::validate_name(&name)?;
        Ok(name)
    }

    /// Handle an inbound attachment.
    ///
    /// Called by the transport when a message carries a file rather than
    /// text. The `/upload` cooldown does not gate this path.
    pub async fn receive_attachment(
        &self,
        conversation: ConversationId,
        attachment: &Attachment,
    ) -> Vec<String> {
        let user = match self.guard(conversation) {
            Ok(user) => user,
            Err(e) => return vec![Self::reply_for(&e)],
        };

        let name = match self.admit_attachment(attachment) {
            Ok(name) => name,
            Err(VaultError::InvalidArguments(_)) => {
                return vec![
                    "❌ Please attach a document, photo, or video with the /upload command."
                        .to_string(),
                ];
            }
            Err(e) => {
                warn!(user = %user, cause = %e, "File upload rejected");
                return vec![Self::reply_for(&e)];
            }
        };

        if self.store.exists(&name) {
            warn!(user = %user, file = %name, "Overwriting existing file");
        }

        let mut replies = vec!["📤 File upload started...".to_string()];
        match self
            .gateway
            .fetch(&attachment.file_id, &self.store.path_for(&name))
            .await
        {
            Ok(_) => {
                info!(user = %user, file = %name, "File uploaded");
                replies.push(format!(
                    "✅ File uploaded successfully! You can access it as: {name}"
                ));
            }
            Err(e) => {
                // A failed transfer may leave a truncated file behind; it is
                // not rolled back.
                let e = VaultError::Transfer(e);
                error!(user = %user, file = %name, cause = %e, "File upload failed");
                replies.push("❌ An error occurred during file upload.".to_string());
            }
        }
        replies
    }

    fn handle_list(&self, conversation: ConversationId) -> Vec<String> {
        let user = self.principal(conversation);

        let files = match self.store.list() {
            Ok(files) => files,
            Err(e) => {
                error!(user = %user, cause = %e, "Listing failed");
                return vec![Self::reply_for(&e)];
            }
        };

        if files.is_empty() {
            return vec!["📁 No files uploaded yet.".to_string()];
        }

        let lines: Vec<String> = files
            .iter()
            .enumerate()
            .map(|(i, name)| format!("{}. {}", i + 1, name))
            .collect();
        info!(user = %user, "File list requested");
        vec![format!("📁 Uploaded files:\n{}", lines.join("\n"))]
    }

    async fn handle_download(
        &self,
        conversation: ConversationId,
        tokens: &[String],
    ) -> Vec<String> {
        let user = self.principal(conversation);

        let resolution = match self.fresh_resolution(tokens) {
            Ok(r) => r,
            Err(reply) => return vec![reply],
        };

        let mut downloaded = Vec::new();
        let mut too_large = Vec::new();
        let mut not_found = Vec::new();
        let mut replies = Vec::new();

        for (_, name) in &resolution.resolved {
            let size = match self.store.file_size(name) {
                Ok(size) => size,
                Err(VaultError::NotFound(_)) => {
                    // Vanished between listing and open.
                    not_found.push(name.clone());
                    continue;
                }
                Err(e) => {
                    error!(user = %user, file = %name, cause = %e, "Download stat failed");
                    replies.push(format!(
                        "❌ An unexpected error occurred while downloading '{name}'."
                    ));
                    continue;
                }
            };

            if size > self.limits.max_download_bytes {
                warn!(user = %user, file = %name, "File too large to download");
                too_large.push(name.clone());
                continue;
            }

            match self
                .gateway
                .send_document(conversation, &self.store.path_for(name))
                .await
            {
                Ok(()) => {
                    info!(user = %user, file = %name, "File downloaded");
                    downloaded.push(name.clone());
                }
                Err(TransferError::Timeout) => {
                    warn!(user = %user, file = %name, "Download timed out");
                    replies.push(format!(
                        "⏳ The download request for '{name}' timed out. Please try again."
                    ));
                }
                Err(TransferError::Connection(cause)) => {
                    warn!(user = %user, file = %name, cause = %cause, "Download connection error");
                    replies.push(format!(
                        "❌ Connection error while downloading '{name}'. Please try again later."
                    ));
                }
                Err(TransferError::Other(cause)) => {
                    error!(user = %user, file = %name, cause = %cause, "Download failed");
                    replies.push(format!(
                        "❌ An unexpected error occurred while downloading '{name}'."
                    ));
                }
            }
        }

        if !downloaded.is_empty() {
            replies.push(format!(
                "✅ Successfully downloaded files:\n- {}.",
                downloaded.join(", ")
            ));
        }
        if !too_large.is_empty() {
            replies.push(format!(
                "❌ Files too large to download: {}.",
                too_large.join(", ")
            ));
        }
        if !not_found.is_empty() {
            replies.push(format!(
                "❌ Files not found on disk: {}.",
                not_found.join(", ")
            ));
        }
        if !resolution.invalid.is_empty() {
            replies.push(format!(
                "❌ Invalid indices: {}.",
                resolution.invalid.join(", ")
            ));
        }
        if replies.is_empty() {
            replies.push("❌ Nothing to download.".to_string());
        }
        replies
    }

    fn handle_rename(
        &self,
        conversation: ConversationId,
        index: &str,
        new_name: &str,
    ) -> Vec<String> {
        let user = self.principal(conversation);

        let tokens = vec![index.to_string()];
        let resolution = match self.fresh_resolution(&tokens) {
            Ok(r) => r,
            Err(reply) => return vec![reply],
        };

        let Some((_, old_name)) = resolution.resolved.first() else {
            return vec![Self::reply_for(&VaultError::IndexOutOfRange(
                index.to_string(),
            ))];
        };

        match self.store.rename(old_name, new_name) {
            Ok(()) => {
                info!(user = %user, file = %old_name, new_file = %new_name, "File renamed");
                vec![format!(
                    "✏️ File renamed successfully from {old_name} to {new_name}."
                )]
            }
            Err(VaultError::NotFound(_)) => {
                warn!(user = %user, file = %old_name, "Rename target vanished from disk");
                vec![format!("❌ File '{old_name}' not found.")]
            }
            Err(VaultError::Validation(_)) => {
                vec![format!("❌ Invalid new file name: {new_name}.")]
            }
            Err(e) => {
                error!(user = %user, file = %old_name, cause = %e, "Rename failed");
                vec![format!("❌ Failed to rename file: {e}")]
            }
        }
    }

    fn handle_delete(&self, conversation: ConversationId, tokens: &[String]) -> Vec<String> {
        let user = self.principal(conversation);

        let resolution = match self.fresh_resolution(tokens) {
            Ok(r) => r,
            Err(reply) => return vec![reply],
        };

        let mut deleted = Vec::new();
        let mut not_found = Vec::new();
        let mut replies = Vec::new();

        for (_, name) in &resolution.resolved {
            match self.store.delete(name) {
                Ok(()) => {
                    info!(user = %user, file = %name, "File deleted");
                    deleted.push(name.clone());
                }
                Err(VaultError::NotFound(_)) => {
                    warn!(user = %user, file = %name, "Delete target vanished from disk");
                    not_found.push(name.clone());
                }
                Err(e) => {
                    error!(user = %user, file = %name, cause = %e, "Delete failed");
                    replies.push(format!("❌ Failed to delete file '{name}': {e}"));
                }
            }
        }

        if !deleted.is_empty() {
            replies.push(format!(
                "✅ Successfully deleted files:\n- {}.",
                deleted.join(", ")
            ));
        }
        if !not_found.is_empty() {
            replies.push(format!(
                "❌ Files not found on disk: {}.",
                not_found.join(", ")
            ));
        }
        if !resolution.invalid.is_empty() {
            replies.push(format!(
                "❌ Invalid indices: {}.",
                resolution.invalid.join(", ")
            ));
        }
        if replies.is_empty() {
            replies.push("❌ Nothing to delete.".to_string());
        }
        replies
    }

    fn handle_metadata(&self, conversation: ConversationId, token: &str) -> Vec<String> {
        let user = self.principal(conversation);

        let tokens = vec![token.to_string()];
        let resolution = match self.fresh_resolution(&tokens) {
            Ok(r) => r,
            Err(reply) => return vec![reply],
        };

        let Some((_, name)) = resolution.resolved.first() else {
            return vec![Self::reply_for(&VaultError::IndexOutOfRange(
                token.to_string(),
            ))];
        };

        match self.store.metadata(name) {
            Ok(meta) => {
                info!(user = %user, file = %name, "File metadata requested");
                vec![format!(
                    "📄 File Metadata:\n\
                     - Name: {}\n\
                     - Size: {} bytes\n\
                     - Created: {}\n\
                     - Modified: {}",
                    meta.name,
                    meta.size,
                    meta.created.format("%Y-%m-%d %H:%M:%S"),
                    meta.modified.format("%Y-%m-%d %H:%M:%S"),
                )]
            }
            Err(VaultError::NotFound(_)) => {
                warn!(user = %user, file = %name, "Metadata target vanished from disk");
                vec![format!("❌ File '{name}' not found.")]
            }
            Err(e) => {
                error!(user = %user, file = %name, cause = %e, "Metadata read failed");
                vec![format!("❌ Failed to read metadata for '{name}'.")]
            }
        }
    }

    fn handle_storage(&self, conversation: ConversationId) -> Vec<String> {
        let user = self.principal(conversation);

        let report = match report::gather(&self.store, self.limits.upload_limit_bytes) {
            Ok(report) => report,
            Err(e) => {
                error!(user = %user, cause = %e, "Storage report failed");
                return vec!["❌ Could not gather storage information.".to_string()];
            }
        };

        info!(user = %user, "Storage information requested");
        vec![format!(
            "💾 Storage Information:\n\
             - Directory: {}\n\
             - Total Disk Space: {:.2} GB\n\
             - Used Disk Space: {:.2} GB\n\
             - Free Disk Space: {:.2} GB\n\
             \n\
             🗂️ Uploads Directory:\n\
             - Uploads Size: {:.2} GB\n\
             - Remaining Upload Space: {:.2} GB (out of {:.2} GB)",
            self.store.base_path().display(),
            report::gigabytes(report.volume_total),
            report::gigabytes(report.volume_used),
            report::gigabytes(report.volume_free),
            report::gigabytes(report.uploads_bytes),
            report::gigabytes(report.remaining_upload_bytes()),
            report::gigabytes(report.upload_limit_bytes),
        )]
    }

    /// Fetch a fresh listing and resolve the given tokens against it.
    ///
    /// Listings from earlier commands are never reused here.
    fn fresh_resolution(&self, tokens: &[String]) -> Result<Resolution, String> {
        match self.store.list() {
            Ok(listing) => Ok(resolve_indices(&listing, tokens)),
            Err(e) => {
                error!(cause = %e, "Listing failed during index resolution");
                Err(Self::reply_for(&e))
            }
        }
    }

    /// Principal name for audit lines. Handlers run behind the auth guard,
    /// so a missing binding only happens if the session raced a logout.
    fn principal(&self, conversation: ConversationId) -> String {
        self.sessions
            .principal(conversation)
            .unwrap_or_else(|| "<unknown>".to_string())
    }
}
