//! vaultbot - chat-bot front end for a single shared server-side file vault.
//!
//! One configured username/password pair gates one shared upload
//! directory. Commands arrive as `/command arg...` text messages; indexed
//! commands refer to 1-based positions in the listing shown by `/list`.

pub mod command;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod index;
pub mod logging;
pub mod report;
pub mod session;
pub mod store;
pub mod throttle;
pub mod transfer;

pub use command::{Command, Parsed};
pub use config::Config;
pub use dispatcher::Dispatcher;
pub use error::{Result, VaultError};
pub use index::{resolve_indices, Resolution};
pub use report::StorageReport;
pub use session::{ConversationId, SessionError, SessionStore};
pub use store::{FileMetadata, FileStore};
pub use throttle::{CommandThrottle, ThrottleResult};
pub use transfer::{
    Attachment, AttachmentKind, TelegramGateway, TransferError, TransferGateway,
};
