//! Command parser for the vaultbot chat surface.
//!
//! Inbound messages are space-delimited; the first token is the command
//! keyword. Index arguments are kept as raw tokens here — bounds checking
//! against a fresh listing belongs to the index resolver, not the parser.

/// Result of parsing one inbound text message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    /// A well-formed command.
    Command(Command),
    /// A known command with a malformed argument list.
    Malformed {
        /// The command keyword.
        command: &'static str,
        /// Usage hint to report back to the user.
        usage: &'static str,
    },
    /// Plain text that is not a command.
    Plain(String),
}

/// A parsed chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Log in with the shared credential pair.
    Login {
        /// Attempted username.
        username: String,
        /// Attempted password.
        password: String,
    },
    /// Destroy the caller's session.
    Logout,
    /// Prompt the caller to attach a file.
    Upload,
    /// List the vault contents with 1-based ordinals.
    List,
    /// Send one or more files back by ordinal.
    Download(Vec<String>),
    /// Rename a file by ordinal.
    Rename {
        /// Raw index token.
        index: String,
        /// New file name.
        new_name: String,
    },
    /// Delete one or more files by ordinal.
    Delete(Vec<String>),
    /// Report size and timestamps for one file by ordinal.
    Metadata(String),
    /// Report disk and upload-area usage.
    Storage,
    /// Welcome / command overview (`/start` and `/help`).
    Help,
    /// Unknown command keyword.
    Unknown(String),
}

impl Command {
    /// Get the command name.
    pub fn name(&self) -> &str {
        match self {
            Command::Login { .. } => "login",
            Command::Logout => "logout",
            Command::Upload => "upload",
            Command::List => "list",
            Command::Download(_) => "download",
            Command::Rename { .. } => "rename",
            Command::Delete(_) => "delete",
            Command::Metadata(_) => "metadata",
            Command::Storage => "storage",
            Command::Help => "help",
            Command::Unknown(cmd) => cmd,
        }
    }
}

/// Parse one inbound text message.
pub fn parse(input: &str) -> Parsed {
    let trimmed = input.trim();

    if !trimmed.starts_with('/') {
        return Parsed::Plain(trimmed.to_string());
    }

    let mut tokens = trimmed[1..].split_whitespace();
    let keyword = tokens.next().unwrap_or("").to_lowercase();
    let args: Vec<&str> = tokens.collect();

    let command = match keyword.as_str() {
        "login" => {
            if args.len() < 2 {
                return Parsed::Malformed {
                    command: "login",
                    usage: "/login <username> <password>",
                };
            }
            Command::Login {
                username: args[0].to_string(),
                password: args[1].to_string(),
            }
        }
        "logout" => Command::Logout,
        "upload" => Command::Upload,
        "list" => Command::List,
        "download" => {
            if args.is_empty() {
                return Parsed::Malformed {
                    command: "download",
                    usage: "/download <index>... (e.g., /download 1 2)",
                };
            }
            Command::Download(args.iter().map(|s| s.to_string()).collect())
        }
        "rename" => {
            if args.len() < 2 {
                return Parsed::Malformed {
                    command: "rename",
                    usage: "/rename <index> <new_name>",
                };
            }
            Command::Rename {
                index: args[0].to_string(),
                new_name: args[1].to_string(),
            }
        }
        "delete" => {
            if args.is_empty() {
                return Parsed::Malformed {
                    command: "delete",
                    usage: "/delete <index>... (e.g., /delete 1 3 5)",
                };
            }
            Command::Delete(args.iter().map(|s| s.to_string()).collect())
        }
        "metadata" => {
            if args.is_empty() {
                return Parsed::Malformed {
                    command: "metadata",
                    usage: "/metadata <index>",
                };
            }
            Command::Metadata(args[0].to_string())
        }
        "storage" => Command::Storage,
        "start" | "help" => Command::Help,
        _ => Command::Unknown(keyword),
    };

    Parsed::Command(command)
}

/// Welcome message listing the command surface.
pub fn welcome() -> String {
    [
        "👋 Welcome to the bot! Here are the available commands:",
        "",
        "- /login <username> <password> - Log in to your account.",
        "- /upload - Upload a file.",
        "- /list - See your uploaded files.",
        "- /download <index>... - Download files by index.",
        "- /rename <index> <new_name> - Rename a file.",
        "- /delete <index>... - Delete files by index.",
        "- /metadata <index> - Get metadata of a file.",
        "- /storage - Check how much storage is left.",
        "- /logout - Log out from your account.",
    ]
    .join("\n")
}
