//! Slash-command routing

/// Reply to `/start`
pub const START_REPLY: &str =
    "🌟 Welcome to TikTok Downloader Bot!\nSend me a TikTok URL and I'll download it for you!";

/// Reply to `/help`
pub const HELP_REPLY: &str = "Just send me a TikTok video link and I'll handle the rest!";

/// What an incoming text message asks for
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// `/start`
    Start,
    /// `/help`
    Help,
    /// Any other slash command; ignored
    Unknown,
}

impl Command {
    /// Parse a message as a command
    ///
    /// Returns `None` for plain text. Accepts the `/cmd@botname` form Telegram
    /// uses in group chats and ignores trailing arguments.
    pub fn parse(text: &str) -> Option<Self> {
        let word = text.trim_start().strip_prefix('/')?.split_whitespace().next()?;
        let name = word.split('@').next().unwrap_or(word);
        Some(match name.to_ascii_lowercase().as_str() {
            "start" => Command::Start,
            "help" => Command::Help,
            _ => Command::Unknown,
        })
    }

    /// Fixed reply text, if the command has one
    pub fn reply(self) -> Option<&'static str> {
        match self {
            Command::Start => Some(START_REPLY),
            Command::Help => Some(HELP_REPLY),
            Command::Unknown => None,
        }
    }
}
