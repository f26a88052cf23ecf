use std::path::PathBuf;

use clap::Parser;
use tiktok_dl::artifact::prepare_working_dir;
use tiktok_dl::fetcher::select_fetcher;
use tiktok_dl::{Bot, Config, TelegramClient, logging, run_with_shutdown};

#[derive(Parser)]
#[command(
    name = "tiktok-dl-bot",
    version,
    about = "Telegram bot that downloads TikTok videos"
)]
struct Cli {
    /// Path to a JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Directory for transient video files
    #[arg(long)]
    working_dir: Option<PathBuf>,

    /// Path to the yt-dlp executable
    #[arg(long)]
    ytdlp_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> tiktok_dl::Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    logging::init(&cli.log_level);

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    config.apply_env()?;
    if let Some(dir) = cli.working_dir {
        config.download.working_dir = dir;
    }
    if let Some(path) = cli.ytdlp_path {
        config.tools.ytdlp_path = Some(path);
    }
    config.validate()?;

    prepare_working_dir(config.working_dir()).await?;

    let client = TelegramClient::from_config(&config.telegram);
    let me = client.get_me().await?;
    tracing::info!(
        bot_id = me.id,
        username = me.username.as_deref().unwrap_or("-"),
        working_dir = ?config.working_dir(),
        max_file_size = config.download.max_file_size,
        "connected to Telegram"
    );

    let fetcher = select_fetcher(&config.tools, &config.download);
    let bot = Bot::new(client, fetcher, &config);
    run_with_shutdown(bot).await
}
