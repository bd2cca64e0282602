//! Command-line interface definitions.
//!
//! Every option can also be provided through an environment variable, and a
//! `.env` file in the working directory is loaded before parsing.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Month-name table used to read absolute post dates.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum MonthLocale {
    Fr,
    En,
}

/// Collect posts from a group feed on a daily schedule.
///
/// # Examples
///
/// ```sh
/// # Run once right now
/// group_feed_collector --once
///
/// # Run every day at 07:30 local time, headless
/// group_feed_collector --headless --schedule "0 30 7 * * *"
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Group feed to collect
    #[arg(
        long,
        env = "FEED_URL",
        default_value = "https://www.facebook.com/groups/310327396937461"
    )]
    pub feed_url: String,

    /// Login page
    #[arg(long, env = "LOGIN_URL", default_value = "https://www.facebook.com/login")]
    pub login_url: String,

    /// WebDriver server (chromedriver) endpoint
    #[arg(long, env = "WEBDRIVER_URL", default_value = "http://localhost:9515")]
    pub webdriver_url: String,

    /// Run the browser without a window
    #[arg(long, env = "HEADLESS")]
    pub headless: bool,

    /// Account email
    #[arg(long, env = "FB_EMAIL", hide_env_values = true)]
    pub email: Option<String>,

    /// Account password
    #[arg(long, env = "FB_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// CSV file the collected posts are written to
    #[arg(short, long, env = "OUTPUT_PATH", default_value = "facebook_group_posts.csv")]
    pub output_path: PathBuf,

    /// MongoDB connection string
    #[arg(long, env = "MONGO_URI", default_value = "mongodb://localhost:27017/")]
    pub mongo_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGO_DATABASE", default_value = "ppp")]
    pub mongo_database: String,

    /// MongoDB collection name
    #[arg(long, env = "MONGO_COLLECTION", default_value = "facebook_posts")]
    pub mongo_collection: String,

    /// Maximum number of extraction passes per run
    #[arg(long, env = "MAX_SCROLLS", default_value_t = 15)]
    pub max_scrolls: usize,

    /// Seconds to wait after each scroll for new posts to render
    #[arg(long, default_value_t = 2.0)]
    pub scroll_settle_delay_secs: f64,

    /// Stop once more than this many passes in a row found nothing new
    #[arg(long, default_value_t = 2)]
    pub max_consecutive_empty_passes: usize,

    /// Posts with this many characters of text or fewer are ignored
    #[arg(long, default_value_t = 20)]
    pub min_post_text_length: usize,

    /// Seconds to wait for the feed at the start of every pass
    #[arg(long, default_value_t = 10.0)]
    pub feed_wait_timeout_secs: f64,

    /// Seconds to wait for login fields, redirects and the first feed render
    #[arg(long, default_value_t = 20.0)]
    pub session_timeout_secs: f64,

    /// Seconds to pause between login steps and after opening the feed
    #[arg(long, default_value_t = 5.0)]
    pub page_settle_delay_secs: f64,

    /// Month names used in absolute post dates
    #[arg(long, env = "MONTH_LOCALE", value_enum, default_value_t = MonthLocale::Fr)]
    pub month_locale: MonthLocale,

    /// Daily trigger as a 6-field cron expression (sec min hour day month weekday), local time
    #[arg(long, env = "SCRAPE_SCHEDULE", default_value = "0 46 13 * * *")]
    pub schedule: String,

    /// Run a single collection immediately and exit
    #[arg(long)]
    pub once: bool,

    /// Also append logs to this file (plain text, no colours)
    #[arg(long, env = "LOG_FILE")]
    pub log_file: Option<PathBuf>,
}
