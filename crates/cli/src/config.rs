//! Startup settings: environment first, command-line flags override.

use std::time::Duration;

use clap::Parser;
use mysqlc_core::{
    DEFAULT_HISTORY_LIMIT, DEFAULT_MYSQL_HOST, DEFAULT_MYSQL_PORT, DEFAULT_RECONNECT_DELAY_SECS,
    env_non_empty, env_parse_with_default,
};
use mysqlc_llm::{DEFAULT_BASE_URL, DEFAULT_MODEL_FAMILY};
use mysqlc_storage::ConnectParams;

#[derive(Parser)]
#[command(name = "mysqlc", version)]
#[command(about = "A modern MySQL client with natural-language queries", long_about = None)]
pub(crate) struct Args {
    /// MySQL username
    #[arg(short = 'u', long)]
    pub user: Option<String>,
    /// MySQL password
    #[arg(short = 'p', long)]
    pub password: Option<String>,
    /// MySQL host
    #[arg(short = 'H', long)]
    pub host: Option<String>,
    /// MySQL port
    #[arg(short = 'P', long)]
    pub port: Option<u16>,
    /// Default database
    #[arg(short = 'd', long)]
    pub database: Option<String>,
    /// Gemini API key, enables natural-language queries
    #[arg(short = 'g', long = "gemini-api-key")]
    pub gemini_api_key: Option<String>,
    /// Connect without a password, ignoring DB_PASSWORD
    #[arg(long, conflicts_with = "password")]
    pub no_password: bool,
    /// Highlight SQL keywords while typing
    #[arg(long)]
    pub highlight: bool,
}

/// Everything `main` needs to build the session.
#[derive(Clone)]
pub(crate) struct Settings {
    pub connect: ConnectParams,
    pub api_key: Option<String>,
    pub api_url: String,
    pub model: Option<String>,
    pub model_family: String,
    pub reconnect_delay: Duration,
    pub history_limit: usize,
    pub highlight: bool,
}

impl Settings {
    /// Read the environment, then apply `args` on top.
    pub fn resolve(args: Args) -> Self {
        let env_port = env_parse_with_default("DB_PORT", DEFAULT_MYSQL_PORT);
        let password =
            if args.no_password { None } else { args.password.or_else(|| env_non_empty("DB_PASSWORD")) };

        let connect = ConnectParams {
            host: args
                .host
                .or_else(|| env_non_empty("DB_HOST"))
                .unwrap_or_else(|| DEFAULT_MYSQL_HOST.to_owned()),
            port: args.port.unwrap_or(env_port),
            user: args.user.or_else(|| env_non_empty("DB_USER")),
            password,
            database: args.database.or_else(|| env_non_empty("DB_DATABASE")),
        };

        Self {
            connect,
            api_key: args.gemini_api_key.or_else(|| env_non_empty("GEMINI_API_KEY")),
            api_url: env_non_empty("MYSQLC_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
            model: env_non_empty("MYSQLC_MODEL"),
            model_family: env_non_empty("MYSQLC_MODEL_FAMILY")
                .unwrap_or_else(|| DEFAULT_MODEL_FAMILY.to_owned()),
            reconnect_delay: Duration::from_secs(env_parse_with_default(
                "MYSQLC_RECONNECT_DELAY_SECS",
                DEFAULT_RECONNECT_DELAY_SECS,
            )),
            history_limit: env_parse_with_default("MYSQLC_HISTORY_LIMIT", DEFAULT_HISTORY_LIMIT),
            highlight: args.highlight,
        }
    }
}
