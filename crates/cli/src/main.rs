mod config;
mod editor;
mod repl;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use mysqlc_core::{HISTORY_FILE_NAME, INPUT_HISTORY_FILE_NAME};
use mysqlc_llm::{LlmClient, Translator};
use mysqlc_service::Session;
use mysqlc_storage::{ConnectionManager, HistoryStore, MySqlConnector};
use tracing_subscriber::EnvFilter;

use crate::config::{Args, Settings};

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

fn banner(translation: bool) -> String {
    let hint = if translation {
        "Ask in plain English, or prefix a question with \"translate\"."
    } else {
        "Natural-language queries are off: set GEMINI_API_KEY or pass -g."
    };
    format!(
        "------------------------------------------------
mysqlc: A modern MySQL client
- Version: {}
- Source: https://github.com/royans/mysqlc

Note: Enter runs the command, Alt+Enter starts a new line.
{hint}
------------------------------------------------",
        env!("CARGO_PKG_VERSION")
    )
}

fn build_translator(settings: &Settings) -> Result<Option<Translator<LlmClient>>> {
    let Some(api_key) = settings.api_key.clone() else {
        tracing::info!("no API key configured, translation disabled");
        return Ok(None);
    };
    let client = LlmClient::new(api_key, settings.api_url.clone())?;
    let mut translator = Translator::new(client).with_family(settings.model_family.clone());
    if let Some(model) = &settings.model {
        translator = translator.with_model(model.clone());
    }
    Ok(Some(translator))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let settings = Settings::resolve(Args::parse());
    let home = home_dir();

    let mut history = HistoryStore::load(home.join(HISTORY_FILE_NAME))?;
    match history.prune(settings.history_limit) {
        Ok(0) => {},
        Ok(removed) => tracing::info!(removed, "pruned command history"),
        Err(e) => tracing::warn!("could not prune command history: {e}"),
    }

    let translator = build_translator(&settings)?;
    let connection = ConnectionManager::new(MySqlConnector, settings.connect.clone())
        .with_retry_delay(settings.reconnect_delay);
    let mut session = Session::new(connection, history, translator);

    if let Err(e) = session.start().await {
        if let Err(close_err) = session.close().await {
            tracing::warn!("close after failed connect: {close_err}");
        }
        return Err(e).context("could not connect to the MySQL server");
    }

    println!("{}", banner(session.translation_enabled()));

    let outcome = repl::run(&mut session, settings.highlight, &home.join(INPUT_HISTORY_FILE_NAME)).await;
    let closed = session.close().await;
    outcome?;
    closed?;
    Ok(())
}
