//! Инициализация логирования (tracing-subscriber)
//!
//! The library only emits `tracing` events; a host installs a subscriber once.
//! `try_init` is used so a second initialisation (tests, embedding hosts) is a
//! no-op instead of a panic.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::config::RecompileConfig;

/// Инициализирует систему логирования с настройками по умолчанию
pub fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    install(level)
}

/// Инициализирует минимальное логирование (только WARN и ERROR)
pub fn init_minimal_logging() -> Result<()> {
    install(tracing::Level::WARN)
}

pub fn init_from_config(config: &RecompileConfig) -> Result<()> {
    init_logging(config.verbose_logging)
}

fn install(level: tracing::Level) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    // Уже установленный глобальный subscriber не ошибка.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .try_init();

    Ok(())
}
