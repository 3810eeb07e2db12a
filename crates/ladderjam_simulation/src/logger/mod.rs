//! Логирование симуляции
//!
//! Core (controller, host systems) пишет через `log` / `log_info` / `log_warning` / `log_error`.
//! Куда это уходит решает хост: `ConsoleLogger` для headless бинаря,
//! `RecordingLogger` когда нужно посмотреть что controller сказал за кадр.
//!
//! Порог задаётся `set_log_level` или переменной окружения `LADDERJAM_LOG`
//! (`debug` / `info` / `warning` / `error`). Всё ниже порога отбрасывается до timestamp'а.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

use once_cell::sync::Lazy;
use thiserror::Error;

pub const LOG_LEVEL_ENV: &str = "LADDERJAM_LOG";

static SINK: Lazy<Mutex<Option<Box<dyn LogPrinter>>>> = Lazy::new(|| Mutex::new(None));

static THRESHOLD: Lazy<Mutex<LogLevel>> = Lazy::new(|| Mutex::new(LogLevel::Debug));

/// Poisoned mutex не должен ронять кадр
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown log level `{0}` (expected debug, info, warning or error)")]
pub struct UnknownLogLevel(pub String);

impl FromStr for LogLevel {
    type Err = UnknownLogLevel;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "debug" | "trace" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            _ => Err(UnknownLogLevel(value.to_string())),
        }
    }
}

pub trait LogPrinter: Send + Sync {
    fn log(&self, level: LogLevel, message: &str);
}

pub fn set_logger(logger: Box<dyn LogPrinter>) {
    *lock(&*SINK) = Some(logger);
}

/// Не перетирает logger, который хост уже поставил
pub fn set_logger_if_needed(logger: Box<dyn LogPrinter>) {
    let mut sink = lock(&*SINK);
    if sink.is_none() {
        *sink = Some(logger);
    }
}

pub fn set_log_level(level: LogLevel) {
    *lock(&*THRESHOLD) = level;
}

pub fn log_level() -> LogLevel {
    *lock(&*THRESHOLD)
}

pub fn log(message: &str) {
    log_with_level(LogLevel::Debug, message);
}

pub fn log_info(message: &str) {
    log_with_level(LogLevel::Info, message);
}

pub fn log_warning(message: &str) {
    log_with_level(LogLevel::Warning, message);
}

pub fn log_error(message: &str) {
    log_with_level(LogLevel::Error, message);
}

pub fn log_with_level(level: LogLevel, message: &str) {
    if level < log_level() {
        return;
    }

    if let Some(sink) = lock(&*SINK).as_ref() {
        sink.log(level, &stamp(message));
    }
}

fn stamp(message: &str) -> String {
    format!("[{}] {}", chrono::Local::now().format("%H:%M:%S%.3f"), message)
}

/// stdout для debug/info, stderr для warning/error
pub struct ConsoleLogger;

impl LogPrinter for ConsoleLogger {
    fn log(&self, level: LogLevel, message: &str) {
        if level >= LogLevel::Warning {
            eprintln!("[{}] {}", level, message);
        } else {
            println!("[{}] {}", level, message);
        }
    }
}

/// Копит сообщения в памяти; клоны делят один буфер
#[derive(Clone, Default)]
pub struct RecordingLogger {
    records: Arc<Mutex<Vec<(LogLevel, String)>>>,
}

impl RecordingLogger {
    pub fn records(&self) -> Vec<(LogLevel, String)> {
        lock(&*self.records).clone()
    }

    pub fn contains(&self, level: LogLevel, needle: &str) -> bool {
        lock(&*self.records)
            .iter()
            .any(|(recorded, message)| *recorded == level && message.contains(needle))
    }

    pub fn clear(&self) {
        lock(&*self.records).clear();
    }
}

impl LogPrinter for RecordingLogger {
    fn log(&self, level: LogLevel, message: &str) {
        lock(&*self.records).push((level, message.to_string()));
    }
}

pub fn init_logger() {
    set_logger_if_needed(Box::new(ConsoleLogger));
}

/// `init_logger` + порог из `LADDERJAM_LOG`. Кривое значение не фатально: остаёмся на текущем пороге.
pub fn init_logger_from_env() {
    init_logger();

    let Ok(raw) = std::env::var(LOG_LEVEL_ENV) else {
        return;
    };
    match raw.parse::<LogLevel>() {
        Ok(level) => set_log_level(level),
        Err(err) => log_warning(&format!("{}: {}", LOG_LEVEL_ENV, err)),
    }
}
