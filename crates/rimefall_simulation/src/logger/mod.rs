use once_cell::sync::Lazy;
use std::sync::Mutex;

// Потокобезопасный глобальный logger: host (GDExtension, CLI runner, тесты)
// устанавливает свой sink, симуляция пишет через свободные функции.
static SINK: Lazy<Mutex<Option<Box<dyn LogSink>>>> = Lazy::new(|| Mutex::new(None));

static MIN_LEVEL: Lazy<Mutex<LogLevel>> = Lazy::new(|| Mutex::new(LogLevel::Debug));

/// Уровни логирования (сравниваются по severity)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
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

/// Куда физически уходят строки (console, Godot, файл — решает host)
pub trait LogSink: Send + Sync {
    fn print(&self, level: LogLevel, line: &str);
}

pub fn set_sink(sink: Box<dyn LogSink>) {
    *SINK.lock().unwrap() = Some(sink);
}

pub fn set_sink_if_empty(sink: Box<dyn LogSink>) {
    let mut guard = SINK.lock().unwrap();
    if guard.is_none() {
        *guard = Some(sink);
    }
}

pub fn set_min_level(level: LogLevel) {
    *MIN_LEVEL.lock().unwrap() = level;
}

pub fn log(message: &str) {
    log_at(LogLevel::Debug, message);
}

pub fn log_info(message: &str) {
    log_at(LogLevel::Info, message);
}

pub fn log_warning(message: &str) {
    log_at(LogLevel::Warning, message);
}

pub fn log_error(message: &str) {
    log_at(LogLevel::Error, message);
}

/// Timestamp добавляем здесь, а не в sink — все хосты получают одинаковый формат
pub fn log_at(level: LogLevel, message: &str) {
    if level < *MIN_LEVEL.lock().unwrap() {
        return;
    }
    if let Some(sink) = SINK.lock().unwrap().as_ref() {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        sink.print(level, &format!("[{}] {}", timestamp, message));
    }
}

pub struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn print(&self, level: LogLevel, line: &str) {
        println!("[{}] {}", level.as_str(), line);
    }
}

pub fn init_logger() {
    set_sink_if_empty(Box::new(ConsoleSink));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
    }

    #[test]
    fn test_level_names() {
        assert_eq!(LogLevel::Debug.as_str(), "DEBUG");
        assert_eq!(LogLevel::Error.as_str(), "ERROR");
    }
}
