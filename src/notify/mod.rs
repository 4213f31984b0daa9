use colored::Colorize;

pub trait NotificationSink: Send + Sync {
    fn error(&self, message: &str);
}

#[derive(Clone, Debug, Default)]
pub struct ConsoleSink;

impl NotificationSink for ConsoleSink {
    fn error(&self, message: &str) {
        eprintln!(
            "{}{}{} {}",
            "[".bold().white(),
            "ERR".bold().red(),
            "]".bold().white(),
            message.bold().white()
        );
    }
}

#[derive(Clone, Debug, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn error(&self, message: &str) {
        log::error!("{message}");
    }
}
