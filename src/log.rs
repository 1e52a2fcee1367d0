use gloo::console;

/// Console level used by the diagnostic sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Level {
    #[default]
    Log,
    Info,
    Warn,
    Error,
}

pub(crate) fn emit(data: &str, level: Level) {
    match level {
        Level::Log => console::log!(data),
        Level::Info => console::info!(data),
        Level::Warn => console::warn!(data),
        Level::Error => console::error!(data),
    }
}
