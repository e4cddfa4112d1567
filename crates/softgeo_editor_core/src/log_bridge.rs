// SPDX-License-Identifier: MIT OR Apache-2.0
//! Forwarding of tracing output to an in-app log panel.

use std::sync::mpsc;
use std::time::SystemTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// A tracing event captured by the [`LogBridge`] layer.
#[derive(Debug, Clone)]
pub struct LogRecord {
    /// Severity.
    pub level: tracing::Level,
    /// Formatted message, with extra fields appended as `name = value`.
    pub message: String,
    /// Module path that emitted the event.
    pub target: String,
    /// When the event was captured.
    pub timestamp: SystemTime,
}

/// A `tracing_subscriber::Layer` that forwards events over an `mpsc` channel.
pub struct LogBridge {
    sender: mpsc::Sender<LogRecord>,
    max_level: tracing::Level,
}

impl LogBridge {
    /// Create a new bridge and return `(layer, receiver)`.
    pub fn new() -> (Self, mpsc::Receiver<LogRecord>) {
        let (sender, receiver) = mpsc::channel();
        (
            Self {
                sender,
                max_level: tracing::Level::TRACE,
            },
            receiver,
        )
    }

    /// Drop events more verbose than `level`.
    pub fn with_max_level(mut self, level: tracing::Level) -> Self {
        self.max_level = level;
        self
    }
}

impl<S> tracing_subscriber::Layer<S> for LogBridge
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let meta = event.metadata();
        if *meta.level() > self.max_level {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let _ = self.sender.send(LogRecord {
            level: *meta.level(),
            message: visitor.message,
            target: meta.target().to_string(),
            timestamp: SystemTime::now(),
        });
    }
}

/// Visitor that extracts the `message` field from a tracing event.
#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl MessageVisitor {
    fn push_field(&mut self, name: &str, value: String) {
        if name == "message" {
            if self.message.is_empty() {
                self.message = value;
            } else {
                self.message = format!("{value}, {}", self.message);
            }
        } else if self.message.is_empty() {
            self.message = format!("{name} = {value}");
        } else {
            self.message.push_str(&format!(", {name} = {value}"));
        }
    }
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.push_field(field.name(), format!("{value:?}"));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.push_field(field.name(), value.to_string());
    }
}

/// Errors raised while installing the global subscriber.
#[derive(Debug, thiserror::Error)]
pub enum LogInitError {
    /// A filter directive did not parse.
    #[error("invalid log directive: {0}")]
    Directive(#[from] tracing_subscriber::filter::ParseError),
    /// A global subscriber is already set.
    #[error("tracing already initialized: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Install a global subscriber printing to stderr and feeding a [`LogBridge`].
///
/// `RUST_LOG` is honored; `directive` is added on top of it.
pub fn init_logging(directive: &str) -> Result<mpsc::Receiver<LogRecord>, LogInitError> {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(directive.parse()?);
    let (bridge, receiver) = LogBridge::new();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(bridge)
        .try_init()?;

    Ok(receiver)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture(max_level: tracing::Level, f: impl FnOnce()) -> Vec<LogRecord> {
        let (bridge, receiver) = LogBridge::new();
        let subscriber = tracing_subscriber::registry().with(bridge.with_max_level(max_level));
        tracing::subscriber::with_default(subscriber, f);
        receiver.try_iter().collect()
    }

    #[test]
    fn test_message_and_fields() {
        let records = capture(tracing::Level::TRACE, || {
            tracing::info!(count = 3, "Copied nodes");
        });
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, tracing::Level::INFO);
        assert_eq!(records[0].message, "Copied nodes, count = 3");
        assert!(records[0].target.ends_with("log_bridge::tests"));
    }

    #[test]
    fn test_level_filter() {
        let records = capture(tracing::Level::INFO, || {
            tracing::debug!("hidden");
            tracing::warn!("shown");
        });
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, "shown");
    }

    #[test]
    fn test_fields_only() {
        let records = capture(tracing::Level::TRACE, || {
            tracing::error!(path = "a.json");
        });
        assert_eq!(records[0].message, "path = a.json");
    }
}
