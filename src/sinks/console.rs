//! Console sink implementation

use crate::core::{LogLevel, LogRecord, Result, Sink, TimestampFormat};
use colored::Colorize;

/// Output format for [`ConsoleSink`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConsoleFormat {
    #[default]
    Text,
    Json,
}

/// A sink that renders records to the process console.
///
/// Error and fatal records go to stderr, everything else to stdout. The
/// text format escapes newlines in the message so one record stays one
/// line.
pub struct ConsoleSink {
    use_colors: bool,
    timestamp_format: TimestampFormat,
    output_format: ConsoleFormat,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self {
            use_colors: true,
            timestamp_format: TimestampFormat::default(),
            output_format: ConsoleFormat::default(),
        }
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self {
            use_colors,
            timestamp_format: TimestampFormat::default(),
            output_format: ConsoleFormat::default(),
        }
    }

    /// Set the output format for this sink
    ///
    /// # Example
    ///
    /// ```
    /// use log_router_system::sinks::{ConsoleFormat, ConsoleSink};
    ///
    /// let sink = ConsoleSink::new().with_output_format(ConsoleFormat::Json);
    /// ```
    #[must_use]
    pub fn with_output_format(mut self, format: ConsoleFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Set the timestamp format for this sink
    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for ConsoleSink {
    fn handle(&self, record: &LogRecord) -> Result<()> {
        let output = match self.output_format {
            ConsoleFormat::Text => self.format_text(record),
            ConsoleFormat::Json => self.format_json(record)?,
        };

        match record.level {
            LogLevel::Error | LogLevel::Fatal => eprintln!("{}", output),
            _ => println!("{}", output),
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}

impl ConsoleSink {
    /// Escape line breaks so a record cannot span multiple output lines
    fn sanitize(message: &str) -> String {
        message
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }

    fn format_text(&self, record: &LogRecord) -> String {
        let level_str = if self.use_colors {
            format!("{:7}", record.level.to_str())
                .color(record.level.color_code())
                .to_string()
        } else {
            format!("{:7}", record.level.to_str())
        };

        let timestamp_str = self.timestamp_format.format(&record.timestamp);
        let thread = record.thread_name.as_ref().unwrap_or(&record.thread_id);

        let mut output = format!("[{}] [{}] {}", timestamp_str, level_str, thread);

        if let Some(tag) = &record.tag {
            output.push_str(&format!(" [{}]", tag));
        }

        if let Some(message) = &record.message {
            output.push_str(&format!(" - {}", Self::sanitize(message)));
        }

        if let Some(error) = &record.error {
            output.push_str(&format!(" error: {}", error));
            let mut source = error.source();
            while let Some(cause) = source {
                output.push_str(&format!(": caused by: {}", cause));
                source = cause.source();
            }
        }

        if !record.attributes.is_empty() {
            let attributes = record
                .attributes
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join(" ");
            output.push_str(&format!(" {}", attributes));
        }

        if !record.context.is_empty() {
            output.push_str(&format!(" context: {}", record.context));
        }

        output
    }

    fn format_json(&self, record: &LogRecord) -> Result<String> {
        let attributes: serde_json::Map<String, serde_json::Value> = record
            .attributes
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json_value()))
            .collect();
        let context: serde_json::Map<String, serde_json::Value> = record
            .context
            .entries()
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json_value()))
            .collect();

        let value = serde_json::json!({
            "timestamp": self.timestamp_format.format(&record.timestamp),
            "level": record.level,
            "thread": record.thread_name.as_ref().unwrap_or(&record.thread_id),
            "tag": record.tag,
            "message": record.message,
            "error": record.error.as_ref().map(|e| e.to_string()),
            "attributes": attributes,
            "context": context,
        });

        Ok(serde_json::to_string(&value)?)
    }
}
