//! Destinations for the rendered report text.

use std::io::Write;

use crate::error::SinkError;

/// Receives the full report text once a scan has been rendered.
pub trait ReportSink {
    /// Publishes the report text.
    fn publish(&mut self, text: &str) -> Result<(), SinkError>;
}

/// Keeps the last published report in memory.
#[derive(Debug, Default, Clone)]
pub struct StringSink {
    text: String,
}

impl StringSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// The last published text.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl ReportSink for StringSink {
    fn publish(&mut self, text: &str) -> Result<(), SinkError> {
        self.text.clear();
        self.text.push_str(text);
        Ok(())
    }
}

/// Writes the report to any [`Write`] (a file, stdout).
pub struct WriterSink<W: Write> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the wrapped writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ReportSink for WriterSink<W> {
    fn publish(&mut self, text: &str) -> Result<(), SinkError> {
        self.writer.write_all(text.as_bytes())?;
        if !text.ends_with('\n') {
            self.writer.write_all(b"\n")?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_sink_replaces_text() {
        let mut sink = StringSink::new();
        sink.publish("first").unwrap();
        sink.publish("second").unwrap();
        assert_eq!(sink.text(), "second");
    }

    #[test]
    fn test_writer_sink_terminates_line() {
        let mut sink = WriterSink::new(Vec::new());
        sink.publish("Overall Game-Ready Status: PASS").unwrap();
        let bytes = sink.into_inner();
        assert_eq!(String::from_utf8(bytes).unwrap(), "Overall Game-Ready Status: PASS\n");
    }
}
