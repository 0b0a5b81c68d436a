use async_trait::async_trait;
use std::io::Write;
use std::sync::Mutex;

use super::{encode, PublishError, Publisher};
use crate::models::OutboundMessage;

/// Writes one JSON document per line to any writer
pub struct LinePublisher<W> {
    writer: Mutex<W>,
}

pub type StdoutPublisher = LinePublisher<std::io::Stdout>;

impl LinePublisher<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> LinePublisher<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_line(&self, line: &str) -> Result<(), PublishError> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| PublishError::transport("stdout", "writer lock poisoned"))?;
        writeln!(writer, "{}", line).map_err(|e| PublishError::transport("stdout", e))
    }
}

#[async_trait]
impl<W: Write + Send> Publisher for LinePublisher<W> {
    fn name(&self) -> &'static str {
        "stdout"
    }

    async fn publish(&self, message: &OutboundMessage) -> Result<(), PublishError> {
        let line = encode(message)?;
        self.write_line(&line)
    }

    async fn flush(&self) -> Result<(), PublishError> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| PublishError::transport("stdout", "writer lock poisoned"))?;
        writer.flush().map_err(|e| PublishError::transport("stdout", e))
    }
}
