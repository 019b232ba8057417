use crate::ports::outbound::DocumentSink;
use crate::shared::error::SbomError;
use crate::shared::Result;
use std::io::{self, Write};

/// WriterSink adapter streaming documents to any `io::Write`
///
/// Used for stdout output; consecutive documents are separated by a blank line.
pub struct WriterSink<W: Write + Send> {
    writer: W,
    target: String,
    documents: usize,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W, target: impl Into<String>) -> Self {
        Self {
            writer,
            target: target.into(),
            documents: 0,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes).map_err(|e| SbomError::Write {
            target: self.target.clone(),
            details: e.to_string(),
        })?;
        Ok(())
    }
}

impl WriterSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout(), "stdout")
    }
}

impl<W: Write + Send> DocumentSink for WriterSink<W> {
    fn write_document(&mut self, _slug: &str, _extension: &str, content: &[u8]) -> Result<()> {
        if self.documents > 0 {
            self.write_all(b"\n")?;
        }
        self.write_all(content)?;
        self.writer.flush().map_err(|e| SbomError::Write {
            target: self.target.clone(),
            details: e.to_string(),
        })?;
        self.documents += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_writer_sink_separates_documents() {
        let mut sink = WriterSink::new(Vec::new(), "buffer");
        sink.write_document("a", "spdx", b"first\n").unwrap();
        sink.write_document("b", "spdx", b"second\n").unwrap();

        assert_eq!(
            String::from_utf8(sink.into_inner()).unwrap(),
            "first\n\nsecond\n"
        );
    }

    #[test]
    fn test_writer_sink_write_error() {
        let mut sink = WriterSink::new(BrokenPipe, "stdout");
        let err = sink.write_document("a", "spdx", b"x").unwrap_err();

        assert!(matches!(
            err.downcast_ref::<SbomError>(),
            Some(SbomError::Write { target, .. }) if target == "stdout"
        ));
    }
}
