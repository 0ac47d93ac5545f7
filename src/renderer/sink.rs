//! Terminal sink contract.

use crate::event::{LogLevel, emit_log};
use std::io::{self, Write};

/// A passive terminal that accepts text with embedded escape sequences.
///
/// The renderer only ever writes; it never reads back.
pub trait TerminalSink {
    fn write(&mut self, data: &str);
}

/// Accumulates everything written.
impl TerminalSink for String {
    fn write(&mut self, data: &str) {
        self.push_str(data);
    }
}

/// Keeps each write separately, which makes batching observable.
impl TerminalSink for Vec<String> {
    fn write(&mut self, data: &str) {
        self.push(data.to_owned());
    }
}

impl<T: TerminalSink + ?Sized> TerminalSink for &mut T {
    fn write(&mut self, data: &str) {
        (**self).write(data);
    }
}

impl<T: TerminalSink + ?Sized> TerminalSink for Box<T> {
    fn write(&mut self, data: &str) {
        (**self).write(data);
    }
}

/// Adapts any [`Write`] (stdout, a file, a pipe) into a sink.
///
/// `write` cannot fail, so the first I/O error is kept for the caller to
/// collect with [`take_error`](Self::take_error); later writes are dropped
/// until it is taken.
#[derive(Debug)]
pub struct IoSink<W: Write> {
    writer: W,
    error: Option<io::Error>,
}

impl<W: Write> IoSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            error: None,
        }
    }

    /// The pending I/O error, if a write failed.
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> TerminalSink for IoSink<W> {
    fn write(&mut self, data: &str) {
        if self.error.is_some() {
            return;
        }
        let result = self
            .writer
            .write_all(data.as_bytes())
            .and_then(|()| self.writer.flush());
        if let Err(err) = result {
            emit_log(LogLevel::Error, &format!("terminal write failed: {err}"));
            self.error = Some(err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_string_sink_accumulates() {
        let mut sink = String::new();
        sink.write("ab");
        sink.write("c");
        assert_eq!(sink, "abc");
    }

    #[test]
    fn test_vec_sink_records_calls() {
        let mut sink: Vec<String> = Vec::new();
        TerminalSink::write(&mut sink, "x");
        TerminalSink::write(&mut sink, "y");
        assert_eq!(sink, vec!["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn test_io_sink_writes_bytes() {
        let mut sink = IoSink::new(Vec::new());
        sink.write("\x1b[1;1Hz");
        assert_eq!(sink.get_ref().as_slice(), b"\x1b[1;1Hz");
        assert!(sink.take_error().is_none());
        assert_eq!(sink.into_inner(), b"\x1b[1;1Hz".to_vec());
    }

    #[test]
    fn test_io_sink_keeps_first_error() {
        let mut sink = IoSink::new(FailingWriter);
        sink.write("a");
        sink.write("b");
        let err = sink.take_error().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert!(sink.take_error().is_none());
    }
}
