//! Output sinks: a plain line writer and a `SELECT DISTINCT` deduplicating one.

use std::io::{self, Write};

use rbql_helpers::IndexSet;

/// Accepts fully rendered output lines, one per matching record.
pub trait RecordWriter {
    fn write_record(&mut self, line: &str) -> io::Result<()>;
}

pub struct SimpleWriter<W> {
    dst: W,
}

impl<W: Write> SimpleWriter<W> {
    pub fn new(dst: W) -> Self {
        Self { dst }
    }
}

impl<W: Write> RecordWriter for SimpleWriter<W> {
    fn write_record(&mut self, line: &str) -> io::Result<()> {
        self.dst.write_all(line.as_bytes())?;
        self.dst.write_all(b"\n")
    }
}

pub struct UniqWriter<W> {
    dst: W,
    seen: IndexSet<String>,
}

impl<W: Write> UniqWriter<W> {
    pub fn new(dst: W) -> Self {
        Self { dst, seen: IndexSet::default() }
    }
}

impl<W: Write> RecordWriter for UniqWriter<W> {
    fn write_record(&mut self, line: &str) -> io::Result<()> {
        if self.seen.contains(line) {
            return Ok(());
        }
        self.seen.insert(line.to_string());
        self.dst.write_all(line.as_bytes())?;
        self.dst.write_all(b"\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn simple_writer_appends_newline() {
        let mut buf = Vec::new();
        SimpleWriter::new(&mut buf).write_record("hello").unwrap();
        assert_eq!(buf, b"hello\n");
    }

    #[test]
    fn uniq_writer_drops_duplicate_lines() {
        let mut buf = Vec::new();
        {
            let mut writer = UniqWriter::new(&mut buf);
            writer.write_record("a").unwrap();
            writer.write_record("b").unwrap();
            writer.write_record("a").unwrap();
        }
        assert_eq!(buf, b"a\nb\n");
    }
}
