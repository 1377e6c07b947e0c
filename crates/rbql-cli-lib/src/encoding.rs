//! Latin-1 and UTF-8 byte/text conversion for CSV-ish input, output and join
//! table files. Latin-1 maps each byte directly to the Unicode code point of
//! the same value, which is exact (Unicode's first 256 code points mirror
//! ISO-8859-1), so no external codec crate is needed.

use std::io;

use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Encoding {
    #[value(name = "latin-1")]
    Latin1,
    #[value(name = "utf-8")]
    Utf8,
}

impl Default for Encoding {
    fn default() -> Self {
        Encoding::Latin1
    }
}

impl Encoding {
    pub fn decode(self, bytes: &[u8]) -> io::Result<String> {
        match self {
            Encoding::Latin1 => Ok(bytes.iter().map(|&b| b as char).collect()),
            Encoding::Utf8 => String::from_utf8(bytes.to_vec())
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e)),
        }
    }

    pub fn encode(self, text: &str) -> io::Result<Vec<u8>> {
        match self {
            Encoding::Latin1 => text
                .chars()
                .map(|c| u8::try_from(c as u32).map_err(|_| io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("character '{c}' cannot be represented in latin-1"),
                )))
                .collect(),
            Encoding::Utf8 => Ok(text.as_bytes().to_vec()),
        }
    }
}

/// Wraps an output stream so every write is re-encoded from the UTF-8 the
/// engine produces into the configured output encoding.
pub struct EncodedWriter<W> {
    inner: W,
    encoding: Encoding,
}

impl<W: io::Write> EncodedWriter<W> {
    pub fn new(inner: W, encoding: Encoding) -> Self {
        Self { inner, encoding }
    }
}

impl<W: io::Write> io::Write for EncodedWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.encoding {
            Encoding::Utf8 => self.inner.write(buf),
            Encoding::Latin1 => {
                let text = std::str::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
                let encoded = self.encoding.encode(text)?;
                self.inner.write_all(&encoded)?;
                Ok(buf.len())
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn latin1_round_trips_high_bytes() {
        let bytes = vec![0xE9, b'a']; // e-acute, a
        let decoded = Encoding::Latin1.decode(&bytes).unwrap();
        assert_eq!(decoded.chars().next().unwrap() as u32, 0xE9);
        assert_eq!(Encoding::Latin1.encode(&decoded).unwrap(), bytes);
    }

    #[test]
    fn utf8_rejects_invalid_bytes() {
        assert!(Encoding::Utf8.decode(&[0xFF, 0xFE]).is_err());
    }
}
