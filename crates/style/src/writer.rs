use std::io::{self, BufWriter, Write};

/// Column at which the `=` of an option record starts
pub const OPTION_ASSIGN_ALIGN: usize = 32;

/// Line terminator for every record, on every platform
pub const LINE_SEPARATOR: &str = "\n";

/// Buffered writer for the formatter's `name = value` option syntax
pub struct ConfigWriter<W: Write> {
    out: BufWriter<W>,
}

impl<W: Write> ConfigWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: BufWriter::new(out),
        }
    }

    /// Write `name`, pad to [`OPTION_ASSIGN_ALIGN`], then `= value` and a blank line.
    ///
    /// Names longer than the alignment column are written without padding.
    pub fn write_option(&mut self, name: &str, value: &str) -> io::Result<()> {
        let padding = OPTION_ASSIGN_ALIGN.saturating_sub(name.chars().count());
        write!(self.out, "{name}{:padding$}= {value}", "")?;
        self.out.write_all(LINE_SEPARATOR.as_bytes())?;
        self.out.write_all(LINE_SEPARATOR.as_bytes())
    }

    /// Write every line of `text` as a `# `-prefixed comment
    pub fn write_comment(&mut self, text: &str) -> io::Result<()> {
        let mut block = String::with_capacity(text.len() + 8);
        for line in text.lines() {
            block.push_str("# ");
            block.push_str(line);
            block.push_str(LINE_SEPARATOR);
        }
        self.out.write_all(block.as_bytes())
    }

    /// Flush buffered records and hand back the underlying sink
    pub fn finish(self) -> io::Result<W> {
        self.out.into_inner().map_err(|e| e.into_error())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn written(f: impl FnOnce(&mut ConfigWriter<Vec<u8>>) -> io::Result<()>) -> String {
        let mut writer = ConfigWriter::new(Vec::new());
        f(&mut writer).unwrap();
        String::from_utf8(writer.finish().unwrap()).unwrap()
    }

    #[test]
    fn test_option_is_aligned_to_column() {
        let out = written(|w| w.write_option("sp_assign", "force"));
        assert_eq!(out, format!("sp_assign{}= force\n\n", " ".repeat(23)));
        assert_eq!(out.find('='), Some(OPTION_ASSIGN_ALIGN));
    }

    #[test]
    fn test_long_name_is_not_padded() {
        let name = "a".repeat(40);
        let out = written(|w| w.write_option(&name, "1"));
        assert_eq!(out, format!("{name}= 1\n\n"));
    }

    #[test]
    fn test_comment_prefixes_each_line() {
        let out = written(|w| w.write_comment("first\nsecond\r\nthird"));
        assert_eq!(out, "# first\n# second\n# third\n");
    }

    #[test]
    fn test_records_are_sequential() {
        let out = written(|w| {
            w.write_comment("header")?;
            w.write_option("newlines", "lf")?;
            w.write_option("indent_columns", "4")
        });
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "# header");
        assert!(lines[1].starts_with("newlines "));
        assert_eq!(lines[2], "");
        assert!(lines[3].ends_with("= 4"));
    }

    struct FailingSink;

    impl Write for FailingSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "sink closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_sink_failure_propagates() {
        let mut writer = ConfigWriter::new(FailingSink);
        // Buffered until flush
        writer.write_option("newlines", "lf").unwrap();
        assert!(writer.finish().is_err());
    }
}
