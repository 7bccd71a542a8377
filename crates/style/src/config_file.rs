use std::fmt;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::writer::ConfigWriter;

/// A single `name = value` record of the option file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigOption {
    pub name: &'static str,
    pub value: String,
}

/// In-memory option file: leading comment lines followed by options in
/// declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    comments: Vec<String>,
    options: Vec<ConfigOption>,
}

impl ConfigFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_comment(&mut self, text: impl Into<String>) {
        self.comments.push(text.into());
    }

    pub fn push(&mut self, name: &'static str, value: impl fmt::Display) {
        self.options.push(ConfigOption {
            name,
            value: value.to_string(),
        });
    }

    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    pub fn options(&self) -> &[ConfigOption] {
        &self.options
    }

    /// Value of the first option named `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|option| option.name == name)
            .map(|option| option.value.as_str())
    }

    /// Serialize to `sink`, returning it once everything is flushed
    pub fn write_to<W: Write>(&self, sink: W) -> io::Result<W> {
        let mut writer = ConfigWriter::new(sink);
        for comment in &self.comments {
            writer.write_comment(comment)?;
        }
        for option in &self.options {
            writer.write_option(option.name, &option.value)?;
        }
        writer.finish()
    }

    /// Serialize to a file, creating or truncating it
    pub fn write_to_path(&self, path: &Path) -> io::Result<()> {
        let file = File::create(path)?;
        self.write_to(file)?.sync_all()
    }

    pub fn render(&self) -> String {
        let bytes = self
            .write_to(Vec::new())
            .expect("writing to a Vec cannot fail");
        String::from_utf8(bytes).expect("option names and values are UTF-8")
    }
}

impl fmt::Display for ConfigFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
