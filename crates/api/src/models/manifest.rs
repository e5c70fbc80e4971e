//! Archive manifest (`META-INF/MANIFEST.MF`) model and parser.
//!
//! A manifest is a main section followed by per-entry sections, each a list of
//! `Key: value` headers. Sections are separated by blank lines, and a line
//! starting with a single space continues the previous value. Per-entry
//! sections start with a `Name:` header naming the entry (for packages, the
//! package path with a trailing slash).

use std::collections::BTreeMap;

pub const NAME: &str = "Name";
pub const SEALED: &str = "Sealed";
pub const SPECIFICATION_TITLE: &str = "Specification-Title";
pub const SPECIFICATION_VERSION: &str = "Specification-Version";
pub const SPECIFICATION_VENDOR: &str = "Specification-Vendor";
pub const IMPLEMENTATION_TITLE: &str = "Implementation-Title";
pub const IMPLEMENTATION_VERSION: &str = "Implementation-Version";
pub const IMPLEMENTATION_VENDOR: &str = "Implementation-Vendor";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ManifestError {
    #[error("line {line}: expected `Key: value`")]
    MissingSeparator { line: usize },
    #[error("line {line}: continuation without a preceding header")]
    DanglingContinuation { line: usize },
    #[error("line {line}: entry section without a `Name` header")]
    UnnamedSection { line: usize },
}

/// Header set of one manifest section. Keys compare case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    values: BTreeMap<String, (String, String)>,
}

impl Attributes {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(&key.to_ascii_lowercase())
            .map(|(_, value)| value.as_str())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        self.values
            .insert(key.to_ascii_lowercase(), (key, value.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Headers with their original spelling.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .values()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    fn append_to(&mut self, key: &str, more: &str) {
        if let Some((_, value)) = self.values.get_mut(&key.to_ascii_lowercase()) {
            value.push_str(more);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    main: Attributes,
    entries: BTreeMap<String, Attributes>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(text: &str) -> Result<Self, ManifestError> {
        let mut manifest = Manifest::new();
        let mut current = Attributes::default();
        let mut section_start = 1;
        let mut in_main = true;
        let mut last_key: Option<String> = None;

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.strip_suffix('\r').unwrap_or(raw);

            if line.is_empty() {
                if !current.is_empty() {
                    manifest.finish_section(std::mem::take(&mut current), in_main, section_start)?;
                    in_main = false;
                }
                last_key = None;
                section_start = line_no + 1;
                continue;
            }

            if let Some(more) = line.strip_prefix(' ') {
                let key = last_key
                    .as_deref()
                    .ok_or(ManifestError::DanglingContinuation { line: line_no })?;
                current.append_to(key, more);
                continue;
            }

            let (key, value) = line
                .split_once(':')
                .ok_or(ManifestError::MissingSeparator { line: line_no })?;
            let key = key.trim();
            if key.is_empty() {
                return Err(ManifestError::MissingSeparator { line: line_no });
            }
            current.insert(key, value.strip_prefix(' ').unwrap_or(value));
            last_key = Some(key.to_string());
        }

        if !current.is_empty() {
            manifest.finish_section(current, in_main, section_start)?;
        }
        Ok(manifest)
    }

    fn finish_section(
        &mut self,
        section: Attributes,
        in_main: bool,
        line: usize,
    ) -> Result<(), ManifestError> {
        if in_main {
            self.main = section;
            return Ok(());
        }
        let name = section
            .get(NAME)
            .map(str::to_string)
            .ok_or(ManifestError::UnnamedSection { line })?;
        self.entries.insert(name, section);
        Ok(())
    }

    pub fn main_attributes(&self) -> &Attributes {
        &self.main
    }

    pub fn main_attributes_mut(&mut self) -> &mut Attributes {
        &mut self.main
    }

    pub fn attributes(&self, entry: &str) -> Option<&Attributes> {
        self.entries.get(entry)
    }

    /// Per-entry section for `entry`, created empty when missing.
    pub fn entry_mut(&mut self, entry: &str) -> &mut Attributes {
        self.entries.entry(entry.to_string()).or_insert_with(|| {
            let mut attrs = Attributes::default();
            attrs.insert(NAME, entry);
            attrs
        })
    }

    pub fn entry_names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Attribute lookup for an entry with fallback to the main section.
    pub fn effective(&self, entry: &str, key: &str) -> Option<&str> {
        self.attributes(entry)
            .and_then(|attrs| attrs.get(key))
            .or_else(|| self.main.get(key))
    }

    /// Whether the manifest seals the package at `package_path` (`a/b/`).
    pub fn is_sealed(&self, package_path: &str) -> bool {
        self.effective(package_path, SEALED)
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
    }
}
