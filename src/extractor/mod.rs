//! Streaming extraction of business records from ABR bulk XML extracts
//!
//! The bulk extract is a directory tree of large XML files, each holding many
//! `ABR` elements. Files are parsed event-by-event so a multi-gigabyte
//! extract never has to fit in memory as a document tree.

use crate::error::{AbrError, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Placeholder for fields absent from the source record
pub const UNKNOWN: &str = "Unknown";

/// One business record, as mapped from an `ABR` element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessRecord {
    pub company_name: String,
    pub state: String,
    pub postcode: String,
}

/// Extractor over a directory tree of ABR bulk `.xml` files
pub struct Extractor {
    data_dir: PathBuf,
}

impl Extractor {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// All `.xml` files under the data directory, in path order
    pub fn xml_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(&self.data_dir) {
            let entry = entry.map_err(|e| AbrError::Io {
                source: e.into(),
                context: format!("Failed to walk data directory: {:?}", self.data_dir),
            })?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "xml") {
                files.push(path.to_path_buf());
            }
        }
        files.sort();
        Ok(files)
    }

    /// Iterate every record in the tree, one file at a time
    pub fn records(&self) -> Result<Records> {
        let files = self.xml_files()?;
        tracing::info!("Found {} XML files under {:?}", files.len(), self.data_dir);
        Ok(Records {
            files: files.into_iter(),
            pending: VecDeque::new(),
        })
    }
}

/// Iterator over all records of a bulk extract
pub struct Records {
    files: std::vec::IntoIter<PathBuf>,
    pending: VecDeque<BusinessRecord>,
}

impl Iterator for Records {
    type Item = Result<BusinessRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.pending.pop_front() {
                return Some(Ok(record));
            }
            let path = self.files.next()?;
            tracing::debug!("Parsing {:?}", path);
            match extract_file(&path) {
                Ok(records) => self.pending.extend(records),
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Extract every `ABR` element of a single file
pub fn extract_file(path: &Path) -> Result<Vec<BusinessRecord>> {
    let mut reader = Reader::from_file(path).map_err(|e| AbrError::Xml {
        source: e,
        path: path.to_path_buf(),
    })?;
    extract_from_reader(&mut reader, path)
}

fn extract_from_reader<R: BufRead>(
    reader: &mut Reader<R>,
    path: &Path,
) -> Result<Vec<BusinessRecord>> {
    reader.trim_text(true);

    let mut records = Vec::new();
    let mut state = AbrState::default();
    let mut buf = Vec::new();

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|e| AbrError::Xml {
            source: e,
            path: path.to_path_buf(),
        })?;
        match event {
            Event::Start(ref e) => state.on_start(e.name().as_ref()),
            Event::End(ref e) => {
                if let Some(record) = state.on_end(e.name().as_ref()) {
                    records.push(record);
                }
            }
            Event::Empty(ref e) => {
                let name = e.name().as_ref().to_vec();
                state.on_start(&name);
                if let Some(record) = state.on_end(&name) {
                    records.push(record);
                }
            }
            Event::Text(ref t) => {
                let text = t.unescape().map_err(|e| AbrError::Xml {
                    source: e,
                    path: path.to_path_buf(),
                })?;
                state.on_text(&text);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(records)
}

/// Which leaf of the first `BusinessAddress` is currently open
#[derive(Debug, Clone, Copy, PartialEq)]
enum AddressField {
    State,
    Postcode,
}

/// Per-`ABR` parse state
///
/// First-match-wins throughout: the first `NonIndividualName` and the first
/// `BusinessAddress` of a record are used, later siblings are ignored.
#[derive(Default)]
struct AbrState {
    in_abr: bool,
    company_name: Option<String>,
    /// Depth inside the captured `NonIndividualName` subtree; 0 = not capturing
    name_depth: usize,
    name_buf: String,
    seen_address: bool,
    /// Depth inside the first `BusinessAddress` subtree; 0 = outside
    address_depth: usize,
    address_field: Option<AddressField>,
    state: Option<String>,
    postcode: Option<String>,
}

impl AbrState {
    fn on_start(&mut self, tag: &[u8]) {
        if tag == b"ABR" {
            *self = AbrState {
                in_abr: true,
                ..AbrState::default()
            };
            return;
        }
        if !self.in_abr {
            return;
        }

        if self.name_depth > 0 {
            self.name_depth += 1;
        } else if tag == b"NonIndividualName" && self.company_name.is_none() {
            self.name_depth = 1;
            self.name_buf.clear();
        }

        if self.address_depth > 0 {
            self.address_depth += 1;
            match tag {
                b"State" if self.state.is_none() => self.address_field = Some(AddressField::State),
                b"Postcode" if self.postcode.is_none() => {
                    self.address_field = Some(AddressField::Postcode)
                }
                _ => {}
            }
        } else if tag == b"BusinessAddress" && !self.seen_address {
            self.seen_address = true;
            self.address_depth = 1;
        }
    }

    fn on_text(&mut self, text: &str) {
        if self.name_depth > 0 {
            self.name_buf.push_str(text);
        }
        match self.address_field {
            Some(AddressField::State) => self.state = Some(text.to_string()),
            Some(AddressField::Postcode) => self.postcode = Some(text.to_string()),
            None => {}
        }
    }

    fn on_end(&mut self, tag: &[u8]) -> Option<BusinessRecord> {
        if tag == b"ABR" && self.in_abr {
            self.in_abr = false;
            return Some(BusinessRecord {
                company_name: self
                    .company_name
                    .take()
                    .unwrap_or_else(|| UNKNOWN.to_string()),
                state: self.state.take().unwrap_or_else(|| UNKNOWN.to_string()),
                postcode: self.postcode.take().unwrap_or_else(|| UNKNOWN.to_string()),
            });
        }
        if !self.in_abr {
            return None;
        }

        if self.name_depth > 0 {
            self.name_depth -= 1;
            if self.name_depth == 0 {
                self.company_name = Some(self.name_buf.trim().to_string());
            }
        }

        if self.address_depth > 0 {
            self.address_depth -= 1;
            self.address_field = None;
        }

        None
    }
}
