//! Contact list input.
//!
//! The list is a CSV file with a header row naming at least `name` and
//! `email`. Other columns are ignored. Rows where either field is missing or
//! empty are dropped without error; order and duplicates are preserved.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_CONTACTS_FILENAME: &str = "contacts.csv";
pub const NAME_COLUMN: &str = "name";
pub const EMAIL_COLUMN: &str = "email";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub email: String,
}

impl Contact {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// Named fields available to message templates.
    pub fn fields(&self) -> HashMap<&str, &str> {
        HashMap::from([(NAME_COLUMN, self.name.as_str()), (EMAIL_COLUMN, self.email.as_str())])
    }
}

#[derive(Debug, Error)]
pub enum ContactError {
    #[error("failed to read contacts from {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed contacts file {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("contacts file {} has no `{column}` column", .path.display())]
    MissingColumn { path: PathBuf, column: &'static str },
}

pub trait ContactSource {
    fn load(&self) -> Result<Vec<Contact>, ContactError>;
}

impl ContactSource for [Contact] {
    fn load(&self) -> Result<Vec<Contact>, ContactError> {
        Ok(self.to_vec())
    }
}

impl ContactSource for Vec<Contact> {
    fn load(&self) -> Result<Vec<Contact>, ContactError> {
        Ok(self.clone())
    }
}

#[derive(Debug, Clone)]
pub struct CsvContacts {
    path: PathBuf,
}

impl CsvContacts {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parses contacts from any reader; `origin` is only used in errors.
    pub fn parse<R: Read>(reader: R, origin: &Path) -> Result<Vec<Contact>, ContactError> {
        let csv_err = |source: csv::Error| ContactError::Csv {
            path: origin.to_path_buf(),
            source,
        };

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let headers = reader.headers().map_err(csv_err)?.clone();
        let column = |name: &'static str| {
            headers
                .iter()
                .position(|header| header == name)
                .ok_or_else(|| ContactError::MissingColumn {
                    path: origin.to_path_buf(),
                    column: name,
                })
        };
        let name_idx = column(NAME_COLUMN)?;
        let email_idx = column(EMAIL_COLUMN)?;

        let mut contacts = Vec::new();
        let mut dropped = 0usize;

        for record in reader.records() {
            let record = match record {
                Ok(record) => record,
                Err(err) if err.is_io_error() => return Err(csv_err(err)),
                Err(err) => {
                    debug!(error = %err, "skipping unreadable contact row");
                    dropped += 1;
                    continue;
                }
            };

            match (record.get(name_idx), record.get(email_idx)) {
                (Some(name), Some(email)) if !name.is_empty() && !email.is_empty() => {
                    contacts.push(Contact::new(name, email));
                }
                _ => dropped += 1,
            }
        }

        debug!(
            path = %origin.display(),
            loaded = contacts.len(),
            dropped,
            "loaded contacts"
        );
        Ok(contacts)
    }
}

impl ContactSource for CsvContacts {
    fn load(&self) -> Result<Vec<Contact>, ContactError> {
        let file = File::open(&self.path).map_err(|source| ContactError::Io {
            path: self.path.clone(),
            source,
        })?;
        Self::parse(file, &self.path)
    }
}
