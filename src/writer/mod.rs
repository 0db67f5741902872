/*
    This module writes normalized grammars and word lists to disk
*/

use std::ffi::OsString;
use std::fmt::Display;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::info;
use tempfile::NamedTempFile;

use crate::error_handling::*;
use crate::grammar::*;
use crate::normalize::NormalForm;

#[derive(Debug)]
pub enum OutputErrorType {
    // The file could not be created, written or moved into place
    FileError(std::io::Error),
}

impl ErrorType for OutputErrorType {}

impl PartialEq for OutputErrorType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (OutputErrorType::FileError(a), OutputErrorType::FileError(b)) => a.kind() == b.kind(),
        }
    }
}

impl Display for OutputErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputErrorType::FileError(e) => write!(f, "Could not write file: {}", e),
        }
    }
}

pub type OutputError = Error<OutputErrorType>;
pub type OutputResult<T> = Result<T, OutputError>;

fn file_error(path: &Path, error: std::io::Error) -> OutputError {
    OutputError {
        location: Location::file(path.to_path_buf()),
        error: OutputErrorType::FileError(error)
    }
}

/// `base` with `.extension` appended, keeping any extension it already has.
pub fn output_path(base: &Path, extension: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

// Writes into a temporary file next to `path` and renames it over `path`
// once everything is on disk, so a failed run never leaves half a file
fn write_atomic(path: &Path, contents: &str) -> OutputResult<()> {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new(".")
    };

    let mut file = NamedTempFile::new_in(directory).map_err(|e| file_error(path, e))?;
    file.write_all(contents.as_bytes()).map_err(|e| file_error(path, e))?;
    file.persist(path).map_err(|e| file_error(path, e.error))?;

    Ok(())
}

/// Saves `grammar` as `<base>.chomsky` or `<base>.greibach` and returns the
/// path written.
pub fn save(grammar: &Grammar, base: &Path, form: NormalForm) -> OutputResult<PathBuf> {
    let path = output_path(base, form.extension());
    write_atomic(&path, &grammar.to_string())?;

    info!("Wrote {} rules in {} normal form to {}", grammar.len(), form, path.display());
    Ok(path)
}

/// One word per line, `E` standing for the empty word.
pub fn save_words(words: &[String], path: &Path) -> OutputResult<()> {
    let mut contents = String::new();
    for word in words {
        if word.is_empty() {
            contents.push(EPSILON_MARKER);
        } else {
            contents.push_str(word);
        }
        contents.push('\n');
    }
    write_atomic(path, &contents)?;

    info!("Wrote {} words to {}", words.len(), path.display());
    Ok(())
}
