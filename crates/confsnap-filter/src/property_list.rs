//! Binary property lists.
//!
//! A binary plist hides its string values from a text scan, so it is
//! converted to an XML plist before it is scanned. The XML form is also what
//! ends up in the backup.

use crate::error::{FilterError, Result};
use std::io::{Cursor, Read};
use std::path::Path;

/// Magic bytes at the start of every binary plist.
pub const BINARY_PLIST_MAGIC: &[u8] = b"bplist";

/// Whether `bytes` start with the binary plist header.
#[must_use]
pub fn is_binary_plist(bytes: &[u8]) -> bool {
    bytes.starts_with(BINARY_PLIST_MAGIC)
}

/// Whether `path` has a `.plist` extension.
#[must_use]
pub fn has_plist_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("plist"))
}

/// Convert a binary plist to an XML plist document.
///
/// # Errors
/// Returns `Plist` if the data is not a valid property list.
pub fn to_xml(bytes: &[u8]) -> Result<String> {
    let value = plist::Value::from_reader(Cursor::new(bytes)).map_err(FilterError::plist)?;

    let mut xml = Vec::new();
    value.to_writer_xml(&mut xml).map_err(FilterError::plist)?;
    String::from_utf8(xml).map_err(FilterError::plist)
}

/// Read a `.plist` file as XML if it is stored in binary form.
///
/// Returns `Ok(None)` for every other file, XML plists included.
///
/// # Errors
/// Returns `Io` if the file can't be read, `Plist` if it has a binary plist
/// header but can't be decoded.
pub fn read_binary_as_xml(path: &Path) -> Result<Option<String>> {
    if !has_plist_extension(path) {
        return Ok(None);
    }

    let mut magic = Vec::with_capacity(BINARY_PLIST_MAGIC.len());
    std::fs::File::open(path)?
        .take(BINARY_PLIST_MAGIC.len() as u64)
        .read_to_end(&mut magic)?;
    if !is_binary_plist(&magic) {
        return Ok(None);
    }

    let bytes = std::fs::read(path)?;
    to_xml(&bytes).map(Some)
}
