//! STR database parsing
//!
//! A database is delimited text: a header row naming the markers, then one
//! row per suspect with the name first and one repeat count per marker.

use std::collections::HashSet;

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;

use super::error::{ProfileError, Result};
use super::types::{Fingerprint, Suspect};

/// Parsed STR database
#[derive(Debug, Clone, Default)]
pub struct StrDatabase {
    /// Marker names in header order
    pub markers: Vec<String>,
    pub suspects: Vec<Suspect>,
}

impl StrDatabase {
    pub fn len(&self) -> usize {
        self.suspects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suspects.is_empty()
    }
}

/// Parse a comma-separated STR database.
pub fn parse_str_database(text: &str) -> Result<StrDatabase> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let markers = parse_markers(reader.headers()?)?;

    let mut suspects = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result?;
        // Header is line 1
        suspects.push(parse_suspect(&record, &markers, row + 2)?);
    }

    debug!(
        markers = markers.len(),
        suspects = suspects.len(),
        "STR database parsed"
    );

    Ok(StrDatabase { markers, suspects })
}

fn parse_markers(headers: &StringRecord) -> Result<Vec<String>> {
    let markers: Vec<String> = headers.iter().skip(1).map(|s| s.to_string()).collect();

    if markers.is_empty() {
        return Err(ProfileError::InvalidArgument(
            "Database header must name at least one marker after the name column".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for (i, marker) in markers.iter().enumerate() {
        if marker.is_empty() {
            return Err(ProfileError::InvalidArgument(format!(
                "Marker name in column {} is empty",
                i + 2
            )));
        }
        if !seen.insert(marker.as_str()) {
            return Err(ProfileError::InvalidArgument(format!(
                "Marker '{}' appears more than once in the header",
                marker
            )));
        }
    }

    Ok(markers)
}

fn parse_suspect(record: &StringRecord, markers: &[String], line: usize) -> Result<Suspect> {
    let name = record.get(0).unwrap_or_default().to_string();

    let mut fingerprint = Fingerprint::new();
    for (marker, field) in markers.iter().zip(record.iter().skip(1)) {
        fingerprint.insert(marker.clone(), parse_count(field, marker, line)?);
    }

    Ok(Suspect { name, fingerprint })
}

fn parse_count(field: &str, marker: &str, line: usize) -> Result<usize> {
    let value: i64 = field.parse().map_err(|_| {
        ProfileError::Parse(format!(
            "Line {}: count '{}' for marker '{}' is not an integer",
            line, field, marker
        ))
    })?;

    usize::try_from(value).map_err(|_| {
        ProfileError::InvalidArgument(format!(
            "Line {}: count {} for marker '{}' is negative",
            line, value, marker
        ))
    })
}
