//! Sequence input: FASTA or raw text

use std::io::Cursor;

use bio::alphabets::dna;
use bio::io::fasta;
use tracing::{debug, warn};

use super::error::{ProfileError, Result};
use super::types::ProfileParams;

/// Name given to sequences read from raw (header-less) text
pub const RAW_SEQUENCE_NAME: &str = "sequence";

/// Parsed sequence to profile
#[derive(Debug, Clone)]
pub struct SequenceData {
    pub name: String,
    pub sequence: String,
}

impl SequenceData {
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

/// Count symbols outside A/C/G/T (either case). These are kept, only reported.
pub fn non_standard_count(seq: &str) -> usize {
    let alphabet = dna::alphabet();
    if alphabet.is_word(seq.as_bytes()) {
        return 0;
    }
    seq.bytes().filter(|&b| !alphabet.is_word([b])).count()
}

/// Parse a sequence from text.
///
/// Text whose first non-blank line starts with `>` is read as FASTA and
/// must contain exactly one record. Anything else is a raw sequence.
pub fn parse_sequence_input(text: &str, params: &ProfileParams) -> Result<SequenceData> {
    let is_fasta = text
        .lines()
        .find(|l| !l.trim().is_empty())
        .is_some_and(|l| l.trim_start().starts_with('>'));

    let mut data = if is_fasta {
        parse_fasta_record(text)?
    } else {
        parse_raw_sequence(text, params.trim_whitespace)
    };

    if data.sequence.is_empty() {
        return Err(ProfileError::Parse("No sequence found in input".to_string()));
    }

    if params.uppercase {
        data.sequence.make_ascii_uppercase();
    }

    let odd = non_standard_count(&data.sequence);
    if odd > 0 {
        warn!(
            name = %data.name,
            count = odd,
            "sequence contains symbols other than A, C, G, T"
        );
    }
    debug!(name = %data.name, length = data.len(), "sequence parsed");

    Ok(data)
}

fn parse_fasta_record(text: &str) -> Result<SequenceData> {
    let reader = fasta::Reader::new(Cursor::new(text.trim_start().as_bytes()));
    let mut records = reader.records();

    let record = match records.next() {
        Some(r) => r.map_err(|e| ProfileError::Parse(format!("FASTA parsing error: {}", e)))?,
        None => return Err(ProfileError::Parse("No FASTA record found".to_string())),
    };

    if records.next().is_some() {
        return Err(ProfileError::Parse(
            "Sequence input must contain exactly 1 FASTA record".to_string(),
        ));
    }

    let sequence = String::from_utf8(record.seq().to_vec())
        .map_err(|e| ProfileError::Parse(format!("Sequence is not valid UTF-8: {}", e)))?;

    Ok(SequenceData {
        name: record.id().to_string(),
        sequence,
    })
}

fn parse_raw_sequence(text: &str, trim_whitespace: bool) -> SequenceData {
    let sequence = if trim_whitespace {
        text.chars().filter(|c| !c.is_whitespace()).collect()
    } else {
        text.to_string()
    };

    SequenceData {
        name: RAW_SEQUENCE_NAME.to_string(),
        sequence,
    }
}
