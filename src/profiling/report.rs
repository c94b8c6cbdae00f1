//! Verdict reports and result persistence

use std::io::Write;
use std::path::Path;

use csv::Writer;

use super::error::Result;
use super::types::ProfileResults;

/// Label of the row holding the counts observed in the sequence
pub const OBSERVED_ROW: &str = "observed";

/// Write a verdict table as CSV.
///
/// Columns are `name,verdict` followed by one column per marker. The first
/// data row holds the observed counts, then one row per suspect with its
/// expected counts.
pub fn write_verdict_csv<W: Write>(results: &ProfileResults, writer: W) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);

    let mut header = vec!["name".to_string(), "verdict".to_string()];
    header.extend(results.markers.iter().cloned());
    wtr.write_record(&header)?;

    let mut observed = vec![OBSERVED_ROW.to_string(), String::new()];
    observed.extend(
        results
            .markers
            .iter()
            .map(|m| count_field(results.observed.get(m).copied())),
    );
    wtr.write_record(&observed)?;

    for verdict in &results.verdicts {
        let mut row = vec![verdict.name.clone(), verdict.verdict.to_string()];
        row.extend(results.markers.iter().map(|m| {
            count_field(
                verdict
                    .markers
                    .iter()
                    .find(|c| &c.marker == m)
                    .map(|c| c.expected),
            )
        }));
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

fn count_field(count: Option<usize>) -> String {
    count.map(|c| c.to_string()).unwrap_or_default()
}

/// Save results as pretty-printed JSON
pub fn save_results_json(results: &ProfileResults, path: impl AsRef<Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(results)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Load results previously written by [`save_results_json`]
pub fn load_results_json(path: impl AsRef<Path>) -> Result<ProfileResults> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}
