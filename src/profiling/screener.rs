//! Suspect screening
//!
//! Matches every suspect in a database against one sequence and records a
//! verdict with per-marker detail.

use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::Sender;
use tracing::{debug, info, warn};

use super::database::StrDatabase;
use super::error::{ProfileError, Result};
use super::profiler::Profiler;
use super::sequence::SequenceData;
use super::types::{
    Fingerprint, MarkerComparison, ProfileParams, ProfileResults, ProgressUpdate, Suspect,
    SuspectVerdict, Verdict,
};

/// Send a progress update every this many suspects
const PROGRESS_INTERVAL: usize = 10;

/// Run the complete profiling of a database against a sequence.
///
/// Fails only when case folding makes two marker columns identical.
pub fn run_profiling(
    sequence: &SequenceData,
    database: &StrDatabase,
    params: &ProfileParams,
    progress_tx: Option<Sender<ProgressUpdate>>,
) -> Result<ProfileResults> {
    let num_threads = params.thread_count.get_count();
    info!(
        sequence = %sequence.name,
        length = sequence.len(),
        suspects = database.len(),
        markers = database.markers.len(),
        threads = num_threads,
        "starting profiling"
    );

    let folded;
    let database = if params.uppercase {
        folded = fold_database(database)?;
        &folded
    } else {
        database
    };

    let profiler = Profiler::new(sequence.sequence.as_str());
    let mut results = ProfileResults::new(params.clone(), sequence.name.clone(), sequence.len());

    let total = database.len();
    let completed_count = AtomicUsize::new(0);

    let run = || {
        let observed = profiler.marker_counts(&database.markers);
        let verdicts: Vec<SuspectVerdict> = database
            .suspects
            .par_iter()
            .map(|suspect| {
                let verdict = screen_suspect(&profiler, suspect, &observed);

                let completed = completed_count.fetch_add(1, Ordering::Relaxed) + 1;
                if let Some(tx) = &progress_tx {
                    if completed % PROGRESS_INTERVAL == 0 || completed == total {
                        let _ = tx.send(ProgressUpdate {
                            completed,
                            total,
                            message: format!("Suspect {}/{}", completed, total),
                        });
                    }
                }

                verdict
            })
            .collect();
        (observed, verdicts)
    };

    let (observed, verdicts) = match rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
    {
        Ok(pool) => pool.install(run),
        Err(e) => {
            warn!(error = %e, "could not build thread pool, using the global pool");
            run()
        }
    };

    results.markers = database.markers.clone();
    results.observed = observed;
    results.verdicts = verdicts;

    info!(
        guilty = results.guilty().count(),
        total = results.verdicts.len(),
        "profiling complete"
    );

    if let Some(tx) = &progress_tx {
        let _ = tx.send(ProgressUpdate {
            completed: total,
            total,
            message: "Profiling complete".to_string(),
        });
    }

    Ok(results)
}

/// Match one suspect and collect expected vs observed counts.
///
/// `observed` holds the counts already computed for the database markers;
/// markers missing from it are counted on demand. The verdict is derived
/// from the same comparisons that are reported.
pub fn screen_suspect(
    profiler: &Profiler,
    suspect: &Suspect,
    observed: &Fingerprint,
) -> SuspectVerdict {
    let markers: Vec<MarkerComparison> = suspect
        .fingerprint
        .iter()
        .map(|(marker, &expected)| MarkerComparison {
            marker: marker.clone(),
            expected,
            observed: observed
                .get(marker)
                .copied()
                .unwrap_or_else(|| profiler.longest_run(marker)),
        })
        .collect();

    let verdict = Verdict::from_match(markers.iter().all(MarkerComparison::is_match));
    debug!(suspect = %suspect.name, %verdict, "suspect screened");

    SuspectVerdict {
        name: suspect.name.clone(),
        verdict,
        markers,
    }
}

/// Upper-case every marker name, rejecting columns that become identical.
fn fold_database(database: &StrDatabase) -> Result<StrDatabase> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    for marker in &database.markers {
        let upper = marker.to_ascii_uppercase();
        if let Some(previous) = seen.insert(upper, marker.as_str()) {
            return Err(ProfileError::InvalidArgument(format!(
                "Markers '{}' and '{}' are the same when case is ignored",
                previous, marker
            )));
        }
    }

    let suspects = database
        .suspects
        .iter()
        .map(|suspect| Suspect {
            name: suspect.name.clone(),
            fingerprint: suspect
                .fingerprint
                .iter()
                .map(|(marker, &count)| (marker.to_ascii_uppercase(), count))
                .collect(),
        })
        .collect();

    Ok(StrDatabase {
        markers: database.markers.iter().map(|m| m.to_ascii_uppercase()).collect(),
        suspects,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiling::database::parse_str_database;
    use crate::profiling::types::ThreadCount;
    use std::sync::mpsc::channel;

    const SEQUENCE: &str = "AGACGGGTTACCATGACTATCTATCTATCTATCTATCTATCTATCTATCACGTACGTACGTATCGAGATAGATAGATAGATAGATCCTCGACTTCGATCGCAATGAATGCCAATAGACAAAA";

    fn sequence_data() -> SequenceData {
        SequenceData {
            name: "scene".to_string(),
            sequence: SEQUENCE.to_string(),
        }
    }

    #[test]
    fn test_run_profiling_verdicts() {
        let db = parse_str_database("name,AGAT,AATG,TATC\nCain,5,2,8\nAbel,3,7,4\n").unwrap();
        let params = ProfileParams {
            thread_count: ThreadCount::Fixed(2),
            ..Default::default()
        };

        let results = run_profiling(&sequence_data(), &db, &params, None).unwrap();

        assert_eq!(results.sequence_length, SEQUENCE.len());
        assert_eq!(results.summary_lines(), vec!["Cain guilty", "Abel innocent"]);
        assert_eq!(results.observed.get("TATC"), Some(&8));

        let abel = &results.verdicts[1];
        let mismatched: Vec<&str> = abel.mismatches().map(|m| m.marker.as_str()).collect();
        assert_eq!(mismatched, vec!["AATG", "AGAT", "TATC"]);
    }

    #[test]
    fn test_run_profiling_reports_progress() {
        let db = parse_str_database("name,AGAT\nCain,5\n").unwrap();
        let (tx, rx) = channel();

        run_profiling(&sequence_data(), &db, &ProfileParams::default(), Some(tx)).unwrap();

        let updates: Vec<ProgressUpdate> = rx.try_iter().collect();
        let last = updates.last().unwrap();
        assert_eq!(last.completed, 1);
        assert_eq!(last.total, 1);
    }

    #[test]
    fn test_empty_database() {
        let db = parse_str_database("name,AGAT\n").unwrap();
        let results = run_profiling(&sequence_data(), &db, &ProfileParams::default(), None).unwrap();
        assert!(results.verdicts.is_empty());
        assert_eq!(results.markers, vec!["AGAT"]);
    }

    #[test]
    fn test_uppercase_markers() {
        let db = parse_str_database("name,agat\nCain,5\n").unwrap();
        let exact = run_profiling(&sequence_data(), &db, &ProfileParams::default(), None).unwrap();
        assert_eq!(exact.verdicts[0].verdict, Verdict::Innocent);

        let params = ProfileParams {
            uppercase: true,
            ..Default::default()
        };
        let folded = run_profiling(&sequence_data(), &db, &params, None).unwrap();
        assert_eq!(folded.verdicts[0].verdict, Verdict::Guilty);
        assert_eq!(folded.markers, vec!["AGAT"]);
    }

    #[test]
    fn test_screen_suspect_counts_unknown_markers() {
        let profiler = Profiler::new(SEQUENCE);
        let suspect = Suspect {
            name: "Cain".to_string(),
            fingerprint: [("AATG".to_string(), 2)].into_iter().collect(),
        };
        let verdict = screen_suspect(&profiler, &suspect, &Fingerprint::new());
        assert_eq!(verdict.verdict, Verdict::Guilty);
        assert_eq!(verdict.markers[0].observed, 2);
    }

    #[test]
    fn test_uppercase_rejects_colliding_markers() {
        let db = parse_str_database("name,AGAT,agat\nCain,5,99\n").unwrap();
        let sequence = SequenceData {
            name: "repeats".to_string(),
            sequence: "AGAT".repeat(5),
        };
        let params = ProfileParams {
            uppercase: true,
            ..Default::default()
        };

        let err = run_profiling(&sequence, &db, &params, None).unwrap_err();
        assert!(matches!(err, ProfileError::InvalidArgument(_)));

        // Without folding the columns stay distinct
        let exact = run_profiling(&sequence, &db, &ProfileParams::default(), None).unwrap();
        assert_eq!(exact.markers, vec!["AGAT", "agat"]);
        assert_eq!(exact.verdicts[0].markers.len(), 2);
    }

    #[test]
    fn test_verdict_follows_reported_counts() {
        let profiler = Profiler::new(SEQUENCE);
        let suspect = Suspect {
            name: "Cain".to_string(),
            fingerprint: [("AGAT".to_string(), 5)].into_iter().collect(),
        };
        // Precomputed counts are the single source for both verdict and report
        let observed: Fingerprint = [("AGAT".to_string(), 4)].into_iter().collect();

        let verdict = screen_suspect(&profiler, &suspect, &observed);
        assert_eq!(verdict.markers[0].observed, 4);
        assert_eq!(verdict.verdict, Verdict::Innocent);

        let matching: Fingerprint = [("AGAT".to_string(), 5)].into_iter().collect();
        assert_eq!(
            screen_suspect(&profiler, &suspect, &matching).verdict,
            Verdict::Guilty
        );
    }
}
