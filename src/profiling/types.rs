//! Data types for STR profiling

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Marker -> repeat count mapping. Ordered only so reports are stable.
pub type Fingerprint = BTreeMap<String, usize>;

/// Thread count configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThreadCount {
    /// Use all available CPU cores
    Auto,
    /// Use a specific number of threads
    Fixed(usize),
}

impl Default for ThreadCount {
    fn default() -> Self {
        Self::Auto
    }
}

impl ThreadCount {
    /// Get the actual number of threads to use
    pub fn get_count(&self) -> usize {
        match self {
            Self::Auto => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            Self::Fixed(n) => (*n).max(1),
        }
    }
}

/// Global profiling parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileParams {
    pub thread_count: ThreadCount,
    /// Strip whitespace and line breaks from raw (non-FASTA) sequence text
    pub trim_whitespace: bool,
    /// Upper-case the sequence and marker names before comparing
    pub uppercase: bool,
}

impl Default for ProfileParams {
    fn default() -> Self {
        Self {
            thread_count: ThreadCount::Auto,
            trim_whitespace: true,
            uppercase: false,
        }
    }
}

/// A named suspect and the repeat counts expected for them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suspect {
    pub name: String,
    pub fingerprint: Fingerprint,
}

/// Outcome of matching one suspect against the sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Guilty,
    Innocent,
}

impl Verdict {
    pub fn from_match(matched: bool) -> Self {
        if matched {
            Self::Guilty
        } else {
            Self::Innocent
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Guilty => "guilty",
            Self::Innocent => "innocent",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expected vs observed repeat count for a single marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerComparison {
    pub marker: String,
    pub expected: usize,
    pub observed: usize,
}

impl MarkerComparison {
    pub fn is_match(&self) -> bool {
        self.expected == self.observed
    }
}

/// Result for one suspect
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuspectVerdict {
    pub name: String,
    pub verdict: Verdict,
    pub markers: Vec<MarkerComparison>,
}

impl SuspectVerdict {
    pub fn mismatches(&self) -> impl Iterator<Item = &MarkerComparison> {
        self.markers.iter().filter(|m| !m.is_match())
    }
}

/// Complete profiling results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResults {
    pub params: ProfileParams,
    pub sequence_name: String,
    pub sequence_length: usize,
    pub markers: Vec<String>,
    pub observed: Fingerprint,
    pub verdicts: Vec<SuspectVerdict>,
}

impl ProfileResults {
    pub fn new(params: ProfileParams, sequence_name: String, sequence_length: usize) -> Self {
        Self {
            params,
            sequence_name,
            sequence_length,
            markers: Vec::new(),
            observed: Fingerprint::new(),
            verdicts: Vec::new(),
        }
    }

    /// Suspects whose every marker matched
    pub fn guilty(&self) -> impl Iterator<Item = &SuspectVerdict> {
        self.verdicts
            .iter()
            .filter(|v| v.verdict == Verdict::Guilty)
    }

    /// One "<name> <verdict>" line per suspect, in database order
    pub fn summary_lines(&self) -> Vec<String> {
        self.verdicts
            .iter()
            .map(|v| format!("{} {}", v.name, v.verdict))
            .collect()
    }
}

/// Progress update during profiling
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    pub completed: usize,
    pub total: usize,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_from_match() {
        assert_eq!(Verdict::from_match(true), Verdict::Guilty);
        assert_eq!(Verdict::from_match(false), Verdict::Innocent);
        assert_eq!(Verdict::Innocent.to_string(), "innocent");
    }

    #[test]
    fn test_fixed_thread_count_never_zero() {
        assert_eq!(ThreadCount::Fixed(0).get_count(), 1);
        assert_eq!(ThreadCount::Fixed(4).get_count(), 4);
        assert!(ThreadCount::Auto.get_count() >= 1);
    }

    #[test]
    fn test_summary_lines() {
        let mut results = ProfileResults::new(ProfileParams::default(), "seq".into(), 10);
        results.verdicts.push(SuspectVerdict {
            name: "Erin".into(),
            verdict: Verdict::Guilty,
            markers: vec![],
        });
        results.verdicts.push(SuspectVerdict {
            name: "Ian".into(),
            verdict: Verdict::Innocent,
            markers: vec![MarkerComparison {
                marker: "AGAT".into(),
                expected: 3,
                observed: 5,
            }],
        });
        assert_eq!(results.summary_lines(), vec!["Erin guilty", "Ian innocent"]);
        assert_eq!(results.guilty().count(), 1);
        assert_eq!(results.verdicts[1].mismatches().count(), 1);
    }
}
