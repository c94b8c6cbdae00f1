//! Short tandem repeat counting over a single DNA sequence

use rayon::prelude::*;
use tracing::debug;

use super::types::Fingerprint;

/// Holds a DNA sequence and answers repeat-count queries against it.
///
/// The sequence is stored verbatim and never mutated, so a `Profiler`
/// can be shared by reference across threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profiler {
    sequence: String,
}

impl Profiler {
    pub fn new(sequence: impl Into<String>) -> Self {
        Self {
            sequence: sequence.into(),
        }
    }

    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    /// Longest number of back-to-back repetitions of `subseq` in the sequence.
    ///
    /// Scans left to right: a match extends the current run and jumps past
    /// the matched block, a mismatch resets the run and moves one position.
    /// Overlapping occurrences are therefore never counted. An empty
    /// `subseq` yields 0.
    pub fn longest_run(&self, subseq: &str) -> usize {
        let seq = self.sequence.as_bytes();
        let pattern = subseq.as_bytes();
        if pattern.is_empty() {
            return 0;
        }

        let mut run = 0;
        let mut longest = 0;
        let mut i = 0;

        while i < seq.len() {
            if seq.get(i..i + pattern.len()) == Some(pattern) {
                run += 1;
                i += pattern.len();
                longest = longest.max(run);
            } else {
                run = 0;
                i += 1;
            }
        }

        longest
    }

    /// True if every marker in `dna_fpr` repeats exactly the expected number
    /// of times. An empty fingerprint matches vacuously.
    ///
    /// `suspect_name` is only used for logging.
    pub fn match_suspect(&self, suspect_name: &str, dna_fpr: &Fingerprint) -> bool {
        let mut matched = true;
        for (marker, &expected) in dna_fpr {
            let observed = self.longest_run(marker);
            debug!(suspect = suspect_name, %marker, expected, observed, "marker compared");
            if observed != expected {
                matched = false;
            }
        }
        matched
    }

    /// Observed longest run for each marker, computed in parallel.
    pub fn marker_counts(&self, markers: &[String]) -> Fingerprint {
        markers
            .par_iter()
            .map(|marker| (marker.clone(), self.longest_run(marker)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SEQ_SMALL: &str = "CTAGATAGATAGATAGATGACTA";
    const SEQ_1: &str = "AACCCTGCGCGCGCGCGATCTATCTATCTATCTATCCAGCATTAGCTAGCATCAAGATAGATAGATGAATTTCGAAATGAATGAATGAATGAATGAATGAATG";
    const SEQ_2: &str = "CCAGATAGATAGATAGATAGATAGATGTCACAGGGATGCTGAGGGCTGCTTCGTACGTACTCCTGATTTCGGGGATCGCTGACACTAATGCGTGCGAGCGGATCGATCTCTATCTATCTATCTATCTATCCTATAGCATAGACATCCAGATAGATAGATC";
    const SEQ_3: &str = "AGACGGGTTACCATGACTATCTATCTATCTATCTATCTATCTATCTATCACGTACGTACGTATCGAGATAGATAGATAGATAGATCCTCGACTTCGATCGCAATGAATGCCAATAGACAAAA";

    fn fingerprint(pairs: &[(&str, usize)]) -> Fingerprint {
        pairs.iter().map(|&(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn test_new_stores_sequence_verbatim() {
        let p = Profiler::new("AAGCT");
        assert_eq!(p.sequence(), "AAGCT");
    }

    #[test]
    fn test_longest_run_small() {
        let p = Profiler::new(SEQ_SMALL);
        assert_eq!(p.longest_run("AGAT"), 4);
    }

    #[test]
    fn test_longest_run_known_sequences() {
        let p = Profiler::new(SEQ_1);
        assert_eq!(p.longest_run("AGAT"), 3);
        assert_eq!(p.longest_run("AATG"), 7);
        assert_eq!(p.longest_run("TATC"), 4);

        let p = Profiler::new(SEQ_2);
        assert_eq!(p.longest_run("AGAT"), 6);
        assert_eq!(p.longest_run("AATG"), 1);
        assert_eq!(p.longest_run("TATC"), 5);
    }

    #[test]
    fn test_longest_run_edge_cases() {
        assert_eq!(Profiler::new("").longest_run("AGAT"), 0);
        assert_eq!(Profiler::new("AGA").longest_run("AGAT"), 0);
        assert_eq!(Profiler::new("CCCCCC").longest_run("AGAT"), 0);
        assert_eq!(Profiler::new("AGATAGAT").longest_run(""), 0);
        // Match at the very end of the sequence
        assert_eq!(Profiler::new("CCAGAT").longest_run("AGAT"), 1);
    }

    #[test]
    fn test_longest_run_keeps_best_of_several_runs() {
        let p = Profiler::new("AGATAGATCCAGATAGATAGATCCAGAT");
        assert_eq!(p.longest_run("AGAT"), 3);
    }

    #[test]
    fn test_longest_run_does_not_count_overlaps() {
        // "AAA" holds "AA" at 0 and 1, but only one block tiles
        assert_eq!(Profiler::new("AAA").longest_run("AA"), 1);
        assert_eq!(Profiler::new("AAAA").longest_run("AA"), 2);
    }

    #[test]
    fn test_match_suspect_small() {
        let p = Profiler::new(SEQ_SMALL);
        assert!(p.match_suspect("Ada", &fingerprint(&[("AGAT", 4)])));
        assert!(!p.match_suspect("Bia", &fingerprint(&[("AGAT", 5)])));
    }

    #[test]
    fn test_match_suspect_multiple_markers() {
        let p = Profiler::new(SEQ_3);
        assert!(p.match_suspect(
            "Cain",
            &fingerprint(&[("AGAT", 5), ("AATG", 2), ("TATC", 8)])
        ));
        assert!(!p.match_suspect(
            "Abel",
            &fingerprint(&[("AGAT", 3), ("AATG", 7), ("TATC", 4)])
        ));
    }

    #[test]
    fn test_match_suspect_empty_fingerprint() {
        assert!(Profiler::new(SEQ_3).match_suspect("Nobody", &Fingerprint::new()));
        assert!(Profiler::new("").match_suspect("Nobody", &Fingerprint::new()));
    }

    #[test]
    fn test_match_suspect_ignores_name() {
        let p = Profiler::new(SEQ_SMALL);
        let fpr = fingerprint(&[("AGAT", 4)]);
        assert_eq!(p.match_suspect("Ada", &fpr), p.match_suspect("", &fpr));
    }

    #[test]
    fn test_marker_counts() {
        let p = Profiler::new(SEQ_1);
        let markers = vec!["AGAT".to_string(), "AATG".to_string(), "TATC".to_string()];
        let counts = p.marker_counts(&markers);
        assert_eq!(counts, fingerprint(&[("AGAT", 3), ("AATG", 7), ("TATC", 4)]));
    }

    proptest! {
        #[test]
        fn zero_iff_absent(seq in "[ACGT]{0,60}", pat in "[ACGT]{1,5}") {
            let p = Profiler::new(seq.clone());
            prop_assert_eq!(p.longest_run(&pat) == 0, !seq.contains(&pat));
        }

        #[test]
        fn embedded_block_counted(
            pat in "[ACGT]{1,5}",
            k in 1usize..8,
            left in "N{0,10}",
            right in "N{0,10}",
        ) {
            let seq = format!("{}{}{}", left, pat.repeat(k), right);
            prop_assert!(Profiler::new(seq).longest_run(&pat) >= k);
        }

        #[test]
        fn perturbed_count_never_matches(
            seq in "[ACGT]{0,80}",
            markers in proptest::collection::btree_set("[ACGT]{2,4}", 1..4),
            bump in 1usize..3,
        ) {
            let p = Profiler::new(seq);
            let markers: Vec<String> = markers.into_iter().collect();
            let mut fpr = p.marker_counts(&markers);
            prop_assert!(p.match_suspect("exact", &fpr));

            if let Some(count) = fpr.get_mut(&markers[0]) {
                *count += bump;
            }
            prop_assert!(!p.match_suspect("perturbed", &fpr));
        }
    }
}
