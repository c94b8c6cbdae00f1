//! STR Profiler - DNA Fingerprint Matching Tool
//!
//! Counts short tandem repeats in a DNA sequence and matches suspects'
//! expected repeat counts against them.

pub mod profiling;

pub use profiling::*;
