use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One unit of claimable work: an identity-bearing range over an ordered
/// domain.
///
/// The coordinator never inspects the range itself; it relies on the two
/// caller-supplied pieces here. `key` must be stable across processes
/// (it is how records for the same interval are matched up in the shared
/// history), and `overlaps` decides whether two claims collide. Equal
/// intervals must overlap.
pub trait Interval: Clone + fmt::Debug + Send + 'static {
    /// Canonical identity string for the interval.
    fn key(&self) -> String;

    /// Whether two intervals contend for the same work.
    fn overlaps(&self, other: &Self) -> bool;
}

/// A 1-based, closed genomic coordinate range (e.g. `chr1:100-200`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GenomeSpan {
    pub contig: String,
    pub start: u64,
    pub stop: u64,
}

impl GenomeSpan {
    pub fn new(contig: impl Into<String>, start: u64, stop: u64) -> Self {
        Self {
            contig: contig.into(),
            start,
            stop,
        }
    }
}

impl fmt::Display for GenomeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.contig, self.start, self.stop)
    }
}

impl FromStr for GenomeSpan {
    type Err = String;

    /// Parses `contig:start-stop`, the same form `Display` emits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (contig, range) = s
            .rsplit_once(':')
            .ok_or_else(|| format!("invalid span '{}': expected contig:start-stop", s))?;
        let (start, stop) = range
            .split_once('-')
            .ok_or_else(|| format!("invalid span '{}': expected contig:start-stop", s))?;
        if contig.is_empty() {
            return Err(format!("invalid span '{}': empty contig", s));
        }
        let start: u64 = start
            .parse()
            .map_err(|_| format!("invalid span '{}': bad start coordinate", s))?;
        let stop: u64 = stop
            .parse()
            .map_err(|_| format!("invalid span '{}': bad stop coordinate", s))?;
        if start == 0 || stop < start {
            return Err(format!("invalid span '{}': coordinates are 1-based and start <= stop", s));
        }
        Ok(GenomeSpan::new(contig, start, stop))
    }
}

impl Interval for GenomeSpan {
    fn key(&self) -> String {
        self.to_string()
    }

    /// Closed-interval overlap on the same contig.
    fn overlaps(&self, other: &Self) -> bool {
        self.contig == other.contig && self.start <= other.stop && other.start <= self.stop
    }
}
