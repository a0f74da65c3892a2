// Clippy allows for the whole crate
#![allow(clippy::too_many_arguments)]

//! gtftree: per-chromosome interval trees for transcript and feature lookups
//!
//! Entries are loaded once, balanced once, and then queried many times, for
//! example once per read or per bin in a coverage pipeline.
//!
//! # Features
//!
//! - **Two-phase build**: append entries, then [`IntervalForest::finish`]
//!   balances every chromosome into an augmented interval tree
//! - **Filtered queries**: match types (any, exact, contain, within, start,
//!   end) and strand types (ignore, same, opposite, exact-same)
//! - **Shared reads**: a finished forest is immutable and `Sync`; batch
//!   queries fan out with Rayon
//!
//! # Example
//!
//! ```rust
//! use gtftree::{IntervalForest, MatchType, Strand, StrandType};
//!
//! let mut forest = IntervalForest::new();
//! forest.add_entry("1", 11868, 14409, "A", Strand::Plus, 0).unwrap();
//! forest.add_entry("1", 12009, 13670, "B", Strand::Plus, 0).unwrap();
//! forest.finish().unwrap();
//!
//! let hits = forest
//!     .find_overlaps("1", 13000, 13100, Strand::Unknown, MatchType::Any, StrandType::Ignore)
//!     .unwrap();
//! assert_eq!(hits.len(), 2);
//! ```

pub mod annotation;
pub mod config;
pub mod error;
pub mod filter;
pub mod forest;
pub mod ingest;
pub mod interval;
pub mod labels;
pub mod output;
pub mod store;
pub mod tree;

// Re-export commonly used types
pub use annotation::{AnnotationIndex, LabeledMatch};
pub use config::QueryOptions;
pub use error::{IndexError, Result};
pub use filter::{MatchType, StrandType};
pub use forest::{IntervalForest, Query};
pub use interval::{Entry, Match, Strand};
pub use labels::LabelRegistry;
pub use store::{EntryIndex, EntryStore};
pub use tree::IntervalTree;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::annotation::{AnnotationIndex, LabeledMatch};
    pub use crate::config::QueryOptions;
    pub use crate::error::IndexError;
    pub use crate::filter::{MatchType, StrandType};
    pub use crate::forest::{IntervalForest, Query};
    pub use crate::interval::{Entry, Match, Strand};
    pub use crate::labels::LabelRegistry;
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_basic_workflow() {
        use crate::ingest::load_index;
        use crate::labels::LabelRegistry;
        use crate::prelude::*;

        let content = "chr1\t100\t200\tT1\t+\t0\nchr1\t150\t250\tT2\t-\t0\nchr1\t300\t400\tT3\t+\t0\n";
        let (index, _) = load_index(content.as_bytes(), LabelRegistry::new()).unwrap();

        let hits = index
            .find_overlaps("chr1", 175, 225, Strand::Plus, MatchType::Any, StrandType::Same)
            .unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "T1");
        assert_eq!(hits[0].label, "0");
    }
}
