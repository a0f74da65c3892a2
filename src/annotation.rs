//! Forest plus label registry, with labelled query results.

use crate::error::{IndexError, Result};
use crate::filter::{MatchType, StrandType};
use crate::forest::IntervalForest;
use crate::interval::{Match, Strand};
use crate::labels::LabelRegistry;
use std::borrow::Cow;
use std::fmt;

/// A match with its group index resolved to a label.
///
/// The label borrows from the registry, or is the group number itself for
/// an index with numbered groups and no registered label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledMatch<'a> {
    pub start: u64,
    pub end: u64,
    pub name: &'a str,
    pub label: Cow<'a, str>,
}

impl fmt::Display for LabeledMatch<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{}\t{}", self.start, self.end, self.name, self.label)
    }
}

/// An interval forest together with the labels its group indices refer to.
#[derive(Debug, Clone, Default)]
pub struct AnnotationIndex {
    pub forest: IntervalForest,
    pub labels: LabelRegistry,
    /// Resolve group indices past the registry to their own number
    /// instead of failing with `OutOfRange`.
    pub numbered_groups: bool,
}

impl AnnotationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(forest: IntervalForest, labels: LabelRegistry) -> Self {
        Self {
            forest,
            labels,
            numbered_groups: false,
        }
    }

    /// Look up the label for a group index.
    pub fn resolve_label(&self, group: u32) -> Result<Cow<'_, str>> {
        match self.labels.resolve(group) {
            Ok(label) => Ok(Cow::Borrowed(label)),
            Err(IndexError::OutOfRange { .. }) if self.numbered_groups => {
                Ok(Cow::Owned(group.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    /// Swap all labels at once, keeping the label count.
    pub fn replace_labels<I, S>(&mut self, labels: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels.replace_all(labels)
    }

    /// Like [`IntervalForest::find_overlaps`], with each group index
    /// resolved against the registry.
    pub fn find_overlaps(
        &self,
        chrom: &str,
        start: u64,
        end: u64,
        strand: Strand,
        match_type: MatchType,
        strand_type: StrandType,
    ) -> Result<Vec<LabeledMatch<'_>>> {
        self.forest
            .find_overlap_indices(chrom, start, end, strand, match_type, strand_type)?
            .into_iter()
            .map(|idx| {
                let entry = &self.forest.entries()[idx];
                Ok(LabeledMatch {
                    start: entry.start,
                    end: entry.end,
                    name: &entry.name,
                    label: self.resolve_label(entry.group)?,
                })
            })
            .collect()
    }

    /// Resolve the labels of matches produced elsewhere.
    pub fn label_matches<'a>(&'a self, matches: &'a [Match]) -> Result<Vec<LabeledMatch<'a>>> {
        matches
            .iter()
            .map(|m| {
                Ok(LabeledMatch {
                    start: m.start,
                    end: m.end,
                    name: &m.name,
                    label: self.resolve_label(m.group)?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> AnnotationIndex {
        let mut index = AnnotationIndex::new();
        let genes = index.labels.push("genes");
        let repeats = index.labels.push("repeats");
        index
            .forest
            .add_entry("chr1", 100, 200, "g1", Strand::Plus, genes)
            .unwrap();
        index
            .forest
            .add_entry("chr1", 150, 300, "r1", Strand::Minus, repeats)
            .unwrap();
        index.forest.finish().unwrap();
        index
    }

    #[test]
    fn test_labeled_overlaps() {
        let index = sample_index();
        let hits = index
            .find_overlaps("chr1", 120, 160, Strand::Unknown, MatchType::Any, StrandType::Ignore)
            .unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!((hits[0].name, hits[0].label.as_ref()), ("g1", "genes"));
        assert_eq!((hits[1].name, hits[1].label.as_ref()), ("r1", "repeats"));
        assert_eq!(hits[1].to_string(), "150\t300\tr1\trepeats");
    }

    #[test]
    fn test_missing_label_is_out_of_range() {
        let mut index = AnnotationIndex::new();
        index.labels.push("only");
        index
            .forest
            .add_entry("chr1", 0, 10, "x", Strand::Plus, 5)
            .unwrap();
        index.forest.finish().unwrap();

        let err = index
            .find_overlaps("chr1", 0, 10, Strand::Plus, MatchType::Any, StrandType::Ignore)
            .unwrap_err();
        assert_eq!(err, IndexError::OutOfRange { index: 5, len: 1 });
    }

    #[test]
    fn test_replace_labels_keeps_tree() {
        let mut index = sample_index();
        index.replace_labels(["protein coding", "LINEs"]).unwrap();

        let raw = index
            .forest
            .find_overlaps("chr1", 250, 260, Strand::Unknown, MatchType::Any, StrandType::Ignore)
            .unwrap();
        let labeled = index.label_matches(&raw).unwrap();
        assert_eq!(labeled[0].label, "LINEs");
        assert_eq!(index.resolve_label(0).unwrap(), "protein coding");
    }

    #[test]
    fn test_numbered_groups_fill_missing_labels() {
        let mut index = AnnotationIndex::new();
        index.labels.push("genes");
        index
            .forest
            .add_entry("chr1", 0, 10, "x", Strand::Plus, 7)
            .unwrap();
        index.forest.finish().unwrap();
        index.numbered_groups = true;

        assert_eq!(index.resolve_label(0).unwrap(), "genes");
        assert_eq!(index.resolve_label(7).unwrap(), "7");
        assert!(index.labels.resolve(7).is_err());

        let hits = index
            .find_overlaps("chr1", 0, 10, Strand::Plus, MatchType::Any, StrandType::Ignore)
            .unwrap();
        assert_eq!(hits[0].label, "7");
    }
}
