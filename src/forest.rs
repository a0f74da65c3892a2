//! Chromosome forest: the build-then-query interval index.
//!
//! An [`IntervalForest`] starts out *building*: [`IntervalForest::add_entry`]
//! appends entries to a per-chromosome vine. A single call to
//! [`IntervalForest::finish`] balances every vine into an [`IntervalTree`]
//! and freezes the forest. From then on it is read-only and can be shared
//! across threads for any number of concurrent queries.

use crate::config::{self, QueryOptions};
use crate::error::{IndexError, Result};
use crate::filter::{MatchType, StrandType};
use crate::interval::{Entry, Match, Strand};
use crate::store::{EntryIndex, EntryStore};
use crate::tree::{IntervalTree, Vine};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::io::{self, Write};
use std::ops::ControlFlow;

#[derive(Debug, Clone)]
enum ForestState {
    Building(FxHashMap<String, Vine>),
    Finalized(FxHashMap<String, IntervalTree>),
}

/// A query window on one chromosome, used for batch lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
    pub strand: Strand,
}

impl Query {
    pub fn new(chrom: impl Into<String>, start: u64, end: u64, strand: Strand) -> Self {
        Self {
            chrom: chrom.into(),
            start,
            end,
            strand,
        }
    }
}

/// Per-chromosome forest of augmented interval trees.
#[derive(Debug, Clone)]
pub struct IntervalForest {
    store: EntryStore,
    state: ForestState,
}

impl IntervalForest {
    /// Create an empty forest in the building state.
    pub fn new() -> Self {
        Self {
            store: EntryStore::new(),
            state: ForestState::Building(FxHashMap::default()),
        }
    }

    /// Create an empty forest with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            store: EntryStore::with_capacity(capacity),
            state: ForestState::Building(FxHashMap::default()),
        }
    }

    /// Append an entry to its chromosome's vine.
    ///
    /// Fails with [`IndexError::InvalidInterval`] when `start >= end` and
    /// with [`IndexError::AlreadyFinalized`] after [`finish`](Self::finish).
    /// A failed call leaves the forest untouched.
    pub fn add_entry(
        &mut self,
        chrom: &str,
        start: u64,
        end: u64,
        name: impl Into<String>,
        strand: Strand,
        group: u32,
    ) -> Result<EntryIndex> {
        let vines = match &mut self.state {
            ForestState::Building(vines) => vines,
            ForestState::Finalized(_) => return Err(IndexError::AlreadyFinalized),
        };

        let entry = Entry::new(start, end, name, strand, group)?;
        let idx = self.store.push(entry)?;

        match vines.get_mut(chrom) {
            Some(vine) => vine.push(idx),
            None => {
                let mut vine = Vine::new();
                vine.push(idx);
                vines.insert(chrom.to_string(), vine);
            }
        }

        Ok(idx)
    }

    /// Balance every chromosome and freeze the forest.
    ///
    /// Chromosomes are independent, so large forests are balanced in
    /// parallel (see [`config::set_parallel_threshold`]).
    pub fn finish(&mut self) -> Result<()> {
        let vines = match &mut self.state {
            ForestState::Building(vines) => std::mem::take(vines),
            ForestState::Finalized(_) => return Err(IndexError::AlreadyFinalized),
        };

        let store = &self.store;
        let trees: FxHashMap<String, IntervalTree> = if config::should_parallelize(store.len()) {
            vines
                .into_par_iter()
                .map(|(chrom, vine)| (chrom, IntervalTree::from_vine(vine, store)))
                .collect()
        } else {
            vines
                .into_iter()
                .map(|(chrom, vine)| (chrom, IntervalTree::from_vine(vine, store)))
                .collect()
        };

        self.state = ForestState::Finalized(trees);
        Ok(())
    }

    /// Total number of entries, in either state.
    #[inline]
    pub fn count_entries(&self) -> u64 {
        self.store.len() as u64
    }

    /// True once [`finish`](Self::finish) has succeeded.
    #[inline]
    pub fn is_tree(&self) -> bool {
        matches!(self.state, ForestState::Finalized(_))
    }

    /// Chromosome names, sorted.
    pub fn chromosomes(&self) -> Vec<&str> {
        let mut names: Vec<&str> = match &self.state {
            ForestState::Building(vines) => vines.keys().map(String::as_str).collect(),
            ForestState::Finalized(trees) => trees.keys().map(String::as_str).collect(),
        };
        names.sort_unstable();
        names
    }

    /// Get an entry by index.
    #[inline]
    pub fn entry(&self, index: EntryIndex) -> Option<&Entry> {
        self.store.get(index)
    }

    /// All entries in insertion order.
    #[inline]
    pub fn entries(&self) -> &EntryStore {
        &self.store
    }

    fn trees(&self) -> Result<&FxHashMap<String, IntervalTree>> {
        match &self.state {
            ForestState::Finalized(trees) => Ok(trees),
            ForestState::Building(_) => Err(IndexError::NotFinalized),
        }
    }

    /// The balanced tree of one chromosome.
    pub fn tree(&self, chrom: &str) -> Result<Option<&IntervalTree>> {
        Ok(self.trees()?.get(chrom))
    }

    /// Height of one chromosome's tree, `None` if the chromosome is absent.
    pub fn tree_height(&self, chrom: &str) -> Result<Option<usize>> {
        Ok(self.tree(chrom)?.map(IntervalTree::height))
    }

    /// Walk the overlaps of `[start, end)` that pass both filters, in tree order.
    fn visit_matches<F>(
        &self,
        chrom: &str,
        start: u64,
        end: u64,
        strand: Strand,
        match_type: MatchType,
        strand_type: StrandType,
        mut f: F,
    ) -> Result<()>
    where
        F: FnMut(EntryIndex, &Entry) -> ControlFlow<()>,
    {
        let trees = self.trees()?;
        if start >= end {
            return Err(IndexError::InvalidInterval { start, end });
        }

        let Some(tree) = trees.get(chrom) else {
            return Ok(());
        };

        let _ = tree.visit_overlaps(start, end, |idx| {
            let entry = &self.store[idx];
            if match_type.matches(entry.start, entry.end, start, end)
                && strand_type.matches(entry.strand, strand)
            {
                f(idx, entry)
            } else {
                ControlFlow::Continue(())
            }
        });
        Ok(())
    }

    /// Indices of the entries that overlap `[start, end)` and pass both
    /// filters, ordered by start, then end, then insertion order.
    pub fn find_overlap_indices(
        &self,
        chrom: &str,
        start: u64,
        end: u64,
        strand: Strand,
        match_type: MatchType,
        strand_type: StrandType,
    ) -> Result<Vec<EntryIndex>> {
        let mut hits = Vec::new();
        self.visit_matches(chrom, start, end, strand, match_type, strand_type, |idx, _| {
            hits.push(idx);
            ControlFlow::Continue(())
        })?;

        // Tree order is (start, insertion); a stable sort on end finishes the job
        hits.sort_by(|&a, &b| {
            let (a, b) = (&self.store[a], &self.store[b]);
            a.start.cmp(&b.start).then(a.end.cmp(&b.end))
        });
        Ok(hits)
    }

    /// Find the entries that overlap `[start, end)` on `chrom` and pass the
    /// match-type and strand-type filters.
    ///
    /// An unknown chromosome yields an empty result, not an error.
    pub fn find_overlaps(
        &self,
        chrom: &str,
        start: u64,
        end: u64,
        strand: Strand,
        match_type: MatchType,
        strand_type: StrandType,
    ) -> Result<Vec<Match>> {
        let hits = self.find_overlap_indices(chrom, start, end, strand, match_type, strand_type)?;
        Ok(hits
            .into_iter()
            .map(|idx| Match::from_entry(&self.store[idx]))
            .collect())
    }

    /// Count matches without materializing them.
    pub fn count_overlaps(
        &self,
        chrom: &str,
        start: u64,
        end: u64,
        strand: Strand,
        match_type: MatchType,
        strand_type: StrandType,
    ) -> Result<usize> {
        let mut count = 0;
        self.visit_matches(chrom, start, end, strand, match_type, strand_type, |_, _| {
            count += 1;
            ControlFlow::Continue(())
        })?;
        Ok(count)
    }

    /// Check if any entry overlaps `[start, end)`, ignoring strand.
    pub fn has_overlap(&self, chrom: &str, start: u64, end: u64) -> Result<bool> {
        let mut found = false;
        self.visit_matches(
            chrom,
            start,
            end,
            Strand::Unknown,
            MatchType::Any,
            StrandType::Ignore,
            |_, _| {
                found = true;
                ControlFlow::Break(())
            },
        )?;
        Ok(found)
    }

    /// Run many queries with shared filters. Results come back in query order.
    ///
    /// Batches at or above the parallel threshold are spread across the
    /// rayon pool.
    pub fn find_overlaps_batch(
        &self,
        queries: &[Query],
        options: QueryOptions,
    ) -> Result<Vec<Vec<Match>>> {
        self.trees()?;

        let run = |q: &Query| {
            self.find_overlaps(
                &q.chrom,
                q.start,
                q.end,
                q.strand,
                options.match_type,
                options.strand_type,
            )
        };

        if config::should_parallelize(queries.len()) {
            queries.par_iter().map(run).collect()
        } else {
            queries.iter().map(run).collect()
        }
    }

    /// Write every chromosome's tree, in chromosome order.
    pub fn write_tree<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let trees = self.trees().map_err(io::Error::other)?;
        for chrom in self.chromosomes() {
            let tree = &trees[chrom];
            writeln!(
                writer,
                "{}\tentries={}\theight={}",
                chrom,
                tree.len(),
                tree.height()
            )?;
            tree.write_to(writer, &self.store)?;
        }
        Ok(())
    }
}

impl Default for IntervalForest {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_forest() -> IntervalForest {
        let mut forest = IntervalForest::new();
        forest.add_entry("chr1", 100, 200, "a", Strand::Plus, 0).unwrap();
        forest.add_entry("chr1", 150, 250, "b", Strand::Minus, 0).unwrap();
        forest.add_entry("chr1", 300, 400, "c", Strand::Unknown, 1).unwrap();
        forest.add_entry("chr2", 100, 200, "d", Strand::Plus, 1).unwrap();
        forest
    }

    fn names(matches: &[Match]) -> Vec<&str> {
        matches.iter().map(|m| m.name.as_str()).collect()
    }

    #[test]
    fn test_build_forest() {
        let mut forest = sample_forest();
        assert_eq!(forest.count_entries(), 4);
        assert!(!forest.is_tree());
        assert_eq!(forest.chromosomes(), vec!["chr1", "chr2"]);

        forest.finish().unwrap();
        assert!(forest.is_tree());
        assert_eq!(forest.count_entries(), 4);
        assert_eq!(forest.tree_height("chr1").unwrap(), Some(2));
        assert_eq!(forest.tree_height("chr3").unwrap(), None);
    }

    #[test]
    fn test_invalid_interval_is_not_stored() {
        let mut forest = IntervalForest::new();
        assert_eq!(
            forest.add_entry("chr1", 200, 100, "x", Strand::Plus, 0),
            Err(IndexError::InvalidInterval {
                start: 200,
                end: 100
            })
        );
        assert!(forest.add_entry("chr1", 100, 100, "x", Strand::Plus, 0).is_err());
        assert_eq!(forest.count_entries(), 0);
        assert!(forest.chromosomes().is_empty());
    }

    #[test]
    fn test_state_guards() {
        let mut forest = sample_forest();
        assert_eq!(
            forest.find_overlaps("chr1", 0, 10, Strand::Unknown, MatchType::Any, StrandType::Ignore),
            Err(IndexError::NotFinalized)
        );
        assert_eq!(forest.tree("chr1").unwrap_err(), IndexError::NotFinalized);

        forest.finish().unwrap();
        assert_eq!(forest.finish(), Err(IndexError::AlreadyFinalized));
        assert_eq!(
            forest.add_entry("chr1", 1, 2, "late", Strand::Plus, 0),
            Err(IndexError::AlreadyFinalized)
        );
        assert_eq!(forest.count_entries(), 4);
    }

    #[test]
    fn test_find_overlaps() {
        let mut forest = sample_forest();
        forest.finish().unwrap();

        let hits = forest
            .find_overlaps("chr1", 175, 225, Strand::Unknown, MatchType::Any, StrandType::Ignore)
            .unwrap();
        assert_eq!(names(&hits), vec!["a", "b"]);
        assert_eq!(hits[0].group, 0);

        let none = forest
            .find_overlaps("chr1", 250, 300, Strand::Unknown, MatchType::Any, StrandType::Ignore)
            .unwrap();
        assert!(none.is_empty());

        let other = forest
            .find_overlaps("chr3", 0, 1000, Strand::Unknown, MatchType::Any, StrandType::Ignore)
            .unwrap();
        assert!(other.is_empty());
    }

    #[test]
    fn test_invalid_query_window() {
        let mut forest = sample_forest();
        forest.finish().unwrap();
        assert_eq!(
            forest.find_overlaps("chr1", 10, 10, Strand::Plus, MatchType::Any, StrandType::Ignore),
            Err(IndexError::InvalidInterval { start: 10, end: 10 })
        );
    }

    #[test]
    fn test_strand_filters() {
        let mut forest = sample_forest();
        forest.finish().unwrap();

        let find = |strand, strand_type| {
            forest
                .find_overlaps("chr1", 0, 1000, strand, MatchType::Any, strand_type)
                .unwrap()
        };

        assert_eq!(names(&find(Strand::Plus, StrandType::Same)), vec!["a"]);
        assert_eq!(names(&find(Strand::Plus, StrandType::Opposite)), vec!["b"]);
        assert!(find(Strand::Unknown, StrandType::Same).is_empty());
        assert!(find(Strand::Unknown, StrandType::Opposite).is_empty());
        assert_eq!(
            names(&find(Strand::Unknown, StrandType::ExactSame)),
            vec!["c"]
        );
    }

    #[test]
    fn test_ties_ordered_by_end_then_insertion() {
        let mut forest = IntervalForest::new();
        forest.add_entry("chr1", 10, 50, "long", Strand::Plus, 0).unwrap();
        forest.add_entry("chr1", 10, 20, "short", Strand::Plus, 0).unwrap();
        forest.add_entry("chr1", 10, 50, "long2", Strand::Plus, 0).unwrap();
        forest.add_entry("chr1", 5, 60, "first", Strand::Plus, 0).unwrap();
        forest.finish().unwrap();

        let hits = forest
            .find_overlaps("chr1", 0, 100, Strand::Unknown, MatchType::Any, StrandType::Ignore)
            .unwrap();
        assert_eq!(names(&hits), vec!["first", "short", "long", "long2"]);
    }

    #[test]
    fn test_count_and_has_overlap() {
        let mut forest = sample_forest();
        forest.finish().unwrap();

        assert_eq!(
            forest
                .count_overlaps("chr1", 0, 1000, Strand::Plus, MatchType::Any, StrandType::Same)
                .unwrap(),
            1
        );
        assert!(forest.has_overlap("chr1", 199, 200).unwrap());
        assert!(!forest.has_overlap("chr1", 250, 300).unwrap());
        assert!(!forest.has_overlap("chrX", 0, 10).unwrap());
    }

    #[test]
    fn test_batch_preserves_query_order() {
        let mut forest = sample_forest();
        forest.finish().unwrap();

        let queries = vec![
            Query::new("chr2", 0, 1000, Strand::Unknown),
            Query::new("chr1", 350, 360, Strand::Unknown),
            Query::new("chrY", 0, 10, Strand::Unknown),
        ];
        let results = forest
            .find_overlaps_batch(&queries, QueryOptions::default())
            .unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(names(&results[0]), vec!["d"]);
        assert_eq!(names(&results[1]), vec!["c"]);
        assert!(results[2].is_empty());
    }

    #[test]
    fn test_write_tree_requires_finish() {
        let mut forest = sample_forest();
        let mut out = Vec::new();
        assert!(forest.write_tree(&mut out).is_err());

        forest.finish().unwrap();
        forest.write_tree(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("chr1\tentries=3\theight=2\n"));
        assert!(text.contains("chr2\tentries=1\theight=1\n"));
    }

    #[test]
    fn test_forest_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<IntervalForest>();
    }
}
