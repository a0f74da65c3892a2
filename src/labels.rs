//! Registry mapping group indices to display labels.

use crate::error::{IndexError, Result};

/// Append-only list of group labels.
///
/// Entries only store a numeric group index; the registry is kept apart
/// from the trees so the labels can be renamed without touching them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelRegistry {
    labels: Vec<String>,
}

impl LabelRegistry {
    pub fn new() -> Self {
        Self { labels: Vec::new() }
    }

    /// Append a label and return its group index.
    pub fn push(&mut self, label: impl Into<String>) -> u32 {
        self.labels.push(label.into());
        (self.labels.len() - 1) as u32
    }

    /// Look up the label for a group index.
    pub fn resolve(&self, index: u32) -> Result<&str> {
        self.labels
            .get(index as usize)
            .map(String::as_str)
            .ok_or(IndexError::OutOfRange {
                index,
                len: self.labels.len(),
            })
    }

    /// Replace every label at once. The number of labels may not change.
    pub fn replace_all<I, S>(&mut self, labels: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let replacement: Vec<String> = labels.into_iter().map(Into::into).collect();
        if replacement.len() != self.labels.len() {
            return Err(IndexError::LabelCountMismatch {
                expected: self.labels.len(),
                found: replacement.len(),
            });
        }
        self.labels = replacement;
        Ok(())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for LabelRegistry {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self {
            labels: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_resolve() {
        let mut labels = LabelRegistry::new();
        assert_eq!(labels.push("genes"), 0);
        assert_eq!(labels.push("lncRNA"), 1);

        assert_eq!(labels.resolve(0).unwrap(), "genes");
        assert_eq!(labels.resolve(1).unwrap(), "lncRNA");
        assert_eq!(
            labels.resolve(2),
            Err(IndexError::OutOfRange { index: 2, len: 2 })
        );
    }

    #[test]
    fn test_replace_all() {
        let mut labels: LabelRegistry = ["a.bed", "b.bed"].into_iter().collect();

        labels.replace_all(["group 1", "group 2"]).unwrap();
        assert_eq!(labels.iter().collect::<Vec<_>>(), vec!["group 1", "group 2"]);

        let err = labels.replace_all(["only one"]).unwrap_err();
        assert_eq!(
            err,
            IndexError::LabelCountMismatch {
                expected: 2,
                found: 1
            }
        );
        // Failed replacement leaves the registry untouched
        assert_eq!(labels.resolve(0).unwrap(), "group 1");
    }
}
