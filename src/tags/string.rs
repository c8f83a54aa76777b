//! String-based Tag Collection
//!
//! A sorted `SmallVec<[String; 5]>` set used for product tags and for the
//! label selections (brands, sizes, colors) of a catalog query.

use std::{cmp::Ordering, string::ToString};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A sorted, deduplicated collection of string tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct StringTagCollection {
    tags: SmallVec<[String; 5]>,
}

impl StringTagCollection {
    /// Create a new string tag collection from a vector of strings.
    #[must_use]
    pub fn new(tags: SmallVec<[String; 5]>) -> Self {
        let mut collection = Self { tags };

        collection.tags.sort();
        collection.tags.dedup();

        collection
    }

    /// Create an empty collection.
    pub fn empty() -> Self {
        Self {
            tags: SmallVec::with_capacity(0),
        }
    }

    /// Create a new string tag collection from string slices.
    pub fn from_strs(tags: &[&str]) -> Self {
        Self::new(
            tags.iter()
                .map(ToString::to_string)
                .collect::<SmallVec<[String; 5]>>(),
        )
    }

    /// Check if this collection contains a specific tag (exact match).
    pub fn contains(&self, tag: &str) -> bool {
        self.tags
            .binary_search_by(|probe| probe.as_str().cmp(tag))
            .is_ok()
    }

    /// Check if any tag contains `needle` as a substring, ignoring case.
    ///
    /// `needle` must already be lowercased.
    pub fn any_contains_lowercase(&self, needle: &str) -> bool {
        self.tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(needle))
    }

    /// Check if this collection shares at least one tag with `other`.
    pub fn intersects(&self, other: &Self) -> bool {
        // Both sides are sorted, so walk them together.
        let mut left = self.tags.iter();
        let mut right = other.tags.iter();
        let mut left_tag = left.next();
        let mut right_tag = right.next();

        while let (Some(left_tag_ref), Some(right_tag_ref)) = (left_tag, right_tag) {
            match left_tag_ref.cmp(right_tag_ref) {
                Ordering::Equal => return true,
                Ordering::Less => left_tag = left.next(),
                Ordering::Greater => right_tag = right.next(),
            }
        }

        false
    }

    /// Add a tag, keeping the collection sorted.
    pub fn add(&mut self, tag: &str) {
        if let Err(pos) = self
            .tags
            .binary_search_by(|probe| probe.as_str().cmp(tag))
        {
            self.tags.insert(pos, tag.to_string());
        }
    }

    /// Remove a tag if present.
    pub fn remove(&mut self, tag: &str) {
        if let Ok(pos) = self
            .tags
            .binary_search_by(|probe| probe.as_str().cmp(tag))
        {
            self.tags.remove(pos);
        }
    }

    /// Iterate over the tags in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    /// Check if this collection is empty.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Get the number of tags in this collection.
    pub fn len(&self) -> usize {
        self.tags.len()
    }
}

impl From<Vec<String>> for StringTagCollection {
    fn from(tags: Vec<String>) -> Self {
        Self::new(SmallVec::from_vec(tags))
    }
}

impl From<StringTagCollection> for Vec<String> {
    fn from(collection: StringTagCollection) -> Self {
        collection.tags.into_vec()
    }
}
