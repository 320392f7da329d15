//! Child-set difference by signature
//!
//! Children are compared as sets keyed by [`Signature`]. Position is
//! irrelevant, so reordering siblings never produces a change, while any edit
//! to a child's tag, attributes or text shows up as a removal of the old
//! child plus an addition of the new one.
//!
//! Siblings sharing a signature collapse into one entry. The entry keeps the
//! position of the first occurrence and the element of the last occurrence.
//! Additions and removals are reported in first-occurrence order of each
//! signature on its own side.

use indexmap::IndexMap;

use crate::document::Element;
use crate::signature::{Signature, signature};

/// Children present on only one side of a comparison
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChildDiff<'a> {
    /// Children of the new element whose signature is absent from the old one
    pub additions: Vec<&'a Element>,
    /// Children of the old element whose signature is absent from the new one
    pub removals: Vec<&'a Element>,
}

impl ChildDiff<'_> {
    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.removals.is_empty()
    }
}

/// Compute added and removed children between two versions of an element
pub fn diff<'a>(old_children: &'a [Element], new_children: &'a [Element]) -> ChildDiff<'a> {
    let old_index = index_by_signature(old_children);
    let new_index = index_by_signature(new_children);

    ChildDiff {
        additions: only_in(&new_index, &old_index),
        removals: only_in(&old_index, &new_index),
    }
}

fn index_by_signature(children: &[Element]) -> IndexMap<Signature, &Element> {
    let mut index = IndexMap::with_capacity(children.len());
    for child in children {
        // Re-inserting an existing key keeps its slot and replaces the value.
        index.insert(signature(child), child);
    }
    index
}

fn only_in<'a>(
    side: &IndexMap<Signature, &'a Element>,
    other: &IndexMap<Signature, &'a Element>,
) -> Vec<&'a Element> {
    side.iter()
        .filter(|(sig, _)| !other.contains_key(*sig))
        .map(|(_, element)| *element)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str) -> Element {
        Element::new("item").with_attribute("id", id)
    }

    fn ids(elements: &[&Element]) -> Vec<String> {
        elements
            .iter()
            .map(|e| e.attributes.get("id").cloned().unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_addition_and_removal() {
        let old = vec![item("1"), item("2")];
        let new = vec![item("2"), item("3")];

        let result = diff(&old, &new);
        assert_eq!(ids(&result.additions), vec!["3"]);
        assert_eq!(ids(&result.removals), vec!["1"]);
    }

    #[test]
    fn test_identical_children_produce_nothing() {
        let children = vec![item("1"), item("2"), Element::new("note").with_text("x")];
        assert!(diff(&children, &children).is_empty());
    }

    #[test]
    fn test_reordering_produces_nothing() {
        let old = vec![item("1"), item("2"), item("3")];
        let new = vec![item("3"), item("1"), item("2")];
        assert!(diff(&old, &new).is_empty());
    }

    #[test]
    fn test_symmetry() {
        let a = vec![item("1"), item("2"), item("4")];
        let b = vec![item("2"), item("3"), item("5")];

        let forward = diff(&a, &b);
        let backward = diff(&b, &a);
        assert_eq!(forward.additions, backward.removals);
        assert_eq!(forward.removals, backward.additions);
    }

    #[test]
    fn test_changed_text_is_removal_plus_addition() {
        let old = vec![Element::new("a").with_text("hi")];
        let new = vec![Element::new("a").with_text("bye")];

        let result = diff(&old, &new);
        assert_eq!(result.additions.len(), 1);
        assert_eq!(result.removals.len(), 1);
        assert_eq!(result.additions[0].trimmed_text(), "bye");
        assert_eq!(result.removals[0].trimmed_text(), "hi");
    }

    #[test]
    fn test_output_follows_first_occurrence_order() {
        let old: Vec<Element> = Vec::new();
        let new = vec![item("c"), item("a"), item("b")];

        let result = diff(&old, &new);
        assert_eq!(ids(&result.additions), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_duplicate_signatures_collapse_to_last_element() {
        // Same signature, different subtrees: the last sibling represents both.
        let first = item("1").with_child(Element::new("first"));
        let last = item("1").with_child(Element::new("last"));
        let new = vec![first, item("2"), last];

        let result = diff(&[], &new);
        assert_eq!(ids(&result.additions), vec!["1", "2"]);
        assert_eq!(result.additions[0].children[0].tag, "last");
    }

    #[test]
    fn test_duplicates_do_not_count_as_changes() {
        let old = vec![item("1")];
        let new = vec![item("1"), item("1")];
        assert!(diff(&old, &new).is_empty());
    }

    #[test]
    fn test_subtree_changes_are_not_detected() {
        let old = vec![item("1").with_child(Element::new("x"))];
        let new = vec![item("1").with_child(Element::new("y"))];
        assert!(diff(&old, &new).is_empty());
    }
}
