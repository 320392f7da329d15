//! Tag lookup with ancestor path tracking

use crate::document::Element;

/// An element found by [`locate`] together with the tags of its ancestors
#[derive(Debug, Clone, PartialEq)]
pub struct Located<'a> {
    pub element: &'a Element,
    /// Ancestor tags from the document root down to the element's parent
    pub path: Vec<String>,
}

/// Find the first element named `target_tag` in document order
///
/// The search is a pre-order depth-first walk that includes `root` itself.
/// It uses an explicit stack, so document depth is not limited by the call
/// stack.
pub fn locate<'a>(root: &'a Element, target_tag: &str) -> Option<Located<'a>> {
    let mut stack: Vec<(&'a Element, usize)> = vec![(root, 0)];
    let mut ancestors: Vec<&'a str> = Vec::new();

    while let Some((element, depth)) = stack.pop() {
        ancestors.truncate(depth);

        if element.tag == target_tag {
            return Some(Located {
                element,
                path: ancestors.iter().map(|tag| tag.to_string()).collect(),
            });
        }

        ancestors.push(&element.tag);
        for child in element.children.iter().rev() {
            stack.push((child, depth + 1));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse_document;

    #[test]
    fn test_root_matches_with_empty_path() {
        let root = parse_document("<root><a/></root>").unwrap();
        let found = locate(&root, "root").unwrap();
        assert!(std::ptr::eq(found.element, &root));
        assert!(found.path.is_empty());
    }

    #[test]
    fn test_nested_match_records_ancestors() {
        let root = parse_document("<root><section><foo/></section></root>").unwrap();
        let found = locate(&root, "foo").unwrap();
        assert_eq!(found.path, vec!["root", "section"]);
    }

    #[test]
    fn test_first_match_in_document_order_wins() {
        let root = parse_document(
            r#"<root>
                <group><deep><item id="deep"/></deep></group>
                <item id="shallow"/>
            </root>"#,
        )
        .unwrap();

        let found = locate(&root, "item").unwrap();
        assert_eq!(found.element.attributes["id"], "deep");
        assert_eq!(found.path, vec!["root", "group", "deep"]);
    }

    #[test]
    fn test_path_follows_the_matching_branch_only() {
        let root = parse_document(
            "<root><left><x/><y/></left><right><target/></right></root>",
        )
        .unwrap();

        let found = locate(&root, "target").unwrap();
        assert_eq!(found.path, vec!["root", "right"]);
    }

    #[test]
    fn test_absent_tag() {
        let root = parse_document("<root><a/></root>").unwrap();
        assert!(locate(&root, "missing").is_none());
    }

    #[test]
    fn test_deep_document_does_not_overflow() {
        let mut element = Element::new("target");
        for _ in 0..100_000 {
            element = Element::new("level").with_child(element);
        }

        let found = locate(&element, "target").unwrap();
        assert_eq!(found.path.len(), 100_000);

        // Dropping a 100k-deep tree recursively would itself overflow the
        // test thread's stack, so unwind it iteratively.
        let mut next = Some(element);
        while let Some(mut current) = next {
            next = current.children.pop();
        }
    }
}
