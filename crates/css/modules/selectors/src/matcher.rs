//! Right-to-left selector matching.
//!
//! Matching starts at the subject compound and walks towards the left-most
//! compound. Descendant and general sibling combinators can be satisfied by
//! more than one node, so the walk backtracks through every candidate.

use crate::{
    Combinator, ComplexSelector, CompoundSelector, ElementAdapter, SelectorList, SimpleSelector,
};

/// True if any selector of the list matches `element`.
pub fn matches_selector_list<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    list: &SelectorList,
) -> bool {
    list.selectors
        .iter()
        .any(|selector| matches_complex(adapter, element, selector))
}

pub fn matches_complex<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    sel: &ComplexSelector,
) -> bool {
    // compounds[0] is the left-most; combinators[i] sits between compounds[i] and compounds[i + 1].
    let mut compounds: Vec<&CompoundSelector> = Vec::with_capacity(sel.rest.len() + 1);
    let mut combinators: Vec<Combinator> = Vec::with_capacity(sel.rest.len());
    compounds.push(&sel.first);
    for (combinator, compound) in &sel.rest {
        combinators.push(*combinator);
        compounds.push(compound);
    }
    let last = compounds.len() - 1;
    compounds
        .get(last)
        .is_some_and(|subject| matches_compound(adapter, element, subject))
        && match_leftwards(adapter, element, &compounds, &combinators, last)
}

/// `element` already matched `compounds[index]`; try to satisfy everything to its left.
fn match_leftwards<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    compounds: &[&CompoundSelector],
    combinators: &[Combinator],
    index: usize,
) -> bool {
    let Some(left_index) = index.checked_sub(1) else {
        return true;
    };
    let (Some(combinator), Some(left)) = (combinators.get(left_index), compounds.get(left_index))
    else {
        return false;
    };
    let try_candidate = |candidate: A::Handle| {
        matches_compound(adapter, candidate, left)
            && match_leftwards(adapter, candidate, compounds, combinators, left_index)
    };
    match combinator {
        Combinator::Child => adapter.parent(element).is_some_and(try_candidate),
        Combinator::AdjacentSibling => adapter
            .previous_sibling_element(element)
            .is_some_and(try_candidate),
        Combinator::Descendant => {
            let mut cursor = adapter.parent(element);
            while let Some(candidate) = cursor {
                if try_candidate(candidate) {
                    return true;
                }
                cursor = adapter.parent(candidate);
            }
            false
        }
        Combinator::GeneralSibling => {
            let mut cursor = adapter.previous_sibling_element(element);
            while let Some(candidate) = cursor {
                if try_candidate(candidate) {
                    return true;
                }
                cursor = adapter.previous_sibling_element(candidate);
            }
            false
        }
    }
}

/// Match a compound selector against a single node.
pub fn matches_compound<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    compound: &CompoundSelector,
) -> bool {
    compound.simples.iter().all(|simple| match simple {
        SimpleSelector::Universal => true,
        SimpleSelector::Type(name) => adapter.type_name(element).eq_ignore_ascii_case(name),
        SimpleSelector::Class(class) => adapter.has_class(element, class),
        SimpleSelector::IdSelector(id) => adapter.element_id(element) == Some(id.as_str()),
        SimpleSelector::AttrExists(name) => adapter.attr(element, name).is_some(),
        SimpleSelector::AttrEquals { name, value } => {
            adapter.attr(element, name) == Some(value.as_str())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::try_parse_selector_list;

    struct Node {
        ty: &'static str,
        id: Option<&'static str>,
        classes: &'static [&'static str],
        parent: Option<usize>,
        prev: Option<usize>,
    }

    struct Tree(Vec<Node>);

    impl ElementAdapter for Tree {
        type Handle = usize;

        fn parent(&self, element: usize) -> Option<usize> {
            self.0[element].parent
        }
        fn previous_sibling_element(&self, element: usize) -> Option<usize> {
            self.0[element].prev
        }
        fn type_name(&self, element: usize) -> &str {
            self.0[element].ty
        }
        fn element_id(&self, element: usize) -> Option<&str> {
            self.0[element].id
        }
        fn has_class(&self, element: usize, class: &str) -> bool {
            self.0[element].classes.contains(&class)
        }
        fn attr(&self, element: usize, name: &str) -> Option<&str> {
            (name == "id").then_some(()).and(self.0[element].id)
        }
    }

    fn node(
        ty: &'static str,
        classes: &'static [&'static str],
        parent: Option<usize>,
        prev: Option<usize>,
    ) -> Node {
        Node { ty, id: None, classes, parent, prev }
    }

    /// page > stack.outer > stack.inner > (label#first, button, label)
    fn tree() -> Tree {
        let mut nodes = vec![
            node("page", &[], None, None),
            node("stack", &["outer"], Some(0), None),
            node("stack", &["inner"], Some(1), None),
            node("label", &[], Some(2), None),
            node("button", &["primary"], Some(2), Some(3)),
            node("label", &[], Some(2), Some(4)),
        ];
        nodes[3].id = Some("first");
        Tree(nodes)
    }

    fn matches(tree: &Tree, element: usize, text: &str) -> bool {
        matches_selector_list(tree, element, &try_parse_selector_list(text).unwrap())
    }

    #[test]
    fn compound_parts() {
        let tree = tree();
        assert!(matches(&tree, 4, "Button.primary"));
        assert!(!matches(&tree, 4, "button.secondary"));
        assert!(matches(&tree, 3, "#first"));
        assert!(matches(&tree, 3, "[id=first]"));
        assert!(matches(&tree, 3, "*"));
    }

    #[test]
    fn descendant_backtracks_past_first_candidate() {
        let tree = tree();
        // The nearest `stack` ancestor is .inner, which has no `page` parent; .outer does.
        assert!(matches(&tree, 3, "page > stack label"));
        assert!(!matches(&tree, 3, "page > stack > label"));
        assert!(matches(&tree, 3, "page stack > label"));
    }

    #[test]
    fn sibling_combinators() {
        let tree = tree();
        assert!(matches(&tree, 5, "button + label"));
        assert!(!matches(&tree, 5, "#first + label"));
        assert!(matches(&tree, 5, "#first ~ label"));
        assert!(!matches(&tree, 3, "button ~ label"));
    }
}
