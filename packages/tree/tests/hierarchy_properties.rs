//! The element tree and a flat parent list describing the same shape must
//! agree on every descendant question.

use proptest::prelude::*;
use trellis_tree::{
    descendants, would_create_cycle, ElementNode, ElementTree, FlatHierarchy, ROOT_ID,
};

fn id_of(index: usize) -> String {
    if index == 0 {
        ROOT_ID.to_string()
    } else {
        format!("n{}", index)
    }
}

/// `parents[i]` is the parent index of node `i + 1` (0 = root)
fn shape() -> impl Strategy<Value = Vec<usize>> {
    (0usize..12).prop_flat_map(|len| (0..len).map(|i| (0..=i).boxed()).collect::<Vec<_>>())
}

fn build(parents: &[usize]) -> (ElementTree, FlatHierarchy<String>) {
    fn attach(node: &mut ElementNode, parents: &[usize], index: usize) {
        for (child, parent) in parents.iter().enumerate() {
            if *parent == index {
                let mut child_node = ElementNode::new(id_of(child + 1), "div");
                attach(&mut child_node, parents, child + 1);
                node.children.push(child_node);
            }
        }
    }

    let mut root = ElementNode::root();
    attach(&mut root, parents, 0);
    let tree = ElementTree::from_root(root).unwrap();

    let mut links = vec![(ROOT_ID.to_string(), None)];
    links.extend(
        parents
            .iter()
            .enumerate()
            .map(|(child, parent)| (id_of(child + 1), Some(id_of(*parent)))),
    );
    (tree, FlatHierarchy::new(links))
}

proptest! {
    #[test]
    fn tree_and_flat_list_agree(parents in shape()) {
        let (tree, flat) = build(&parents);

        for id in tree.all_ids() {
            prop_assert_eq!(descendants(&tree, &id), descendants(&flat, &id));
            prop_assert_eq!(tree.parent_id(&id).map(str::to_string), flat.parent_of(&id).cloned());
        }
    }

    #[test]
    fn ancestor_path_ends_at_node(parents in shape()) {
        let (tree, _) = build(&parents);

        for id in tree.all_ids() {
            let path = tree.ancestor_path(&id);
            prop_assert_eq!(&path[0].id, ROOT_ID);
            prop_assert_eq!(&path[path.len() - 1].id, &id);
            for pair in path.windows(2) {
                prop_assert_eq!(tree.parent_id(&pair[1].id), Some(pair[0].id.as_str()));
            }
        }
    }

    #[test]
    fn cycle_check_matches_ancestry(parents in shape(), a in 0usize..12, b in 0usize..12) {
        let (tree, _) = build(&parents);
        let count = tree.count_nodes();
        let node = id_of(a % count);
        let new_parent = id_of(b % count);

        let on_path = tree.ancestor_path(&new_parent).iter().any(|n| n.id == node);
        prop_assert_eq!(would_create_cycle(&tree, &node, &new_parent), on_path);
    }

    #[test]
    fn fresh_ids_never_collide(parents in shape(), draws in 1usize..20) {
        let (mut tree, _) = build(&parents);
        let existing = tree.all_ids();

        let mut seen = std::collections::HashSet::new();
        for _ in 0..draws {
            let id = tree.fresh_id();
            prop_assert!(!existing.contains(&id));
            prop_assert!(seen.insert(id));
        }
    }
}
