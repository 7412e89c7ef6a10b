//! Property-based tests for depth reconstruction and caller attribution
//!
//! Random call trees are flattened to the depth-first (children count only)
//! form a capture stores, then the reconstructed depths and callers are
//! checked against the tree they came from.

use marker_callers::config::AnalysisConfig;
use marker_callers::depth::{reconstruct_depths, DepthReconstructor};
use marker_callers::hierarchy::CallHierarchy;
use marker_callers::interner::NameInterner;
use marker_callers::model::Marker;
use marker_callers::source::{CaptureFile, CapturedFrame, CapturedThread};
use proptest::prelude::*;

#[derive(Debug, Clone)]
struct Node(Vec<Node>);

fn tree() -> impl Strategy<Value = Node> {
    Just(Node(Vec::new())).prop_recursive(8, 128, 4, |inner| {
        prop::collection::vec(inner, 0..4).prop_map(Node)
    })
}

/// Flattened node: (children, depth, parent index)
fn flatten(node: &Node, depth: u32, parent: Option<usize>, out: &mut Vec<(u32, u32, Option<usize>)>) {
    let index = out.len();
    out.push((node.0.len() as u32, depth, parent));
    for child in &node.0 {
        flatten(child, depth + 1, Some(index), out);
    }
}

fn flatten_forest(forest: &[Node]) -> Vec<(u32, u32, Option<usize>)> {
    let mut out = Vec::new();
    for root in forest {
        flatten(root, 1, None, &mut out);
    }
    out
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_depths_match_tree(forest in prop::collection::vec(tree(), 1..5)) {
        let flat = flatten_forest(&forest);
        let children: Vec<u32> = flat.iter().map(|n| n.0).collect();
        let expected: Vec<u32> = flat.iter().map(|n| n.1).collect();

        prop_assert_eq!(reconstruct_depths(children.iter().copied()), expected);

        let mut depths = DepthReconstructor::new();
        for c in children {
            depths.advance(c);
        }
        prop_assert!(depths.is_balanced());
    }

    #[test]
    fn prop_caller_is_tree_parent(forest in prop::collection::vec(tree(), 1..5)) {
        let flat = flatten_forest(&forest);
        let mut names = NameInterner::new();
        let markers: Vec<Marker> = flat
            .iter()
            .enumerate()
            .map(|(i, n)| Marker {
                name: names.intern(&format!("n{}", i)),
                duration_ms: 1.0,
                depth: n.1,
            })
            .collect();

        let mut hierarchy = CallHierarchy::new();
        for (marker, node) in markers.iter().zip(&flat) {
            hierarchy.visit(marker);
            let caller = hierarchy.caller_of(marker.depth).map(|m| m.name);
            let parent = node.2.map(|p| markers[p].name);
            prop_assert_eq!(caller, parent);
        }
    }

    #[test]
    fn prop_analysis_is_idempotent(
        forest in prop::collection::vec(tree(), 1..4),
        labels in prop::collection::vec(0usize..3, 256),
    ) {
        let flat = flatten_forest(&forest);
        let mut thread = CapturedThread::new(1, "Main Thread", "");
        for (i, node) in flat.iter().enumerate() {
            let name = ["GC.Alloc", "Update", "Render"][labels[i % labels.len()]];
            thread = thread.sample(name, 1.0, node.0);
        }
        let capture = CaptureFile::from_frames(vec![CapturedFrame::new(0, 0.0, 16.0).with_thread(thread)]).unwrap();
        let config = AnalysisConfig::default();

        let first = marker_callers::analyze(&capture, &config);
        let second = marker_callers::analyze(&capture, &config);
        match (first, second) {
            (Ok(a), Ok(b)) => {
                prop_assert_eq!(&a.counts, &b.counts);
                prop_assert!(a.counts.total() <= flat.len() as u64);
                prop_assert_eq!(a.report().to_csv(), b.report().to_csv());
            }
            (Err(a), Err(b)) => prop_assert_eq!(a.to_string(), b.to_string()),
            _ => prop_assert!(false, "runs disagree"),
        }
    }
}
