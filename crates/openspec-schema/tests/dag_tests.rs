use openspec_schema::{parse_schema, ArtifactGraph, SchemaValidationError};
use proptest::prelude::*;

fn schema_from_edges(count: usize, edges: &[(usize, usize)]) -> String {
    let mut out = String::from("name: p\nversion: 1\ndescription: p\nartifacts:\n");
    for i in 0..count {
        let requires: Vec<String> = edges
            .iter()
            .filter(|(from, _)| *from == i)
            .map(|(_, to)| format!("n{to}"))
            .collect();
        out.push_str(&format!(
            "  - {{ id: n{i}, generates: n{i}.md, template: n{i}.md, description: n, requires: [{}] }}\n",
            requires.join(", ")
        ));
    }
    out
}

proptest! {
    #[test]
    fn prop_backward_edges_are_acyclic(
        count in 1..15usize,
        raw_edges in proptest::collection::vec((0..15usize, 0..15usize), 0..40)
    ) {
        // Only point at earlier artifacts: always a DAG
        let edges: Vec<(usize, usize)> = raw_edges
            .into_iter()
            .filter(|(a, b)| *a < count && *b < *a)
            .collect();

        let schema = parse_schema(&schema_from_edges(count, &edges)).unwrap();
        let graph = ArtifactGraph::from_schema(&schema);
        let order = graph.build_order();
        prop_assert_eq!(order.len(), count);

        for (from, to) in &edges {
            let pos = |id: &str| order.iter().position(|o| *o == id).unwrap();
            let (to_pos, from_pos) = (pos(&format!("n{to}")), pos(&format!("n{from}")));
            prop_assert!(to_pos < from_pos);
        }
    }

    #[test]
    fn prop_closing_a_chain_is_rejected(len in 2..12usize) {
        // n0 <- n1 <- ... <- n(len-1), then n0 requires the last one
        let mut edges: Vec<(usize, usize)> = (1..len).map(|i| (i, i - 1)).collect();
        edges.push((0, len - 1));

        let result = parse_schema(&schema_from_edges(len, &edges));
        let is_cycle = matches!(
            result,
            Err(SchemaValidationError::CyclicRequires { ref cycle }) if cycle.len() == len + 1
        );
        prop_assert!(is_cycle);
    }
}

#[test]
fn cycle_error_names_both_ids() {
    let err = parse_schema(&schema_from_edges(2, &[(0, 1), (1, 0)])).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("n0"));
    assert!(message.contains("n1"));
}
