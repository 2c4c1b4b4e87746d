use o11n_prompt::render_tree;
use proptest::prelude::*;
use std::collections::BTreeSet;

proptest! {
    #[test]
    fn prop_every_file_is_drawn_once(
        files in prop::collection::btree_set("[a-c]{1,2}/[a-c]{1,2}/[a-z]{1,4}\\.rs", 1..12),
    ) {
        let paths: Vec<String> = files.iter().map(|f| format!("/root/{f}")).collect();
        let out = render_tree(&paths);
        let lines: Vec<&str> = out.lines().collect();

        // one line per distinct directory and file below the root
        let mut nodes = BTreeSet::new();
        for path in &paths {
            let rel = path.trim_start_matches(lines[0]).trim_start_matches('/');
            let parts: Vec<&str> = rel.split('/').collect();
            for depth in 1..=parts.len() {
                nodes.insert(parts[..depth].join("/"));
            }
        }
        prop_assert_eq!(lines.len(), nodes.len() + 1);

        for line in &lines[1..] {
            prop_assert!(line.contains("├── ") || line.contains("└── "));
        }
    }
}
