use o11n_plan::{created_files, filter, is_committable, Action, PlanDocument, SelectionMap};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

/// Plan text with `shape[i]` changes in file `i`; descriptions are `f{i}c{j}-{tag}`
fn render_plan(description: &str, shape: &[usize], tag: &str) -> String {
    let mut text = format!("# Plan\n{description}\n## Files\n");
    for (i, &changes) in shape.iter().enumerate() {
        text.push_str(&format!("### File src/f{i}.rs\n### Action modify\nnotes for {i}\n"));
        for j in 0..changes {
            text.push_str(&format!(
                "#### Change\n**Description**: f{i}c{j}-{tag}\n**Search**:\n```rust\nold {j}\n```\n**Content**:\n```rust\nnew {j}\n```\n"
            ));
        }
    }
    text
}

fn plan_strategy() -> impl Strategy<Value = (String, Vec<usize>)> {
    (
        "[a-z ]{0,20}",
        prop::collection::vec(0usize..5, 0..6),
        "[a-z]{1,6}",
    )
        .prop_map(|(description, shape, tag)| {
            let text = render_plan(description.trim(), &shape, &tag);
            (text, shape)
        })
}

proptest! {
    #[test]
    fn prop_fresh_selection_matches_change_counts((text, shape) in plan_strategy()) {
        let doc = PlanDocument::parse(&text);
        let map = SelectionMap::init(&doc);

        prop_assert_eq!(doc.files.len(), shape.len());
        for (file, &expected) in doc.files.iter().zip(&shape) {
            let flags = map.flags(&file.file_path).unwrap();
            prop_assert_eq!(flags.len(), expected);
            prop_assert!(flags.iter().all(|&flag| flag));
        }
    }

    #[test]
    fn prop_filter_with_everything_selected_is_identity((text, _) in plan_strategy()) {
        let doc = PlanDocument::parse(&text);
        let payload = filter(&doc, &SelectionMap::init(&doc)).unwrap();
        let reparsed = PlanDocument::parse(&payload);

        prop_assert_eq!(&reparsed.description, &doc.description);
        prop_assert_eq!(&reparsed.files, &doc.files);
    }

    #[test]
    fn prop_filter_preserves_order_of_kept_changes(
        (text, shape) in plan_strategy(),
        mask in prop::collection::vec(any::<bool>(), 30),
    ) {
        let doc = PlanDocument::parse(&text);
        let mut map = SelectionMap::init(&doc);

        let mut bit = 0;
        for (i, &changes) in shape.iter().enumerate() {
            for j in 0..changes {
                if !mask[bit % mask.len()] {
                    map.toggle(&format!("src/f{i}.rs"), j);
                }
                bit += 1;
            }
        }

        let payload = filter(&doc, &map).unwrap();
        let reparsed = PlanDocument::parse(&payload);

        // every file survives, even with all changes rejected
        prop_assert_eq!(reparsed.files.len(), doc.files.len());
        for (original, kept) in doc.files.iter().zip(&reparsed.files) {
            prop_assert_eq!(&original.file_path, &kept.file_path);
            let expected: Vec<_> = original
                .changes
                .iter()
                .enumerate()
                .filter(|(j, _)| map.is_selected(&original.file_path, *j))
                .map(|(_, change)| change.clone())
                .collect();
            prop_assert_eq!(&kept.changes, &expected);
        }
    }

    #[test]
    fn prop_toggle_all_twice_from_mixed_clears(
        (text, shape) in plan_strategy(),
        first_off in any::<bool>(),
    ) {
        let doc = PlanDocument::parse(&text);
        let mut map = SelectionMap::init(&doc);
        for (i, &changes) in shape.iter().enumerate() {
            let path = format!("src/f{i}.rs");
            if first_off && changes > 0 {
                map.toggle(&path, 0);
            }
            map.toggle_all(&path);
            prop_assert!(map.all_selected(&path));
            map.toggle_all(&path);
            prop_assert_eq!(map.flags(&path).unwrap().iter().filter(|&&f| f).count(), 0);
        }
    }

    #[test]
    fn prop_parse_never_panics(text in "\\PC{0,400}") {
        let doc = PlanDocument::parse(&text);
        let map = SelectionMap::init(&doc);
        for file in &doc.files {
            prop_assert_eq!(map.flags(&file.file_path).unwrap().len(), file.changes.len());
        }
    }
}

#[test]
fn two_files_two_changes_rejecting_one_each() {
    let text = render_plan("Refactor.", &[2, 2], "x");
    let doc = PlanDocument::parse(&text);
    let mut map = SelectionMap::init(&doc);
    map.toggle("src/f0.rs", 1);
    map.toggle("src/f1.rs", 0);

    let reparsed = PlanDocument::parse(&filter(&doc, &map).unwrap());
    assert_eq!(reparsed.files[0].changes[0].description(), Some("f0c0-x"));
    assert_eq!(reparsed.files[1].changes[0].description(), Some("f1c1-x"));
    assert_eq!(reparsed.change_count(), 2);
}

#[test]
fn create_file_scenario() {
    let text = "# Plan\nAdd readme.\n## Files\n### File docs/README.md\n### Action create\n\
                **Content**:\n```markdown\n# Title\n\nBody text.\n```\n";
    assert!(is_committable(text));

    let doc = PlanDocument::parse(text);
    assert_eq!(doc.files[0].action, Some(Action::Create));

    let created = created_files(&doc);
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].path, "docs/README.md");
    assert_eq!(created[0].content, "# Title\n\nBody text.\n");
    assert_eq!(created[0].file_name(), "README.md");
}

#[test]
fn empty_plan_has_nothing_to_commit() {
    let doc = PlanDocument::parse("");
    assert!(doc.is_empty());
    assert!(SelectionMap::init(&doc).is_empty());
    assert!(!is_committable(""));
    assert!(created_files(&doc).is_empty());
}

#[test]
fn summary_lists_descriptions_per_file() {
    let doc = PlanDocument::parse(&render_plan("Two.", &[1, 0], "s"));
    let summary = doc.summary();
    assert_eq!(summary.description, "Two.");
    assert_eq!(summary.files[0].descriptions, vec!["f0c0-s".to_string()]);
    assert_eq!(summary.files[1].change_count, 0);
    assert_eq!(summary.files[1].action, Some(Action::Modify));
}
