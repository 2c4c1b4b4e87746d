//! File map rendering
//!
//! Paths are split on `/`, the longest common segment prefix becomes the
//! root line, and the remaining segments are drawn as a box-drawing tree:
//!
//! ```text
//! /a
//! ├── b
//! │   ├── x.ts
//! │   └── y.ts
//! └── c
//!     └── z.ts
//! ```

use std::cmp::Ordering;
use std::collections::BTreeMap;

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE: &str = "│   ";
const SPACE: &str = "    ";

#[derive(Debug)]
enum Node {
    File,
    Dir(Tree),
}

#[derive(Debug, Default)]
struct Tree {
    children: BTreeMap<String, Node>,
}

impl Tree {
    fn insert(&mut self, parts: &[&str]) {
        let Some((first, rest)) = parts.split_first() else {
            return;
        };
        if rest.is_empty() {
            self.children.entry((*first).to_string()).or_insert(Node::File);
            return;
        }

        let entry = self
            .children
            .entry((*first).to_string())
            .or_insert_with(|| Node::Dir(Tree::default()));
        // a file that turns out to be a directory prefix becomes a directory
        if matches!(entry, Node::File) {
            *entry = Node::Dir(Tree::default());
        }
        if let Node::Dir(sub) = entry {
            sub.insert(rest);
        }
    }

    fn sorted(&self) -> Vec<(&String, &Node)> {
        let mut entries: Vec<_> = self.children.iter().collect();
        entries.sort_by(|(a_name, a), (b_name, b)| {
            match (matches!(a, Node::Dir(_)), matches!(b, Node::Dir(_))) {
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                _ => a_name
                    .to_lowercase()
                    .cmp(&b_name.to_lowercase())
                    .then_with(|| a_name.cmp(b_name)),
            }
        });
        entries
    }

    fn render(&self, prefix: &str, lines: &mut Vec<String>) {
        let entries = self.sorted();
        let last = entries.len().saturating_sub(1);
        for (index, (name, node)) in entries.into_iter().enumerate() {
            let is_last = index == last;
            let connector = if is_last { LAST_BRANCH } else { BRANCH };
            lines.push(format!("{prefix}{connector}{name}"));
            if let Node::Dir(sub) = node {
                let indent = if is_last { SPACE } else { PIPE };
                sub.render(&format!("{prefix}{indent}"), lines);
            }
        }
    }
}

/// Longest common segment prefix, leaving every path at least its last segment
fn common_prefix<'a>(split: &[Vec<&'a str>]) -> Vec<&'a str> {
    let Some(first) = split.first() else {
        return Vec::new();
    };
    let mut len = split
        .iter()
        .map(|parts| parts.len().saturating_sub(1))
        .min()
        .unwrap_or(0);
    for parts in &split[1..] {
        len = len.min(
            first
                .iter()
                .zip(parts)
                .take_while(|(a, b)| a == b)
                .count(),
        );
    }
    first[..len].to_vec()
}

/// Render `paths` as a file map
///
/// The first line is the common root, `/` when the paths share nothing.
/// Directories sort before files, then names compare case-insensitively.
/// An empty input renders as an empty string.
#[must_use]
pub fn render_tree<S: AsRef<str>>(paths: &[S]) -> String {
    if paths.is_empty() {
        return String::new();
    }

    let split: Vec<Vec<&str>> = paths
        .iter()
        .map(|path| path.as_ref().split('/').collect())
        .collect();
    let prefix = common_prefix(&split);
    let base = match prefix.join("/") {
        joined if joined.is_empty() => "/".to_string(),
        joined => joined,
    };

    let mut tree = Tree::default();
    for parts in &split {
        let rest: Vec<&str> = parts[prefix.len()..]
            .iter()
            .copied()
            .filter(|segment| !segment.is_empty())
            .collect();
        tree.insert(&rest);
    }

    let mut lines = vec![base];
    tree.render("", &mut lines);
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn groups_directories_under_common_root() {
        let out = render_tree(&["/a/b/x.ts", "/a/b/y.ts", "/a/c/z.ts"]);
        assert_eq!(
            out,
            "/a\n├── b\n│   ├── x.ts\n│   └── y.ts\n└── c\n    └── z.ts"
        );
    }

    #[test]
    fn empty_input_is_empty_string() {
        assert_eq!(render_tree::<&str>(&[]), "");
    }

    #[test]
    fn single_file_keeps_its_name() {
        assert_eq!(render_tree(&["/home/me/notes.md"]), "/home/me\n└── notes.md");
    }

    #[test]
    fn unrelated_relative_paths_use_slash_root() {
        assert_eq!(render_tree(&["src/a.rs", "docs/b.md"]), "/\n├── docs\n│   └── b.md\n└── src\n    └── a.rs");
    }

    #[test]
    fn directories_sort_before_files() {
        let out = render_tree(&["/p/zeta/one.rs", "/p/Alpha.rs", "/p/beta.rs"]);
        assert_eq!(out, "/p\n├── zeta\n│   └── one.rs\n├── Alpha.rs\n└── beta.rs");
    }

    #[test]
    fn file_that_is_also_a_prefix_becomes_directory() {
        let out = render_tree(&["/r/src", "/r/src/main.rs", "/r/lib.rs"]);
        assert_eq!(out, "/r\n├── src\n│   └── main.rs\n└── lib.rs");
    }

    #[test]
    fn project_roots_render_as_leaves() {
        let out = render_tree(&["/work/api", "/work/web"]);
        assert_eq!(out, "/work\n├── api\n└── web");
    }

    #[test]
    fn case_ties_fall_back_to_byte_order() {
        let out = render_tree(&["/d/b.txt", "/d/B.txt"]);
        assert_eq!(out, "/d\n├── B.txt\n└── b.txt");
    }
}
