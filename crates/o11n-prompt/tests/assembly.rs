use o11n_prompt::{assemble, PromptAssembler, PromptRequest};
use pretty_assertions::assert_eq;
use std::path::Path;
use std::time::Duration;

fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[tokio::test]
async fn sections_follow_fixed_order() {
    let dir = tempfile::tempdir().unwrap();
    let code = dir.path().join("src").join("main.rs");
    let logo = dir.path().join("logo.png");
    let template = dir.path().join("review.md");
    std::fs::create_dir_all(code.parent().unwrap()).unwrap();
    std::fs::write(&code, "fn main() {}\n").unwrap();
    std::fs::write(&logo, [0x89, 0x50]).unwrap();
    std::fs::write(&template, "Be concise.").unwrap();

    let request = PromptRequest::new("Add logging")
        .with_file(path_str(&code))
        .with_file(path_str(&logo))
        .with_template("review", path_str(&template));
    let prompt = assemble(&request).await;

    let order = [
        "<file_map>",
        "<file_contents>",
        "<template name=\"review\">",
        "<formatting_instructions>",
        "<user_instructions>",
    ];
    let positions: Vec<usize> = order.iter().map(|tag| prompt.find(tag).unwrap()).collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));

    let expected_block = format!("File: {}\n```rust\nfn main() {{}}\n```\n", path_str(&code));
    assert!(prompt.contains(&expected_block));
    assert!(prompt.contains("Be concise.\n</template>"));
    // images show in the map but are never embedded
    assert!(prompt.contains("logo.png"));
    assert!(!prompt.contains(&format!("File: {}", path_str(&logo))));
    assert!(prompt.ends_with("<user_instructions>\nAdd logging\n</user_instructions>"));
}

#[tokio::test]
async fn missing_template_degrades() {
    let request = PromptRequest::new("go")
        .with_template("gone", "/no/such/template.md")
        .with_file_tree(false)
        .with_formatting_instructions(false);
    let prompt = assemble(&request).await;
    assert!(prompt.starts_with("<template name=\"gone\">\n/* Error reading file: "));
}

#[tokio::test]
async fn identical_request_within_ttl_is_reused() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("a.txt");
    std::fs::write(&file, "first").unwrap();

    let assembler = PromptAssembler::with_ttl(8, Duration::from_secs(60));
    let request = PromptRequest::new("x").with_file(path_str(&file));

    let first = assembler.build(&request).await.unwrap();
    std::fs::write(&file, "second").unwrap();
    let again = assembler.build(&request).await.unwrap();
    assert_eq!(first, again);
    assert!(again.contains("first"));

    let changed = request.clone().with_formatting_instructions(false);
    let rebuilt = assembler.build(&changed).await.unwrap();
    assert!(rebuilt.contains("second"));
}

#[tokio::test]
async fn expired_entry_is_rebuilt() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("a.txt");
    std::fs::write(&file, "first").unwrap();

    let assembler = PromptAssembler::with_ttl(8, Duration::from_millis(50));
    let request = PromptRequest::new("x").with_file(path_str(&file));

    assembler.build(&request).await.unwrap();
    std::fs::write(&file, "second").unwrap();
    tokio::time::sleep(Duration::from_millis(150)).await;

    let rebuilt = assembler.build(&request).await.unwrap();
    assert!(rebuilt.contains("second"));
}
