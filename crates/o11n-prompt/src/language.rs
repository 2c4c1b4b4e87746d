//! Fence language tags and image detection by file extension

/// Tag used when an extension has no mapping
pub const DEFAULT_LANGUAGE: &str = "plaintext";

const LANGUAGES: &[(&str, &str)] = &[
    ("js", "js"),
    ("jsx", "jsx"),
    ("ts", "ts"),
    ("tsx", "tsx"),
    ("json", "json"),
    ("html", "html"),
    ("css", "css"),
    ("md", "markdown"),
    ("sh", "sh"),
    ("py", "python"),
    ("java", "java"),
    ("cpp", "cpp"),
    ("c", "c"),
    ("cs", "csharp"),
    ("php", "php"),
    ("rb", "ruby"),
    ("go", "go"),
    ("rs", "rust"),
    ("swift", "swift"),
    ("kt", "kotlin"),
    ("lua", "lua"),
    ("sql", "sql"),
    ("toml", "toml"),
    ("ini", "ini"),
    ("yml", "yaml"),
    ("yaml", "yaml"),
    ("dockerfile", "dockerfile"),
    ("graphql", "graphql"),
    ("xml", "xml"),
    ("png", "image"),
    ("jpg", "image"),
    ("jpeg", "image"),
    ("svg", "image"),
];

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp"];

/// Lowercased text after the last `.` of the file name, or the whole name
fn extension(path: &str) -> String {
    let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    name.rsplit('.').next().unwrap_or(name).to_lowercase()
}

/// Markdown fence tag for `path`, [`DEFAULT_LANGUAGE`] when unknown
///
/// A name without a dot is looked up whole, so `Dockerfile` maps to
/// `dockerfile`.
#[must_use]
pub fn language_for_path(path: &str) -> &'static str {
    let ext = extension(path);
    LANGUAGES
        .iter()
        .find(|(key, _)| *key == ext.as_str())
        .map_or(DEFAULT_LANGUAGE, |&(_, language)| language)
}

/// Whether `path` names an image, whose bytes are never embedded
#[must_use]
pub fn is_image(path: &str) -> bool {
    let ext = extension(path);
    IMAGE_EXTENSIONS.contains(&ext.as_str())
}
