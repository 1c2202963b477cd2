use std::path::Path;

/// Label used for any extension missing from the table
pub const UNKNOWN_LANGUAGE: &str = "text";

const LANGUAGES: &[(&str, &str)] = &[
    ("py", "python"),
    ("js", "javascript"),
    ("ts", "typescript"),
    ("java", "java"),
    ("cpp", "cpp"),
    ("c", "c"),
    ("cs", "csharp"),
    ("go", "go"),
    ("rs", "rust"),
    ("rb", "ruby"),
    ("php", "php"),
    ("kt", "kotlin"),
    ("swift", "swift"),
    ("html", "html"),
    ("css", "css"),
    ("json", "json"),
    ("md", "markdown"),
];

/// Maps a file name to the language label sent to backends
///
/// The lookup is on the last extension, case-insensitive.
pub fn language_from_filename(name: &str) -> &'static str {
    let ext = match Path::new(name).extension().and_then(|e| e.to_str()) {
        Some(ext) => ext.to_ascii_lowercase(),
        None => return UNKNOWN_LANGUAGE,
    };

    LANGUAGES
        .iter()
        .find(|(candidate, _)| *candidate == ext)
        .map(|(_, language)| *language)
        .unwrap_or(UNKNOWN_LANGUAGE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_extensions() {
        assert_eq!(language_from_filename("a.py"), "python");
        assert_eq!(language_from_filename("main.rs"), "rust");
        assert_eq!(language_from_filename("Program.cs"), "csharp");
        assert_eq!(language_from_filename("index.d.ts"), "typescript");
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        assert_eq!(language_from_filename("APP.JS"), "javascript");
    }

    #[test]
    fn test_unknown_maps_to_text() {
        assert_eq!(language_from_filename("b.png"), "text");
        assert_eq!(language_from_filename("Makefile"), "text");
        assert_eq!(language_from_filename(".bashrc"), "text");
    }
}
