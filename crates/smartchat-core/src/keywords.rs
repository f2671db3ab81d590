//! Keyword gates shared by the streaming and blocking chat paths.
//!
//! All matching is lowercase containment: a keyword matches when it appears
//! anywhere in the lowercased message.

/// Words that make a chat turn fetch repository context.
pub const CONTEXT_TRIGGERS: &[&str] = &[
    "main.py",
    "config.py",
    "requirements.txt",
    "readme",
    "test_setup.py",
    "index.html",
    "línea",
    "linea",
    "line",
    "archivo",
    "file",
    "código",
    "codigo",
    "analiza",
    "analizar",
    "analyze",
    "explica",
    "explicar",
    "explain",
    "error",
    "bug",
];

/// File paths that are fetched when literally mentioned in a message.
pub const KNOWN_FILES: &[&str] = &[
    "main.py",
    "config.py",
    "requirements.txt",
    "README.md",
    "test_setup.py",
    "index.html",
];

/// Fetched when a message triggers context but names no known file.
pub const DEFAULT_ENTRY_PATH: &str = "main.py";

pub fn contains_any(message: &str, keywords: &[&str]) -> bool {
    let lowered = message.to_lowercase();
    keywords.iter().any(|keyword| lowered.contains(keyword))
}

/// Whether `message` should be enriched with repository context.
pub fn wants_repository_context(message: &str) -> bool {
    contains_any(message, CONTEXT_TRIGGERS)
}

/// Known files mentioned in `message`, or the default entry path if none.
pub fn target_paths(message: &str) -> Vec<&'static str> {
    let lowered = message.to_lowercase();
    let mentioned: Vec<&'static str> = KNOWN_FILES
        .iter()
        .copied()
        .filter(|path| lowered.contains(&path.to_lowercase()))
        .collect();

    if mentioned.is_empty() {
        vec![DEFAULT_ENTRY_PATH]
    } else {
        mentioned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_does_not_trigger_context() {
        assert!(!wants_repository_context("hola"));
        assert!(!wants_repository_context("¿qué tal estás?"));
    }

    #[test]
    fn trigger_matching_is_case_insensitive() {
        assert!(wants_repository_context("EXPLICA esto"));
        assert!(wants_repository_context("Analyze the parser"));
        assert!(wants_repository_context("tengo un Error raro"));
    }

    #[test]
    fn target_paths_lists_mentioned_files_in_known_order() {
        let paths = target_paths("compara config.py con main.py");
        assert_eq!(paths, vec!["main.py", "config.py"]);
    }

    #[test]
    fn target_paths_matches_readme_regardless_of_case() {
        assert_eq!(target_paths("explica el readme.md"), vec!["README.md"]);
    }

    #[test]
    fn target_paths_defaults_to_entry_path() {
        assert_eq!(target_paths("explica el error"), vec![DEFAULT_ENTRY_PATH]);
    }

    #[test]
    fn contains_any_with_empty_list_is_false() {
        assert!(!contains_any("anything", &[]));
    }
}
