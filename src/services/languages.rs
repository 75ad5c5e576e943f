// src/services/languages.rs
//! Language catalog used to normalize pasty language labels

use std::collections::HashMap;

/// Maps a user supplied language label onto a canonical language name
pub trait LanguageResolver: Send + Sync {
    /// `None` when the label is unknown
    fn resolve(&self, label: &str) -> Option<String>;
}

struct LanguageEntry {
    name: &'static str,
    aliases: &'static [&'static str],
    extensions: &'static [&'static str],
}

const LANGUAGES: &[LanguageEntry] = &[
    LanguageEntry {
        name: "Text",
        aliases: &["plain", "plaintext", "txt"],
        extensions: &["txt", "text"],
    },
    LanguageEntry {
        name: "Autodetect",
        aliases: &["auto"],
        extensions: &[],
    },
    LanguageEntry {
        name: "Bash",
        aliases: &["sh", "shell", "zsh"],
        extensions: &["sh", "bash", "zsh"],
    },
    LanguageEntry {
        name: "C",
        aliases: &[],
        extensions: &["c", "h"],
    },
    LanguageEntry {
        name: "C#",
        aliases: &["csharp", "cs"],
        extensions: &["cs", "csx"],
    },
    LanguageEntry {
        name: "C++",
        aliases: &["cpp", "cxx"],
        extensions: &["cpp", "cc", "cxx", "hpp", "hh"],
    },
    LanguageEntry {
        name: "CSS",
        aliases: &[],
        extensions: &["css"],
    },
    LanguageEntry {
        name: "D",
        aliases: &["dlang"],
        extensions: &["d", "di"],
    },
    LanguageEntry {
        name: "Dart",
        aliases: &[],
        extensions: &["dart"],
    },
    LanguageEntry {
        name: "Diff",
        aliases: &["patch"],
        extensions: &["diff", "patch"],
    },
    LanguageEntry {
        name: "Dockerfile",
        aliases: &["docker"],
        extensions: &["dockerfile"],
    },
    LanguageEntry {
        name: "Elixir",
        aliases: &[],
        extensions: &["ex", "exs"],
    },
    LanguageEntry {
        name: "Go",
        aliases: &["golang"],
        extensions: &["go"],
    },
    LanguageEntry {
        name: "Haskell",
        aliases: &[],
        extensions: &["hs"],
    },
    LanguageEntry {
        name: "HTML",
        aliases: &["xhtml"],
        extensions: &["html", "htm"],
    },
    LanguageEntry {
        name: "Java",
        aliases: &[],
        extensions: &["java"],
    },
    LanguageEntry {
        name: "JavaScript",
        aliases: &["js", "node"],
        extensions: &["js", "mjs", "cjs"],
    },
    LanguageEntry {
        name: "JSON",
        aliases: &[],
        extensions: &["json"],
    },
    LanguageEntry {
        name: "Kotlin",
        aliases: &[],
        extensions: &["kt", "kts"],
    },
    LanguageEntry {
        name: "Lua",
        aliases: &[],
        extensions: &["lua"],
    },
    LanguageEntry {
        name: "Makefile",
        aliases: &["make"],
        extensions: &["mk", "mak"],
    },
    LanguageEntry {
        name: "Markdown",
        aliases: &["md"],
        extensions: &["md", "markdown"],
    },
    LanguageEntry {
        name: "Nim",
        aliases: &[],
        extensions: &["nim"],
    },
    LanguageEntry {
        name: "PHP",
        aliases: &[],
        extensions: &["php"],
    },
    LanguageEntry {
        name: "PowerShell",
        aliases: &["posh", "pwsh"],
        extensions: &["ps1", "psm1"],
    },
    LanguageEntry {
        name: "Python",
        aliases: &["py", "python3"],
        extensions: &["py", "pyw"],
    },
    LanguageEntry {
        name: "Ruby",
        aliases: &["rb"],
        extensions: &["rb"],
    },
    LanguageEntry {
        name: "Rust",
        aliases: &["rs"],
        extensions: &["rs"],
    },
    LanguageEntry {
        name: "Scala",
        aliases: &[],
        extensions: &["scala", "sc"],
    },
    LanguageEntry {
        name: "SQL",
        aliases: &[],
        extensions: &["sql"],
    },
    LanguageEntry {
        name: "Swift",
        aliases: &[],
        extensions: &["swift"],
    },
    LanguageEntry {
        name: "TOML",
        aliases: &[],
        extensions: &["toml"],
    },
    LanguageEntry {
        name: "TypeScript",
        aliases: &["ts"],
        extensions: &["ts", "tsx"],
    },
    LanguageEntry {
        name: "XML",
        aliases: &[],
        extensions: &["xml", "xsd", "svg"],
    },
    LanguageEntry {
        name: "YAML",
        aliases: &["yml"],
        extensions: &["yaml", "yml"],
    },
    LanguageEntry {
        name: "Zig",
        aliases: &[],
        extensions: &["zig"],
    },
];

/// Built-in catalog. Lookup is case-insensitive; a name match wins over an
/// alias match, which wins over an extension match.
#[derive(Debug, Clone)]
pub struct LanguageCatalog {
    by_name: HashMap<String, &'static str>,
    by_alias: HashMap<String, &'static str>,
    by_extension: HashMap<String, &'static str>,
}

impl LanguageCatalog {
    pub fn new() -> Self {
        let mut by_name = HashMap::new();
        let mut by_alias = HashMap::new();
        let mut by_extension = HashMap::new();

        for entry in LANGUAGES {
            by_name.insert(entry.name.to_lowercase(), entry.name);
            for alias in entry.aliases {
                by_alias.entry(alias.to_lowercase()).or_insert(entry.name);
            }
            for extension in entry.extensions {
                by_extension.entry(extension.to_lowercase()).or_insert(entry.name);
            }
        }

        Self {
            by_name,
            by_alias,
            by_extension,
        }
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }
}

impl Default for LanguageCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageResolver for LanguageCatalog {
    fn resolve(&self, label: &str) -> Option<String> {
        let key = label.trim().to_lowercase();
        if key.is_empty() {
            return None;
        }
        let extension = key.strip_prefix('.').unwrap_or(&key);

        self.by_name
            .get(&key)
            .or_else(|| self.by_alias.get(&key))
            .or_else(|| self.by_extension.get(extension))
            .map(|name| name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_by_name_is_case_insensitive() {
        let catalog = LanguageCatalog::new();
        assert_eq!(catalog.resolve("rust").as_deref(), Some("Rust"));
        assert_eq!(catalog.resolve("PYTHON").as_deref(), Some("Python"));
        assert_eq!(catalog.resolve("  C++ ").as_deref(), Some("C++"));
    }

    #[test]
    fn test_resolve_by_alias_and_extension() {
        let catalog = LanguageCatalog::new();
        assert_eq!(catalog.resolve("golang").as_deref(), Some("Go"));
        assert_eq!(catalog.resolve("tsx").as_deref(), Some("TypeScript"));
        assert_eq!(catalog.resolve(".rs").as_deref(), Some("Rust"));
    }

    #[test]
    fn test_name_wins_over_alias_and_extension() {
        let catalog = LanguageCatalog::new();
        // "d" is both a language name and an extension of D only
        assert_eq!(catalog.resolve("d").as_deref(), Some("D"));
        // "c" is the C language, even though ".c" files exist too
        assert_eq!(catalog.resolve("c").as_deref(), Some("C"));
        // "text" is a name, "txt" only an alias
        assert_eq!(catalog.resolve("txt").as_deref(), Some("Text"));
    }

    #[test]
    fn test_unknown_label() {
        let catalog = LanguageCatalog::new();
        assert_eq!(catalog.resolve("klingon"), None);
        assert_eq!(catalog.resolve(""), None);
        assert_eq!(catalog.resolve("   "), None);
    }

    #[test]
    fn test_catalog_is_populated() {
        assert!(LanguageCatalog::new().len() > 30);
    }
}
