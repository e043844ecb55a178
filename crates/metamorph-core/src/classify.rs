use serde::{Deserialize, Serialize};

/// File category derived from the path extension. The discriminant is the node `group`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    TypeScript = 0,
    JavaScript = 1,
    Styles = 2,
    Html = 3,
    Json = 4,
    Documentation = 5,
    Other = 6,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::TypeScript,
        Category::JavaScript,
        Category::Styles,
        Category::Html,
        Category::Json,
        Category::Documentation,
        Category::Other,
    ];

    pub fn of_path(path: &str) -> Self {
        match extension(path) {
            Some(ext) => Self::of_extension(ext),
            None => Self::Other,
        }
    }

    pub fn of_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "ts" | "tsx" | "mts" | "cts" => Self::TypeScript,
            "js" | "jsx" | "mjs" | "cjs" => Self::JavaScript,
            "css" | "scss" | "sass" | "less" => Self::Styles,
            "html" | "htm" => Self::Html,
            "json" => Self::Json,
            "md" | "markdown" | "mdx" => Self::Documentation,
            _ => Self::Other,
        }
    }

    pub fn from_group(group: u8) -> Self {
        Self::ALL
            .get(group as usize)
            .copied()
            .unwrap_or(Self::Other)
    }

    pub fn group(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::TypeScript => "TypeScript",
            Self::JavaScript => "JavaScript",
            Self::Styles => "Styles",
            Self::Html => "HTML",
            Self::Json => "JSON",
            Self::Documentation => "Documentation",
            Self::Other => "Other",
        }
    }
}

/// Extension of the last path segment, without the dot. Dotfiles like `.gitignore` count.
pub fn extension(path: &str) -> Option<&str> {
    let base = path.rsplit('/').next().unwrap_or(path);
    match base.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => Some(ext),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_extensions_map_to_buckets() {
        assert_eq!(Category::of_path("src/a.ts"), Category::TypeScript);
        assert_eq!(Category::of_path("src/App.TSX"), Category::TypeScript);
        assert_eq!(Category::of_path("b.css"), Category::Styles);
        assert_eq!(Category::of_path("index.html"), Category::Html);
        assert_eq!(Category::of_path("package.json"), Category::Json);
        assert_eq!(Category::of_path("README.md"), Category::Documentation);
        assert_eq!(Category::of_path("lib/util.js"), Category::JavaScript);
    }

    #[test]
    fn unknown_or_missing_extension_falls_back_to_other() {
        assert_eq!(Category::of_path("Makefile"), Category::Other);
        assert_eq!(Category::of_path("src/main.rs"), Category::Other);
        assert_eq!(Category::of_path("trailing."), Category::Other);
        assert_eq!(Category::of_path(""), Category::Other);
        assert_eq!(Category::of_path("dir.v2/LICENSE"), Category::Other);
    }

    #[test]
    fn group_roundtrips_through_label_table() {
        for cat in Category::ALL {
            assert_eq!(Category::from_group(cat.group()), cat);
        }
        assert_eq!(Category::from_group(42), Category::Other);
        assert_eq!(Category::TypeScript.group(), 0);
        assert_eq!(Category::Other.label(), "Other");
    }

    #[test]
    fn extension_uses_last_segment() {
        assert_eq!(extension("a/b.c/d.json"), Some("json"));
        assert_eq!(extension("a/.gitignore"), Some("gitignore"));
        assert_eq!(extension("a.b/noext"), None);
    }
}
