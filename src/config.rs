//! Embedding configuration
//!
//! Attributes arrive as loose strings from the host (CLI flags here, script
//! tag data attributes originally) and resolve into an [`EmbedConfig`] before
//! the pipeline runs. Unknown or absent format strings fall back to HTML;
//! the default cache prefix is `insert`.

/// Output format of the embedded content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Html,
    Markdown,
}

/// Default cache key prefix
pub const DEFAULT_PREFIX: &str = "insert";

/// Resolved embedding configuration
#[derive(Debug, Clone)]
pub struct EmbedConfig {
    pub src: String,
    pub prefix: String,
    pub format: Format,
}

impl EmbedConfig {
    /// Resolve raw attribute values into a config
    pub fn resolve(src: &str, prefix: Option<&str>, format: Option<&str>) -> Self {
        Self {
            src: src.to_string(),
            prefix: resolve_prefix(prefix),
            format: resolve_format(format),
        }
    }
}

/// Resolve a raw format attribute, defaulting to HTML
pub fn resolve_format(raw: Option<&str>) -> Format {
    match raw.map(str::to_lowercase).as_deref() {
        Some("markdown") => Format::Markdown,
        Some("html") => Format::Html,
        // default format is html
        _ => Format::Html,
    }
}

/// Resolve a raw prefix attribute, defaulting to `insert`
pub fn resolve_prefix(raw: Option<&str>) -> String {
    match raw {
        Some(prefix) if !prefix.is_empty() => prefix.to_string(),
        _ => DEFAULT_PREFIX.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_defaults_to_html() {
        assert_eq!(resolve_format(None), Format::Html);
        assert_eq!(resolve_format(Some("")), Format::Html);
        assert_eq!(resolve_format(Some("asciidoc")), Format::Html);
    }

    #[test]
    fn format_is_case_insensitive() {
        assert_eq!(resolve_format(Some("Markdown")), Format::Markdown);
        assert_eq!(resolve_format(Some("MARKDOWN")), Format::Markdown);
        assert_eq!(resolve_format(Some("HtMl")), Format::Html);
    }

    #[test]
    fn prefix_defaults_to_insert() {
        assert_eq!(resolve_prefix(None), "insert");
        assert_eq!(resolve_prefix(Some("")), "insert");
        assert_eq!(resolve_prefix(Some("docs")), "docs");
    }

    #[test]
    fn resolve_builds_full_config() {
        let config = EmbedConfig::resolve("a.md", Some("docs"), Some("markdown"));
        assert_eq!(config.src, "a.md");
        assert_eq!(config.prefix, "docs");
        assert_eq!(config.format, Format::Markdown);
    }
}
