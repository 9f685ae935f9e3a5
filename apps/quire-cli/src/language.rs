// language.rs — Language label for a file extension (".rs" → "rust").

/// Map an extension (with its leading dot, any case) to a language label.
/// Unknown or empty extensions are "plaintext".
pub fn language_for_extension(extension: &str) -> &'static str {
    match extension.to_ascii_lowercase().as_str() {
        ".js" | ".jsx" => "javascript",
        ".ts" | ".tsx" => "typescript",
        ".html" => "html",
        ".css" => "css",
        ".json" => "json",
        ".md" => "markdown",
        ".py" => "python",
        ".java" => "java",
        ".cpp" => "cpp",
        ".c" => "c",
        ".php" => "php",
        ".rb" => "ruby",
        ".go" => "go",
        ".rs" => "rust",
        ".xml" => "xml",
        ".yaml" | ".yml" => "yaml",
        ".sql" => "sql",
        ".sh" => "shell",
        ".bat" => "bat",
        ".ps1" => "powershell",
        _ => "plaintext",
    }
}
