use thiserror::Error;

#[derive(Debug, Error)]
/// Errors produced while loading or compiling a regex syntax definition.
pub enum RegexSyntaxError {
    #[error("YAML parse error: {0}")]
    /// YAML parsing failed.
    Yaml(#[from] serde_yaml::Error),

    #[error("regex compile error for pattern '{pattern}': {source}")]
    /// A rule pattern failed to compile.
    Regex {
        /// The pattern as it was handed to the regex compiler.
        pattern: String,
        /// The compiler error.
        source: regex::Error,
    },

    #[error("unknown highlight category '{0}'")]
    /// A highlight table key is not a known category.
    UnknownCategory(String),
}
