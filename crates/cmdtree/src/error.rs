use thiserror::Error;

/// A command tree that was declared inconsistently.
///
/// These are programming errors in the tree definition, reported while the
/// tree is being built rather than when user input is parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("command '{command}': argument '{argument}' follows variadic argument '{variadic}'")]
    VariadicNotLast {
        command: String,
        argument: String,
        variadic: String,
    },

    #[error("command '{command}': argument '{argument}' is already declared")]
    DuplicateArgument { command: String, argument: String },

    #[error("command '{command}': alias '-{alias}' maps to both '{existing}' and '{option}'")]
    DuplicateAlias {
        command: String,
        alias: String,
        existing: String,
        option: String,
    },

    #[error("command '{command}': alias '{alias}' of '{option}' must be a single character")]
    InvalidAlias {
        command: String,
        option: String,
        alias: String,
    },
}
