//! Diagnostics for invocations that do not match the command tree.

use crate::command::Argument;
use crate::help::{PADDING, decorate, usage_block};
use thiserror::Error;

/// An invocation rejected during dispatch. `Display` yields the rendered text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    #[error("{}", missing_required_arguments(.missing, .usage))]
    MissingRequiredArguments { missing: Vec<Argument>, usage: String },

    #[error("{}", invalid_option(&flag_token(.key)))]
    InvalidOption { key: String },

    #[error("{}", invalid_subcommand(.name, .known))]
    InvalidSubcommand { name: String, known: Vec<String> },
}

/// List the required arguments that received no value, then the usage line.
pub fn missing_required_arguments<'a>(
    missing: impl IntoIterator<Item = &'a Argument>,
    usage: &str,
) -> String {
    let mut out = String::new();
    out.push_str("error: The following required arguments were not provided:\n");
    for arg in missing {
        out.push_str(&" ".repeat(PADDING));
        out.push_str(&decorate(arg));
        out.push('\n');
    }
    out.push('\n');
    out.push_str(&usage_block(usage));
    out.push('\n');
    out.push_str("For more information try --help");
    out
}

pub fn invalid_option(flag: &str) -> String {
    format!("error: Found argument '{flag}' which wasn't expected, or isn't valid in this context")
}

/// `known` lists the subcommands that would have been accepted.
pub fn invalid_subcommand(name: &str, known: &[String]) -> String {
    tracing::trace!(?known, "unrecognized subcommand {name}");
    format!("error: The subcommand '{name}' wasn't recognized")
}

/// How an option key was most likely typed: `-k` for one character, `--key` otherwise.
pub fn flag_token(key: &str) -> String {
    if key.chars().count() == 1 {
        format!("-{key}")
    } else {
        format!("--{key}")
    }
}
