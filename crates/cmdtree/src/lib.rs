//! Declarative command trees with dispatch and clap-style help rendering.
//!
//! A [`Program`] is the root of a tree of [`Command`]s. Each command declares
//! its options and positional arguments, and `parse` walks the tree one token
//! per level, validates what the tokenizer produced, and then either calls the
//! matching handler or writes help/error text to an [`Output`].
//!
//! # Example
//!
//! ```
//! use cmdtree::{Argument, Dispatch, OptionDef, Program};
//!
//! # fn main() -> Result<(), cmdtree::BuildError> {
//! let mut program = Program::new("logger", "logs parsed arguments and options");
//! program.version("1.0.1");
//! program
//!     .command("log", "logs parsed arguments and options")
//!     .option(OptionDef::new("quiet", "Suppress diagnostic output").alias("q").boolean())?
//!     .argument(Argument::new("argument").optional().multiple())?
//!     .handler(|args| args.positional().len());
//!
//! let mut out = String::new();
//! let tokens = ["log", "-q", "a", "b"].map(String::from);
//! let dispatch = program.parse_with(&tokens, &cmdtree::FlagTokenizer, &mut out);
//! assert!(matches!(dispatch, Dispatch::Handled(2)));
//! assert!(out.is_empty());
//! # Ok(())
//! # }
//! ```

pub mod args;
pub mod command;
pub mod diagnostics;
mod error;
pub mod help;
pub mod output;
pub mod program;

pub use args::{FlagTokenizer, ParsedArgs, Tokenizer, TokenizerConfig, Value};
pub use command::{Argument, Command, Dispatch, OptionDef};
pub use diagnostics::UsageError;
pub use error::BuildError;
pub use output::{Console, Output};
pub use program::Program;
