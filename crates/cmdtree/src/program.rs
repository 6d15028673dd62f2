use crate::args::{FlagTokenizer, Tokenizer};
use crate::command::{Command, Dispatch, OptionDef};
use crate::output::{Console, Output};
use std::ops::{Deref, DerefMut};

/// The root of a command tree.
///
/// Registers `-h, --help` on construction and prints help when invoked with
/// no tokens at all. Everything else is delegated to the root [`Command`].
#[derive(Debug)]
pub struct Program<T = ()> {
    root: Command<T>,
}

impl<T> Program<T> {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        let mut root = Command::new(name, description);
        root.insert_option(
            OptionDef::new("help", "Prints help information")
                .alias("h")
                .boolean(),
        );
        Self { root }
    }

    /// Version shown next to the program name in help output.
    pub fn version(&mut self, version: impl Into<String>) -> &mut Self {
        self.root.set_version(version.into());
        self
    }

    pub fn parse(&self, tokens: &[String]) -> Dispatch<T> {
        self.parse_with(tokens, &FlagTokenizer, &mut Console)
    }

    pub fn parse_with(
        &self,
        tokens: &[String],
        tokenizer: &dyn Tokenizer,
        out: &mut dyn Output,
    ) -> Dispatch<T> {
        if tokens.is_empty() {
            tracing::debug!(program = %self.root.get_name(), "no arguments, rendering help");
            self.root.render_help(out);
            return Dispatch::Help;
        }
        self.root.parse_with(tokens, tokenizer, out)
    }

    pub fn into_command(self) -> Command<T> {
        self.root
    }
}

impl<T> Deref for Program<T> {
    type Target = Command<T>;

    fn deref(&self) -> &Self::Target {
        &self.root
    }
}

impl<T> DerefMut for Program<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.root
    }
}
