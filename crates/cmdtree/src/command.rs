//! The command tree and its dispatch engine.

use crate::args::{FlagTokenizer, ParsedArgs, Tokenizer, TokenizerConfig};
use crate::diagnostics::UsageError;
use crate::error::BuildError;
use crate::help::{self, CommandSummary, HelpRequest};
use crate::output::{Console, Output};
use indexmap::IndexMap;
use indexmap::map::Entry;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

/// A positional argument.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Argument {
    name: String,
    description: Option<String>,
    optional: bool,
    multiple: bool,
}

impl Argument {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn help(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Take every remaining positional value. Only valid on the last argument.
    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn is_multiple(&self) -> bool {
        self.multiple
    }
}

/// A named option (`--name`), optionally reachable through a one-character
/// alias (`-n`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionDef {
    name: String,
    description: String,
    alias: Option<String>,
    boolean: bool,
    args: Vec<Argument>,
}

impl OptionDef {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            alias: None,
            boolean: false,
            args: Vec::new(),
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// The option never takes a value.
    pub fn boolean(mut self) -> Self {
        self.boolean = true;
        self
    }

    /// Describe an operand of the option. Only used for help output.
    pub fn arg(mut self, arg: Argument) -> Self {
        self.args.push(arg);
        self
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_description(&self) -> &str {
        &self.description
    }

    pub fn get_alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn is_boolean(&self) -> bool {
        self.boolean
    }

    pub fn get_args(&self) -> &[Argument] {
        self.args.as_slice()
    }
}

pub type Handler<T> = Box<dyn Fn(ParsedArgs) -> T>;

/// How a `parse` call ended.
#[derive(Debug)]
pub enum Dispatch<T> {
    /// The matched command's handler ran and returned this value.
    Handled(T),
    /// Input was valid but the matched command has no handler.
    Parsed(ParsedArgs),
    /// Help text was written.
    Help,
    /// A diagnostic was written.
    Rejected(UsageError),
}

impl<T> Dispatch<T> {
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }

    pub fn handled(self) -> Option<T> {
        match self {
            Self::Handled(value) => Some(value),
            _ => None,
        }
    }
}

/// A node of the command tree.
///
/// Build the tree with `option`, `argument` and `command` first; `parse`
/// only reads it.
pub struct Command<T = ()> {
    name: String,
    description: String,
    version: Option<String>,
    // Display name of the parent, for titles and usage lines.
    parent: Option<String>,
    options: IndexMap<String, OptionDef>,
    // alias -> option name
    aliases: HashMap<String, String>,
    args: Vec<Argument>,
    subcommands: IndexMap<String, Command<T>>,
    handler: Option<Handler<T>>,
}

impl<T> fmt::Debug for Command<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("version", &self.version)
            .field("parent", &self.parent)
            .field("options", &self.options)
            .field("args", &self.args)
            .field("subcommands", &self.subcommands)
            .field("handler", &self.handler.is_some())
            .finish()
    }
}

impl<T> Command<T> {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            version: None,
            parent: None,
            options: IndexMap::new(),
            aliases: HashMap::new(),
            args: Vec::new(),
            subcommands: IndexMap::new(),
            handler: None,
        }
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_description(&self) -> &str {
        &self.description
    }

    pub fn get_version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn get_parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn get_args(&self) -> &[Argument] {
        self.args.as_slice()
    }

    /// Options in declaration order.
    pub fn get_options(&self) -> impl Iterator<Item = &OptionDef> {
        self.options.values()
    }

    /// Subcommands in declaration order.
    pub fn get_subcommands(&self) -> impl Iterator<Item = &Command<T>> {
        self.subcommands.values()
    }

    pub fn find_subcommand(&self, name: &str) -> Option<&Command<T>> {
        self.subcommands.get(name)
    }

    /// Look up an option by name, then by alias.
    pub fn find_option(&self, key: &str) -> Option<&OptionDef> {
        self.options.get(key).or_else(|| {
            self.aliases
                .get(key)
                .and_then(|name| self.options.get(name))
        })
    }

    pub(crate) fn set_version(&mut self, version: String) {
        self.version = Some(version);
    }

    /// Append a positional argument.
    ///
    /// A `multiple` argument swallows every remaining value, so nothing may be
    /// declared after it.
    pub fn argument(&mut self, arg: Argument) -> Result<&mut Self, BuildError> {
        if self.args.iter().any(|a| a.name == arg.name) {
            return Err(BuildError::DuplicateArgument {
                command: self.name.clone(),
                argument: arg.name,
            });
        }
        if let Some(variadic) = self.args.iter().find(|a| a.multiple) {
            return Err(BuildError::VariadicNotLast {
                command: self.name.clone(),
                argument: arg.name,
                variadic: variadic.name.clone(),
            });
        }
        self.args.push(arg);
        Ok(self)
    }

    /// Insert an option, replacing any option of the same name.
    pub fn option(&mut self, option: OptionDef) -> Result<&mut Self, BuildError> {
        if let Some(alias) = option.get_alias() {
            if alias.chars().count() != 1 {
                return Err(BuildError::InvalidAlias {
                    command: self.name.clone(),
                    option: option.name.clone(),
                    alias: alias.to_string(),
                });
            }
            if let Some(existing) = self.aliases.get(alias) {
                if existing != &option.name {
                    return Err(BuildError::DuplicateAlias {
                        command: self.name.clone(),
                        alias: alias.to_string(),
                        existing: existing.clone(),
                        option: option.name.clone(),
                    });
                }
            }
        }
        self.insert_option(option);
        Ok(self)
    }

    pub(crate) fn insert_option(&mut self, option: OptionDef) {
        if let Some(previous) = self.options.get(&option.name) {
            if let Some(alias) = &previous.alias {
                self.aliases.remove(alias);
            }
        }
        if let Some(alias) = &option.alias {
            self.aliases.insert(alias.clone(), option.name.clone());
        }
        self.options.insert(option.name.clone(), option);
    }

    /// Add a subcommand and return it, so its own options and arguments can
    /// be chained on directly.
    pub fn command(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> &mut Command<T> {
        let name = name.into();
        let mut child = Command::new(name.clone(), description);
        child.parent = Some(self.name.clone());

        match self.subcommands.entry(name) {
            Entry::Occupied(mut entry) => {
                entry.insert(child);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(child),
        }
    }

    /// Set the function called when parsing lands on this command.
    pub fn handler(&mut self, handler: impl Fn(ParsedArgs) -> T + 'static) -> &mut Self {
        self.handler = Some(Box::new(handler));
        self
    }

    /// `parent name` for subcommands, `name` for the root.
    pub fn usage_name(&self) -> String {
        match &self.parent {
            Some(parent) => format!("{parent} {}", self.name),
            None => self.name.clone(),
        }
    }

    /// The usage line, with arguments in declaration order.
    pub fn usage(&self) -> String {
        help::usage_line(
            &self.usage_name(),
            !self.options.is_empty(),
            &self.args,
            !self.subcommands.is_empty(),
        )
    }

    /// Render this command's help screen. Options, subcommands and arguments
    /// are listed by name, ignoring case; the USAGE line keeps declaration
    /// order.
    pub fn help_text(&self) -> String {
        let title = self
            .parent
            .as_ref()
            .map(|parent| format!("{parent}-{}", self.name));
        let usage_name = self.usage_name();

        let mut options: Vec<&OptionDef> = self.options.values().collect();
        options.sort_by(|a, b| by_name(&a.name, &b.name));
        let mut args: Vec<&Argument> = self.args.iter().collect();
        args.sort_by(|a, b| by_name(&a.name, &b.name));
        let mut subcommands: Vec<CommandSummary<'_>> = self
            .subcommands
            .values()
            .map(|c| CommandSummary {
                name: &c.name,
                description: &c.description,
            })
            .collect();
        subcommands.sort_by(|a, b| by_name(a.name, b.name));

        help::render(&HelpRequest {
            title: title.as_deref(),
            name: &self.name,
            usage_name: Some(usage_name.as_str()),
            version: self.version.as_deref(),
            description: &self.description,
            options,
            args,
            usage_args: self.args.iter().collect(),
            subcommands,
        })
    }

    pub fn render_help(&self, out: &mut dyn Output) {
        out.write(&self.help_text());
    }

    /// Print help to stdout.
    pub fn help(&self) {
        self.render_help(&mut Console);
    }

    /// Tokenizer settings derived from the declared options.
    pub fn tokenizer_config(&self) -> TokenizerConfig {
        self.options
            .values()
            .fold(TokenizerConfig::new(), |config, option| {
                let config = if option.boolean {
                    config.boolean(&option.name)
                } else {
                    config
                };
                match &option.alias {
                    Some(alias) => config.alias(&option.name, alias),
                    None => config,
                }
            })
    }

    /// Parse `tokens` with the default tokenizer, writing help and
    /// diagnostics to stdout.
    pub fn parse(&self, tokens: &[String]) -> Dispatch<T> {
        self.parse_with(tokens, &FlagTokenizer, &mut Console)
    }

    /// Resolve the subcommand chain, validate, and dispatch.
    ///
    /// Help is checked before anything else. At a node with subcommands the
    /// first raw token must then name a child, flag-shaped or not; children
    /// are matched one token per level. Validation stops at the first
    /// problem: unknown options are reported before missing arguments.
    pub fn parse_with(
        &self,
        tokens: &[String],
        tokenizer: &dyn Tokenizer,
        out: &mut dyn Output,
    ) -> Dispatch<T> {
        let parsed = tokenizer.tokenize(tokens, &self.tokenizer_config());

        if parsed.positional().is_empty() && parsed.help() {
            tracing::debug!(command = %self.name, "rendering help");
            self.render_help(out);
            return Dispatch::Help;
        }

        if !self.subcommands.is_empty() {
            if let Some((first, rest)) = tokens.split_first() {
                return match self.subcommands.get(first.as_str()) {
                    Some(child) => {
                        tracing::debug!(command = %self.name, subcommand = %first, "resolved subcommand");
                        child.parse_with(rest, tokenizer, out)
                    }
                    None => self.reject(
                        UsageError::InvalidSubcommand {
                            name: first.clone(),
                            known: self.subcommands.keys().cloned().collect(),
                        },
                        out,
                    ),
                };
            }
        }

        if let Some(key) = parsed
            .options()
            .keys()
            .find(|key| self.find_option(key).is_none())
        {
            return self.reject(UsageError::InvalidOption { key: key.clone() }, out);
        }

        let required: Vec<&Argument> = self.args.iter().filter(|a| !a.optional).collect();
        let supplied = parsed.positional().len();
        if supplied < required.len() {
            let missing = required[supplied..].iter().map(|a| (*a).clone()).collect();
            return self.reject(
                UsageError::MissingRequiredArguments {
                    missing,
                    usage: self.usage(),
                },
                out,
            );
        }

        match &self.handler {
            Some(handler) => {
                tracing::debug!(command = %self.name, "invoking handler");
                Dispatch::Handled(handler(parsed))
            }
            None => {
                tracing::debug!(command = %self.name, "no handler registered");
                Dispatch::Parsed(parsed)
            }
        }
    }

    fn reject(&self, err: UsageError, out: &mut dyn Output) -> Dispatch<T> {
        tracing::debug!(command = %self.name, error = ?err, "rejected invocation");
        out.write(&err.to_string());
        Dispatch::Rejected(err)
    }
}

/// Case-insensitive name order, ties broken bytewise.
fn by_name(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::Value;
    use std::cell::Cell;
    use std::rc::Rc;

    fn argv(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|s| s.to_string()).collect()
    }

    fn run<T>(cmd: &Command<T>, tokens: &[&str]) -> (Dispatch<T>, Vec<String>) {
        let mut out: Vec<String> = Vec::new();
        let dispatch = cmd.parse_with(&argv(tokens), &FlagTokenizer, &mut out);
        (dispatch, out)
    }

    fn counting_handler(cmd: &mut Command<()>) -> Rc<Cell<usize>> {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        cmd.handler(move |_| counter.set(counter.get() + 1));
        calls
    }

    fn copy_command() -> Command<()> {
        let mut cmd = Command::new("cp", "copy files");
        cmd.option(OptionDef::new("force", "Overwrite").alias("f").boolean())
            .unwrap()
            .argument(Argument::new("src"))
            .unwrap()
            .argument(Argument::new("dest"))
            .unwrap();
        cmd
    }

    #[test]
    fn missing_arguments_lists_unmet_tail() {
        let mut cmd = copy_command();
        let calls = counting_handler(&mut cmd);

        let (dispatch, out) = run(&cmd, &["a.txt"]);
        let Dispatch::Rejected(UsageError::MissingRequiredArguments { missing, usage }) = dispatch
        else {
            panic!("expected MissingRequiredArguments");
        };
        let names: Vec<&str> = missing.iter().map(Argument::get_name).collect();
        assert_eq!(names, ["dest"]);
        assert_eq!(usage, "cp [OPTIONS] <src> <dest>");
        assert_eq!(calls.get(), 0);
        assert_eq!(out.len(), 1);
        assert!(out[0].contains("    <dest>\n"));
        assert!(!out[0].contains("<src>\n"));

        let (dispatch, _) = run(&cmd, &[]);
        let Dispatch::Rejected(UsageError::MissingRequiredArguments { missing, .. }) = dispatch
        else {
            panic!("expected MissingRequiredArguments");
        };
        assert_eq!(missing.len(), 2);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn invalid_option_wins_over_missing_arguments() {
        let mut cmd = copy_command();
        let calls = counting_handler(&mut cmd);

        let (dispatch, out) = run(&cmd, &["--bogus"]);
        match dispatch {
            Dispatch::Rejected(UsageError::InvalidOption { key }) => assert_eq!(key, "bogus"),
            other => panic!("expected InvalidOption, got: {other:?}"),
        }
        assert_eq!(out.len(), 1);
        assert!(out[0].contains("'--bogus'"));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn first_unknown_option_is_reported() {
        let cmd = copy_command();
        let (dispatch, out) = run(&cmd, &["-x", "--later", "a", "b"]);
        match dispatch {
            Dispatch::Rejected(UsageError::InvalidOption { key }) => assert_eq!(key, "x"),
            other => panic!("expected InvalidOption, got: {other:?}"),
        }
        assert!(out[0].contains("'-x'"));
    }

    #[test]
    fn names_and_aliases_are_both_accepted() {
        let mut cmd: Command<ParsedArgs> = Command::new("build", "build it");
        cmd.option(OptionDef::new("output", "Output file").alias("o"))
            .unwrap()
            .handler(|args| args);

        let (dispatch, out) = run(&cmd, &["-o", "out.bin", "--output", "other.bin"]);
        let parsed = dispatch.handled().expect("handler should run");
        assert_eq!(parsed.get("o").and_then(Value::as_str), Some("out.bin"));
        assert_eq!(parsed.get("output").and_then(Value::as_str), Some("other.bin"));
        assert!(out.is_empty());
    }

    #[test]
    fn resolves_one_subcommand_per_level() {
        let mut root: Command<&'static str> = Command::new("prog", "root");
        root.handler(|_| "prog");
        let sub1 = root.command("sub1", "first level");
        sub1.handler(|_| "sub1");
        sub1.command("sub2", "second level").handler(|_| "sub2");
        root.command("other", "sibling").handler(|_| "other");

        let (dispatch, _) = run(&root, &["sub1", "sub2"]);
        assert_eq!(dispatch.handled(), Some("sub2"));

        let (dispatch, _) = run(&root, &["other"]);
        assert_eq!(dispatch.handled(), Some("other"));

        let (dispatch, out) = run(&root, &["sub2"]);
        match dispatch {
            Dispatch::Rejected(UsageError::InvalidSubcommand { name, known }) => {
                assert_eq!(name, "sub2");
                assert_eq!(known, ["sub1", "other"]);
            }
            other => panic!("expected InvalidSubcommand, got: {other:?}"),
        }
        assert_eq!(out, ["error: The subcommand 'sub2' wasn't recognized"]);

        let (dispatch, _) = run(&root, &["sub1", "nope"]);
        assert!(matches!(
            dispatch,
            Dispatch::Rejected(UsageError::InvalidSubcommand { ref name, .. }) if name == "nope"
        ));
    }

    #[test]
    fn first_token_must_name_a_subcommand() {
        let mut root = Command::new("prog", "root");
        root.option(OptionDef::new("verbose", "Talk more").boolean())
            .unwrap();
        let root_calls = counting_handler(&mut root);
        let child_calls = counting_handler(root.command("log", "child"));

        for tokens in [&["-h", "nope"][..], &["--bogus", "log"], &["--verbose"]] {
            let (dispatch, out) = run(&root, tokens);
            match dispatch {
                Dispatch::Rejected(UsageError::InvalidSubcommand { name, known }) => {
                    assert_eq!(name, tokens[0]);
                    assert_eq!(known, ["log"]);
                }
                other => panic!("expected InvalidSubcommand for {tokens:?}, got: {other:?}"),
            }
            assert_eq!(out.len(), 1);
        }

        let (dispatch, _) = run(&root, &["-h", "log"]);
        assert!(dispatch.is_rejected());

        assert_eq!(root_calls.get(), 0);
        assert_eq!(child_calls.get(), 0);
    }

    #[test]
    fn node_with_subcommands_handles_empty_input() {
        let mut root: Command<bool> = Command::new("prog", "root");
        root.handler(|args| args.positional().is_empty());
        root.command("sub", "child").handler(|_| false);

        let (dispatch, _) = run(&root, &[]);
        assert_eq!(dispatch.handled(), Some(true));
    }

    #[test]
    fn help_short_circuits_at_every_level() {
        let mut root = Command::new("prog", "root");
        let root_calls = counting_handler(&mut root);
        let child = root.command("a", "child a");
        let child_calls = counting_handler(child);
        let grandchild = child.command("b", "grandchild b");
        let grandchild_calls = counting_handler(grandchild);

        let (dispatch, out) = run(&root, &["--help"]);
        assert!(matches!(dispatch, Dispatch::Help));
        assert_eq!(out.len(), 1);
        assert!(out[0].starts_with("prog\nroot\n"));

        let (dispatch, out) = run(&root, &["a", "--help"]);
        assert!(matches!(dispatch, Dispatch::Help));
        assert!(out[0].starts_with("prog-a\nchild a\n"));

        let (dispatch, out) = run(&root, &["a", "b", "--help"]);
        assert!(matches!(dispatch, Dispatch::Help));
        assert!(out[0].starts_with("a-b\ngrandchild b\n\nUSAGE:\n    a b\n"));

        assert_eq!(root_calls.get(), 0);
        assert_eq!(child_calls.get(), 0);
        assert_eq!(grandchild_calls.get(), 0);
    }

    #[test]
    fn help_with_positional_input_falls_through() {
        let mut cmd: Command<ParsedArgs> = Command::new("show", "show things");
        cmd.argument(Argument::new("thing")).unwrap().handler(|args| args);

        let (dispatch, out) = run(&cmd, &["topic", "--help"]);
        let parsed = dispatch.handled().expect("handler should run");
        assert!(parsed.help());
        assert_eq!(parsed.positional(), ["topic"]);
        assert!(out.is_empty());
    }

    #[test]
    fn help_is_sorted_and_deterministic() {
        let mut cmd: Command<()> = Command::new("tool", "does things");
        cmd.option(OptionDef::new("zeta", "last option"))
            .unwrap()
            .option(OptionDef::new("alpha", "first option").alias("a"))
            .unwrap();
        cmd.command("zebra", "last command");
        cmd.command("apple", "first command");

        let first = cmd.help_text();
        let second = cmd.help_text();
        assert_eq!(first, second);

        let pos = |needle: &str| first.find(needle).unwrap_or_else(|| panic!("missing {needle}"));
        assert!(pos("--alpha") < pos("--zeta"));
        assert!(pos("    apple") < pos("    zebra"));
        assert!(first.contains("    -a, --alpha    first option\n"));
        assert!(first.contains("        --zeta     last option\n"));
        assert!(first.contains("    apple          first command\n"));
        assert!(first.contains("USAGE:\n    tool [OPTIONS] [SUBCOMMAND]\n"));
    }

    #[test]
    fn help_usage_keeps_declaration_order() {
        let mut cp: Command<()> = Command::new("cp", "copy files");
        cp.argument(Argument::new("src").help("Source"))
            .unwrap()
            .argument(Argument::new("dest").help("Destination"))
            .unwrap();

        let text = cp.help_text();
        assert!(text.contains("USAGE:\n    cp <src> <dest>\n"), "{text}");
        assert!(text.contains("ARGS:\n    <dest>    Destination\n    <src>     Source\n"));
        assert_eq!(cp.usage(), "cp <src> <dest>");

        let mut x: Command<()> = Command::new("x", "variadic last");
        x.argument(Argument::new("z"))
            .unwrap()
            .argument(Argument::new("a").optional().multiple())
            .unwrap();
        assert!(x.help_text().contains("USAGE:\n    x <z> [a]...\n"));
    }

    #[test]
    fn help_sorts_names_ignoring_case() {
        let mut cmd: Command<()> = Command::new("tool", "does things");
        cmd.command("Zeta", "capitalised");
        cmd.command("alpha", "lowercase");
        cmd.command("Alpha", "capitalised twin");

        let text = cmd.help_text();
        let at = |name: &str| text.find(&format!("    {name} ")).expect(name);
        assert!(at("Alpha") < at("alpha"));
        assert!(at("alpha") < at("Zeta"));
    }

    #[test]
    fn quiet_flag_round_trip() {
        let mut cmd: Command<ParsedArgs> = Command::new("log", "logs");
        cmd.option(OptionDef::new("quiet", "Suppress diagnostic output").alias("q").boolean())
            .unwrap()
            .argument(Argument::new("argument").optional().multiple())
            .unwrap()
            .handler(|args| args);

        let (dispatch, out) = run(&cmd, &["-q", "a", "b", "c"]);
        let parsed = dispatch.handled().expect("handler should run");
        assert_eq!(parsed.get("quiet"), Some(&Value::Bool(true)));
        assert_eq!(parsed.positional(), ["a", "b", "c"]);
        assert!(!parsed.help());
        assert!(out.is_empty());
    }

    #[test]
    fn variadic_argument_must_be_last() {
        let mut cmd: Command<()> = Command::new("cmd", "");
        cmd.argument(Argument::new("files").multiple()).unwrap();

        let err = cmd.argument(Argument::new("dest")).unwrap_err();
        match err {
            BuildError::VariadicNotLast { argument, variadic, .. } => {
                assert_eq!(argument, "dest");
                assert_eq!(variadic, "files");
            }
            other => panic!("expected VariadicNotLast, got: {other:?}"),
        }
        assert_eq!(cmd.get_args().len(), 1);
    }

    #[test]
    fn duplicate_argument_is_rejected() {
        let mut cmd: Command<()> = Command::new("cmd", "");
        cmd.argument(Argument::new("file")).unwrap();
        let err = cmd.argument(Argument::new("file").optional()).unwrap_err();
        assert!(matches!(err, BuildError::DuplicateArgument { .. }));
    }

    #[test]
    fn alias_rules() {
        let mut cmd: Command<()> = Command::new("cmd", "");
        cmd.option(OptionDef::new("verbose", "").alias("v")).unwrap();

        let err = cmd.option(OptionDef::new("version", "").alias("v")).unwrap_err();
        assert!(err.to_string().contains("maps to both 'verbose' and 'version'"));

        let err = cmd.option(OptionDef::new("level", "").alias("lv")).unwrap_err();
        assert!(matches!(err, BuildError::InvalidAlias { .. }));

        // Redeclaring an option moves its alias.
        cmd.option(OptionDef::new("verbose", "").alias("V")).unwrap();
        assert!(cmd.find_option("v").is_none());
        assert_eq!(cmd.find_option("V").map(OptionDef::get_name), Some("verbose"));
        cmd.option(OptionDef::new("version", "").alias("v")).unwrap();
    }

    #[test]
    fn optional_arguments_only_count_toward_totals() {
        let mut cmd: Command<usize> = Command::new("cmd", "");
        cmd.argument(Argument::new("maybe").optional())
            .unwrap()
            .argument(Argument::new("needed"))
            .unwrap()
            .handler(|args| args.positional().len());

        let (dispatch, _) = run(&cmd, &["x"]);
        assert_eq!(dispatch.handled(), Some(1));
    }

    #[test]
    fn without_handler_returns_parsed_arguments() {
        let mut cmd: Command<()> = Command::new("cmd", "");
        cmd.argument(Argument::new("file")).unwrap();

        let (dispatch, out) = run(&cmd, &["a.txt"]);
        let Dispatch::Parsed(parsed) = dispatch else {
            panic!("expected Parsed");
        };
        assert_eq!(parsed.positional(), ["a.txt"]);
        assert!(out.is_empty());
    }

    #[test]
    fn replacing_a_subcommand_keeps_one_entry() {
        let mut root: Command<u8> = Command::new("prog", "");
        root.command("run", "old").handler(|_| 1);
        root.command("run", "new").handler(|_| 2);

        assert_eq!(root.get_subcommands().count(), 1);
        assert_eq!(root.find_subcommand("run").map(Command::get_description), Some("new"));
        assert_eq!(root.find_subcommand("run").and_then(Command::get_parent), Some("prog"));
        let (dispatch, _) = run(&root, &["run"]);
        assert_eq!(dispatch.handled(), Some(2));
    }
}
