//! Token-level parsing: turns a flat argv slice into positional values and
//! option key/value pairs.
//!
//! The dispatch engine never looks at raw tokens. It builds a
//! [`TokenizerConfig`] from a command's options and hands the tokens to a
//! [`Tokenizer`]; [`FlagTokenizer`] is the default implementation.

use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::Serialize;
use std::collections::HashSet;

/// Key under which the tokenizer reports the help flag.
pub const HELP_KEY: &str = "help";

/// A single option value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<Value>),
}

impl Value {
    /// Interpret a raw token, turning numeric text into [`Value::Number`].
    pub fn from_token(raw: &str) -> Self {
        match parse_number(raw) {
            Some(n) => Self::Number(n),
            None => Self::String(raw.to_string()),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Whether the value counts as "set" for flag purposes.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::String(s) => !s.is_empty(),
            Self::List(items) => !items.is_empty(),
        }
    }
}

/// Everything the tokenizer extracted from one invocation.
///
/// Serializes as `{"_": [...], "help": bool, ...options}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedArgs {
    #[serde(rename = "_")]
    positional: Vec<String>,
    help: bool,
    #[serde(flatten)]
    options: IndexMap<String, Value>,
}

impl ParsedArgs {
    /// Positional values in the order they appeared.
    pub fn positional(&self) -> &[String] {
        self.positional.as_slice()
    }

    /// Whether the help flag was given.
    pub fn help(&self) -> bool {
        self.help
    }

    /// Option values keyed as they were supplied (name or alias).
    pub fn options(&self) -> &IndexMap<String, Value> {
        &self.options
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }

    /// Whether `key` holds a truthy value.
    pub fn flag(&self, key: &str) -> bool {
        self.options.get(key).is_some_and(Value::is_truthy)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.options.contains_key(key)
    }

    pub fn push_positional(&mut self, value: impl Into<String>) {
        self.positional.push(value.into());
    }

    pub fn set_help(&mut self, help: bool) {
        self.help = help;
    }

    /// Record a value, replacing whatever `key` held before.
    pub fn set_option(&mut self, key: impl Into<String>, value: Value) {
        self.options.insert(key.into(), value);
    }

    /// Record a value, coalescing repeated keys into a [`Value::List`].
    pub fn push_option(&mut self, key: impl Into<String>, value: Value) {
        match self.options.entry(key.into()) {
            Entry::Occupied(mut entry) => {
                match entry.get_mut() {
                    Value::List(items) => items.push(value),
                    slot => {
                        let previous = std::mem::replace(slot, Value::List(Vec::new()));
                        *slot = Value::List(vec![previous, value]);
                    }
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(value);
            }
        }
    }

    /// Remove `key`, keeping the order of the remaining options.
    pub fn take_option(&mut self, key: &str) -> Option<Value> {
        self.options.shift_remove(key)
    }
}

/// What the tokenizer needs to know about a command's options.
///
/// Without it, `--verbose file.txt` cannot be told apart from
/// `--output out.txt`: boolean names never consume the next token.
#[derive(Debug, Clone, Default)]
pub struct TokenizerConfig {
    boolean: HashSet<String>,
    aliases: IndexMap<String, String>,
}

impl TokenizerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an option that never takes a value.
    pub fn boolean(mut self, name: impl Into<String>) -> Self {
        self.boolean.insert(name.into());
        self
    }

    /// Declare `alias` as the single-character alias of `name`.
    pub fn alias(mut self, name: impl Into<String>, alias: impl Into<String>) -> Self {
        self.aliases.insert(name.into(), alias.into());
        self
    }

    /// Names declared boolean, in no particular order.
    pub fn boolean_names(&self) -> impl Iterator<Item = &str> {
        self.boolean.iter().map(String::as_str)
    }

    /// Alias registered for `name`, if any.
    pub fn alias_of(&self, name: &str) -> Option<&str> {
        self.aliases.get(name).map(String::as_str)
    }

    fn name_of_alias(&self, alias: &str) -> Option<&str> {
        self.aliases
            .iter()
            .find(|(_, a)| a.as_str() == alias)
            .map(|(name, _)| name.as_str())
    }

    /// Whether `key` (a name or an alias) refers to a boolean option.
    ///
    /// The help key is always boolean so `--help` never swallows a positional.
    pub fn is_boolean(&self, key: &str) -> bool {
        key == HELP_KEY
            || self.boolean.contains(key)
            || self
                .name_of_alias(key)
                .is_some_and(|name| self.boolean.contains(name))
    }

    /// Canonical key for a boolean `key`: the option name when `key` is an alias.
    fn boolean_key<'k>(&'k self, key: &'k str) -> &'k str {
        if key == HELP_KEY || self.boolean.contains(key) {
            return key;
        }
        self.name_of_alias(key).unwrap_or(key)
    }
}

/// Splits argv into positional values and option pairs.
pub trait Tokenizer {
    fn tokenize(&self, tokens: &[String], config: &TokenizerConfig) -> ParsedArgs;
}

/// Minimist-style tokenizer.
///
/// - `--key=value`, `--key value`, `--no-key`
/// - `-abc` sets `a`, `b` and `c`; the last one may take the next token
/// - `-n5` and `-k=v` attach a value to a single-character key
/// - `--` ends option parsing
///
/// Boolean options supplied through their alias are recorded under the option
/// name. Value options are recorded under the key exactly as supplied, so an
/// alias-keyed value stays alias-keyed.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlagTokenizer;

impl Tokenizer for FlagTokenizer {
    fn tokenize(&self, tokens: &[String], config: &TokenizerConfig) -> ParsedArgs {
        let mut parsed = ParsedArgs::default();

        let mut i = 0usize;
        while i < tokens.len() {
            let arg = tokens[i].as_str();
            let next = tokens.get(i + 1).map(String::as_str);

            if arg == "--" {
                for rest in &tokens[i + 1..] {
                    parsed.push_positional(rest.as_str());
                }
                break;
            }

            if let Some(body) = arg.strip_prefix("--") {
                i += long_flag(body, next, config, &mut parsed);
                continue;
            }

            if is_flag(arg) {
                i += short_flags(&arg[1..], next, config, &mut parsed);
                continue;
            }

            parsed.push_positional(arg);
            i += 1;
        }

        let mut defaults: Vec<&str> = config
            .boolean_names()
            .filter(|name| !parsed.contains(name))
            .collect();
        defaults.sort_unstable();
        for name in defaults {
            parsed.set_option(name, Value::Bool(false));
        }

        let help = parsed.take_option(HELP_KEY).is_some_and(|v| v.is_truthy());
        parsed.set_help(help);

        tracing::trace!(
            positional = parsed.positional.len(),
            options = parsed.options.len(),
            help,
            "tokenized arguments"
        );
        parsed
    }
}

/// Handle `--key...`; returns how many tokens were consumed.
fn long_flag(
    body: &str,
    next: Option<&str>,
    config: &TokenizerConfig,
    parsed: &mut ParsedArgs,
) -> usize {
    if let Some((key, raw)) = body.split_once('=') {
        let value = if config.is_boolean(key) {
            Value::Bool(raw != "false")
        } else {
            Value::from_token(raw)
        };
        record(key, value, config, parsed);
        return 1;
    }

    if let Some(key) = body.strip_prefix("no-") {
        record(key, Value::Bool(false), config, parsed);
        return 1;
    }

    trailing_key(body, next, config, parsed)
}

/// Handle `-abc`; `letters` excludes the leading dash.
fn short_flags(
    letters: &str,
    next: Option<&str>,
    config: &TokenizerConfig,
    parsed: &mut ParsedArgs,
) -> usize {
    let chars: Vec<(usize, char)> = letters.char_indices().collect();
    for (pos, &(offset, c)) in chars.iter().enumerate() {
        let key = c.to_string();
        if pos + 1 == chars.len() {
            return trailing_key(&key, next, config, parsed);
        }

        let rest = &letters[offset + c.len_utf8()..];
        if let Some(raw) = rest.strip_prefix('=') {
            record(&key, Value::from_token(raw), config, parsed);
            return 1;
        }
        if c.is_ascii_alphabetic() && parse_number(rest).is_some() {
            record(&key, Value::from_token(rest), config, parsed);
            return 1;
        }
        if rest.starts_with(|ch: char| !ch.is_alphanumeric() && ch != '_') {
            record(&key, Value::from_token(rest), config, parsed);
            return 1;
        }
        record(&key, Value::Bool(true), config, parsed);
    }
    1
}

/// A key that may take the following token as its value.
fn trailing_key(
    key: &str,
    next: Option<&str>,
    config: &TokenizerConfig,
    parsed: &mut ParsedArgs,
) -> usize {
    if config.is_boolean(key) {
        record(key, Value::Bool(true), config, parsed);
        return 1;
    }

    match next {
        Some(value) if !is_flag(value) && value != "--" => {
            let value = match value {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                other => Value::from_token(other),
            };
            record(key, value, config, parsed);
            2
        }
        _ => {
            record(key, Value::Bool(true), config, parsed);
            1
        }
    }
}

fn record(key: &str, value: Value, config: &TokenizerConfig, parsed: &mut ParsedArgs) {
    if config.is_boolean(key) {
        let flag = match &value {
            Value::String(s) => s != "false",
            other => other.is_truthy(),
        };
        parsed.set_option(config.boolean_key(key), Value::Bool(flag));
    } else {
        parsed.push_option(key, value);
    }
}

/// `-x`, `--x`; a lone `-` and negative numbers are values.
fn is_flag(token: &str) -> bool {
    token.len() > 1 && token.starts_with('-') && parse_number(token).is_none()
}

fn parse_number(raw: &str) -> Option<f64> {
    let (negative, body) = match raw.strip_prefix('-') {
        Some(body) => (true, body),
        None => (false, raw),
    };

    let magnitude = if let Some(hex) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        if hex.is_empty() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        u64::from_str_radix(hex, 16).ok()? as f64
    } else {
        if !body.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
            return None;
        }
        body.parse::<f64>().ok()?
    };

    Some(if negative { -magnitude } else { magnitude })
}
