//! Help text rendering.
//!
//! Everything here is a pure function of the metadata it is given; the
//! caller decides ordering and where the text goes.

use crate::command::{Argument, OptionDef};

/// Indent before every row, and gap between columns.
pub const PADDING: usize = 4;

/// Name and description of a subcommand, as listed in its parent's help.
#[derive(Debug, Clone, Copy)]
pub struct CommandSummary<'a> {
    pub name: &'a str,
    pub description: &'a str,
}

/// Everything needed to render one help screen.
#[derive(Debug, Clone, Default)]
pub struct HelpRequest<'a> {
    /// Heading; falls back to `name`.
    pub title: Option<&'a str>,
    pub name: &'a str,
    /// Command path shown in USAGE; falls back to `name`.
    pub usage_name: Option<&'a str>,
    pub version: Option<&'a str>,
    pub description: &'a str,
    pub options: Vec<&'a OptionDef>,
    /// Rows of the ARGS block, in the order given.
    pub args: Vec<&'a Argument>,
    /// Positionals for the USAGE line in declaration order; falls back to
    /// `args` when empty.
    pub usage_args: Vec<&'a Argument>,
    pub subcommands: Vec<CommandSummary<'a>>,
}

type Row = Vec<String>;

/// `<name>` for required arguments, `[name]` for optional ones, plus `...`
/// when the argument takes every remaining value.
pub fn decorate(arg: &Argument) -> String {
    let mut out = if arg.is_optional() {
        format!("[{}]", arg.get_name())
    } else {
        format!("<{}>", arg.get_name())
    };
    if arg.is_multiple() {
        out.push_str("...");
    }
    out
}

pub fn decorate_all<'a>(args: impl IntoIterator<Item = &'a Argument>) -> String {
    args.into_iter().map(decorate).collect::<Vec<_>>().join(" ")
}

/// The single USAGE line: `name [OPTIONS] <args>` or `name [OPTIONS] [SUBCOMMAND]`.
pub fn usage_line<'a>(
    name: &str,
    has_options: bool,
    args: impl IntoIterator<Item = &'a Argument>,
    has_subcommands: bool,
) -> String {
    let mut parts: Vec<String> = vec![name.to_string()];
    if has_options {
        parts.push("[OPTIONS]".to_string());
    }
    let tail = if has_subcommands {
        "[SUBCOMMAND]".to_string()
    } else {
        decorate_all(args)
    };
    if !tail.is_empty() {
        parts.push(tail);
    }
    parts.join(" ")
}

/// `USAGE:` header followed by the indented usage line.
pub fn usage_block(line: &str) -> String {
    format!("USAGE:\n{}{}\n", " ".repeat(PADDING), line)
}

/// Render a full help screen.
pub fn render(request: &HelpRequest<'_>) -> String {
    let option_rows: Vec<Row> = request.options.iter().map(|o| option_row(o)).collect();
    let subcommand_rows: Vec<Row> = request
        .subcommands
        .iter()
        .map(|s| vec![s.name.to_string(), s.description.to_string()])
        .collect();
    let arg_rows: Vec<Row> = request
        .args
        .iter()
        .map(|a| vec![decorate(a), a.get_description().unwrap_or_default().to_string()])
        .collect();

    // OPTIONS and SUBCOMMANDS line up with each other; ARGS stands alone.
    let shared = column_widths(&[option_rows.as_slice(), subcommand_rows.as_slice()]);

    let mut out = String::new();
    out.push_str(non_empty(request.title).unwrap_or(request.name));
    if let Some(version) = non_empty(request.version) {
        out.push(' ');
        out.push_str(version);
    }
    out.push('\n');
    out.push_str(request.description);
    out.push('\n');
    out.push('\n');

    let usage_name = non_empty(request.usage_name).unwrap_or(request.name);
    let usage_args = if request.usage_args.is_empty() {
        &request.args
    } else {
        &request.usage_args
    };
    out.push_str(&usage_block(&usage_line(
        usage_name,
        !request.options.is_empty(),
        usage_args.iter().copied(),
        !request.subcommands.is_empty(),
    )));

    if !option_rows.is_empty() {
        out.push('\n');
        out.push_str(&section("OPTIONS:", &option_rows, &shared));
    }
    if !subcommand_rows.is_empty() {
        out.push('\n');
        out.push_str(&section("SUBCOMMANDS:", &subcommand_rows, &shared));
    }
    if !arg_rows.is_empty() {
        out.push('\n');
        out.push_str(&section("ARGS:", &arg_rows, &column_widths(&[arg_rows.as_slice()])));
    }
    out
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn option_row(option: &OptionDef) -> Row {
    let mut flag = match option.get_alias() {
        Some(alias) => format!("-{alias}, "),
        None => " ".repeat(PADDING),
    };
    flag.push_str("--");
    flag.push_str(option.get_name());
    if !option.get_args().is_empty() {
        flag.push(' ');
        flag.push_str(&decorate_all(option.get_args()));
    }
    vec![flag, option.get_description().to_string()]
}

/// Widest line per column across every row of every collection.
fn column_widths(collections: &[&[Row]]) -> Vec<usize> {
    let mut widths: Vec<usize> = Vec::new();
    for rows in collections {
        for row in rows.iter() {
            for (index, value) in row.iter().enumerate() {
                let longest = value.split('\n').map(|l| l.chars().count()).max().unwrap_or(0);
                if widths.len() <= index {
                    widths.resize(index + 1, 0);
                }
                widths[index] = widths[index].max(longest);
            }
        }
    }
    widths
}

fn section(header: &str, rows: &[Row], widths: &[usize]) -> String {
    let mut out = String::new();
    out.push_str(header);
    out.push('\n');
    for row in rows {
        for line in render_row(row, widths).lines() {
            out.push_str(line.trim_end());
            out.push('\n');
        }
    }
    out
}

fn render_row(row: &[String], widths: &[usize]) -> String {
    let mut out = String::new();
    let mut column_start = PADDING;
    for (index, value) in row.iter().enumerate() {
        let width = widths.get(index).copied().unwrap_or(0);
        let mut lines = value.split('\n');
        let first = lines.next().unwrap_or_default();

        out.push_str(&" ".repeat(PADDING));
        out.push_str(&format!("{first:<width$}"));
        for continuation in lines {
            out.push('\n');
            out.push_str(&" ".repeat(column_start));
            out.push_str(continuation);
        }
        column_start += width + PADDING;
    }
    out
}
