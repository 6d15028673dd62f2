use anyhow::{Context, Result};
use cmdtree::{Argument, Dispatch, OptionDef, ParsedArgs, Program};
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt};

const DESCRIPTION: &str = "logs parsed arguments and options";
const VERSION: &str = "1.0.1";

/// Exit status for invocations rejected by the command tree.
const USAGE_ERROR: u8 = 2;

fn main() -> Result<ExitCode> {
    init_tracing();

    let program = build_program().context("invalid command definition")?;
    let tokens: Vec<String> = std::env::args().skip(1).collect();

    match program.parse(&tokens) {
        Dispatch::Handled(result) => {
            result?;
            Ok(ExitCode::SUCCESS)
        }
        Dispatch::Help | Dispatch::Parsed(_) => Ok(ExitCode::SUCCESS),
        Dispatch::Rejected(err) => {
            tracing::debug!(?err, "invocation rejected");
            Ok(ExitCode::from(USAGE_ERROR))
        }
    }
}

fn build_program() -> Result<Program<Result<()>>> {
    let mut program = Program::new("logger", DESCRIPTION);
    program.version(VERSION).handler(log);

    program
        .command("log", DESCRIPTION)
        .option(
            OptionDef::new("quiet", "Suppress diagnostic output")
                .alias("q")
                .boolean(),
        )?
        .argument(Argument::new("argument").optional().multiple())?
        .handler(log);

    Ok(program)
}

/// Print the parsed arguments as JSON unless `--quiet` was given.
fn log(args: ParsedArgs) -> Result<()> {
    if args.flag("quiet") {
        tracing::debug!("quiet, skipping output");
        return Ok(());
    }
    let json = serde_json::to_string_pretty(&args).context("failed to serialize arguments")?;
    println!("{json}");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
