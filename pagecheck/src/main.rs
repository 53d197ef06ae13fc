//! # pagecheck
//!
//! A CLI for trying out paging fixtures without a cluster.
//!
//! ## Overview
//!
//! pagecheck is built on top of pagechecklib. It reads a pipe-delimited
//! fixture file, loads it into a fresh in-memory store and pages through it
//! with a chosen fetch size, reporting the page boundaries it saw and whether
//! the paged rows match the fixture.
//!
//! ## Usage
//!
//! ```bash
//! # Show the expanded fixture (multiplier rows applied)
//! pagecheck expand fixture.txt
//!
//! # Page through it five rows at a time
//! pagecheck page fixture.txt --fetch-size 5
//!
//! # Composite key, limited query, JSON output
//! pagecheck page fixture.txt --fetch-size 2 --key-columns 2 --limit 3 --output json
//!
//! # Show fixture inserts and page boundaries as they happen
//! pagecheck -v page fixture.txt --fetch-size 2
//! ```

mod render;

use std::ffi::OsString;
use std::process::ExitCode;

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use outstanding::cli::{App, CommandContext, HandlerResult, Output, RunResult};
use pagechecklib::{
    create_rows, Cursor, DataTable, DataTableParser, Formatter, FormatterSet, MemoryStore, PageStream,
    PagingReport, StoreOptions, TableSpec, DEFAULT_FETCH_SIZE,
};
use serde_json::json;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use render::{create_theme, table_context, EXPAND_TEMPLATE, PAGE_TEMPLATE};

fn file_arg() -> Arg {
    Arg::new("file").help("Fixture table file").required(true)
}

fn delimiter_arg() -> Arg {
    Arg::new("delimiter")
        .short('d')
        .long("delimiter")
        .value_parser(value_parser!(char))
        .default_value("|")
        .help("Cell delimiter")
}

/// Build the clap Command structure
fn build_command() -> Command {
    Command::new("pagecheck")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Arthur Debert")
        .about("Expand fixture tables and page through them against an in-memory store")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log fixture loading and page boundaries to stderr"),
        )
        .subcommand(
            Command::new("expand")
                .about("Parse a fixture table and show its expanded rows")
                .arg(file_arg())
                .arg(delimiter_arg()),
        )
        .subcommand(
            Command::new("page")
                .about("Load a fixture and page through it")
                .arg(file_arg())
                .arg(delimiter_arg())
                .arg(
                    Arg::new("table")
                        .short('t')
                        .long("table")
                        .default_value("paging_test")
                        .help("Name of the table to load into"),
                )
                .arg(
                    Arg::new("fetch-size")
                        .short('f')
                        .long("fetch-size")
                        .value_parser(value_parser!(i32))
                        .allow_negative_numbers(true)
                        .required(true)
                        .help("Rows per fetch (zero or less uses the store default)"),
                )
                .arg(
                    Arg::new("key-columns")
                        .short('k')
                        .long("key-columns")
                        .value_parser(value_parser!(usize))
                        .default_value("1")
                        .help("Number of leading columns forming the primary key"),
                )
                .arg(
                    Arg::new("limit")
                        .short('l')
                        .long("limit")
                        .value_parser(value_parser!(usize))
                        .help("Add a LIMIT to the query"),
                ),
        )
}

/// Install the log subscriber; `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Read and parse the fixture named by the `file` argument
fn read_fixture(matches: &ArgMatches) -> Result<(String, TableSpec), anyhow::Error> {
    let path = matches
        .get_one::<String>("file")
        .context("missing fixture file")?;
    let delimiter = matches.get_one::<char>("delimiter").copied().unwrap_or('|');

    let text =
        std::fs::read_to_string(path).with_context(|| format!("cannot read fixture {}", path))?;
    let spec = DataTableParser::new()
        .delimiter(delimiter)
        .parse(&text)
        .with_context(|| format!("cannot parse fixture {}", path))?;
    Ok((path.clone(), spec))
}

/// Handler for expand command
fn expand_handler(matches: &ArgMatches, ctx: &CommandContext) -> HandlerResult<serde_json::Value> {
    let (path, spec) = read_fixture(matches)?;
    info!(file = %path, rows = spec.row_count(), "expanded fixture");

    if ctx.output_mode.is_structured() {
        return Ok(Output::Render(serde_json::to_value(&spec)?));
    }

    let table = DataTable::from_spec(&spec).with_title(path);
    Ok(Output::Render(serde_json::to_value(table_context(&table))?))
}

/// Handler for page command
fn page_handler(matches: &ArgMatches, ctx: &CommandContext) -> HandlerResult<serde_json::Value> {
    let (path, spec) = read_fixture(matches)?;
    let table = matches
        .get_one::<String>("table")
        .map(|s| s.as_str())
        .unwrap_or("paging_test");
    let fetch_size = matches
        .get_one::<i32>("fetch-size")
        .copied()
        .unwrap_or(DEFAULT_FETCH_SIZE as i32);
    let key_columns = matches.get_one::<usize>("key-columns").copied().unwrap_or(1);
    let limit = matches.get_one::<usize>("limit").copied();

    let mut store = MemoryStore::new(StoreOptions::new().with_key_columns(key_columns));
    store.create_table_for(table, &spec)?;
    let formatters = FormatterSet::uniform(Formatter::literal(), spec.column_count());
    let baseline = create_rows(spec, &mut store, table, Some(&formatters))
        .with_context(|| format!("cannot load {} into {}", path, table))?;

    let statement = match limit {
        Some(n) => format!("SELECT * FROM {} LIMIT {}", table, n),
        None => format!("SELECT * FROM {}", table),
    };
    debug!(%statement, fetch_size, "paging");

    let mut stream = PageStream::new(store.query(&statement, fetch_size)?);
    stream.get_all_pages()?;

    let report = match limit {
        Some(_) => PagingReport::within(&stream, &baseline),
        None => PagingReport::new(&stream, &baseline),
    };
    info!(pages = report.page_count, rows = report.total_rows, "paged");

    if let Some(mismatch) = &report.mismatch {
        return Err(anyhow::anyhow!(
            "paged rows {:?} do not match {}: {}",
            report.page_sizes,
            path,
            mismatch
        ));
    }

    if ctx.output_mode.is_structured() {
        return Ok(Output::Render(json!({
            "table": table,
            "statement": statement,
            "fetch_size": fetch_size,
            "report": report,
            "pages": stream.pages(),
        })));
    }

    let title = format!("{} (fetch size {})", statement, fetch_size);
    let data = DataTable::from_pages(stream.cursor().columns(), stream.pages()).with_title(title);
    let mut value = serde_json::to_value(table_context(&data))?;
    value["page_sizes"] = json!(format!("{:?}", report.page_sizes));
    value["summary"] = json!(format!(
        "{} of {} fixture rows in {} pages",
        report.total_rows, report.baseline_rows, report.page_count
    ));
    Ok(Output::Render(value))
}

/// Whether `-v` was given; help, version and usage errors count as quiet.
///
/// Parsed ahead of the `App` so logging is set up before any handler runs.
/// `--output` is added by the `App`, so it is declared here as well.
fn verbose_requested<I, T>(cmd: Command, args: I) -> bool
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    cmd.arg(
        Arg::new("output")
            .long("output")
            .global(true)
            .hide(true),
    )
    .try_get_matches_from(args)
    .map(|matches| matches.get_flag("verbose"))
    .unwrap_or(false)
}

fn main() -> ExitCode {
    let cmd = build_command();
    init_tracing(verbose_requested(cmd.clone(), std::env::args()));

    let theme = create_theme();

    let result = App::builder()
        .theme(theme)
        .command("expand", expand_handler, EXPAND_TEMPLATE)
        .command("page", page_handler, PAGE_TEMPLATE)
        .run_to_string(cmd, std::env::args());

    match result {
        RunResult::Handled(output) => {
            if !output.is_empty() {
                if output.starts_with("Error:") {
                    eprintln!("{}", output);
                    return ExitCode::FAILURE;
                }
                print!("{}", output);
            }
            ExitCode::SUCCESS
        }
        RunResult::Binary(_, _) => ExitCode::SUCCESS,
        RunResult::NoMatch(_) => {
            eprintln!("Error: no command given (try --help)");
            ExitCode::FAILURE
        }
    }
}
