use clap::{Parser as ClapParser, Subcommand};
use odata_filter::cli::{self, CheckOptions, CheckResult, CliError};
use std::io::{self, Read};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "odata-filter")]
#[command(about = "Parse, check and format OData $filter expressions")]
#[command(version)]
struct Cli {
    /// Log parser and validator decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a filter and optionally validate it against a schema
    Check {
        /// The filter query (reads from stdin if not provided)
        query: Option<String>,

        /// JSON schema file with fields and enum types
        #[arg(short, long)]
        schema: Option<String>,

        /// Only validate syntax, skip the schema
        #[arg(long)]
        syntax_only: bool,
    },

    /// Print the token stream
    Tokens {
        query: Option<String>,
    },

    /// Print the AST as JSON
    Ast {
        query: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Print the canonical form of a filter
    Fmt {
        query: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Check {
            query,
            schema,
            syntax_only,
        } => run_check(query, schema, syntax_only),
        Commands::Tokens { query } => read_query(query)
            .and_then(|q| cli::token_table(&q).map_err(CliError::from))
            .map(|table| println!("{}", table)),
        Commands::Ast { query, pretty } => read_query(query)
            .and_then(|q| cli::ast_json(&q, pretty))
            .map(|json| println!("{}", json)),
        Commands::Fmt { query } => read_query(query)
            .and_then(|q| cli::format_query(&q).map_err(CliError::from))
            .map(|text| println!("{}", text)),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "odata_filter=debug"
    } else {
        "odata_filter=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// The query argument, or stdin when it is piped.
fn read_query(query: Option<String>) -> Result<String, CliError> {
    match query {
        Some(q) => Ok(q),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer.trim_end().to_string())
        }
        None => Err(CliError::NoInput),
    }
}

fn run_check(
    query: Option<String>,
    schema: Option<String>,
    syntax_only: bool,
) -> Result<(), CliError> {
    let options = CheckOptions {
        query: read_query(query)?,
        schema,
        syntax_only,
    };

    match cli::execute_check(&options)? {
        CheckResult::SyntaxValid(canonical) => {
            println!("Syntax is valid");
            println!("{}", canonical);
        }
        CheckResult::Valid { canonical, ty } => {
            println!("Filter is valid ({})", ty);
            println!("{}", canonical);
        }
    }
    Ok(())
}
