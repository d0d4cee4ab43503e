//! DSLX parser CLI
//!
//! Main entry point for the `dslxp` command.

use clap::{Parser, Subcommand};
use dslx_parser::config::{ConfigFile, ParserConfig};
use dslx_parser::{Bindings, SourceFile, lexer};
use miette::Result;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "dslxp")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Parser and scope resolver for the DSLX hardware description language", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// TOML file with `[parser]` defaults
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a DSLX module and list its top-level members
    Parse {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print every member with its body
        #[arg(long)]
        show_ast: bool,

        /// Module name (defaults to the file stem)
        #[arg(long)]
        module_name: Option<String>,
    },

    /// Dump the token stream of a file
    Tokens {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Emit JSON instead of one token per line
        #[arg(long)]
        json: bool,
    },

    /// Parse a single expression against the builtin scope
    Expr {
        /// Expression text
        text: String,
    },

    /// Show information about the parser
    Info,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Parse {
            input,
            show_ast,
            module_name,
        } => parse(&input, module_name, show_ast, config),
        Commands::Tokens { input, json } => tokens(&input, json),
        Commands::Expr { text } => expr(&text, config),
        Commands::Info => info(config),
    }
}

fn load_config(path: Option<&Path>) -> Result<ParserConfig> {
    let Some(path) = path else {
        return Ok(ParserConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| miette::miette!("Failed to read config file: {}", e))?;
    let file = ConfigFile::from_toml_str(&text)
        .map_err(|e| miette::miette!("Invalid config file {}: {}", path.display(), e))?;
    tracing::debug!(?file, "loaded config");
    Ok(file.parser)
}

fn read_source(input: &Path) -> Result<String> {
    std::fs::read_to_string(input).map_err(|e| miette::miette!("Failed to read input file: {}", e))
}

fn parse(
    input: &Path,
    module_name: Option<String>,
    show_ast: bool,
    config: ParserConfig,
) -> Result<()> {
    let source = read_source(input)?;
    let name = module_name.unwrap_or_else(|| {
        input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "main".to_string())
    });
    let file = SourceFile::new(input.display().to_string(), source.as_str());

    tracing::info!(module = %name, "parsing");
    let module = dslx_parser::parse_module_with_config(&name, &source, config)
        .map_err(|err| file.report(err))?;

    for member in module.top() {
        if show_ast {
            println!("{}", module.render_member(*member));
        } else {
            println!("{:?}", member);
        }
    }
    let tests = module.test_names();
    println!(
        "{}: {} members, {} tests",
        module.name(),
        module.top().len(),
        tests.len()
    );
    Ok(())
}

fn tokens(input: &Path, json: bool) -> Result<()> {
    let source = read_source(input)?;
    let file = SourceFile::new(input.display().to_string(), source.as_str());
    let tokens = lexer::lex(&source).map_err(|err| file.report(err))?;

    if json {
        let json = serde_json::to_string_pretty(&tokens)
            .map_err(|e| miette::miette!("Failed to serialize tokens: {}", e))?;
        println!("{}", json);
    } else {
        for token in &tokens {
            let kind = format!("{:?}", token.kind);
            println!("{:>10}  {:<12} {}", token.span.to_string(), kind, token.text);
        }
    }
    Ok(())
}

fn expr(text: &str, config: ParserConfig) -> Result<()> {
    let file = SourceFile::new("<expr>", text);
    let tokens = lexer::lex(text).map_err(|err| file.report(err))?;
    let mut parser = dslx_parser::Parser::new("expr", &tokens).with_config(config);
    let mut bindings = Bindings::with_builtins();
    let id = parser
        .parse_expression(&mut bindings)
        .map_err(|err| file.report(err))?;
    if !parser.is_at_end() {
        return Err(miette::miette!("trailing input after expression"));
    }
    println!("{}", parser.module().render_expr(id));
    Ok(())
}

fn info(config: ParserConfig) -> Result<()> {
    println!("DSLX parser");
    println!("Version: {}", dslx_parser::VERSION);
    println!();
    println!("Grammar options:");
    println!(
        "  - let terminator: {}",
        if config.let_terminator_is_semi { "`;`" } else { "`in`" }
    );
    println!();
    println!("Builtins:");
    println!("  {}", dslx_parser::bindings::BUILTIN_NAMES.join(", "));
    Ok(())
}
