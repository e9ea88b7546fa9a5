use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use boussole_core::{display_for, Intent, Lexicon, Locale, SearchRouter};
use boussole_observability::init_tracing;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "boussole")]
#[command(about = "Classify search queries and resolve their routes")]
struct Cli {
    /// JSON lexicon to use instead of the built-in tables.
    #[arg(long, env = "BOUSSOLE_LEXICON_PATH", global = true)]
    lexicon: Option<PathBuf>,

    #[arg(long, env = "BOUSSOLE_DEFAULT_LOCALE", default_value = "en", global = true)]
    default_locale: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the full resolution as JSON.
    Classify {
        #[arg(required = true)]
        query: Vec<String>,
        #[arg(long)]
        locale: Option<String>,
    },
    /// Print only the route.
    Route {
        #[arg(required = true)]
        query: Vec<String>,
        #[arg(long)]
        locale: Option<String>,
    },
    Display {
        intent: String,
    },
    Lexicon {
        #[command(subcommand)]
        command: LexiconCommand,
    },
    /// Read queries from stdin, one per line.
    Repl {
        #[arg(long)]
        locale: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
enum LexiconCommand {
    Check,
    /// Print the active lexicon as JSON, usable as a starting file.
    Dump,
}

fn main() -> Result<()> {
    init_tracing("boussole_cli");
    let cli = Cli::parse();

    let default_locale = parse_locale(&cli.default_locale)?;
    let router = build_router(cli.lexicon.as_ref(), default_locale)?;

    match cli.command {
        Command::Classify { query, locale } => {
            let locale = locale.as_deref().map(parse_locale).transpose()?;
            let resolution = router.resolve(&query.join(" "), locale);
            println!("{}", serde_json::to_string_pretty(&resolution)?);
        }
        Command::Route { query, locale } => {
            let locale = locale.as_deref().map(parse_locale).transpose()?;
            println!("{}", router.resolve(&query.join(" "), locale).route);
        }
        Command::Display { intent } => {
            let Some(intent) = Intent::parse(&intent) else {
                bail!("unknown intent `{intent}`");
            };
            println!("{}", serde_json::to_string_pretty(&display_for(intent))?);
        }
        Command::Lexicon { command } => match command {
            LexiconCommand::Check => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&router.lexicon().summary())?
                );
            }
            LexiconCommand::Dump => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&router.lexicon().to_source())?
                );
            }
        },
        Command::Repl { locale } => {
            let locale = locale.as_deref().map(parse_locale).transpose()?;
            run_repl(&router, locale)?;
        }
    }

    Ok(())
}

fn run_repl(router: &SearchRouter, locale: Option<Locale>) -> Result<()> {
    println!("Boussole search router. type 'exit' to quit.");

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }

        let query = line.trim();
        if query.eq_ignore_ascii_case("exit") || query.eq_ignore_ascii_case("quit") {
            break;
        }

        let resolution = router.resolve(query, locale);
        let display = resolution.display;
        println!(
            "{} [{}] via {:?}",
            resolution.classification.intent.as_str(),
            display.icon,
            resolution.rule
        );
        if let Some(sector) = resolution.classification.matched_sector.as_deref() {
            println!("  sector:   {sector}");
        }
        if let Some(code) = resolution.classification.location_code.as_deref() {
            println!("  location: {code}");
        }
        println!("  route:    {}\n", resolution.route);
    }

    Ok(())
}

fn parse_locale(value: &str) -> Result<Locale> {
    Locale::parse(value).with_context(|| format!("unsupported locale `{value}` (use en, fr or ar)"))
}

fn build_router(lexicon_path: Option<&PathBuf>, default_locale: Locale) -> Result<SearchRouter> {
    let lexicon = match lexicon_path {
        Some(path) => Arc::new(
            Lexicon::from_json_file(path)
                .with_context(|| format!("failed loading lexicon from {}", path.display()))?,
        ),
        None => Lexicon::builtin(),
    };

    Ok(SearchRouter::new(lexicon, default_locale))
}
