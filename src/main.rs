mod aggregate;
mod dashboard;
mod error;
mod loader;
mod models;
mod tui;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use dashboard::{ChartView, Dashboard, DataPaths, SetSummary};
use models::JsonOutput;

const DATA_ENV: &str = "STUDYDASH_DATA";
const DEFAULT_DATA_DIR: &str = "data";

#[derive(Parser)]
#[command(name = "studydash")]
#[command(about = "Charts daily counts, coverage and accuracy of problem-set practice")]
#[command(version)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Problem-set catalog (JSON list of {name, amount})
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Exercise log (CSV with date,name,sequence,correct,incorrect)
    #[arg(long, global = true)]
    log: Option<PathBuf>,

    /// Include the full raw table, not just the plotted columns
    #[arg(long, global = true)]
    raw: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Attempts per day and problem set
    Daily,

    /// Cumulative percentage of distinct items attempted
    Coverage,

    /// Percent correct over each item's latest outcome
    Accuracy,

    /// Per problem set summary
    Sets,

    /// Launch interactive terminal dashboard
    Tui,
}

fn data_dir() -> PathBuf {
    if let Ok(path) = std::env::var(DATA_ENV) {
        return PathBuf::from(path);
    }

    let local = PathBuf::from(DEFAULT_DATA_DIR);
    if local.is_dir() {
        return local;
    }

    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("studydash")
}

fn resolve_paths(catalog: Option<PathBuf>, log: Option<PathBuf>) -> DataPaths {
    let defaults = DataPaths::in_dir(&data_dir());
    DataPaths {
        catalog: catalog.unwrap_or(defaults.catalog),
        log: log.unwrap_or(defaults.log),
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    let json = cli.json;

    if let Err(e) = run(cli) {
        if json {
            if let Ok(out) = serde_json::to_string(&JsonOutput::<()>::err(e.to_string())) {
                println!("{}", out);
            }
        }
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> error::Result<()> {
    let paths = resolve_paths(cli.catalog, cli.log);
    let dash = Dashboard::load(&paths, cli.raw)?;

    match cli.command {
        Commands::Daily => print_view(&dash.daily, cli.json)?,
        Commands::Coverage => print_view(&dash.coverage, cli.json)?,
        Commands::Accuracy => print_view(&dash.accuracy, cli.json)?,

        Commands::Sets => {
            let summaries = dash.summaries();
            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::ok(&summaries))?);
            } else if summaries.is_empty() {
                println!("No problem sets found.");
            } else {
                print_summaries(&summaries);
            }
        }

        Commands::Tui => {
            tui::run(dash)?;
        }
    }

    Ok(())
}

fn print_view(view: &ChartView, json: bool) -> error::Result<()> {
    if json {
        println!("{}", serde_json::to_string(&JsonOutput::ok(view))?);
        return Ok(());
    }

    println!("=== {} ===", view.title);
    if view.table.is_empty() {
        println!("No attempts logged yet.");
        return Ok(());
    }

    let labels: Vec<&str> = if view.show_raw {
        view.table.labels()
    } else {
        view.columns.iter().map(String::as_str).collect()
    };
    let widths: Vec<usize> = labels.iter().map(|l| l.chars().count().max(8)).collect();

    let mut header = format!("{:<12}", "DATE");
    for (label, width) in labels.iter().zip(&widths) {
        header.push_str(&format!(" {:>width$}", label, width = width));
    }
    println!("{}", header);
    println!("{}", "-".repeat(header.chars().count()));

    for (i, date) in view.table.dates.iter().enumerate() {
        let mut line = format!("{:<12}", date.to_string());
        for (label, width) in labels.iter().zip(&widths) {
            let value = view
                .table
                .column(label)
                .map(|c| c.values[i])
                .unwrap_or(0.0);
            line.push_str(&format!(" {:>width$}", view.kind.format(value), width = width));
        }
        println!("{}", line);
    }

    Ok(())
}

fn print_summaries(summaries: &[SetSummary]) {
    let pct = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |p| format!("{:.1}", p));

    println!(
        "{:<30} {:>7} {:>9} {:>7} {:>10} {:>10}",
        "NAME", "AMOUNT", "ATTEMPTS", "ITEMS", "COVERAGE%", "ACCURACY%"
    );
    println!("{}", "-".repeat(78));
    for s in summaries {
        let name = if s.known {
            truncate(&s.name, 28)
        } else {
            format!("{}*", truncate(&s.name, 27))
        };
        println!(
            "{:<30} {:>7} {:>9} {:>7} {:>10} {:>10}",
            name,
            s.amount,
            s.attempts,
            s.distinct_items,
            pct(s.coverage),
            pct(s.accuracy)
        );
    }
    if summaries.iter().any(|s| !s.known) {
        println!();
        println!("* not in both catalog and log, excluded from charts");
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    mod truncate_tests {
        use super::*;

        #[test]
        fn truncate_short_string() {
            assert_eq!(truncate("hello", 10), "hello");
        }

        #[test]
        fn truncate_exact_length() {
            assert_eq!(truncate("hello", 5), "hello");
        }

        #[test]
        fn truncate_long_string() {
            assert_eq!(truncate("hello world", 8), "hello...");
        }

        #[test]
        fn truncate_multibyte_names() {
            assert_eq!(truncate("基本情報技術者試験", 6), "基本情...");
        }
    }

    mod cli_parsing_tests {
        use super::*;

        #[test]
        fn parse_daily_command() {
            let cli = Cli::try_parse_from(["studydash", "daily"]).unwrap();
            assert!(!cli.json);
            assert!(!cli.raw);
            assert!(matches!(cli.command, Commands::Daily));
        }

        #[test]
        fn parse_each_view_command() {
            let cli = Cli::try_parse_from(["studydash", "coverage"]).unwrap();
            assert!(matches!(cli.command, Commands::Coverage));
            let cli = Cli::try_parse_from(["studydash", "accuracy"]).unwrap();
            assert!(matches!(cli.command, Commands::Accuracy));
            let cli = Cli::try_parse_from(["studydash", "sets"]).unwrap();
            assert!(matches!(cli.command, Commands::Sets));
            let cli = Cli::try_parse_from(["studydash", "tui"]).unwrap();
            assert!(matches!(cli.command, Commands::Tui));
        }

        #[test]
        fn parse_paths() {
            let cli = Cli::try_parse_from([
                "studydash",
                "--catalog",
                "sets.json",
                "daily",
                "--log",
                "log.csv",
            ])
            .unwrap();
            assert_eq!(cli.catalog, Some(PathBuf::from("sets.json")));
            assert_eq!(cli.log, Some(PathBuf::from("log.csv")));
        }

        #[test]
        fn parse_global_flags_after_subcommand() {
            let cli = Cli::try_parse_from(["studydash", "accuracy", "--json", "--raw"]).unwrap();
            assert!(cli.json);
            assert!(cli.raw);
        }

        #[test]
        fn parse_requires_subcommand() {
            assert!(Cli::try_parse_from(["studydash"]).is_err());
            assert!(Cli::try_parse_from(["studydash", "invalid"]).is_err());
        }
    }

    mod data_path_tests {
        use super::*;
        use std::env;

        #[test]
        fn resolve_paths_precedence() {
            env::set_var(DATA_ENV, "/tmp/studydash-test");
            let paths = resolve_paths(None, None);
            assert_eq!(paths.catalog, PathBuf::from("/tmp/studydash-test/info.json"));
            assert_eq!(paths.log, PathBuf::from("/tmp/studydash-test/result.csv"));

            let paths = resolve_paths(Some(PathBuf::from("mine.json")), None);
            assert_eq!(paths.catalog, PathBuf::from("mine.json"));
            assert_eq!(paths.log, PathBuf::from("/tmp/studydash-test/result.csv"));

            env::remove_var(DATA_ENV);
            let paths = resolve_paths(None, None);
            assert!(paths.catalog.ends_with("info.json"));
            assert!(paths.log.ends_with("result.csv"));
        }
    }
}
