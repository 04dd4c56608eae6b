use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "apstore",
    about = "In-memory ActivityPub object store",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Store configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Seed a root actor's outbox and page through it
    Demo(DemoArgs),
    /// Print random fixture items
    Generate(GenerateArgs),
    /// Show the effective store configuration
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct DemoArgs {
    /// Number of items added to the outbox
    #[arg(short = 'n', long, default_value = "20")]
    pub items: usize,
    /// Items per page
    #[arg(short = 'p', long, default_value = "5")]
    pub page_size: usize,
    /// Keep only members of these types (repeatable)
    #[arg(short = 't', long = "type")]
    pub types: Vec<String>,
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Args)]
pub struct GenerateArgs {
    #[arg(short = 'n', long, default_value = "5")]
    pub count: usize,
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Print the built-in defaults instead of the loaded file
    #[arg(long)]
    pub defaults: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_demo_defaults() {
        let cli = Cli::try_parse_from(["apstore", "demo"]).unwrap();
        if let Command::Demo(args) = cli.command {
            assert_eq!(args.items, 20);
            assert_eq!(args.page_size, 5);
            assert!(args.types.is_empty());
            assert!(args.seed.is_none());
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_demo_filters() {
        let cli = Cli::try_parse_from([
            "apstore", "demo", "-n", "50", "--page-size", "10", "--type", "Note", "-t", "Article",
            "--seed", "7",
        ])
        .unwrap();
        if let Command::Demo(args) = cli.command {
            assert_eq!(args.items, 50);
            assert_eq!(args.page_size, 10);
            assert_eq!(args.types, vec!["Note", "Article"]);
            assert_eq!(args.seed, Some(7));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_generate() {
        let cli = Cli::try_parse_from(["apstore", "generate", "--count", "3"]).unwrap();
        if let Command::Generate(args) = cli.command {
            assert_eq!(args.count, 3);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_global_config_path() {
        let cli = Cli::try_parse_from(["apstore", "config", "--config", "store.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("store.toml")));
        assert!(matches!(cli.command, Command::Config(_)));
    }

    #[test]
    fn parse_json_format() {
        let cli = Cli::try_parse_from(["apstore", "--format", "json", "generate"]).unwrap();
        assert!(matches!(cli.format, OutputFormat::Json));
    }
}
