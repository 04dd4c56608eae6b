use anyhow::Context;
use apstore_filters::{Check, Checks, Cursor};
use apstore_fixtures::{GeneratorConfig, GeneratorContext};
use apstore_store::{ActivityPubStorage, CollectionPage, MemoryStorage, StoreConfig};
use apstore_types::{CollectionPath, Item, ItemType};
use colored::Colorize;
use tracing::info;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => StoreConfig::from_path(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => StoreConfig::default(),
    };
    match cli.command {
        Command::Demo(args) => cmd_demo(config, args, &cli.format),
        Command::Generate(args) => cmd_generate(args, &cli.format),
        Command::Config(args) => cmd_config(config, args),
    }
}

fn cmd_demo(config: StoreConfig, args: DemoArgs, format: &OutputFormat) -> anyhow::Result<()> {
    anyhow::ensure!(args.page_size > 0, "page size must be positive");
    let types = args
        .types
        .iter()
        .map(|t| t.parse::<ItemType>())
        .collect::<Result<Vec<_>, _>>()?;

    let store = MemoryStorage::new(config);
    let mut ctx = GeneratorContext::new(GeneratorConfig {
        seed: args.seed,
        ..Default::default()
    });
    let root = ctx.root_actor();
    let outbox = CollectionPath::Outbox.of(&root.base.id);
    store.save(root.into()).context("saving root actor")?;

    let items: Vec<Item> = ctx.items(args.items).collect();
    store.add_to(&outbox, &items).context("seeding outbox")?;
    info!(outbox = %outbox, items = items.len(), "seeded outbox");

    let mut checks = Checks::default();
    if !types.is_empty() {
        checks.push(Check::has_type(types));
    }
    checks.push(Check::max_count(args.page_size));

    let mut number = 1;
    loop {
        let page = store.load_page(&outbox, &checks)?;
        print_page(number, &page, format)?;
        let Some(next) = page.next_iri() else { break };
        checks = match Cursor::from_iri(&next)? {
            Some(cursor) => cursor.checks(),
            None => break,
        };
        number += 1;
    }
    Ok(())
}

fn print_page(number: usize, page: &CollectionPage, format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&page.clone().into_item())?);
        }
        OutputFormat::Text => {
            println!(
                "{} {}  {} of {} matched, {} total",
                "page".bold(),
                number.to_string().yellow().bold(),
                page.items.len(),
                page.matched,
                page.total_items,
            );
            for item in &page.items {
                let kind = item.item_type().map_or("?", |t| t.as_str());
                println!("  {:<16} {}", kind.cyan(), item.iri());
            }
            if let Some(next) = page.next_iri() {
                println!("  {} {}", "next:".dimmed(), next.to_string().blue());
            }
        }
    }
    Ok(())
}

fn cmd_generate(args: GenerateArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let mut ctx = GeneratorContext::new(GeneratorConfig {
        seed: args.seed,
        ..Default::default()
    });
    for item in ctx.items(args.count) {
        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string(&item)?),
            OutputFormat::Text => {
                println!("{:<10} {}", item.variant_name().green(), item.iri());
            }
        }
    }
    Ok(())
}

fn cmd_config(config: StoreConfig, args: ConfigArgs) -> anyhow::Result<()> {
    let config = if args.defaults { StoreConfig::default() } else { config };
    print!("{}", config.to_toml_string()?);
    println!(
        "# enabled: {}",
        config.capabilities.enabled().join(", ").green()
    );
    Ok(())
}
