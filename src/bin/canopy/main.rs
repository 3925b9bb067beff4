//! Binary entry point for the Canopy category browser.
#![forbid(unsafe_code)]

mod ui;

use std::path::{Path, PathBuf};

use canopy::{
    cli::{
        render::{keys_named, walk, TreeLine},
        seed::{import_seed, load_seed},
        CliError,
    },
    config::CanopyConfig,
    model::CATEGORY_FIELDS,
    storage::{ChildOrder, StoreOptions},
    CategoryStore, TreeCache,
};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::ui::Ui;

#[derive(Parser, Debug)]
#[command(
    name = "canopy",
    version,
    about = "Browse and edit a hierarchy of categories",
    disable_help_subcommand = true
)]
struct Cli {
    #[arg(
        long,
        global = true,
        env = "CANOPY_CONFIG",
        value_name = "FILE",
        help = "Configuration file (defaults to the per-user config directory)"
    )]
    config: Option<PathBuf>,

    #[arg(long, global = true, value_enum, help = "Override the child listing order")]
    order: Option<OrderArg>,

    #[arg(long, global = true, help = "Disable colors and icons")]
    plain: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a seed file and print its hierarchy.
    Tree {
        #[arg(long, value_name = "FILE", help = "JSON seed file")]
        seed: PathBuf,
    },
    /// Load a seed file, delete categories by name and print the result.
    Delete {
        #[arg(long, value_name = "FILE", help = "JSON seed file")]
        seed: PathBuf,

        #[arg(value_name = "NAME", required = true, help = "Names of categories to delete")]
        names: Vec<String>,
    },
    /// List the properties a category exposes.
    Fields,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OrderArg {
    Name,
    Insertion,
}

impl From<OrderArg> for ChildOrder {
    fn from(order: OrderArg) -> Self {
        match order {
            OrderArg::Name => ChildOrder::Name,
            OrderArg::Insertion => ChildOrder::Insertion,
        }
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), CliError> {
    let cli = Cli::parse();
    let config = CanopyConfig::load_or_default(cli.config.clone())?;
    init_tracing(&config)?;
    let ui = Ui::new(cli.plain);

    let mut options = config.store;
    if let Some(order) = cli.order {
        options.child_order = order.into();
    }

    match cli.command {
        Command::Tree { seed } => {
            let store = seeded_store(&seed, options)?;
            let lines = tree_lines(&store)?;
            ui.heading(&format!("{} ({} categories)", seed.display(), lines.len()));
            ui.tree(&lines);
        }
        Command::Delete { seed, names } => {
            let mut store = seeded_store(&seed, options)?;
            let lines = tree_lines(&store)?;
            let mut targets = Vec::new();
            for name in &names {
                let keys = keys_named(&lines, name);
                if keys.is_empty() {
                    return Err(format!("no category named '{name}'").into());
                }
                targets.extend(keys);
            }

            let mut deleted = 0;
            let mut reparented = 0;
            for key in targets {
                // repeated names resolve to the same key
                let Some(category) = store.find(key)? else {
                    continue;
                };
                reparented += store.children(key)?.len();
                store.delete(&category)?;
                deleted += 1;
                info!(%key, name = %category.name, "deleted category");
            }
            ui.success(&format!(
                "deleted {deleted} categor{}, reparented {reparented} child{}",
                if deleted == 1 { "y" } else { "ies" },
                if reparented == 1 { "" } else { "ren" }
            ));

            let lines = tree_lines(&store)?;
            ui.heading(&format!("{} ({} categories)", seed.display(), lines.len()));
            ui.tree(&lines);
        }
        Command::Fields => {
            ui.section(
                "Category fields",
                CATEGORY_FIELDS.iter().map(|field| {
                    let access = if field.is_writable() {
                        "writable"
                    } else {
                        "read-only"
                    };
                    (field.name, format!("{} ({access})", field.kind))
                }),
            );
        }
    }
    Ok(())
}

fn init_tracing(config: &CanopyConfig) -> Result<(), CliError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => config.env_filter()?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| CliError::Message(format!("failed to install logger: {err}")))
}

fn seeded_store(seed: &Path, options: StoreOptions) -> Result<CategoryStore, CliError> {
    let nodes = load_seed(seed)?;
    let mut store = CategoryStore::in_memory(options);
    let summary = import_seed(&mut store, &nodes)?;
    info!(
        inserted = summary.inserted,
        roots = summary.roots,
        path = %seed.display(),
        "loaded seed file"
    );
    Ok(store)
}

fn tree_lines(store: &CategoryStore) -> Result<Vec<TreeLine>, CliError> {
    let cache = TreeCache::new(store);
    cache.refresh()?;
    Ok(walk(&cache)?)
}
