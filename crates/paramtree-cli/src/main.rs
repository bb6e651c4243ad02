use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use colored::Colorize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use paramtree_core::config::Config;
use paramtree_core::{
    render_tree, CategoryId, CategoryRegistry, CategoryTree, CategoryView, LayoutIndex,
    ParamError, ParameterFactory, ParameterItem, Result, TraversalOrder, TreeLayout,
};

mod args;
use args::{Cli, Commands, ConfigAction, Order, Shell};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let base_dir = resolve_base_dir(cli.base_dir);
    let config = Config::load(&base_dir);

    let level = config
        .as_ref()
        .map(|c| c.log.level.clone())
        .unwrap_or_else(|_| "warn".to_string());
    init_tracing(cli.verbose, cli.quiet, &level);

    let result = match cli.command {
        Some(Commands::Config { action }) => handle_config(action, &base_dir),
        Some(Commands::Completions { shell }) => {
            handle_completions(shell);
            Ok(())
        }
        Some(Commands::Tree { layout, json }) => {
            config.and_then(|config| handle_tree(&load_layout(&layout, &config)?, json))
        }
        Some(Commands::Ancestors { layout, key }) => {
            config.and_then(|config| handle_ancestors(&load_layout(&layout, &config)?, &key))
        }
        Some(Commands::Resolve {
            layout,
            key,
            active_only,
        }) => config.and_then(|config| {
            handle_resolve(&load_layout(&layout, &config)?, &key, active_only)
        }),
        Some(Commands::Search {
            layout,
            from,
            order,
            label,
            description,
            roots,
            leaves,
            has_item,
        }) => config.and_then(|config| {
            let filter = SearchFilter {
                label,
                description,
                roots,
                leaves,
                has_item,
            };
            handle_search(
                &load_layout(&layout, &config)?,
                from.as_deref(),
                search_order(order, &config),
                &filter,
            )
        }),
        Some(Commands::Check { layout }) => {
            config.and_then(|config| handle_check(&layout, &config, cli.quiet))
        }
        None => {
            Cli::command().print_help().ok();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "[ERROR]".red().bold(), e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn init_tracing(verbose: bool, quiet: bool, config_level: &str) {
    let default = if verbose {
        "paramtree_core=debug,info"
    } else if quiet {
        "error"
    } else {
        config_level
    };
    let filter =
        EnvFilter::try_from_env("PARAMTREE_LOG").unwrap_or_else(|_| EnvFilter::new(default));

    let format = env::var("PARAMTREE_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());
    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(io::stderr))
                .init();
        }
    }
}

fn resolve_base_dir(cli_base: Option<PathBuf>) -> PathBuf {
    if let Some(base) = cli_base {
        return base;
    }

    if let Ok(base) = env::var("PARAMTREE_BASE") {
        return PathBuf::from(base);
    }

    dirs::home_dir()
        .map(|h| h.join(".paramtree"))
        .unwrap_or_else(|| PathBuf::from(".paramtree"))
}

fn handle_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let shell = match shell {
        Shell::Bash => clap_complete::Shell::Bash,
        Shell::Zsh => clap_complete::Shell::Zsh,
        Shell::Fish => clap_complete::Shell::Fish,
        Shell::PowerShell => clap_complete::Shell::PowerShell,
        Shell::Elvish => clap_complete::Shell::Elvish,
    };
    generate(shell, &mut cmd, "paramtree", &mut io::stdout());
}

fn handle_config(action: ConfigAction, base_dir: &Path) -> Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load(base_dir)?;
            match config.get(&key) {
                Some(value) => {
                    println!("{}", value);
                }
                None => {
                    return Err(ParamError::ConfigKeyNotFound { key });
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load(base_dir)?;
            config.set(&key, &value)?;
            config.save(base_dir)?;
            println!("{} {} = {}", "Set:".green(), key, value);
        }
        ConfigAction::List => {
            let config = Config::load(base_dir)?;
            println!();
            for (key, value) in config.list() {
                println!("{} = {}", key.cyan(), value);
            }
            println!();
        }
        ConfigAction::Path => {
            let path = Config::path(base_dir);
            println!("{}", path.display());
        }
        ConfigAction::Init => {
            let path = Config::init(base_dir)?;
            println!("{} {}", "Initialized:".green(), path.display());
        }
    }

    Ok(())
}

/// A layout built into a fresh tree.
struct Loaded {
    tree: CategoryTree,
    registry: CategoryRegistry,
    index: LayoutIndex,
}

fn load_layout(path: &Path, config: &Config) -> Result<Loaded> {
    let layout = TreeLayout::load(path)?;
    let factory = ParameterFactory::from_config(config);
    let tree = CategoryTree::new();
    let mut registry = CategoryRegistry::new();
    let index = layout.build(&factory, &tree, &mut registry)?;
    tracing::info!(layout = %path.display(), categories = tree.len(), "loaded layout");

    Ok(Loaded {
        tree,
        registry,
        index,
    })
}

fn handle_check(layout: &Path, config: &Config, quiet: bool) -> Result<()> {
    let loaded = load_layout(layout, config)?;
    if !quiet {
        println!(
            "{} {} ({} categories, {} roots)",
            "OK:".green(),
            layout.display(),
            loaded.registry.len(),
            loaded.tree.roots().len()
        );
    }
    Ok(())
}

/// The `--order` flag wins over `traversal.order` from config.
fn search_order(flag: Option<Order>, config: &Config) -> TraversalOrder {
    match flag {
        Some(Order::Dfs) => TraversalOrder::DepthFirst,
        Some(Order::Bfs) => TraversalOrder::BreadthFirst,
        None => config.traversal.order,
    }
}

fn handle_tree(loaded: &Loaded, json: bool) -> Result<()> {
    let snapshots = loaded
        .tree
        .roots()
        .into_iter()
        .map(|root| loaded.tree.snapshot(root))
        .collect::<Result<Vec<_>>>()?;

    if json {
        let out = serde_json::to_string_pretty(&snapshots).map_err(io::Error::from)?;
        println!("{}", out);
        return Ok(());
    }

    for snapshot in &snapshots {
        print!("{}", render_tree(snapshot));
    }
    Ok(())
}

fn handle_ancestors(loaded: &Loaded, key: &str) -> Result<()> {
    let tree = &loaded.tree;
    let id = loaded.index.require(key)?;
    let ancestors = tree.ancestors(id)?;

    println!("{}", tree.label(id)?.bold());
    if ancestors.is_empty() {
        println!("  {}", "(root)".dimmed());
    }
    for (depth, ancestor) in ancestors.iter().enumerate() {
        println!("  {}└ {}", "  ".repeat(depth), tree.label(*ancestor)?);
    }
    Ok(())
}

fn handle_resolve(loaded: &Loaded, key: &str, active_only: bool) -> Result<()> {
    let tree = &loaded.tree;
    let id = loaded.index.require(key)?;

    let mut chain = vec![id];
    chain.extend(tree.ancestors(id)?);

    let mut items: Vec<_> = tree.ancestor_items(id)?.into_values().collect();
    items.retain(|item| !active_only || item.is_active());
    items.sort_by(|a, b| a.label().cmp(b.label()));

    if items.is_empty() {
        println!("No items visible from '{}'.", tree.label(id)?);
        return Ok(());
    }

    for item in items {
        let origin = origin_of(tree, &chain, &item)?;
        let line = format!("{} = {}", item.label().cyan(), item.value());
        if item.is_active() {
            println!("{}  {}", line, format!("[{}]", origin).dimmed());
        } else {
            println!(
                "{}  {} {}",
                line,
                format!("[{}]", origin).dimmed(),
                "inactive".yellow()
            );
        }
    }
    Ok(())
}

/// Label of the closest category in `chain` that holds exactly this item.
fn origin_of(
    tree: &CategoryTree,
    chain: &[CategoryId],
    item: &Arc<ParameterItem>,
) -> Result<String> {
    for category in chain {
        if let Some(held) = tree.item(*category, item.label())? {
            if Arc::ptr_eq(&held, item) {
                return tree.label(*category);
            }
        }
    }
    Ok("?".to_string())
}

struct SearchFilter {
    label: Option<String>,
    description: Option<String>,
    roots: bool,
    leaves: bool,
    has_item: Option<String>,
}

impl SearchFilter {
    fn matches(&self, category: &CategoryView<'_>) -> bool {
        self.label
            .as_deref()
            .map_or(true, |l| category.label().contains(l))
            && self
                .description
                .as_deref()
                .map_or(true, |d| category.description().contains(d))
            && (!self.roots || category.is_root())
            && (!self.leaves || category.is_leaf())
            && self
                .has_item
                .as_deref()
                .map_or(true, |i| category.has_item(i))
    }
}

fn handle_search(
    loaded: &Loaded,
    from: Option<&str>,
    order: TraversalOrder,
    filter: &SearchFilter,
) -> Result<()> {
    let tree = &loaded.tree;
    let starts = match from {
        Some(key) => vec![loaded.index.require(key)?],
        None => tree.roots(),
    };

    let mut found = Vec::new();
    for start in starts {
        found.extend(tree.search(start, order, |c| filter.matches(c))?);
    }

    if found.is_empty() {
        println!("No matching categories.");
        return Ok(());
    }

    for id in found {
        let level = tree.level(id)?;
        println!(
            "{}  {}",
            path_of(tree, id)?,
            format!("(v{} h{})", level.vertical(), level.horizontal()).dimmed()
        );
    }
    Ok(())
}

/// Root-first label path, e.g. `Company / Engineering`.
fn path_of(tree: &CategoryTree, id: CategoryId) -> Result<String> {
    let mut labels = tree
        .ancestors(id)?
        .into_iter()
        .map(|a| tree.label(a))
        .collect::<Result<Vec<_>>>()?;
    labels.reverse();
    labels.push(tree.label(id)?);
    Ok(labels.join(" / "))
}
