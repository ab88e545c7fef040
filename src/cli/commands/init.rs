//! `autoservice init` command - Initialize a new workshop

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::core::shop::SHOP_DIR;
use crate::core::{Config, Shop, ShopDirError, Store};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Rewrite the config even if .autoservice/ already exists
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
        println!(
            "{} Created directory {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
    }

    let shop = match Shop::init(&path, args.force) {
        Ok(shop) => shop,
        Err(ShopDirError::AlreadyExists(path)) => {
            println!(
                "{} Workshop already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!();
            println!(
                "Use {} to rewrite its config",
                style("autoservice init --force").yellow()
            );
            return Ok(());
        }
        Err(e) => return Err(miette::miette!("{}", e)),
    };

    // An empty snapshot, unless re-initializing over existing data
    let config = Config::load_from(None, Some(&shop.config_path()));
    let db_path = shop.database_path(config.database.as_deref());
    if !db_path.exists() {
        Store::open_in_memory()?.export(&db_path)?;
    }

    println!(
        "{} Initialized workshop at {}",
        style("✓").green(),
        style(shop.root().display()).cyan()
    );
    println!();
    println!("Created:");
    println!("  {}/config.yaml", SHOP_DIR);
    println!("  {}", style(db_path.display()).dim());
    println!();
    println!("Next steps:");
    println!(
        "  {} Register a client",
        style("autoservice client new --name \"...\" --phone \"...\"").yellow()
    );
    println!("  {} Stock a part", style("autoservice part new --name \"...\" --price 0").yellow());
    println!("  {} Work interactively", style("autoservice shell").yellow());
    Ok(())
}
