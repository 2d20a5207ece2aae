mod batch;
mod config;
mod error;
mod ids;
mod model;
mod output;
mod parser;
mod store;
mod transfer;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{anyhow, Context as _};
use clap::{Parser, Subcommand};

use crate::config::Settings;
use model::{Category, Document};
use store::{IdentifierMap, ImageStore};
use transfer::{FileTransfer, ImageTransfer, Passthrough};

#[derive(Parser)]
#[command(name = "recipe_parser", about = "Turn HowToCook Markdown recipes into per-category JSON")]
struct Cli {
    /// Settings file (default: ./recipe_parser.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse every dish and write <category>_recipes.json files
    Build {
        /// Dishes directory (overrides settings)
        #[arg(long)]
        dishes: Option<PathBuf>,
        /// Output directory (overrides settings)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Keep image references as written instead of transferring them
        #[arg(long)]
        no_images: bool,
        /// Max documents to parse
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Parse one document and print its record
    Show {
        file: PathBuf,
        /// Category key (default: taken from the file's directory)
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Assign identifiers to documents that have none
    Ids,
    /// Count Markdown files in the dishes and tips directories
    Count,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref()).context("loading settings")?;

    let result = match cli.command {
        Commands::Build { dishes, output, no_images, limit } => {
            let dishes = dishes.unwrap_or_else(|| settings.resolve(&settings.dishes_dir));
            let output_dir = output.unwrap_or_else(|| settings.resolve(&settings.output_dir));
            let ids = IdentifierMap::load(&settings.resolve(&settings.id_map))?;
            if ids.is_empty() {
                println!("Identifier mapping is empty. Run 'ids' first.");
                return Ok(());
            }

            let image_map = settings.resolve(&settings.image_map);
            let images = ImageStore::load(&image_map)?;
            let transfer: Box<dyn ImageTransfer> = if no_images || !settings.images.enabled {
                Box::new(Passthrough)
            } else {
                Box::new(FileTransfer::new(&settings.images, &settings.base_dir)?)
            };

            let ctx = parser::Context {
                base_dir: &settings.base_dir,
                ids: &ids,
                images: &images,
                transfer: &*transfer,
                image_scope: settings.image_scope,
            };
            println!("Parsing {}...", dishes.display());
            let batch = batch::run(&dishes, &ctx, limit)?;

            let written = output::write_all(&output_dir, &batch.recipes)?;
            images.save(&image_map)?;

            batch.report.print();
            println!(
                "Wrote {} files to {} ({} images mapped).",
                written.len(),
                output_dir.display(),
                images.len()
            );
            Ok(())
        }
        Commands::Show { file, category } => {
            let category = match category {
                Some(key) => {
                    Category::from_key(&key).ok_or_else(|| anyhow!("unknown category '{}'", key))?
                }
                None => infer_category(&settings, &file)?,
            };
            let ids = IdentifierMap::load(&settings.resolve(&settings.id_map))?;
            let images = ImageStore::new();
            let ctx = parser::Context {
                base_dir: &settings.base_dir,
                ids: &ids,
                images: &images,
                transfer: &Passthrough,
                image_scope: settings.image_scope,
            };
            let doc = Document::read(&file)?;
            let recipe = parser::process_document(&doc, category, &ctx)?;
            println!("{}", serde_json::to_string_pretty(&recipe)?);
            Ok(())
        }
        Commands::Ids => {
            let path = settings.resolve(&settings.id_map);
            let mut ids = IdentifierMap::load(&path)?;
            let dishes = settings.resolve(&settings.dishes_dir);
            let tips = settings.resolve(&settings.tips_dir);
            let added = ids::refresh(&mut ids, &settings.base_dir, &[dishes.as_path(), tips.as_path()]);
            ids.save(&path)?;
            println!("Added {} identifiers ({} total) to {}", added, ids.len(), path.display());
            Ok(())
        }
        Commands::Count => {
            let dishes = batch::count(&settings.resolve(&settings.dishes_dir));
            let tips = batch::count(&settings.resolve(&settings.tips_dir));
            println!("Dishes: {}", dishes);
            println!("Tips:   {}", tips);
            println!("Total:  {}", dishes + tips);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

/// Category from the file's position under the dishes directory.
fn infer_category(settings: &Settings, file: &Path) -> anyhow::Result<Category> {
    let root = settings.resolve(&settings.dishes_dir);
    let key = store::relative_key(&root, file);
    Category::from_path(Path::new(""), Path::new(&key))
        .ok_or_else(|| anyhow!("cannot infer a category for {}; pass --category", file.display()))
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
