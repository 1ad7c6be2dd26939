use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use frostprep_core::{
    create_cached_provider_from_env, AuditOrchestrator, CoreConfig, GenerationRequest,
    LlmProvider, Recipe, RecipeGenerator, ResilientInvoker,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "frostprep")]
#[command(about = "Freezer-prep recipe generation and audit", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one recipe and print it as JSON
    Generate {
        /// Season tag, e.g. winter
        #[arg(long)]
        season: String,
        /// Target recipe name
        #[arg(long)]
        name: Option<String>,
        /// Ingredient the recipe must include (repeatable)
        #[arg(long = "ingredient")]
        ingredients: Vec<String>,
        /// Dietary restriction to respect (repeatable)
        #[arg(long = "restriction")]
        restrictions: Vec<String>,
        /// Cuisine style
        #[arg(long)]
        cuisine: Option<String>,
        /// Number of servings
        #[arg(long)]
        servings: Option<u32>,
        /// Write the recipe to this file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Audit every recipe JSON file in a directory, repairing missing fields
    Audit {
        /// Directory of recipe .json files
        dir: PathBuf,
        /// Write repaired recipes back to their files
        #[arg(long)]
        write: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let fmt_layer = tracing_subscriber::fmt::layer();
    let env_filter = tracing_subscriber::EnvFilter::from_default_env();
    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            season,
            name,
            ingredients,
            restrictions,
            cuisine,
            servings,
            out,
        } => {
            let request = GenerationRequest {
                season,
                recipe_name: name,
                ingredients: (!ingredients.is_empty()).then_some(ingredients),
                dietary_restrictions: (!restrictions.is_empty()).then_some(restrictions),
                cuisine,
                servings,
            };
            generate(request, out.as_deref()).await?;
        }
        Commands::Audit { dir, write } => {
            audit_dir(&dir, write).await?;
        }
    }

    Ok(())
}

async fn generate(request: GenerationRequest, out: Option<&Path>) -> Result<()> {
    let config = CoreConfig::from_env();
    let provider: Arc<dyn LlmProvider> = Arc::from(create_cached_provider_from_env()?);
    let generator = RecipeGenerator::new(provider, ResilientInvoker::new(&config));

    let recipe = generator.generate(&request).await?;
    let json = serde_json::to_string_pretty(&recipe)?;

    match out {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}

async fn audit_dir(dir: &Path, write: bool) -> Result<()> {
    let config = CoreConfig::from_env();
    let provider: Arc<dyn LlmProvider> = Arc::from(create_cached_provider_from_env()?);
    let orchestrator = AuditOrchestrator::new(
        provider,
        ResilientInvoker::new(&config),
        config.limits.clone(),
    );

    let mut processed = 0usize;
    let mut repaired = 0usize;
    let mut skipped = 0usize;
    let mut errored = 0usize;

    let entries =
        std::fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        if path.extension().map(|e| e == "json").unwrap_or(false) {
            // One bad file must not stop the batch.
            match audit_file(&orchestrator, &path, write).await {
                Ok(FileOutcome::Repaired) => repaired += 1,
                Ok(FileOutcome::Clean) => skipped += 1,
                Err(e) => {
                    tracing::error!(path = %path.display(), error = %e, "audit failed");
                    errored += 1;
                }
            }
            processed += 1;
        }
    }

    println!("Processed {processed}: {repaired} repaired, {skipped} already clean, {errored} errored");
    Ok(())
}

enum FileOutcome {
    Repaired,
    Clean,
}

async fn audit_file(
    orchestrator: &AuditOrchestrator,
    path: &Path,
    write: bool,
) -> Result<FileOutcome> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let recipe: Recipe =
        serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;

    let result = orchestrator.audit(&recipe).await?;

    for note in &result.audit_notes {
        tracing::info!(path = %path.display(), note = %note);
    }

    match result.fixed_recipe {
        Some(fixed) => {
            if write {
                let json = serde_json::to_string_pretty(&fixed)?;
                std::fs::write(path, json)
                    .with_context(|| format!("writing {}", path.display()))?;
            }
            println!(
                "{}: repaired {}",
                path.display(),
                result.missing_fields.join(", ")
            );
            Ok(FileOutcome::Repaired)
        }
        None => Ok(FileOutcome::Clean),
    }
}
