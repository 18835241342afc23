//! Diff command
//!
//! Usage: papertrail diff --schemas <JSON> --content-type <UID> --new <JSON> [--previous <JSON>]
//!
//! `--config` supplies diff options and, without `--schemas`, the registry
//! document named by its `schemas_path`.

use super::read_json;
use anyhow::{bail, Context};
use clap::Args;
use papertrail_core::diff::DiffEngine;
use papertrail_core::errors::PaperTrailError;
use papertrail_core::{InMemorySchemaRegistry, SchemaRegistry};
use papertrail_engine::PaperTrailConfig;
use serde_json::json;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct DiffArgs {
    /// Registry document with content-type and component schemas
    #[arg(long)]
    pub schemas: Option<PathBuf>,

    /// Content-type uid, e.g. api::article.article
    #[arg(long)]
    pub content_type: String,

    /// New content (JSON file)
    #[arg(long)]
    pub new: PathBuf,

    /// Previous content (JSON file); omitted means no prior version
    #[arg(long)]
    pub previous: Option<PathBuf>,

    /// Interceptor configuration supplying diff options
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn execute(args: DiffArgs) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => PaperTrailConfig::from_file(path)?,
        None => PaperTrailConfig::default(),
    };
    let registry = match (&args.schemas, &args.config) {
        (Some(path), _) => InMemorySchemaRegistry::from_file(path)
            .with_context(|| format!("loading schemas from {}", path.display()))?,
        (None, Some(config_path)) if config.schemas_path.is_some() => {
            config.load_registry(config_path.parent().unwrap_or(Path::new(".")))?
        }
        _ => bail!("Must specify --schemas or a --config with schemas_path"),
    };
    let schema = registry
        .resolve(&args.content_type)
        .ok_or_else(|| PaperTrailError::SchemaNotFound {
            uid: args.content_type.clone(),
        })?;

    let new = read_json(&args.new)?;
    let previous = args.previous.as_deref().map(read_json).transpose()?;

    let changes = DiffEngine::new(&registry, &config.diff).diff(
        &new,
        previous.as_ref(),
        &schema,
        "",
    )?;

    let output = json!({
        "changes": changes.fields(),
        "paths": changes.paths(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
