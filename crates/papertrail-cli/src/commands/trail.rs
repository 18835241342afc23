//! Trail commands
//!
//! Usage:
//!   papertrail trail history --db <PATH> --content-type <UID> [--record <ID>]
//!   papertrail trail show --db <PATH> <TRAIL_ID>
//!   papertrail trail review --db <PATH> <TRAIL_ID> --status <STATUS> [--comment <TEXT>]

use anyhow::{anyhow, bail};
use clap::{Args, Subcommand};
use papertrail_core::errors::PaperTrailError;
use papertrail_core::model::{ReviewStatus, ReviewUpdate, TrailRecord};
use papertrail_store::{db, SqliteTrailRepo};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct TrailArgs {
    #[command(subcommand)]
    pub command: TrailCommand,
}

#[derive(Debug, Subcommand)]
pub enum TrailCommand {
    /// List the versions of one record
    History(HistoryArgs),
    /// Print one trail entry as JSON
    Show(ShowArgs),
    /// Set review status and comments
    Review(ReviewArgs),
}

#[derive(Debug, Args)]
pub struct HistoryArgs {
    #[arg(long, default_value = ".papertrail/trails.db")]
    pub db: PathBuf,

    #[arg(long)]
    pub content_type: String,

    /// Record id; omit for single types
    #[arg(long)]
    pub record: Option<String>,

    /// Display field used in the heading
    #[arg(long)]
    pub main_field: Option<String>,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    pub trail_id: String,

    #[arg(long, default_value = ".papertrail/trails.db")]
    pub db: PathBuf,
}

#[derive(Debug, Args)]
pub struct ReviewArgs {
    pub trail_id: String,

    #[arg(long, default_value = ".papertrail/trails.db")]
    pub db: PathBuf,

    /// pending, approved or changes_required
    #[arg(long)]
    pub status: Option<String>,

    #[arg(long)]
    pub comment: Option<String>,

    /// Comment on one changed field, as `path=text` (repeatable)
    #[arg(long = "field-comment")]
    pub field_comments: Vec<String>,
}

pub fn execute(args: TrailArgs) -> anyhow::Result<()> {
    match args.command {
        TrailCommand::History(args) => execute_history(args),
        TrailCommand::Show(args) => execute_show(args),
        TrailCommand::Review(args) => execute_review(args),
    }
}

fn execute_history(args: HistoryArgs) -> anyhow::Result<()> {
    let conn = db::open_migrated(&args.db)?;
    let trails = SqliteTrailRepo::history(&conn, &args.content_type, args.record.as_deref())?;

    let Some(latest) = trails.last() else {
        println!("No trail entries for {}", args.content_type);
        return Ok(());
    };
    println!("{}", latest.display_name(args.main_field.as_deref()));
    for trail in &trails {
        print_summary(trail);
    }
    Ok(())
}

fn execute_show(args: ShowArgs) -> anyhow::Result<()> {
    let conn = db::open_migrated(&args.db)?;
    let trail = SqliteTrailRepo::get(&conn, &args.trail_id)?.ok_or_else(|| {
        PaperTrailError::TrailNotFound {
            trail_id: args.trail_id.clone(),
        }
    })?;
    println!("{}", serde_json::to_string_pretty(&trail)?);
    Ok(())
}

fn execute_review(args: ReviewArgs) -> anyhow::Result<()> {
    if args.status.is_none() && args.comment.is_none() && args.field_comments.is_empty() {
        bail!("Must specify --status, --comment or --field-comment");
    }

    let status = args
        .status
        .as_deref()
        .map(str::parse::<ReviewStatus>)
        .transpose()?;
    let field_comments = parse_field_comments(&args.field_comments)?;
    let update = ReviewUpdate {
        status,
        comment: args.comment,
        field_comments: (!field_comments.is_empty()).then_some(field_comments),
    };

    let mut conn = db::open_migrated(&args.db)?;
    let trail = SqliteTrailRepo::update_review(&mut conn, &args.trail_id, &update)?;

    println!("Trail reviewed:");
    println!("  trail_id: {}", trail.id);
    println!("  status: {}", trail.status);
    if let Some(comment) = &trail.comment {
        println!("  comment: {}", comment);
    }
    for (path, text) in &trail.field_comments {
        println!("  {}: {}", path, text);
    }
    Ok(())
}

fn print_summary(trail: &TrailRecord) {
    println!(
        "  v{} {} {} {} {}",
        trail.version,
        trail.change,
        trail.status,
        trail.created_at.format("%Y-%m-%d %H:%M:%S"),
        trail.id
    );
    if !trail.changed_paths.is_empty() {
        println!("      changed: {}", trail.changed_paths.join(", "));
    }
}

fn parse_field_comments(raw: &[String]) -> anyhow::Result<BTreeMap<String, String>> {
    raw.iter()
        .map(|entry| {
            entry
                .split_once('=')
                .map(|(path, text)| (path.trim().to_string(), text.to_string()))
                .ok_or_else(|| anyhow!("field comment must be path=text, got {:?}", entry))
        })
        .collect()
}
