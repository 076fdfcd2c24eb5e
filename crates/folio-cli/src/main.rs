//! folio: command-line front end for the project catalog.
//!
//! Reads and writes the unified collection through the sync coordinator.
//! Results are printed to stdout as JSON; logs go to stderr (or `LOG_FILE`).

mod settings;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tokio::sync::broadcast;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio_core::{EventBus, EventEnvelope, NewProject, Project, ProjectPatch, RemoteProjectStore};
use folio_remote::PostgrestStore;
use folio_store::{FilesystemStore, LocalCacheStore, RecoveryConfig};
use folio_sync::ProjectCoordinator;

use settings::Settings;

const DEFAULT_LOG_FILTER: &str =
    "warn,folio=info,folio_sync=info,folio_store=info,folio_remote=info,folio_core=info";

#[derive(Parser)]
#[command(name = "folio")]
#[command(author, version, about = "Portfolio project catalog with remote sync")]
#[command(propagate_version = true)]
struct Cli {
    /// Local storage directory (overrides FOLIO_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Ignore the remote table even when configured
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the unified project collection
    List {
        /// Only featured projects
        #[arg(long)]
        featured: bool,
    },

    /// Show one project by id or slug
    Show {
        /// Project id or slug
        key: String,
    },

    /// Create a project
    Create {
        /// Project title
        title: String,

        /// Caller-chosen id, used when stored locally
        #[arg(long)]
        id: Option<String>,

        #[command(flatten)]
        fields: FieldArgs,

        /// Mark as featured
        #[arg(long)]
        featured: bool,
    },

    /// Update fields of an existing project
    Update {
        /// Project id
        id: String,

        /// New title (re-derives the slug unless --slug is given)
        #[arg(long)]
        title: Option<String>,

        #[command(flatten)]
        fields: FieldArgs,

        /// Featured flag
        #[arg(long)]
        featured: Option<bool>,
    },

    /// Delete a project
    Delete {
        /// Project id
        id: String,
    },

    /// Run the local data recovery scan and report what it found
    Recover,
}

/// Optional project fields shared by create and update.
#[derive(Args, Default)]
struct FieldArgs {
    #[arg(long)]
    slug: Option<String>,
    #[arg(long)]
    subtitle: Option<String>,
    #[arg(long)]
    description: Option<String>,
    /// Rich text/HTML body
    #[arg(long)]
    content: Option<String>,
    #[arg(long)]
    image_url: Option<String>,
    /// Gallery image, repeatable
    #[arg(long = "image")]
    images: Vec<String>,
    /// Technology, repeatable
    #[arg(long = "tech")]
    technologies: Vec<String>,
    /// Tag, repeatable
    #[arg(long = "tag")]
    tags: Vec<String>,
    #[arg(long)]
    status: Option<String>,
    #[arg(long)]
    github_url: Option<String>,
    #[arg(long)]
    live_url: Option<String>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    duration: Option<String>,
    #[arg(long)]
    team_size: Option<String>,
}

impl FieldArgs {
    fn into_new_project(self, title: String, id: Option<String>, featured: bool) -> NewProject {
        NewProject {
            title,
            id,
            slug: self.slug,
            subtitle: self.subtitle,
            description: self.description,
            content: self.content,
            image_url: self.image_url,
            project_images: self.images,
            videos: Vec::new(),
            technologies: self.technologies,
            tags: self.tags,
            featured,
            status: self.status,
            github_url: self.github_url,
            live_url: self.live_url,
            location: self.location,
            duration: self.duration,
            team_size: self.team_size,
        }
    }

    fn into_patch(self, title: Option<String>, featured: Option<bool>) -> ProjectPatch {
        let non_empty = |v: Vec<String>| (!v.is_empty()).then_some(v);
        ProjectPatch {
            title,
            slug: self.slug,
            subtitle: self.subtitle,
            description: self.description,
            content: self.content,
            image_url: self.image_url,
            project_images: non_empty(self.images),
            videos: None,
            technologies: non_empty(self.technologies),
            tags: non_empty(self.tags),
            featured,
            status: self.status,
            github_url: self.github_url,
            live_url: self.live_url,
            location: self.location,
            duration: self.duration,
            team_size: self.team_size,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let _log_guard = init_tracing();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Initialize tracing with configurable output.
///
/// Environment variables:
///   LOG_FORMAT  - "json" or "text" (default: "text")
///   LOG_FILE    - path to log file (optional, daily rotation)
///   LOG_ANSI    - "true"/"false" override ANSI colors
///   RUST_LOG    - standard env filter
fn init_tracing() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(env_filter);

    if let Some(ref path) = log_file {
        let path = std::path::Path::new(path);
        let file_dir = path.parent().unwrap_or(std::path::Path::new("."));
        let file_name = path
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("folio.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(log_ansi.unwrap_or(false));
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    }
}

fn build_coordinator(settings: &Settings) -> anyhow::Result<ProjectCoordinator> {
    let store = FilesystemStore::new(&settings.data_dir).with_quota(settings.quota_bytes);
    let cache = LocalCacheStore::new(Arc::new(store));

    let remote = if settings.offline {
        None
    } else {
        PostgrestStore::from_env()
            .context("invalid remote configuration")?
            .map(|store| Arc::new(store) as Arc<dyn RemoteProjectStore>)
    };

    info!(
        data_dir = %settings.data_dir.display(),
        remote = remote.is_some(),
        "Session configured"
    );

    let recovery = RecoveryConfig::default().with_pattern_scan(settings.scan_pattern_keys);
    Ok(
        ProjectCoordinator::new(remote, cache, Arc::new(EventBus::default()))
            .with_recovery(recovery)
            .with_owner(settings.owner.clone()),
    )
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = Settings::from_env(cli.data_dir, cli.offline)?;
    let coordinator = build_coordinator(&settings)?;
    let mut events = coordinator.bus().subscribe();

    match cli.command {
        Commands::List { featured } => {
            let projects = if featured {
                coordinator.get_featured_projects().await
            } else {
                coordinator.get_all_projects().await
            };
            print_json(&projects)?;
        }
        Commands::Show { key } => {
            let project = match coordinator.get_project_by_id(&key).await {
                Some(project) => Some(project),
                None => coordinator.get_project_by_slug(&key).await,
            };
            let project = project.with_context(|| format!("no project with id or slug {key}"))?;
            print_json(&project)?;
        }
        Commands::Create {
            title,
            id,
            fields,
            featured,
        } => {
            let request = fields.into_new_project(title, id, featured);
            let project = coordinator.create_project(request).await?;
            print_json(&project)?;
        }
        Commands::Update {
            id,
            title,
            fields,
            featured,
        } => {
            let patch = fields.into_patch(title, featured);
            if patch.is_empty() {
                anyhow::bail!("nothing to update: pass at least one field");
            }
            let project: Project = coordinator
                .update_project(&id, patch)
                .await?
                .with_context(|| format!("no project with id {id}"))?;
            print_json(&project)?;
        }
        Commands::Delete { id } => {
            let deleted = coordinator.delete_project(&id).await?;
            print_json(&serde_json::json!({ "id": id, "deleted": deleted }))?;
            if !deleted {
                anyhow::bail!("no project with id {id}");
            }
        }
        Commands::Recover => {
            let report = coordinator.recover().await;
            let sources: Vec<_> = report
                .sources
                .iter()
                .map(|s| {
                    serde_json::json!({
                        "key": s.key,
                        "candidates": s.candidates,
                        "kept": s.kept,
                    })
                })
                .collect();
            print_json(&serde_json::json!({
                "count": report.projects.len(),
                "seeded": report.seeded,
                "persisted": report.persisted,
                "sources": sources,
                "titles": report.projects.iter().map(|p| &p.title).collect::<Vec<_>>(),
            }))?;
        }
    }

    log_events(&mut events);
    Ok(())
}

fn log_events(events: &mut broadcast::Receiver<EventEnvelope>) {
    while let Ok(envelope) = events.try_recv() {
        debug!(
            event_type = %envelope.event_type,
            project_id = %envelope.payload.project_id,
            "Notification published"
        );
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
