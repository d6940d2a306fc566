//! # CLI Layer
//!
//! One client of the `promptbench` library. This is the only place that:
//! - Parses shell arguments
//! - Installs a `tracing` subscriber
//! - Writes to stdout and stderr
//!
//! ## Lifecycle of an Invocation
//!
//! Every invocation is a full session in miniature: load (rebuild per policy and
//! hydrate), run the command, flush the pending manifest sync. There is no
//! long-running process to debounce for, so the flush makes `structure.json` current
//! before exit.
//!
//! ## Structure
//!
//! - `run()`: Parses arguments and dispatches (called by `main.rs`)
//! - `init_context()`: Loads configuration and opens both stores
//! - `handle_*()`: Per-command handlers that call the API and render results

use super::render::{
    print_messages, render_project_tree, render_rebuild_report, render_version,
    render_versions,
};
use super::setup::{Cli, Commands, FolderCommands, UpdateArgs};
use anyhow::{Context, Result};
use clap::Parser;
use promptbench::api::WorkbenchApi;
use promptbench::commands::folders::FolderDeletePolicy;
use promptbench::commands::projects::ProjectUpdate;
use promptbench::commands::{CmdResult, MessageLevel};
use promptbench::config::WorkbenchConfig;
use promptbench::store::fs_files::FsFileStore;
use promptbench::store::json_local::JsonObjectStore;
use std::io::{IsTerminal, Read};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Log filter override, e.g. `PROMPTBENCH_LOG=promptbench=trace`.
const LOG_ENV: &str = "PROMPTBENCH_LOG";

type CliApi = WorkbenchApi<JsonObjectStore, FsFileStore>;

struct AppContext {
    api: CliApi,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut ctx = init_context(&cli)?;
    let loaded = ctx.api.load()?;

    let outcome = match cli.command {
        Some(Commands::Load) => {
            handle_load(&loaded);
            Ok(())
        }
        command => {
            print_warnings(&loaded);
            dispatch(&mut ctx, command)
        }
    };

    if let Some(report) = ctx.api.flush() {
        tracing::debug!(
            "structure.json flushed ({} projects, {} folders)",
            report.projects_written,
            report.folders_written
        );
    }
    outcome
}

fn dispatch(ctx: &mut AppContext, command: Option<Commands>) -> Result<()> {
    match command {
        None | Some(Commands::List) | Some(Commands::Load) => handle_list(ctx),
        Some(Commands::Create {
            name,
            description,
            folder,
        }) => handle_create(ctx, &name, description, folder.as_deref()),
        Some(Commands::Rename { project, new_name }) => {
            report(ctx.api.rename_project(&project, &new_name)?)
        }
        Some(Commands::Update(args)) => handle_update(ctx, args),
        Some(Commands::Delete { project }) => report(ctx.api.delete_project(&project)?),
        Some(Commands::Move { project, folder }) => {
            report(ctx.api.move_project(&project, folder.as_deref())?)
        }
        Some(Commands::Save {
            project,
            content,
            file,
            description,
        }) => handle_save(ctx, &project, content, file, description),
        Some(Commands::Versions { project }) => handle_versions(ctx, &project),
        Some(Commands::Show { project, number }) => handle_show(ctx, &project, number),
        Some(Commands::Folder(command)) => handle_folder(ctx, command),
        Some(Commands::Sync) => report(ctx.api.sync_now()?),
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            "promptbench=debug"
        } else {
            "warn"
        })
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let cwd = std::env::current_dir().context("Cannot determine the working directory")?;
    let config = WorkbenchConfig::load(&cwd)?;

    let root = match &cli.root {
        Some(root) if root.is_absolute() => root.clone(),
        Some(root) => cwd.join(root),
        None => config.store_root(&cwd),
    };
    let cache = config.cache_path(&cwd, &root);
    tracing::debug!("Prompt root {}, cache {}", root.display(), cache.display());

    let files = FsFileStore::new(root).with_scan_depth(config.scan_depth);
    let api = WorkbenchApi::new(JsonObjectStore::new(cache), files, &config);
    Ok(AppContext { api })
}

fn report(result: CmdResult) -> Result<()> {
    print_messages(&result.messages);
    Ok(())
}

fn print_warnings(result: &CmdResult) {
    let warnings: Vec<_> = result
        .messages
        .iter()
        .filter(|m| matches!(m.level, MessageLevel::Warning | MessageLevel::Error))
        .cloned()
        .collect();
    print_messages(&warnings);
}

fn handle_load(result: &CmdResult) {
    print_messages(&result.messages);
    if let Some(rebuild) = &result.rebuild {
        print!("{}", render_rebuild_report(rebuild));
    }
}

fn handle_list(ctx: &mut AppContext) -> Result<()> {
    let result = ctx.api.list()?;
    print!(
        "{}",
        render_project_tree(&result.listed_projects, &result.folders)
    );
    Ok(())
}

fn handle_create(
    ctx: &mut AppContext,
    name: &str,
    description: Option<String>,
    folder: Option<&str>,
) -> Result<()> {
    let result = ctx.api.create_project(name, description, folder)?;
    report(result)
}

fn handle_update(ctx: &mut AppContext, args: UpdateArgs) -> Result<()> {
    let description = if args.clear_description {
        Some(None)
    } else {
        args.description.map(Some)
    };
    let changes = ProjectUpdate {
        description,
        tags: (!args.tags.is_empty()).then_some(args.tags),
        category: args.category,
        ..Default::default()
    };
    report(ctx.api.update_project(&args.project, changes)?)
}

fn handle_save(
    ctx: &mut AppContext,
    project: &str,
    content: Option<String>,
    file: Option<PathBuf>,
    description: Option<String>,
) -> Result<()> {
    let content = match (content, file) {
        (Some(content), _) => content,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("Cannot read {}", path.display()))?,
        (None, None) => read_stdin()?,
    };
    let result = ctx.api.save_version(project, &content, description)?;
    for path in &result.paths {
        tracing::debug!("Wrote {}", path.display());
    }
    report(result)
}

fn read_stdin() -> Result<String> {
    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        anyhow::bail!("No content given. Pass it as an argument, with --file, or on stdin");
    }
    let mut buffer = String::new();
    stdin
        .read_to_string(&mut buffer)
        .context("Cannot read stdin")?;
    Ok(buffer)
}

fn handle_versions(ctx: &mut AppContext, project: &str) -> Result<()> {
    let result = ctx.api.list_versions(project)?;
    if let Some(project) = result.affected_projects.first() {
        print!("{}", render_versions(project, &result.versions));
    }
    Ok(())
}

fn handle_show(ctx: &mut AppContext, project: &str, number: Option<u32>) -> Result<()> {
    let result = ctx.api.get_version(project, number)?;
    if let (Some(project), Some(version)) =
        (result.affected_projects.first(), result.versions.first())
    {
        print!("{}", render_version(project, version));
    }
    Ok(())
}

fn handle_folder(ctx: &mut AppContext, command: FolderCommands) -> Result<()> {
    let result = match command {
        FolderCommands::Create { name, parent } => {
            ctx.api.create_folder(&name, parent.as_deref())?
        }
        FolderCommands::Rename { folder, new_name } => ctx.api.rename_folder(&folder, &new_name)?,
        FolderCommands::Delete { folder, cascade } => {
            let policy = if cascade {
                FolderDeletePolicy::CascadeProjects
            } else {
                FolderDeletePolicy::DetachProjects
            };
            ctx.api.delete_folder(&folder, policy)?
        }
        FolderCommands::Collapse { folder } => ctx.api.toggle_folder(&folder)?,
    };
    report(result)
}
