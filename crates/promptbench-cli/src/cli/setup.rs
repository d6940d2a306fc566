use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "promptbench",
    bin_name = "promptbench",
    version,
    about = "Local-first prompt workbench with plain markdown storage",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Prompt library root (overrides promptbench.toml)
    #[arg(long, global = true, value_name = "DIR", help_heading = "Options")]
    pub root: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rebuild from the prompt files and report what was found
    #[command(display_order = 1)]
    Load,

    /// List projects, grouped by folder
    #[command(alias = "ls", display_order = 2)]
    List,

    /// Create a new project
    #[command(alias = "new", display_order = 3)]
    Create {
        name: String,

        /// Project description
        #[arg(short, long)]
        description: Option<String>,

        /// Folder to place the project in
        #[arg(short, long)]
        folder: Option<String>,
    },

    /// Rename a project (moves its directory and version files)
    #[command(display_order = 4)]
    Rename { project: String, new_name: String },

    /// Change a project's description, tags or category
    #[command(display_order = 5)]
    Update(UpdateArgs),

    /// Delete a project and its files
    #[command(alias = "rm", display_order = 6)]
    Delete { project: String },

    /// Move a project into a folder (no folder moves it to root)
    #[command(display_order = 7)]
    Move {
        project: String,
        folder: Option<String>,
    },

    /// Save a new version of a project
    #[command(display_order = 10)]
    Save {
        project: String,

        /// Version content (read from stdin when omitted)
        content: Option<String>,

        /// Read the content from a file
        #[arg(short, long, conflicts_with = "content")]
        file: Option<PathBuf>,

        /// What changed in this version
        #[arg(short = 'm', long = "message")]
        description: Option<String>,
    },

    /// List a project's versions
    #[command(alias = "log", display_order = 11)]
    Versions { project: String },

    /// Print a version (the current one by default)
    #[command(alias = "cat", display_order = 12)]
    Show {
        project: String,

        #[arg(value_name = "VERSION")]
        number: Option<u32>,
    },

    /// Folder operations
    #[command(subcommand)]
    Folder(FolderCommands),

    /// Write structure.json now
    #[command(display_order = 30)]
    Sync,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    pub project: String,

    /// New description
    #[arg(short, long, conflicts_with = "clear_description")]
    pub description: Option<String>,

    /// Remove the description
    #[arg(long)]
    pub clear_description: bool,

    /// Replace the tags (repeatable)
    #[arg(short, long = "tag")]
    pub tags: Vec<String>,

    /// Category
    #[arg(short, long)]
    pub category: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum FolderCommands {
    /// Create a folder
    Create {
        name: String,

        /// Parent folder
        #[arg(short, long)]
        parent: Option<String>,
    },

    /// Rename a folder
    Rename { folder: String, new_name: String },

    /// Delete a folder. Its projects are detached unless --cascade is given
    #[command(alias = "rm")]
    Delete {
        folder: String,

        /// Delete the projects inside as well, including their files
        #[arg(long)]
        cascade: bool,
    },

    /// Toggle a folder's collapsed state
    Collapse { folder: String },
}
