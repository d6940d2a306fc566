use chrono::{DateTime, Utc};
use colored::Colorize;
use promptbench::commands::{CmdMessage, MessageLevel};
use promptbench::model::{Folder, Project, Version};
use promptbench::reconcile::RebuildReport;
use std::collections::HashSet;
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};
use uuid::Uuid;

const LINE_WIDTH: usize = 80;
const TIME_WIDTH: usize = 16;
const VERSION_WIDTH: usize = 6;
const INDENT: &str = "  ";

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => eprintln!("{}", message.content.yellow()),
            MessageLevel::Error => eprintln!("{}", message.content.red()),
        }
    }
}

/// Folders as a tree with their projects, then the projects at root.
pub(super) fn render_project_tree(projects: &[Project], folders: &[Folder]) -> String {
    if projects.is_empty() && folders.is_empty() {
        return "No projects yet.\n".to_string();
    }

    let known: HashSet<Uuid> = folders.iter().map(|f| f.id).collect();
    let mut out = String::new();
    let mut seen = HashSet::new();

    for folder in folders
        .iter()
        .filter(|f| f.parent_id.map_or(true, |p| !known.contains(&p)))
    {
        render_folder(&mut out, folder, projects, folders, 0, &mut seen);
    }

    let at_root: Vec<&Project> = projects
        .iter()
        .filter(|p| p.folder_id.map_or(true, |f| !known.contains(&f)))
        .collect();
    if !at_root.is_empty() && !out.is_empty() {
        out.push('\n');
    }
    for project in at_root {
        out.push_str(&project_line(project, 0));
    }
    out
}

fn render_folder(
    out: &mut String,
    folder: &Folder,
    projects: &[Project],
    folders: &[Folder],
    depth: usize,
    seen: &mut HashSet<Uuid>,
) {
    if !seen.insert(folder.id) {
        return;
    }
    let indent = INDENT.repeat(depth);
    let inside: Vec<&Project> = projects
        .iter()
        .filter(|p| p.folder_id == Some(folder.id))
        .collect();

    if folder.collapsed {
        out.push_str(&format!(
            "{}{} {} {}\n",
            indent,
            "▸".dimmed(),
            format!("{}/", folder.name).bold(),
            format!("({} hidden)", inside.len()).dimmed()
        ));
        return;
    }

    out.push_str(&format!(
        "{}{} {}\n",
        indent,
        "▾".dimmed(),
        format!("{}/", folder.name).bold()
    ));
    for child in folders.iter().filter(|f| f.parent_id == Some(folder.id)) {
        render_folder(out, child, projects, folders, depth + 1, seen);
    }
    for project in inside {
        out.push_str(&project_line(project, depth + 1));
    }
}

fn project_line(project: &Project, depth: usize) -> String {
    let prefix = format!("{}  ", INDENT.repeat(depth));
    let version = if project.current_version == 0 {
        "-".to_string()
    } else {
        format!("v{}", project.current_version)
    };
    let time_ago = format_time_ago(project.metadata.updated_at);

    let available = LINE_WIDTH.saturating_sub(prefix.width() + VERSION_WIDTH + TIME_WIDTH);
    let name = truncate_to_width(&project.name, available);
    let padding = available.saturating_sub(name.width());

    let version = format!("{:>width$}", version, width = VERSION_WIDTH);

    format!(
        "{}{}{}{}{}\n",
        prefix,
        name,
        " ".repeat(padding),
        version.cyan(),
        time_ago.dimmed()
    )
}

/// One line per version, oldest first. The current version is starred.
pub(super) fn render_versions(project: &Project, versions: &[Version]) -> String {
    if versions.is_empty() {
        return format!("{} has no versions yet.\n", project.name);
    }

    let mut out = format!("{}\n", project.name.bold());
    if let Some(description) = &project.description {
        out.push_str(&format!("{}\n", description.dimmed()));
    }
    out.push('\n');

    for version in versions {
        let marker = if version.version_number == project.current_version {
            "*".yellow()
        } else {
            " ".normal()
        };
        let label = format!("v{}", version.version_number);
        let words = format!("{:>10}", format!("{} words", version.metadata.words));
        let description = version.description.as_deref().unwrap_or("");
        out.push_str(&format!(
            "{} {:<5}{}  {}  {}\n",
            marker,
            label,
            format_time_ago(version.timestamp).dimmed(),
            words.dimmed(),
            description
        ));
    }
    out
}

pub(super) fn render_version(project: &Project, version: &Version) -> String {
    let mut out = format!(
        "{} {}  {}\n",
        project.name.bold(),
        format!("v{}", version.version_number).cyan(),
        version
            .timestamp
            .format("%Y-%m-%d %H:%M")
            .to_string()
            .dimmed()
    );
    if let Some(description) = &version.description {
        out.push_str(&format!("{}\n", description.dimmed()));
    }
    out.push_str("--------------------------------\n");
    out.push_str(&version.content);
    if !version.content.ends_with('\n') {
        out.push('\n');
    }
    out
}

pub(super) fn render_rebuild_report(report: &RebuildReport) -> String {
    if report.skipped {
        return "No prompt files found, cached data kept.\n".to_string();
    }

    let mut out = format!(
        "{} projects ({} known, {} restored), {} versions, {} folders\n",
        report.projects_total(),
        report.projects_reused,
        report.projects_restored,
        report.versions_restored,
        report.folders_restored
    );
    for (name, strategy) in &report.folder_matches {
        out.push_str(&format!(
            "{}{} {}\n",
            INDENT,
            name,
            format!("(folder matched by {})", strategy).dimmed()
        ));
    }
    for failure in &report.failures {
        out.push_str(&format!("{}{}\n", INDENT, failure.red()));
    }
    out
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let time_str = Formatter::new().convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}
