//! Command-line front end for a snipbook data directory.

use anyhow::{bail, Context};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use serde_json::{json, Value};
use snipbook_core::filter::compile_pattern;
use snipbook_core::highlight::{Highlighter, Language};
use snipbook_core::library::{FILE_COLUMN, TIMESTAMP_COLUMN, TITLE_COLUMN, TYPE_COLUMN};
use snipbook_core::placeholder::is_placeholder_token;
use snipbook_core::text::normalize_optional_nonempty;
use snipbook_core::{Config, OutputMode, Query, Rendered, SnippetKind, TreeRow, Workbench};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "snipbook", about = "Snippet library with placeholder templates", version)]
struct Cli {
    /// Snippet data directory (can also be set via SNIPBOOK_DATA_DIR env var)
    #[arg(short, long, env = "SNIPBOOK_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
    /// List library rows matching an optional query
    List {
        query: Option<String>,
        /// Treat the query as a regular expression
        #[arg(short, long)]
        regex: bool,
        #[arg(long)]
        case_sensitive: bool,
        /// Also remember the query in the search history
        #[arg(long)]
        remember: bool,
    },
    /// Print a stored snippet
    Show { file: String },
    /// Print a snippet with placeholders substituted
    Render {
        file: String,
        /// Placeholder value as `$name=value` (repeatable)
        #[arg(short = 's', long = "set", value_parser = parse_assignment)]
        assignments: Vec<(String, String)>,
        #[arg(short, long, value_enum)]
        mode: Option<RenderMode>,
    },
    /// Create a snippet
    New {
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long, value_parser = parse_kind)]
        kind: Option<SnippetKind>,
        #[arg(short, long, conflicts_with = "file")]
        content: Option<String>,
        /// Read content from a file, or `-` for stdin
        #[arg(short, long)]
        file: Option<String>,
    },
    /// Update title, type or stored placeholder values of a snippet
    Set {
        file: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long, value_parser = parse_kind)]
        kind: Option<SnippetKind>,
        #[arg(short = 's', long = "set", value_parser = parse_assignment)]
        assignments: Vec<(String, String)>,
    },
    /// Delete a snippet file
    Delete { file: String },
    /// Show or extend the search history
    History {
        #[command(subcommand)]
        action: Option<HistoryAction>,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    /// Remember a search keyword
    Add { keyword: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum RenderMode {
    Plain,
    Marked,
    Markdown,
}

impl RenderMode {
    fn output_mode(self) -> OutputMode {
        match self {
            RenderMode::Plain => OutputMode::Plain,
            RenderMode::Marked => OutputMode::MarkedHtml,
            RenderMode::Markdown => OutputMode::MarkdownHtml,
        }
    }
}

fn parse_kind(value: &str) -> Result<SnippetKind, String> {
    value.parse()
}

/// Parse `$name=value`; the leading `$` may be omitted to spare shell quoting.
fn parse_assignment(value: &str) -> Result<(String, String), String> {
    let Some((name, assigned)) = value.split_once('=') else {
        return Err(format!("expected $name=value, got '{}'", value));
    };
    let token = if name.starts_with('$') {
        name.to_string()
    } else {
        format!("${}", name)
    };
    if !is_placeholder_token(&token) {
        return Err(format!("'{}' is not a placeholder name", name));
    }
    Ok((token, assigned.to_string()))
}

fn resolve_config(data_dir: Option<PathBuf>) -> Config {
    let mut config = Config::from_env();
    if let Some(dir) = data_dir {
        config.data_dir = dir;
    }
    config
}

fn row_json(row: &TreeRow) -> Value {
    let column = |idx| row.column(idx).unwrap_or_default();
    json!({
        "title": column(TITLE_COLUMN),
        "type": column(TYPE_COLUMN),
        "file": column(FILE_COLUMN),
        "timestamp": column(TIMESTAMP_COLUMN),
    })
}

fn file_name_of(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(path)
}

fn format_rows_output(rows: &[&TreeRow], json: bool) -> anyhow::Result<String> {
    if json {
        let values: Vec<Value> = rows.iter().map(|row| row_json(row)).collect();
        return Ok(serde_json::to_string_pretty(&values)?);
    }
    let lines: Vec<String> = rows
        .iter()
        .map(|row| {
            format!(
                "{:<30} {:<10} {:<36} {}",
                row.column(TITLE_COLUMN).unwrap_or_default(),
                row.column(TYPE_COLUMN).unwrap_or_default(),
                file_name_of(row.column(FILE_COLUMN).unwrap_or_default()),
                row.column(TIMESTAMP_COLUMN).unwrap_or_default()
            )
        })
        .collect();
    Ok(lines.join("\n"))
}

fn format_rendered_output(rendered: &Rendered, json: bool) -> anyhow::Result<String> {
    if !json {
        return Ok(rendered.as_str().to_string());
    }
    let (format, language, spans) = match rendered {
        Rendered::Text(_) => ("text", None, Vec::new()),
        Rendered::Code { language, text } => (
            "code",
            Some(language.display_name()),
            highlight_spans_json(*language, text),
        ),
        Rendered::Html(_) => ("html", None, Vec::new()),
    };
    Ok(serde_json::to_string_pretty(&json!({
        "format": format,
        "language": language,
        "output": rendered.as_str(),
        "spans": spans,
    }))?)
}

fn highlight_spans_json(language: Language, text: &str) -> Vec<Value> {
    Highlighter::shared(language)
        .highlight(text)
        .into_iter()
        .map(|span| {
            json!({
                "start": span.start,
                "end": span.end,
                "class": span.class.name(),
            })
        })
        .collect()
}

fn read_content(file: Option<String>, content: Option<String>) -> anyhow::Result<Option<String>> {
    if let Some(content) = content {
        return Ok(Some(content));
    }
    match file.as_deref() {
        None => Ok(None),
        Some("-") => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(Some(buffer))
        }
        Some(path) => Ok(Some(
            std::fs::read_to_string(path).with_context(|| format!("reading {}", path))?,
        )),
    }
}

fn apply_assignments(
    bench: &mut Workbench,
    assignments: &[(String, String)],
) -> anyhow::Result<()> {
    for (token, value) in assignments {
        bench.session_mut().set_field(token, value)?;
    }
    Ok(())
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let Cli {
        data_dir,
        json,
        command,
    } = cli;

    if let Commands::Completions { shell } = &command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let mut bench = Workbench::open(resolve_config(data_dir))?;
    for failure in bench.load_failures() {
        eprintln!("warning: skipped {}: {}", failure.path.display(), failure.error);
    }

    match command {
        Commands::Completions { .. } => unreachable!("completions handled before opening store"),
        Commands::List {
            query,
            regex,
            case_sensitive,
            remember,
        } => {
            let text = query.unwrap_or_default();
            let query = if regex || bench.config().regex_search {
                Query::regex(text.as_str())
            } else {
                Query::literal(text.as_str())
            }
            .case_sensitive(case_sensitive);
            let is_regex = query.mode == snipbook_core::QueryMode::Regex;
            if !bench.set_query(query).accepted && is_regex {
                compile_pattern(&text, case_sensitive)?;
            }
            if remember {
                bench.record_search()?;
            }

            let rows: Vec<&TreeRow> = bench
                .visible_rows()
                .iter()
                .filter_map(|path| TreeRow::at(bench.library().rows(), path))
                .collect();
            let output = format_rows_output(&rows, json)?;
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Commands::Show { file } => {
            let path = bench.store().resolve(&file);
            let record = bench.store().read(&path)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                println!("{} [{}] {}", record.title, record.kind, record.timestamp);
                println!("{}", record.content);
            }
        }
        Commands::Render {
            file,
            assignments,
            mode,
        } => {
            let path = bench.store().resolve(&file);
            bench.select(&path)?;
            apply_assignments(&mut bench, &assignments)?;
            let session = bench.session();
            let rendered = match mode {
                Some(mode) => session.preview_as(mode.output_mode()),
                None => session.preview(),
            };
            let Some(rendered) = rendered else {
                bail!("snippet {} could not be opened", path.display());
            };
            println!("{}", format_rendered_output(&rendered, json)?);
            // Render never persists the values passed with --set.
            bench.session_mut().close();
        }
        Commands::New {
            title,
            kind,
            content,
            file,
        } => {
            let content = read_content(file, content)?;
            let created = bench.add_snippet()?;
            let session = bench.session_mut();
            if let Some(title) = normalize_optional_nonempty(title) {
                session.set_title(&title)?;
            }
            if let Some(kind) = kind {
                session.set_kind(kind)?;
            }
            if let Some(content) = content {
                session.set_content(&content)?;
            }
            bench.save_if_dirty()?;
            let record = bench.store().read(&created.path)?;
            if json {
                let mut value = serde_json::to_value(&record)?;
                value["file"] = created.path.to_string_lossy().into_owned().into();
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("Created: {} ({})", record.title, created.path.display());
            }
        }
        Commands::Set {
            file,
            title,
            kind,
            assignments,
        } => {
            let path = bench.store().resolve(&file);
            bench.select(&path)?;
            if let Some(title) = normalize_optional_nonempty(title) {
                bench.session_mut().set_title(&title)?;
            }
            if let Some(kind) = kind {
                bench.session_mut().set_kind(kind)?;
            }
            apply_assignments(&mut bench, &assignments)?;
            let changes = bench.save_if_dirty()?;
            let labels: Vec<&str> = changes.iter().map(|change| change.label()).collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&json!({ "changes": labels }))?);
            } else if labels.is_empty() {
                println!("No changes");
            } else {
                println!("Updated {}: {}", file_name_of(&file), labels.join(", "));
            }
        }
        Commands::Delete { file } => {
            let deleted = bench.store().resolve(&file);
            bench.delete_path(&deleted)?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({ "deleted": deleted }))?
                );
            } else {
                println!("Deleted snippet: {}", deleted.display());
            }
        }
        Commands::History { action } => {
            if let Some(HistoryAction::Add { keyword }) = action {
                bench.set_query(Query::literal(keyword));
                bench.record_search()?;
            }
            let entries = bench.history().entries();
            if json {
                println!("{}", serde_json::to_string_pretty(entries)?);
            } else if !entries.is_empty() {
                println!("{}", entries.join("\n"));
            }
        }
    }

    bench.close()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "snipbook=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    run(Cli::parse())
}

#[cfg(test)]
mod tests;
