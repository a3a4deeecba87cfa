//! Unit tests for the `snipbook` CLI entrypoint module.

use super::{
    file_name_of, format_rendered_output, format_rows_output, parse_assignment, parse_kind, run,
    Cli, Commands, HistoryAction, RenderMode,
};
use clap::Parser;
use snipbook_core::highlight::Language;
use snipbook_core::{OutputMode, Rendered, SnippetKind, SnippetStore, TreeRow};
use std::path::Path;
use tempfile::TempDir;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).expect("cli should parse")
}

fn data_dir_arg(temp: &TempDir) -> String {
    temp.path().join("data").to_string_lossy().into_owned()
}

fn only_snippet(temp: &TempDir) -> snipbook_core::StoredSnippet {
    let store = SnippetStore::open(temp.path().join("data")).expect("store");
    let mut report = store.load_all().expect("load");
    assert_eq!(report.snippets.len(), 1);
    report.snippets.remove(0)
}

#[test]
fn parse_assignment_accepts_with_and_without_dollar() {
    assert_eq!(
        parse_assignment("$name=Bob"),
        Ok(("$name".to_string(), "Bob".to_string()))
    );
    assert_eq!(
        parse_assignment("city=a=b"),
        Ok(("$city".to_string(), "a=b".to_string()))
    );
    assert_eq!(
        parse_assignment("$empty="),
        Ok(("$empty".to_string(), String::new()))
    );
    assert!(parse_assignment("novalue").is_err());
    assert!(parse_assignment("bad-name=1").is_err());
}

#[test]
fn parse_kind_uses_lenient_labels() {
    assert_eq!(parse_kind("cpp"), Ok(SnippetKind::Cpp));
    assert!(parse_kind("cobol").is_err());
}

#[test]
fn cli_parses_list_with_regex_flags() {
    let cli = parse(&["snipbook", "--json", "list", "^b", "--regex", "--case-sensitive"]);
    assert!(cli.json);
    match cli.command {
        Commands::List {
            query,
            regex,
            case_sensitive,
            remember,
        } => {
            assert_eq!(query.as_deref(), Some("^b"));
            assert!(regex);
            assert!(case_sensitive);
            assert!(!remember);
        }
        _ => panic!("expected list command"),
    }
}

#[test]
fn cli_parses_render_assignments_and_mode() {
    let cli = parse(&[
        "snipbook", "render", "a.json", "--set", "$a=1", "-s", "b=2", "--mode", "marked",
    ]);
    match cli.command {
        Commands::Render {
            file,
            assignments,
            mode,
        } => {
            assert_eq!(file, "a.json");
            assert_eq!(
                assignments,
                vec![
                    ("$a".to_string(), "1".to_string()),
                    ("$b".to_string(), "2".to_string())
                ]
            );
            assert_eq!(mode, Some(RenderMode::Marked));
            assert_eq!(RenderMode::Marked.output_mode(), OutputMode::MarkedHtml);
        }
        _ => panic!("expected render command"),
    }
}

#[test]
fn cli_rejects_content_together_with_file() {
    assert!(
        Cli::try_parse_from(["snipbook", "new", "--content", "x", "--file", "y"]).is_err()
    );
}

#[test]
fn cli_parses_history_add() {
    let cli = parse(&["snipbook", "history", "add", "pie"]);
    match cli.command {
        Commands::History {
            action: Some(HistoryAction::Add { keyword }),
        } => assert_eq!(keyword, "pie"),
        _ => panic!("expected history add command"),
    }
}

#[test]
fn data_dir_flag_is_global() {
    let cli = parse(&["snipbook", "show", "a.json", "--data-dir", "/tmp/snips"]);
    assert_eq!(cli.data_dir.as_deref(), Some(Path::new("/tmp/snips")));
}

#[test]
fn rows_output_shows_file_name_only() {
    let row = TreeRow::new(["apple pie", "Python", "/data/a.json", "2024"]);
    let output = format_rows_output(&[&row], false).expect("render");
    assert!(output.starts_with("apple pie"));
    assert!(output.contains(" a.json "));
    assert!(!output.contains("/data/"));

    let json = format_rows_output(&[&row], true).expect("render");
    let parsed: serde_json::Value = serde_json::from_str(&json).expect("valid json");
    assert_eq!(parsed[0]["file"], "/data/a.json");
    assert_eq!(parsed[0]["type"], "Python");
    assert_eq!(file_name_of("plain"), "plain");
}

#[test]
fn rendered_json_output_names_format_and_language() {
    let rendered = Rendered::Code {
        language: Language::Cpp,
        text: "int x;".to_string(),
    };
    let json = format_rendered_output(&rendered, true).expect("render");
    let parsed: serde_json::Value = serde_json::from_str(&json).expect("valid json");
    assert_eq!(parsed["format"], "code");
    assert_eq!(parsed["language"], Language::Cpp.display_name());
    assert_eq!(parsed["output"], "int x;");
    assert_eq!(parsed["spans"][0]["class"], "keyword");
    assert_eq!(parsed["spans"][0]["start"], 0);
    assert_eq!(parsed["spans"][0]["end"], 3);
    assert_eq!(
        format_rendered_output(&rendered, false).expect("render"),
        "int x;"
    );
}

#[test]
fn new_then_set_updates_stored_snippet() {
    let temp = TempDir::new().expect("temp dir");
    let dir = data_dir_arg(&temp);

    run(parse(&[
        "snipbook",
        "--data-dir",
        &dir,
        "new",
        "--title",
        "greet",
        "--kind",
        "py",
        "--content",
        "print('$msg')",
    ]))
    .expect("new");
    let created = only_snippet(&temp);
    assert_eq!(created.record.title, "greet");
    assert_eq!(created.record.kind, SnippetKind::Python);
    assert_eq!(created.record.placeholder("$msg"), Some(""));

    let file = created.path.to_string_lossy().into_owned();
    run(parse(&[
        "snipbook", "--data-dir", &dir, "set", &file, "--set", "msg=hi", "--title", "hello",
    ]))
    .expect("set");
    let updated = only_snippet(&temp);
    assert_eq!(updated.record.title, "hello");
    assert_eq!(updated.record.placeholder("$msg"), Some("hi"));
}

#[test]
fn render_does_not_persist_assignments() {
    let temp = TempDir::new().expect("temp dir");
    let dir = data_dir_arg(&temp);
    run(parse(&[
        "snipbook", "--data-dir", &dir, "new", "--content", "Hi $name",
    ]))
    .expect("new");
    let created = only_snippet(&temp);
    let file = created.path.to_string_lossy().into_owned();

    run(parse(&[
        "snipbook", "--data-dir", &dir, "render", &file, "--set", "name=Bob",
    ]))
    .expect("render");
    assert_eq!(only_snippet(&temp).record, created.record);
}

#[test]
fn render_rejects_unknown_placeholder() {
    let temp = TempDir::new().expect("temp dir");
    let dir = data_dir_arg(&temp);
    run(parse(&["snipbook", "--data-dir", &dir, "new", "--content", "$a"])).expect("new");
    let file = only_snippet(&temp).path.to_string_lossy().into_owned();

    let err = run(parse(&[
        "snipbook", "--data-dir", &dir, "render", &file, "--set", "zzz=1",
    ]))
    .expect_err("unknown placeholder");
    assert!(err.to_string().contains("$zzz"));
}

#[test]
fn list_with_invalid_regex_reports_pattern_error() {
    let temp = TempDir::new().expect("temp dir");
    let dir = data_dir_arg(&temp);
    let err = run(parse(&[
        "snipbook", "--data-dir", &dir, "list", "(unclosed", "--regex",
    ]))
    .expect_err("invalid regex");
    assert!(err.to_string().contains("(unclosed"));
}

#[test]
fn delete_removes_snippet_file() {
    let temp = TempDir::new().expect("temp dir");
    let dir = data_dir_arg(&temp);
    run(parse(&["snipbook", "--data-dir", &dir, "new"])).expect("new");
    let created = only_snippet(&temp);
    let file_name = created
        .path
        .file_name()
        .and_then(|name| name.to_str())
        .expect("file name")
        .to_string();

    run(parse(&["snipbook", "--data-dir", &dir, "delete", &file_name])).expect("delete");
    assert!(!created.path.exists());
}

#[test]
fn delete_removes_corrupt_snippet_file() {
    let temp = TempDir::new().expect("temp dir");
    let dir = data_dir_arg(&temp);
    std::fs::create_dir_all(&dir).expect("data dir");
    let corrupt = temp.path().join("data").join("broken.json");
    std::fs::write(&corrupt, "{ not json").expect("write");

    run(parse(&["snipbook", "--data-dir", &dir, "delete", "broken.json"])).expect("delete");
    assert!(!corrupt.exists());
}
