//! Editor session tests.

use super::*;
use crate::test_support::{setup_temp_store, write_snippet};
use chrono::TimeZone;
use serde_json::json;

fn record_with_values(content: &str, values: &[(&str, &str)]) -> SnippetRecord {
    let mut record = SnippetRecord::new(
        SnippetKind::PlainText,
        "greeting".to_string(),
        content.to_string(),
        "2024-01-01 00:00:00.000000".to_string(),
    );
    for (token, value) in values {
        record
            .extra
            .insert(token.to_string(), Value::String(value.to_string()));
    }
    record
}

fn fixed_now() -> DateTime<Local> {
    Local
        .with_ymd_and_hms(2024, 6, 2, 9, 0, 0)
        .single()
        .expect("unambiguous time")
}

#[test]
fn open_restores_values_only_for_tokens_in_content() {
    let (store, _temp) = setup_temp_store();
    let stored = write_snippet(
        &store,
        "a.json",
        record_with_values("Hi $name from $city", &[("$name", "Bob"), ("$stale", "x")]),
    );

    let mut session = EditorSession::new();
    session.open(&stored);

    assert_eq!(session.tokens(), ["$name", "$city"]);
    let bindings = session.bindings().expect("open");
    assert_eq!(bindings.get("$name"), Some("Bob"));
    assert_eq!(bindings.get("$city"), Some(""));
    assert!(!bindings.contains("$stale"));
    assert!(session.pending_changes().is_empty());
}

#[test]
fn editing_without_changing_token_set_keeps_values() {
    let (store, _temp) = setup_temp_store();
    let stored = write_snippet(
        &store,
        "a.json",
        record_with_values("Hello $name", &[("$name", "Bob")]),
    );
    let mut session = EditorSession::new();
    session.open(&stored);

    let update = session.set_content("Hello $name, bye $name").expect("set");
    assert!(!update.layout_changed);
    assert_eq!(session.bindings().and_then(|b| b.get("$name")), Some("Bob"));

    let rendered = session.preview().expect("preview");
    assert!(rendered.as_str().contains(
        "Hello <span style=\"color: black; font-weight: bold;\">Bob</span>, bye"
    ));
}

#[test]
fn token_set_change_rebuilds_layout_and_carries_values() {
    let (store, _temp) = setup_temp_store();
    let stored = write_snippet(
        &store,
        "a.json",
        record_with_values("$a $b", &[("$a", "1"), ("$b", "2")]),
    );
    let mut session = EditorSession::new();
    session.open(&stored);

    let update = session.set_content("$a $c").expect("set");
    assert!(update.layout_changed);
    assert_eq!(update.tokens, vec!["$a".to_string(), "$c".to_string()]);
    let bindings = session.bindings().expect("open");
    assert_eq!(bindings.get("$a"), Some("1"));
    assert_eq!(bindings.get("$c"), Some(""));
    assert!(!bindings.contains("$b"));
}

#[test]
fn set_field_rejects_unknown_tokens() {
    let (store, _temp) = setup_temp_store();
    let stored = write_snippet(&store, "a.json", record_with_values("$a", &[]));
    let mut session = EditorSession::new();
    session.open(&stored);

    session.set_field("$a", "v").expect("known token");
    assert!(matches!(
        session.set_field("$zzz", "v"),
        Err(AppError::NotFound(_))
    ));
    assert_eq!(session.pending_changes(), vec![ChangeKind::Placeholders]);
}

#[test]
fn closed_session_rejects_edits() {
    let mut session = EditorSession::new();
    assert!(matches!(
        session.set_content("x"),
        Err(AppError::BadRequest(_))
    ));
    assert!(session.preview().is_none());
    assert!(session.pending_changes().is_empty());
}

#[test]
fn pending_changes_track_each_field() {
    let (store, _temp) = setup_temp_store();
    let stored = write_snippet(&store, "a.json", record_with_values("", &[]));
    let mut session = EditorSession::new();
    session.open(&stored);

    session.set_content("now with $x").expect("content");
    session.set_title("renamed").expect("title");
    session.set_kind(SnippetKind::Markdown).expect("kind");
    assert_eq!(
        session.pending_changes(),
        vec![
            ChangeKind::Content,
            ChangeKind::Title,
            ChangeKind::Kind,
            ChangeKind::Placeholders
        ]
    );
    assert_eq!(ChangeKind::Kind.to_string(), "content type");
}

#[test]
fn empty_loaded_content_still_detects_edits() {
    let (store, _temp) = setup_temp_store();
    let stored = write_snippet(&store, "a.json", record_with_values("", &[]));
    let mut session = EditorSession::new();
    session.open(&stored);

    session.set_content("typed").expect("content");
    assert!(session.is_dirty());
}

#[test]
fn to_record_stores_every_token_and_keeps_other_keys() {
    let (store, _temp) = setup_temp_store();
    let mut record = record_with_values("$a $b", &[("$a", "1")]);
    record.extra.insert("pinned".to_string(), json!(true));
    let stored = write_snippet(&store, "a.json", record);

    let mut session = EditorSession::new();
    session.open(&stored);
    let out = session.to_record("ts").expect("open");

    assert_eq!(out.timestamp, "ts");
    assert_eq!(out.placeholder("$a"), Some("1"));
    assert_eq!(out.placeholder("$b"), Some(""));
    assert_eq!(out.extra.get("pinned"), Some(&json!(true)));
}

#[test]
fn save_writes_record_and_clears_dirty_state() {
    let (store, _temp) = setup_temp_store();
    let stored = write_snippet(&store, "a.json", record_with_values("Hi $name", &[]));
    let mut session = EditorSession::new();
    session.open(&stored);
    session.set_field("$name", "Ann").expect("field");
    session.set_title("hello").expect("title");

    let saved = session.save_at(&store, fixed_now()).expect("save");
    assert_eq!(saved.record.timestamp, "2024-06-02 09:00:00.000000");
    assert!(session.pending_changes().is_empty());

    let on_disk = store.read(&stored.path).expect("read");
    assert_eq!(on_disk.title, "hello");
    assert_eq!(on_disk.placeholder("$name"), Some("Ann"));
    assert_eq!(on_disk, saved.record);
}

#[test]
fn preview_mode_follows_kind() {
    let (store, _temp) = setup_temp_store();
    let stored = write_snippet(
        &store,
        "a.json",
        record_with_values("x = $v", &[("$v", "1")]),
    );
    let mut session = EditorSession::new();
    session.open(&stored);

    session.set_kind(SnippetKind::Python).expect("kind");
    assert_eq!(
        session.preview(),
        Some(Rendered::Code {
            language: crate::highlight::Language::Python,
            text: "x = 1".to_string()
        })
    );

    session.set_kind(SnippetKind::Markdown).expect("kind");
    assert!(session.preview().is_some_and(|rendered| rendered.is_html()));
}
