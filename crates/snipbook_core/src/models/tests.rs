use super::snippet::{SnippetKind, SnippetRecord};
use crate::highlight::Language;
use crate::placeholder::{OutputMode, PlaceholderBindings};
use serde_json::json;

#[test]
fn record_missing_keys_fall_back_to_defaults() {
    let record: SnippetRecord = serde_json::from_str("{}").expect("parse");
    assert_eq!(record.title, "Unknown");
    assert_eq!(record.kind, SnippetKind::PlainText);
    assert_eq!(record.kind.label(), "Plain text");
    assert!(record.content.is_empty());
    assert!(record.timestamp.is_empty());
    assert!(record.extra.is_empty());
}

#[test]
fn record_round_trip_keeps_unknown_kind_and_extra_keys() {
    let value = json!({
        "type": "Rust",
        "title": "t",
        "content": "fn $name() {}",
        "timestamp": "2024-01-01 10:00:00.000000",
        "$name": "main",
        "pinned": true
    });
    let record: SnippetRecord = serde_json::from_value(value.clone()).expect("parse");
    assert_eq!(record.kind, SnippetKind::Other("Rust".to_string()));
    assert_eq!(record.kind.language(), Language::PlainText);

    let back = serde_json::to_value(&record).expect("serialize");
    assert_eq!(back, value);
}

#[test]
fn placeholders_only_yield_string_valued_tokens() {
    let record: SnippetRecord = serde_json::from_value(json!({
        "content": "$a $b",
        "$a": "1",
        "$b": 2,
        "note": "x"
    }))
    .expect("parse");

    let found: Vec<(&str, &str)> = record.placeholders().collect();
    assert_eq!(found, vec![("$a", "1")]);
    assert_eq!(record.placeholder("$a"), Some("1"));
    assert_eq!(record.placeholder("$b"), None);
    assert_eq!(record.placeholder("note"), None);
}

#[test]
fn set_placeholders_replaces_tokens_and_keeps_other_extras() {
    let mut record: SnippetRecord = serde_json::from_value(json!({
        "content": "$new",
        "$old": "stale",
        "pinned": true
    }))
    .expect("parse");

    let bindings: PlaceholderBindings = [("$new", "fresh")].into_iter().collect();
    record.set_placeholders(&bindings);

    assert_eq!(record.placeholder("$old"), None);
    assert_eq!(record.placeholder("$new"), Some("fresh"));
    assert_eq!(record.extra.get("pinned"), Some(&json!(true)));
}

#[test]
fn kind_parsing_is_lenient_for_user_input() {
    assert_eq!("cpp".parse::<SnippetKind>(), Ok(SnippetKind::Cpp));
    assert_eq!(" C++ ".parse::<SnippetKind>(), Ok(SnippetKind::Cpp));
    assert_eq!("py".parse::<SnippetKind>(), Ok(SnippetKind::Python));
    assert_eq!("MD".parse::<SnippetKind>(), Ok(SnippetKind::Markdown));
    assert_eq!("plain text".parse::<SnippetKind>(), Ok(SnippetKind::PlainText));
    let err = "cobol".parse::<SnippetKind>().expect_err("unknown kind");
    assert!(err.contains("Plain text, Python, C++, Markdown"));
}

#[test]
fn kind_labels_round_trip_through_strings() {
    for kind in SnippetKind::SELECTABLE {
        let label: String = kind.clone().into();
        assert_eq!(SnippetKind::from(label), kind);
    }
}

#[test]
fn output_mode_follows_kind() {
    assert_eq!(SnippetKind::PlainText.output_mode(), OutputMode::MarkedHtml);
    assert_eq!(
        SnippetKind::Python.output_mode(),
        OutputMode::Syntax(Language::Python)
    );
    assert_eq!(
        SnippetKind::Cpp.output_mode(),
        OutputMode::Syntax(Language::Cpp)
    );
    assert_eq!(SnippetKind::Markdown.output_mode(), OutputMode::MarkdownHtml);
    assert_eq!(
        SnippetKind::Other("Rust".to_string()).output_mode(),
        OutputMode::MarkedHtml
    );
}
