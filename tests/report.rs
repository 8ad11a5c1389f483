// Scanning, parsing and saving through the report.

use tiny::parse::SyntaxErrorKind;
use tiny::report::Outcome;
use tiny::report::SaveError;
use tiny::NodeKind;
use tiny::Report;
use tiny::TokenType;

#[test]
fn end_to_end() {
    let report = Report::build("read x; if x < 0 then write x end");
    assert!(!report.has_errors());

    let root = report.root().unwrap();
    assert_eq!(root.kind(), NodeKind::Read);
    assert_eq!(root.next().map(|n| n.kind()), Some(NodeKind::If));
}

#[test]
fn missing_end_points_at_last_token() {
    let report = Report::build("if x then");
    let e = report.syntax_error().unwrap();
    assert_eq!(e.kind, SyntaxErrorKind::UnexpectedEnd);
    assert_eq!(e.token_index, 2);

    let token = report.offending_token().unwrap();
    assert_eq!(token.token_type, TokenType::Then);
}

#[test]
fn lexical_errors_skip_parsing() {
    let report = Report::build("x := 12abc");
    assert_eq!(report.outcome, Outcome::Skipped);
    assert_eq!(report.lex_errors.len(), 1);
    assert!(report.root().is_none());
    assert!(report.has_errors());
}

#[test]
fn comments_stay_in_tokens_but_not_parser_tokens() {
    let report = Report::build("{ hi } write 1");
    assert_eq!(report.tokens.len(), 3);
    assert_eq!(report.parser_tokens().len(), 2);
}

#[test]
fn save_writes_results() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("out");
    let source = "{ square }\nread x;\nwrite x * x\n";
    let report = Report::build(source);
    report.save(&dir).unwrap();

    assert_eq!(std::fs::read_to_string(dir.join("code.txt")).unwrap(), source);

    let tokens: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.join("tokens.json")).unwrap()).unwrap();
    let tokens = tokens.as_array().unwrap();
    assert_eq!(tokens.len(), 7);
    assert_eq!(
        tokens[0],
        serde_json::json!({ "type": "READ", "value": "read", "line": 2, "column": 1 })
    );

    let tree = std::fs::read_to_string(dir.join("parseTree.txt")).unwrap();
    assert_eq!(tree, "read (x)\nwrite\n  op (*)\n    id (x)\n    id (x)\n");
}

#[test]
fn save_needs_a_tree() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("out");
    let report = Report::build("write");
    assert!(matches!(report.save(&dir), Err(SaveError::NoTree)));
    assert!(!dir.exists());
}

#[test]
fn deep_programs_fail_without_a_tree() {
    let depth = 100_000;
    let source = format!("x := {}1{}", "(1 + ".repeat(depth), ")".repeat(depth));
    let report = Report::build(source);
    let e = report.syntax_error().unwrap();
    assert_eq!(e.kind, SyntaxErrorKind::TooDeep { limit: tiny::parse::MAX_HEIGHT });
    assert!(report.root().is_none());
}
