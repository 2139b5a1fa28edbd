//! Integration tests for the parsing module.
//!
//! Fixtures (.md) live in `fixtures/`. Outlines are rendered to an indented text
//! form and compared with inline snapshots.


use rstest::rstest;
use std::collections::BTreeMap;
use std::fmt::Write;

use crate::editing::paths;
use crate::models::Page;
use crate::parsing::{
    Diagnostic, ParseOptions, ParseResult,
    inline::{Segment, SegmentKind},
    lines::{LineKind, strip_task_prefix},
    parse_document,
};

fn parse_fixture(name: &str) -> ParseResult {
    let fixtures_dir = format!("{}/src/parsing/tests/fixtures", env!("CARGO_MANIFEST_DIR"));
    let md = std::fs::read_to_string(format!("{fixtures_dir}/{name}.md")).unwrap();
    let result = parse_document(name, &md, &ParseOptions::default());
    invariants::check_parsed(&result);
    result
}

/// One line per block: nesting, id, depth, content and task markers.
fn render(page: &Page) -> String {
    let mut out = String::new();
    for (handle, path) in paths(page.outline()) {
        let block = page.block(handle).unwrap();
        let indent = "  ".repeat(path.len() - 1);
        write!(
            out,
            "{indent}- {} d{} {:?}",
            block.id(),
            block.depth(),
            block.content()
        )
        .unwrap();
        if let Some(state) = block.task().state {
            write!(out, " [{state:?}]").unwrap();
        }
        if let Some(checkbox) = block.task().checkbox {
            write!(out, " [{checkbox:?}]").unwrap();
        }
        out.push('\n');
    }
    out.trim_end().to_string()
}

// Fixture-based snapshot tests

#[test]
fn fixture_sprint_review_outline() {
    let result = parse_fixture("sprint_review");

    insta::assert_snapshot!(render(&result.page), @r##"
    - block-1 d0 "TODO [#A] Finish [[Parser]] rewrite #urgent\nid:: 64d1-0001" [Todo]
      - block-2 d1 "DONE Write tests for ((64d1-0001))" [Done]
      - block-3 d1 "[ ] Update docs\nowner:: [[Sam]]" [Unchecked]
    - block-4 d0 "Notes with **bold** and ==highlight=="
      - block-5 d3 "jumped too deep"
    - block-6 d0 "{{query (todo now)}}"
    "##);
}

#[test]
fn fixture_sprint_review_page_metadata() {
    let result = parse_fixture("sprint_review");
    let page = &result.page;

    assert_eq!(page.title(), Some("Sprint Review"));
    assert_eq!(
        page.properties(),
        &BTreeMap::from([
            ("tags".to_string(), "meeting, review".to_string()),
            ("title".to_string(), "Sprint Review".to_string()),
        ])
    );
    assert_eq!(result.lines[3].kind, LineKind::Header { level: 1 });
    assert_eq!(
        result.diagnostics,
        vec![Diagnostic::IndentJump {
            line: 11,
            expected_max: 1,
            found: 3
        }]
    );
}

#[test]
fn fixture_sprint_review_block_metadata() {
    let result = parse_fixture("sprint_review");
    let page = &result.page;

    let target = page.block_by_uuid("64d1-0001").unwrap();
    let first = page.block(target).unwrap();
    assert_eq!(first.tags().collect::<Vec<_>>(), vec!["urgent"]);
    assert_eq!(first.task().priority, Some('A'));

    let blocks: Vec<_> = page.blocks().collect();
    assert_eq!(blocks[1].block_refs().collect::<Vec<_>>(), vec!["64d1-0001"]);
    assert_eq!(blocks[2].references().collect::<Vec<_>>(), vec!["Sam"]);
    assert_eq!(
        blocks[5].segments(),
        &[Segment::new(SegmentKind::Query, "{{query (todo now)}}")]
    );
}

#[rstest]
#[case("- plain words only", "plain words only")]
#[case("- TODO [#A] Fix #bug in [[parser]] id:: abc-123", "Fix bug in parser id:: abc-123")]
#[case("- see [[Page A]] and **bold** then ==mark==", "see Page A and bold then mark")]
#[case("- DONE ~~old~~ *new* ((64d1-0001))", "old new 64d1-0001")]
fn segments_reconstruct_stripped_content(#[case] text: &str, #[case] expected: &str) {
    let result = parse_document("inline", text, &ParseOptions::default());
    let block = result.page.blocks().next().unwrap();

    let joined: String = block.segments().iter().map(|s| s.content.as_str()).collect();

    assert_eq!(joined, expected);
    assert_eq!(strip_delimiters(strip_task_prefix(block.content())), expected);
}

fn strip_delimiters(content: &str) -> String {
    ["[[", "]]", "**", "==", "~~", "((", "))", "*", "#"]
        .into_iter()
        .fold(content.to_string(), |acc, d| acc.replace(d, ""))
}

#[test]
fn regular_indentation_gives_exact_depths() {
    let text = "- a\n  - b\n    - c\n      - d\n  - e\n- f";
    let result = parse_document("regular", text, &ParseOptions::default());

    assert!(result.diagnostics.is_empty());
    invariants::check_parsed(&result);
    assert_eq!(
        result.page.blocks().map(|b| b.depth()).collect::<Vec<_>>(),
        vec![0, 1, 2, 3, 1, 0]
    );
}

// Edge cases

#[test]
fn empty_document() {
    let result = parse_document("empty", "", &ParseOptions::default());

    assert!(result.page.outline().is_empty());
    assert_eq!(result.lines.len(), 1);
    assert_eq!(result.page.title(), None);
}

#[test]
fn headers_only() {
    let result = parse_document("h", "# One\n## Two", &ParseOptions::default());

    assert!(result.page.all_blocks().is_empty());
    assert_eq!(result.page.title(), Some("One"));
}

#[test]
fn crlf_line_endings() {
    let result = parse_document("crlf", "- a\r\n  - b\r\n", &ParseOptions::default());
    invariants::check_parsed(&result);

    insta::assert_snapshot!(render(&result.page), @r#"
    - block-1 d0 "a"
      - block-2 d1 "b"
    "#);
}

#[test]
fn tabs_are_not_indentation() {
    let result = parse_document("tabs", "- a\n\t- b", &ParseOptions::default());

    assert_eq!(result.page.outline().roots().len(), 2);
    assert_eq!(result.diagnostics, vec![Diagnostic::TabIndent { line: 2 }]);
}

#[test]
fn custom_indent_width() {
    let options = ParseOptions { indent_width: 4 };
    let result = parse_document("wide", "- a\n    - b\n  - c", &options);
    invariants::check_parsed(&result);

    insta::assert_snapshot!(render(&result.page), @r#"
    - block-1 d0 "a"
      - block-2 d1 "b"
    - block-3 d0 "c"
    "#);
}

#[test]
fn dedent_returns_to_matching_ancestor() {
    let text = "- a\n  - b\n    - c\n  - d\n- e";
    let result = parse_document("dedent", text, &ParseOptions::default());
    invariants::check_parsed(&result);

    insta::assert_snapshot!(render(&result.page), @r#"
    - block-1 d0 "a"
      - block-2 d1 "b"
        - block-3 d2 "c"
      - block-4 d1 "d"
    - block-5 d0 "e"
    "#);
}

#[test]
fn first_block_indented_is_still_top_level() {
    let result = parse_document("late", "    - deep start\n- next", &ParseOptions::default());
    invariants::check_parsed(&result);

    let roots = result.page.outline().roots();
    assert_eq!(roots.len(), 2);
    assert_eq!(result.page.block(roots[0]).unwrap().depth(), 2);
    assert_eq!(result.diagnostics.len(), 1);
}

#[test]
fn edits_keep_invariants() {
    // Given a parsed page
    let mut result = parse_fixture("sprint_review");

    // When blocks are inserted, edited and removed by path
    let page = &mut result.page;
    page.insert_block(&vec![0, 1].into(), crate::models::Block::new("inserted"))
        .unwrap();
    let handle = page.find_block(&vec![0, 1].into()).unwrap();
    page.set_block_content(handle, "DOING inserted [[Link]]");
    page.remove_block(&vec![1].into()).unwrap();

    // Then the page is still well formed
    invariants::check(page);
    let new_id = page.block(handle).unwrap().id().to_string();
    let rendered = render(page).replace(&new_id, "NEW");
    insta::assert_snapshot!(rendered, @r#"
    - block-1 d0 "TODO [#A] Finish [[Parser]] rewrite #urgent\nid:: 64d1-0001" [Todo]
      - block-2 d1 "DONE Write tests for ((64d1-0001))" [Done]
      - NEW d1 "DOING inserted [[Link]]" [Doing]
      - block-3 d1 "[ ] Update docs\nowner:: [[Sam]]" [Unchecked]
    - block-6 d0 "{{query (todo now)}}"
    "#);
}
