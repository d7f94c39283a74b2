//! End-to-end round trips over scratch template trees.
//!
//! A scripted tool stands in for the linter, so these tests check the
//! restore and commit guarantees without needing ruff installed.

use template_fmt::core::token_map::{TokenMap, TokenPair};
use template_fmt::core::types::{Finish, PassStatus, RunMode};
use template_fmt::io::config::FormatConfig;
use template_fmt::round_trip::{format_template, run_round_trip};
use template_fmt::test_support::{ScriptedTool, TemplateDir};

const TOKEN: &str = "{{ cookiecutter.package_name }}";

fn package_map() -> TokenMap {
    TokenMap::new(vec![TokenPair::new(TOKEN, "placeholder_package")]).expect("map")
}

/// The trailing-newline scenario: discard restores the exact input, commit
/// keeps the newline with the token put back.
#[test]
fn trailing_newline_scenario_in_both_modes() {
    let original = format!("print(\"{TOKEN}\")");

    let dir = TemplateDir::new().expect("dir");
    let file = dir.write("a.py", &original).expect("write");
    let tool = ScriptedTool::appending("\n");
    let report = run_round_trip(
        std::slice::from_ref(&file),
        &package_map(),
        &tool,
        RunMode::Discard,
    )
    .expect("discard run");
    assert_eq!(tool.seen(), vec!["print(\"placeholder_package\")".to_string()]);
    assert_eq!(report.outcomes[0].status, PassStatus::Fixed(String::new()));
    assert_eq!(dir.read("a.py").expect("read"), original);

    let file = dir.write("a.py", &original).expect("write");
    let report = run_round_trip(
        std::slice::from_ref(&file),
        &package_map(),
        &ScriptedTool::appending("\n"),
        RunMode::Commit,
    )
    .expect("commit run");
    assert_eq!(
        report.finish,
        Finish::Committed {
            changed: 1,
            unchanged: 0
        }
    );
    assert_eq!(
        dir.read("a.py").expect("read"),
        format!("print(\"{TOKEN}\")\n")
    );
}

#[test]
fn commit_with_noop_tool_changes_nothing() {
    let dir = TemplateDir::new().expect("dir");
    let contents = [
        ("pkg/__init__.py", format!("from {TOKEN}.utils import x\n")),
        ("pkg/train.py", "def train():\n    pass\n".to_string()),
        ("setup.py", format!("name = \"{TOKEN}\"\r\n")),
    ];
    let files: Vec<_> = contents
        .iter()
        .map(|(rel, body)| dir.write(rel, body).expect("write"))
        .collect();

    let report = run_round_trip(&files, &package_map(), &ScriptedTool::noop(), RunMode::Commit)
        .expect("run");

    assert!(report.success());
    assert_eq!(report.substituted, 2);
    assert_eq!(
        report.finish,
        Finish::Committed {
            changed: 0,
            unchanged: 3
        }
    );
    for (rel, body) in &contents {
        assert_eq!(&dir.read(rel).expect("read"), body, "{rel}");
    }
}

/// Whitespace edits next to a substitute survive the commit with the token restored.
#[test]
fn commit_keeps_whitespace_edits_around_tokens() {
    let dir = TemplateDir::new().expect("dir");
    let file = dir
        .write("a.py", &format!("import   {TOKEN}\nx=1"))
        .expect("write");
    let tool = ScriptedTool::new(|content| {
        content
            .replace("import   placeholder_package", "import placeholder_package")
            .replace("x=1", "x = 1\n")
    });

    run_round_trip(std::slice::from_ref(&file), &package_map(), &tool, RunMode::Commit)
        .expect("run");

    assert_eq!(
        dir.read("a.py").expect("read"),
        format!("import {TOKEN}\nx = 1\n")
    );
}

#[test]
fn failure_on_one_file_still_finishes_all_files() {
    for mode in [RunMode::Discard, RunMode::Commit] {
        let dir = TemplateDir::new().expect("dir");
        let files = vec![
            dir.write("a.py", &format!("import {TOKEN}")).expect("write"),
            dir.write("b.py", &format!("print(\"{TOKEN}\")")).expect("write"),
            dir.write("c.py", &format!("{TOKEN} = 1")).expect("write"),
        ];
        let tool = ScriptedTool::appending("\n").failing_on("b.py");

        let report = run_round_trip(&files, &package_map(), &tool, mode).expect("run");

        assert!(!report.success());
        let failed: Vec<_> = report
            .failures()
            .map(|o| o.path.file_name().expect("name").to_string_lossy().into_owned())
            .collect();
        assert_eq!(failed, vec!["b.py".to_string()]);

        for rel in ["a.py", "b.py", "c.py"] {
            let content = dir.read(rel).expect("read");
            assert!(content.contains(TOKEN), "{rel} lost its token: {content}");
            assert!(!content.contains("placeholder_package"), "{rel}: {content}");
        }
        match mode {
            RunMode::Discard => {
                assert_eq!(dir.read("a.py").expect("read"), format!("import {TOKEN}"));
                assert_eq!(report.finish, Finish::Restored { files: 3 });
            }
            RunMode::Commit => {
                assert_eq!(dir.read("a.py").expect("read"), format!("import {TOKEN}\n"));
                assert_eq!(
                    dir.read("b.py").expect("read"),
                    format!("print(\"{TOKEN}\")")
                );
                assert_eq!(
                    report.finish,
                    Finish::Committed {
                        changed: 2,
                        unchanged: 1
                    }
                );
            }
        }
    }
}

#[test]
fn passes_run_over_all_files_in_order() {
    let dir = TemplateDir::new().expect("dir");
    let files = vec![
        dir.write("a.py", "a").expect("write"),
        dir.write("b.py", "b").expect("write"),
    ];
    let tool = ScriptedTool::appending("!").with_passes(&["check", "format"]);

    let report = run_round_trip(&files, &package_map(), &tool, RunMode::Commit).expect("run");

    assert_eq!(
        tool.seen(),
        vec!["a", "b", "a!", "b!"]
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>()
    );
    let order: Vec<(String, String)> = report
        .outcomes
        .iter()
        .map(|o| {
            (
                o.pass.clone(),
                o.path.file_name().expect("name").to_string_lossy().into_owned(),
            )
        })
        .collect();
    assert_eq!(
        order,
        vec![
            ("check".to_string(), "a.py".to_string()),
            ("check".to_string(), "b.py".to_string()),
            ("format".to_string(), "a.py".to_string()),
            ("format".to_string(), "b.py".to_string()),
        ]
    );
    assert_eq!(dir.read("a.py").expect("read"), "a!!");
}

#[test]
fn format_template_uses_default_config() {
    let dir = TemplateDir::new().expect("dir");
    dir.write(
        "{{cookiecutter.package_name}}/utils/__init__.py",
        "from {{cookiecutter.package_name}}.utils.logging import log\n",
    )
    .expect("write");
    dir.write("README.md", "{{ cookiecutter.package_name }}")
        .expect("write");
    let tool = ScriptedTool::noop();

    let report = format_template(dir.path(), &FormatConfig::default(), &tool, RunMode::Discard)
        .expect("run")
        .expect("report");

    assert_eq!(report.files, 1);
    assert_eq!(
        tool.seen(),
        vec!["from compact_package_placeholder.utils.logging import log\n".to_string()]
    );
    assert_eq!(
        dir.read("{{cookiecutter.package_name}}/utils/__init__.py")
            .expect("read"),
        "from {{cookiecutter.package_name}}.utils.logging import log\n"
    );
}

#[test]
fn format_template_without_files_returns_none() {
    let dir = TemplateDir::new().expect("dir");
    dir.write("README.md", "nothing here").expect("write");

    let report = format_template(
        dir.path(),
        &FormatConfig::default(),
        &ScriptedTool::noop(),
        RunMode::Commit,
    )
    .expect("run");
    assert!(report.is_none());
}

#[test]
fn collision_with_existing_identifier_aborts_untouched() {
    let dir = TemplateDir::new().expect("dir");
    let files = vec![
        dir.write("a.py", &format!("import {TOKEN}")).expect("write"),
        dir.write("b.py", "placeholder_package = 3").expect("write"),
    ];
    let tool = ScriptedTool::noop();

    let err = run_round_trip(&files, &package_map(), &tool, RunMode::Commit).unwrap_err();

    assert!(format!("{err:#}").contains("already contains substitute"));
    assert!(tool.seen().is_empty());
    assert_eq!(dir.read("a.py").expect("read"), format!("import {TOKEN}"));
}

#[test]
fn panicking_tool_still_finishes_all_files() {
    for mode in [RunMode::Discard, RunMode::Commit] {
        let dir = TemplateDir::new().expect("dir");
        let files = vec![
            dir.write("a.py", &format!("import {TOKEN}")).expect("write"),
            dir.write("b.py", &format!("print(\"{TOKEN}\")")).expect("write"),
            dir.write("c.py", &format!("{TOKEN} = 1")).expect("write"),
        ];
        let tool = ScriptedTool::noop().panicking_on("b.py");

        let report = run_round_trip(&files, &package_map(), &tool, mode).expect("run");

        assert!(!report.success());
        let failures: Vec<_> = report.failures().collect();
        assert_eq!(failures.len(), 1);
        match &failures[0].status {
            PassStatus::Failed(message) => assert!(message.contains("panicked"), "{message}"),
            other => panic!("unexpected status {other:?}"),
        }
        assert_eq!(report.outcomes.len(), 3, "passes continued after the panic");
        assert_eq!(dir.read("a.py").expect("read"), format!("import {TOKEN}"));
        assert_eq!(
            dir.read("b.py").expect("read"),
            format!("print(\"{TOKEN}\")")
        );
        assert_eq!(dir.read("c.py").expect("read"), format!("{TOKEN} = 1"));
    }
}

/// Discard mode restores from the snapshot, so a file that already mentions
/// a substitute identifier does not block the run.
#[test]
fn discard_tolerates_existing_substitute_mentions() {
    let dir = TemplateDir::new().expect("dir");
    let files = vec![
        dir.write("a.py", &format!("import {TOKEN}")).expect("write"),
        dir.write("b.py", "# docs mention placeholder_package\n")
            .expect("write"),
    ];
    let tool = ScriptedTool::appending("\n");

    let report = run_round_trip(&files, &package_map(), &tool, RunMode::Discard).expect("run");

    assert!(report.success());
    assert_eq!(report.finish, Finish::Restored { files: 2 });
    assert_eq!(dir.read("a.py").expect("read"), format!("import {TOKEN}"));
    assert_eq!(
        dir.read("b.py").expect("read"),
        "# docs mention placeholder_package\n"
    );
}
