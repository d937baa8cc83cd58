use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains as str_contains;
use std::fs;
use tempfile::NamedTempFile;

const NOTATION: &str = "\
project lasts 2020/4/1 to 2020/4/30
sat are closed
sun are closed
today is 2020/4/10
design: Design work
  >2020/4/1
  =5 days
  @alice
build
  >design's end
  =3 days
";

#[allow(deprecated)]
fn cli() -> Command {
    Command::cargo_bin("cli").expect("cli binary")
}

#[test]
fn renders_notation_from_stdin() {
    cli()
        .write_stdin(NOTATION)
        .assert()
        .success()
        .stdout(str_contains("<svg "))
        .stdout(str_contains(">Design work@alice</text>"))
        .stdout(str_contains("id=\"path-design-to-build\""));
}

#[test]
fn renders_json_documents() {
    let json = r#"{
        "project": {"start": "2020/4/1", "end": "2020/4/30", "today": "2020/4/10"},
        "task": [{"name": "A", "text": "From JSON", "plan": {"start": "2020/4/1", "period": "2 days"}}]
    }"#;
    cli()
        .arg("--json")
        .write_stdin(json)
        .assert()
        .success()
        .stdout(str_contains(">From JSON</text>"));
}

#[test]
fn renders_yaml_documents_from_a_file() {
    let input = NamedTempFile::new().expect("create input file");
    fs::write(
        input.path(),
        "\
project:
  start: 2020/4/1
  end: 2020/4/30
  closed: [sat, sun]
  today: 2020/4/10
task:
  - name: A
    text: From YAML
    plan: {start: 2020/4/1, period: 3 days}
  - name: B
    plan: {start: A's end, period: 2}
",
    )
    .expect("write input");

    cli()
        .arg("--yaml")
        .arg(input.path())
        .assert()
        .success()
        .stdout(str_contains(">From YAML</text>"))
        .stdout(str_contains("id=\"path-A-to-B\""));
}

#[test]
fn malformed_yaml_fails_the_command() {
    cli()
        .arg("--yaml")
        .write_stdin("task: [unclosed")
        .assert()
        .failure()
        .stderr(str_contains("error: invalid document"));
}

#[test]
fn weekly_scale_override_narrows_the_chart() {
    cli()
        .args(["--scale", "weekly"])
        .write_stdin(NOTATION)
        .assert()
        .success()
        .stdout(str_contains("width=\"240px\""));
}

#[test]
fn writes_to_an_output_file() {
    let input = NamedTempFile::new().expect("create input file");
    fs::write(input.path(), NOTATION).expect("write input");
    let output = NamedTempFile::new().expect("create output file");

    cli()
        .arg(input.path())
        .arg("-o")
        .arg(output.path())
        .assert()
        .success()
        .stdout(str_contains("<svg").not());

    let svg = fs::read_to_string(output.path()).expect("read output");
    assert!(svg.starts_with("<?xml"));
    assert!(svg.contains("width=\"480px\""));
}

#[test]
fn chart_config_file_is_applied() {
    let config = NamedTempFile::new().expect("create config file");
    fs::write(config.path(), r#"{"daily_column_width": 20, "today_color": "orange"}"#)
        .expect("write config");

    cli()
        .arg("--config")
        .arg(config.path())
        .write_stdin(NOTATION)
        .assert()
        .success()
        .stdout(str_contains("width=\"600px\""))
        .stdout(str_contains("stroke=\"orange\""));
}

#[test]
fn resolution_errors_fail_the_command() {
    let looped = "\
project lasts 2020/4/1 to 2020/4/30
today is 2020/4/10
a
  >b's end
  =2 days
b
  >a's end
  =2 days
";
    cli()
        .write_stdin(looped)
        .assert()
        .failure()
        .stderr(str_contains("error: the dependencies are looped: a, b"));
}

#[test]
fn unknown_options_are_usage_errors() {
    cli()
        .arg("--frobnicate")
        .assert()
        .code(2)
        .stderr(str_contains("unknown option '--frobnicate'"));
}

#[test]
fn help_exits_cleanly() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(str_contains("Usage: cli"));
}
