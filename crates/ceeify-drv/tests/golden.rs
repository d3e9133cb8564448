//! End-to-end scenarios E1-E6 from spec §8, run against the compiled
//! `ceeify` binary (SPEC_FULL.md: "E1-E6 become integration tests in
//! `ceeify-drv/tests/golden.rs`").

use std::fs;

use assert_cmd::Command;
use predicates::str::contains;
use tempfile::tempdir;

fn write_source(dir: &std::path::Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn e1_literal_assignment_compiles_to_int_declaration() {
    let dir = tempdir().unwrap();
    let input = write_source(dir.path(), "e1.src", "x = 42\n");
    let output = dir.path().join("e1.c");

    Command::cargo_bin("ceeify")
        .unwrap()
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    let generated = fs::read_to_string(&output).unwrap();
    assert_eq!(generated.trim(), "int x = 42;");
}

#[test]
fn e2_arithmetic_precedence_matches_source_shape() {
    let dir = tempdir().unwrap();
    let input = write_source(dir.path(), "e2.src", "y = 3 + 5 * 2\n");
    let output = dir.path().join("e2.c");

    Command::cargo_bin("ceeify").unwrap().arg(&input).arg("-o").arg(&output).assert().success();

    let generated = fs::read_to_string(&output).unwrap();
    assert_eq!(generated.trim(), "int y = 3 + 5 * 2;");
}

#[test]
fn e3_if_elif_chain_folds_into_else_if() {
    let dir = tempdir().unwrap();
    let input = write_source(
        dir.path(),
        "e3.src",
        "x = 1\nif x < 10:\n    y = 5\nelif x < 20:\n    y = 15\n",
    );
    let output = dir.path().join("e3.c");

    Command::cargo_bin("ceeify").unwrap().arg(&input).arg("-o").arg(&output).assert().success();

    let generated = fs::read_to_string(&output).unwrap();
    assert!(generated.contains("if ("));
    assert!(generated.contains("else if ("));
}

#[test]
fn e4_undefined_name_reports_name_error_and_exits_nonzero() {
    let dir = tempdir().unwrap();
    let input = write_source(dir.path(), "e4.src", "z = x + 1\n");
    let output = dir.path().join("e4.c");

    Command::cargo_bin("ceeify")
        .unwrap()
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .assert()
        .failure()
        .code(3)
        .stderr(contains("name 'x' is not defined"))
        .stderr(contains("^"));

    assert!(!output.exists());
}

#[test]
fn e5_method_emission_mangles_name_and_walks_base_chain() {
    let dir = tempdir().unwrap();
    let input = write_source(
        dir.path(),
        "e5.src",
        "class Animal:\n    def __init__(self, name: str):\n        self.name = name\nclass Dog(Animal):\n    def __init__(self, name: str):\n        self.name = name\n",
    );
    let output = dir.path().join("e5.c");

    Command::cargo_bin("ceeify").unwrap().arg(&input).arg("-o").arg(&output).assert().success();

    let generated = fs::read_to_string(&output).unwrap();
    assert!(generated.contains("typedef struct {\n    Animal* base;\n} Dog;"));
    assert!(generated.contains("void Dog___init__(Dog* self, char* name) {"));
    assert!(generated.contains("self->base->name = name;"));
}

#[test]
fn e6_match_with_guard_substitutes_temporary_into_guard() {
    let dir = tempdir().unwrap();
    let input = write_source(
        dir.path(),
        "e6.src",
        "x = 1\nmatch x:\n    case n if n > 0:\n        y = 1\n    case _:\n        y = 0\n",
    );
    let output = dir.path().join("e6.c");

    Command::cargo_bin("ceeify").unwrap().arg(&input).arg("-o").arg(&output).assert().success();

    let generated = fs::read_to_string(&output).unwrap();
    assert!(generated.contains("int _tmp0 = x;"));
    assert!(generated.contains("if ((_tmp0 > 0)) {"));
    assert!(generated.contains("int n = _tmp0;"));
}

#[test]
fn default_output_path_is_input_with_c_extension() {
    let dir = tempdir().unwrap();
    let input = write_source(dir.path(), "default.src", "x = 1\n");

    Command::cargo_bin("ceeify").unwrap().arg(&input).assert().success();

    let expected_output = dir.path().join("default.c");
    assert!(expected_output.exists());
}

#[test]
fn dump_tokens_writes_a_sibling_json_file() {
    let dir = tempdir().unwrap();
    let input = write_source(dir.path(), "dump.src", "x = 1\n");
    let output = dir.path().join("dump.c");

    Command::cargo_bin("ceeify")
        .unwrap()
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .arg("--dump-tokens")
        .assert()
        .success();

    let tokens_path = output.with_extension("tokens.json");
    let contents = fs::read_to_string(&tokens_path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert!(value.is_array());
    assert!(!value.as_array().unwrap().is_empty());
}

#[test]
fn exponentiation_is_rejected_and_exits_with_semantic_error_code() {
    let dir = tempdir().unwrap();
    let input = write_source(dir.path(), "pow.src", "x = 2 ** 3\n");
    let output = dir.path().join("pow.c");

    Command::cargo_bin("ceeify")
        .unwrap()
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .assert()
        .failure()
        .code(3);
}
