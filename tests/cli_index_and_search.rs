use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn maw() -> Command {
    Command::cargo_bin("maw").expect("binary built")
}

fn index_path(root: &std::path::Path) -> std::path::PathBuf {
    root.join(".maw").join("index").join("code.db")
}

#[test]
fn indexing_an_empty_tree_reports_zero_files() {
    let root = tempdir().expect("tempdir");

    maw()
        .arg("index")
        .arg(root.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("indexed 0 files"));
}

#[test]
fn indexes_and_finds_a_single_file() {
    let root = tempdir().expect("tempdir");
    fs::write(root.path().join("hello.py"), "def greet():\n    return 'hello world'\n")
        .expect("write fixture");

    maw()
        .arg("index")
        .arg(root.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("indexed 1 files"));

    maw()
        .arg("search")
        .arg("greet")
        .arg("--index-path")
        .arg(index_path(root.path()))
        .assert()
        .success()
        .stdout(predicate::str::contains("hello.py"));
}

#[test]
fn reindexing_unchanged_tree_reports_same_file_count() {
    let root = tempdir().expect("tempdir");
    fs::write(root.path().join("a.py"), "x = 1\n").expect("write fixture");

    maw().arg("index").arg(root.path()).assert().success();

    maw()
        .arg("index")
        .arg(root.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("indexed 1 files"));
}

#[test]
fn phrase_query_matches_exact_wording() {
    let root = tempdir().expect("tempdir");
    fs::write(
        root.path().join("notes.md"),
        "the quick brown fox\nsomething else entirely\n",
    )
    .expect("write fixture");

    maw().arg("index").arg(root.path()).assert().success();

    maw()
        .arg("search")
        .arg("quick brown")
        .arg("--index-path")
        .arg(index_path(root.path()))
        .assert()
        .success()
        .stdout(predicate::str::contains("notes.md"));
}

#[test]
fn unparsable_query_falls_back_without_erroring() {
    let root = tempdir().expect("tempdir");
    fs::write(root.path().join("weird.py"), "value = (1 + 2)\n").expect("write fixture");

    maw().arg("index").arg(root.path()).assert().success();

    maw()
        .arg("search")
        .arg("(")
        .arg("--index-path")
        .arg(index_path(root.path()))
        .assert()
        .success();
}

#[test]
fn ignored_directories_are_excluded_from_the_index() {
    let root = tempdir().expect("tempdir");
    fs::create_dir_all(root.path().join("node_modules/dep")).expect("mkdir");
    fs::write(root.path().join("node_modules/dep/index.js"), "module.exports = {};\n")
        .expect("write fixture");
    fs::write(root.path().join("main.js"), "console.log('hi');\n").expect("write fixture");

    maw()
        .arg("index")
        .arg(root.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("indexed 1 files"));

    maw()
        .arg("list-files")
        .arg("--index-path")
        .arg(index_path(root.path()))
        .assert()
        .success()
        .stdout(predicate::str::contains("main.js").and(predicate::str::contains("node_modules").not()));
}

#[test]
fn search_without_an_index_fails_with_a_clear_message() {
    let root = tempdir().expect("tempdir");

    maw()
        .arg("search")
        .arg("anything")
        .arg("--index-path")
        .arg(index_path(root.path()))
        .assert()
        .failure()
        .stderr(predicate::str::contains("maw index"));
}

#[test]
fn clear_empties_the_index() {
    let root = tempdir().expect("tempdir");
    fs::write(root.path().join("a.py"), "x = 1\n").expect("write fixture");

    maw().arg("index").arg(root.path()).assert().success();
    maw()
        .arg("clear")
        .arg("--index-path")
        .arg(index_path(root.path()))
        .arg("--force")
        .assert()
        .success();

    maw()
        .arg("list-files")
        .arg("--index-path")
        .arg(index_path(root.path()))
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn clear_without_force_is_refused() {
    let root = tempdir().expect("tempdir");
    fs::write(root.path().join("a.py"), "x = 1\n").expect("write fixture");

    maw().arg("index").arg(root.path()).assert().success();
    maw()
        .arg("clear")
        .arg("--index-path")
        .arg(index_path(root.path()))
        .assert()
        .failure();
}

#[test]
fn stats_reports_language_breakdown() {
    let root = tempdir().expect("tempdir");
    fs::write(root.path().join("a.py"), "x = 1\n").expect("write fixture");
    fs::write(root.path().join("b.rs"), "fn main() {}\n").expect("write fixture");

    maw().arg("index").arg(root.path()).assert().success();

    maw()
        .arg("stats")
        .arg("--index-path")
        .arg(index_path(root.path()))
        .assert()
        .success()
        .stdout(predicate::str::contains("total files: 2"));
}

#[test]
fn stats_on_a_missing_index_reports_not_indexed_instead_of_failing() {
    let root = tempdir().expect("tempdir");

    maw()
        .arg("stats")
        .arg("--index-path")
        .arg(index_path(root.path()))
        .assert()
        .success()
        .stdout(predicate::str::contains("not indexed"));
}

#[test]
fn symbol_search_finds_a_function_definition() {
    let root = tempdir().expect("tempdir");
    fs::write(
        root.path().join("lib.rs"),
        "pub fn compute_total(values: &[u32]) -> u32 {\n    0\n}\n",
    )
    .expect("write fixture");

    maw().arg("index").arg(root.path()).assert().success();

    maw()
        .arg("symbol")
        .arg("compute_total")
        .arg("--type")
        .arg("function")
        .arg("--index-path")
        .arg(index_path(root.path()))
        .assert()
        .success()
        .stdout(predicate::str::contains("lib.rs"));
}

#[test]
fn file_name_search_matches_glob() {
    let root = tempdir().expect("tempdir");
    fs::create_dir_all(root.path().join("src")).expect("mkdir");
    fs::write(root.path().join("src/main.rs"), "fn main() {}\n").expect("write fixture");

    maw().arg("index").arg(root.path()).assert().success();

    maw()
        .arg("files")
        .arg("*.rs")
        .arg("--index-path")
        .arg(index_path(root.path()))
        .assert()
        .success()
        .stdout(predicate::str::contains("main.rs"));
}
