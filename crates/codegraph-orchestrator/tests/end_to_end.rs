use codegraph_core::PipelineConfig;
use codegraph_orchestrator::{index_repository, CancellationToken, IncrementalRequest};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_file(dir: &TempDir, relative: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, contents).unwrap();
    path
}

#[tokio::test]
async fn full_build_over_two_files_resolves_a_cross_file_call() {
    let dir = TempDir::new().unwrap();
    write_file(
        &dir,
        "helpers.py",
        "def helper():\n    return 1\n",
    );
    write_file(
        &dir,
        "main.py",
        "from helpers import helper\n\ndef run():\n    return helper()\n",
    );

    let config = PipelineConfig::new(dir.path());
    let token = CancellationToken::new();
    let artifacts = index_repository(dir.path(), "repo-1", "snap-1", &config, None, None, None, &token).await;

    assert_eq!(artifacts.summary.total_errors(), 0);
    assert_eq!(artifacts.ir_documents.len(), 2);
    assert!(artifacts.global_context.symbol_table.contains_key("helpers.helper"));
    assert!(!artifacts.chunk_manifest.is_empty());
    assert!(artifacts.refresh_delta.is_none());
}

#[tokio::test]
async fn a_file_with_a_syntax_error_is_isolated_and_does_not_fail_the_build() {
    let dir = TempDir::new().unwrap();
    write_file(&dir, "good.py", "def ok():\n    return 1\n");
    // unterminated string: tree-sitter still returns a tree with has_error()
    // set, but IR building over the rest of the file can still proceed.
    write_file(&dir, "bad.py", "def broken(:\n    x = \"\n");

    let config = PipelineConfig::new(dir.path());
    let token = CancellationToken::new();
    let artifacts = index_repository(dir.path(), "repo-1", "snap-1", &config, None, None, None, &token).await;

    assert!(artifacts.ir_documents.keys().any(|k| k.ends_with("good.py")));
    assert_eq!(artifacts.summary.files_processed, 2);
}

#[tokio::test]
async fn incremental_rename_is_reported_as_renamed_not_added_and_deleted() {
    let dir = TempDir::new().unwrap();
    write_file(&dir, "mod_a.py", "def original_name():\n    return 42\n");

    let config = PipelineConfig::new(dir.path());
    let token = CancellationToken::new();
    let first = index_repository(dir.path(), "repo-1", "snap-1", &config, None, None, None, &token).await;
    assert_eq!(first.summary.total_errors(), 0);

    let renamed_path = write_file(&dir, "mod_a.py", "def renamed_name():\n    return 42\n");
    let request = IncrementalRequest {
        changed_files: vec![renamed_path],
        deleted_files: vec![],
    };
    let second = index_repository(dir.path(), "repo-1", "snap-1", &config, None, Some(request), Some(first), &token).await;

    let delta = second.refresh_delta.expect("incremental build reports a refresh delta");
    assert!(!delta.renamed.is_empty(), "identical function body under a new name should be detected as a rename");
    assert!(second.global_context.symbol_table.contains_key("mod_a.renamed_name"));
    assert!(!second.global_context.symbol_table.contains_key("mod_a.original_name"));
}

#[tokio::test]
async fn deleting_a_file_removes_its_symbols_and_chunks() {
    let dir = TempDir::new().unwrap();
    let victim = write_file(&dir, "throwaway.py", "def doomed():\n    return 0\n");

    let config = PipelineConfig::new(dir.path());
    let token = CancellationToken::new();
    let first = index_repository(dir.path(), "repo-1", "snap-1", &config, None, None, None, &token).await;
    assert!(first.global_context.symbol_table.contains_key("throwaway.doomed"));

    let request = IncrementalRequest {
        changed_files: vec![],
        deleted_files: vec![victim],
    };
    let second = index_repository(dir.path(), "repo-1", "snap-1", &config, None, Some(request), Some(first), &token).await;

    assert!(!second.global_context.symbol_table.contains_key("throwaway.doomed"));
    assert!(!second.ir_documents.keys().any(|k| k.ends_with("throwaway.py")));
}

#[tokio::test]
async fn cancelling_before_the_build_starts_still_returns_a_usable_summary() {
    let dir = TempDir::new().unwrap();
    write_file(&dir, "a.py", "def f():\n    return 1\n");

    let config = PipelineConfig::new(dir.path());
    let token = CancellationToken::new();
    token.cancel();
    let artifacts = index_repository(dir.path(), "repo-1", "snap-1", &config, None, None, None, &token).await;

    // Cancelling before the build starts means every file is recorded as
    // cancelled rather than built; the call still returns rather than hanging.
    assert!(artifacts.ir_documents.is_empty());
    assert_eq!(artifacts.summary.error_counts.get(&codegraph_orchestrator::ErrorKind::Cancelled), Some(&1));
}
