//! End-to-end tests for the `score` command driven through the public
//! `run` entry point, using an in-memory host and no network access.

use model_rank::{Host, run};
use std::io::Write;

/// Test host that captures output to in-memory buffers
struct TestHost {
    output_buf: Vec<u8>,
    error_buf: Vec<u8>,
    exit_code: Option<i32>,
}

impl TestHost {
    fn new() -> Self {
        Self {
            output_buf: Vec::new(),
            error_buf: Vec::new(),
            exit_code: None,
        }
    }
}

impl Host for TestHost {
    fn output(&mut self) -> impl Write {
        std::io::Cursor::new(&mut self.output_buf)
    }

    fn error(&mut self) -> impl Write {
        std::io::Cursor::new(&mut self.error_buf)
    }

    fn exit(&mut self, code: i32) {
        self.exit_code = Some(code);
    }
}

fn targets_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

async fn run_score(host: &mut TestHost, file: &tempfile::NamedTempFile) -> model_rank::Result<()> {
    let path = file.path().to_str().unwrap().to_string();
    run(host, ["model-rank", "score", "--log-level", "none", &path]).await
}

#[tokio::test]
async fn empty_targets_file_produces_no_output_and_succeeds() {
    let file = targets_file("# nothing but comments\n\n");
    let mut host = TestHost::new();

    run_score(&mut host, &file).await.unwrap();

    assert!(host.output_buf.is_empty());
    assert!(host.error_buf.is_empty());
    assert_eq!(host.exit_code, None);
}

#[tokio::test]
async fn malformed_target_line_fails_the_run() {
    let file = targets_file("MODEL https://huggingface.co/org/model\nnot-a-valid-line\n");
    let mut host = TestHost::new();

    let result = run_score(&mut host, &file).await;

    let error = result.unwrap_err();
    assert!(error.to_string().contains("line 2"), "unexpected error: {error}");
    assert!(host.output_buf.is_empty());
}

#[tokio::test]
async fn unknown_category_names_the_offending_line() {
    let file = targets_file("# batch\nGADGET https://huggingface.co/org/model\n");
    let mut host = TestHost::new();

    let error = run_score(&mut host, &file).await.unwrap_err();
    assert!(error.to_string().contains("line 2"), "unexpected error: {error}");
}

#[tokio::test]
async fn missing_targets_file_is_an_error() {
    let mut host = TestHost::new();
    let result = run(&mut host, ["model-rank", "score", "/nonexistent/targets.txt"]).await;
    assert!(result.is_err());
}
