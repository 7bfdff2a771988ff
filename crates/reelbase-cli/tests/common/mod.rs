use std::path::Path;
use std::process::{Command, Output};

/// Run the CLI against an isolated data directory.
pub fn run_cli(args: &[&str], data_dir: &Path) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_reelbase"));
    cmd.args(args);
    cmd.env("REELBASE_DATA_DIR", data_dir);
    cmd.env_remove("RUST_LOG");
    cmd.env("NO_COLOR", "1");
    cmd.output().expect("Failed to execute CLI")
}

/// Run the CLI and expect success, returning stdout.
pub fn run_cli_success(args: &[&str], data_dir: &Path) -> String {
    let output = run_cli(args, data_dir);
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Parse every stdout line as a JSON record.
pub fn json_lines(stdout: &str) -> Vec<serde_json::Value> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).expect("stdout line is not JSON"))
        .collect()
}

/// Create a record and return its JSON.
pub fn create(data_dir: &Path, args: &[&str]) -> serde_json::Value {
    let mut full = vec!["create"];
    full.extend_from_slice(args);
    let stdout = run_cli_success(&full, data_dir);
    json_lines(&stdout).remove(0)
}
