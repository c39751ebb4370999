use assert_cmd::{cargo::cargo_bin_cmd, Command};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Get a Command for frontfill isolated from the host environment.
///
/// The global config directory points inside `home`, and no API key or
/// log filter leaks in from the caller.
pub fn frontfill(home: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("frontfill");
    cmd.env("FRONTFILL_CONFIG_DIR", home.join(".config"))
        .env_remove("LLM_API_KEY")
        .env_remove("ANTHROPIC_API_KEY")
        .env_remove("LLM_MODEL")
        .env_remove("LLM_BASE_URL")
        .env_remove("FRONTFILL_LOG")
        .env_remove("RUST_LOG");
    cmd
}

/// Docs directory with the four canonical cases
#[allow(dead_code)]
pub fn setup_docs() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "hello.md", "# Hello\n\nBody text.\n");
    write(dir.path(), "partial.md", "---\ntitle: Existing\n---\nSome body.\n");
    write(
        dir.path(),
        "done.md",
        "---\ntitle: T\ndescription: D\nauthor: A\n---\nBody\n",
    );
    write(dir.path(), "broken.md", "---\n: : :\n---\nBroken body.\n");
    dir
}

pub fn write(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

#[allow(dead_code)]
pub fn read(dir: &Path, name: &str) -> String {
    fs::read_to_string(dir.join(name)).unwrap()
}
