use std::process::Command;

#[test]
fn init_creates_valid_toml() {
    let dir = tempfile::tempdir().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_airev"))
        .arg("init")
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "airev init failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let config_path = dir.path().join(".airev.toml");
    assert!(config_path.exists(), ".airev.toml should exist");

    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("[llm]"));
    assert!(content.contains("[review]"));

    // Verify it's valid TOML that airev-core can parse
    let config: airev_core::AirevConfig = toml::from_str(&content).unwrap();
    assert_eq!(config.review.heading, "AI Code Review");
}

#[test]
fn init_refuses_if_exists() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".airev.toml"), "# existing").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_airev"))
        .arg("init")
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert_eq!(
        std::fs::read_to_string(dir.path().join(".airev.toml")).unwrap(),
        "# existing"
    );
}
