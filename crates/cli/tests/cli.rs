use assert_cmd::Command;

fn cli() -> Command {
    let mut cmd = Command::cargo_bin("bookshelf-cli").unwrap();
    cmd.env("BOOKSHELF_CONFIG_DIR", "/nonexistent/bookshelf-config")
        .env("BOOKSHELF__DATABASE__URL", "sqlite::memory:")
        .env("BOOKSHELF__TELEMETRY__FILTER", "warn")
        .env_remove("RUST_LOG")
        .env_remove("BOOKSHELF_ENV");
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn help_lists_subcommands() {
    let stdout = stdout_of(cli().arg("--help"));

    for command in ["serve", "migrate", "seed"] {
        assert!(stdout.contains(command), "missing {}", command);
    }
}

#[test]
fn migrate_succeeds_on_fresh_database() {
    let stdout = stdout_of(cli().arg("migrate"));
    assert!(stdout.contains("migrations applied"));
}

#[test]
fn seed_reports_count() {
    let stdout = stdout_of(cli().args(["seed", "--count", "5"]));
    assert!(stdout.contains("seeded 5 books"));
}

#[test]
fn unknown_environment_fails() {
    cli().env("BOOKSHELF_ENV", "qa").arg("migrate").assert().failure();
}
