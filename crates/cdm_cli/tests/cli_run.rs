use cdm_cli::{
    apply_overrides, run, Args, CliError, Command, EXIT_CONFLICT, EXIT_NOT_FOUND,
    EXIT_VALIDATION,
};
use cdm_core::StoreConfig;
use clap::Parser;
use serde_json::Value;
use std::path::Path;
use uuid::Uuid;

fn config_for(db_path: &Path) -> StoreConfig {
    StoreConfig {
        db_path: db_path.to_path_buf(),
        ..StoreConfig::default()
    }
}

fn run_json(command: Command, config: &StoreConfig) -> Value {
    let output = run(&command, config).unwrap();
    serde_json::from_str(&output).unwrap()
}

fn model_uuid(document: &Value) -> Uuid {
    document["meta"]["uuid"].as_str().unwrap().parse().unwrap()
}

#[test]
fn seed_then_read_back_through_every_query() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&dir.path().join("modelsdb.db"));

    let seeded = run_json(Command::Seed, &config);
    let uuid = model_uuid(&seeded);

    let list = run_json(Command::List { limit: None }, &config);
    assert_eq!(list["appliedLimit"], 10);
    assert_eq!(list["items"].as_array().unwrap().len(), 1);

    let meta = run_json(Command::Meta { uuid }, &config);
    assert_eq!(meta["name"], "Test Model");

    let full = run_json(Command::Full { uuid }, &config);
    assert_eq!(full, seeded);

    let diagram_uuid = full["diagrams"][0]["meta"]["uuid"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();
    let diagram = run_json(Command::Diagram { uuid: diagram_uuid }, &config);
    assert_eq!(diagram["elements"].as_array().unwrap().len(), 3);

    let history = run_json(Command::History { uuid }, &config);
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(history[0]["current"], true);
}

#[test]
fn create_update_delete_from_files() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&dir.path().join("modelsdb.db"));
    let input = dir.path().join("model.json");
    let model = cdm_core::sample_model();
    let uuid = model.uuid();
    std::fs::write(&input, serde_json::to_string(&model).unwrap()).unwrap();

    run(&Command::Create { input: input.clone() }, &config).unwrap();
    let conflict = run(&Command::Create { input: input.clone() }, &config).unwrap_err();
    assert_eq!(conflict.exit_code(), EXIT_CONFLICT);

    let mut renamed = model.clone();
    renamed.meta.name = "Renamed".to_string();
    std::fs::write(&input, serde_json::to_string(&renamed).unwrap()).unwrap();
    let updated = run_json(Command::Update { input }, &config);
    assert_eq!(updated["meta"]["name"], "Renamed");

    let deleted = run_json(Command::Delete { uuid }, &config);
    assert_eq!(deleted["deleted"], uuid.to_string());

    let missing = run(&Command::Full { uuid }, &config).unwrap_err();
    assert_eq!(missing.exit_code(), EXIT_NOT_FOUND);
}

#[test]
fn malformed_input_is_a_validation_failure() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&dir.path().join("modelsdb.db"));
    let input = dir.path().join("broken.json");
    std::fs::write(&input, "{\"meta\": 42}").unwrap();

    let err = run(&Command::Create { input }, &config).unwrap_err();
    assert_eq!(err.exit_code(), EXIT_VALIDATION);
}

#[test]
fn missing_input_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&dir.path().join("modelsdb.db"));

    let err = run(
        &Command::Create {
            input: dir.path().join("absent.json"),
        },
        &config,
    )
    .unwrap_err();
    assert!(matches!(err, CliError::Input { .. }));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn flags_override_resolved_config() {
    let args = Args::try_parse_from([
        "cdm",
        "--db",
        "/tmp/other.db",
        "--no-check-dependencies",
        "--log-level",
        "warn",
        "list",
        "--limit",
        "3",
    ])
    .unwrap();
    let mut config = StoreConfig::default();

    apply_overrides(&mut config, &args);

    assert_eq!(config.db_path, Path::new("/tmp/other.db"));
    assert!(!config.check_dependencies);
    assert_eq!(config.logging.level, "warn");
    assert_eq!(args.command, Command::List { limit: Some(3) });
}
