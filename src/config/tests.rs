use super::load_config;
use super::settings::Settings;
use serial_test::serial;
use std::env;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_default_settings() {
    let settings = Settings::default();
    assert_eq!(settings.broker.queue_capacity, 100);
    assert_eq!(settings.store.max_messages, None);
    assert_eq!(settings.logging.level, "info");
}

/// Runs `f` with the current directory set to a fresh temp dir.
fn in_temp_dir<F: FnOnce(&TempDir)>(f: F) {
    let tmp = TempDir::new().expect("create tempdir");
    let orig = env::current_dir().expect("current_dir");
    env::set_current_dir(tmp.path()).expect("set current dir");
    f(&tmp);
    env::set_current_dir(orig).expect("restore cwd");
}

#[test]
#[serial]
fn load_config_without_sources_uses_defaults() {
    in_temp_dir(|_| {
        temp_env::with_vars_unset(
            [
                "CHATRELAY_BROKER__QUEUE_CAPACITY",
                "CHATRELAY_STORE__MAX_MESSAGES",
                "CHATRELAY_LOGGING__LEVEL",
            ],
            || {
                let cfg = load_config().expect("load_config failed");
                assert_eq!(cfg, Settings::default());
            },
        );
    });
}

#[test]
#[serial]
fn load_config_from_file_overrides_defaults() {
    in_temp_dir(|_| {
        fs::create_dir_all("config").expect("create config dir");
        let toml = r#"
            [broker]
            queue_capacity = 8

            [store]
            max_messages = 50
        "#;
        fs::write("config/default.toml", toml).expect("write config file");

        temp_env::with_vars_unset(
            [
                "CHATRELAY_BROKER__QUEUE_CAPACITY",
                "CHATRELAY_STORE__MAX_MESSAGES",
                "CHATRELAY_LOGGING__LEVEL",
            ],
            || {
                let cfg = load_config().expect("load_config failed");
                assert_eq!(cfg.broker.queue_capacity, 8);
                assert_eq!(cfg.store.max_messages, Some(50));
                // not in the file
                assert_eq!(cfg.logging.level, "info");
            },
        );
    });
}

#[test]
#[serial]
fn environment_overrides_file() {
    in_temp_dir(|_| {
        fs::create_dir_all("config").expect("create config dir");
        fs::write("config/default.toml", "[broker]\nqueue_capacity = 8\n")
            .expect("write config file");

        temp_env::with_vars(
            [
                ("CHATRELAY_BROKER__QUEUE_CAPACITY", Some("256")),
                ("CHATRELAY_LOGGING__LEVEL", Some("debug")),
                ("CHATRELAY_STORE__MAX_MESSAGES", None),
            ],
            || {
                let cfg = load_config().expect("load_config failed");
                assert_eq!(cfg.broker.queue_capacity, 256);
                assert_eq!(cfg.logging.level, "debug");
            },
        );
    });
}
