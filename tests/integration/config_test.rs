use std::fs;

use easy_alert::core::{Config, YamlFile};
use easy_alert::watchers::{Watcher, WatcherKind};
use easy_alert::Notifier;
use tempfile::TempDir;

const NORMAL: &str = r#"
watchers:
  process:
    - name: a
      regexp: ".*"
      error: "=1"
    - name: b
      regexp: ".*"
      error: "<=1"
    - name: c
      regexp: ".*"
      error: ">=1"
  log:
    watch_dir: resources/log_watcher
notifiers:
  email:
    group_id: awesome
    smtp_server: mail.example.com
    smtp_port: 587
    from_address: from_address@example.com
    to_address_list: to1@example.com,to2@example.com
"#;

fn write_config(dir: &TempDir, name: &str, body: &str) -> YamlFile {
    let path = dir.path().join(name);
    fs::write(&path, body).unwrap();
    YamlFile::new(path)
}

fn load_err(dir: &TempDir, body: &str, kinds: &[WatcherKind]) -> String {
    let source = write_config(dir, "easy-alert.yml", body);
    let err = Config::load(&source, kinds, false).unwrap_err();
    err.to_string()
        .replace(&source.path().display().to_string(), "<path>")
}

#[test]
fn test_load_normal() {
    let dir = TempDir::new().unwrap();
    let source = write_config(&dir, "easy-alert.yml", NORMAL);

    let config = Config::load(&source, &[WatcherKind::Process], false).unwrap();
    assert_eq!(config.watchers.len(), 1);
    let Watcher::Process(process) = &config.watchers[0] else {
        panic!("expected a process watcher");
    };
    let names: Vec<&str> = process.settings().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["a", "b", "c"]);

    let Notifier::Email(email) = &config.notifiers[0];
    assert_eq!(email.settings().group_id, "awesome");
    assert_eq!(email.settings().smtp_port, 587);

    let both = Config::load(&source, &[WatcherKind::Process, WatcherKind::Log], false).unwrap();
    assert_eq!(both.watchers[0], config.watchers[0]);
    assert_eq!(both.watchers[1].kind(), WatcherKind::Log);
}

#[test]
fn test_load_is_deterministic() {
    let dir = TempDir::new().unwrap();
    let source = write_config(&dir, "easy-alert.yml", NORMAL);
    let kinds = [WatcherKind::Log, WatcherKind::Process];
    assert_eq!(
        Config::load(&source, &kinds, true).unwrap(),
        Config::load(&source, &kinds, true).unwrap()
    );
}

#[test]
fn test_load_missing_file() {
    let source = YamlFile::new("/nonexistent/__not_exist__.yml");
    let err = Config::load(&source, &[WatcherKind::Process], false).unwrap_err();
    assert_eq!(err.kind(), "IoError");
}

#[test]
fn test_load_invalid_yaml() {
    let dir = TempDir::new().unwrap();
    let source = write_config(&dir, "broken.yml", "watchers: {process: [\n");
    let err = Config::load(&source, &[WatcherKind::Process], false).unwrap_err();
    assert_eq!(err.kind(), "YamlError");
}

#[test]
fn test_load_document_errors() {
    let dir = TempDir::new().unwrap();
    let process = [WatcherKind::Process];

    assert_eq!(load_err(&dir, "", &process), "Syntax error: <path>");
    assert_eq!(load_err(&dir, "- a\n- b\n", &process), "Syntax error: <path>");
    assert_eq!(
        load_err(&dir, "notifiers: {email: {}}\n", &process),
        "Not found \"watchers\" entry: <path>"
    );
    assert_eq!(
        load_err(&dir, "watchers:\n  log: {watch_dir: d}\n", &process),
        "Not found watcher configuration for \"process\": <path>"
    );
    assert_eq!(
        load_err(&dir, "watchers:\n  process: []\n", &process),
        "Not found watcher configuration for \"process\": <path>"
    );
    assert_eq!(
        load_err(&dir, "watchers: xxx\n", &process),
        "Syntax error: <path>"
    );
}

#[test]
fn test_load_notifier_errors() {
    let dir = TempDir::new().unwrap();
    let watchers = "watchers:\n  process: [{name: a, regexp: '.*', error: '=1'}]\n";
    let process = [WatcherKind::Process];

    assert_eq!(
        load_err(&dir, watchers, &process),
        "Not found \"notifiers\" entry: <path>"
    );
    assert_eq!(
        load_err(&dir, &format!("{}notifiers: {{xxx: {{}}}}\n", watchers), &process),
        "Unsupported notifier type: xxx in <path>"
    );
    assert_eq!(
        load_err(&dir, &format!("{}notifiers: [email]\n", watchers), &process),
        "Syntax error: <path>"
    );
    assert_eq!(
        load_err(&dir, &format!("{}notifiers: {{email: {{smtp_server: s}}}}\n", watchers), &process),
        "EmailNotifier not found config key: group_id"
    );
    assert_eq!(
        load_err(&dir, &format!("{}notifiers: {{email: xxx}}\n", watchers), &process),
        "EmailNotifier settings not a dict: xxx"
    );
}

#[test]
fn test_load_log_watcher_errors() {
    let dir = TempDir::new().unwrap();
    let notifiers = "notifiers:\n  email: {group_id: g, smtp_server: s, from_address: a@example.com, to_address_list: b@example.com}\n";
    let log = [WatcherKind::Log];

    let cases = [
        ("log: xxx", "LogWatcher settings not a dict: xxx"),
        ("log: [{}, {}]", "LogWatcher settings not a dict: [{}, {}]"),
        ("log: {target_pattern: x}", "LogWatcher not found config key: watch_dir"),
        (
            "log: {watch_dir: d, message_num_threshold: a}",
            "LogWatcher settings syntax error: invalid integer value: 'a'",
        ),
        (
            "log: {watch_dir: d, message_len_threshold: a}",
            "LogWatcher settings syntax error: invalid integer value: 'a'",
        ),
        (
            "log: {watch_dir: d, pending_threshold: a}",
            "LogWatcher settings syntax error: invalid integer value: 'a'",
        ),
    ];
    for (watcher, expected) in cases {
        let body = format!("watchers:\n  {}\n{}", watcher, notifiers);
        assert_eq!(load_err(&dir, &body, &log), expected);
    }
}
