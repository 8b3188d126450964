use std::fs;
use std::path::Path;

use easy_alert::core::{HostContext, Level, MessageCatalog};
use easy_alert::watchers::LogWatcher;
use serde_yaml::Value;
use tempfile::TempDir;

fn host() -> HostContext {
    HostContext::new("host1", MessageCatalog::english())
}

fn watcher(dir: &Path, extra: &str, print_only: bool) -> LogWatcher {
    let config: Value =
        serde_yaml::from_str(&format!("{{watch_dir: '{}'{}}}", dir.display(), extra)).unwrap();
    LogWatcher::from_config(&config, print_only).unwrap()
}

fn write(dir: &Path, name: &str, lines: &[&str]) {
    fs::write(dir.join(name), lines.join("\n")).unwrap();
}

/// Three ready fragments, the second one carrying an error
fn fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "alert.20150801_1234_1.log",
        &[
            "2015-08-01T12:34:56.789\tmonitor.syslog.warn\t{\"message\":\"Alert message 1.\"}",
            "2015-08-01T12:34:56.790\tmonitor.syslog.warn\t{\"message\":\"Alert message 2.\"}",
        ],
    );
    write(
        dir.path(),
        "alert.20150801_1234_2.log",
        &[
            "2015-08-01T12:35:00.000\tmonitor.syslog.error\t{\"message\":\"Something failed.\"}",
            "2015-08-01T12:35:01.000\tmonitor.app.warn\t{\"message\":\"Slow response.\",\"extra\":1}",
        ],
    );
    write(
        dir.path(),
        "alert.20150801_1234_3.log",
        &["2015-08-01T12:36:00.000\tmonitor.syslog.warn\t{\"message\":\"Alert message 3.\"}"],
    );
    dir
}

fn remaining(dir: &Path) -> usize {
    fs::read_dir(dir).unwrap().count()
}

#[test]
fn test_watch_reports_max_level() {
    let dir = fixture();
    let mut w = watcher(dir.path(), "", true);
    let alerts = w.watch(&host()).unwrap();

    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].level, Level::Error);
    assert_eq!(alerts[0].title, "Found Error Messages");

    let names: Vec<String> = w
        .target_paths()
        .unwrap()
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        [
            "alert.20150801_1234_1.log",
            "alert.20150801_1234_2.log",
            "alert.20150801_1234_3.log"
        ]
    );

    let message = &alerts[0].message;
    assert!(message.starts_with("Found the following errors on server 'host1'.\n\n"));
    // tags in lexicographic order
    let app = message.find("[monitor.app.warn]: 1 messages").unwrap();
    let error = message.find("[monitor.syslog.error]: 1 messages").unwrap();
    let warn = message.find("[monitor.syslog.warn]: 3 messages").unwrap();
    assert!(app < error && error < warn);
    assert!(message.contains("Alert message 3."));
}

#[test]
fn test_snip_and_truncate() {
    let dir = TempDir::new().unwrap();
    let lines: Vec<String> = (0..5)
        .map(|i| format!("t\tapp.critical\t{{\"message\":\"message-{}-abcdefghij\"}}", i))
        .collect();
    let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
    write(dir.path(), "alert.20150801_1234_1.log", &lines);

    let mut w = watcher(
        dir.path(),
        ", message_num_threshold: 2, message_len_threshold: 9",
        true,
    );
    let alerts = w.watch(&host()).unwrap();
    assert_eq!(alerts[0].level, Level::Critical);
    let body: Vec<&str> = alerts[0].message.lines().collect();
    assert_eq!(
        &body[2..6],
        ["[app.critical]: 5 messages", "message-0", "message-1", "(snip)"]
    );
}

#[test]
fn test_after_success_removes_files() {
    let dir = fixture();
    let mut w = watcher(dir.path(), "", false);
    w.watch(&host()).unwrap();
    w.after_success().unwrap();
    assert_eq!(remaining(dir.path()), 0);
}

#[test]
fn test_after_success_check_mode_keeps_files() {
    let dir = fixture();
    let mut w = watcher(dir.path(), "", true);
    w.watch(&host()).unwrap();
    w.after_success().unwrap();
    assert_eq!(remaining(dir.path()), 3);
}

#[test]
fn test_after_success_before_watch_is_noop() {
    let dir = fixture();
    let w = watcher(dir.path(), "", false);
    w.after_success().unwrap();
    assert_eq!(remaining(dir.path()), 3);
}

#[test]
fn test_pending_detection() {
    let dir = fixture();

    // nothing ready, three partial files pile up
    let mut w = watcher(dir.path(), ", target_pattern: xxx", true);
    let alerts = w.watch(&host()).unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].level, Level::Warn);
    assert_eq!(alerts[0].title, "Possible Retention of Log Watcher");
    assert!(alerts[0].message.contains("alert.20150801_1234_2.log"));
    assert_eq!(w.target_paths().map(<[_]>::len), Some(0));

    let mut w = watcher(dir.path(), ", target_pattern: xxx, pending_threshold: 4", true);
    assert!(w.watch(&host()).unwrap().is_empty());
}

#[test]
fn test_empty_directory_is_quiet() {
    let dir = TempDir::new().unwrap();
    let mut w = watcher(dir.path(), "", false);
    assert!(w.watch(&host()).unwrap().is_empty());
    w.after_success().unwrap();
}

#[test]
fn test_parse_errors_are_fatal() {
    let cases = [
        ("2015-08-01T12:34:56.789", "FieldCountError"),
        ("2015-08-01T12:34:56.789\tmonitor.syslog.warn", "FieldCountError"),
        (
            "2015-08-01T12:34:56.789\tmonitor.syslog.war\t{\"message\":\"Invalid alert level.\"}",
            "LevelError: Unknown level string: war",
        ),
        ("2015-08-01T12:34:56.789\tmonitor.syslog.warn\t1\t2", "FieldCountError"),
        ("2015-08-01T12:34:56.789\tmonitor.syslog.warn\t{}", "KeyError: 'message'"),
        ("2015-08-01T12:34:56.789\tmonitor.syslog.warn\t[", "JsonError"),
        (
            "2015-08-01T12:34:56.789\tmonitor.syslog.warn\t{\"message\":null}",
            "TypeError: message is not a string: null",
        ),
    ];

    for (i, (line, kind)) in cases.iter().enumerate() {
        let dir = TempDir::new().unwrap();
        let name = format!("err.20150801_1234_{}.log", i + 1);
        write(dir.path(), &name, &[line]);

        let mut w = watcher(dir.path(), &format!(", target_pattern: '{}'", name), true);
        let err = w.watch(&host()).unwrap_err();
        let text = err.to_string();

        assert_eq!(err.kind(), "LogFormatError");
        assert!(
            text.starts_with(&format!("LogWatcher parse error: {}", kind)),
            "{}",
            text
        );
        assert!(text.contains(&format!("file={}", dir.path().join(&name).display())));
        assert!(text.ends_with(&format!("line={}", line)));
    }
}
