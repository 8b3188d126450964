use easy_alert::core::{HostContext, Level, MessageCatalog};
use easy_alert::platform::ListingProcessReader;
use easy_alert::watchers::ProcessWatcher;
use serde_yaml::Value;

const LISTING: &str = r#"  PID  PPID ARGS
    1     0 /sbin/launchd
   37     1 /usr/sbin/syslogd
   38     1 /usr/libexec/UserEventAgent (System)
   40     1 your-awesome-app arg1 arg2 "arg 3"
11111 11112 your-awesome-app arg1 arg2 "arg 3"
11112    40 your-awesome-app arg1 arg2 "arg 3"
"#;

fn watcher(config: &str) -> ProcessWatcher {
    let config: Value = serde_yaml::from_str(config).unwrap();
    ProcessWatcher::with_reader(&config, Box::new(ListingProcessReader::new(LISTING))).unwrap()
}

#[test]
fn test_watch() {
    let w = watcher(
        r#"
- {name: all procs aggregate, error: '<=5', warn: '<=3', regexp: '.*'}
- {name: all procs distinct, error: '<=5', warn: '<=3', aggregate: false, regexp: '.*'}
- {name: awesome 1, warn: '=1', regexp: 'awesome[-]?app'}
- {name: awesome 2, warn: '=2', regexp: 'awesome[-]?app', aggregate: true}
- {name: awesome 3, warn: '=3', regexp: 'awesome[-]?app', aggregate: false}
"#,
    );
    let alerts = w.watch(&HostContext::new("host1", MessageCatalog::english())).unwrap();

    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].level, Level::Error);
    let lines: Vec<&str> = alerts[0].message.lines().collect();
    assert_eq!(lines.len(), 7);
    assert_eq!(
        &lines[2..5],
        [
            "[WARN] all procs aggregate: 4 process(es) are running (not \"<=3\")",
            "[ERROR] all procs distinct: 6 process(es) are running (not \"<=5\")",
            "[WARN] awesome 2: 1 process(es) are running (not \"=2\")",
        ]
    );
    assert_eq!(lines[6], "==");
}

#[test]
fn test_severity_ladder_scans_from_most_severe() {
    let host = HostContext::new("host1", MessageCatalog::english());

    // six processes: only the warn condition is violated
    let w = watcher("[{name: all, regexp: '.*', aggregate: false, critical: '>=1', error: '<=10', warn: '<=5'}]");
    let alerts = w.watch(&host).unwrap();
    assert_eq!(alerts[0].level, Level::Warn);

    // '>10' already fails for six, so the ladder stops at critical
    let w = watcher(
        "[{name: all, regexp: '.*', aggregate: false, critical: '>10', error: '>=8', warn: '=6', info: '<=4', debug: '<2'}]",
    );
    let alerts = w.watch(&host).unwrap();
    assert_eq!(alerts[0].level, Level::Critical);
    assert!(alerts[0].message.contains("(not \">10\")"));
}

#[test]
fn test_healthy_processes_are_quiet() {
    let w = watcher("[{name: launchd, regexp: '^/sbin/launchd$', error: '=1'}]");
    let alerts = w.watch(&HostContext::new("host1", MessageCatalog::english())).unwrap();
    assert!(alerts.is_empty());
}

#[test]
fn test_japanese_catalog() {
    let w = watcher("[{name: daemon, regexp: 'no-such-daemon', critical: '>=1'}]");
    let alerts = w.watch(&HostContext::new("host1", MessageCatalog::japanese())).unwrap();
    assert_eq!(alerts[0].level, Level::Critical);
    assert_eq!(alerts[0].title, "プロセス異常を検知しました");
    assert!(alerts[0].message.contains("[緊急] daemon: 起動していません"));
}
