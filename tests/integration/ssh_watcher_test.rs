use std::cell::RefCell;
use std::rc::Rc;

use easy_alert::core::{HostContext, Level, MessageCatalog};
use easy_alert::platform::{ProbeFailure, SshEndpoint, SshProbe};
use easy_alert::watchers::SshWatcher;
use serde_yaml::Value;

/// Fails for every host listed in `unreachable` and records each probe
struct FakeProbe {
    unreachable: Vec<&'static str>,
    probed: Rc<RefCell<Vec<SshEndpoint>>>,
}

impl SshProbe for FakeProbe {
    fn probe(&self, endpoint: &SshEndpoint) -> Result<(), ProbeFailure> {
        self.probed.borrow_mut().push(endpoint.clone());
        if self.unreachable.contains(&endpoint.host.as_str()) {
            Err(ProbeFailure::new("SSHException", "Error reading SSH protocol banner"))
        } else {
            Ok(())
        }
    }
}

fn watcher(config: &str, unreachable: Vec<&'static str>) -> (SshWatcher, Rc<RefCell<Vec<SshEndpoint>>>) {
    let config: Value = serde_yaml::from_str(config).unwrap();
    let probed = Rc::new(RefCell::new(Vec::new()));
    let probe = FakeProbe {
        unreachable,
        probed: Rc::clone(&probed),
    };
    (SshWatcher::with_probe(&config, Box::new(probe)).unwrap(), probed)
}

fn host() -> HostContext {
    HostContext::new("host1", MessageCatalog::english())
}

#[test]
fn test_static_targets() {
    let (watcher, probed) = watcher(
        "
- {name: n1, host: h1, user: u1, key: /path/to/key}
- {name: n2, host: h2, user: u2, key: /path/to/key, port: 2222}
- {name: n3, host: h3, user: u3, key: /path/to/key}
",
        vec!["h1", "h3"],
    );

    let alerts = watcher.watch(&host()).unwrap();
    assert_eq!(probed.borrow().len(), 3);
    assert_eq!(probed.borrow()[1].port, 2222);
    assert_eq!(probed.borrow()[1].user, "u2");

    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].level, Level::Error);
    assert_eq!(alerts[0].title, "Found SSH Connection Error");
    let lines: Vec<&str> = alerts[0].message.lines().collect();
    assert_eq!(
        lines[0],
        "Failed to connect to the following servers using SSH from 'host1'."
    );
    assert_eq!(
        lines[2],
        "[n1](u1@h1:22): SSHException: Error reading SSH protocol banner"
    );
    assert_eq!(
        lines[3],
        "[n3](u3@h3:22): SSHException: Error reading SSH protocol banner"
    );
    assert_eq!(lines[5], "==");
}

#[test]
fn test_all_reachable() {
    let (watcher, probed) = watcher("[{name: n1, host: h1, user: u1, key: k}]", vec![]);
    assert!(watcher.watch(&host()).unwrap().is_empty());
    assert_eq!(probed.borrow().len(), 1);
}

#[test]
fn test_dynamic_targets() {
    let (watcher, probed) = watcher(
        "[{dynamic: 'printf \"h1 node one\\nh2\\n\"', user: u1, key: k}]",
        vec!["h1", "h2"],
    );

    let alerts = watcher.watch(&host()).unwrap();
    let hosts: Vec<String> = probed.borrow().iter().map(|e| e.host.clone()).collect();
    assert_eq!(hosts, vec!["h1", "h2"]);

    let message = &alerts[0].message;
    assert!(message.contains("[node one](u1@h1:22): SSHException"));
    assert!(message.contains("[h2](u1@h2:22): SSHException"));
}

#[test]
fn test_failed_discovery_is_reported() {
    let (watcher, probed) = watcher(
        "
- {dynamic: 'exit 1', user: u1, key: k}
- {name: n2, host: h2, user: u2, key: k}
",
        vec![],
    );

    let alerts = watcher.watch(&host()).unwrap();
    assert_eq!(probed.borrow().len(), 1);
    assert_eq!(alerts.len(), 1);
    assert!(alerts[0]
        .message
        .contains("[exit 1](u1@-:22): DiscoveryError: exit code 1"));
}
