//! `log` backend that writes to the system log.

use log::{Level, LevelFilter, SetLoggerError};

/// Prefix used for each log level in syslog lines
fn prefix(level: Level) -> &'static str {
    match level {
        Level::Error => "[ERROR]",
        Level::Warn => "[WARN] ",
        _ => "[INFO] ",
    }
}

/// Format a record the way it is written to syslog
pub fn format_line(level: Level, message: &str) -> String {
    format!("{}{}", prefix(level), message)
}

#[cfg(unix)]
mod imp {
    use std::ffi::CString;

    use log::{Level, Log, Metadata, Record};

    pub struct SyslogLogger {
        // openlog keeps the pointer, so the ident lives as long as the logger
        _ident: CString,
    }

    impl SyslogLogger {
        pub fn open(ident: &str) -> Self {
            let ident = CString::new(ident.replace('\0', ""))
                .unwrap_or_else(|_| CString::from(c"easy-alert"));
            unsafe {
                libc::openlog(ident.as_ptr(), libc::LOG_PID, libc::LOG_USER);
            }
            Self { _ident: ident }
        }
    }

    impl Log for SyslogLogger {
        fn enabled(&self, metadata: &Metadata) -> bool {
            metadata.level() <= Level::Info
        }

        fn log(&self, record: &Record) {
            if !self.enabled(record.metadata()) {
                return;
            }
            let priority = match record.level() {
                Level::Error => libc::LOG_ERR,
                Level::Warn => libc::LOG_WARNING,
                _ => libc::LOG_INFO,
            };
            let line = super::format_line(record.level(), &record.args().to_string());
            let Ok(line) = CString::new(line.replace('\0', "")) else {
                return;
            };
            unsafe {
                libc::syslog(priority, c"%s".as_ptr(), line.as_ptr());
            }
        }

        fn flush(&self) {}
    }
}

#[cfg(not(unix))]
mod imp {
    use log::{Level, Log, Metadata, Record};

    /// Fallback for hosts without syslog: write to stderr
    pub struct SyslogLogger;

    impl SyslogLogger {
        pub fn open(_ident: &str) -> Self {
            Self
        }
    }

    impl Log for SyslogLogger {
        fn enabled(&self, metadata: &Metadata) -> bool {
            metadata.level() <= Level::Info
        }

        fn log(&self, record: &Record) {
            if self.enabled(record.metadata()) {
                eprintln!("{}", super::format_line(record.level(), &record.args().to_string()));
            }
        }

        fn flush(&self) {}
    }
}

pub use imp::SyslogLogger;

/// Install the syslog logger as the global `log` backend
pub fn install(ident: &str) -> Result<(), SetLoggerError> {
    let logger: &'static SyslogLogger = Box::leak(Box::new(SyslogLogger::open(ident)));
    log::set_logger(logger)?;
    log::set_max_level(LevelFilter::Info);
    Ok(())
}
