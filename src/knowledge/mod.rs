//! Knowledge base of recognized `%%parameter%%` names and the capability
//! used to resolve them against a live host.
//!
//! The catalog is a process-wide immutable table loaded once; the validator
//! uses it as a membership set and the [`HostResolver`] turns a subset of
//! the parameters into concrete values for the current machine.

use std::collections::HashMap;
use std::env;

use lazy_static::lazy_static;
use thiserror::Error;

#[cfg(unix)]
mod unix;
#[cfg(unix)]
use unix as platform;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
use windows as platform;

/// Operating systems an artifact definition can declare support for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatingSystem {
    Darwin,
    Linux,
    Windows,
}

impl OperatingSystem {
    pub const ALL: [OperatingSystem; 3] = [
        OperatingSystem::Darwin,
        OperatingSystem::Linux,
        OperatingSystem::Windows,
    ];

    /// The canonical name used in `supported_os` lists.
    pub fn as_str(&self) -> &'static str {
        match self {
            OperatingSystem::Darwin => "Darwin",
            OperatingSystem::Linux => "Linux",
            OperatingSystem::Windows => "Windows",
        }
    }

    /// Case-insensitive match against a `supported_os` entry.
    pub fn matches(&self, value: &str) -> bool {
        value.eq_ignore_ascii_case(self.as_str())
    }

    /// The platform this process runs on.
    pub fn current() -> OperatingSystem {
        match env::consts::OS {
            "windows" => OperatingSystem::Windows,
            "macos" => OperatingSystem::Darwin,
            _ => OperatingSystem::Linux,
        }
    }

    /// Whether a canonical OS name is part of the supported enumeration.
    pub fn is_valid(value: &str) -> bool {
        OperatingSystem::ALL.iter().any(|os| os.as_str() == value)
    }
}

/// Category labels an artifact definition may carry.
pub const LABELS: [&str; 18] = [
    "Antivirus",
    "Authentication",
    "Browser",
    "Cloud",
    "Cloud Storage",
    "Configuration Files",
    "Docker",
    "External Media",
    "ExternalAccount",
    "Hadoop",
    "History Files",
    "Logs",
    "Mail",
    "Network",
    "Software",
    "System",
    "Users",
    "iOS",
];

lazy_static! {
    /// All recognized parameter names mapped to their documentation.
    pub static ref KNOWLEDGE_BASE: HashMap<&'static str, &'static str> = {
        let mut kb = HashMap::new();
        kb.insert("users.username", "The name of the user.");
        kb.insert("users.temp", "Temporary directory for the user.");
        kb.insert("users.desktop", "The desktop directory of the user.");
        kb.insert("users.last_logon", "The last logon time for this user.");
        kb.insert("users.full_name", "Full name of the user.");
        // Windows specific values.
        kb.insert("users.userdomain", "The domain name of the user, e.g. MICROSOFT.");
        kb.insert("users.sid", "The SID of the user as reported by the system.");
        kb.insert("users.userprofile", "The profile directory of the user, e.g. C:\\Users\\foo.");
        kb.insert("users.appdata", "The %APPDATA% directory of the user.");
        kb.insert("users.localappdata", "The %LOCALAPPDATA% directory of the user.");
        kb.insert("users.internet_cache", "The cache directory of the user.");
        kb.insert("users.cookies", "The cookies directory of the user.");
        kb.insert("users.recent", "The recent directory of the user.");
        kb.insert("users.personal", "The Personal directory of the user.");
        kb.insert("users.startup", "The Startup directory of the user.");
        kb.insert("users.localappdata_low", "The LocalLow application data directory, Vista and above.");
        // Posix specific values.
        kb.insert("users.homedir", "The homedir of the user as reported by the system, e.g. /home/foo.");
        kb.insert("users.uid", "The uid of the user, e.g. 0.");
        kb.insert("users.gid", "The gid of the user, e.g. 5001.");
        kb.insert("users.shell", "The shell of the user, e.g. /bin/sh.");
        kb.insert("users.pw_entry", "The password state of the user, e.g. shadow+sha512.");
        kb.insert("fqdn", "The fully qualified domain name reported by the OS.");
        kb.insert("time_zone", "The timezone in Olson format, e.g. Pacific/Galapagos.");
        kb.insert("os", "The operating system, one of Windows Linux Darwin FreeBSD OpenBSD NetBSD.");
        kb.insert("os_major_version", "The major version of the OS, e.g. 7.");
        kb.insert("os_minor_version", "The minor version of the OS, e.g. 7.");
        kb.insert("environ_path", "The system configured path variable.");
        kb.insert("environ_temp", "The system temporary directory.");
        // Linux specific distribution information.
        kb.insert("os_release", "Linux distribution name.");
        // Windows specific system level parameters.
        kb.insert("environ_systemroot", "The value of the %SystemRoot% parameter, e.g. C:\\Windows.");
        kb.insert("environ_windir", "The value of the %WINDIR% parameter.");
        kb.insert("environ_programfiles", "The value of the %PROGRAMFILES% parameter.");
        kb.insert("environ_programfilesx86", "The value of the %PROGRAMFILES(X86)% parameter.");
        kb.insert("environ_systemdrive", "The value of the %SystemDrive% parameter, e.g. C:.");
        kb.insert("environ_profilesdirectory", "Folder that typically contains users' profile directories, e.g. %SystemDrive%\\Users.");
        kb.insert("environ_allusersprofile", "The value of the %AllUsersProfile% parameter.");
        kb.insert("environ_allusersappdata", "The value of the %AllUsersAppData% parameter.");
        kb.insert("current_control_set", "The current value of the system CurrentControlSet.");
        kb.insert("code_page", "The current code page of the system, e.g. cp1252.");
        kb.insert("domain", "The domain the machine is connected to, e.g. MICROSOFT.");
        kb
    };
}

/// Whether a parameter name is part of the knowledge base catalog.
pub fn is_known_parameter(name: &str) -> bool {
    KNOWLEDGE_BASE.contains_key(name)
}

/// Failure to resolve a `%%parameter%%` placeholder.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("parameter {0} could not be resolved")]
    UnknownParameter(String),
    #[error("environment variable {0} could not be resolved")]
    MissingEnvironment(String),
    #[error("placeholder expansion exceeded {0} levels")]
    DepthExceeded(usize),
    #[error("user enumeration failed: {0}")]
    UserLookup(#[from] std::io::Error),
}

/// Resolves a parameter name to its possible values.
///
/// A parameter can have more than one value, e.g. `users.sid` yields one
/// value per local user. Implementations fail for names they do not know;
/// partial answers are not allowed.
pub trait ParameterResolver: Send + Sync {
    fn resolve(&self, parameter: &str) -> Result<Vec<String>, ResolutionError>;
}

/// Resolver that echoes every parameter name back as its only value.
///
/// Useful for pipelines that should strip placeholders without consulting
/// the live host, and as a test double.
#[derive(Debug, Default)]
pub struct IdentityResolver;

impl ParameterResolver for IdentityResolver {
    fn resolve(&self, parameter: &str) -> Result<Vec<String>, ResolutionError> {
        Ok(vec![parameter.to_string()])
    }
}

/// Resolver backed by the current host.
///
/// User parameters come from `/etc/passwd` on unix and from the registry
/// ProfileList on Windows; `environ_*` parameters come from the process
/// environment. `users.appdata` and `users.localappdata` resolve to paths
/// that still reference `%%users.homedir%%`, relying on the caller's
/// recursive resolution.
#[derive(Debug, Default)]
pub struct HostResolver;

impl ParameterResolver for HostResolver {
    fn resolve(&self, parameter: &str) -> Result<Vec<String>, ResolutionError> {
        match parameter {
            "users.appdata" => Ok(vec!["%%users.homedir%%/AppData/Roaming".to_string()]),
            "users.localappdata" => Ok(vec!["%%users.homedir%%/AppData/Local".to_string()]),
            "users.username" => platform::user_names(),
            "users.homedir" | "users.userprofile" => platform::user_home_dirs(),
            "users.sid" => platform::user_sids(),
            "users.temp" => Ok(vec![env::temp_dir().to_string_lossy().into_owned()]),
            name if name.starts_with("environ_") => resolve_environ(name),
            name => Err(ResolutionError::UnknownParameter(name.to_string())),
        }
    }
}

/// Map an `environ_*` parameter onto the process environment, e.g.
/// `environ_systemroot` reads `%SYSTEMROOT%`.
fn resolve_environ(name: &str) -> Result<Vec<String>, ResolutionError> {
    let variable = name
        .trim_start_matches("environ_")
        .to_ascii_uppercase();
    match env::var(&variable) {
        Ok(value) => Ok(vec![value]),
        Err(_) => Err(ResolutionError::MissingEnvironment(variable)),
    }
}
