//! Windows registry behind the forensic path convention.

use std::io::{self, Read};

use winreg::enums::{
    HKEY_CLASSES_ROOT, HKEY_CURRENT_CONFIG, HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE, HKEY_USERS,
};
use winreg::{RegKey, HKEY};

use super::VirtualFilesystem;

const HIVES: [(&str, HKEY); 5] = [
    ("HKEY_CLASSES_ROOT", HKEY_CLASSES_ROOT),
    ("HKEY_CURRENT_CONFIG", HKEY_CURRENT_CONFIG),
    ("HKEY_CURRENT_USER", HKEY_CURRENT_USER),
    ("HKEY_LOCAL_MACHINE", HKEY_LOCAL_MACHINE),
    ("HKEY_USERS", HKEY_USERS),
];

/// Registry key namespace rooted at the hive list, e.g.
/// `/HKEY_LOCAL_MACHINE/SOFTWARE`. Keys behave as directories; the engine
/// never reads values, so `open` is not supported.
#[derive(Debug, Default)]
pub struct RegistryFilesystem;

impl RegistryFilesystem {
    pub fn new() -> RegistryFilesystem {
        RegistryFilesystem
    }

    fn open_key(&self, path: &str) -> io::Result<RegKey> {
        let trimmed = path.trim_start_matches('/');
        let (hive_name, subkey) = match trimmed.split_once('/') {
            Some((hive, rest)) => (hive, rest.replace('/', "\\")),
            None => (trimmed, String::new()),
        };
        let hive = HIVES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(hive_name))
            .map(|(_, hive)| *hive)
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, format!("unknown hive: {hive_name}"))
            })?;
        RegKey::predef(hive).open_subkey(subkey)
    }
}

impl VirtualFilesystem for RegistryFilesystem {
    fn name(&self) -> &'static str {
        "RegistryFs"
    }

    fn list_directory(&self, path: &str) -> io::Result<Vec<String>> {
        if path.is_empty() || path == "/" {
            return Ok(HIVES.iter().map(|(name, _)| name.to_string()).collect());
        }
        let key = self.open_key(path)?;
        let mut subkeys = Vec::new();
        for name in key.enum_keys() {
            subkeys.push(name?);
        }
        subkeys.sort();
        Ok(subkeys)
    }

    fn open(&self, path: &str) -> io::Result<Box<dyn Read + Send>> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            format!("registry values are not readable through the filesystem: {path}"),
        ))
    }
}
