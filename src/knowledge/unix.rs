//! User enumeration from `/etc/passwd`.

use std::fs::File;
use std::io::{BufRead, BufReader};

use super::ResolutionError;

struct PasswdEntry {
    name: String,
    gid: String,
    home: String,
}

/// Parse `/etc/passwd`, skipping comments and malformed lines.
fn read_passwd() -> Result<Vec<PasswdEntry>, ResolutionError> {
    let file = File::open("/etc/passwd")?;
    let reader = BufReader::new(file);

    let mut entries = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.starts_with('#') || line.trim().is_empty() {
            continue;
        }
        // name:passwd:uid:gid:gecos:home:shell
        let fields: Vec<&str> = line.split(':').collect();
        if fields.len() < 6 {
            continue;
        }
        entries.push(PasswdEntry {
            name: fields[0].to_string(),
            gid: fields[3].to_string(),
            home: fields[5].to_string(),
        });
    }
    Ok(entries)
}

pub(super) fn user_names() -> Result<Vec<String>, ResolutionError> {
    Ok(read_passwd()?.into_iter().map(|entry| entry.name).collect())
}

pub(super) fn user_home_dirs() -> Result<Vec<String>, ResolutionError> {
    Ok(read_passwd()?.into_iter().map(|entry| entry.home).collect())
}

/// Unix hosts have no SIDs; group ids act as the closest stand-in.
pub(super) fn user_sids() -> Result<Vec<String>, ResolutionError> {
    Ok(read_passwd()?.into_iter().map(|entry| entry.gid).collect())
}
