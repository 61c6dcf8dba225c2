//! User enumeration from the registry ProfileList.

use winreg::enums::HKEY_LOCAL_MACHINE;
use winreg::RegKey;

use super::ResolutionError;

const PROFILE_LIST: &str = r"SOFTWARE\Microsoft\Windows NT\CurrentVersion\ProfileList";

pub(super) fn user_sids() -> Result<Vec<String>, ResolutionError> {
    let profile_list = RegKey::predef(HKEY_LOCAL_MACHINE).open_subkey(PROFILE_LIST)?;
    let mut sids = Vec::new();
    for key in profile_list.enum_keys() {
        sids.push(key?);
    }
    Ok(sids)
}

/// `ProfileImagePath` of every profile under the ProfileList key.
pub(super) fn user_home_dirs() -> Result<Vec<String>, ResolutionError> {
    let profile_list = RegKey::predef(HKEY_LOCAL_MACHINE).open_subkey(PROFILE_LIST)?;
    let mut homes = Vec::new();
    for sid in user_sids()? {
        let profile = profile_list.open_subkey(&sid)?;
        let path: String = profile.get_value("ProfileImagePath")?;
        homes.push(path);
    }
    Ok(homes)
}

pub(super) fn user_names() -> Result<Vec<String>, ResolutionError> {
    let mut names = Vec::new();
    for home in user_home_dirs()? {
        let name = home
            .rsplit('\\')
            .next()
            .unwrap_or(home.as_str())
            .to_string();
        names.push(name);
    }
    Ok(names)
}
