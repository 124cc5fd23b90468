use std::fs;
use std::path::Path;

use anyhow::Context;
use dispatch_core::{HostSet, Profile};
use dispatch_logging::{dispatch_info, dispatch_warn};

pub(crate) fn load_profile(path: &Path) -> anyhow::Result<Profile> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading profile {}", path.display()))?;
    Profile::from_ron_str(&text).with_context(|| format!("loading profile {}", path.display()))
}

/// A missing host list only costs the placement constraint.
pub(crate) fn load_hosts(path: Option<&Path>) -> HostSet {
    let Some(path) = path else {
        return HostSet::default();
    };
    match fs::read_to_string(path) {
        Ok(text) => {
            let hosts = HostSet::parse(&text);
            dispatch_info!("Loaded {} eligible hosts from {}", hosts.len(), path.display());
            hosts
        }
        Err(err) => {
            dispatch_warn!(
                "Host list {} unavailable ({}); jobs may land on any host",
                path.display(),
                err
            );
            HostSet::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_host_list_is_an_empty_set() {
        let temp = tempfile::TempDir::new().unwrap();
        assert!(load_hosts(Some(&temp.path().join("hosts.txt"))).is_empty());
        assert!(load_hosts(None).is_empty());
    }

    #[test]
    fn host_list_is_read() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("hosts.txt");
        fs::write(&path, "node01\nnode02\n").unwrap();
        assert_eq!(load_hosts(Some(&path)).joined(), "node01 node02");
    }

    #[test]
    fn unreadable_profile_names_the_path() {
        let temp = tempfile::TempDir::new().unwrap();
        let err = load_profile(&temp.path().join("missing.ron")).unwrap_err();
        assert!(format!("{err:#}").contains("missing.ron"));
    }
}
