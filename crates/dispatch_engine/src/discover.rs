use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use dispatch_core::{has_extension, parse_input_list, Profile};
use dispatch_logging::{dispatch_debug, dispatch_warn};
use walkdir::WalkDir;

use crate::DispatchError;

/// Collects the profile's inputs: files under each root with the profile's
/// extension plus the entries of its input list, de-duplicated and sorted.
pub fn discover_inputs(profile: &Profile) -> Result<Vec<PathBuf>, DispatchError> {
    let mut found = BTreeSet::new();

    for root in &profile.inputs {
        if !root.exists() {
            dispatch_warn!("Input root not found: {}", root.display());
            continue;
        }
        let before = found.len();
        for entry in WalkDir::new(root).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    dispatch_warn!("Skipping unreadable entry under {}: {}", root.display(), err);
                    continue;
                }
            };
            if entry.file_type().is_file() && has_extension(entry.path(), &profile.extension) {
                found.insert(entry.into_path());
            }
        }
        dispatch_debug!(
            "Found {} .{} files under {}",
            found.len() - before,
            profile.extension,
            root.display()
        );
    }

    if let Some(list) = &profile.input_list {
        let text = fs::read_to_string(list).map_err(|source| DispatchError::InputList {
            path: list.clone(),
            source,
        })?;
        let listed = parse_input_list(&text, &profile.extension);
        dispatch_debug!("Input list {} names {} files", list.display(), listed.len());
        found.extend(listed);
    }

    Ok(found.into_iter().collect())
}
