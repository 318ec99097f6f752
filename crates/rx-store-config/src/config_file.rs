use std::{
    env,
    path::{Path, PathBuf},
};

const CONFIG_FILE: &str = ".rx-store.toml";

/// Load config file content from CWD first, then the home directory
///
/// Searches for:
/// 1. `.rx-store.toml` in the current working directory
/// 2. `.rx-store.toml` in the home directory
/// 3. `config.toml` in the application config directory
///
/// Returns the file content if found, None otherwise.
pub fn load_config_file() -> Option<String> {
    let mut candidates = vec![PathBuf::from(CONFIG_FILE)];
    candidates.extend(get_home_config_path());
    if let Ok(global) = crate::paths::global_config_path() {
        candidates.push(global);
    }
    load_first(&candidates)
}

/// Read the first candidate that exists
pub fn load_first<P: AsRef<Path>>(candidates: &[P]) -> Option<String> {
    for path in candidates {
        let path = path.as_ref();
        if let Ok(content) = std::fs::read_to_string(path) {
            log::debug!("Loaded config from {}", path.display());
            return Some(content);
        }
    }
    None
}

/// Get the path to the config file in the home directory
fn get_home_config_path() -> Option<PathBuf> {
    env::var_os("HOME").map(|home| PathBuf::from(home).join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_first_skips_missing() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        let present = dir.path().join("present.toml");
        std::fs::write(&present, "dev_tools = true").unwrap();

        let content = load_first(&[missing, present]).unwrap();
        assert_eq!(content, "dev_tools = true");
    }

    #[test]
    fn test_load_first_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_first(&[dir.path().join("nope.toml")]).is_none());
    }
}
