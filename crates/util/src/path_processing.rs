//! Path helpers for user-supplied locations such as `--draft-path` and
//! attachment paths in answer files.

use std::path::PathBuf;

use dirs_next::home_dir;

/// Resolve a user-entered path, replacing a leading `~` with the home directory.
///
/// Surrounding whitespace is ignored. Both `~/` and `~\` separators are
/// accepted. If the home directory cannot be determined the `~` is kept.
pub fn expand_tilde(path: &str) -> PathBuf {
    let path = path.trim();
    let home = || home_dir().unwrap_or_else(|| PathBuf::from("~"));
    match path.strip_prefix('~') {
        Some("") => home(),
        Some(rest) if rest.starts_with(['/', '\\']) => home().join(&rest[1..]),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaves_plain_paths_alone() {
        assert_eq!(expand_tilde(" /tmp/drafts.json "), PathBuf::from("/tmp/drafts.json"));
    }

    #[test]
    fn expands_home_prefix() {
        if let Some(home) = home_dir() {
            assert_eq!(expand_tilde("~/formfill/drafts.json"), home.join("formfill/drafts.json"));
            assert_eq!(expand_tilde("~"), home);
        }
    }

    #[test]
    fn other_users_homes_are_not_expanded() {
        assert_eq!(expand_tilde("~ada/cv.pdf"), PathBuf::from("~ada/cv.pdf"));
    }
}
