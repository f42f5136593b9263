//! Shell-style path expansion for configured paths.
//!
//! Values like `PIPER_MODEL_PATH` are written by users in `local.env` with
//! `~` or `$HOME` in them; this module expands both before the path is used.

use std::path::PathBuf;

/// Expand a leading `~` and any `$HOME` occurrences in `raw`.
///
/// Only `$HOME` is substituted — other variables are left untouched, which
/// matches what users actually put in `local.env`.  When no home directory
/// can be determined the input comes back unchanged.
pub fn expand(raw: &str) -> PathBuf {
    let Some(home) = dirs::home_dir() else {
        return PathBuf::from(raw);
    };
    let home = home.to_string_lossy();

    let mut expanded = raw.replace("$HOME", &home);
    if expanded == "~" {
        expanded = home.to_string();
    } else if let Some(rest) = expanded.strip_prefix("~/") {
        expanded = format!("{home}/{rest}");
    }
    PathBuf::from(expanded)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
