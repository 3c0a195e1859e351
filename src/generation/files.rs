//! Recipe JSON files on disk.
//!
//! Files use the [`RecipeDraft`] shape, one recipe per `*.json` file, named by
//! [`recipe_file_name`].

use super::recipe::{RecipeDraft, parse_recipe_json};
use crate::errors::Result;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{info, warn};

/// Filename for a recipe title: lowercased, spaces to `_`, apostrophes
/// dropped, `&` spelled out.
///
/// ```
/// use meal_planner::generation::files::recipe_file_name;
/// assert_eq!(recipe_file_name("Mac & Cheese"), "mac_and_cheese.json");
/// ```
#[must_use]
pub fn recipe_file_name(title: &str) -> String {
    let slug = title
        .trim()
        .to_lowercase()
        .replace(' ', "_")
        .replace(['\'', '\u{2019}'], "")
        .replace('&', "and")
        .replace(['/', '\\'], "_");
    format!("{slug}.json")
}

/// Reads and validates one recipe file.
///
/// # Errors
/// Returns an I/O error if the file cannot be read, or a validation error if
/// its contents are not a valid recipe.
pub fn load_recipe_file(path: &Path) -> Result<RecipeDraft> {
    let text = fs::read_to_string(path)?;
    parse_recipe_json(&text)
}

/// Reads every `*.json` recipe in `dir`, sorted by path.
///
/// Files that fail to parse or validate are logged and skipped.
///
/// # Errors
/// Returns an error only if the directory itself cannot be read.
pub fn load_recipe_directory(dir: &Path) -> Result<Vec<(PathBuf, RecipeDraft)>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(std::result::Result::ok)
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .is_some_and(|e| e.eq_ignore_ascii_case("json"))
        })
        .collect();
    paths.sort();

    let mut drafts = Vec::with_capacity(paths.len());
    for path in paths {
        match load_recipe_file(&path) {
            Ok(draft) => drafts.push((path, draft)),
            Err(e) => warn!(path = %path.display(), error = %e, "skipping recipe file"),
        }
    }
    Ok(drafts)
}

/// Writes a recipe as pretty JSON into `dir`, returning the file path.
///
/// # Errors
/// Returns an error if the directory cannot be created or the file written.
pub fn write_recipe_file(dir: &Path, draft: &RecipeDraft) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(recipe_file_name(&draft.title));
    fs::write(&path, serde_json::to_string_pretty(draft)?)?;
    info!(path = %path.display(), "wrote recipe file");
    Ok(path)
}
