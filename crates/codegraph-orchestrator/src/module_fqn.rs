use std::path::Path;

/// Derive a dotted module FQN for a file relative to the workspace root,
/// e.g. `src/pkg/mod_a.py` under root `src` becomes `pkg.mod_a`, and an
/// `__init__.py` names its containing package rather than itself.
pub fn module_fqn_for_file(workspace_root: &Path, file_path: &Path) -> String {
    let relative = file_path.strip_prefix(workspace_root).unwrap_or(file_path);
    let mut components: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();

    if let Some(last) = components.last_mut() {
        if let Some(stem) = last.rsplit_once('.') {
            *last = stem.0.to_string();
        }
    }
    if components.last().map(|s| s.as_str()) == Some("__init__") {
        components.pop();
    }

    components.join(".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn strips_extension_and_joins_with_dots() {
        let root = PathBuf::from("/repo");
        let file = PathBuf::from("/repo/pkg/mod_a.py");
        assert_eq!(module_fqn_for_file(&root, &file), "pkg.mod_a");
    }

    #[test]
    fn init_file_names_its_package() {
        let root = PathBuf::from("/repo");
        let file = PathBuf::from("/repo/pkg/__init__.py");
        assert_eq!(module_fqn_for_file(&root, &file), "pkg");
    }
}
