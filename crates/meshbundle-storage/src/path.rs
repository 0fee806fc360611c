//! Path utilities for package paths and bundle-relative file paths

/// Normalize a package path
/// - Converts backslashes to forward slashes
/// - Removes redundant separators
/// - Resolves . and .. components
/// - Ensures the path starts with /
pub fn normalize_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    let path = path.trim();

    let mut components = Vec::new();

    for component in path.split('/') {
        match component {
            "" | "." => continue,
            ".." => {
                components.pop();
            }
            _ => components.push(component),
        }
    }

    if components.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", components.join("/"))
    }
}

/// Get filename from path
pub fn filename(path: &str) -> &str {
    let path = path.trim_end_matches(['/', '\\']);

    match path.rfind(['/', '\\']) {
        Some(pos) => &path[pos + 1..],
        None => path,
    }
}

/// Join path components
pub fn join_paths(base: &str, relative: &str) -> String {
    if relative.starts_with('/') {
        return normalize_path(relative);
    }

    let base = base.trim_end_matches('/');
    normalize_path(&format!("{}/{}", base, relative))
}

/// Remainder of `path` below `base`, without a leading separator
///
/// Both sides are normalized first, so separator style and trailing
/// slashes do not matter. Returns `None` when `path` is not inside `base`.
pub fn relative_to(path: &str, base: &str) -> Option<String> {
    let path = normalize_path(path);
    let base = normalize_path(base);

    if base == "/" {
        return Some(path.trim_start_matches('/').to_string());
    }

    path.strip_prefix(&base)
        .and_then(|rest| rest.strip_prefix('/'))
        .filter(|rest| !rest.is_empty())
        .map(str::to_string)
}

/// Drop the extension of the final component, if any
pub fn strip_extension(path: &str) -> &str {
    let name = filename(path);
    match name.rfind('.') {
        Some(pos) if pos > 0 => &path[..path.len() - (name.len() - pos)],
        _ => path,
    }
}

/// Get file extension from path
pub fn get_extension(path: &str) -> Option<&str> {
    let filename = filename(path);

    if let Some(pos) = filename.rfind('.') {
        if pos > 0 && pos < filename.len() - 1 {
            return Some(&filename[pos + 1..]);
        }
    }

    None
}

/// Case-insensitive extension check (`ext` without the dot)
pub fn has_extension(path: &str, ext: &str) -> bool {
    get_extension(path).is_some_and(|own| own.eq_ignore_ascii_case(ext))
}

/// Check if path matches a glob pattern
/// Supports * (any chars) and ? (single char)
pub fn glob_match(pattern: &str, path: &str) -> bool {
    glob_match_impl(pattern.as_bytes(), path.as_bytes())
}

fn glob_match_impl(pattern: &[u8], text: &[u8]) -> bool {
    let mut p = 0;
    let mut t = 0;
    let mut star_p = None;
    let mut star_t = None;

    while t < text.len() {
        if p < pattern.len() {
            match pattern[p] {
                b'*' => {
                    star_p = Some(p);
                    star_t = Some(t);
                    p += 1;
                    continue;
                }
                b'?' => {
                    p += 1;
                    t += 1;
                    continue;
                }
                c if c == text[t] => {
                    p += 1;
                    t += 1;
                    continue;
                }
                _ => {}
            }
        }

        // Mismatch - backtrack to last star if any
        if let (Some(sp), Some(st)) = (star_p, star_t) {
            p = sp + 1;
            star_t = Some(st + 1);
            t = st + 1;
            continue;
        }

        return false;
    }

    // Match remaining stars
    while p < pattern.len() && pattern[p] == b'*' {
        p += 1;
    }

    p == pattern.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("Game/Hero"), "/Game/Hero");
        assert_eq!(normalize_path("Game\\Hero"), "/Game/Hero");
        assert_eq!(normalize_path("/Game//Hero/"), "/Game/Hero");
        assert_eq!(normalize_path("/Game/./Hero/../Props"), "/Game/Props");
        assert_eq!(normalize_path(""), "/");
    }

    #[test]
    fn test_join_paths() {
        assert_eq!(join_paths("/Game/Imported", "Textures/T_Body"), "/Game/Imported/Textures/T_Body");
        assert_eq!(join_paths("/Game/Imported/", "T_Body"), "/Game/Imported/T_Body");
        assert_eq!(join_paths("/Game/Imported", "/Other"), "/Other");
    }

    #[test]
    fn test_relative_to() {
        assert_eq!(
            relative_to("C:\\Export\\Hero\\T_Body.png", "C:/Export/"),
            Some("Hero/T_Body.png".to_string())
        );
        assert_eq!(relative_to("/data/bundle/a.png", "/data/bundle"), Some("a.png".to_string()));
        assert_eq!(relative_to("/data/bundle2/a.png", "/data/bundle"), None);
        assert_eq!(relative_to("/data/bundle", "/data/bundle"), None);
    }

    #[test]
    fn test_strip_extension() {
        assert_eq!(strip_extension("Hero/T_Body.png"), "Hero/T_Body");
        assert_eq!(strip_extension("v1.2/T_Body"), "v1.2/T_Body");
        assert_eq!(strip_extension(".hidden"), ".hidden");
    }

    #[test]
    fn test_filename() {
        assert_eq!(filename("/out/Hero/SK_Hero.fbx"), "SK_Hero.fbx");
        assert_eq!(filename("C:\\out\\a.png"), "a.png");
        assert_eq!(filename("a.png"), "a.png");
    }

    #[test]
    fn test_glob_match() {
        assert!(glob_match("*.fbx", "SK_Hero.fbx"));
        assert!(glob_match("T_???.png", "T_Arm.png"));
        assert!(glob_match("*_material.json", "M_Skin_material.json"));
        assert!(!glob_match("*.fbx", "SK_Hero.json"));
        assert!(glob_match("*", ""));
    }

    #[test]
    fn test_extension() {
        assert_eq!(get_extension("/out/SK_Hero.FBX"), Some("FBX"));
        assert!(has_extension("/out/SK_Hero.FBX", "fbx"));
        assert!(!has_extension("no_extension", "fbx"));
        assert_eq!(get_extension(".hidden"), None);
    }
}
