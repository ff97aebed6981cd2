/// Port used when neither the document nor `PORT` provide one.
pub const DEFAULT_PORT: &str = ":3000";

/// Parallel task limit used when the document value is unset or below one.
pub const DEFAULT_MAX_PARALLEL_TASKS: i64 = 10;


/// Scratch directory used on Unix-like systems.
pub const UNIX_TMP_PATH: &str = "/tmp/semaphore";


/// Returns the default scratch directory for cloned projects and playbooks.
#[cfg(unix)]
pub fn default_tmp_path() -> String {
    UNIX_TMP_PATH.to_string()
}

/// Returns the default scratch directory for cloned projects and playbooks.
#[cfg(not(unix))]
pub fn default_tmp_path() -> String {
    std::env::temp_dir()
        .join("semaphore")
        .to_string_lossy()
        .into_owned()
}


/// Brings a port into the `:port` form. Empty input stays empty.
pub fn normalize_port(raw: &str) -> String {
    if raw.is_empty() || raw.starts_with(':') {
        raw.to_string()
    } else {
        format!(":{raw}")
    }
}


/// Lexically cleans a slash-separated path: repeated separators, `.` segments
/// and resolvable `..` segments are removed. The filesystem is never touched.
///
/// An empty path cleans to `.`.
#[must_use = "function returns the cleaned path"]
pub fn clean_path(raw: &str) -> String {
    if raw.is_empty() {
        return ".".to_string();
    }

    let rooted = raw.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in raw.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|last| *last != "..") {
                    segments.pop();
                } else if !rooted {
                    // Leading `..` of a relative path cannot be resolved.
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    if rooted {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}



#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_gains_leading_colon() {
        assert_eq!(normalize_port("8080"), ":8080");
        assert_eq!(normalize_port(":8080"), ":8080");
        assert_eq!(normalize_port(""), "");
    }

    #[test]
    fn cleans_paths_lexically() {
        assert_eq!(clean_path("/tmp//semaphore/./repos/../"), "/tmp/semaphore");
        assert_eq!(clean_path("/../tmp"), "/tmp");
        assert_eq!(clean_path("a/../../b"), "../b");
        assert_eq!(clean_path("./a/b/.."), "a");
        assert_eq!(clean_path("a/.."), ".");
        assert_eq!(clean_path(""), ".");
        assert_eq!(clean_path("/"), "/");
    }
}
