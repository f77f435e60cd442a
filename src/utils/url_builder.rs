/// Join the console's public base URL with an absolute path.
/// Already-absolute URLs are returned as is; an empty base yields the path.
pub fn absolute_url(base_url: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    let base = base_url.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        if base.is_empty() {
            "/".to_string()
        } else {
            base.to_string()
        }
    } else {
        format!("{}/{}", base, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_base_and_path() {
        assert_eq!(absolute_url("https://console.example.com/", "/create"), "https://console.example.com/create");
        assert_eq!(absolute_url("", "/create"), "/create");
        assert_eq!(absolute_url("", ""), "/");
        assert_eq!(absolute_url("https://a", "https://b/x"), "https://b/x");
    }
}
