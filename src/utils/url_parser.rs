/// Host (and port) part of a URL, for display in the page header.
pub fn hostname_from_url(url: &str) -> String {
    let url = url.trim();
    let rest = url.split_once("://").map(|(_, r)| r).unwrap_or(url);
    rest.split(['/', '?', '#']).next().unwrap_or_default().to_string()
}
