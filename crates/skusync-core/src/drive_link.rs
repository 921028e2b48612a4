//! Drive link construction and folder-id extraction.
//!
//! Handles the two link shapes the catalog sheet has accumulated over time
//! (`…/drive/folders/<id>` and `…?id=<id>`) plus bare id strings.

use url::Url;

const FOLDER_BASE: &str = "https://drive.google.com/drive/folders/";
const VIEW_BASE: &str = "https://drive.google.com/uc?export=view&id=";

/// Browsable link for a resolved folder id.
pub fn folder_link(folder_id: &str) -> String {
    format!("{FOLDER_BASE}{folder_id}")
}

/// Fetchable view link for an image file id.
pub fn image_view_link(file_id: &str) -> String {
    format!("{VIEW_BASE}{file_id}")
}

fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Extract the folder id from a folder link.
///
/// Accepts `/folders/<id>` paths, `?id=<id>` query forms, and a bare id
/// string. Returns `None` when nothing id-shaped can be found.
pub fn extract_folder_id(link: &str) -> Option<String> {
    let link = link.trim();
    if link.is_empty() {
        return None;
    }

    if let Some(rest) = link.split("/folders/").nth(1) {
        let id: String = rest.chars().take_while(|c| is_id_char(*c)).collect();
        if !id.is_empty() {
            return Some(id);
        }
    }

    if let Ok(url) = Url::parse(link) {
        if let Some((_, id)) = url.query_pairs().find(|(k, _)| k == "id") {
            if !id.is_empty() && id.chars().all(is_id_char) {
                return Some(id.into_owned());
            }
        }
        return None;
    }

    // Not a URL at all: treat an id-shaped token as the id itself.
    if link.chars().all(is_id_char) {
        return Some(link.to_string());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_from_folders_path() {
        assert_eq!(
            extract_folder_id("https://drive.google.com/drive/folders/1AbC_d-9xYz"),
            Some("1AbC_d-9xYz".to_string())
        );
        // Trailing query string is ignored.
        assert_eq!(
            extract_folder_id("https://drive.google.com/drive/folders/1AbC?usp=sharing"),
            Some("1AbC".to_string())
        );
    }

    #[test]
    fn extracts_from_id_query() {
        assert_eq!(
            extract_folder_id("https://drive.google.com/open?id=XyZ-123_"),
            Some("XyZ-123_".to_string())
        );
    }

    #[test]
    fn accepts_bare_id() {
        assert_eq!(extract_folder_id("1AbC_d-9xYz"), Some("1AbC_d-9xYz".to_string()));
    }

    #[test]
    fn rejects_empty_and_unrelated() {
        assert_eq!(extract_folder_id(""), None);
        assert_eq!(extract_folder_id("   "), None);
        assert_eq!(extract_folder_id("https://example.com/nothing/here"), None);
        assert_eq!(extract_folder_id("not a link at all"), None);
    }

    #[test]
    fn links_round_trip_through_extraction() {
        let link = folder_link("abc123");
        assert_eq!(extract_folder_id(&link), Some("abc123".to_string()));
    }
}
