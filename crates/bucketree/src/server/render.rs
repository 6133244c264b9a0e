use askama::Template;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use time::OffsetDateTime;
use time::macros::format_description;

use crate::domain::entry::Entry;

const SIZE_UNIT: u64 = 1000;
const SIZE_PREFIXES: [char; 6] = ['k', 'M', 'G', 'T', 'P', 'E'];

/// Bytes escaped in emitted path links. `/` stays literal so segment
/// structure survives; `%` is escaped so decoding round-trips losslessly.
const PATH_ESCAPES: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Percent-encodes a decoded request or object path for use in links and
/// `Location` headers.
pub fn encode_path(path: &str) -> String {
    utf8_percent_encode(path, PATH_ESCAPES).to_string()
}

/// Rendered folder listing page.
#[derive(Template)]
#[template(path = "index.html")]
struct ListingTemplate<'a> {
    /// Request path shown in the heading.
    path: &'a str,
    /// Link to the parent listing; `None` at the root.
    parent: Option<String>,
    /// Raw HTML meta payload attached to the folder, possibly empty.
    meta: &'a str,
    rows: Vec<ListingRow>,
}

/// One table row in the listing.
struct ListingRow {
    name: String,
    href: String,
    kind: String,
    size: String,
    modified: String,
}

/// Renders the HTML index page for one resolved folder.
///
/// Consumed meta files are excluded from the table; the folder's meta
/// content, when present, is injected above it as raw HTML.
///
/// # Errors
/// Returns an error when template rendering fails.
pub fn listing_page(folder: &Entry, request_path: &str) -> Result<String, askama::Error> {
    let rows = folder.visible_children().map(listing_row).collect();
    ListingTemplate {
        path: request_path,
        parent: parent_href(request_path).map(|parent| encode_path(&parent)),
        meta: folder.meta_html.as_deref().unwrap_or(""),
        rows,
    }
    .render()
}

fn listing_row(entry: &Entry) -> ListingRow {
    ListingRow {
        name: entry.name.clone(),
        href: format!("/{}", encode_path(&entry.full_path())),
        kind: file_kind(entry).to_string(),
        size: if entry.is_folder() {
            String::new()
        } else {
            human_size(entry.size)
        },
        modified: format_stamp(entry.mtime),
    }
}

/// Link to the parent listing, keeping the trailing separator.
fn parent_href(request_path: &str) -> Option<String> {
    let trimmed = request_path.trim_end_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.rfind('/') {
        Some(index) => Some(trimmed[..=index].to_string()),
        None => Some("/".to_string()),
    }
}

/// Display type: `folder`, or the suffix after the last dot.
fn file_kind(entry: &Entry) -> &str {
    if entry.is_folder() {
        return "folder";
    }
    match entry.name.rsplit_once('.') {
        Some((_, extension)) => extension,
        None => "",
    }
}

/// Human-readable size with 1000-based prefixes.
#[allow(clippy::cast_precision_loss)]
fn human_size(bytes: u64) -> String {
    if bytes < SIZE_UNIT {
        return format!("{bytes} B");
    }
    let mut divisor = SIZE_UNIT;
    let mut prefix = 0;
    let mut remaining = bytes / SIZE_UNIT;
    while remaining >= SIZE_UNIT {
        divisor *= SIZE_UNIT;
        prefix += 1;
        remaining /= SIZE_UNIT;
    }
    format!(
        "{:.1} {}B",
        bytes as f64 / divisor as f64,
        SIZE_PREFIXES[prefix]
    )
}

fn format_stamp(stamp: OffsetDateTime) -> String {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second] UTC");
    stamp.format(&format).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn ts(seconds: i64) -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(seconds).expect("valid timestamp")
    }

    fn file(name: &str, size: u64) -> Entry {
        Entry::file(
            vec!["docs".to_string()],
            name.to_string(),
            size,
            ts(0),
            ts(0),
            ts(0),
        )
    }

    #[test]
    fn test_human_size_below_unit_is_bytes() {
        // Arrange & Act & Assert
        assert_eq!(human_size(0), "0 B");
        assert_eq!(human_size(999), "999 B");
    }

    #[test]
    fn test_human_size_uses_thousand_based_prefixes() {
        // Arrange & Act & Assert
        assert_eq!(human_size(1000), "1.0 kB");
        assert_eq!(human_size(1_500_000), "1.5 MB");
        assert_eq!(human_size(2_000_000_000), "2.0 GB");
    }

    #[test]
    fn test_file_kind_uses_last_extension() {
        // Arrange & Act & Assert
        assert_eq!(file_kind(&file("report.tar.gz", 1)), "gz");
        assert_eq!(file_kind(&file("noext", 1)), "");
        assert_eq!(
            file_kind(&Entry::folder(Vec::new(), "docs".to_string())),
            "folder"
        );
    }

    #[test]
    fn test_parent_href_walks_one_level_up() {
        // Arrange & Act & Assert
        assert_eq!(parent_href("/a/b/"), Some("/a/".to_string()));
        assert_eq!(parent_href("/a/"), Some("/".to_string()));
        assert_eq!(parent_href("/"), None);
    }

    #[test]
    fn test_format_stamp_renders_utc() {
        // Arrange
        let stamp = datetime!(2020-06-15 12:30:45 UTC);

        // Act
        let rendered = format_stamp(stamp);

        // Assert
        assert_eq!(rendered, "2020-06-15 12:30:45 UTC");
    }

    #[test]
    fn test_listing_page_shows_children_and_meta() {
        // Arrange
        let mut folder = Entry::folder(Vec::new(), "docs".to_string());
        folder.children.push(file("guide.pdf", 2048));
        folder
            .children
            .push(Entry::folder(vec!["docs".to_string()], "img".to_string()));
        let mut meta = file("meta.html", 9);
        meta.is_meta_file = true;
        folder.children.push(meta);
        folder.meta_html = Some("<p>welcome</p>".to_string());

        // Act
        let page = listing_page(&folder, "/docs/").expect("failed to render listing");

        // Assert
        assert!(page.contains("Index of /docs/"));
        assert!(page.contains("<p>welcome</p>"));
        assert!(page.contains("guide.pdf"));
        assert!(page.contains("/docs/img/"));
        assert!(page.contains("2.0 kB"));
        // The consumed meta file never shows up as a row.
        assert!(!page.contains(">meta.html<"));
    }

    #[test]
    fn test_listing_hrefs_are_percent_encoded() {
        // Arrange
        let mut folder = Entry::folder(Vec::new(), "my docs".to_string());
        folder.children.push(Entry::file(
            vec!["my docs".to_string()],
            "100% done.txt".to_string(),
            1,
            ts(0),
            ts(0),
            ts(0),
        ));

        // Act
        let page = listing_page(&folder, "/my docs/").expect("failed to render listing");

        // Assert — hrefs round-trip through decoding, display names stay raw
        assert!(page.contains("href=\"/my%20docs/100%25%20done.txt\""));
        assert!(page.contains(">100% done.txt</a>"));
    }

    #[test]
    fn test_encode_path_keeps_separators_and_escapes_percent() {
        // Arrange & Act & Assert
        assert_eq!(encode_path("/a b/c%d/"), "/a%20b/c%25d/");
        assert_eq!(encode_path("/plain/path.txt"), "/plain/path.txt");
    }

    #[test]
    fn test_listing_page_root_has_no_parent_link() {
        // Arrange
        let root = Entry::root();

        // Act
        let page = listing_page(&root, "/").expect("failed to render listing");

        // Assert
        assert!(!page.contains(">..<"));
    }
}
