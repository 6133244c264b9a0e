use time::OffsetDateTime;

/// Distinguishes file leaves from folder nodes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EntryKind {
    File,
    Folder,
}

/// One node in the directory tree derived from bucket object keys.
///
/// The tree is strictly owned: every non-root entry belongs to exactly one
/// parent folder's `children` and is never shared. A whole tree is built
/// fresh on each refresh cycle and not mutated after publication.
#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    pub kind: EntryKind,
    /// Path segments of the parent directory; empty for root-level entries.
    pub path: Vec<String>,
    /// Own segment name; empty only for the root folder.
    pub name: String,
    /// Object size in bytes; folders stay at zero.
    pub size: u64,
    pub atime: OffsetDateTime,
    pub ctime: OffsetDateTime,
    pub mtime: OffsetDateTime,
    /// Owned child entries; always empty for files.
    pub children: Vec<Entry>,
    /// Rendered HTML payload attached from a co-located meta object.
    pub meta_html: Option<String>,
    /// Marks a file consumed as the source of its parent's meta content,
    /// which must be excluded from rendered listings.
    pub is_meta_file: bool,
}

impl Entry {
    /// Creates the tree root: an empty-named folder with an empty path.
    pub fn root() -> Self {
        Self::folder(Vec::new(), String::new())
    }

    /// Creates a folder node. Timestamps start at the epoch sentinel and are
    /// filled in by aggregation once the subtree is complete.
    pub fn folder(path: Vec<String>, name: String) -> Self {
        Self {
            kind: EntryKind::Folder,
            path,
            name,
            size: 0,
            atime: OffsetDateTime::UNIX_EPOCH,
            ctime: OffsetDateTime::UNIX_EPOCH,
            mtime: OffsetDateTime::UNIX_EPOCH,
            children: Vec::new(),
            meta_html: None,
            is_meta_file: false,
        }
    }

    /// Creates a file leaf with already-resolved timestamps.
    pub fn file(
        path: Vec<String>,
        name: String,
        size: u64,
        atime: OffsetDateTime,
        ctime: OffsetDateTime,
        mtime: OffsetDateTime,
    ) -> Self {
        Self {
            kind: EntryKind::File,
            path,
            name,
            size,
            atime,
            ctime,
            mtime,
            children: Vec::new(),
            meta_html: None,
            is_meta_file: false,
        }
    }

    pub fn is_folder(&self) -> bool {
        self.kind == EntryKind::Folder
    }

    /// Canonical key form of this entry: path segments and name joined with
    /// `/`, with a trailing `/` appended for folders. This doubles as the
    /// storage key for files and the link target for listings.
    pub fn full_path(&self) -> String {
        let mut full = if self.path.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.path.join("/"), self.name)
        };
        if self.is_folder() {
            full.push('/');
        }
        full
    }

    /// Looks up a direct child by segment name.
    pub fn child(&self, name: &str) -> Option<&Entry> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Direct children eligible for display, skipping consumed meta files.
    pub fn visible_children(&self) -> impl Iterator<Item = &Entry> {
        self.children.iter().filter(|child| !child.is_meta_file)
    }
}
