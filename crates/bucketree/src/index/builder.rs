use std::cmp::Ordering;

use crate::domain::entry::Entry;

/// Orders file entries by parent path segments, then by name.
///
/// Under this order every folder's descendants form one contiguous run,
/// which is exactly what [`build_tree`] requires.
pub fn key_order(a: &Entry, b: &Entry) -> Ordering {
    a.path.cmp(&b.path).then_with(|| a.name.cmp(&b.name))
}

/// Assembles one folder tree from a sequence of file entries.
///
/// Precondition: `files` is sorted by [`key_order`]. The indexing stage
/// sorts before calling because the lister's order is not trusted; passing
/// unsorted input scatters subtrees across duplicate folders.
///
/// The algorithm keeps a stack of open folders mirrored by a stack of their
/// names. For each file it pops down to the longest common prefix with the
/// file's path, creates the missing folder levels, and appends the file at
/// full depth. A folder is attached to its parent the moment its subtree
/// closes, so ownership stays a strict tree with no back edges.
///
/// A key that also prefixes deeper keys (object `a` alongside `a/x.txt`)
/// yields a file and a folder with the same name under one parent. Lookups
/// through [`Entry::child`] scan in order, so the file wins: it sorts
/// before the subtree that opens the folder.
pub fn build_tree(files: Vec<Entry>) -> Entry {
    let mut stack: Vec<Entry> = vec![Entry::root()];
    let mut open: Vec<String> = Vec::new();

    for file in files {
        let common = common_prefix_len(&open, &file.path);

        // Close folders until only the shared prefix remains open.
        while open.len() > common {
            close_top(&mut stack, &mut open);
        }

        // Create the missing levels of the file's path.
        while open.len() < file.path.len() {
            let name = file.path[open.len()].clone();
            let folder = Entry::folder(file.path[..open.len()].to_vec(), name.clone());
            stack.push(folder);
            open.push(name);
        }

        if let Some(top) = stack.last_mut() {
            top.children.push(file);
        }
    }

    // Close whatever is still open down to the root.
    while !open.is_empty() {
        close_top(&mut stack, &mut open);
    }

    stack.pop().unwrap_or_else(Entry::root)
}

/// Longest shared leading run of path segments.
fn common_prefix_len(a: &[String], b: &[String]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

/// Pops the top open folder and hands it to its parent.
fn close_top(stack: &mut Vec<Entry>, open: &mut Vec<String>) {
    open.pop();
    if let Some(folder) = stack.pop() {
        if let Some(parent) = stack.last_mut() {
            parent.children.push(folder);
        }
    }
}
