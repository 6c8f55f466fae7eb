use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{ResolveError, Result};

/// One document waiting to be analyzed.
#[derive(Debug)]
pub struct PendingDocument {
    pub id: String,
    source: Source,
}

#[derive(Debug)]
enum Source {
    /// A whole `.json` file holding one annotation
    File(PathBuf),
    /// The annotation column of a TSV row
    Inline(String),
    /// A TSV row that could not be split; fails when loaded
    Malformed(String),
    /// Id already used by an earlier document; fails when loaded
    Duplicate,
}

impl PendingDocument {
    /// The raw annotation JSON.
    pub fn load(&self) -> Result<String> {
        match &self.source {
            Source::File(path) => Ok(fs::read_to_string(path)?),
            Source::Inline(json) => Ok(json.clone()),
            Source::Malformed(reason) => Err(ResolveError::MalformedRecord(reason.clone())),
            Source::Duplicate => Err(ResolveError::DuplicateDocumentId(self.id.clone())),
        }
    }
}

/// Discover the documents under `path`.
///
/// Accepted layouts:
///   - a directory: every `*.json` file below it, sorted by path, id = the
///     path relative to the directory without extension ("2019/article")
///   - a `.tsv` file: one document per line, `id<TAB>article<TAB>annotation`
///   - any other file: a single annotation document
///
/// Ids are unique within one scan: a later document repeating an id fails
/// when loaded instead of overwriting the earlier one's report.
pub fn scan_documents(path: &Path) -> Result<Vec<PendingDocument>> {
    let docs = if path.is_dir() {
        scan_directory(path)
    } else if path.extension().and_then(|e| e.to_str()) == Some("tsv") {
        parse_tsv(&fs::read_to_string(path)?)
    } else {
        vec![PendingDocument {
            id: file_id(path),
            source: Source::File(path.to_path_buf()),
        }]
    };
    Ok(mark_duplicates(docs))
}

fn mark_duplicates(mut docs: Vec<PendingDocument>) -> Vec<PendingDocument> {
    let mut seen = HashSet::new();
    for doc in &mut docs {
        if !seen.insert(doc.id.clone()) {
            doc.source = Source::Duplicate;
        }
    }
    docs
}

fn scan_directory(root: &Path) -> Vec<PendingDocument> {
    WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some("json"))
        .map(|e| PendingDocument {
            id: relative_id(root, e.path()),
            source: Source::File(e.path().to_path_buf()),
        })
        .collect()
}

/// Rows are `id<TAB>article json<TAB>annotation json`; blank lines are skipped.
fn parse_tsv(content: &str) -> Vec<PendingDocument> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            let cols: Vec<&str> = line.splitn(3, '\t').collect();
            match cols.as_slice() {
                [id, _article, annotation] if is_plain_id(id.trim()) => PendingDocument {
                    id: id.trim().to_string(),
                    source: Source::Inline(annotation.to_string()),
                },
                [id, _, _] => PendingDocument {
                    id: format!("line-{}", i + 1),
                    source: Source::Malformed(format!("line {}: unusable id {:?}", i + 1, id.trim())),
                },
                _ => PendingDocument {
                    id: format!("line-{}", i + 1),
                    source: Source::Malformed(format!(
                        "line {} has {} tab-separated columns, expected 3",
                        i + 1,
                        cols.len()
                    )),
                },
            }
        })
        .collect()
}

/// Ids become output file names, so they must not climb out of the output
/// directory.
fn is_plain_id(id: &str) -> bool {
    !id.is_empty() && id != "." && id != ".." && !id.contains(['/', '\\'])
}

/// "root/2019/article.json" → "2019/article"
fn relative_id(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path).with_extension("");
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        file_id(path)
    } else {
        parts.join("/")
    }
}

fn file_id(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document")
        .to_string()
}
