//! Content collection and build-time validation.
//!
//! Walks each collection directory, validates every document in parallel and
//! gathers the results. A failed document is never dropped silently: it is
//! kept in [`SiteContent::failures`] and [`SiteContent::ensure_valid`] turns
//! any failure into a fatal error.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use juicy_core::{CollectionKind, ContentPath, CoreError, Document, Schema, Violation};
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

/// Content collection errors.
#[derive(Debug, Error)]
pub enum CollectorError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Directory traversal error.
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// One or more documents failed validation.
    #[error("{count} document(s) failed validation")]
    InvalidContent { count: usize },
}

/// Result type for collector operations.
pub type Result<T> = std::result::Result<T, CollectorError>;

/// Why a document was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum FailureKind {
    /// The path does not name a collection document.
    InvalidPath,
    /// The file could not be read.
    Read { message: String },
    /// The front-matter block is malformed.
    Frontmatter { message: String },
    /// The front-matter does not satisfy the collection schema.
    Invalid { violations: Vec<Violation> },
}

/// A rejected document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentFailure {
    pub path: PathBuf,
    #[serde(flatten)]
    pub kind: FailureKind,
}

impl DocumentFailure {
    fn new(path: &Path, kind: FailureKind) -> Self {
        Self {
            path: path.to_path_buf(),
            kind,
        }
    }

    /// One line per problem, for terminal output.
    pub fn messages(&self) -> Vec<String> {
        let path = self.path.display();
        match &self.kind {
            FailureKind::InvalidPath => vec![format!("{path}: not a collection document")],
            FailureKind::Read { message } => vec![format!("{path}: failed to read: {message}")],
            FailureKind::Frontmatter { message } => {
                vec![format!("{path}: bad front-matter: {message}")]
            }
            FailureKind::Invalid { violations } => violations
                .iter()
                .map(|v| format!("{path}: {v}"))
                .collect(),
        }
    }
}

/// Collected and validated site content.
#[derive(Debug, Default)]
pub struct SiteContent {
    /// Valid posts, newest first.
    pub posts: Vec<Document>,

    /// Valid pages, by slug.
    pub pages: Vec<Document>,

    /// Rejected documents, by path.
    pub failures: Vec<DocumentFailure>,

    /// Tag -> post slugs.
    pub tags: BTreeMap<String, Vec<String>>,
}

impl SiteContent {
    /// Fail if any document was rejected.
    pub fn ensure_valid(&self) -> Result<()> {
        if self.failures.is_empty() {
            Ok(())
        } else {
            Err(CollectorError::InvalidContent {
                count: self.failures.len(),
            })
        }
    }

    /// Number of documents seen, valid or not.
    pub fn total(&self) -> usize {
        self.posts.len() + self.pages.len() + self.failures.len()
    }

    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.posts.iter().chain(self.pages.iter())
    }

    pub fn collection(&self, kind: CollectionKind) -> &[Document] {
        match kind {
            CollectionKind::Posts => &self.posts,
            CollectionKind::Pages => &self.pages,
        }
    }

    /// Documents declaring the given locale.
    pub fn by_locale<'a>(&'a self, lang: &'a str) -> impl Iterator<Item = &'a Document> {
        self.documents()
            .filter(move |doc| doc.record.lang() == Some(lang))
    }

    /// Posts carrying a tag, newest first.
    pub fn tagged(&self, tag: &str) -> Vec<&Document> {
        self.posts
            .iter()
            .filter(|doc| doc.record.tags().iter().any(|t| t == tag))
            .collect()
    }
}

/// Content collector that walks collection directories and validates files.
#[derive(Debug)]
pub struct ContentCollector {
    schema: Schema,
    content_dir: PathBuf,
}

impl ContentCollector {
    /// Create a new content collector.
    #[must_use]
    pub fn new(schema: Schema, content_dir: impl Into<PathBuf>) -> Self {
        Self {
            schema,
            content_dir: content_dir.into(),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn content_dir(&self) -> &Path {
        &self.content_dir
    }

    /// Collect and validate all content.
    pub fn collect(&self) -> Result<SiteContent> {
        info!(dir = %self.content_dir.display(), "collecting content");

        let files = self.find_content_files()?;
        info!(count = files.len(), "found content files");

        let results: Vec<_> = files.par_iter().map(|path| self.load(path)).collect();

        let mut content = SiteContent::default();

        for result in results {
            match result {
                Ok(doc) => match doc.path.collection {
                    CollectionKind::Posts => content.posts.push(doc),
                    CollectionKind::Pages => content.pages.push(doc),
                },
                Err(failure) => {
                    for message in failure.messages() {
                        warn!("{message}");
                    }
                    content.failures.push(failure);
                }
            }
        }

        sort_by_date(&mut content.posts);
        content.pages.sort_by(|a, b| a.path.slug.cmp(&b.path.slug));
        content.failures.sort_by(|a, b| a.path.cmp(&b.path));

        for doc in &content.posts {
            for tag in doc.record.tags() {
                let slugs = content.tags.entry(tag.clone()).or_default();
                if !slugs.contains(&doc.path.slug) {
                    slugs.push(doc.path.slug.clone());
                }
            }
        }

        info!(
            posts = content.posts.len(),
            pages = content.pages.len(),
            failures = content.failures.len(),
            tags = content.tags.len(),
            "content collection complete"
        );

        Ok(content)
    }

    /// Find all document files of every collection.
    fn find_content_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for kind in CollectionKind::ALL {
            let dir = self.content_dir.join(kind.name());
            if !dir.is_dir() {
                debug!(dir = %dir.display(), "collection directory missing");
                continue;
            }

            for entry in WalkDir::new(&dir)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
            {
                let entry = entry?;
                if entry.file_type().is_file() && is_document(entry.path()) {
                    files.push(entry.into_path());
                }
            }
        }

        Ok(files)
    }

    /// Read, parse and validate a single document.
    fn load(&self, path: &Path) -> std::result::Result<Document, DocumentFailure> {
        debug!(path = %path.display(), "validating file");

        let relative = path.strip_prefix(&self.content_dir).unwrap_or(path);
        let content_path = ContentPath::from_path(relative)
            .ok_or_else(|| DocumentFailure::new(path, FailureKind::InvalidPath))?;

        let text = fs::read_to_string(path).map_err(|e| {
            DocumentFailure::new(
                path,
                FailureKind::Read {
                    message: e.to_string(),
                },
            )
        })?;

        Document::parse(&self.schema, content_path, &text).map_err(|e| {
            let kind = match e {
                CoreError::Invalid { violations, .. } => FailureKind::Invalid { violations },
                CoreError::Frontmatter { message, .. } => FailureKind::Frontmatter { message },
                other => FailureKind::Read {
                    message: other.to_string(),
                },
            };
            DocumentFailure::new(path, kind)
        })
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn is_document(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(juicy_core::content::is_document_extension)
}

/// Sort documents newest first; undated ones last, by title.
fn sort_by_date(docs: &mut [Document]) {
    docs.sort_by(|a, b| {
        match (b.record.published_at(), a.record.published_at()) {
            (Some(b_date), Some(a_date)) => b_date.cmp(&a_date),
            (Some(_), None) => std::cmp::Ordering::Greater,
            (None, Some(_)) => std::cmp::Ordering::Less,
            (None, None) => a.record.title().cmp(b.record.title()),
        }
        .then_with(|| a.path.slug.cmp(&b.path.slug))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, rel: &str, text: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(path, text).expect("write");
    }

    fn post(title: &str, date: &str, extra: &str) -> String {
        format!("---\ntitle: {title}\npublishedAt: {date}\nsummary: s\n{extra}---\nBody\n")
    }

    #[test]
    fn test_collect_sorts_and_indexes() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "posts/old.md", &post("Old", "2023-06-01", "tags: [rust]\n"));
        write(
            dir.path(),
            "posts/new/index.mdx",
            &post("New", "2024-02-01", "tags: [rust, ai, rust]\nlang: en\n"),
        );
        write(dir.path(), "pages/about.md", "---\ntitle: About\n---\n");

        let collector = ContentCollector::new(Schema::default(), dir.path());
        let content = collector.collect().expect("collect");

        assert!(content.ensure_valid().is_ok());
        let slugs: Vec<&str> = content.posts.iter().map(|d| d.path.slug.as_str()).collect();
        assert_eq!(slugs, vec!["new", "old"]);
        assert_eq!(content.pages.len(), 1);
        assert_eq!(content.tags["rust"], vec!["new", "old"]);
        assert_eq!(content.tags["ai"], vec!["new"]);
        assert_eq!(content.by_locale("en").count(), 1);
        assert_eq!(content.by_locale("zh-cn").count(), 2);
        assert_eq!(content.tagged("ai").len(), 1);
    }

    #[test]
    fn test_collect_keeps_failures() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "posts/good.md", &post("Good", "2024-01-05", ""));
        write(dir.path(), "posts/missing.md", "---\ntitle: Hello\nsummary: s\n---\n");
        write(dir.path(), "posts/broken.md", "---\ntitle: [oops\n---\n");

        let content = ContentCollector::new(Schema::default(), dir.path())
            .collect()
            .expect("collect");

        assert_eq!(content.posts.len(), 1);
        assert_eq!(content.failures.len(), 2);
        assert_eq!(content.total(), 3);

        let missing = content
            .failures
            .iter()
            .find(|f| f.path.ends_with("missing.md"))
            .expect("missing.md failure");
        assert_eq!(
            missing.kind,
            FailureKind::Invalid {
                violations: vec![Violation::missing("publishedAt")]
            }
        );

        let broken = content
            .failures
            .iter()
            .find(|f| f.path.ends_with("broken.md"))
            .expect("broken.md failure");
        assert!(matches!(broken.kind, FailureKind::Frontmatter { .. }));

        assert!(matches!(
            content.ensure_valid(),
            Err(CollectorError::InvalidContent { count: 2 })
        ));
    }

    #[test]
    fn test_collect_accepts_top_level_index() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "posts/index.mdx", &post("Index", "2024-01-05", ""));
        write(dir.path(), "pages/index.md", "---\ntitle: Home\n---\n");

        let content = ContentCollector::new(Schema::default(), dir.path())
            .collect()
            .expect("collect");

        assert!(content.failures.is_empty(), "{:?}", content.failures);
        assert_eq!(content.posts.len(), 1);
        assert_eq!(content.posts[0].path.slug, "index");
        assert_eq!(content.pages[0].path.slug, "index");
        assert!(content.ensure_valid().is_ok());
    }

    #[test]
    fn test_hidden_and_foreign_files_are_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "posts/.drafts/wip.md", "not even front-matter");
        write(dir.path(), "posts/notes.txt", "ignored");
        write(dir.path(), "assets/logo.md", "ignored");

        let content = ContentCollector::new(Schema::default(), dir.path())
            .collect()
            .expect("collect");

        assert_eq!(content.total(), 0);
    }

    #[test]
    fn test_missing_content_dir_is_empty() {
        let content = ContentCollector::new(Schema::default(), "/nonexistent/content")
            .collect()
            .expect("collect");
        assert_eq!(content.total(), 0);
    }

    #[test]
    fn test_failure_messages() {
        let failure = DocumentFailure::new(
            Path::new("posts/a.md"),
            FailureKind::Invalid {
                violations: vec![Violation::missing("title"), Violation::missing("summary")],
            },
        );

        assert_eq!(
            failure.messages(),
            vec!["posts/a.md: title: missing", "posts/a.md: summary: missing"]
        );
    }
}
