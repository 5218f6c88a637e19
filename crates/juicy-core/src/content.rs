//! Typed content records and document paths.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::{CoreError, Result},
    frontmatter::{self, FrontmatterFormat},
    schema::{CollectionKind, Schema},
    validate::validate,
};

/// A validated blog post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub title: String,

    /// Publication date, normalized to UTC.
    pub published_at: DateTime<Utc>,

    pub summary: String,

    /// Featured image path or URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Locale tag; present whenever the schema carries locales.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

/// A validated standalone page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

/// A validated record of either collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Record {
    Post(Post),
    Page(Page),
}

impl Record {
    pub fn kind(&self) -> CollectionKind {
        match self {
            Self::Post(_) => CollectionKind::Posts,
            Self::Page(_) => CollectionKind::Pages,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Post(p) => &p.title,
            Self::Page(p) => &p.title,
        }
    }

    pub fn lang(&self) -> Option<&str> {
        match self {
            Self::Post(p) => p.lang.as_deref(),
            Self::Page(p) => p.lang.as_deref(),
        }
    }

    /// Tags of a post; pages have none.
    pub fn tags(&self) -> &[String] {
        match self {
            Self::Post(p) => &p.tags,
            Self::Page(_) => &[],
        }
    }

    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Post(p) => Some(p.published_at),
            Self::Page(_) => None,
        }
    }

    /// Serialize as a YAML front-matter block, delimiters included.
    pub fn to_frontmatter(&self) -> Result<String> {
        let yaml = serde_yaml::to_string(self)?;
        let delimiter = FrontmatterFormat::Yaml.delimiter();
        Ok(format!("{delimiter}\n{yaml}{delimiter}\n"))
    }

    /// Serialize as a complete document: front-matter followed by `body`.
    pub fn to_document(&self, body: &str) -> Result<String> {
        let mut out = self.to_frontmatter()?;
        if !body.is_empty() {
            out.push('\n');
            out.push_str(body);
            if !body.ends_with('\n') {
                out.push('\n');
            }
        }
        Ok(out)
    }
}

/// Recognized document file extensions.
pub const DOCUMENT_EXTENSIONS: [&str; 3] = ["md", "mdx", "markdown"];

/// Whether a file extension denotes a content document.
pub fn is_document_extension(ext: &str) -> bool {
    DOCUMENT_EXTENSIONS
        .iter()
        .any(|e| e.eq_ignore_ascii_case(ext))
}

/// Location of a document inside the content directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentPath {
    /// Path relative to the content directory.
    pub path: PathBuf,

    /// Collection, from the first path component.
    pub collection: CollectionKind,

    /// URL slug within the collection.
    pub slug: String,
}

impl ContentPath {
    /// Parse a path relative to the content directory.
    ///
    /// - `posts/hello.md` → posts, slug "hello"
    /// - `posts/hello/index.mdx` → posts, slug "hello"
    /// - `posts/index.md` → posts, slug "index"
    /// - `pages/about.md` → pages, slug "about"
    /// - `pages/docs/intro.md` → pages, slug "docs/intro"
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?;
        if !is_document_extension(extension) {
            return None;
        }

        let mut components = path.components();
        let collection = components
            .next()?
            .as_os_str()
            .to_str()?
            .parse::<CollectionKind>()
            .ok()?;

        let rest = components.as_path();
        let stem = rest.file_stem()?.to_str()?;
        let parent = rest.parent().unwrap_or(Path::new(""));

        let slug = if parent.as_os_str().is_empty() {
            stem.to_string()
        } else if stem == "index" {
            parent.to_string_lossy().to_string()
        } else {
            format!("{}/{}", parent.display(), stem)
        };

        let slug = slug.replace('\\', "/").trim_matches('/').to_string();
        if slug.is_empty() {
            return None;
        }

        Some(Self {
            path: path.to_path_buf(),
            collection,
            slug,
        })
    }

    /// Site-relative URL path for this document.
    pub fn url_path(&self) -> String {
        format!("/{}/{}", self.collection.name(), self.slug)
    }
}

/// A validated document: location, record and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub path: ContentPath,
    pub record: Record,
    pub body: String,
}

impl Document {
    /// Parse and validate document text found at `path`.
    pub fn parse(schema: &Schema, path: ContentPath, text: &str) -> Result<Self> {
        let (raw, body) = frontmatter::parse_document(text, &path.path)?;
        let record = validate(schema, path.collection, &raw)
            .map_err(|violations| CoreError::invalid(&path.path, violations))?;

        Ok(Self {
            path,
            record,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn sample_post() -> Post {
        Post {
            title: "Hello".into(),
            published_at: Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap(),
            summary: "s".into(),
            image: None,
            tags: vec!["rust".into()],
            lang: Some("en".into()),
        }
    }

    #[test]
    fn test_content_path_simple() {
        let cp = ContentPath::from_path(Path::new("posts/hello.md")).expect("parse path");

        assert_eq!(cp.collection, CollectionKind::Posts);
        assert_eq!(cp.slug, "hello");
        assert_eq!(cp.url_path(), "/posts/hello");
    }

    #[test]
    fn test_content_path_index_file() {
        let cp = ContentPath::from_path(Path::new("posts/hello/index.mdx")).expect("parse path");

        assert_eq!(cp.collection, CollectionKind::Posts);
        assert_eq!(cp.slug, "hello");
    }

    #[test]
    fn test_content_path_nested_page() {
        let cp = ContentPath::from_path(Path::new("pages/docs/intro.md")).expect("parse path");

        assert_eq!(cp.collection, CollectionKind::Pages);
        assert_eq!(cp.slug, "docs/intro");
        assert_eq!(cp.url_path(), "/pages/docs/intro");
    }

    #[test]
    fn test_content_path_rejects_unknown() {
        assert!(ContentPath::from_path(Path::new("drafts/hello.md")).is_none());
        assert!(ContentPath::from_path(Path::new("posts/hello.txt")).is_none());
    }

    #[test]
    fn test_content_path_top_level_index() {
        let cp = ContentPath::from_path(Path::new("posts/index.md")).expect("parse path");

        assert_eq!(cp.collection, CollectionKind::Posts);
        assert_eq!(cp.slug, "index");
        assert_eq!(cp.url_path(), "/posts/index");
    }

    #[test]
    fn test_to_frontmatter_uses_wire_names() {
        let fm = Record::Post(sample_post()).to_frontmatter().expect("yaml");

        assert!(fm.starts_with("---\n"));
        assert!(fm.ends_with("---\n"));
        assert!(fm.contains("publishedAt:"));
        assert!(fm.contains("2024-01-05T00:00:00Z"));
        assert!(!fm.contains("image"));
        assert!(fm.contains("lang: en"));
    }

    #[test]
    fn test_round_trip_is_identity() {
        let schema = Schema::default();
        let post = Record::Post(sample_post());
        let text = post.to_document("Body text.").expect("serialize");

        let path = ContentPath::from_path(Path::new("posts/hello.md")).expect("path");
        let doc = Document::parse(&schema, path, &text).expect("valid");

        assert_eq!(doc.record, post);
        assert_eq!(doc.body, "Body text.\n");
    }

    #[test]
    fn test_document_parse_reports_violations() {
        let schema = Schema::default();
        let path = ContentPath::from_path(Path::new("posts/bad.md")).expect("path");

        let err = Document::parse(&schema, path, "---\ntitle: Bad\n---\n").unwrap_err();
        match err {
            CoreError::Invalid { violations, .. } => {
                assert_eq!(violations.len(), 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
