//! Juicy Core Library
//!
//! Site configuration, the content schema for the `posts` and `pages`
//! collections, front-matter parsing, document validation, and the CMS
//! editing schema derived from the same field table.
//!
//! ```
//! use juicy_core::{CollectionKind, RawDocument, Schema, validate};
//!
//! let schema = Schema::default();
//! let raw: RawDocument = serde_yaml::from_str("title: About").unwrap();
//! let page = validate(&schema, CollectionKind::Pages, &raw).unwrap();
//! assert_eq!(page.lang(), Some("zh-cn"));
//! ```

pub mod cms;
pub mod config;
pub mod content;
pub mod error;
pub mod frontmatter;
pub mod schema;
pub mod validate;

pub use cms::CmsConfig;
pub use config::{BuildEnv, Config};
pub use content::{ContentPath, Document, Page, Post, Record};
pub use error::{CoreError, Result};
pub use schema::{CollectionKind, LocaleSet, Schema};
pub use validate::{RawDocument, RawValue, Violation, validate};
