//! Content schema table for the `posts` and `pages` collections.
//!
//! The table is the single description of every field: the validator walks
//! it to type documents and the CMS module walks it to derive the editing
//! schema. It is built once from [`Config`] and shared read-only.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    config::Config,
    error::{CoreError, Result},
};

/// Field names shared by the validator, the records and the CMS schema.
pub mod fields {
    pub const TITLE: &str = "title";
    pub const PUBLISHED_AT: &str = "publishedAt";
    pub const SUMMARY: &str = "summary";
    pub const IMAGE: &str = "image";
    pub const TAGS: &str = "tags";
    pub const LANG: &str = "lang";
    pub const CONTENT: &str = "content";
}

/// The two recognized content kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    /// Dated blog posts.
    Posts,
    /// Standalone pages.
    Pages,
}

impl CollectionKind {
    /// Every collection, in display order.
    pub const ALL: [Self; 2] = [Self::Posts, Self::Pages];

    /// Collection name, also its directory under the content root.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Posts => "posts",
            Self::Pages => "pages",
        }
    }

    /// Label shown in the editor.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Posts => "Blog Posts",
            Self::Pages => "Pages",
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CollectionKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "posts" | "post" => Ok(Self::Posts),
            "pages" | "page" => Ok(Self::Pages),
            other => Err(CoreError::schema(format!("unknown collection: {other}"))),
        }
    }
}

/// Semantic type of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Non-empty text the editor also uses to derive the file slug.
    Slug,
    /// Non-empty text.
    Text,
    /// Date coerced to UTC.
    Date,
    /// Image reference stored as text.
    Image {
        directory: String,
        public_path: String,
    },
    /// Ordered list of text values.
    Tags,
    /// Member of the configured locale set.
    Locale,
}

/// Whether a field must be present, and what happens when it is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Absence is a violation.
    Required,
    /// Absence means "no value".
    Optional,
    /// Absence takes the field's default (`[]` for tags, the default locale).
    Defaulted,
}

/// One declared field of a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub presence: Presence,
}

impl FieldDef {
    fn new(name: &'static str, label: &'static str, kind: FieldKind, presence: Presence) -> Self {
        Self {
            name,
            label,
            kind,
            presence,
        }
    }

    /// Whether absence is reported as missing.
    pub fn is_required(&self) -> bool {
        self.presence == Presence::Required
    }
}

/// Body field of a collection, edited as MDX.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentField {
    pub label: &'static str,
    pub image_directory: String,
    pub image_public_path: String,
}

/// Schema of one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionSchema {
    pub kind: CollectionKind,
    /// Glob of document files relative to the project root.
    pub path: String,
    pub fields: Vec<FieldDef>,
    pub content: ContentField,
}

impl CollectionSchema {
    /// Look up a declared field.
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Closed set of locale tags with a designated default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocaleSet {
    allowed: Vec<String>,
    default: String,
}

impl LocaleSet {
    /// Create a locale set. The set must be non-empty, free of duplicates,
    /// and contain the default.
    pub fn new(allowed: Vec<String>, default: impl Into<String>) -> Result<Self> {
        let default = default.into();

        if allowed.is_empty() {
            return Err(CoreError::schema("locale set cannot be empty"));
        }

        for (i, locale) in allowed.iter().enumerate() {
            if locale.trim().is_empty() {
                return Err(CoreError::schema("locale tags cannot be empty"));
            }
            if allowed[..i].contains(locale) {
                return Err(CoreError::schema(format!("duplicate locale: {locale}")));
            }
        }

        if !allowed.contains(&default) {
            return Err(CoreError::schema(format!(
                "default locale {default:?} is not one of {allowed:?}"
            )));
        }

        Ok(Self { allowed, default })
    }

    pub fn allowed(&self) -> &[String] {
        &self.allowed
    }

    pub fn default_locale(&self) -> &str {
        &self.default
    }

    pub fn contains(&self, locale: &str) -> bool {
        self.allowed.iter().any(|l| l == locale)
    }
}

impl Default for LocaleSet {
    fn default() -> Self {
        Self {
            allowed: vec!["zh-cn".to_string(), "en".to_string()],
            default: "zh-cn".to_string(),
        }
    }
}

/// Where uploaded images live, per collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageStore {
    /// Directory under the project root, e.g. `public/images`.
    pub directory: String,
    /// URL prefix, e.g. `/images`.
    pub public_path: String,
    /// Content root, e.g. `src/content`.
    pub content_dir: String,
}

impl Default for ImageStore {
    fn default() -> Self {
        Self {
            directory: "public/images".to_string(),
            public_path: "/images".to_string(),
            content_dir: "src/content".to_string(),
        }
    }
}

impl ImageStore {
    fn directory_for(&self, kind: CollectionKind) -> String {
        format!("{}/{}", self.directory.trim_end_matches('/'), kind.name())
    }

    fn public_path_for(&self, kind: CollectionKind) -> String {
        format!("{}/{}/", self.public_path.trim_end_matches('/'), kind.name())
    }

    fn documents_for(&self, kind: CollectionKind) -> String {
        format!("{}/{}/*", self.content_dir.trim_end_matches('/'), kind.name())
    }
}

/// The process-wide content schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    posts: CollectionSchema,
    pages: CollectionSchema,
    locales: Option<LocaleSet>,
}

impl Default for Schema {
    fn default() -> Self {
        Self::new(Some(LocaleSet::default()), &ImageStore::default())
    }
}

impl Schema {
    /// Build the schema. `None` leaves the `lang` field out entirely.
    pub fn new(locales: Option<LocaleSet>, images: &ImageStore) -> Self {
        let with_locale = locales.is_some();

        let mut posts = vec![
            FieldDef::new(fields::TITLE, "Title", FieldKind::Slug, Presence::Required),
            FieldDef::new(
                fields::PUBLISHED_AT,
                "Published Date",
                FieldKind::Date,
                Presence::Required,
            ),
            FieldDef::new(fields::SUMMARY, "Summary", FieldKind::Text, Presence::Required),
            FieldDef::new(
                fields::IMAGE,
                "Featured Image",
                FieldKind::Image {
                    directory: images.directory_for(CollectionKind::Posts),
                    public_path: images.public_path_for(CollectionKind::Posts),
                },
                Presence::Optional,
            ),
            FieldDef::new(fields::TAGS, "Tags", FieldKind::Tags, Presence::Defaulted),
        ];
        let mut pages = vec![FieldDef::new(
            fields::TITLE,
            "Title",
            FieldKind::Slug,
            Presence::Required,
        )];

        if with_locale {
            let lang = FieldDef::new(
                fields::LANG,
                "Language",
                FieldKind::Locale,
                Presence::Defaulted,
            );
            posts.push(lang.clone());
            pages.push(lang);
        }

        let collection = |kind: CollectionKind, fields: Vec<FieldDef>| CollectionSchema {
            kind,
            path: images.documents_for(kind),
            fields,
            content: ContentField {
                label: "Content",
                image_directory: images.directory_for(kind),
                image_public_path: images.public_path_for(kind),
            },
        };

        Self {
            posts: collection(CollectionKind::Posts, posts),
            pages: collection(CollectionKind::Pages, pages),
            locales,
        }
    }

    /// Build the schema described by the site configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let locales = if config.schema.locale {
            Some(config.locale_set()?)
        } else {
            None
        };

        let images = ImageStore {
            directory: config.cms.image_dir.clone(),
            public_path: config.cms.image_public_path.clone(),
            content_dir: config.content.dir.clone(),
        };

        Ok(Self::new(locales, &images))
    }

    pub fn collection(&self, kind: CollectionKind) -> &CollectionSchema {
        match kind {
            CollectionKind::Posts => &self.posts,
            CollectionKind::Pages => &self.pages,
        }
    }

    pub fn collections(&self) -> impl Iterator<Item = &CollectionSchema> {
        [&self.posts, &self.pages].into_iter()
    }

    /// The locale set, when the locale option is enabled.
    pub fn locales(&self) -> Option<&LocaleSet> {
        self.locales.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(schema: &CollectionSchema) -> Vec<&'static str> {
        schema.fields.iter().map(|f| f.name).collect()
    }

    #[test]
    fn test_default_schema_fields() {
        let schema = Schema::default();

        assert_eq!(
            names(schema.collection(CollectionKind::Posts)),
            vec!["title", "publishedAt", "summary", "image", "tags", "lang"]
        );
        assert_eq!(
            names(schema.collection(CollectionKind::Pages)),
            vec!["title", "lang"]
        );
    }

    #[test]
    fn test_schema_without_locale() {
        let schema = Schema::new(None, &ImageStore::default());

        assert!(schema.locales().is_none());
        assert!(
            schema
                .collection(CollectionKind::Posts)
                .field(fields::LANG)
                .is_none()
        );
        assert_eq!(names(schema.collection(CollectionKind::Pages)), vec!["title"]);
    }

    #[test]
    fn test_image_paths_per_collection() {
        let schema = Schema::default();
        let posts = schema.collection(CollectionKind::Posts);

        let image = posts.field(fields::IMAGE).expect("image field");
        assert_eq!(
            image.kind,
            FieldKind::Image {
                directory: "public/images/posts".to_string(),
                public_path: "/images/posts/".to_string(),
            }
        );
        assert_eq!(posts.path, "src/content/posts/*");
        assert_eq!(
            schema.collection(CollectionKind::Pages).content.image_directory,
            "public/images/pages"
        );
    }

    #[test]
    fn test_from_config_respects_locale_option() {
        let mut config = Config::default();
        config.schema.locale = false;
        let schema = Schema::from_config(&config).expect("schema");
        assert!(schema.locales().is_none());

        config.schema.locale = true;
        let schema = Schema::from_config(&config).expect("schema");
        assert_eq!(
            schema.locales().map(LocaleSet::default_locale),
            Some("zh-cn")
        );
    }

    #[test]
    fn test_locale_set_rejects_bad_input() {
        assert!(LocaleSet::new(vec![], "en").is_err());
        assert!(LocaleSet::new(vec!["en".into(), "en".into()], "en").is_err());
        assert!(LocaleSet::new(vec!["en".into()], "fr").is_err());
        assert!(LocaleSet::new(vec!["en".into(), " ".into()], "en").is_err());

        let set = LocaleSet::new(vec!["en".into(), "de".into()], "de").expect("valid");
        assert!(set.contains("en"));
        assert!(!set.contains("fr"));
        assert_eq!(set.default_locale(), "de");
    }

    #[test]
    fn test_collection_kind_parse() {
        assert_eq!("posts".parse::<CollectionKind>().ok(), Some(CollectionKind::Posts));
        assert_eq!("Page".parse::<CollectionKind>().ok(), Some(CollectionKind::Pages));
        assert!("drafts".parse::<CollectionKind>().is_err());
    }
}
