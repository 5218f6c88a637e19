//! CMS editing schema, derived from the content schema.
//!
//! The editor is handed a JSON description of every collection. It is never
//! written by hand: [`CmsConfig::derive`] walks the same [`Schema`] the
//! validator uses, and [`verify`] reports drift in a committed copy.

use std::{fmt, path::Path};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    config::CmsSettings,
    error::Result,
    schema::{CollectionSchema, FieldDef, FieldKind, Presence, Schema, fields},
};

/// Top-level editing schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CmsConfig {
    pub storage: CmsStorage,
    pub collections: Vec<CmsCollection>,
}

/// Where the editor commits content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CmsStorage {
    pub kind: String,
    pub repo: String,
}

/// One editable collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CmsCollection {
    pub name: String,
    pub label: String,
    /// Field the editor derives file names from.
    pub slug_field: String,
    pub path: String,
    pub format: CmsFormat,
    pub fields: Vec<CmsField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CmsFormat {
    pub content_field: String,
}

/// One editor field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CmsField {
    pub name: String,
    pub label: String,
    #[serde(flatten)]
    pub widget: Widget,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
}

/// Editor widget for a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Widget {
    Slug,
    Text,
    Date,
    #[serde(rename_all = "camelCase")]
    Image {
        directory: String,
        public_path: String,
    },
    Array {
        item: String,
    },
    Select {
        options: Vec<String>,
    },
    #[serde(rename_all = "camelCase")]
    Mdx {
        image_directory: String,
        image_public_path: String,
    },
}

impl Widget {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Slug => "slug",
            Self::Text => "text",
            Self::Date => "date",
            Self::Image { .. } => "image",
            Self::Array { .. } => "array",
            Self::Select { .. } => "select",
            Self::Mdx { .. } => "mdx",
        }
    }
}

impl CmsConfig {
    /// Derive the editing schema from the content schema.
    pub fn derive(schema: &Schema, settings: &CmsSettings) -> Self {
        Self {
            storage: CmsStorage {
                kind: settings.storage.clone(),
                repo: settings.repo.clone(),
            },
            collections: schema
                .collections()
                .map(|c| derive_collection(schema, c))
                .collect(),
        }
    }

    /// Load a committed editing schema.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Pretty-printed JSON, newline-terminated.
    pub fn to_json(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    pub fn collection(&self, name: &str) -> Option<&CmsCollection> {
        self.collections.iter().find(|c| c.name == name)
    }
}

impl CmsCollection {
    pub fn field(&self, name: &str) -> Option<&CmsField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

fn derive_collection(schema: &Schema, collection: &CollectionSchema) -> CmsCollection {
    let mut cms_fields: Vec<CmsField> = collection
        .fields
        .iter()
        .map(|f| derive_field(schema, f))
        .collect();

    cms_fields.push(CmsField {
        name: fields::CONTENT.to_string(),
        label: collection.content.label.to_string(),
        widget: Widget::Mdx {
            image_directory: collection.content.image_directory.clone(),
            image_public_path: collection.content.image_public_path.clone(),
        },
        required: false,
        default_value: None,
    });

    CmsCollection {
        name: collection.kind.name().to_string(),
        label: collection.kind.label().to_string(),
        slug_field: fields::TITLE.to_string(),
        path: collection.path.clone(),
        format: CmsFormat {
            content_field: fields::CONTENT.to_string(),
        },
        fields: cms_fields,
    }
}

fn derive_field(schema: &Schema, field: &FieldDef) -> CmsField {
    let locales = schema.locales();

    let widget = match &field.kind {
        FieldKind::Slug => Widget::Slug,
        FieldKind::Text => Widget::Text,
        FieldKind::Date => Widget::Date,
        FieldKind::Image {
            directory,
            public_path,
        } => Widget::Image {
            directory: directory.clone(),
            public_path: public_path.clone(),
        },
        FieldKind::Tags => Widget::Array {
            item: "text".to_string(),
        },
        FieldKind::Locale => Widget::Select {
            options: locales.map(|l| l.allowed().to_vec()).unwrap_or_default(),
        },
    };

    let default_value = match (&field.kind, field.presence) {
        (FieldKind::Tags, Presence::Defaulted) => Some(Value::Array(Vec::new())),
        (FieldKind::Locale, Presence::Defaulted) => {
            locales.map(|l| Value::String(l.default_locale().to_string()))
        }
        _ => None,
    };

    CmsField {
        name: field.name.to_string(),
        label: field.label.to_string(),
        widget,
        required: field.is_required(),
        default_value,
    }
}

/// A structural difference between the derived and a committed schema.
#[derive(Debug, Clone, PartialEq)]
pub enum Drift {
    MissingCollection {
        collection: String,
    },
    UnexpectedCollection {
        collection: String,
    },
    MissingField {
        collection: String,
        field: String,
    },
    UnexpectedField {
        collection: String,
        field: String,
    },
    Required {
        collection: String,
        field: String,
        expected: bool,
    },
    Default {
        collection: String,
        field: String,
        expected: Option<Value>,
        actual: Option<Value>,
    },
    Widget {
        collection: String,
        field: String,
        expected: Widget,
        actual: Widget,
    },
}

impl fmt::Display for Drift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCollection { collection } => {
                write!(f, "collection {collection} is missing")
            }
            Self::UnexpectedCollection { collection } => {
                write!(f, "collection {collection} is not in the content schema")
            }
            Self::MissingField { collection, field } => {
                write!(f, "{collection}.{field} is missing")
            }
            Self::UnexpectedField { collection, field } => {
                write!(f, "{collection}.{field} is not in the content schema")
            }
            Self::Required {
                collection,
                field,
                expected,
            } => write!(
                f,
                "{collection}.{field} should {}be required",
                if *expected { "" } else { "not " }
            ),
            Self::Default {
                collection,
                field,
                expected,
                actual,
            } => write!(
                f,
                "{collection}.{field} default is {}, expected {}",
                show(actual.as_ref()),
                show(expected.as_ref())
            ),
            Self::Widget {
                collection,
                field,
                expected,
                actual,
            } => match (expected, actual) {
                (Widget::Select { options: e }, Widget::Select { options: a }) => write!(
                    f,
                    "{collection}.{field} options are {a:?}, expected {e:?}"
                ),
                _ => write!(
                    f,
                    "{collection}.{field} is a {} field, expected {}",
                    actual.kind(),
                    expected.kind()
                ),
            },
        }
    }
}

fn show(value: Option<&Value>) -> String {
    value.map_or_else(|| "unset".to_string(), Value::to_string)
}

/// Compare a committed editing schema against the derived one.
///
/// Storage settings and labels are presentation details and are not compared.
pub fn verify(expected: &CmsConfig, actual: &CmsConfig) -> Vec<Drift> {
    let mut drift = Vec::new();

    for want in &expected.collections {
        let collection = want.name.clone();
        let Some(have) = actual.collection(&want.name) else {
            drift.push(Drift::MissingCollection { collection });
            continue;
        };

        for field in &want.fields {
            let name = field.name.clone();
            let Some(found) = have.field(&field.name) else {
                drift.push(Drift::MissingField {
                    collection: collection.clone(),
                    field: name,
                });
                continue;
            };

            if found.widget != field.widget {
                drift.push(Drift::Widget {
                    collection: collection.clone(),
                    field: name.clone(),
                    expected: field.widget.clone(),
                    actual: found.widget.clone(),
                });
            }
            if found.required != field.required {
                drift.push(Drift::Required {
                    collection: collection.clone(),
                    field: name.clone(),
                    expected: field.required,
                });
            }
            if found.default_value != field.default_value {
                drift.push(Drift::Default {
                    collection: collection.clone(),
                    field: name,
                    expected: field.default_value.clone(),
                    actual: found.default_value.clone(),
                });
            }
        }

        for field in &have.fields {
            if want.field(&field.name).is_none() {
                drift.push(Drift::UnexpectedField {
                    collection: collection.clone(),
                    field: field.name.clone(),
                });
            }
        }
    }

    for have in &actual.collections {
        if expected.collection(&have.name).is_none() {
            drift.push(Drift::UnexpectedCollection {
                collection: have.name.clone(),
            });
        }
    }

    drift
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ImageStore, LocaleSet};

    fn derived() -> CmsConfig {
        CmsConfig::derive(&Schema::default(), &CmsSettings::default())
    }

    #[test]
    fn test_derive_mirrors_post_schema() {
        let cms = derived();
        let posts = cms.collection("posts").expect("posts");

        let names: Vec<&str> = posts.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["title", "publishedAt", "summary", "image", "tags", "lang", "content"]
        );
        assert_eq!(posts.label, "Blog Posts");
        assert_eq!(posts.slug_field, "title");
        assert_eq!(posts.path, "src/content/posts/*");

        let title = posts.field("title").expect("title");
        assert_eq!(title.widget, Widget::Slug);
        assert!(title.required);

        let tags = posts.field("tags").expect("tags");
        assert!(!tags.required);
        assert_eq!(tags.default_value, Some(serde_json::json!([])));

        let lang = posts.field("lang").expect("lang");
        assert_eq!(
            lang.widget,
            Widget::Select {
                options: vec!["zh-cn".into(), "en".into()]
            }
        );
        assert_eq!(lang.default_value, Some(serde_json::json!("zh-cn")));
    }

    #[test]
    fn test_derive_without_locale_has_no_lang() {
        let schema = Schema::new(None, &ImageStore::default());
        let cms = CmsConfig::derive(&schema, &CmsSettings::default());

        for collection in &cms.collections {
            assert!(collection.field("lang").is_none());
        }
    }

    #[test]
    fn test_json_shape() {
        let json: Value = serde_json::from_str(&derived().to_json().expect("json")).expect("parse");

        assert_eq!(json["storage"]["kind"], "github");
        assert_eq!(json["collections"][0]["slugField"], "title");
        assert_eq!(json["collections"][0]["format"]["contentField"], "content");

        let image = &json["collections"][0]["fields"][3];
        assert_eq!(image["kind"], "image");
        assert_eq!(image["directory"], "public/images/posts");
        assert_eq!(image["publicPath"], "/images/posts/");
    }

    #[test]
    fn test_json_round_trip_has_no_drift() {
        let cms = derived();
        let reloaded: CmsConfig =
            serde_json::from_str(&cms.to_json().expect("json")).expect("parse");

        assert_eq!(reloaded, cms);
        assert!(verify(&cms, &reloaded).is_empty());
    }

    #[test]
    fn test_verify_reports_drift() {
        let expected = derived();
        let mut actual = expected.clone();

        let posts = &mut actual.collections[0];
        posts.fields.retain(|f| f.name != "summary");
        if let Some(f) = posts.fields.iter_mut().find(|f| f.name == "publishedAt") {
            f.required = false;
        }
        if let Some(f) = posts.fields.iter_mut().find(|f| f.name == "lang") {
            f.widget = Widget::Select {
                options: vec!["en".into()],
            };
            f.default_value = Some(serde_json::json!("en"));
        }
        posts.fields.push(CmsField {
            name: "draft".into(),
            label: "Draft".into(),
            widget: Widget::Text,
            required: false,
            default_value: None,
        });
        actual.collections.retain(|c| c.name != "pages");

        let drift = verify(&expected, &actual);
        let messages: Vec<String> = drift.iter().map(ToString::to_string).collect();

        assert!(messages.contains(&"posts.summary is missing".to_string()));
        assert!(messages.contains(&"posts.publishedAt should be required".to_string()));
        assert!(messages.contains(&"posts.draft is not in the content schema".to_string()));
        assert!(messages.contains(&"collection pages is missing".to_string()));
        assert!(
            messages
                .iter()
                .any(|m| m.starts_with("posts.lang options are"))
        );
        assert!(
            messages
                .iter()
                .any(|m| m == "posts.lang default is \"en\", expected \"zh-cn\"")
        );
        assert_eq!(drift.len(), 6);
    }

    #[test]
    fn test_verify_reports_extra_collection() {
        let expected = derived();
        let mut actual = expected.clone();

        let mut drafts = actual.collections[0].clone();
        drafts.name = "drafts".into();
        drafts.path = "src/content/drafts/*".into();
        actual.collections.push(drafts);

        let drift = verify(&expected, &actual);
        assert_eq!(
            drift,
            vec![Drift::UnexpectedCollection {
                collection: "drafts".into()
            }]
        );
        assert_eq!(
            drift[0].to_string(),
            "collection drafts is not in the content schema"
        );
    }

    #[test]
    fn test_derive_follows_custom_locales() {
        let locales = LocaleSet::new(vec!["en".into(), "ja".into()], "en").expect("locales");
        let schema = Schema::new(Some(locales), &ImageStore::default());
        let cms = CmsConfig::derive(&schema, &CmsSettings::default());

        let lang = cms
            .collection("pages")
            .and_then(|c| c.field("lang"))
            .expect("lang");
        assert_eq!(lang.default_value, Some(serde_json::json!("en")));
    }
}
