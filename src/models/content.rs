use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;
use crate::models::descriptor::{store_url_to_render_url, Descriptor};
use crate::rendering::html::sanitize_rich_text;

const ID: &[&str] = &["guid", "objectId"];
const PATH: &[&str] = &["path", "localId"];
const CONTENT_TYPE: &[&str] = &["contentTypeId", "content-type", "content__type"];
const DATE_CREATED: &[&str] = &["dateCreated", "createdDate_dt", "createdDate"];
const DATE_MODIFIED: &[&str] = &["dateModified", "lastModifiedDate_dt", "lastModifiedDate"];
const LABEL: &[&str] = &["label", "internal__name", "internal-name"];

const AUTHOR_BIO: &str = "/component/author-bio";

/// Attributes every CMS item carries regardless of its kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemMeta {
    /// Global object id.
    pub id: String,
    /// Repository path (e.g. `/site/website/articles/hello/index.xml`).
    pub path: String,
    /// Content-type tag (e.g. `/page/post`).
    pub content_type_id: String,
    pub date_created: Option<DateTime<Utc>>,
    pub date_modified: Option<DateTime<Utc>>,
    /// Display label (the item's internal name).
    pub label: String,
}

impl ItemMeta {
    fn parse(desc: &Descriptor<'_>) -> Result<Self, AppError> {
        Ok(Self {
            id: desc.require(ID)?,
            ..Self::embedded(desc, None)?
        })
    }

    /// Meta of a component nested in another item. The search index flattens
    /// these without an id and often without a content-type tag.
    fn embedded(desc: &Descriptor<'_>, content_type: Option<&str>) -> Result<Self, AppError> {
        let content_type_id = match (desc.string(CONTENT_TYPE), content_type) {
            (Some(tag), _) => tag,
            (None, Some(fallback)) => fallback.to_string(),
            (None, None) => desc.require(CONTENT_TYPE)?,
        };

        Ok(Self {
            id: desc.string_or_default(ID),
            path: desc.string_or_default(PATH),
            content_type_id,
            date_created: desc.date(DATE_CREATED),
            date_modified: desc.date(DATE_MODIFIED),
            label: desc.string_or_default(LABEL),
        })
    }
}

/// A content item decoded from the CMS, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentItem {
    Post(Post),
    Taxonomy(Taxonomy),
    AuthorBio(AuthorBio),
    RichText(RichText),
    Image(Image),
    ResponsiveColumns(ResponsiveColumns),
}

impl ContentItem {
    /// Decode a descriptor, dispatching on its content-type tag.
    pub fn parse(value: &Value) -> Result<Self, AppError> {
        let desc = Descriptor::new(value)?;
        let meta = ItemMeta::parse(&desc)?;
        Self::decode(&desc, meta)
    }

    /// Decode a component nested in a keyed list, where the id is optional.
    pub fn parse_embedded(value: &Value) -> Result<Self, AppError> {
        let desc = Descriptor::new(value)?;
        let meta = ItemMeta::embedded(&desc, None)?;
        Self::decode(&desc, meta)
    }

    fn decode(desc: &Descriptor<'_>, meta: ItemMeta) -> Result<Self, AppError> {
        match meta.content_type_id.as_str() {
            "/page/post" | "/component/post" => Post::parse(desc, meta).map(Self::Post),
            "/component/taxonomy" => Taxonomy::parse(desc, meta).map(Self::Taxonomy),
            AUTHOR_BIO => AuthorBio::parse(desc, meta).map(Self::AuthorBio),
            "/component/rich-text" => Ok(Self::RichText(RichText::parse(desc, meta))),
            "/component/image" => Ok(Self::Image(Image::parse(desc, meta))),
            "/component/responsive-columns" => {
                ResponsiveColumns::parse(desc, meta).map(Self::ResponsiveColumns)
            }
            other => Err(AppError::Decode(format!("unsupported content type '{other}'"))),
        }
    }

    pub fn meta(&self) -> &ItemMeta {
        match self {
            Self::Post(p) => &p.meta,
            Self::Taxonomy(t) => &t.meta,
            Self::AuthorBio(a) => &a.meta,
            Self::RichText(r) => &r.meta,
            Self::Image(i) => &i.meta,
            Self::ResponsiveColumns(c) => &c.meta,
        }
    }

    pub fn id(&self) -> &str {
        &self.meta().id
    }

    pub fn as_post(&self) -> Option<&Post> {
        match self {
            Self::Post(post) => Some(post),
            _ => None,
        }
    }
}

/// An element of an ordered, keyed component list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyed<T> {
    pub key: String,
    pub component: T,
}

fn keyed_components(desc: &Descriptor<'_>, keys: &[&str]) -> Result<Vec<Keyed<ContentItem>>, AppError> {
    desc.items(keys)
        .into_iter()
        .map(|item| {
            let entry = Descriptor::new(item)?;
            let component = entry
                .value(&["component"])
                .ok_or_else(|| AppError::Decode("keyed item without component".into()))?;
            Ok(Keyed {
                key: entry.string_or_default(&["key"]),
                component: ContentItem::parse_embedded(component)?,
            })
        })
        .collect()
}

/// A blog post page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub meta: ItemMeta,
    /// Render URL of the post.
    pub url: String,
    pub page_title: Option<String>,
    pub page_description: Option<String>,
    pub blurb: String,
    pub headline: String,
    pub main_image: Option<String>,
    pub content: Vec<Keyed<ContentItem>>,
    pub author_bios: Vec<AuthorBio>,
    pub categories: Vec<TaxonomyEntry>,
    pub tags: Vec<TaxonomyEntry>,
}

impl Post {
    fn parse(desc: &Descriptor<'_>, meta: ItemMeta) -> Result<Self, AppError> {
        let author_bios = desc
            .items(&["authorBio_o", "authorBio"])
            .into_iter()
            .filter_map(|item| item.get("component"))
            .map(|component| {
                let bio = Descriptor::new(component)?;
                let meta = ItemMeta::embedded(&bio, Some(AUTHOR_BIO))?;
                AuthorBio::parse(&bio, meta)
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        Ok(Self {
            url: desc
                .string(&["slug", "url"])
                .unwrap_or_else(|| store_url_to_render_url(&meta.path)),
            page_title: desc.string(&["pageTitle_s"]),
            page_description: desc.string(&["pageDescription_s"]),
            blurb: desc.string_or_default(&["blurb_t"]),
            headline: desc.string_or_default(&["headline_s"]),
            main_image: desc.string(&["mainImage_s"]),
            content: keyed_components(desc, &["content_o"])?,
            author_bios,
            categories: TaxonomyEntry::parse_list(desc, &["categories_o", "categories"])?,
            tags: TaxonomyEntry::parse_list(desc, &["tags_o", "tags"])?,
            meta,
        })
    }

    pub fn title(&self) -> &str {
        self.page_title.as_deref().unwrap_or(&self.headline)
    }
}

/// One key/value pair of a taxonomy (a category or a tag).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonomyEntry {
    pub key: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl TaxonomyEntry {
    fn parse_list(desc: &Descriptor<'_>, keys: &[&str]) -> Result<Vec<Self>, AppError> {
        desc.items(keys)
            .into_iter()
            .map(|item| {
                let entry = Descriptor::new(item)?;
                Ok(Self {
                    key: entry.require(&["key"])?,
                    value: entry.string_or_default(&["value", "value_smv"]),
                    image: entry.string(&["image_s"]),
                })
            })
            .collect()
    }
}

/// A named list of taxonomy entries (e.g. `categories.xml`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Taxonomy {
    pub meta: ItemMeta,
    pub entries: Vec<TaxonomyEntry>,
}

impl Taxonomy {
    fn parse(desc: &Descriptor<'_>, meta: ItemMeta) -> Result<Self, AppError> {
        Ok(Self {
            entries: TaxonomyEntry::parse_list(desc, &["items"])?,
            meta,
        })
    }
}

/// Entries of the taxonomy whose path contains `file_name`.
pub fn find_taxonomy_entries(
    taxonomies: &[Taxonomy],
    file_name: &str,
) -> Result<Vec<TaxonomyEntry>, AppError> {
    taxonomies
        .iter()
        .find(|t| t.meta.path.contains(file_name))
        .map(|t| t.entries.clone())
        .ok_or_else(|| AppError::NotFound(format!("taxonomy '{file_name}'")))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkButton {
    pub text: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialProfiles {
    pub facebook: Option<String>,
    pub twitter: Option<String>,
    pub instagram: Option<String>,
    pub youtube: Option<String>,
}

/// Author card attached to posts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorBio {
    pub meta: ItemMeta,
    pub name: String,
    pub bio: String,
    pub profile_pic: Option<String>,
    pub link_button: Option<LinkButton>,
    pub social: SocialProfiles,
}

impl AuthorBio {
    fn parse(desc: &Descriptor<'_>, meta: ItemMeta) -> Result<Self, AppError> {
        let link_button = if desc.flag(&["showLinkButton_b"]) {
            Some(LinkButton {
                text: desc.string_or_default(&["linkButtonText_s"]),
                url: desc.string_or_default(&["linkButtonUrl_s"]),
            })
        } else {
            None
        };

        Ok(Self {
            name: desc.string_or_default(&["name_s"]),
            bio: desc.string_or_default(&["bio_t"]),
            profile_pic: desc.string(&["profilePic_s"]),
            link_button,
            social: SocialProfiles {
                facebook: desc.string(&["facebookLink_s"]),
                twitter: desc.string(&["twitterLink_s"]),
                instagram: desc.string(&["instagramLink_s"]),
                youtube: desc.string(&["youTubeLink_s"]),
            },
            meta,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichText {
    pub meta: ItemMeta,
    /// Sanitized HTML.
    pub html: String,
}

impl RichText {
    fn parse(desc: &Descriptor<'_>, meta: ItemMeta) -> Self {
        let raw = desc.string_or_default(&["content_html_raw", "content_html"]);
        Self {
            html: sanitize_rich_text(&raw),
            meta,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub meta: ItemMeta,
    pub src: String,
    pub alt: String,
}

impl Image {
    fn parse(desc: &Descriptor<'_>, meta: ItemMeta) -> Self {
        Self {
            src: desc.string_or_default(&["image_s"]),
            alt: desc.string_or_default(&["alternativeText_s"]),
            meta,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// CSS grid size token, e.g. `col-md-6`.
    pub size: String,
    pub content: Vec<Keyed<ContentItem>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponsiveColumns {
    pub meta: ItemMeta,
    pub columns: Vec<Column>,
}

impl ResponsiveColumns {
    fn parse(desc: &Descriptor<'_>, meta: ItemMeta) -> Result<Self, AppError> {
        let columns = desc
            .items(&["columns_o"])
            .into_iter()
            .map(|column| {
                let column = Descriptor::new(column)?;
                Ok(Column {
                    size: column.string_or_default(&["columnSize_s"]),
                    content: keyed_components(&column, &["content_o"])?,
                })
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        Ok(Self { meta, columns })
    }
}
