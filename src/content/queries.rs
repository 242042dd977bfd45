use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;
use crate::models::content::{ContentItem, Post, Taxonomy};
use crate::models::descriptor::collection_items;
use crate::models::site::{sort_navigation, Footer, LevelDescriptor, NavPage};

/// The content types cached once per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Posts,
    Taxonomies,
    Footer,
    Pages,
    LevelDescriptor,
}

impl ContentType {
    pub const ALL: [ContentType; 5] = [
        ContentType::Posts,
        ContentType::Taxonomies,
        ContentType::Footer,
        ContentType::Pages,
        ContentType::LevelDescriptor,
    ];

    /// The named GraphQL operation for this content type.
    pub fn query(self) -> ContentQuery {
        let (operation_name, text) = match self {
            ContentType::Posts => ("Posts", POSTS_QUERY),
            ContentType::Taxonomies => ("Taxonomies", TAXONOMIES_QUERY),
            ContentType::Footer => ("Footer", FOOTER_QUERY),
            ContentType::Pages => ("Nav", NAV_QUERY),
            ContentType::LevelDescriptor => ("LevelDescriptor", LEVEL_DESCRIPTOR_QUERY),
        };
        ContentQuery {
            operation_name,
            text,
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ContentType::Posts => "posts",
            ContentType::Taxonomies => "taxonomies",
            ContentType::Footer => "footer",
            ContentType::Pages => "pages",
            ContentType::LevelDescriptor => "level-descriptor",
        };
        f.write_str(name)
    }
}

/// A named query against the content API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentQuery {
    pub operation_name: &'static str,
    pub text: &'static str,
}

/// Decoded result of one content query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ContentPayload {
    Posts(Vec<Post>),
    Taxonomies(Vec<Taxonomy>),
    Footer(Footer),
    Pages(Vec<NavPage>),
    LevelDescriptor(LevelDescriptor),
}

impl ContentPayload {
    pub fn content_type(&self) -> ContentType {
        match self {
            ContentPayload::Posts(_) => ContentType::Posts,
            ContentPayload::Taxonomies(_) => ContentType::Taxonomies,
            ContentPayload::Footer(_) => ContentType::Footer,
            ContentPayload::Pages(_) => ContentType::Pages,
            ContentPayload::LevelDescriptor(_) => ContentType::LevelDescriptor,
        }
    }
}

/// Decode the `data` tree of a content query into its typed payload.
pub fn decode(content_type: ContentType, data: &Value) -> Result<ContentPayload, AppError> {
    match content_type {
        ContentType::Posts => {
            let posts = items(data, "page_post")?
                .into_iter()
                .map(|item| match ContentItem::parse(item)? {
                    ContentItem::Post(post) => Ok(post),
                    other => Err(AppError::Decode(format!(
                        "expected a post, got '{}'",
                        other.meta().content_type_id
                    ))),
                })
                .collect::<Result<Vec<_>, AppError>>()?;
            Ok(ContentPayload::Posts(posts))
        }
        ContentType::Taxonomies => {
            let taxonomies = items(data, "component_taxonomy")?
                .into_iter()
                .map(|item| match ContentItem::parse(item)? {
                    ContentItem::Taxonomy(taxonomy) => Ok(taxonomy),
                    other => Err(AppError::Decode(format!(
                        "expected a taxonomy, got '{}'",
                        other.meta().content_type_id
                    ))),
                })
                .collect::<Result<Vec<_>, AppError>>()?;
            Ok(ContentPayload::Taxonomies(taxonomies))
        }
        ContentType::Footer => {
            let first = first_item(data, "component_footer")?;
            Footer::parse(first).map(ContentPayload::Footer)
        }
        ContentType::Pages => {
            let mut pages = items(data, "pages")?
                .into_iter()
                .map(NavPage::parse)
                .collect::<Result<Vec<_>, AppError>>()?;
            sort_navigation(&mut pages);
            Ok(ContentPayload::Pages(pages))
        }
        ContentType::LevelDescriptor => {
            let first = first_item(data, "component_level__descriptor")?;
            LevelDescriptor::parse(first).map(ContentPayload::LevelDescriptor)
        }
    }
}

fn items<'a>(data: &'a Value, root: &str) -> Result<Vec<&'a Value>, AppError> {
    let listing = data
        .get(root)
        .ok_or_else(|| AppError::Decode(format!("response has no '{root}' field")))?;
    Ok(listing.get("items").map(collection_items).unwrap_or_default())
}

fn first_item<'a>(data: &'a Value, root: &str) -> Result<&'a Value, AppError> {
    items(data, root)?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::NotFound(format!("no '{root}' item")))
}

const POSTS_QUERY: &str = "
query Posts {
  page_post(limit: 10, offset: 0, sortBy: \"lastModifiedDate_dt\", sortOrder: DESC) {
    total
    items {
      guid: objectId
      path: localId
      contentTypeId: content__type
      dateCreated: createdDate_dt
      dateModified: lastModifiedDate_dt
      label: internal__name
      slug: localId(transform: \"storeUrlToRenderUrl\")
      pageTitle_s
      pageDescription_s
      blurb_t
      headline_s
      mainImage_s
      content_o {
        item {
          key
          component {
            ... on component_rich_text { guid: objectId path: localId contentTypeId: content__type dateCreated: createdDate_dt dateModified: lastModifiedDate_dt label: internal__name content_html_raw }
            ... on component_image { guid: objectId path: localId contentTypeId: content__type dateCreated: createdDate_dt dateModified: lastModifiedDate_dt label: internal__name alternativeText_s image_s }
            ... on component_responsive_columns {
              guid: objectId path: localId contentTypeId: content__type dateCreated: createdDate_dt dateModified: lastModifiedDate_dt label: internal__name
              columns_o {
                item {
                  columnSize_s
                  content_o {
                    item {
                      key
                      component {
                        ... on component_rich_text { guid: objectId path: localId contentTypeId: content__type dateCreated: createdDate_dt dateModified: lastModifiedDate_dt label: internal__name content_html_raw }
                        ... on component_image { guid: objectId path: localId contentTypeId: content__type dateCreated: createdDate_dt dateModified: lastModifiedDate_dt label: internal__name alternativeText_s image_s }
                      }
                    }
                  }
                }
              }
            }
          }
        }
      }
      authorBio_o {
        item {
          key
          component {
            guid: objectId
            contentTypeId: content__type
            label: internal__name
            path: localId
            bio_t
            name_s
            profilePic_s
            linkButtonText_s
            linkButtonUrl_s
            showLinkButton_b
            facebookLink_s
            twitterLink_s
            instagramLink_s
            youTubeLink_s
          }
        }
      }
      categories_o { item { key value_smv } }
      tags_o { item { key value_smv } }
    }
  }
}
";

const TAXONOMIES_QUERY: &str = "
query Taxonomies {
  component_taxonomy {
    total
    items {
      guid: objectId
      path: localId
      contentTypeId: content__type
      dateCreated: createdDate_dt
      dateModified: lastModifiedDate_dt
      label: internal__name
      items { item { key value } }
    }
  }
}
";

const FOOTER_QUERY: &str = "
query Footer {
  component_footer {
    items {
      about_t
      file__name(filter: {matches: \"site-footer.xml\"})
      internal__name
      localId
      socialLinks_o { item { socialNetwork_s url_s } }
      quickLinks_o { item { label_s url_s } }
    }
  }
}
";

const NAV_QUERY: &str = "
query Nav {
  pages {
    total
    items {
      navLabel
      contentTypeId: content__type
      url: localId(transform: \"storeUrlToRenderUrl\")
      placeInNav(filter: { equals: true }) @skip(if: true)
      orderDefault_f
    }
  }
}
";

const LEVEL_DESCRIPTOR_QUERY: &str = "
query LevelDescriptor {
  component_level__descriptor {
    items {
      siteTitle_s
      file__name(filter: {matches: \"crafter-level-descriptor.level.xml\"})
    }
  }
}
";

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_every_type_has_a_named_query() {
        for ty in ContentType::ALL {
            let query = ty.query();
            assert!(query.text.contains(&format!("query {}", query.operation_name)));
        }
    }

    #[test]
    fn test_nested_components_request_dates() {
        for fragment in POSTS_QUERY.split("... on ").skip(1) {
            let head = fragment.split('{').nth(1).unwrap_or_default();
            assert!(head.contains("dateCreated: createdDate_dt"), "missing dateCreated in {head}");
            assert!(head.contains("dateModified: lastModifiedDate_dt"), "missing dateModified in {head}");
        }
    }

    #[test]
    fn test_decode_taxonomies() {
        let data = json!({
            "component_taxonomy": {
                "total": 1,
                "items": [{
                    "guid": "tax-1",
                    "path": "/site/components/taxonomy/categories.xml",
                    "contentTypeId": "/component/taxonomy",
                    "label": "Categories",
                    "items": { "item": [ { "key": "travel", "value": "Travel" } ] }
                }]
            }
        });

        match decode(ContentType::Taxonomies, &data).unwrap() {
            ContentPayload::Taxonomies(t) => {
                assert_eq!(t.len(), 1);
                assert_eq!(t[0].entries[0].value, "Travel");
            }
            other => panic!("Expected taxonomies, got: {:?}", other),
        }
    }

    #[test]
    fn test_decode_footer_takes_first_item() {
        let data = json!({ "component_footer": { "items": [ { "about_t": "First" }, { "about_t": "Second" } ] } });
        match decode(ContentType::Footer, &data).unwrap() {
            ContentPayload::Footer(f) => assert_eq!(f.about, "First"),
            other => panic!("Expected footer, got: {:?}", other),
        }
    }

    #[test]
    fn test_decode_missing_footer_is_not_found() {
        let data = json!({ "component_footer": { "items": [] } });
        assert_eq!(
            decode(ContentType::Footer, &data).unwrap_err(),
            AppError::NotFound("no 'component_footer' item".into())
        );
    }

    #[test]
    fn test_decode_level_descriptor() {
        let data = json!({ "component_level__descriptor": { "items": [ { "siteTitle_s": "My Blog" } ] } });
        assert_eq!(
            decode(ContentType::LevelDescriptor, &data).unwrap(),
            ContentPayload::LevelDescriptor(LevelDescriptor {
                site_title: "My Blog".into()
            })
        );
    }

    #[test]
    fn test_decode_rejects_wrong_root() {
        let data = json!({ "something_else": {} });
        assert!(matches!(decode(ContentType::Posts, &data), Err(AppError::Decode(_))));
    }

    #[test]
    fn test_decode_posts_rejects_non_posts() {
        let data = json!({ "page_post": { "items": [ {
            "guid": "t", "contentTypeId": "/component/taxonomy", "items": []
        } ] } });
        assert!(decode(ContentType::Posts, &data).is_err());
    }

    #[test]
    fn test_payload_knows_its_type() {
        let payload = ContentPayload::Pages(vec![]);
        assert_eq!(payload.content_type(), ContentType::Pages);
    }
}
