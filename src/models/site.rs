use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;
use crate::models::descriptor::Descriptor;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialLink {
    pub network: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickLink {
    pub label: String,
    pub url: String,
}

/// The site-wide footer component (`site-footer.xml`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Footer {
    pub about: String,
    pub social_links: Vec<SocialLink>,
    pub quick_links: Vec<QuickLink>,
}

impl Footer {
    pub fn parse(value: &Value) -> Result<Self, AppError> {
        let desc = Descriptor::new(value)?;

        let social_links = desc
            .items(&["socialLinks_o"])
            .into_iter()
            .map(|item| {
                let link = Descriptor::new(item)?;
                Ok(SocialLink {
                    network: link.string_or_default(&["socialNetwork_s"]),
                    url: link.string_or_default(&["url_s"]),
                })
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        let quick_links = desc
            .items(&["quickLinks_o"])
            .into_iter()
            .map(|item| {
                let link = Descriptor::new(item)?;
                Ok(QuickLink {
                    label: link.string_or_default(&["label_s"]),
                    url: link.string_or_default(&["url_s"]),
                })
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        Ok(Self {
            about: desc.string_or_default(&["about_t"]),
            social_links,
            quick_links,
        })
    }
}

/// A page listed in the top navigation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavPage {
    pub label: String,
    pub content_type_id: String,
    pub url: String,
    pub order: Option<f64>,
}

impl NavPage {
    pub fn parse(value: &Value) -> Result<Self, AppError> {
        let desc = Descriptor::new(value)?;
        Ok(Self {
            label: desc.string_or_default(&["navLabel"]),
            content_type_id: desc.string_or_default(&["contentTypeId"]),
            url: desc.require(&["url"])?,
            order: desc.number(&["orderDefault_f"]),
        })
    }
}

/// Sort navigation entries by their order field; unordered pages go last.
pub fn sort_navigation(pages: &mut [NavPage]) {
    pages.sort_by(|a, b| match (a.order, b.order) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

/// Site-level settings stored in the level descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDescriptor {
    pub site_title: String,
}

impl LevelDescriptor {
    pub fn parse(value: &Value) -> Result<Self, AppError> {
        let desc = Descriptor::new(value)?;
        Ok(Self {
            site_title: desc.string_or_default(&["siteTitle_s"]),
        })
    }
}
