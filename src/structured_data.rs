//! schema.org `Article` metadata, emitted as JSON-LD in the page head.

use serde::Serialize;

const CONTEXT: &str = "http://schema.org";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuredData {
    #[serde(rename = "@context")]
    pub context: &'static str,
    #[serde(rename = "@type")]
    pub kind: &'static str,
    #[serde(rename = "mainEntityOfPage")]
    pub main_entity_of_page: String,
    pub headline: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "dateModified", skip_serializing_if = "Option::is_none")]
    pub date_modified: Option<String>,
    #[serde(rename = "datePublished")]
    pub date_published: String,
    pub author: Person,
    pub publisher: Organization,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageObject>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Person {
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Organization {
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub name: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<ImageObject>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageObject {
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub url: String,
    pub width: u32,
    pub height: u32,
}

impl ImageObject {
    pub fn new(url: String, width: u32, height: u32) -> Self {
        Self {
            kind: "ImageObject",
            url,
            width,
            height,
        }
    }
}

impl StructuredData {
    /// An `Article` for the page at absolute `url`.
    pub fn article(url: String, headline: String, date_published: String) -> Self {
        Self {
            context: CONTEXT,
            kind: "Article",
            main_entity_of_page: url,
            headline,
            description: None,
            date_modified: None,
            date_published,
            author: Person {
                kind: "Person",
                name: String::new(),
                email: String::new(),
            },
            publisher: Organization {
                kind: "Organization",
                name: String::new(),
                url: String::new(),
                logo: None,
            },
            image: None,
        }
    }

    /// JSON suitable for a `<script type="application/ld+json">` body.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        Ok(serde_json::to_string(self)?.replace("</", "<\\/"))
    }
}
