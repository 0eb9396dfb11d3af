//! Parsing raw RSS documents into the structured feed model.

use serde::{Deserialize, Serialize};

use crate::feeds::error::FeedError;

/// A fully parsed feed document.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParsedFeed {
    /// Channel title.
    pub title: String,
    /// Channel description.
    pub description: String,
    /// Channel link.
    pub link: String,
    /// Items in document order.
    pub items: Vec<FeedItem>,
}

/// A single entry of a parsed feed.
///
/// Absent fields are modelled as `None` rather than empty strings so that
/// "empty" and "missing" stay distinguishable downstream.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FeedItem {
    /// Entry title.
    pub title: String,
    /// Entry link.
    pub link: String,
    /// Publication date as given by the feed, unparsed.
    pub pub_date: Option<String>,
    /// Author, falling back to the Dublin Core creator.
    pub author: Option<String>,
    /// Untruncated summary text taken from the item description.
    pub content_snippet: Option<String>,
}

impl FeedItem {
    fn from_rss_item(item: &rss::Item) -> Self {
        let author = item
            .author()
            .map(ToString::to_string)
            .or_else(|| {
                item.dublin_core_ext()
                    .and_then(|dc| dc.creators().first().map(ToString::to_string))
            });

        Self {
            title: item.title().unwrap_or_default().to_string(),
            link: item.link().unwrap_or_default().to_string(),
            pub_date: item.pub_date().map(ToString::to_string),
            author,
            content_snippet: item.description().map(ToString::to_string),
        }
    }
}

/// Parse a raw feed document into a [`ParsedFeed`].
///
/// # Errors
/// Returns [`FeedError::Parse`] if the document is not a valid RSS channel.
pub fn parse_feed(raw: &str) -> Result<ParsedFeed, FeedError> {
    let channel = rss::Channel::read_from(raw.as_bytes())?;

    let items = channel.items().iter().map(FeedItem::from_rss_item).collect();

    Ok(ParsedFeed {
        title: channel.title().to_string(),
        description: channel.description().to_string(),
        link: channel.link().to_string(),
        items,
    })
}
