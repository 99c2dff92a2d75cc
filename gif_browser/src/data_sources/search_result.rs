use serde::Deserialize;

/// Decoded body of a `/v1/gifs/search` response.
///
/// Only the fixed-height variant of each item is read; every other field in
/// the payload is ignored. Missing pieces never fail decoding and read back as
/// empty values instead.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    data: Option<Vec<ResultItem>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ResultItem {
    #[serde(default)]
    images: Option<Images>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
struct Images {
    #[serde(default)]
    fixed_height: Option<ImageVariant>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
struct ImageVariant {
    #[serde(default)]
    url: Option<String>,
}

impl SearchResult {
    /// Number of items, 0 when the response carried no `data`.
    pub fn len(&self) -> usize {
        self.data.as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fixed-height thumbnail URL of the item at `index`, or `""` when the
    /// index is out of range or the item has no such variant.
    pub fn url_at(&self, index: usize) -> &str {
        self.data
            .as_ref()
            .and_then(|items| items.get(index))
            .map_or("", ResultItem::thumbnail_url)
    }

    /// Thumbnail URLs in response order.
    pub fn urls(&self) -> impl Iterator<Item = &str> + '_ {
        self.data
            .iter()
            .flatten()
            .map(ResultItem::thumbnail_url)
    }
}

impl ResultItem {
    pub fn thumbnail_url(&self) -> &str {
        self.images
            .as_ref()
            .and_then(|images| images.fixed_height.as_ref())
            .and_then(|variant| variant.url.as_deref())
            .unwrap_or("")
    }
}
