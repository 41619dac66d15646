//! Generic list-response envelope

use serde::{Deserialize, Deserializer, Serialize};

/// Decode `null` the same as an absent field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Continuation marker returned by listing endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NextPage {
    /// Opaque cursor to echo as `offset` on the next request
    #[serde(default, deserialize_with = "null_as_default")]
    pub offset: String,
    /// Relative path of the next page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Absolute URI of the next page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

/// One page of a listing, polymorphic over the item type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Page<T> {
    /// Items in server order
    #[serde(
        default = "Vec::new",
        deserialize_with = "null_as_default",
        bound(deserialize = "T: Deserialize<'de>")
    )]
    pub data: Vec<T>,
    /// Continuation marker, absent or null on the last page
    #[serde(default)]
    pub next_page: Option<NextPage>,
}

impl<T> Page<T> {
    /// Cursor for the following page, `None` when this is the last page.
    pub fn next_cursor(&self) -> Option<&str> {
        self.next_page
            .as_ref()
            .map(|next| next.offset.as_str())
            .filter(|offset| !offset.is_empty())
    }
}
