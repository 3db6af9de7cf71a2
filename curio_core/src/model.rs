//! Read models returned by catalog queries.

use serde::{Deserialize, Serialize};

/// A catalog item joined with its category name.
///
/// `category` carries the category's name, never its raw identifier;
/// `image_name` is the content-derived artifact reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub image_name: String,
}

/// An ordered sequence of items, in the store's natural insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemList {
    pub items: Vec<Item>,
}

impl ItemList {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<Vec<Item>> for ItemList {
    fn from(items: Vec<Item>) -> Self {
        ItemList { items }
    }
}
