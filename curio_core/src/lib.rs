//! # Curio Core
//!
//! A small catalog store with a content-addressed image store using BLAKE3.
//!
//! This library stores named, categorized items together with an associated
//! image and answers point lookups and substring search over item names.
//! Image content is deduplicated by digest: identical bytes always map to
//! the identical artifact. Category names are normalized into a deduplicated
//! reference table; items are immutable once written.
//!
//! ## Example
//!
//! ```no_run
//! use curio_core::CatalogService;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Open (or create) a data root
//! let service = CatalogService::open("./curio-data")?;
//!
//! // Ingest an item: image bytes plus name and category
//! let image = std::fs::File::open("./shirt.jpg")?;
//! let id = service.add_item(image, "shirt", "clothes")?;
//!
//! // Query it back
//! let item = service.get_by_id(id)?;
//! println!("{} is filed under {}", item.name, item.category);
//!
//! // Substring search over names
//! let hits = service.search("shi")?;
//! println!("{} matching items", hits.len());
//! # Ok(())
//! # }
//! ```

mod catalog;
mod digest;
mod error;
mod image_store;
mod model;
mod service;

pub use catalog::Catalog;
pub use digest::{Digest, ImageRef};
pub use error::{Error, Result};
pub use image_store::{ImageStore, DEFAULT_ARTIFACT};
pub use model::{Item, ItemList};
pub use service::CatalogService;
