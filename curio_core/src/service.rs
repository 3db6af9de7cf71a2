//! Ingest and query facade over the image store and the catalog.

use crate::catalog::Catalog;
use crate::digest::ImageRef;
use crate::error::{Error, Result};
use crate::image_store::ImageStore;
use crate::model::{Item, ItemList};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Name of the catalog database file under the data root.
const CATALOG_DB_FILE: &str = "catalog.sqlite3";

/// Name of the artifact directory under the data root.
const IMAGES_DIR: &str = "images";

/// The catalog service: one data root holding artifacts and the database.
pub struct CatalogService {
    images: ImageStore,
    catalog: Catalog,
}

impl CatalogService {
    /// Open the service rooted at the given data directory, creating the
    /// layout (`images/`, `catalog.sqlite3`) if needed.
    pub fn open<P: AsRef<Path>>(data_root: P) -> Result<Self> {
        let root = data_root.as_ref();

        fs::create_dir_all(root)
            .map_err(|e| Error::persist_failure(root, e.to_string()))?;

        let images = ImageStore::open(root.join(IMAGES_DIR))?;
        let catalog = Catalog::open(root.join(CATALOG_DB_FILE))?;

        Ok(Self { images, catalog })
    }

    /// The underlying image store.
    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    /// The underlying catalog store.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Ingest an item: store the image content-addressed, resolve or create
    /// the category, insert the item row. Returns the new item's id.
    ///
    /// Fields are validated before the image is ingested so a rejected
    /// request leaves no artifact behind.
    pub fn add_item<R: Read>(&self, image: R, name: &str, category: &str) -> Result<i64> {
        if name.trim().is_empty() {
            return Err(Error::invalid_input("item name is required"));
        }
        if category.trim().is_empty() {
            return Err(Error::invalid_input("category is required"));
        }

        let reference = self.images.ingest(image)?;
        log::info!(
            "received item name={:?} category={:?} image={}",
            name,
            category,
            reference
        );

        self.catalog.add_item(name, category, &reference.file_name())
    }

    /// Return every item, joined with category names.
    pub fn list_all(&self) -> Result<ItemList> {
        self.catalog.list_all()
    }

    /// Look up one item by id.
    pub fn get_by_id(&self, id: i64) -> Result<Item> {
        self.catalog.get_by_id(id)
    }

    /// Substring search over item names.
    pub fn search(&self, keyword: &str) -> Result<ItemList> {
        self.catalog.search(keyword)
    }

    /// Resolve an image reference string to a readable artifact path,
    /// falling back to the default artifact when it is missing.
    pub fn resolve_image(&self, reference: &str) -> Result<PathBuf> {
        let reference = ImageRef::parse(reference)?;
        Ok(self.images.resolve(&reference))
    }
}
