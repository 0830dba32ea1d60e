//! Product catalog

use crate::client::{PlatformClient, Service};
use crate::error::Result;
use crate::models::{Product, ProductFilter, ProductList};

impl PlatformClient {
    /// Products matching `filter`
    pub async fn get_products(&self, filter: &ProductFilter) -> Result<Vec<Product>> {
        let list: ProductList = self.post(Service::Global, "/v1/products", filter).await?;
        tracing::debug!(count = list.products.len(), "fetched products");
        Ok(list.products)
    }
}
