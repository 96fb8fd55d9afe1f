use crate::api::ApiClient;
use crate::api::schemas::common::ApiEnvelope;
use crate::api::schemas::product::{NewProduct, Product, ProductImage};
use crate::error::Result;
use crate::services::notification_service::NotificationCenter;
use reqwest::RequestBuilder;
use reqwest::multipart;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Catalog client. All traffic runs through the authorization pipeline;
/// mutations announce success, every failure is surfaced as a toast and
/// propagated.
#[derive(Clone)]
pub struct ProductService {
    api: Arc<ApiClient>,
    notifications: Arc<NotificationCenter>,
}

impl ProductService {
    pub fn new(api: Arc<ApiClient>, notifications: Arc<NotificationCenter>) -> Self {
        Self { api, notifications }
    }

    #[tracing::instrument(skip(self), err(level = "warn"))]
    pub async fn list(&self) -> Result<Vec<Product>> {
        self.fetch(self.api.get("/product"), "Failed to fetch products").await
    }

    #[tracing::instrument(skip(self), err(level = "warn"))]
    pub async fn get(&self, id: &str) -> Result<Product> {
        self.fetch(self.api.get(&format!("/products/{id}")), "Product not found").await
    }

    #[tracing::instrument(skip(self), err(level = "warn"))]
    pub async fn get_by_code(&self, product_code: &str) -> Result<Product> {
        self.fetch(self.api.get(&format!("/products/code/{product_code}")), "Product not found")
            .await
    }

    #[tracing::instrument(skip(self), err(level = "warn"))]
    pub async fn by_category(&self, category: &str) -> Result<Vec<Product>> {
        self.fetch(
            self.api.get(&format!("/products/category/{category}")),
            "Failed to fetch products",
        )
        .await
    }

    #[tracing::instrument(skip(self, product), fields(product_code = %product.product_code), err(level = "warn"))]
    pub async fn create(&self, product: &NewProduct) -> Result<Product> {
        let created: Product = self
            .fetch(self.api.post("/products").json(product), "Failed to create product")
            .await?;
        self.notifications.show_success("Product created successfully", None);
        Ok(created)
    }

    #[tracing::instrument(skip(self, product), err(level = "warn"))]
    pub async fn update(&self, id: &str, product: &NewProduct) -> Result<Product> {
        let updated: Product = self
            .fetch(self.api.put(&format!("/products/{id}")).json(product), "Failed to update product")
            .await?;
        self.notifications.show_success("Product updated successfully", None);
        Ok(updated)
    }

    #[tracing::instrument(skip(self), err(level = "warn"))]
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.confirm(self.api.delete(&format!("/products/{id}")), "Failed to delete product")
            .await?;
        self.notifications.show_success("Product deleted successfully", None);
        Ok(())
    }

    #[tracing::instrument(skip(self), err(level = "warn"))]
    pub async fn images(&self, product_id: &str) -> Result<Vec<ProductImage>> {
        self.fetch(
            self.api.get(&format!("/products/{product_id}/images")),
            "Failed to fetch product images",
        )
        .await
    }

    /// Uploads one image as a multipart form. The body is a stream, so a
    /// 401 on this call cannot be replayed after a refresh.
    #[tracing::instrument(skip(self, bytes), fields(size = bytes.len()), err(level = "warn"))]
    pub async fn upload_image(
        &self,
        product_id: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<ProductImage> {
        let part = multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = multipart::Form::new().part("imageFile", part);

        let uploaded: ProductImage = self
            .fetch(
                self.api.post(&format!("/products/{product_id}/images")).multipart(form),
                "Failed to upload image",
            )
            .await?;
        self.notifications.show_success("Image uploaded successfully", None);
        Ok(uploaded)
    }

    #[tracing::instrument(skip(self), err(level = "warn"))]
    pub async fn delete_image(&self, product_id: &str, image_id: &str) -> Result<()> {
        self.confirm(
            self.api.delete(&format!("/products/{product_id}/images/{image_id}")),
            "Failed to delete image",
        )
        .await?;
        self.notifications.show_success("Image deleted successfully", None);
        Ok(())
    }

    async fn fetch<T: DeserializeOwned>(&self, builder: RequestBuilder, fallback: &str) -> Result<T> {
        let result = async {
            let response = self.api.send(builder).await?;
            ApiEnvelope::read(response).await?.into_data(fallback)
        }
        .await;

        if let Err(error) = &result {
            self.notifications.show_error(&error.to_string(), None);
        }
        result
    }

    async fn confirm(&self, builder: RequestBuilder, fallback: &str) -> Result<()> {
        let result = async {
            let response = self.api.send(builder).await?;
            let envelope: ApiEnvelope<serde_json::Value> = ApiEnvelope::read(response).await?;
            envelope.into_success(fallback)
        }
        .await;

        if let Err(error) = &result {
            self.notifications.show_error(&error.to_string(), None);
        }
        result
    }
}
