//! In-memory product service for screen and route tests.

#![allow(clippy::unwrap_used)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use bazaar_core::{
    ImageFile, Price, Product, ProductDraft, ProductId, Rating, RatingValue, SearchQuery,
};

use crate::services::{ProductService, ServiceError};

/// One recorded service call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Search(String),
    FetchDetail(String),
    Create { name: String, images: Vec<String> },
    Rate(String, u8),
}

/// A product service that records every call and answers from memory.
#[derive(Default)]
pub struct FakeService {
    calls: Mutex<Vec<Call>>,
    products: Mutex<Vec<Product>>,
    pub fail_search: AtomicBool,
    pub fail_detail: AtomicBool,
    pub fail_create: AtomicBool,
    pub fail_rate: AtomicBool,
}

impl FakeService {
    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            products: Mutex::new(products),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn set(&self, flag: &AtomicBool) {
        flag.store(true, Ordering::SeqCst);
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn find(&self, id: &ProductId) -> Option<Product> {
        self.products
            .lock()
            .unwrap()
            .iter()
            .find(|p| &p.id == id)
            .cloned()
    }
}

/// A product with the given id and name and no ratings.
pub fn product(id: &str, name: &str) -> Product {
    Product {
        id: ProductId::parse(id).unwrap(),
        name: name.to_string(),
        description: format!("{name} description"),
        price: Price::ZERO,
        brand: "Acme".to_string(),
        stock: 1,
        category: "misc".to_string(),
        images: Vec::new(),
        ratings: Vec::new(),
        created_at: None,
    }
}

fn unavailable() -> ServiceError {
    ServiceError::Api {
        status: 503,
        message: "unavailable".to_string(),
    }
}

impl ProductService for FakeService {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Product>, ServiceError> {
        self.record(Call::Search(query.as_str().to_string()));
        if self.fail_search.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        let needle = query.as_str().trim().to_lowercase();
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn fetch_detail(&self, id: &ProductId) -> Result<Product, ServiceError> {
        self.record(Call::FetchDetail(id.to_string()));
        if self.fail_detail.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.find(id)
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))
    }

    async fn create(
        &self,
        draft: &ProductDraft,
        images: &[ImageFile],
    ) -> Result<Product, ServiceError> {
        self.record(Call::Create {
            name: draft.name.clone(),
            images: images.iter().map(|i| i.file_name.clone()).collect(),
        });
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(ServiceError::Validation("rejected".to_string()));
        }
        let mut created = product("new-1", &draft.name);
        created.images = images
            .iter()
            .map(|i| format!("https://cdn.example.com/{}", i.file_name))
            .collect();
        self.products.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn rate(&self, id: &ProductId, value: RatingValue) -> Result<Product, ServiceError> {
        self.record(Call::Rate(id.to_string(), value.get()));
        if self.fail_rate.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        let mut products = self.products.lock().unwrap();
        let product = products
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))?;
        product.ratings.push(Rating {
            value,
            created_at: None,
        });
        Ok(product.clone())
    }
}
