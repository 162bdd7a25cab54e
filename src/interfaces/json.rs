use crate::domain::catalog::{Category, Product};
use crate::domain::ids::{CategoryId, ProductId};
use crate::error::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

/// Public listing shape of a product. Prices are plain JSON numbers.
#[derive(Debug, Serialize)]
pub struct ProductRecord<'a> {
    pub product_id: ProductId,
    pub product_name: &'a str,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub product_price: Decimal,
    pub description: Option<&'a str>,
    pub category_id: Option<CategoryId>,
    pub image_path: Option<&'a str>,
}

impl<'a> From<&'a Product> for ProductRecord<'a> {
    fn from(product: &'a Product) -> Self {
        Self {
            product_id: product.id,
            product_name: &product.name,
            product_price: product.price.value(),
            description: product.description.as_deref(),
            category_id: product.category_id,
            image_path: product.image_path.as_deref(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryRecord<'a> {
    pub id: CategoryId,
    pub name: &'a str,
}

impl<'a> From<&'a Category> for CategoryRecord<'a> {
    fn from(category: &'a Category) -> Self {
        Self {
            id: category.id,
            name: &category.name,
        }
    }
}

pub fn write_products<W: Write>(mut sink: W, products: &[Product]) -> Result<()> {
    let records: Vec<ProductRecord<'_>> = products.iter().map(ProductRecord::from).collect();
    serde_json::to_writer_pretty(&mut sink, &records)?;
    writeln!(sink)?;
    Ok(())
}

pub fn write_categories<W: Write>(mut sink: W, categories: &[Category]) -> Result<()> {
    let records: Vec<CategoryRecord<'_>> = categories.iter().map(CategoryRecord::from).collect();
    serde_json::to_writer_pretty(&mut sink, &records)?;
    writeln!(sink)?;
    Ok(())
}
