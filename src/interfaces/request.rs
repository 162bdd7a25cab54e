use super::csv::request_reader::{Command, RequestRecord};
use crate::domain::cart::Quantity;
use crate::domain::catalog::Price;
use crate::domain::ids::{AdminId, CartItemId, CategoryId, CustomerId, ProductId};
use crate::error::StoreError;
use std::str::FromStr;

/// Editable product fields as submitted in a request.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFields {
    pub name: String,
    pub price: Price,
    pub category_id: Option<CategoryId>,
    pub description: Option<String>,
}

/// A validated storefront request.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Register { username: String, password: String },
    Login { username: String, password: String },
    AdminLogin { username: String, password: String },
    Logout { user: String },
    CreateAdmin { user: String, username: String, password: String },
    DeleteAdmin { user: String, admin_id: AdminId },
    DeleteCustomer { user: String, customer_id: CustomerId },
    CreateCategory { user: String, name: String },
    RenameCategory { user: String, category_id: CategoryId, name: String },
    DeleteCategory { user: String, category_id: CategoryId },
    CreateProduct { user: String, fields: ProductFields, image: Option<String> },
    EditProduct {
        user: String,
        product_id: ProductId,
        fields: ProductFields,
        image: Option<String>,
    },
    DeleteProduct { user: String, product_id: ProductId },
    AddToCart { user: String, product_id: ProductId, quantity: Quantity },
    UpdateCart { user: String, item_id: CartItemId, quantity: i64 },
    RemoveFromCart { user: String, item_id: CartItemId },
    Checkout { user: String, address: String, phone_number: String },
}

fn required(value: Option<String>, field: &str) -> Result<String, StoreError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| StoreError::ValidationError(format!("Missing {field}")))
}

fn parse<T: FromStr>(value: Option<String>, field: &str) -> Result<T, StoreError> {
    let raw = required(value, field)?;
    raw.parse()
        .map_err(|_| StoreError::ValidationError(format!("Invalid {field} '{raw}'")))
}

fn parse_optional<T: FromStr>(value: Option<String>, field: &str) -> Result<Option<T>, StoreError> {
    match value.filter(|v| !v.is_empty()) {
        Some(raw) => parse(Some(raw), field).map(Some),
        None => Ok(None),
    }
}

fn product_fields(
    name: Option<String>,
    price: Option<String>,
    category: Option<String>,
    description: Option<String>,
) -> Result<ProductFields, StoreError> {
    let price: Price = required(price, "price")?.parse()?;
    Ok(ProductFields {
        name: required(name, "product name")?,
        price,
        category_id: parse_optional(category, "category id")?,
        description: description.filter(|d| !d.is_empty()),
    })
}

impl TryFrom<RequestRecord> for Request {
    type Error = StoreError;

    fn try_from(record: RequestRecord) -> Result<Self, Self::Error> {
        let RequestRecord {
            command,
            user,
            arg1,
            arg2,
            arg3,
            arg4,
            arg5,
            arg6,
        } = record;
        let session_user = || required(user.clone(), "user");

        let request = match command {
            Command::Register => Self::Register {
                username: required(arg1, "username")?,
                password: required(arg2, "password")?,
            },
            Command::Login => Self::Login {
                username: required(arg1, "username")?,
                password: required(arg2, "password")?,
            },
            Command::AdminLogin => Self::AdminLogin {
                username: required(arg1, "username")?,
                password: required(arg2, "password")?,
            },
            Command::Logout => Self::Logout { user: session_user()? },
            Command::CreateAdmin => Self::CreateAdmin {
                user: session_user()?,
                username: required(arg1, "username")?,
                password: required(arg2, "password")?,
            },
            Command::DeleteAdmin => Self::DeleteAdmin {
                user: session_user()?,
                admin_id: parse(arg1, "admin id")?,
            },
            Command::DeleteCustomer => Self::DeleteCustomer {
                user: session_user()?,
                customer_id: parse(arg1, "customer id")?,
            },
            Command::CreateCategory => Self::CreateCategory {
                user: session_user()?,
                name: required(arg1, "category name")?,
            },
            Command::RenameCategory => Self::RenameCategory {
                user: session_user()?,
                category_id: parse(arg1, "category id")?,
                name: required(arg2, "category name")?,
            },
            Command::DeleteCategory => Self::DeleteCategory {
                user: session_user()?,
                category_id: parse(arg1, "category id")?,
            },
            Command::CreateProduct => Self::CreateProduct {
                user: session_user()?,
                fields: product_fields(arg1, arg2, arg3, arg4)?,
                image: arg5.filter(|path| !path.is_empty()),
            },
            Command::EditProduct => Self::EditProduct {
                user: session_user()?,
                product_id: parse(arg1, "product id")?,
                fields: product_fields(arg2, arg3, arg4, arg5)?,
                image: arg6.filter(|path| !path.is_empty()),
            },
            Command::DeleteProduct => Self::DeleteProduct {
                user: session_user()?,
                product_id: parse(arg1, "product id")?,
            },
            Command::AddToCart => Self::AddToCart {
                user: session_user()?,
                product_id: parse(arg1, "product id")?,
                quantity: match parse_optional::<u32>(arg2, "quantity")? {
                    Some(n) => Quantity::new(n)?,
                    None => Quantity::ONE,
                },
            },
            Command::UpdateCart => Self::UpdateCart {
                user: session_user()?,
                item_id: parse(arg1, "cart item id")?,
                quantity: parse(arg2, "quantity")?,
            },
            Command::RemoveFromCart => Self::RemoveFromCart {
                user: session_user()?,
                item_id: parse(arg1, "cart item id")?,
            },
            Command::Checkout => Self::Checkout {
                user: session_user()?,
                address: required(arg1, "address")?,
                phone_number: required(arg2, "phone number")?,
            },
        };
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn record(command: Command, user: Option<&str>, args: &[&str]) -> RequestRecord {
        let arg = |i: usize| args.get(i).map(|s| s.to_string());
        RequestRecord {
            command,
            user: user.map(str::to_string),
            arg1: arg(0),
            arg2: arg(1),
            arg3: arg(2),
            arg4: arg(3),
            arg5: arg(4),
            arg6: arg(5),
        }
    }

    #[test]
    fn test_add_to_cart_defaults_to_one() {
        let request = Request::try_from(record(Command::AddToCart, Some("alice"), &["4"])).unwrap();
        assert_eq!(
            request,
            Request::AddToCart {
                user: "alice".to_string(),
                product_id: ProductId(4),
                quantity: Quantity::ONE,
            }
        );
    }

    #[test]
    fn test_add_to_cart_rejects_zero_and_text() {
        assert!(matches!(
            Request::try_from(record(Command::AddToCart, Some("alice"), &["4", "0"])),
            Err(StoreError::ValidationError(_))
        ));
        assert!(matches!(
            Request::try_from(record(Command::AddToCart, Some("alice"), &["4", "many"])),
            Err(StoreError::ValidationError(_))
        ));
    }

    #[test]
    fn test_update_cart_accepts_non_positive_quantity() {
        let request =
            Request::try_from(record(Command::UpdateCart, Some("alice"), &["9", "-2"])).unwrap();
        assert_eq!(
            request,
            Request::UpdateCart {
                user: "alice".to_string(),
                item_id: CartItemId(9),
                quantity: -2,
            }
        );
    }

    #[test]
    fn test_create_product_parses_fields() {
        let request = Request::try_from(record(
            Command::CreateProduct,
            Some("admin"),
            &["Apple", "0.45", "2", "Crisp", ""],
        ))
        .unwrap();
        assert_eq!(
            request,
            Request::CreateProduct {
                user: "admin".to_string(),
                fields: ProductFields {
                    name: "Apple".to_string(),
                    price: Price::new(dec!(0.45)).unwrap(),
                    category_id: Some(CategoryId(2)),
                    description: Some("Crisp".to_string()),
                },
                image: None,
            }
        );
    }

    #[test]
    fn test_edit_product_takes_optional_image() {
        let request = Request::try_from(record(
            Command::EditProduct,
            Some("admin"),
            &["3", "Apple", "0.60", "", "", "/tmp/new apple.png"],
        ))
        .unwrap();
        let Request::EditProduct { product_id, fields, image, .. } = request else {
            panic!("expected an edit_product request");
        };
        assert_eq!(product_id, ProductId(3));
        assert_eq!(fields.category_id, None);
        assert_eq!(image.as_deref(), Some("/tmp/new apple.png"));

        let request = Request::try_from(record(
            Command::EditProduct,
            Some("admin"),
            &["3", "Apple", "0.60"],
        ))
        .unwrap();
        assert!(matches!(request, Request::EditProduct { image: None, .. }));
    }

    #[test]
    fn test_non_numeric_price_is_validation_error() {
        let result =
            Request::try_from(record(Command::CreateProduct, Some("admin"), &["Apple", "cheap"]));
        assert!(matches!(result, Err(StoreError::ValidationError(_))));
    }

    #[test]
    fn test_session_commands_require_user() {
        let result = Request::try_from(record(Command::Checkout, None, &["1 Main St", "555"]));
        assert!(matches!(result, Err(StoreError::ValidationError(_))));
    }
}
