use crate::error::{Result, StoreError};
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Register,
    Login,
    AdminLogin,
    Logout,
    CreateAdmin,
    DeleteAdmin,
    DeleteCustomer,
    CreateCategory,
    RenameCategory,
    DeleteCategory,
    CreateProduct,
    EditProduct,
    DeleteProduct,
    AddToCart,
    UpdateCart,
    RemoveFromCart,
    Checkout,
}

/// One untyped row of a request script.
///
/// `user` names the logged-in session issuing the request; the meaning of the
/// positional arguments depends on `command`.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct RequestRecord {
    pub command: Command,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub arg1: Option<String>,
    #[serde(default)]
    pub arg2: Option<String>,
    #[serde(default)]
    pub arg3: Option<String>,
    #[serde(default)]
    pub arg4: Option<String>,
    #[serde(default)]
    pub arg5: Option<String>,
    #[serde(default)]
    pub arg6: Option<String>,
}

/// Reads request records from a CSV source.
///
/// This reader wraps `csv::Reader` and provides an iterator over `Result<RequestRecord>`.
/// It handles whitespace trimming and short rows automatically.
pub struct RequestReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> RequestReader<R> {
    /// Creates a new `RequestReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes requests.
    pub fn requests(self) -> impl Iterator<Item = Result<RequestRecord>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(StoreError::from))
    }
}
