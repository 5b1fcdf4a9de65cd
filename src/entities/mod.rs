//! Database entities for the POS domain.

pub mod product;
pub mod sale;
pub mod sale_item;

pub use product::Entity as Product;
pub use sale::Entity as Sale;
pub use sale_item::Entity as SaleItem;

pub use product::Model as ProductModel;
pub use sale::Model as SaleModel;
pub use sale_item::Model as SaleItemModel;
