//! Domain models and API payload shapes.

pub mod address;
pub mod cart;
pub mod category;
pub mod order;
pub mod product;
pub mod user;

pub use address::{Address, AddressInput};
pub use cart::{CartItem, CartSelection, NewCartItem};
pub use category::Category;
pub use order::{
    NewOrder, NewOrderItem, Order, OrderDetails, OrderItem, OrderItemView, OrderSummary,
    OrderWithItems, ShippingAddress, StockDecrement,
};
pub use product::{ColorLink, Product, ProductInput};
pub use user::{AdminUserUpdate, Claims, NewUser, User, customer_display_name};
