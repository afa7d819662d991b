//! Domain models shared between server and clients

pub mod flow;
pub mod order;
pub mod product;
pub mod shop;
pub mod tag;
pub mod user;

pub use flow::{OrderStatusConfig, OrderStatusFlow, StatusTransition};
pub use order::{
    Order, OrderCreate, OrderItem, OrderItemCreate, OrderItemOption, OrderQuery, OrderStatusLog,
    OrderTransition, OrderUpdate,
};
pub use product::{
    OptionCategoryCreate, OptionCreate, Product, ProductCreate, ProductOption,
    ProductOptionCategory, ProductQuery, ProductStatus, ProductUpdate,
};
pub use shop::{Shop, ShopCreate, ShopUpdate};
pub use tag::{ProductTagsUpdate, Tag, TagCreate, TagUpdate};
pub use user::{User, UserCreate, UserUpdate};
