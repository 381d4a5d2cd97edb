pub mod cart;
pub mod notification;
pub mod product;

pub use cart::*;
pub use notification::*;
pub use product::*;
