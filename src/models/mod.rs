pub mod product;
pub mod user;

pub use product::{Product, ProductChanges, ProductInput, ProductUpdate};
pub use user::{PublicUser, Role, User};
