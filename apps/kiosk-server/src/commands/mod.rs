//! # Commands Module
//!
//! Every handler exposed over HTTP.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (exports)
//! ├── catalog.rs  ◄─── Menu snapshot + write token
//! ├── cart.rs     ◄─── Cart manipulation
//! ├── checkout.rs ◄─── Single-drink order placement
//! └── health.rs   ◄─── Database and migration status
//! ```
//!
//! ## State Injection
//! Each handler declares only the state it needs:
//! ```rust,ignore
//! // Only needs the database
//! async fn get_catalog(State(db): State<Database>, session: Session)
//!
//! // Needs the database and the carts
//! async fn add_line(State(db): State<Database>, State(carts): State<SessionCarts>, ...)
//! ```

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod health;
