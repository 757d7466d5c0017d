//! # Repository Module
//!
//! Database repository implementations for the kiosk.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  HTTP handler                                                           │
//! │       │                                                                 │
//! │       │  db.catalog().load()          db.orders().create(&order)        │
//! │       ▼                                    │                            │
//! │  CatalogRepository                  OrderRepository (OrderSink)         │
//! │  ├── load()  (one read tx)          ├── create()  (one write tx)        │
//! │  └── upsert_coffee/size/...         ├── get(id)                         │
//! │                                     └── count() / count_customers()     │
//! │       │                                    │                            │
//! │       └──────────────┬─────────────────────┘                            │
//! │                      ▼                                                  │
//! │               SQLite Database                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CatalogRepository`](catalog::CatalogRepository) - Menu snapshot and menu upserts
//! - [`OrderRepository`](order::OrderRepository) - Transactional order writes

pub mod catalog;
pub mod order;
