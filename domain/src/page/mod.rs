//! Pages and their identity.
//!
//! - [`identity`]: URL normalization and the stable `url_hash` page key
//! - [`entities::PageRecord`]: per-page state owned by the session

pub mod entities;
pub mod identity;
