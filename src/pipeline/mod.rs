//! The listing pipeline.
//!
//! - `normalize`: raw JSON → `{ meta, items }`
//! - `facets`: distinct filter values of a collection
//! - `filter`: predicate composition and display order
//! - `expiry`: end-of-day expiry policy
//! - `render`: items → display records
//! - `publish`: lectures directory → `materials.json`

pub mod expiry;
pub mod facets;
pub mod filter;
pub mod normalize;
pub mod publish;
pub mod render;

pub use expiry::{is_expired, is_expired_at};
pub use facets::{Facets, announcement_facets, material_facets};
pub use filter::{Listable, apply, base_collection, visible_indices};
pub use normalize::normalize;
pub use publish::{MaterialsIndex, PublishSummary, build_index, publish};
