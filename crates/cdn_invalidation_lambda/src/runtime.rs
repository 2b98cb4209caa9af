pub use cdn_invalidation_core::{config, contract};
