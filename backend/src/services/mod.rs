pub mod item_service;
pub mod price_change_service;
pub mod price_service;
pub mod summary_cache;
pub mod summary_service;
