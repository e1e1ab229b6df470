pub mod ai;
pub mod fallback;
