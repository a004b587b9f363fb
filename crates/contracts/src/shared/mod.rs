pub mod crud;
pub mod error;
pub mod paging;
pub mod transform;
