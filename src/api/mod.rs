pub mod extract;
pub mod pagination;

pub use extract::{parse_id, JsonBody};
pub use pagination::{parse_or, ListMeta, Page, PageParams};
