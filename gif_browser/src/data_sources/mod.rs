pub mod giphy_api;
pub mod search_result;
