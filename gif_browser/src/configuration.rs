#[derive(Clone, Debug)]
pub struct Configuration {
    pub giphy_api_base_url: String,
    pub giphy_api_key: String,
    pub query: String,
}
