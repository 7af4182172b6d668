use dotenv::dotenv;

const DEFAULT_PAGE_SIZE: usize = 8;

/// Tunables read from the environment, the renderer paginates older
/// versions with `page_size` entries per page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryConfig {
    pub page_size: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        HistoryConfig {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl HistoryConfig {
    pub fn from_env() -> HistoryConfig {
        dotenv().ok();
        let page_size = std::env::var("VERSIONS_PAGE_SIZE")
            .ok()
            .and_then(|raw| raw.parse::<usize>().ok())
            .unwrap_or(DEFAULT_PAGE_SIZE);
        HistoryConfig { page_size }
    }
}
