use std::path::PathBuf;

use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding the vocabulary, archetype and recommendation files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Group-size buckets to load catalogues for
    #[serde(default = "default_group_sizes")]
    pub group_sizes: Vec<usize>,

    /// Extra eating-time labels dropped before aggregation (e.g. "Lunch")
    #[serde(default)]
    pub eating_time_exclusions: Vec<String>,

    /// How many items the top-rated endpoint returns
    #[serde(default = "default_top_rated_limit")]
    pub top_rated_limit: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_group_sizes() -> Vec<usize> {
    vec![5, 8]
}

fn default_top_rated_limit() -> usize {
    5
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_iter(std::env::vars())
    }

    fn from_iter<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = envy::from_iter::<_, Config>(vars)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

        if config.group_sizes.is_empty() {
            anyhow::bail!("GROUP_SIZES must name at least one group size");
        }
        if config.group_sizes.contains(&0) {
            anyhow::bail!("GROUP_SIZES must not contain 0");
        }

        Ok(config)
    }

    /// Socket address the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
