use thiserror::Error;

#[derive(Error, Debug)]
pub enum LivmapError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Geocoding API error: {0}")]
    Api(String),

    #[error("Missing column '{column}' in {table} file")]
    MissingColumn { table: String, column: String },

    #[error("Cache snapshot error: {0}")]
    Snapshot(String),
}
