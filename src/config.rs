use serde::Deserialize;

use crate::models::ScoreScale;
use crate::services::prediction::RoundingPolicy;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// PostgreSQL database connection URL; ratings are kept in memory when unset
    #[serde(default)]
    pub database_url: Option<String>,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Email of the reference account whose taste viewers are judged against
    #[serde(default = "default_judge_email")]
    pub judge_email: String,

    /// Lowest accepted score
    #[serde(default = "default_score_min")]
    pub score_min: f64,

    /// Highest accepted score
    #[serde(default = "default_score_max")]
    pub score_max: f64,

    /// Granularity predictions are rounded to; unset keeps the raw average
    #[serde(default)]
    pub score_step: Option<f64>,

    /// Load a small demo data set into the in-memory store
    #[serde(default)]
    pub seed_demo_data: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_judge_email() -> String {
    "the-eye@of-judgment.com".to_string()
}

fn default_score_min() -> f64 {
    1.0
}

fn default_score_max() -> f64 {
    5.0
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if !(self.score_min.is_finite() && self.score_max.is_finite())
            || self.score_min > self.score_max
        {
            anyhow::bail!(
                "Invalid score range: {} to {}",
                self.score_min,
                self.score_max
            );
        }
        Ok(())
    }

    pub fn score_scale(&self) -> ScoreScale {
        ScoreScale::new(self.score_min, self.score_max)
    }

    pub fn rounding(&self) -> RoundingPolicy {
        RoundingPolicy::from_step(self.score_step)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            host: default_host(),
            port: default_port(),
            judge_email: default_judge_email(),
            score_min: default_score_min(),
            score_max: default_score_max(),
            score_step: None,
            seed_demo_data: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_env() {
        let config: Config = envy::from_iter(Vec::<(String, String)>::new()).unwrap();
        assert_eq!(config.database_url, None);
        assert_eq!(config.port, 5000);
        assert_eq!(config.judge_email, "the-eye@of-judgment.com");
        assert_eq!(config.score_scale(), ScoreScale::default());
        assert_eq!(config.rounding(), RoundingPolicy::Exact);
    }

    #[test]
    fn test_score_step_enables_rounding() {
        let vars = vec![
            ("SCORE_STEP".to_string(), "1".to_string()),
            ("SCORE_MAX".to_string(), "10".to_string()),
        ];
        let config: Config = envy::from_iter(vars).unwrap();
        assert_eq!(config.rounding(), RoundingPolicy::NearestStep(1.0));
        assert_eq!(config.score_scale(), ScoreScale::new(1.0, 10.0));
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let config = Config {
            score_min: 5.0,
            score_max: 1.0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
