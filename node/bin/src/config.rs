use std::path::Path;

use anyhow::Context as _;
use smart_config::{ConfigRepository, ConfigSchema, DescribeConfig as _, Environment, Yaml};
use zkagg_aggregation::AggregationConfig;
use zkagg_observability::ObservabilityConfig;

/// Prefix of environment variables overriding the YAML config, e.g.
/// `ZKAGG_AGGREGATION_VERIFIER_ID`.
const ENV_PREFIX: &str = "ZKAGG_";

#[derive(Debug, Clone)]
pub struct Config {
    pub aggregation: AggregationConfig,
    pub observability: ObservabilityConfig,
}

fn schema() -> anyhow::Result<ConfigSchema> {
    let mut schema = ConfigSchema::default();
    schema.insert(&AggregationConfig::DESCRIPTION, "aggregation")?;
    schema.insert(&ObservabilityConfig::DESCRIPTION, "observability")?;
    Ok(schema)
}

/// Loads the config from an optional YAML file, then environment variables.
pub fn load(yaml_path: Option<&Path>) -> anyhow::Result<Config> {
    let schema = schema()?;
    let mut repo = ConfigRepository::new(&schema);
    if let Some(path) = yaml_path {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        let mapping: serde_yaml::Mapping = serde_yaml::from_str(&contents)
            .with_context(|| format!("config file {} is not a YAML mapping", path.display()))?;
        repo = repo.with(Yaml::new(&path.display().to_string(), mapping)?);
    }
    repo = repo.with(Environment::prefixed(ENV_PREFIX));

    let aggregation = repo
        .single::<AggregationConfig>()?
        .parse()
        .context("invalid aggregation config")?;
    let observability = repo
        .single::<ObservabilityConfig>()?
        .parse()
        .context("invalid observability config")?;
    Ok(Config {
        aggregation,
        observability,
    })
}
