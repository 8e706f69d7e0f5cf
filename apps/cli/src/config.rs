//! Application-level configuration loading. The core never reads the
//! environment or filesystem itself (`SPEC_FULL.md` §6) — this module is the
//! wiring that turns `fhirloom.toml` / `FHIRLOOM_*` env vars / `.env` into a
//! populated [`ConversionConfig`], mirroring `apps/server`'s `config` +
//! `dotenvy` dependency pair.

use fhirloom_engine::ConversionConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default = "default_supported_messages")]
    pub supported_messages: Vec<String>,
    #[serde(default = "default_version")]
    pub default_version: String,
    #[serde(default = "default_max_depth")]
    pub max_template_depth: u32,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let settings = config::Config::builder()
            .add_source(config::File::with_name("fhirloom").required(false))
            .add_source(config::Environment::with_prefix("FHIRLOOM").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn into_conversion_config(self) -> ConversionConfig {
        ConversionConfig {
            supported_messages: self.supported_messages,
            default_version: self.default_version,
            max_template_depth: self.max_template_depth,
        }
    }
}

fn default_supported_messages() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_version() -> String {
    "2.6".to_string()
}

fn default_max_depth() -> u32 {
    32
}
