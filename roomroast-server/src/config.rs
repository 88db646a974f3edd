use std::time::Duration;

use anyhow::Context;
use roomroast::payload::MAX_IMAGE_BYTES;
use serde::Deserialize;

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub inference: InferenceConfig,
    pub limits: LimitsConfig,
}

impl Config {
    /// Load the configuration from a YAML file.
    /// Missing sections and fields keep their defaults.
    pub fn load(yml_path: &str) -> anyhow::Result<Self> {
        let yml = std::fs::read_to_string(yml_path)
            .with_context(|| format!("Reading config file {}", yml_path))?;
        Self::from_yaml(&yml)
    }

    pub fn from_yaml(yml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yml).context("Parsing config")?;
        Ok(config)
    }

    /// Apply overrides from the environment (including `.env`, if loaded).
    pub fn apply_env(mut self) -> anyhow::Result<Self> {
        self.apply_overrides(|key| dotenvy::var(key).ok())?;
        Ok(self)
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if let Some(url) = lookup("ROOMROAST_OLLAMA_URL") {
            self.inference.base_url = url;
        }
        if let Some(model) = lookup("ROOMROAST_VISION_MODEL") {
            self.inference.vision_model = model;
        }
        if let Some(model) = lookup("ROOMROAST_TEXT_MODEL") {
            self.inference.text_model = model;
        }
        if let Some(secs) = lookup("ROOMROAST_TIMEOUT_SECS") {
            self.inference.timeout_secs = secs
                .parse()
                .with_context(|| format!("ROOMROAST_TIMEOUT_SECS is not a number: {}", secs))?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub address: String,
    pub tls: Option<TLSConfig>,
    /// Write JSON logs to a daily rolling file in this directory instead of stdout
    pub log_dir: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:3000".into(),
            tls: None,
            log_dir: None,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct TLSConfig {
    pub cert_path: String,
    pub key_path: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct InferenceConfig {
    /// Where Ollama listens, without the `/api/...` suffix
    pub base_url: String,
    pub vision_model: String,
    pub text_model: String,
    /// Upper bound on each call to the inference server
    pub timeout_secs: u64,
    /// Token budget for the roast
    pub num_predict: u32,
}

impl InferenceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".into(),
            vision_model: "moondream".into(),
            text_model: "qwen2.5:3b".into(),
            timeout_secs: 60,
            num_predict: 150,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_image_bytes: usize,
}

impl LimitsConfig {
    /// Largest request body that can still carry a maximal image.
    /// Base64 grows the image by 4/3; the rest is room for the JSON around it.
    pub fn max_body_bytes(&self) -> usize {
        self.max_image_bytes / 3 * 4 + 64 * 1024
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_image_bytes: MAX_IMAGE_BYTES,
        }
    }
}
