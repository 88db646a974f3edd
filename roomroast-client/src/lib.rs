use std::path::Path;

use anyhow::{anyhow, bail, ensure, Context, Result};
use roomroast::{
    payload::{to_data_url, MAX_IMAGE_BYTES},
    ErrorBody, InferenceStatus, Intensity, RoastRequest, RoastResult,
};

/// Read an image from disk and turn it into the data URL the server expects.
///
/// Files over 10MB, and files whose contents are not a recognised image format,
/// are rejected before anything is sent.
pub fn load_image(path: &Path) -> Result<String> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Reading image {}", path.display()))?;
    ensure!(
        bytes.len() <= MAX_IMAGE_BYTES,
        "Image too large. Please select an image under 10MB"
    );
    let format =
        image::guess_format(&bytes).map_err(|_| anyhow!("Please select an image file"))?;
    Ok(to_data_url(format.to_mime_type(), &bytes))
}

/// Talks to a running roomroast server.
pub struct RoastClient {
    http: reqwest::Client,
    server: String,
}

impl RoastClient {
    pub fn new(server: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            server: server.trim_end_matches('/').to_string(),
        }
    }

    /// Upload an image and wait for the roast.
    pub async fn roast(&self, image: String, intensity: Intensity) -> Result<RoastResult> {
        let request = RoastRequest {
            image,
            intensity: Some(intensity.to_string()),
        };
        tracing::info!("Sending {:?} to {}", request, self.server);
        let resp = self
            .http
            .post(format!("{}/api/roast", self.server))
            .json(&request)
            .send()
            .await
            .with_context(|| format!("Connecting to {}", self.server))?;
        if resp.status().is_success() {
            return Ok(resp.json().await.context("Reading roast")?);
        }
        let status = resp.status();
        let text = resp.text().await?;
        match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => {
                tracing::debug!("Server details: {}", body.details);
                bail!("{}", body.error)
            }
            Err(_) => bail!("Failed to roast ({}): {}", status, text),
        }
    }

    /// Ask the server whether its inference backend is reachable.
    pub async fn status(&self) -> Result<InferenceStatus> {
        let resp = self
            .http
            .get(format!("{}/api/status", self.server))
            .send()
            .await
            .with_context(|| format!("Connecting to {}", self.server))?;
        ensure!(
            resp.status().is_success(),
            "Status check failed: {}",
            resp.status()
        );
        Ok(resp.json().await?)
    }
}

/// Format a roast for the terminal, scores as `<label>: <value>/10`.
pub fn render(result: &RoastResult) -> String {
    let mut out = format!("YOUR ROAST\n\n{}\n\n", result.roast);
    for score in &result.scores {
        out.push_str(&format!("{}: {}/10\n", score.label, score.value));
    }
    out
}
