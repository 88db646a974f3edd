use roomroast::{payload::ImagePayload, Intensity, RoastRequest, RoastResult, Score};

use crate::{
    config::{Config, LimitsConfig},
    errors::{Stage, WebError, WebResult},
    inference::{GenerateOptions, GenerateRequest, InferenceError, OllamaClient},
};

pub const VISION_PROMPT: &str = "Describe this room in detail. List specific objects visible, clutter level, aesthetic choices, and any questionable design decisions.";

/// Build the roast prompt for an intensity around a room description.
pub fn prompt_for(intensity: Intensity, description: &str) -> String {
    let persona = match intensity {
        Intensity::Gentle => "You are a witty, friendly interior design critic. Give a funny but kind 2-3 sentence roast of this room. End with one compliment.",
        Intensity::Medium => "You are a savage-but-fair design comedian. Roast this room with sharp wit in 3-4 sentences. Be specific.",
        Intensity::Savage => "You are brutally honest with zero filter. Tear apart this room in 4-5 sentences of pure comedic ruthlessness.",
    };
    format!("{}\n\nRoom: \"{}\"", persona, description)
}

pub fn temperature_for(intensity: Intensity) -> f64 {
    match intensity {
        Intensity::Savage => 0.9,
        Intensity::Gentle | Intensity::Medium => 0.7,
    }
}

/// The three fixed scores shown next to a roast.
pub fn scores_for(intensity: Intensity) -> Vec<Score> {
    let (chaos, vibe, survival) = match intensity {
        Intensity::Gentle => (4, 7, 6),
        Intensity::Medium => (6, 5, 4),
        Intensity::Savage => (9, 2, 1),
    };
    vec![
        Score::new("Chaos Level", chaos),
        Score::new("Vibe Check", vibe),
        Score::new("Survival Odds", survival),
    ]
}

/// Check the image in a request and strip its data-URL header.
pub fn validate_image<'a>(image: &'a str, limits: &LimitsConfig) -> WebResult<ImagePayload<'a>> {
    if image.trim().is_empty() {
        return Err(WebError::InvalidInput("No image provided".into()));
    }
    let payload = ImagePayload::parse(image);
    if payload.data.trim().is_empty() {
        return Err(WebError::InvalidInput("No image provided".into()));
    }
    if let Some(mime) = payload.mime_type() {
        if !mime.starts_with("image/") {
            return Err(WebError::InvalidInput("Please select an image file".into()));
        }
    }
    if payload.decoded_len() > limits.max_image_bytes {
        return Err(image_too_large(limits));
    }
    Ok(payload)
}

pub fn image_too_large(limits: &LimitsConfig) -> WebError {
    WebError::InvalidInput(format!(
        "Image too large. Please select an image under {}MB",
        limits.max_image_bytes.div_ceil(1024 * 1024)
    ))
}

fn stage_error(stage: Stage, err: InferenceError) -> WebError {
    match err {
        InferenceError::Decode(e) => {
            WebError::Internal(anyhow::Error::new(e).context(format!("Reading {} model reply", stage)))
        }
        other => WebError::Upstream {
            stage,
            body: other.to_string(),
        },
    }
}

/// First stage: ask the vision model what is in the picture.
pub async fn describe_room(
    client: &OllamaClient,
    config: &Config,
    base64_image: &str,
) -> WebResult<String> {
    tracing::info!(model = %config.inference.vision_model, "Calling vision model");
    let request = GenerateRequest::new(&config.inference.vision_model, VISION_PROMPT)
        .with_image(base64_image);
    let description = client
        .generate(&request)
        .await
        .map_err(|e| stage_error(Stage::Vision, e))?;
    tracing::debug!(
        "Room description: {}...",
        description.chars().take(100).collect::<String>()
    );
    Ok(description)
}

/// Second stage: turn the description into a roast.
pub async fn generate_roast(
    client: &OllamaClient,
    config: &Config,
    intensity: Intensity,
    description: &str,
) -> WebResult<String> {
    tracing::info!(model = %config.inference.text_model, %intensity, "Calling text model");
    let prompt = prompt_for(intensity, description);
    let request =
        GenerateRequest::new(&config.inference.text_model, &prompt).with_options(GenerateOptions {
            temperature: temperature_for(intensity),
            num_predict: config.inference.num_predict,
        });
    let roast = client
        .generate(&request)
        .await
        .map_err(|e| stage_error(Stage::Text, e))?;
    Ok(roast.trim().to_string())
}

/// Describe the room, roast it, and score it.
///
/// The two model calls run strictly one after the other. If either fails the whole
/// request fails; nothing from the vision stage is returned on its own.
pub async fn roast_room(
    client: &OllamaClient,
    config: &Config,
    request: RoastRequest,
) -> WebResult<RoastResult> {
    tracing::info!(
        intensity = ?request.intensity,
        image_length = request.image.len(),
        "Received roast request"
    );
    let payload = validate_image(&request.image, &config.limits)?;
    let intensity = Intensity::from_label(request.intensity.as_deref());
    let label: &'static str = intensity.into();
    if request.intensity.as_deref() != Some(label) {
        tracing::warn!(requested = ?request.intensity, "Falling back to {} intensity", label);
    }

    let description = describe_room(client, config, payload.data).await?;
    let roast = generate_roast(client, config, intensity, &description).await?;

    tracing::info!("Roast generated");
    Ok(RoastResult {
        roast,
        scores: scores_for(intensity),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::VariantArray;

    #[test]
    fn gentle_prompt_is_verbatim() {
        assert_eq!(
            prompt_for(Intensity::Gentle, "a beanbag"),
            "You are a witty, friendly interior design critic. Give a funny but kind 2-3 sentence roast of this room. End with one compliment.\n\nRoom: \"a beanbag\""
        );
    }

    #[test]
    fn medium_and_savage_prompts_are_verbatim() {
        assert_eq!(
            prompt_for(Intensity::Medium, "x"),
            "You are a savage-but-fair design comedian. Roast this room with sharp wit in 3-4 sentences. Be specific.\n\nRoom: \"x\""
        );
        assert_eq!(
            prompt_for(Intensity::Savage, "x"),
            "You are brutally honest with zero filter. Tear apart this room in 4-5 sentences of pure comedic ruthlessness.\n\nRoom: \"x\""
        );
    }

    #[test]
    fn description_is_substituted_untouched() {
        let desc = "a \"vintage\" lamp,\n  three {chairs}";
        assert!(prompt_for(Intensity::Medium, desc).ends_with(&format!("Room: \"{}\"", desc)));
    }

    #[test]
    fn only_savage_runs_hot() {
        assert_eq!(temperature_for(Intensity::Gentle), 0.7);
        assert_eq!(temperature_for(Intensity::Medium), 0.7);
        assert_eq!(temperature_for(Intensity::Savage), 0.9);
    }

    #[test]
    fn score_table() {
        let values = |i| {
            scores_for(i)
                .into_iter()
                .map(|s| (s.label, s.value))
                .collect::<Vec<_>>()
        };
        let labels = ["Chaos Level", "Vibe Check", "Survival Odds"];
        let expect = |v: [u8; 3]| {
            labels
                .iter()
                .map(|l| l.to_string())
                .zip(v)
                .collect::<Vec<_>>()
        };
        assert_eq!(values(Intensity::Gentle), expect([4, 7, 6]));
        assert_eq!(values(Intensity::Medium), expect([6, 5, 4]));
        assert_eq!(values(Intensity::Savage), expect([9, 2, 1]));
    }

    #[test]
    fn scores_stay_in_range() {
        for intensity in Intensity::VARIANTS {
            let scores = scores_for(*intensity);
            assert_eq!(scores.len(), 3);
            assert!(scores.iter().all(|s| s.value <= 10));
        }
    }

    #[test]
    fn empty_images_are_rejected() {
        let limits = LimitsConfig::default();
        for image in ["", "   ", "data:image/png;base64,"] {
            match validate_image(image, &limits) {
                Err(WebError::InvalidInput(msg)) => assert_eq!(msg, "No image provided"),
                other => panic!("expected invalid input for {:?}, got {:?}", image, other),
            }
        }
    }

    #[test]
    fn non_image_mime_is_rejected() {
        let limits = LimitsConfig::default();
        let err = validate_image("data:application/pdf;base64,JVBERi0=", &limits).unwrap_err();
        assert!(matches!(err, WebError::InvalidInput(ref m) if m == "Please select an image file"));
    }

    #[test]
    fn oversize_images_are_rejected() {
        let limits = LimitsConfig {
            max_image_bytes: 3,
        };
        assert!(validate_image("QUJD", &limits).is_ok());
        let err = validate_image("QUJDRA==", &limits).unwrap_err();
        assert!(matches!(err, WebError::InvalidInput(ref m) if m.starts_with("Image too large")));
    }

    #[test]
    fn prefix_is_stripped_before_forwarding() {
        let payload =
            validate_image("data:image/png;base64,ABC123", &LimitsConfig::default()).unwrap();
        assert_eq!(payload.data, "ABC123");
    }
}
