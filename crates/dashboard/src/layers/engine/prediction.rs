use gemini_client::{Content, GenerateContentRequest, GenerationConfig, GeminiError, ModelBackend};
use protocol::{clamp_probability, PredictionRequest, PredictionResult, RiskLevel};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub(crate) enum DecodeError {
    #[error("model returned no text")]
    Empty,
    #[error("payload does not match the forecast schema: {0}")]
    Schema(#[from] serde_json::Error),
    #[error("probability is not a finite number")]
    Probability,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum PredictionError {
    #[error(transparent)]
    Remote(#[from] GeminiError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ForecastPayload {
    location: String,
    risk_level: RiskLevel,
    probability: f64,
    factors: Vec<String>,
    recommended_action: String,
}

pub(crate) fn build_prompt(request: &PredictionRequest) -> String {
    format!(
        "Act as the \"Predictive Analytics Engine\" described in the SIH Problem Statement.\n\
Analyze the risk of cash withdrawal fraud for the following parameters:\n\
- Location: {}\n\
- Time of Day: {}\n\
- ATM/Bank Density: {}\n\n\
Based on patterns typical of cybercrime (e.g., late night withdrawals in high-density anonymous areas), generate a JSON risk assessment.\n",
        request.location.trim(),
        request.time_of_day.trim(),
        request.density_description.trim(),
    )
}

pub(crate) fn prediction_schema() -> Value {
    let levels: Vec<&str> = RiskLevel::ALL.iter().map(|level| level.as_str()).collect();
    json!({
        "type": "OBJECT",
        "properties": {
            "location": { "type": "STRING" },
            "riskLevel": { "type": "STRING", "enum": levels },
            "probability": { "type": "NUMBER", "description": "Percentage probability 0-100" },
            "factors": { "type": "ARRAY", "items": { "type": "STRING" } },
            "recommendedAction": { "type": "STRING" }
        },
        "required": ["location", "riskLevel", "probability", "factors", "recommendedAction"]
    })
}

pub(crate) fn build_request(request: &PredictionRequest) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content::user(build_prompt(request))],
        system_instruction: None,
        generation_config: Some(GenerationConfig::json(prediction_schema())),
    }
}

pub(crate) fn decode_prediction(text: &str) -> Result<PredictionResult, DecodeError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(DecodeError::Empty);
    }
    let payload: ForecastPayload = serde_json::from_str(text)?;
    if !payload.probability.is_finite() {
        return Err(DecodeError::Probability);
    }
    Ok(PredictionResult {
        location: payload.location,
        risk_level: payload.risk_level,
        probability: clamp_probability(payload.probability),
        factors: payload.factors,
        recommended_action: payload.recommended_action,
    })
}

/// A forecast plus where it came from. The fallback record is a valid
/// model answer too, so the origin cannot be recovered from the values.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Forecast {
    pub(crate) result: PredictionResult,
    pub(crate) fallback: bool,
}

impl Forecast {
    pub(crate) fn fallback(location: impl Into<String>) -> Self {
        Self {
            result: PredictionResult::fallback(location),
            fallback: true,
        }
    }
}

#[derive(Clone)]
pub(crate) struct PredictionClient {
    backend: Arc<dyn ModelBackend>,
}

impl PredictionClient {
    pub(crate) fn new(backend: Arc<dyn ModelBackend>) -> Self {
        Self { backend }
    }

    pub(crate) async fn predict(&self, request: &PredictionRequest) -> Forecast {
        match self.try_predict(request).await {
            Ok(result) => {
                tracing::info!(
                    event = "prediction_ready",
                    location = %request.location,
                    risk_level = %result.risk_level,
                    probability = result.probability,
                );
                Forecast {
                    result,
                    fallback: false,
                }
            }
            Err(err) => {
                tracing::warn!(
                    event = "prediction_fallback",
                    location = %request.location,
                    error = %err,
                );
                Forecast::fallback(request.location.clone())
            }
        }
    }

    async fn try_predict(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionResult, PredictionError> {
        self.backend.ensure_credentials()?;
        let response = self.backend.generate_content(&build_request(request)).await?;
        let text = response.text().ok_or(DecodeError::Empty)?;
        Ok(decode_prediction(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::engine::testing::ScriptedBackend;
    use gemini_client::GenerateContentResponse;

    fn request() -> PredictionRequest {
        PredictionRequest::new("X", "Y", "Z")
    }

    fn reply(value: Value) -> Result<GenerateContentResponse, GeminiError> {
        Ok(GenerateContentResponse::from_text(value.to_string()))
    }

    fn status(code: u16) -> Result<GenerateContentResponse, GeminiError> {
        Err(GeminiError::Status {
            status: code,
            body: String::new(),
        })
    }

    #[test]
    fn prompt_embeds_all_three_inputs() {
        let prompt = build_prompt(&PredictionRequest::new(
            " Connaught Place ",
            "23:30",
            "High footfall, unmonitored ATMs",
        ));
        assert!(prompt.contains("- Location: Connaught Place\n"));
        assert!(prompt.contains("- Time of Day: 23:30\n"));
        assert!(prompt.contains("- ATM/Bank Density: High footfall, unmonitored ATMs\n"));
    }

    #[test]
    fn request_constrains_output_to_schema() {
        let built = build_request(&request());
        let config = built.generation_config.expect("config");
        assert_eq!(config.response_mime_type.as_deref(), Some("application/json"));
        let schema = config.response_schema.expect("schema");
        assert_eq!(
            schema["properties"]["riskLevel"]["enum"],
            json!(["Low", "Medium", "High", "Critical"])
        );
        assert_eq!(schema["required"].as_array().map(Vec::len), Some(5));
    }

    #[test]
    fn decode_clamps_probability() {
        let text = json!({
            "location": "Pune",
            "riskLevel": "High",
            "probability": 130,
            "factors": ["late night"],
            "recommendedAction": "Patrol"
        })
        .to_string();
        let result = decode_prediction(&text).expect("decode");
        assert_eq!(result.probability, 100.0);
        assert_eq!(result.risk_level, RiskLevel::High);
    }

    #[test]
    fn decode_rejects_contract_violations() {
        let unknown_level = json!({
            "location": "Pune", "riskLevel": "Severe", "probability": 20,
            "factors": [], "recommendedAction": "Patrol"
        });
        let missing_action = json!({
            "location": "Pune", "riskLevel": "Low", "probability": 20, "factors": []
        });
        let wrong_type = json!({
            "location": "Pune", "riskLevel": "Low", "probability": "twenty",
            "factors": [], "recommendedAction": "Patrol"
        });
        for payload in [unknown_level, missing_action, wrong_type] {
            assert!(decode_prediction(&payload.to_string()).is_err(), "{payload}");
        }
        assert!(matches!(decode_prediction("  "), Err(DecodeError::Empty)));
        assert!(decode_prediction("Sure! Here is the JSON").is_err());
    }

    #[tokio::test]
    async fn successful_reply_is_returned_verbatim() {
        let backend = ScriptedBackend::new(vec![reply(json!({
            "location": "Connaught Place",
            "riskLevel": "Critical",
            "probability": 91.5,
            "factors": ["Late night", "Anonymous ATM cluster"],
            "recommendedAction": "Alert nearby branches"
        }))]);
        let client = PredictionClient::new(backend.clone());

        let forecast = client.predict(&request()).await;
        assert!(!forecast.fallback);
        let result = forecast.result;
        assert_eq!(result.location, "Connaught Place");
        assert_eq!(result.risk_level, RiskLevel::Critical);
        assert_eq!(result.probability, 91.5);
        assert_eq!(result.factors.len(), 2);

        let sent = backend.requests();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contents[0].joined_text().contains("- Location: X"));
    }

    #[tokio::test]
    async fn every_failure_path_yields_the_fallback() {
        let failures = vec![
            status(500),
            status(403),
            Ok(GenerateContentResponse::default()),
            reply(json!({"location": "X", "riskLevel": "Unknown", "probability": 10,
                          "factors": [], "recommendedAction": "n/a"})),
            reply(json!({"location": "X"})),
        ];
        let count = failures.len();
        let client = PredictionClient::new(ScriptedBackend::new(failures));
        for _ in 0..count {
            assert_eq!(client.predict(&request()).await, Forecast::fallback("X"));
        }
    }

    #[tokio::test]
    async fn missing_credentials_skip_the_remote_call() {
        let backend = ScriptedBackend::without_credentials();
        let client = PredictionClient::new(backend.clone());
        let forecast = client.predict(&request()).await;
        assert_eq!(forecast, Forecast::fallback("X"));
        assert!(backend.requests().is_empty());
    }

    #[tokio::test]
    async fn model_answer_equal_to_fallback_values_is_not_a_fallback() {
        let backend = ScriptedBackend::new(vec![reply(json!({
            "location": "X",
            "riskLevel": "Medium",
            "probability": 50,
            "factors": ["Data unavailable", "Using heuristic fallback"],
            "recommendedAction": "Monitor manually"
        }))]);
        let client = PredictionClient::new(backend.clone());
        let forecast = client.predict(&request()).await;
        assert_eq!(forecast.result, PredictionResult::fallback("X"));
        assert!(!forecast.fallback);
        assert_eq!(backend.requests().len(), 1);
    }

    #[tokio::test]
    async fn fallback_is_identical_across_calls() {
        let client = PredictionClient::new(ScriptedBackend::new(vec![status(503), status(503)]));
        let first = client.predict(&request()).await.result;
        let second = client.predict(&request()).await.result;
        assert_eq!(
            serde_json::to_vec(&first).expect("serialize"),
            serde_json::to_vec(&second).expect("serialize")
        );
        assert_eq!(
            serde_json::to_value(&first).expect("value"),
            json!({
                "location": "X",
                "riskLevel": "Medium",
                "probability": 50.0,
                "factors": ["Data unavailable", "Using heuristic fallback"],
                "recommendedAction": "Monitor manually"
            })
        );
    }
}
