//! Turning the model's free-form answer into a [`DocumentAnalysis`].

use crate::models::DocumentAnalysis;
use serde_json::{Map, Value};

pub const FALLBACK_DOCUMENT_TYPE: &str = "Analysis Complete";
pub const FALLBACK_RECOMMENDATION: &str = "Please review the analysis above";

/// The model is asked for JSON but is free to answer in prose.
#[derive(Debug, Clone, PartialEq)]
pub enum LlmReply {
    Structured(DocumentAnalysis),
    RawText(String),
}

impl LlmReply {
    pub fn parse(text: &str) -> Self {
        match serde_json::from_str::<DocumentAnalysis>(text) {
            Ok(analysis) => LlmReply::Structured(analysis),
            Err(e) => {
                log::warn!("LLM reply is not the requested JSON shape: {}", e);
                LlmReply::RawText(text.to_string())
            }
        }
    }

    pub fn into_analysis(self) -> DocumentAnalysis {
        match self {
            LlmReply::Structured(analysis) => analysis,
            LlmReply::RawText(raw) => fallback_analysis(&raw),
        }
    }
}

pub fn fallback_analysis(raw: &str) -> DocumentAnalysis {
    let mut extracted_data = Map::new();
    extracted_data.insert("analysis".to_string(), Value::String(raw.to_string()));

    DocumentAnalysis {
        document_type: FALLBACK_DOCUMENT_TYPE.to_string(),
        extracted_data,
        issues: Vec::new(),
        recommendations: vec![FALLBACK_RECOMMENDATION.to_string()],
        extra: Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_structured_reply_round_trips_verbatim() {
        let raw = r#"{"documentType":"Cadastral Record","extractedData":{"Foglio":"12","Particella":"34"},"issues":["Planimetria non aggiornata"],"recommendations":["Verify with registry"]}"#;

        let analysis = LlmReply::parse(raw).into_analysis();
        assert_eq!(analysis.document_type, "Cadastral Record");
        assert_eq!(
            serde_json::to_value(&analysis).unwrap(),
            serde_json::from_str::<Value>(raw).unwrap()
        );
    }

    #[test]
    fn test_extra_keys_and_nested_values_are_kept() {
        let raw = json!({
            "documentType": "Energy Certificate",
            "extractedData": {"classe": "G", "consumi": {"kwh": 175.3}},
            "issues": [],
            "recommendations": [],
            "confidence": 0.8
        });

        let analysis = LlmReply::parse(&raw.to_string()).into_analysis();
        assert_eq!(serde_json::to_value(&analysis).unwrap(), raw);
    }

    #[test]
    fn test_prose_reply_uses_fallback() {
        let raw = "This appears to be a title deed for a property in Puglia.";

        let reply = LlmReply::parse(raw);
        assert_eq!(reply, LlmReply::RawText(raw.to_string()));

        let analysis = reply.into_analysis();
        assert_eq!(analysis.document_type, "Analysis Complete");
        assert_eq!(analysis.extracted_data.get("analysis"), Some(&json!(raw)));
        assert!(analysis.issues.is_empty());
        assert_eq!(analysis.recommendations, vec!["Please review the analysis above"]);
    }

    #[test]
    fn test_json_of_the_wrong_shape_uses_fallback() {
        for raw in [
            "[1, 2, 3]",
            r#"{"summary": "no document type here"}"#,
            "```json\n{\"documentType\":\"Title Deed\"}\n```",
            "",
        ] {
            let analysis = LlmReply::parse(raw).into_analysis();
            assert_eq!(analysis.document_type, FALLBACK_DOCUMENT_TYPE, "input: {:?}", raw);
            assert_eq!(analysis.extracted_data.get("analysis"), Some(&json!(raw)));
            assert!(!analysis.recommendations.is_empty());
        }
    }
}
