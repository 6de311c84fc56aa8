use serde::{Deserialize, Serialize};

/// Response of `/v2/translate`
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslateResult {
    /// One entry per segment, in the order the provider returned them
    pub translations: Vec<Translation>,
}

/// A translated segment
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    /// Language the provider detected in the input
    pub detected_source_language: String,
    /// Translated text
    pub text: String,
}

impl TranslateResult {
    /// Translated texts, in order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.translations.iter().map(|t| t.text.as_str())
    }

    /// The first segment, which for a single sentence is the whole translation
    pub fn first(&self) -> Option<&Translation> {
        self.translations.first()
    }
}

#[test]
fn test_decode_translate_response() {
    let body = r#"{"translations":[{"detected_source_language":"EN","text":"こんにちは"}]}"#;
    let res: TranslateResult = serde_json::from_str(body).unwrap();

    assert_eq!(
        res.first(),
        Some(&Translation {
            detected_source_language: "EN".to_string(),
            text: "こんにちは".to_string(),
        })
    );
}

#[test]
fn test_texts_keep_provider_order() {
    let body = r#"{"translations":[
        {"detected_source_language":"DE","text":"one"},
        {"detected_source_language":"FR","text":"two"},
        {"detected_source_language":"DE","text":"three"}
    ]}"#;
    let res: TranslateResult = serde_json::from_str(body).unwrap();

    assert_eq!(res.texts().collect::<Vec<_>>(), vec!["one", "two", "three"]);
    assert_eq!(res.translations[1].detected_source_language, "FR");
}

#[test]
fn test_missing_translations_field_is_rejected() {
    assert!(serde_json::from_str::<TranslateResult>(r#"{"message":"hi"}"#).is_err());
}
