use std::fmt;

use serde::{Deserialize, Serialize};

/// Represents a Generative Language model identifier.
///
/// This can be a predefined model version or a custom string value for
/// models that may be added in the future.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Model {
    /// Known model versions.
    Known(KnownModel),

    /// Custom model identifier (for future models or private models).
    Custom(String),
}

/// Known Generative Language model versions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KnownModel {
    /// Gemini 2.5 Flash.
    #[serde(rename = "gemini-2.5-flash")]
    Gemini25Flash,

    /// Gemini 2.5 Flash Lite.
    #[serde(rename = "gemini-2.5-flash-lite")]
    Gemini25FlashLite,

    /// Gemini 2.5 Pro.
    #[serde(rename = "gemini-2.5-pro")]
    Gemini25Pro,

    /// Gemini 2.0 Flash.
    #[serde(rename = "gemini-2.0-flash")]
    Gemini20Flash,

    /// Gemini 2.0 Flash Lite.
    #[serde(rename = "gemini-2.0-flash-lite")]
    Gemini20FlashLite,
}

impl Model {
    /// The identifier used in request paths.
    pub fn as_api_str(&self) -> &str {
        match self {
            Model::Known(known) => known.as_api_str(),
            Model::Custom(custom) => custom,
        }
    }
}

impl KnownModel {
    /// The identifier used in request paths.
    pub fn as_api_str(&self) -> &'static str {
        match self {
            KnownModel::Gemini25Flash => "gemini-2.5-flash",
            KnownModel::Gemini25FlashLite => "gemini-2.5-flash-lite",
            KnownModel::Gemini25Pro => "gemini-2.5-pro",
            KnownModel::Gemini20Flash => "gemini-2.0-flash",
            KnownModel::Gemini20FlashLite => "gemini-2.0-flash-lite",
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_api_str())
    }
}

impl fmt::Display for KnownModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_api_str())
    }
}

impl std::str::FromStr for Model {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Model::from(s))
    }
}

impl From<KnownModel> for Model {
    fn from(model: KnownModel) -> Self {
        Model::Known(model)
    }
}

impl From<&str> for Model {
    fn from(model: &str) -> Self {
        match model {
            "gemini-2.5-flash" => Model::Known(KnownModel::Gemini25Flash),
            "gemini-2.5-flash-lite" => Model::Known(KnownModel::Gemini25FlashLite),
            "gemini-2.5-pro" => Model::Known(KnownModel::Gemini25Pro),
            "gemini-2.0-flash" => Model::Known(KnownModel::Gemini20Flash),
            "gemini-2.0-flash-lite" => Model::Known(KnownModel::Gemini20FlashLite),
            other => Model::Custom(other.to_string()),
        }
    }
}

impl From<String> for Model {
    fn from(model: String) -> Self {
        Model::from(model.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_model_round_trips_through_str() {
        let model: Model = "gemini-2.5-flash".parse().unwrap();
        assert_eq!(model, Model::Known(KnownModel::Gemini25Flash));
        assert_eq!(model.to_string(), "gemini-2.5-flash");
    }

    #[test]
    fn unknown_model_becomes_custom() {
        let model: Model = "gemini-experimental".parse().unwrap();
        assert_eq!(model, Model::Custom("gemini-experimental".to_string()));
        assert_eq!(model.as_api_str(), "gemini-experimental");
    }
}
