use {
    base64::{Engine as _, engine::general_purpose::STANDARD},
    serde::{Deserialize, Serialize},
    serde_json::Value,
};

/// How the raw text of a setting is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettingKind {
    /// Free text, interpreted by whoever reads it.
    #[default]
    String,
    /// Base64-encoded binary image.
    Image,
    /// Integer or float.
    Number,
    /// `"1"` is true, anything else is false.
    Boolean,
    /// JSON document.
    Json,
    /// Free text never shown in the admin listing.
    Hidden,
}

impl SettingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Image => "Image",
            Self::Number => "Number",
            Self::Boolean => "Boolean",
            Self::Json => "Json",
            Self::Hidden => "Hidden",
        }
    }

    /// Resolve the stored `type` column. Missing or unknown tags read as `String`.
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("Image") => Self::Image,
            Some("Number") => Self::Number,
            Some("Boolean") => Self::Boolean,
            Some("Json") => Self::Json,
            Some("Hidden") => Self::Hidden,
            _ => Self::String,
        }
    }
}

/// A setting value resolved according to its [`SettingKind`].
#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
    String(String),
    Number(serde_json::Number),
    Boolean(bool),
    Json(Value),
    Image(Vec<u8>),
}

impl SettingValue {
    /// JSON form returned by the admin API. Images are re-encoded as base64.
    pub fn to_json(&self) -> Value {
        match self {
            Self::String(s) => Value::String(s.clone()),
            Self::Number(n) => Value::Number(n.clone()),
            Self::Boolean(b) => Value::Bool(*b),
            Self::Json(v) => v.clone(),
            Self::Image(bytes) => Value::String(STANDARD.encode(bytes)),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingError {
    #[error("setting {key}: {value:?} is not a number")]
    InvalidNumber { key: String, value: String },
    #[error("setting {key}: invalid json: {source}")]
    InvalidJson {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("setting {key}: invalid base64 image: {source}")]
    InvalidImage {
        key: String,
        #[source]
        source: base64::DecodeError,
    },
}

/// One row of the settings table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Setting {
    pub id: i64,
    pub key: String,
    pub value: String,
    #[serde(rename = "type")]
    pub kind: SettingKind,
}

impl Setting {
    pub fn typed_value(&self) -> Result<SettingValue, SettingError> {
        match self.kind {
            SettingKind::String | SettingKind::Hidden => Ok(SettingValue::String(self.value.clone())),
            SettingKind::Boolean => Ok(SettingValue::Boolean(self.value == "1")),
            SettingKind::Number => parse_number(&self.value)
                .map(SettingValue::Number)
                .ok_or_else(|| SettingError::InvalidNumber {
                    key: self.key.clone(),
                    value: self.value.clone(),
                }),
            SettingKind::Json => serde_json::from_str(&self.value)
                .map(SettingValue::Json)
                .map_err(|source| SettingError::InvalidJson {
                    key: self.key.clone(),
                    source,
                }),
            SettingKind::Image => STANDARD
                .decode(self.value.trim())
                .map(SettingValue::Image)
                .map_err(|source| SettingError::InvalidImage {
                    key: self.key.clone(),
                    source,
                }),
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.kind == SettingKind::Hidden
    }
}

fn parse_number(raw: &str) -> Option<serde_json::Number> {
    let raw = raw.trim();
    if let Ok(i) = raw.parse::<i64>() {
        return Some(i.into());
    }
    raw.parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
}

#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    fn setting(kind: SettingKind, value: &str) -> Setting {
        Setting {
            id: 1,
            key: "k".into(),
            value: value.into(),
            kind,
        }
    }

    #[test]
    fn boolean_is_one_or_false() {
        assert_eq!(
            setting(SettingKind::Boolean, "1").typed_value().unwrap(),
            SettingValue::Boolean(true)
        );
        assert_eq!(
            setting(SettingKind::Boolean, "0").typed_value().unwrap(),
            SettingValue::Boolean(false)
        );
        assert_eq!(
            setting(SettingKind::Boolean, "true").typed_value().unwrap(),
            SettingValue::Boolean(false)
        );
    }

    #[test]
    fn number_prefers_integer_then_float() {
        assert_eq!(
            setting(SettingKind::Number, "45000").typed_value().unwrap().to_json(),
            json!(45000)
        );
        assert_eq!(
            setting(SettingKind::Number, "2.5").typed_value().unwrap().to_json(),
            json!(2.5)
        );
        assert!(matches!(
            setting(SettingKind::Number, "many").typed_value(),
            Err(SettingError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn json_and_image_decode() {
        assert_eq!(
            setting(SettingKind::Json, r#"{"a":[1,2]}"#).typed_value().unwrap(),
            SettingValue::Json(json!({"a": [1, 2]}))
        );
        assert!(matches!(
            setting(SettingKind::Json, "{").typed_value(),
            Err(SettingError::InvalidJson { .. })
        ));

        let img = setting(SettingKind::Image, "iVBORw==").typed_value().unwrap();
        assert_eq!(img, SettingValue::Image(vec![0x89, 0x50, 0x4e, 0x47]));
        assert_eq!(img.to_json(), json!("iVBORw=="));
        assert!(setting(SettingKind::Image, "%%%").typed_value().is_err());
    }

    #[test]
    fn unknown_tag_reads_as_string() {
        assert_eq!(SettingKind::from_tag(None), SettingKind::String);
        assert_eq!(SettingKind::from_tag(Some("Color")), SettingKind::String);
        assert_eq!(SettingKind::from_tag(Some("Hidden")), SettingKind::Hidden);
        assert_eq!(
            setting(SettingKind::Hidden, "secret").typed_value().unwrap(),
            SettingValue::String("secret".into())
        );
    }

    #[test]
    fn serializes_with_type_field() {
        let v = serde_json::to_value(setting(SettingKind::Number, "8")).unwrap();
        assert_eq!(v, json!({"id": 1, "key": "k", "value": "8", "type": "Number"}));
    }
}
