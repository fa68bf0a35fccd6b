use serde::{Deserialize, Serialize};

/// Request body for registration and login.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    #[serde(rename = "usuario", alias = "username")]
    pub username: Option<String>,
    #[serde(rename = "contraseña", alias = "password")]
    pub password: Option<String>,
}

impl CredentialsRequest {
    /// Both fields, or `None` if either is missing.
    pub fn into_parts(self) -> Option<(String, String)> {
        Some((self.username?, self.password?))
    }
}

/// Response returned after registration.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    #[serde(rename = "mensaje")]
    pub message: String,
    #[serde(rename = "usuario_id")]
    pub user_id: i64,
    #[serde(rename = "usuario")]
    pub username: String,
}

/// Response returned after login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    #[serde(rename = "mensaje")]
    pub message: String,
    #[serde(rename = "usuario")]
    pub username: String,
    #[serde(rename = "usuario_id")]
    pub user_id: i64,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    #[serde(rename = "mensaje")]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_spanish_and_english_keys() {
        let es: CredentialsRequest =
            serde_json::from_str(r#"{"usuario":"alice","contraseña":"secret1"}"#).unwrap();
        assert_eq!(es.into_parts(), Some(("alice".into(), "secret1".into())));

        let en: CredentialsRequest =
            serde_json::from_str(r#"{"username":"bob","password":"pw12"}"#).unwrap();
        assert_eq!(en.into_parts(), Some(("bob".into(), "pw12".into())));
    }

    #[test]
    fn missing_field_yields_none() {
        let req: CredentialsRequest = serde_json::from_str(r#"{"usuario":"alice"}"#).unwrap();
        assert!(req.into_parts().is_none());
    }

    #[test]
    fn register_response_uses_wire_names() {
        let json = serde_json::to_value(RegisterResponse {
            message: "ok".into(),
            user_id: 1,
            username: "alice".into(),
        })
        .unwrap();
        assert_eq!(json["usuario_id"], 1);
        assert_eq!(json["usuario"], "alice");
        assert_eq!(json["mensaje"], "ok");
    }
}
