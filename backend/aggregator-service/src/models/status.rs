use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginStatus {
    pub platform: String,
    #[serde(rename = "loggedIn")]
    pub logged_in: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginStatusResponse {
    pub data: Vec<LoginStatus>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicAccess {
    pub platform: String,
    #[serde(rename = "accessTokenAvailable")]
    pub access_token_available: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicAccessResponse {
    pub data: Vec<PublicAccess>,
    pub error: Option<String>,
}
