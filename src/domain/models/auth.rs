use serde::{Deserialize, Serialize};

/// Claims of the bearer token issued by the identity provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub aud: String,
    pub exp: usize,
    #[serde(default)]
    pub iat: usize,
}
