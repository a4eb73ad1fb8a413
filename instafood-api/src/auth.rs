use crate::{Error, UserId};

#[derive(Clone, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct AuthToken(pub String);

impl AuthToken {
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

// Keep tokens out of logs
impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthToken(..)")
    }
}

#[derive(Clone, serde::Deserialize, serde::Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_string(&self.email)?;
        crate::validate_string(&self.password)?;
        Ok(())
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct LoginResponse {
    pub token: AuthToken,

    #[serde(rename = "userId")]
    pub user_id: UserId,

    #[serde(rename = "fullName", default)]
    pub full_name: String,

    #[serde(rename = "profileImage", default)]
    pub profile_image: Option<String>,
}
