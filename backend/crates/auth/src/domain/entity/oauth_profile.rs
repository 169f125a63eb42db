//! Identity returned by an external provider

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthProfile {
    /// Provider-side account id
    pub provider_user_id: String,
    pub display_name: String,
    pub email: String,
}
