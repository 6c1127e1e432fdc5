//! API endpoint paths, relative to the configured base URL.

pub const AUTH_LOGIN: &str = "/Auth/login";
pub const AUTH_REGISTER: &str = "/Auth/register";
pub const AUTH_REFRESH_TOKEN: &str = "/Auth/refresh-token";
pub const AUTH_ME: &str = "/Auth/me";
pub const AUTH_CHANGE_PASSWORD: &str = "/Auth/change-password";

/// Endpoints exempt from the 401 refresh-and-retry flow. A 401 from login or
/// register is a credential error, and refreshing on behalf of the refresh
/// call itself would loop.
pub fn is_auth_exempt(path: &str) -> bool {
    matches!(path, AUTH_LOGIN | AUTH_REGISTER | AUTH_REFRESH_TOKEN)
}

/// Login is the one endpoint whose 401s are shown to the user directly.
pub fn is_login(path: &str) -> bool {
    path == AUTH_LOGIN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exemptions() {
        assert!(is_auth_exempt(AUTH_LOGIN));
        assert!(is_auth_exempt(AUTH_REGISTER));
        assert!(is_auth_exempt(AUTH_REFRESH_TOKEN));
        assert!(!is_auth_exempt(AUTH_ME));
        assert!(!is_auth_exempt("/Users"));
    }

    #[test]
    fn test_login_check() {
        assert!(is_login(AUTH_LOGIN));
        assert!(!is_login(AUTH_REGISTER));
    }
}
