//! URL utilities for consistent URL handling
//!
//! Tokenized playback URLs carry credentials in their query strings, so
//! anything that ends up in a log line goes through
//! [`UrlUtils::obfuscate_credentials`] first.

use regex::Regex;
use url::Url;

/// URL utilities for consistent URL handling
pub struct UrlUtils;

impl UrlUtils {
    /// Join a base URL with an absolute or relative path
    ///
    /// # Examples
    ///
    /// ```rust
    /// use f1tv_dl::utils::url::UrlUtils;
    ///
    /// let url = UrlUtils::join("https://f1tv.formula1.com", "/2.0/R/ENG/PLAY").unwrap();
    /// assert_eq!(url, "https://f1tv.formula1.com/2.0/R/ENG/PLAY");
    /// ```
    pub fn join(base: &str, path: &str) -> Result<String, url::ParseError> {
        let base_url = Url::parse(base)?;
        let joined = base_url.join(path)?;
        Ok(joined.to_string())
    }

    /// Mask user info and token-like query parameters
    ///
    /// Works on plain error messages too, since reqwest errors embed the URL.
    pub fn obfuscate_credentials(url: &str) -> String {
        let mut obfuscated = url.to_string();

        if let Ok(parsed) = Url::parse(url)
            && (!parsed.username().is_empty() || parsed.password().is_some())
        {
            let mut new_url = parsed.clone();
            let _ = new_url.set_username("****");
            let _ = new_url.set_password(Some("****"));
            obfuscated = new_url.to_string();
        }

        let sensitive_params = [
            "token",
            "entitlementtoken",
            "hdnts",
            "hdntl",
            "policy",
            "signature",
            "key-pair-id",
            "password",
        ];

        for param in &sensitive_params {
            let pattern = format!(r"(?i)([?&]{}=)[^&\s]*", regex::escape(param));
            if let Ok(re) = Regex::new(&pattern) {
                obfuscated = re.replace_all(&obfuscated, "${1}****").to_string();
            }
        }

        obfuscated
    }
}
