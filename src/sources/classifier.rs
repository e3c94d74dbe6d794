//! Recognise F1TV video detail page URLs and pull the content id and slug
//! out of their path.

use url::Url;

use crate::errors::{AppError, AppResult};
use crate::models::ContentRef;

/// Host substring identifying the service
pub const SERVICE_HOST_TOKEN: &str = "f1tv";
/// Path substring identifying a video detail page
pub const DETAIL_PATH_MARKER: &str = "detail";

/// True when `s` is an absolute URL on an F1TV host pointing at a detail page.
///
/// Never fails; unparseable input is simply not a service URL.
pub fn is_service_url(s: &str) -> bool {
    let Ok(url) = Url::parse(s) else {
        return false;
    };

    let host_matches = url
        .host_str()
        .is_some_and(|host| host.to_lowercase().contains(SERVICE_HOST_TOKEN));

    host_matches && url.path().to_lowercase().contains(DETAIL_PATH_MARKER)
}

/// Extract `{id, name}` from the last two non-empty path segments
pub fn extract_content_ref(s: &str) -> AppResult<ContentRef> {
    if !is_service_url(s) {
        return Err(AppError::invalid_url(s));
    }

    let url = Url::parse(s).map_err(|_| AppError::invalid_url(s))?;
    let mut segments: Vec<&str> = url
        .path_segments()
        .map(|segments| segments.filter(|segment| !segment.is_empty()).collect())
        .unwrap_or_default();

    let name = segments.pop();
    let id = segments.pop();
    match (id, name) {
        (Some(id), Some(name)) => Ok(ContentRef {
            id: id.to_string(),
            name: name.to_string(),
        }),
        _ => Err(AppError::invalid_url(s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://f1tv.formula1.com/detail/1000005104/2022-bahrain-grand-prix")]
    #[case("https://F1TV.formula1.com/DETAIL/1000005104/2022-bahrain-grand-prix")]
    #[case("https://f1tv.formula1.com/detail/1000005104/2022-bahrain-grand-prix?action=play")]
    #[case("http://beta.f1tv.formula1.com/en/detail/1000005104/race")]
    fn test_accepts_detail_urls(#[case] url: &str) {
        assert!(is_service_url(url));
    }

    #[rstest]
    #[case("https://www.formula1.com/detail/1000005104/race")]
    #[case("https://f1tv.formula1.com/page/395/f1-live")]
    #[case("f1tv.formula1.com/detail/1000005104/race")]
    #[case("not a url at all")]
    #[case("")]
    fn test_rejects_other_strings(#[case] url: &str) {
        assert!(!is_service_url(url));
    }

    #[test]
    fn test_extract_content_ref() {
        let content =
            extract_content_ref("https://f1tv.formula1.com/detail/1000005104/2022-bahrain-grand-prix")
                .unwrap();
        assert_eq!(content.id, "1000005104");
        assert_eq!(content.name, "2022-bahrain-grand-prix");
    }

    #[test]
    fn test_extract_ignores_trailing_slash() {
        let content =
            extract_content_ref("https://f1tv.formula1.com/detail/1000005104/race-replay/").unwrap();
        assert_eq!(content.id, "1000005104");
        assert_eq!(content.name, "race-replay");
    }

    #[test]
    fn test_extract_is_stable_over_reconstructed_path() {
        let original =
            extract_content_ref("https://f1tv.formula1.com/en/detail/1000005104/qualifying").unwrap();
        let rebuilt = format!(
            "https://f1tv.formula1.com/detail/{}/{}",
            original.id, original.name
        );
        assert_eq!(extract_content_ref(&rebuilt).unwrap(), original);
    }

    #[test]
    fn test_extract_rejects_off_domain() {
        let err = extract_content_ref("https://example.com/detail/1/slug").unwrap_err();
        assert!(matches!(err, AppError::InvalidUrl { .. }));
    }

    #[test]
    fn test_extract_requires_two_segments() {
        let err = extract_content_ref("https://f1tv.formula1.com/detail").unwrap_err();
        assert!(matches!(err, AppError::InvalidUrl { .. }));
    }
}
