//! Tests for the URL provider.

use super::*;

#[test]
fn clone_url_joins_base_and_path() {
    let provider = BaseUrlProvider::new("https://git.example.com").unwrap();
    assert_eq!(
        provider.git_clone_url("space/project"),
        "https://git.example.com/space/project.git"
    );
}

#[test]
fn clone_url_tolerates_trailing_and_leading_slashes() {
    let provider = BaseUrlProvider::new("https://git.example.com/").unwrap();
    assert_eq!(
        provider.git_clone_url("/space/project"),
        "https://git.example.com/space/project.git"
    );
}

#[test]
fn base_with_port_and_subpath_is_preserved() {
    let provider = BaseUrlProvider::new("http://localhost:3000/forge").unwrap();
    assert_eq!(
        provider.git_clone_url("space/project"),
        "http://localhost:3000/forge/space/project.git"
    );
}

#[test]
fn invalid_base_is_rejected() {
    let err = BaseUrlProvider::new("not a url").unwrap_err();
    assert!(matches!(err, UrlError::InvalidBase { .. }));
}

#[test]
fn non_base_url_is_rejected() {
    let err = BaseUrlProvider::new("mailto:admin@example.com").unwrap_err();
    assert!(matches!(err, UrlError::InvalidBase { .. }));
}
