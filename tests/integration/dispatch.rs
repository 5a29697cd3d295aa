use crate::*;

#[tokio::test]
async fn test_unknown_function() {
    let server = TestServer::start().await.unwrap();

    let r = post(&server.url, &[("function", "nonexistent".to_string())])
        .await
        .unwrap();
    assert_eq!(r.status, 203);
    assert_eq!(r.body, "unknown function nonexistent");
    assert_eq!(r.robots.as_deref(), Some("none"));
}

#[tokio::test]
async fn test_get_is_ignored() {
    let server = TestServer::start().await.unwrap();

    let resp = reqwest::get(&server.url).await.unwrap();
    let r = reply(resp).await.unwrap();
    assert_eq!(r.status, 200);
    assert!(r.body.is_empty());
    assert_eq!(r.robots.as_deref(), Some("none"));
}

#[tokio::test]
async fn test_mode_toggles_rewrite_htaccess() {
    let server = TestServer::start().await.unwrap();

    let r = post(&server.url, &[("function", "set_upload_mode".to_string())])
        .await
        .unwrap();
    assert_eq!(r.status, 200, "body: {}", r.body);
    assert_eq!(
        std::fs::read_to_string(server.path(".htaccess")).unwrap(),
        "php 1\n"
    );

    let r = post(&server.url, &[("function", "set_default_mode".to_string())])
        .await
        .unwrap();
    assert_eq!(r.status, 200, "body: {}", r.body);
    assert_eq!(
        std::fs::read_to_string(server.path(".htaccess")).unwrap(),
        "php56 1\n"
    );
}
