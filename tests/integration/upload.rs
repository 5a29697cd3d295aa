use crate::*;

/// The hello/world scenario: nested directories, then an append at offset 5.
#[tokio::test]
async fn test_two_chunks_into_nested_directories() {
    let server = TestServer::start().await.unwrap();
    let target = server.path("data/a/b/out.bin");
    let target_str = target.to_str().unwrap();

    let r = post(&server.url, &chunk_form(target_str, 0, b"hello")).await.unwrap();
    assert_eq!(r.status, 200, "body: {}", r.body);
    assert!(r.body.is_empty());
    assert_eq!(std::fs::read(&target).unwrap(), b"hello");
    assert!(server.path("data/a").is_dir());
    assert!(server.path("data/a/b").is_dir());

    let r = post(&server.url, &chunk_form(target_str, 5, b" world")).await.unwrap();
    assert_eq!(r.status, 200, "body: {}", r.body);
    assert_eq!(std::fs::read(&target).unwrap(), b"hello world");
}

#[tokio::test]
async fn test_relative_path_lands_under_root() {
    let server = TestServer::start().await.unwrap();

    let r = post(&server.url, &chunk_form("rel/dir/file.txt", 0, b"relative"))
        .await
        .unwrap();
    assert_eq!(r.status, 200, "body: {}", r.body);
    assert_eq!(
        std::fs::read(server.path("rel/dir/file.txt")).unwrap(),
        b"relative"
    );
}

#[tokio::test]
async fn test_offset_zero_replaces_previous_file() {
    let server = TestServer::start().await.unwrap();
    std::fs::write(server.path("f.bin"), vec![b'x'; 4096]).unwrap();

    let r = post(&server.url, &chunk_form("f.bin", 0, b"short")).await.unwrap();
    assert_eq!(r.status, 200);
    assert_eq!(std::fs::read(server.path("f.bin")).unwrap(), b"short");
}

#[tokio::test]
async fn test_multi_chunk_binary_file() {
    let server = TestServer::start().await.unwrap();
    let data: Vec<u8> = (0..10_000u32).map(|i| (i * 31 % 256) as u8).collect();

    let mut offset = 0u64;
    for chunk in data.chunks(4096) {
        let r = post(&server.url, &chunk_form("big.bin", offset, chunk))
            .await
            .unwrap();
        assert_eq!(r.status, 200, "chunk at {offset}: {}", r.body);
        offset += chunk.len() as u64;
    }

    assert_eq!(std::fs::read(server.path("big.bin")).unwrap(), data);
}

#[tokio::test]
async fn test_checksum_mismatch_keeps_earlier_chunks() {
    let server = TestServer::start().await.unwrap();
    post(&server.url, &chunk_form("f", 0, b"first")).await.unwrap();

    let form = with_field(chunk_form("f", 5, b"second"), "checksum_sha1", &sha1_hex(b"x"));
    let r = post(&server.url, &form).await.unwrap();

    assert_eq!(r.status, 203);
    assert_eq!(r.body, "sha1");
    assert_eq!(r.robots.as_deref(), Some("none"));
    assert_eq!(std::fs::read(server.path("f")).unwrap(), b"first");
}

#[tokio::test]
async fn test_size_mismatch_reports_after_write() {
    let server = TestServer::start().await.unwrap();

    let form = with_field(chunk_form("f", 0, b"hello"), "size", "3");
    let r = post(&server.url, &form).await.unwrap();

    assert_eq!(r.status, 203);
    assert_eq!(r.body, "size");
    assert_eq!(std::fs::read(server.path("f")).unwrap(), b"hello");
}

#[tokio::test]
async fn test_parent_blocked_by_file() {
    let server = TestServer::start().await.unwrap();
    std::fs::write(server.path("blocker"), b"").unwrap();

    let r = post(&server.url, &chunk_form("blocker/child/f", 0, b"x"))
        .await
        .unwrap();
    assert_eq!(r.status, 203);
    assert_eq!(r.body, "mkdir");
}

#[tokio::test]
async fn test_directory_as_destination() {
    let server = TestServer::start().await.unwrap();
    std::fs::create_dir(server.path("dir")).unwrap();

    let r = post(&server.url, &chunk_form("dir", 0, b"x")).await.unwrap();
    assert_eq!(r.status, 203);
    assert_eq!(r.body, "fopen");
}

#[tokio::test]
async fn test_current_field_names() {
    let server = TestServer::start().await.unwrap();
    let form = vec![
        ("function", "upload".to_string()),
        ("filepath", "plain/name.txt".to_string()),
        ("offset", "junk".to_string()),
        ("data", encode_b64(b"plain")),
        ("checksum", sha1_hex(b"plain")),
        ("size", "5".to_string()),
    ];

    let r = post(&server.url, &form).await.unwrap();
    assert_eq!(r.status, 200, "body: {}", r.body);
    assert_eq!(std::fs::read(server.path("plain/name.txt")).unwrap(), b"plain");
}
