use crate::*;

/// Disjoint chunks of one file posted in parallel with per-path locking on.
/// Each chunk seeks to its own offset, so the result is independent of order.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_disjoint_chunks_serialized() {
    let server = TestServer::start_with(true).await.unwrap();
    let chunks: Vec<Vec<u8>> = (0..8u8).map(|i| vec![b'a' + i; 1024]).collect();

    // First chunk creates the file; the rest may arrive in any order.
    let r = post(&server.url, &chunk_form("par.bin", 0, &chunks[0]))
        .await
        .unwrap();
    assert_eq!(r.status, 200);

    let mut tasks = Vec::new();
    for (i, chunk) in chunks.iter().enumerate().skip(1) {
        let url = server.url.clone();
        let form = chunk_form("par.bin", (i * 1024) as u64, chunk);
        tasks.push(tokio::spawn(async move { post(&url, &form).await }));
    }
    for t in tasks {
        let r = t.await.unwrap().unwrap();
        assert_eq!(r.status, 200, "body: {}", r.body);
    }

    let written = std::fs::read(server.path("par.bin")).unwrap();
    assert_eq!(written, chunks.concat());
}
