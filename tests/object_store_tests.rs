use bytes::Bytes;
use file_vault::object_store::{LocalStore, ObjectStore, ObjectStoreError};

#[tokio::test]
async fn test_local_store_put_returns_url() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path()).unwrap();

    let data = Bytes::from("hello world");
    let url = store.put("report.pdf", data.clone(), "application/pdf").await.unwrap();

    assert!(url.starts_with("file://"));
    assert!(url.ends_with("report.pdf"));

    let retrieved = store.get("report.pdf").await.unwrap();
    assert_eq!(retrieved, data);
}

#[tokio::test]
async fn test_local_store_url_points_at_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path()).unwrap();

    let url = store
        .put("notes.txt", Bytes::from("meeting notes"), "text/plain")
        .await
        .unwrap();

    let path = url.strip_prefix("file://").unwrap();
    assert_eq!(std::fs::read_to_string(path).unwrap(), "meeting notes");
}

#[tokio::test]
async fn test_local_store_exists_and_delete() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path()).unwrap();

    assert!(!store.exists("photo.png").await.unwrap());

    store.put("photo.png", Bytes::from("data"), "image/png").await.unwrap();
    assert!(store.exists("photo.png").await.unwrap());

    store.delete("photo.png").await.unwrap();
    assert!(!store.exists("photo.png").await.unwrap());
}

#[tokio::test]
async fn test_local_store_delete_nonexistent() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path()).unwrap();

    // Deleting a nonexistent key should not error
    store.delete("nonexistent").await.unwrap();
}

#[tokio::test]
async fn test_local_store_get_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path()).unwrap();

    let result = store.get("missing").await;
    assert!(matches!(result, Err(ObjectStoreError::NotFound(_))));
}

#[tokio::test]
async fn test_local_store_same_name_overwrites() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path()).unwrap();

    let first = store.put("key.txt", Bytes::from("first"), "text/plain").await.unwrap();
    let second = store.put("key.txt", Bytes::from("second"), "text/plain").await.unwrap();
    assert_eq!(first, second);

    let data = store.get("key.txt").await.unwrap();
    assert_eq!(data, Bytes::from("second"));
}

#[tokio::test]
async fn test_local_store_rejects_escaping_keys() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path().join("objects")).unwrap();

    for key in ["../outside.txt", "nested/file.txt", "..", ""] {
        let result = store.put(key, Bytes::from("x"), "text/plain").await;
        assert!(
            matches!(result, Err(ObjectStoreError::InvalidKey(_))),
            "key {key:?} should be rejected"
        );
    }
    assert!(!dir.path().join("outside.txt").exists());
}
