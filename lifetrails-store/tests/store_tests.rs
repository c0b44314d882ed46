//! End-to-end store scenarios against a mock remote.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{Duration, Utc};
use lifetrails_crypto::{decrypt_record, seal_token, AccessToken};
use lifetrails_remote::{RecordApiClient, RemoteConfig};
use lifetrails_storage::{ClientStorage, StorageScope};
use lifetrails_store::{
    record_blob_key, AccountDirectory, LocalAccount, RecordStore, SessionIdentity, StoreError,
    SESSION_IDENTITY_KEY,
};
use lifetrails_types::{FamilyMember, LifeEvent, UserRecord};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const USERNAME: &str = "lt_alice";
const PASSWORD: &str = "correct horse battery";
const TOKEN: &str = "ghp_store_test_token";

fn remote_for(base_url: String) -> Arc<RecordApiClient> {
    Arc::new(RecordApiClient::new(RemoteConfig {
        base_url,
        ..RemoteConfig::default()
    }))
}

fn directory_with_remote_account() -> AccountDirectory {
    let artifact =
        seal_token(&AccessToken::new(TOKEN), PASSWORD).expect("sealing test artifact");
    let mut directory = AccountDirectory::default();
    directory.insert_artifact(USERNAME, artifact);
    directory
}

fn store_with(
    directory: AccountDirectory,
    storage: Arc<ClientStorage>,
    base_url: String,
) -> RecordStore {
    RecordStore::new(directory, storage, remote_for(base_url))
}

fn contents_response(record: &UserRecord, sha: &str) -> ResponseTemplate {
    let json = serde_json::to_string(record).unwrap();
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "content": STANDARD.encode(json),
        "encoding": "base64",
        "sha": sha,
    }))
}

fn record_path() -> String {
    format!("/life-trails/{USERNAME}/data.json")
}

fn sample_event(date: &str, title: &str) -> LifeEvent {
    LifeEvent {
        date: date.to_string(),
        time: String::new(),
        title: title.to_string(),
        description: String::new(),
        place: String::new(),
        images: Vec::new(),
    }
}

#[tokio::test]
async fn remote_sign_in_with_existing_data_caches_token_and_encrypts_blob() {
    let server = MockServer::start().await;
    let mut remote_record = UserRecord::empty(USERNAME);
    remote_record.name = "Alice".to_string();
    remote_record
        .add_event(sample_event("1999-05-03", "Born"))
        .unwrap();

    Mock::given(method("GET"))
        .and(path(record_path()))
        .respond_with(contents_response(&remote_record, "sha-1"))
        .mount(&server)
        .await;

    let storage = Arc::new(ClientStorage::in_memory());
    let store = store_with(directory_with_remote_account(), storage.clone(), server.uri());

    let identity = store.sign_in(USERNAME, PASSWORD).await.unwrap();
    assert_eq!(identity.username, USERNAME);
    assert_eq!(identity.name, "Alice");
    assert!(!identity.is_local);

    // The durable blob is ciphertext, not the record JSON.
    let blob = storage
        .get(StorageScope::Durable, &record_blob_key(USERNAME))
        .unwrap()
        .expect("blob stored at sign-in");
    assert!(!blob.contains("Born"));
    let decrypted = decrypt_record(&blob, &AccessToken::new(TOKEN)).unwrap();
    assert_eq!(decrypted.events["1999"][0].title, "Born");

    let loaded = store.load_record().await.unwrap();
    assert_eq!(loaded, decrypted);
}

#[tokio::test]
async fn new_remote_user_starts_with_empty_record() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(record_path()))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let storage = Arc::new(ClientStorage::in_memory());
    let store = store_with(directory_with_remote_account(), storage.clone(), server.uri());

    store.sign_in(USERNAME, PASSWORD).await.unwrap();

    let record = store.load_record().await.unwrap();
    assert_eq!(record.id, USERNAME);
    assert_eq!(record.name, "");
    assert!(record.events.is_empty());
    assert!(record.family.is_empty());

    assert!(storage
        .get(StorageScope::Session, &format!("session-token-{USERNAME}"))
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn fresh_sign_in_after_sign_out_requires_password_and_reissues_blob() {
    let server = MockServer::start().await;
    let mut remote_record = UserRecord::empty(USERNAME);
    remote_record
        .add_event(sample_event("1999-05-03", "Born"))
        .unwrap();
    Mock::given(method("GET"))
        .and(path(record_path()))
        .respond_with(contents_response(&remote_record, "sha-1"))
        .mount(&server)
        .await;

    let storage = Arc::new(ClientStorage::in_memory());
    let store = store_with(directory_with_remote_account(), storage.clone(), server.uri());
    store.sign_in(USERNAME, PASSWORD).await.unwrap();
    store.sign_out().unwrap();
    storage.end_session().unwrap();

    store.sign_in(USERNAME, PASSWORD).await.unwrap();

    // The new blob must open under a token unwrapped independently from
    // the same artifact and password.
    let artifact = seal_token(&AccessToken::new(TOKEN), PASSWORD).unwrap();
    let fresh = lifetrails_crypto::unwrap_token(&artifact, PASSWORD).unwrap();
    let blob = storage
        .get(StorageScope::Durable, &record_blob_key(USERNAME))
        .unwrap()
        .unwrap();
    let record = decrypt_record(&blob, &fresh).unwrap();
    assert_eq!(record.events["1999"][0].title, "Born");
}

#[tokio::test]
async fn wrong_password_leaves_no_token_behind() {
    let server = MockServer::start().await;
    let storage = Arc::new(ClientStorage::in_memory());
    let store = store_with(directory_with_remote_account(), storage.clone(), server.uri());

    let err = store.sign_in(USERNAME, "not the password").await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidCredential));

    assert!(storage
        .get(StorageScope::Session, &format!("session-token-{USERNAME}"))
        .unwrap()
        .is_none());
    assert!(store.current_session().unwrap().is_none());
    assert_eq!(server.received_requests().await.unwrap().len(), 0);
}

#[tokio::test]
async fn unknown_username_is_distinct_from_bad_password() {
    let server = MockServer::start().await;
    let store = store_with(
        directory_with_remote_account(),
        Arc::new(ClientStorage::in_memory()),
        server.uri(),
    );

    let err = store.sign_in("nobody", PASSWORD).await.unwrap_err();
    assert!(matches!(err, StoreError::UnknownAccount(name) if name == "nobody"));
}

#[tokio::test]
async fn rejected_token_aborts_sign_in_and_clears_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(record_path()))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let storage = Arc::new(ClientStorage::in_memory());
    let store = store_with(directory_with_remote_account(), storage.clone(), server.uri());

    let err = store.sign_in(USERNAME, PASSWORD).await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidCredential));
    assert!(storage
        .get(StorageScope::Session, &format!("session-token-{USERNAME}"))
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn unreachable_remote_without_local_record_aborts() {
    // Nothing listens on this port.
    let storage = Arc::new(ClientStorage::in_memory());
    let store = store_with(
        directory_with_remote_account(),
        storage.clone(),
        "http://127.0.0.1:1".to_string(),
    );

    let err = store.sign_in(USERNAME, PASSWORD).await.unwrap_err();
    assert!(matches!(err, StoreError::Unreachable(_)));
    assert!(store.current_session().unwrap().is_none());
}

#[tokio::test]
async fn unreachable_remote_with_decryptable_blob_signs_in_offline() {
    // First sign-in against a live mock to seed the local blob.
    let server = MockServer::start().await;
    let mut remote_record = UserRecord::empty(USERNAME);
    remote_record.name = "Alice".to_string();
    Mock::given(method("GET"))
        .and(path(record_path()))
        .respond_with(contents_response(&remote_record, "sha-1"))
        .mount(&server)
        .await;

    let storage = Arc::new(ClientStorage::in_memory());
    let store = store_with(directory_with_remote_account(), storage.clone(), server.uri());
    store.sign_in(USERNAME, PASSWORD).await.unwrap();
    drop(store);
    drop(server);

    // Same storage, dead remote: the stored blob proves the credential.
    let store = store_with(
        directory_with_remote_account(),
        storage.clone(),
        "http://127.0.0.1:1".to_string(),
    );
    let identity = store.sign_in(USERNAME, PASSWORD).await.unwrap();
    assert_eq!(identity.name, "Alice");
    assert_eq!(store.load_record().await.unwrap().name, "Alice");
}

#[tokio::test]
async fn mutations_roundtrip_through_the_encrypted_blob() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(record_path()))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let storage = Arc::new(ClientStorage::in_memory());
    let store = store_with(directory_with_remote_account(), storage.clone(), server.uri());
    store.sign_in(USERNAME, PASSWORD).await.unwrap();

    store
        .add_event(sample_event("1999-05-03", "Born"))
        .await
        .unwrap();
    store
        .add_event(sample_event("2004-09-01", "First day of school"))
        .await
        .unwrap();
    store
        .add_family_member(FamilyMember {
            name: "Maria".to_string(),
            relation: "mother".to_string(),
            level: -1,
            image: String::new(),
            nickname: None,
        })
        .await
        .unwrap();

    let record = store.load_record().await.unwrap();
    assert_eq!(record.events["1999"][0].title, "Born");
    assert_eq!(record.events["2004"][0].title, "First day of school");
    assert_eq!(record.family[0].name, "Maria");

    store.delete_event("1999", 0).await.unwrap();
    let record = store.load_record().await.unwrap();
    // Emptied year buckets disappear rather than linger as [].
    assert!(!record.events.contains_key("1999"));
    assert_eq!(record.events.len(), 1);

    store.delete_family_member(0).await.unwrap();
    assert!(store.load_record().await.unwrap().family.is_empty());

    // Still ciphertext at rest after all mutations.
    let blob = storage
        .get(StorageScope::Durable, &record_blob_key(USERNAME))
        .unwrap()
        .unwrap();
    assert!(!blob.contains("school"));
}

#[tokio::test]
async fn restart_without_sign_out_discards_unreadable_blob() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(record_path()))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let storage = Arc::new(ClientStorage::in_memory());
    let store = store_with(directory_with_remote_account(), storage.clone(), server.uri());
    store.sign_in(USERNAME, PASSWORD).await.unwrap();
    store.add_event(sample_event("2000-01-01", "Y2K")).await.unwrap();

    // Simulated restart: session tier gone, durable tier intact.
    storage.end_session().unwrap();

    let err = store.load_record().await.unwrap_err();
    assert!(matches!(err, StoreError::NotSignedIn));
    assert!(storage
        .get(StorageScope::Durable, &record_blob_key(USERNAME))
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn expired_session_clears_token_but_keeps_blob() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(record_path()))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let storage = Arc::new(ClientStorage::in_memory());
    let store = store_with(directory_with_remote_account(), storage.clone(), server.uri());
    store.sign_in(USERNAME, PASSWORD).await.unwrap();

    // Backdate the identity past the 24-hour window.
    let stale = SessionIdentity {
        user_id: USERNAME.to_string(),
        username: USERNAME.to_string(),
        name: String::new(),
        signed_in_at: Utc::now() - Duration::hours(25),
        is_local: false,
    };
    storage
        .put(
            StorageScope::Durable,
            SESSION_IDENTITY_KEY,
            &serde_json::to_string(&stale).unwrap(),
        )
        .unwrap();

    let err = store.current_session().unwrap_err();
    assert!(matches!(err, StoreError::SessionExpired));

    assert!(storage
        .get(StorageScope::Session, &format!("session-token-{USERNAME}"))
        .unwrap()
        .is_none());
    assert!(storage
        .get(StorageScope::Durable, SESSION_IDENTITY_KEY)
        .unwrap()
        .is_none());
    // Data survives expiry; only the explicit sign-out deletes it.
    assert!(storage
        .get(StorageScope::Durable, &record_blob_key(USERNAME))
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn sign_out_removes_blob_token_and_identity() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(record_path()))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let storage = Arc::new(ClientStorage::in_memory());
    let store = store_with(directory_with_remote_account(), storage.clone(), server.uri());
    store.sign_in(USERNAME, PASSWORD).await.unwrap();
    store.sign_out().unwrap();

    assert!(store.current_session().unwrap().is_none());
    assert!(storage
        .get(StorageScope::Durable, &record_blob_key(USERNAME))
        .unwrap()
        .is_none());
    assert!(storage
        .get(StorageScope::Session, &format!("session-token-{USERNAME}"))
        .unwrap()
        .is_none());

    let err = store.load_record().await.unwrap_err();
    assert!(matches!(err, StoreError::NotSignedIn));
}

#[tokio::test]
async fn sync_remote_refetches_sha_then_updates() {
    let server = MockServer::start().await;
    let remote_record = UserRecord::empty(USERNAME);

    Mock::given(method("GET"))
        .and(path(record_path()))
        .respond_with(contents_response(&remote_record, "sha-before"))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(record_path()))
        .and(body_partial_json(serde_json::json!({
            "message": "Update user data",
            "sha": "sha-before",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "content": { "sha": "sha-after" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let storage = Arc::new(ClientStorage::in_memory());
    let store = store_with(directory_with_remote_account(), storage, server.uri());
    store.sign_in(USERNAME, PASSWORD).await.unwrap();
    store.add_event(sample_event("2010-06-15", "Moved")).await.unwrap();

    let sha = store.sync_remote().await.unwrap();
    assert_eq!(sha, "sha-after");
}

#[tokio::test]
async fn first_sync_for_new_user_creates_without_sha() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(record_path()))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(record_path()))
        .and(body_partial_json(serde_json::json!({
            "message": "Add user data",
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "content": { "sha": "sha-created" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let storage = Arc::new(ClientStorage::in_memory());
    let store = store_with(directory_with_remote_account(), storage, server.uri());
    store.sign_in(USERNAME, PASSWORD).await.unwrap();

    let sha = store.sync_remote().await.unwrap();
    assert_eq!(sha, "sha-created");
}

// ── Local accounts ──

fn local_account() -> LocalAccount {
    LocalAccount {
        username: "demo".to_string(),
        password: "demo-pass".to_string(),
        name: "Demo User".to_string(),
        date_of_birth: "1990-01-01".to_string(),
        place_of_birth: "Springfield".to_string(),
    }
}

fn local_store(storage: Arc<ClientStorage>) -> RecordStore {
    let mut directory = AccountDirectory::default();
    directory.add_local_account(local_account()).unwrap();
    // Remote is never contacted for local accounts.
    store_with(directory, storage, "http://127.0.0.1:1".to_string())
}

#[tokio::test]
async fn local_sign_in_seeds_profile_and_stores_plain_json() {
    let storage = Arc::new(ClientStorage::in_memory());
    let store = local_store(storage.clone());

    let identity = store.sign_in("demo", "demo-pass").await.unwrap();
    assert!(identity.is_local);
    assert_eq!(identity.name, "Demo User");

    let stored = storage
        .get(StorageScope::Durable, &record_blob_key("demo"))
        .unwrap()
        .unwrap();
    let record: UserRecord = serde_json::from_str(&stored).unwrap();
    assert_eq!(record.name, "Demo User");
    assert_eq!(record.date_of_birth, "1990-01-01");
    assert_eq!(record.place_of_birth, "Springfield");
}

#[tokio::test]
async fn local_wrong_password_is_invalid_credential() {
    let store = local_store(Arc::new(ClientStorage::in_memory()));
    let err = store.sign_in("demo", "wrong").await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidCredential));
}

#[tokio::test]
async fn local_record_survives_session_loss() {
    let storage = Arc::new(ClientStorage::in_memory());
    let store = local_store(storage.clone());
    store.sign_in("demo", "demo-pass").await.unwrap();
    store.add_event(sample_event("2015-07-20", "Graduated")).await.unwrap();

    // No token involved, so a restart costs nothing but the identity
    // check; sign in again and the data is still there.
    storage.end_session().unwrap();
    store.sign_in("demo", "demo-pass").await.unwrap();
    let record = store.load_record().await.unwrap();
    assert_eq!(record.events["2015"][0].title, "Graduated");
}

#[tokio::test]
async fn local_account_cannot_sync_remote() {
    let store = local_store(Arc::new(ClientStorage::in_memory()));
    store.sign_in("demo", "demo-pass").await.unwrap();
    let err = store.sync_remote().await.unwrap_err();
    assert!(matches!(err, StoreError::NoRemoteCredential));
}

#[tokio::test]
async fn sign_up_creates_and_signs_in() {
    let storage = Arc::new(ClientStorage::in_memory());
    let store = store_with(
        AccountDirectory::default(),
        storage,
        "http://127.0.0.1:1".to_string(),
    );

    let identity = store.sign_up(local_account()).await.unwrap();
    assert_eq!(identity.username, "demo");
    assert!(identity.is_local);

    let err = store.sign_up(local_account()).await.unwrap_err();
    assert!(matches!(err, StoreError::DuplicateUsername(_)));
}

#[tokio::test]
async fn sign_up_rejects_reserved_prefix() {
    let store = store_with(
        AccountDirectory::default(),
        Arc::new(ClientStorage::in_memory()),
        "http://127.0.0.1:1".to_string(),
    );

    let mut account = local_account();
    account.username = "lt_demo".to_string();
    let err = store.sign_up(account).await.unwrap_err();
    assert!(matches!(err, StoreError::ReservedUsername(_)));
}

#[tokio::test]
async fn durable_tier_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("client.json");

    {
        let storage = Arc::new(ClientStorage::open(&db_path).unwrap());
        let store = local_store(storage);
        store.sign_in("demo", "demo-pass").await.unwrap();
        store.add_event(sample_event("2020-03-14", "Pi day")).await.unwrap();
    }

    let storage = Arc::new(ClientStorage::open(&db_path).unwrap());
    let store = local_store(storage);
    store.sign_in("demo", "demo-pass").await.unwrap();
    let record = store.load_record().await.unwrap();
    assert_eq!(record.events["2020"][0].title, "Pi day");
}
