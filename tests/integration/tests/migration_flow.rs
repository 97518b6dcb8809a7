//! End-to-end migration flows through the factory, host adapter, and HTTP.

use axum::http::StatusCode;
use kc_federation::{FederationError, UserStorageProvider};
use kc_integration_tests::{unreachable_base_uri, FakeDirectory, Host};
use kc_model::{CredentialInput, Role, UserCredential};
use kc_storage::{CredentialProvider, RoleProvider, UserProvider};
use serde_json::json;

fn jdoe() -> serde_json::Value {
    json!({
        "username": "jdoe",
        "email": "jdoe@example.com",
        "enabled": true,
        "emailVerified": true,
        "firstName": "John",
        "lastName": "Doe",
        "attributes": {"department": ["eng"]},
        "roles": ["ROLE_FOO", "ROLE_UNKNOWN"]
    })
}

async fn setup() -> anyhow::Result<(FakeDirectory, Host)> {
    let directory = FakeDirectory::start().await?;
    directory.add_user(jdoe(), "s3cret");
    let host = Host::new(directory.base_uri())?;
    Ok((directory, host))
}

#[tokio::test]
async fn first_login_migrates_and_later_logins_stay_local() -> anyhow::Result<()> {
    let (directory, host) = setup().await?;
    let role = Role::new_realm_role(host.realm_id, "ROLE_FOO");
    host.store.create(&role).await?;

    let mut user = host
        .manager
        .get_user_by_username(host.realm_id, "JDoe@Example.com ")
        .await?
        .expect("user should be materialized");

    assert_eq!(user.username, "jdoe@example.com");
    assert_eq!(user.email.as_deref(), Some("jdoe@example.com"));
    assert_eq!(user.first_name.as_deref(), Some("John"));
    assert_eq!(user.get_first_attribute("department"), Some("eng"));
    assert!(user.is_linked_to(&host.manager.provider().federation_link()));
    assert_eq!(host.store.get_roles(host.realm_id, user.id).await?, vec![role.id]);

    let password = CredentialInput::password("s3cret");
    assert!(host.manager.validate_credential(host.realm_id, &mut user, &password).await?);
    assert!(!user.is_federated());
    assert_eq!(directory.details_calls(), 1);
    assert_eq!(directory.exists_calls(), 1);
    assert_eq!(directory.login_calls(), 1);

    let mut again = host
        .manager
        .get_user_by_email(host.realm_id, "jdoe@example.com")
        .await?
        .expect("migrated user should be local");
    assert_eq!(again.id, user.id);
    assert!(host.manager.validate_credential(host.realm_id, &mut again, &password).await?);
    assert!(!host
        .manager
        .validate_credential(host.realm_id, &mut again, &CredentialInput::password("nope"))
        .await?);

    assert_eq!(directory.details_calls(), 1);
    assert_eq!(directory.exists_calls(), 1);
    assert_eq!(directory.login_calls(), 1);
    assert_eq!(host.store.users_created(), 1);
    Ok(())
}

#[tokio::test]
async fn unknown_user_is_absent() -> anyhow::Result<()> {
    let (directory, host) = setup().await?;

    let user = host
        .manager
        .get_user_by_username(host.realm_id, "ghost@example.com")
        .await?;

    assert!(user.is_none());
    assert_eq!(directory.details_calls(), 1);
    assert_eq!(host.store.user_count(), 0);
    Ok(())
}

#[tokio::test]
async fn wrong_password_leaves_user_provisional() -> anyhow::Result<()> {
    let (directory, host) = setup().await?;
    let mut user = host
        .manager
        .get_user_by_username(host.realm_id, "jdoe@example.com")
        .await?
        .expect("user should be materialized");

    assert!(!host
        .manager
        .validate_credential(host.realm_id, &mut user, &CredentialInput::password("wrong"))
        .await?);
    assert!(user.is_federated());
    assert!(!host
        .store
        .has_credential_type(host.realm_id, user.id, kc_model::CredentialType::Password)
        .await?);

    assert!(host
        .manager
        .validate_credential(host.realm_id, &mut user, &CredentialInput::password("s3cret"))
        .await?);
    assert!(!user.is_federated());
    assert_eq!(directory.login_calls(), 2);
    Ok(())
}

#[tokio::test]
async fn non_password_credentials_never_reach_directory() -> anyhow::Result<()> {
    let (directory, host) = setup().await?;
    let mut user = host
        .manager
        .get_user_by_username(host.realm_id, "jdoe@example.com")
        .await?
        .expect("user should be materialized");

    let otp = CredentialInput::Value(UserCredential::new("otp", "123456"));
    assert!(!host.manager.validate_credential(host.realm_id, &mut user, &otp).await?);

    assert_eq!(directory.exists_calls(), 0);
    assert_eq!(directory.login_calls(), 0);
    Ok(())
}

#[tokio::test]
async fn password_updates_are_refused_until_migrated() -> anyhow::Result<()> {
    let (_directory, host) = setup().await?;
    let mut user = host
        .manager
        .get_user_by_username(host.realm_id, "jdoe@example.com")
        .await?
        .expect("user should be materialized");

    let err = host
        .manager
        .update_credential(host.realm_id, &user, &CredentialInput::password("changed"))
        .await
        .unwrap_err();
    assert!(err.is_read_only());

    assert!(host
        .manager
        .validate_credential(host.realm_id, &mut user, &CredentialInput::password("s3cret"))
        .await?);
    host.manager
        .update_credential(host.realm_id, &user, &CredentialInput::password("changed"))
        .await?;
    assert!(host
        .store
        .is_valid(host.realm_id, user.id, &CredentialInput::password("changed"))
        .await?);
    Ok(())
}

#[tokio::test]
async fn identity_mismatch_creates_nothing() -> anyhow::Result<()> {
    let directory = FakeDirectory::start().await?;
    directory.add_user_at("alias@example.com", jdoe(), "s3cret");
    let host = Host::new(directory.base_uri())?;

    let err = host
        .manager
        .get_user_by_username(host.realm_id, "alias@example.com")
        .await
        .unwrap_err();

    assert!(err.is_identity_mismatch());
    assert_eq!(host.store.user_count(), 0);
    Ok(())
}

#[tokio::test]
async fn directory_errors_are_not_absence() -> anyhow::Result<()> {
    let (directory, host) = setup().await?;
    directory.force_status(StatusCode::INTERNAL_SERVER_ERROR);

    let err = host
        .manager
        .get_user_by_username(host.realm_id, "jdoe@example.com")
        .await
        .unwrap_err();

    assert!(matches!(err, FederationError::UserLookup(_)));
    assert_eq!(host.store.user_count(), 0);
    Ok(())
}

#[tokio::test]
async fn unreachable_directory() -> anyhow::Result<()> {
    let host = Host::new(&unreachable_base_uri()?)?;

    let err = host
        .manager
        .get_user_by_username(host.realm_id, "jdoe@example.com")
        .await
        .unwrap_err();
    assert!(err.is_connection_error(), "unexpected error: {err}");
    assert_eq!(host.store.user_count(), 0);

    let mut user = host.store.add_user(host.realm_id, "jdoe@example.com").await?.user;
    user.federation_link = Some(host.manager.provider().federation_link());
    host.store.update(&user).await?;

    assert!(!host
        .manager
        .validate_credential(host.realm_id, &mut user, &CredentialInput::password("s3cret"))
        .await?);
    assert!(user.is_federated());
    Ok(())
}

#[tokio::test]
async fn concurrent_first_lookups_share_one_user() -> anyhow::Result<()> {
    let (directory, host) = setup().await?;
    let role = Role::new_realm_role(host.realm_id, "ROLE_FOO");
    host.store.create(&role).await?;

    let manager = &host.manager;
    let realm_id = host.realm_id;
    let (a, b, c, d) = tokio::join!(
        manager.get_user_by_username(realm_id, "jdoe@example.com"),
        manager.get_user_by_username(realm_id, "JDOE@example.com"),
        manager.get_user_by_username(realm_id, " jdoe@EXAMPLE.com"),
        manager.get_user_by_username(realm_id, "jdoe@example.com "),
    );

    let ids: std::collections::BTreeSet<_> = [a?, b?, c?, d?]
        .into_iter()
        .map(|user| user.map(|u| u.id))
        .collect();
    assert_eq!(ids.len(), 1);
    assert_eq!(host.store.users_created(), 1);

    let user = host
        .store
        .get_by_username(host.realm_id, "jdoe@example.com")
        .await?
        .expect("user should exist");
    assert!(user.is_federated());
    assert_eq!(host.store.get_roles(host.realm_id, user.id).await?, vec![role.id]);
    assert!(directory.details_calls() >= 1);
    Ok(())
}
