//! End-to-end checks through `AuthzSession` with the in-memory collaborators.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use platform_org::{
    DirectRole, Invitation, Joinable, MemberRole, Resource, ResourceKind, Tenant, ViewerContext,
    Visibility,
};
use platform_rbac::store::{Page, PageRequest};
use platform_rbac::{
    AuthzError, AuthzResult, AuthzService, ChangeKind, DiffOptions, EngineConfig, InvitationStore,
    MembershipStore, MemoryMembershipStore, RoleChange, TenantDirectory,
};

fn directory() -> TenantDirectory {
    let mut directory = TenantDirectory::new();
    directory.add_tenant(Tenant::new("cam", "Cambridge", "cam.oae.com"));
    directory.add_tenant(Tenant::new("gt", "Georgia Tech", "gt.oae.com"));
    directory.add_tenant(Tenant::new("priv", "Private", "priv.oae.com").with_private(true));
    directory
}

fn service(store: MemoryMembershipStore, config: EngineConfig) -> AuthzService {
    AuthzService::in_memory(store, Arc::new(directory()), config).unwrap()
}

fn paged_config() -> EngineConfig {
    EngineConfig {
        page_size: 1,
        ..EngineConfig::default()
    }
}

fn private_doc() -> Resource {
    Resource::new(ResourceKind::Content, "cam", "doc", "Doc").with_visibility(Visibility::Private)
}

/// Store whose every call fails.
struct UnreachableStore;

#[async_trait]
impl MembershipStore for UnreachableStore {
    async fn get_direct_roles(
        &self,
        _principal_id: &str,
        _kind: Option<ResourceKind>,
        _page: PageRequest,
    ) -> AuthzResult<Page<DirectRole>> {
        Err(AuthzError::UpstreamFailure("membership store unreachable".to_string()))
    }

    async fn get_all_roles(&self, _resource_id: &str, _page: PageRequest) -> AuthzResult<Page<MemberRole>> {
        Err(AuthzError::UpstreamFailure("membership store unreachable".to_string()))
    }
}

#[async_trait]
impl InvitationStore for UnreachableStore {
    async fn get_invitations(&self, _resource_id: &str, _page: PageRequest) -> AuthzResult<Page<Invitation>> {
        Err(AuthzError::UpstreamFailure("invitation store unreachable".to_string()))
    }
}

/// Store that never stops returning page tokens.
struct EndlessStore;

#[async_trait]
impl MembershipStore for EndlessStore {
    async fn get_direct_roles(
        &self,
        _principal_id: &str,
        _kind: Option<ResourceKind>,
        _page: PageRequest,
    ) -> AuthzResult<Page<DirectRole>> {
        Ok(Page {
            items: Vec::new(),
            next_token: Some("again".to_string()),
        })
    }

    async fn get_all_roles(&self, _resource_id: &str, _page: PageRequest) -> AuthzResult<Page<MemberRole>> {
        Ok(Page::last(Vec::new()))
    }
}

#[tokio::test]
async fn test_two_paths_resolve_to_highest_role() {
    let store = MemoryMembershipStore::with_page_size(1);
    store.grant("g:cam:a", "u:cam:nico", "member").await;
    store.grant("g:cam:b", "u:cam:nico", "member").await;
    store.grant("g:cam:c", "g:cam:b", "member").await;
    store.grant("f:cam:photos", "g:cam:a", "viewer").await;
    store.grant("f:cam:photos", "g:cam:c", "manager").await;
    let service = service(store, paged_config());
    let mut session = service.session();

    let folder = Resource::new(ResourceKind::Folder, "cam", "photos", "Photos")
        .with_visibility(Visibility::Private);
    let role = session
        .resolve_effective_role("u:cam:nico", &folder)
        .await
        .unwrap();
    assert_eq!(role.as_deref(), Some("manager"));

    let ctx = ViewerContext::authenticated(Resource::user("cam", "nico", "Nico"));
    assert!(session.can_manage(&ctx, &folder).await.is_ok());
}

#[tokio::test]
async fn test_cyclic_groups_terminate() {
    let store = MemoryMembershipStore::new();
    store.grant("g:cam:a", "u:cam:nico", "member").await;
    store.grant("g:cam:b", "g:cam:a", "member").await;
    store.grant("g:cam:a", "g:cam:b", "member").await;
    store.grant("c:cam:doc", "g:cam:b", "editor").await;
    let service = service(store, EngineConfig::default());
    let mut session = service.session();

    let role = session
        .resolve_effective_role("u:cam:nico", &private_doc())
        .await
        .unwrap();
    assert_eq!(role.as_deref(), Some("editor"));
}

#[tokio::test]
async fn test_joining_a_group_takes_effect_after_invalidating_it() {
    let store = MemoryMembershipStore::new();
    store.grant("c:cam:doc", "g:cam:team", "viewer").await;
    let service = service(store.clone(), EngineConfig::default());
    let mut session = service.session();

    let ctx = ViewerContext::authenticated(Resource::user("cam", "nico", "Nico"));
    let doc = private_doc();
    assert!(matches!(
        session.can_view(&ctx, &doc).await,
        Err(AuthzError::Forbidden(_))
    ));

    store.grant("g:cam:team", "u:cam:nico", "member").await;
    session.invalidate("g:cam:team");
    assert!(session.can_view(&ctx, &doc).await.is_ok());

    store.revoke("g:cam:team", "u:cam:nico").await;
    session.invalidate("g:cam:team");
    assert!(matches!(
        session.can_view(&ctx, &doc).await,
        Err(AuthzError::Forbidden(_))
    ));
}

#[tokio::test]
async fn test_deep_group_chain() {
    let store = MemoryMembershipStore::new();
    store.grant("g:cam:0", "u:cam:nico", "member").await;
    for depth in 1..200 {
        store
            .grant(&format!("g:cam:{}", depth), &format!("g:cam:{}", depth - 1), "member")
            .await;
    }
    store.grant("c:cam:doc", "g:cam:199", "viewer").await;

    let deep = EngineConfig {
        max_group_depth: 256,
        ..EngineConfig::default()
    };
    let service = service(store.clone(), deep);
    let role = service
        .session()
        .resolve_effective_role("u:cam:nico", &private_doc())
        .await
        .unwrap();
    assert_eq!(role.as_deref(), Some("viewer"));

    let shallow = EngineConfig {
        max_group_depth: 10,
        ..EngineConfig::default()
    };
    let service = self::service(store, shallow);
    let role = service
        .session()
        .resolve_effective_role("u:cam:nico", &private_doc())
        .await
        .unwrap();
    assert_eq!(role, None);
}

#[tokio::test]
async fn test_upstream_failure_propagates() {
    let store = Arc::new(UnreachableStore);
    let service = AuthzService::new(
        store.clone(),
        store,
        Arc::new(directory()),
        EngineConfig::default(),
    )
    .unwrap();
    let mut session = service.session();
    let ctx = ViewerContext::authenticated(Resource::user("cam", "nico", "Nico"));

    let err = session.can_view(&ctx, &private_doc()).await.unwrap_err();
    assert_eq!(
        err,
        AuthzError::UpstreamFailure("membership store unreachable".to_string())
    );
    assert!(!err.is_denial());
    assert_eq!(err.status_code(), 502);

    let proposed = BTreeMap::from([("a@oae.com".to_string(), RoleChange::role("viewer"))]);
    let err = session
        .compute_invitation_roles_after_changes(
            ResourceKind::Content,
            Some("c:cam:doc"),
            &proposed,
            DiffOptions::default(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AuthzError::UpstreamFailure(_)));
}

#[tokio::test]
async fn test_anonymous_checks_never_touch_the_store() {
    let store = Arc::new(UnreachableStore);
    let service = AuthzService::new(
        store.clone(),
        store,
        Arc::new(directory()),
        EngineConfig::default(),
    )
    .unwrap();
    let mut session = service.session();
    let ctx = ViewerContext::anonymous("cam");

    let public = Resource::new(ResourceKind::Content, "cam", "doc", "Doc");
    assert!(session.can_view(&ctx, &public).await.is_ok());

    let err = session.can_view(&ctx, &private_doc()).await.unwrap_err();
    assert!(matches!(err, AuthzError::Forbidden(_)));
}

#[tokio::test]
async fn test_endless_pagination_fails() {
    let store = Arc::new(EndlessStore);
    let config = EngineConfig {
        max_pages: 5,
        ..EngineConfig::default()
    };
    let service = AuthzService::new(
        store,
        Arc::new(MemoryMembershipStore::new()),
        Arc::new(directory()),
        config,
    )
    .unwrap();

    let ctx = ViewerContext::authenticated(Resource::user("cam", "nico", "Nico"));
    let err = service
        .session()
        .can_view(&ctx, &private_doc())
        .await
        .unwrap_err();
    assert!(matches!(err, AuthzError::UpstreamFailure(_)));
}

#[tokio::test]
async fn test_self_interaction_is_invalid() {
    let service = service(MemoryMembershipStore::new(), EngineConfig::default());
    let nico = Resource::user("cam", "nico", "Nico");
    let ctx = ViewerContext::authenticated(nico.clone());

    let err = service
        .session()
        .can_interact(&ctx, &nico)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthzError::InvalidArgument(_)));
    assert_eq!(err.status_code(), 400);
}

#[tokio::test]
async fn test_bulk_interaction_report() {
    let store = MemoryMembershipStore::with_page_size(1);
    store.grant("g:priv:club", "u:cam:nico", "member").await;
    let service = service(store, paged_config());
    let mut session = service.session();
    let ctx = ViewerContext::authenticated(Resource::user("cam", "nico", "Nico"));

    let targets = vec![
        Resource::user("gt", "bert", "Bert"),
        Resource::group("priv", "club", "Club").with_visibility(Visibility::Private),
        Resource::user("priv", "ann", "Ann"),
        Resource::group("cam", "oss", "OSS")
            .with_visibility(Visibility::Private)
            .with_joinable(Joinable::Request),
        Resource::user("cam", "nico", "Nico"),
    ];
    let report = session.can_interact_all(&ctx, &targets).await.unwrap();

    assert_eq!(report.allowed, vec!["u:gt:bert", "g:priv:club", "g:cam:oss"]);
    assert_eq!(report.denied_ids(), vec!["u:priv:ann", "u:cam:nico"]);
    assert!(matches!(report.denied[0].1, AuthzError::Forbidden(_)));
    assert!(matches!(report.denied[1].1, AuthzError::InvalidArgument(_)));

    let err = report.into_result().unwrap_err();
    assert!(err.to_string().contains("u:priv:ann, u:cam:nico"));
}

#[tokio::test]
async fn test_group_discovery_and_management() {
    let store = MemoryMembershipStore::new();
    store.grant("g:cam:oss", "u:cam:simon", "manager").await;
    let service = service(store, EngineConfig::default());
    let mut session = service.session();

    let group = Resource::group("cam", "oss", "OSS")
        .with_visibility(Visibility::Private)
        .with_joinable(Joinable::Yes);
    let nico = ViewerContext::authenticated(Resource::user("cam", "nico", "Nico"));
    let simon = ViewerContext::authenticated(Resource::user("cam", "simon", "Simon"));
    let bert = ViewerContext::authenticated(Resource::user("priv", "bert", "Bert"));

    assert!(session.can_view(&nico, &group).await.is_ok());
    assert!(matches!(
        session.can_manage(&nico, &group).await,
        Err(AuthzError::Forbidden(_))
    ));
    assert!(session.can_manage(&simon, &group).await.is_ok());
    assert!(matches!(
        session.can_view(&bert, &group).await,
        Err(AuthzError::Forbidden(_))
    ));

    let implicit = session.resolve_implicit_role(&nico, &group).await.unwrap();
    assert_eq!(implicit.role, None);
    assert!(implicit.can_interact);
}

#[tokio::test]
async fn test_deleted_resources_are_not_found() {
    let store = MemoryMembershipStore::new();
    store.grant("c:cam:doc", "u:cam:nico", "manager").await;
    let service = service(store, EngineConfig::default());
    let mut session = service.session();
    let ctx = ViewerContext::authenticated(Resource::user("cam", "nico", "Nico"));

    let mut doc = private_doc();
    doc.mark_deleted();

    assert!(matches!(session.can_view(&ctx, &doc).await, Err(AuthzError::NotFound(_))));
    assert!(matches!(session.can_manage(&ctx, &doc).await, Err(AuthzError::NotFound(_))));
    assert!(matches!(session.can_interact(&ctx, &doc).await, Err(AuthzError::NotFound(_))));
}

#[tokio::test]
async fn test_library_bucket_assignment() {
    let service = service(MemoryMembershipStore::new(), EngineConfig::default());
    let session = service.session();
    let doc = Resource::new(ResourceKind::Content, "cam", "doc", "Doc")
        .with_visibility(Visibility::LoggedIn);

    assert_eq!(
        session.resolve_library_bucket_visibility("g:cam:team", &doc),
        Ok(Visibility::LoggedIn)
    );
    assert_eq!(
        session.resolve_library_bucket_visibility("g:gt:team", &doc),
        Ok(Visibility::Private)
    );
    assert!(matches!(
        session.resolve_library_bucket_visibility("team", &doc),
        Err(AuthzError::InvalidArgument(_))
    ));
}

#[tokio::test]
async fn test_invitation_lifecycle() {
    let store = MemoryMembershipStore::with_page_size(1);
    store
        .add_invitation(Invitation::new("c:cam:doc", "a@oae.com", "u:cam:nico", "viewer"))
        .await;
    store
        .add_invitation(Invitation::new("c:cam:doc", "b@oae.com", "u:cam:nico", "manager"))
        .await;
    let service = service(store.clone(), paged_config());
    let mut session = service.session();

    let proposed = BTreeMap::from([
        ("A@oae.com".to_string(), RoleChange::role("manager")),
        ("b@oae.com".to_string(), RoleChange::Removed),
        ("c@oae.com".to_string(), RoleChange::role("editor")),
    ]);

    let diff = session
        .compute_invitation_roles_after_changes(
            ResourceKind::Content,
            Some("c:cam:doc"),
            &proposed,
            DiffOptions::default(),
        )
        .await
        .unwrap();
    let kinds: Vec<_> = diff.changes.iter().map(|c| (c.email.as_str(), c.kind)).collect();
    assert_eq!(
        kinds,
        vec![
            ("a@oae.com", ChangeKind::Promoted),
            ("b@oae.com", ChangeKind::Removed),
            ("c@oae.com", ChangeKind::Added),
        ]
    );

    let promote_only = session
        .compute_invitation_roles_after_changes(
            ResourceKind::Content,
            Some("c:cam:doc"),
            &proposed,
            DiffOptions::promote_only(),
        )
        .await
        .unwrap();
    assert_eq!(promote_only.of_kind(ChangeKind::Removed).count(), 0);
    assert_eq!(promote_only.after.len(), 3);

    // Registering converts the invitation into a membership
    store
        .accept_invitation("c:cam:doc", "a@oae.com", "u:cam:ann")
        .await
        .unwrap();
    session.invalidate("c:cam:doc");

    let role = session
        .resolve_effective_role("u:cam:ann", &private_doc())
        .await
        .unwrap();
    assert_eq!(role.as_deref(), Some("viewer"));

    let diff = session
        .compute_invitation_roles_after_changes(
            ResourceKind::Content,
            Some("c:cam:doc"),
            &BTreeMap::from([("a@oae.com".to_string(), RoleChange::Removed)]),
            DiffOptions::default(),
        )
        .await
        .unwrap();
    assert!(diff.is_empty());
}
