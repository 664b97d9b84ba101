//! Resolution through the file-backed and HTTP repositories, configured the
//! way the command line does it

mod common;

use std::fs;

use common::*;
use forge_deps::{
    FailureMode, LocalRepository, RepositoryConfig, RepositoryType, ResolveError, Resolver, ResolverConfig,
};
use forge_deps::config::ConfigLoader;
use httpmock::MockServer;
use tempfile::TempDir;

async fn deploy_fixture(repo: &LocalRepository) {
    repo.deploy(&coord("org.example:app:1.0"), &[dep("org.example:lib:[1.0,2.0)")], b"app")
        .await
        .unwrap();
    repo.deploy(&coord("org.example:lib:1.0"), &[], b"lib 1.0").await.unwrap();
    repo.deploy(&coord("org.example:lib:1.2"), &[], b"lib 1.2").await.unwrap();
    repo.deploy(&coord("org.example:lib:2.0"), &[], b"lib 2.0").await.unwrap();
}

#[tokio::test]
async fn test_local_repository_from_config_file() {
    let repo_dir = TempDir::new().unwrap();
    deploy_fixture(&LocalRepository::new(repo_dir.path())).await;

    let config_dir = TempDir::new().unwrap();
    let config_file = config_dir.path().join("forge-deps.json");
    let config_json = serde_json::json!({
        "repositories": [{"type": "local", "url": repo_dir.path(), "name": "fixture"}],
        "max-concurrency": 2
    });
    fs::write(&config_file, config_json.to_string()).unwrap();

    let config = ResolverConfig::build(Some(config_file.as_path()), false).unwrap();
    assert_eq!(config.repositories[0].repo_type, RepositoryType::Local);
    let resolver = Resolver::from_config(&config).unwrap();
    assert_eq!(resolver.registry().repositories()[0].name(), "fixture");

    let root = resolver
        .resolve_dependency_hierarchy(coord("org.example:app:1.0"))
        .await
        .unwrap();
    assert_eq!(child_ids(&root), vec!["lib"]);
    assert_eq!(root.children()[0].dependency().coordinate().version(), Some("1.2"));

    let lib = resolver.resolve_artifact(coord("org.example:lib:RELEASE")).await.unwrap();
    assert_eq!(lib.coordinate().version(), Some("2.0"));
    assert_eq!(fs::read(lib.artifact().unwrap().path()).unwrap(), b"lib 2.0");

    let versions = resolver.resolve_versions(coord("org.example:lib")).await.unwrap();
    assert_eq!(versions.len(), 3);
}

#[tokio::test]
async fn test_local_malformed_descriptor() {
    let repo_dir = TempDir::new().unwrap();
    let repo = LocalRepository::new(repo_dir.path());
    deploy_fixture(&repo).await;
    fs::write(repo_dir.path().join("org/example/lib/1.2/lib-1.2.deps.json"), "not json").unwrap();

    let config = ResolverConfig::default().with_repository(RepositoryConfig::from_location(
        repo_dir.path().to_str().unwrap(),
    ));
    let resolver = Resolver::from_config(&config).unwrap();
    let err = resolver
        .resolve(coord("org.example:app:1.0"))
        .await
        .unwrap_err();
    assert!(matches!(err, ResolveError::MalformedDescriptor { .. }));

    let resolver = Resolver::from_config(&config.with_failure_mode(FailureMode::Partial)).unwrap();
    let resolution = resolver.resolve(coord("org.example:app:1.0")).await.unwrap();
    assert_eq!(resolution.diagnostics.len(), 1);
    assert!(resolution.diagnostics[0].message.starts_with("Malformed descriptor"));
    assert_eq!(resolution.diagnostics[0].coordinate().unwrap().version(), Some("1.2"));

    let lib = resolution.root.find(&ga("org.example:lib")).unwrap();
    assert!(lib.is_failed());
    assert!(lib.children().is_empty());
}

#[tokio::test]
async fn test_remote_repository_end_to_end() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("GET").path("/forge/org/example/app/versions.json");
        then.status(200).body(r#"{"versions": ["0.9", "1.0"]}"#);
    });
    server.mock(|when, then| {
        when.method("GET").path("/forge/org/example/app/1.0/app-1.0.deps.json");
        then.status(200)
            .body(r#"{"dependencies": [{"coordinate": "org.example:lib:1.0", "scope": "runtime"}]}"#);
    });
    server.mock(|when, then| {
        when.method("GET").path("/forge/org/example/lib/1.0/lib-1.0.deps.json");
        then.status(200).body(r#"{"dependencies": []}"#);
    });
    let artifact = server.mock(|when, then| {
        when.method("GET").path("/forge/org/example/app/1.0/app-1.0.jar");
        then.status(200).body("app bytes");
    });

    let cache_dir = TempDir::new().unwrap();
    let config = ResolverConfig::default()
        .with_cache_dir(cache_dir.path())
        .with_repository(RepositoryConfig::from_location(&server.url("/forge")));
    let resolver = Resolver::from_config(&config).unwrap();

    let root = resolver
        .resolve_dependency_hierarchy(coord("org.example:app:LATEST"))
        .await
        .unwrap();
    assert_eq!(root.dependency().coordinate().version(), Some("1.0"));
    assert_eq!(child_ids(&root), vec!["lib"]);

    let app = resolver.resolve_artifact(coord("org.example:app:1.0")).await.unwrap();
    let path = app.artifact().unwrap().path();
    assert!(path.starts_with(cache_dir.path().join("artifacts")));
    assert_eq!(fs::read_to_string(path).unwrap(), "app bytes");

    // served from the cache the second time
    resolver.resolve_artifact(coord("org.example:app:1.0")).await.unwrap();
    artifact.assert_hits(1);
}

#[tokio::test]
async fn test_remote_client_error_is_not_retried() {
    let server = MockServer::start();
    let forbidden = server.mock(|when, then| {
        when.method("GET").path("/g/a/versions.json");
        then.status(403);
    });

    let cache_dir = TempDir::new().unwrap();
    let mut config = ResolverConfig::default()
        .with_cache_dir(cache_dir.path())
        .with_repository(RepositoryConfig::from_location(&server.base_url()));
    config.max_retries = 3;
    config.retry_delay_ms = 1;
    let resolver = Resolver::from_config(&config).unwrap();

    let err = resolver.resolve_versions(coord("g:a")).await.unwrap_err();
    assert!(matches!(err, ResolveError::RepositoryRejected { ref reason, .. } if reason.contains("403")));
    forbidden.assert_hits(1);
}

#[tokio::test]
async fn test_remote_credentials_from_config() {
    let server = MockServer::start();
    let index = server.mock(|when, then| {
        when.method("GET")
            .path("/private/g/a/versions.json")
            .header("Authorization", "Bearer s3cret");
        then.status(200).body(r#"{"versions": ["1.0"]}"#);
    });

    let cache_dir = TempDir::new().unwrap();
    let config_file = cache_dir.path().join("forge-deps.json");
    let config_json = serde_json::json!({
        "repositories": [{"type": "remote", "url": server.url("/private"), "token": "s3cret"}],
        "cafile": cache_dir.path().join("missing.pem"),
    });
    fs::write(&config_file, config_json.to_string()).unwrap();

    let no_env = ConfigLoader::with_vars(Vec::<(String, String)>::new());
    let config = ResolverConfig::load(Some(config_file.as_path()), &no_env)
        .unwrap()
        .with_cache_dir(cache_dir.path());
    let resolver = Resolver::from_config(&config).unwrap();

    let versions = resolver.resolve_versions(coord("g:a")).await.unwrap();
    assert_eq!(versions.len(), 1);
    index.assert();
}
