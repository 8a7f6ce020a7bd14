//! Tests for server/handlers/definition.rs - Go-to-definition handler

mod common;

use awilix_lsp::server::config::{AwilixConfig, FeatureConfig};
use awilix_lsp::server::handlers::{handle_definition, resolve_definitions};
use awilix_lsp::server::LspError;
use common::{make_params, TestFixture};
use tower_lsp::lsp_types::{GotoDefinitionResponse, Location, Position, Range};

const CONTAINER: &str = r#"const awilix = require('awilix');
const UserService = require('./services/user');

const container = awilix.createContainer();
container.register({
  userService: awilix.asClass(UserService),
  logger: asValue(console),
  config: asValue('production'),
});
"#;

fn locations(response: Option<GotoDefinitionResponse>) -> Vec<Location> {
    match response {
        Some(GotoDefinitionResponse::Array(locations)) => locations,
        Some(GotoDefinitionResponse::Scalar(location)) => vec![location],
        Some(GotoDefinitionResponse::Link(_)) => panic!("unexpected link response"),
        None => Vec::new(),
    }
}

#[tokio::test]
async fn test_definition_of_registration() {
    let fixture = TestFixture::new().await;
    let container_uri = fixture.create_file("src/container.js", CONTAINER);
    let uri = fixture.open_file("src/routes.js", "const svc = scope.resolve('logger');\nlogger.info();");

    let result = handle_definition(make_params(uri, 1, 2), &fixture.state).await;
    let found = locations(result);

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].uri, container_uri);
    assert_eq!(
        found[0].range,
        Range::new(Position::new(6, 2), Position::new(6, 8))
    );
}

#[tokio::test]
async fn test_definition_of_variable() {
    let fixture = TestFixture::new().await;
    let container_uri = fixture.create_file("container.js", CONTAINER);
    let uri = fixture.open_file("app.js", "new UserService();");

    let found = locations(handle_definition(make_params(uri, 0, 6), &fixture.state).await);

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].uri, container_uri);
    assert_eq!(found[0].range.start, Position::new(1, 6));
}

#[tokio::test]
async fn test_definition_in_both_tables() {
    let fixture = TestFixture::new().await;
    fixture.create_file(
        "container.js",
        "const db = connect();\ncontainer.register({ db: asValue(db) });",
    );
    let uri = fixture.open_file("app.js", "db.query();");

    let found = locations(handle_definition(make_params(uri, 0, 0), &fixture.state).await);

    assert_eq!(found.len(), 2);
    assert_eq!(found[0].range.start, Position::new(1, 21));
    assert_eq!(found[1].range.start, Position::new(0, 6));
}

#[tokio::test]
async fn test_unknown_symbol() {
    let fixture = TestFixture::new().await;
    fixture.create_file("container.js", CONTAINER);
    let uri = fixture.open_file("app.js", "mailer.send();");

    let result = handle_definition(make_params(uri, 0, 3), &fixture.state).await;
    assert!(result.is_none());
}

#[tokio::test]
async fn test_no_definitions_from_the_container_itself() {
    let fixture = TestFixture::new().await;
    let uri = fixture.open_file("container.js", CONTAINER);

    let result = handle_definition(make_params(uri, 5, 4), &fixture.state).await;
    assert!(result.is_none());
}

#[tokio::test]
async fn test_definition_disabled() {
    let fixture = TestFixture::new().await;
    fixture.create_file("container.js", CONTAINER);
    let uri = fixture.open_file("app.js", "logger.info();");

    fixture
        .state
        .config
        .update(AwilixConfig {
            features: FeatureConfig { definition: false },
            ..AwilixConfig::default()
        })
        .await;

    let result = handle_definition(make_params(uri, 0, 2), &fixture.state).await;
    assert!(result.is_none());
}

#[tokio::test]
async fn test_document_not_open() {
    let fixture = TestFixture::new().await;
    fixture.create_file("container.js", CONTAINER);
    let uri = fixture.create_file("app.js", "logger.info();");

    let result = handle_definition(make_params(uri, 0, 2), &fixture.state).await;
    assert!(result.is_none());
}

#[tokio::test]
async fn test_cursor_outside_identifier() {
    let fixture = TestFixture::new().await;
    fixture.create_file("container.js", CONTAINER);
    let uri = fixture.open_file("app.js", "logger.info(  );");

    let result = handle_definition(make_params(uri, 0, 13), &fixture.state).await;
    assert!(result.is_none());
}

#[tokio::test]
async fn test_missing_container() {
    let fixture = TestFixture::new().await;
    let uri = fixture.open_file("app.js", "logger.info();");

    let result = resolve_definitions(&fixture.state, &uri, "logger").await;
    assert!(matches!(result, Err(LspError::ContainerNotFound { .. })));
    assert!(handle_definition(make_params(uri, 0, 2), &fixture.state)
        .await
        .is_none());
}

#[tokio::test]
async fn test_unparseable_container_finds_nothing() {
    let fixture = TestFixture::new().await;
    fixture.create_file("container.js", "container.register({ logger: asValue(console)");
    let uri = fixture.open_file("app.js", "logger.info();");

    let found = resolve_definitions(&fixture.state, &uri, "logger").await.unwrap();
    assert!(found.is_empty());
}

#[tokio::test]
async fn test_open_container_content_wins() {
    let fixture = TestFixture::new().await;
    let container_uri = fixture.create_file("container.js", CONTAINER);
    let uri = fixture.open_file("app.js", "mailer.send();");

    assert!(resolve_definitions(&fixture.state, &uri, "mailer")
        .await
        .unwrap()
        .is_empty());

    fixture.state.document_manager.open(
        container_uri.clone(),
        "container.register({\n  mailer: asClass(Mailer),\n});".into(),
        2,
    );

    let found = resolve_definitions(&fixture.state, &uri, "mailer").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].uri, container_uri);
    assert_eq!(found[0].range.start, Position::new(1, 2));
}

#[tokio::test]
async fn test_container_edit_on_disk_after_invalidate() {
    let fixture = TestFixture::new().await;
    let container_uri = fixture.create_file("container.js", CONTAINER);
    let uri = fixture.open_file("app.js", "mailer.send();");

    assert!(resolve_definitions(&fixture.state, &uri, "mailer")
        .await
        .unwrap()
        .is_empty());

    fixture.create_file("container.js", "container.register({ mailer: asClass(Mailer) });");
    fixture
        .state
        .cache
        .invalidate(&container_uri.to_file_path().unwrap());

    let found = resolve_definitions(&fixture.state, &uri, "mailer").await.unwrap();
    assert_eq!(found.len(), 1);
}

#[tokio::test]
async fn test_configured_container_file() {
    let fixture = TestFixture::new().await;
    fixture.create_file("container.js", "container.register({ decoy: asValue(1) });");
    let ioc_uri = fixture.create_file(
        "src/ioc.js",
        "container.register({ mailer: asClass(Mailer) });",
    );
    fixture.create_file("awilix.toml", "containerFile = \"ioc.js\"\n");
    fixture
        .state
        .config
        .load_from_workspace(fixture.temp_dir.path())
        .await
        .unwrap();
    fixture.state.reset_container();

    let uri = fixture.open_file("app.js", "mailer.send();");
    let found = locations(handle_definition(make_params(uri, 0, 1), &fixture.state).await);

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].uri, ioc_uri);
}
