//! End-to-end generation over the contract fixtures.

use std::path::{Path, PathBuf};

use webapigen_core::{check, diagnostics, generate, Config, GenerationReport, Severity};

fn fixture(name: &str) -> String {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/contracts")
        .join(name)
        .display()
        .to_string()
}

fn config(output_dir: &Path) -> Config {
    let mut config = Config::new("fixtures", fixture("users.yaml"), output_dir.display().to_string());
    config.contract_paths.push(fixture("orders.yaml"));
    config
}

fn unit<'a>(report: &'a GenerationReport, file_name: &str) -> &'a str {
    report
        .units
        .iter()
        .find(|u| u.file_name == file_name)
        .map(|u| u.text.as_str())
        .unwrap_or_else(|| panic!("{file_name} was not generated"))
}

#[tokio::test(flavor = "multi_thread")]
async fn test_generate_fixtures() -> webapigen_core::Result<()> {
    let dir = tempfile::tempdir()?;
    let report = generate(&config(&dir.path().join("out")), true).await?;

    assert_eq!(report.interfaces, vec!["IUserApi", "IOrderApi"]);
    assert!(report.written.is_empty());

    let codes: Vec<_> = report.diagnostics.iter().map(|d| d.code).collect();
    assert_eq!(
        codes,
        vec![
            diagnostics::DUPLICATE_DECLARATION,
            diagnostics::MISSING_VERB,
            diagnostics::UNKNOWN_ANCESTOR,
            diagnostics::UNMATCHED_PLACEHOLDER,
        ]
    );
    assert!(!report.has_errors());
    assert_eq!(report.diagnostics[1].location.symbol, "IUserApi.Describe");

    let files: Vec<_> = report.units.iter().map(|u| u.file_name.as_str()).collect();
    assert_eq!(
        files,
        vec![
            "i_order_api_wrap.rs",
            "i_order_api_wrap_impl.rs",
            "i_user_api_wrap.rs",
            "i_user_api_wrap_impl.rs",
            "mod.rs",
            "order_api.rs",
            "user_api.rs",
            "web_api_registration.rs",
            "web_api_support.rs",
        ]
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_primary_client() -> webapigen_core::Result<()> {
    let dir = tempfile::tempdir()?;
    let report = generate(&config(dir.path()), true).await?;
    let client = unit(&report, "user_api.rs");

    assert!(client.starts_with("//! UserApi\n"));
    assert!(client.contains("use async_trait::async_trait;\n"));
    assert!(client.contains("pub trait IUserApi: Send + Sync {"));
    assert!(client.contains("/// Includes the methods of `IAuditApi`."));
    assert!(client.contains(
        "async fn get_audit_async(&self, ids: Vec<String>, tags: Vec<String>) -> Result<Vec<AuditEntry>, WebApiError>;"
    ));
    assert!(!client.contains("fn describe("));
    assert!(client.contains("pub const BASE_ADDRESS: &'static str = \"https://api.example.com\";"));
    assert!(client.contains("pub const TIMEOUT_SECS: Option<u64> = Some(60);"));

    // One set of hooks per method, inherited ones included
    assert_eq!(client.matches("fn on_get_audit_async_before(").count(), 1);
    assert_eq!(client.matches("fn on_get_user_async_error(").count(), 1);

    // Array queries, repeated and joined
    assert!(client.contains("for item in ids.iter() {"));
    assert!(client.contains("query.push((\"ids\".to_string(), encode_query_value(&item.to_string())));"));
    assert!(client.contains(
        "let tags_values: Vec<String> = tags.iter().map(|item| encode_query_value(&item.to_string())).collect();"
    ));
    assert!(client.contains("query.push((\"tag\".to_string(), tags_values.join(\";\")));"));

    // Content type: parameter, then method, then interface media type
    assert!(client.contains(
        ".header(reqwest::header::CONTENT_TYPE, \"application/custom\").body(payload.to_string());"
    ));
    assert!(client.contains(
        ".header(reqwest::header::CONTENT_TYPE, \"application/json\").body(serde_json::to_string(&user)?);"
    ));

    assert!(client.contains("let status = status.or_else(|| Some(UserStatus::Disabled));"));
    assert!(client.contains("let path = format!(\"/users/{}\", id);"));
    assert!(client.contains("builder = builder.header(\"Authorization\", token.to_string());"));
    assert!(client.contains("send_request(&self.client, request, Some(&cancel)).await?;"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_wrap_layers() -> webapigen_core::Result<()> {
    let dir = tempfile::tempdir()?;
    let report = generate(&config(dir.path()), true).await?;

    let wrap = unit(&report, "i_user_api_wrap.rs");
    assert!(wrap.contains("pub trait IUserApiWrap: Send + Sync {"));
    assert!(wrap.contains(
        "async fn get_user_tenant_async(&self, id: i64, cancel: CancellationToken) -> Result<UserDto, WebApiError>;"
    ));
    assert!(wrap.contains(
        "async fn get_user_user_async(&self, id: i64, cancel: CancellationToken) -> Result<UserDto, WebApiError>;"
    ));
    assert!(wrap.contains("async fn create_user_async(&self, user: CreateUser) -> Result<UserDto, WebApiError>;"));
    assert!(!wrap.contains("import_users_async"));

    let wrap_impl = unit(&report, "i_user_api_wrap_impl.rs");
    assert!(wrap_impl.contains("impl IUserApiWrap for UserApiWrap {"));
    assert!(wrap_impl.contains("let token = self.token_manage.get_tenant_token_async().await?;"));
    assert!(wrap_impl.contains("let token = self.token_manage.get_user_token_async().await?;"));
    assert!(wrap_impl.contains("self.api.get_user_async(id, token, cancel).await"));
    assert!(wrap_impl.contains("self.api.create_user_async(user, token).await"));

    let orders = unit(&report, "i_order_api_wrap_impl.rs");
    assert!(orders.contains(
        "pub fn new(api: Arc<dyn IOrderApi>, token_manage: Arc<dyn IOrderTokens>) -> Self {"
    ));
    assert!(orders.contains("impl IOrders for Orders {"));
    assert!(orders.contains("let result: Result<u64, WebApiError> = (|| -> Result<u64, WebApiError> {"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_registration_and_index() -> webapigen_core::Result<()> {
    let dir = tempfile::tempdir()?;
    let report = generate(&config(dir.path()), true).await?;

    let registration = unit(&report, "web_api_registration.rs");
    assert!(registration.contains(
        "pub fn add_web_api_http_client(registry: &mut WebApiRegistry) -> Result<(), WebApiError> {"
    ));
    assert!(registration.contains("registry.add_http_client::<dyn IUserApi>(UserApi::BASE_ADDRESS,"));
    assert!(registration.contains("pub fn add_web_api_http_client_wrap(registry: &mut WebApiRegistry) {"));
    assert!(registration.contains("pub fn add_admin_web_api_http_client(registry: &mut WebApiRegistry)"));
    assert!(registration.contains(
        "registry.add_transient::<dyn IOrders, _>(|registry| Ok(Arc::new(Orders::new(registry.resolve::<dyn IOrderApi>()?, registry.resolve::<dyn IOrderTokens>()?))));"
    ));

    let index = unit(&report, "mod.rs");
    for module in [
        "i_order_api_wrap",
        "i_user_api_wrap_impl",
        "order_api",
        "user_api",
        "web_api_registration",
        "web_api_support",
    ] {
        assert!(index.contains(&format!("mod {module};\npub use {module}::*;")), "{module}");
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_write_and_filters() -> webapigen_core::Result<()> {
    let dir = tempfile::tempdir()?;
    let out: PathBuf = dir.path().join("generated");
    let mut config = config(&out);
    config.include_interfaces = vec!["IOrderApi".to_string()];
    config.emit_module_index = false;

    let report = generate(&config, false).await?;
    assert_eq!(report.interfaces, vec!["IOrderApi"]);
    assert_eq!(report.written.len(), 5);
    assert!(out.join("order_api.rs").exists());
    assert!(out.join("web_api_support.rs").exists());
    assert!(!out.join("user_api.rs").exists());
    assert!(!out.join("mod.rs").exists());
    Ok(())
}

#[tokio::test]
async fn test_check_reports_without_rendering() -> webapigen_core::Result<()> {
    let dir = tempfile::tempdir()?;
    let report = check(&config(dir.path())).await?;
    assert_eq!(report.interfaces, vec!["IUserApi", "IOrderApi"]);
    assert!(report.units.is_empty());
    assert_eq!(report.count(Severity::Warning), 4);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sync_method_runs_through_block_on() -> webapigen_core::Result<()> {
    let dir = tempfile::tempdir()?;
    let report = generate(&config(dir.path()), true).await?;

    let orders = unit(&report, "order_api.rs");
    assert!(orders.contains("fn count_orders(&self) -> Result<u64, WebApiError>;"));
    assert!(orders.contains("let result: Result<u64, WebApiError> = block_on(async {"));

    let support = unit(&report, "web_api_support.rs");
    assert!(support.contains("pub fn block_on<T, F>(future: F) -> Result<T, WebApiError>"));
    assert!(support.contains("Err(_) => run_detached(future),"));
    Ok(())
}

const CLASH: &str = r#"
interfaces:
  - name: IClashApi
    attributes: [{ HttpClientApi: { base_address: "http://localhost:8080" } }]
    methods:
      - name: FindAsync
        returns: { type: String, async: true }
        attributes: [{ Post: /find }]
        parameters:
          - { name: query, type: String, attributes: [Query] }
          - { name: url, type: String, attributes: [{ Header: X-Url }] }
          - { name: body, type: SearchRequest, attributes: [Body] }
"#;

#[tokio::test(flavor = "multi_thread")]
async fn test_parameters_keep_their_names() -> webapigen_core::Result<()> {
    let dir = tempfile::tempdir()?;
    let contract = dir.path().join("clash.yaml");
    tokio::fs::write(&contract, CLASH).await?;
    let config = Config::new(
        "clash",
        contract.display().to_string(),
        dir.path().join("out").display().to_string(),
    );

    let report = generate(&config, true).await?;
    assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);
    let client = unit(&report, "clash_api.rs");

    assert!(client.contains(
        "async fn find_async(&self, query: String, url: String, body: SearchRequest) -> Result<String, WebApiError>;"
    ));
    assert!(client.contains("let mut query_: Vec<(String, String)> = Vec::new();"));
    assert!(client.contains("query_.push((\"query\".to_string(), encode_query_value(&query)));"));
    assert!(client.contains("let url_ = build_url(&self.base_address, &path, &query_);"));
    assert!(client.contains("builder = builder.header(\"X-Url\", url.to_string());"));
    assert!(client.contains(".body(serde_json::to_string(&body)?);"));
    assert!(client.contains("let body_ = read_body(response, None).await.unwrap_or_default();"));
    assert!(!client.contains("let mut query:"));
    assert!(!client.contains("let url ="));
    Ok(())
}
