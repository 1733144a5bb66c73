//! 共享测试工具和辅助函数

#![allow(dead_code)]

use std::env;
use std::sync::Arc;

use ga_domains_backend::{
    BackendConfig, DnsRecordInput, DnsRecordStore, DnsRecordType, RestBackend, create_backend,
};

/// 跳过测试的宏（当环境变量缺失时）
#[macro_export]
macro_rules! skip_if_no_credentials {
    ($($var:expr),+) => {
        $(
            if std::env::var($var).is_err() {
                eprintln!("跳过测试: 缺少环境变量 {}", $var);
                return;
            }
        )+
    };
}

/// 断言 `Option` 为 `Some`，并解包返回内部值（失败则直接让测试失败）。
#[macro_export]
macro_rules! require_some {
    ($expr:expr, $($msg:tt)+) => {{
        let opt = $expr;
        assert!(opt.is_some(), "{}", format_args!($($msg)+));
        let Some(val) = opt else {
            return;
        };
        val
    }};
}

/// 断言 `Result` 为 `Ok`，并解包返回内部值（失败则直接让测试失败）。
#[macro_export]
macro_rules! require_ok {
    ($expr:expr, $($msg:tt)+) => {{
        let res = $expr;
        assert!(
            res.is_ok(),
            "{}: {res:?}",
            format_args!($($msg)+)
        );
        let Ok(val) = res else {
            return;
        };
        val
    }};
}

/// 生成唯一的测试记录名称
pub fn generate_test_record_name() -> String {
    let uuid = uuid::Uuid::new_v4();
    format!("_test-{}", &uuid.to_string()[..8])
}

/// TXT 测试记录
pub fn test_txt_record(name: &str, value: &str) -> DnsRecordInput {
    DnsRecordInput {
        record_type: DnsRecordType::Txt,
        name: name.to_string(),
        value: value.to_string(),
        ttl: 600,
        priority: None,
    }
}

/// 测试上下文 - 封装 backend 和测试域名
pub struct TestContext {
    pub backend: Arc<RestBackend>,
    pub domain: String,
}

impl TestContext {
    /// 从 `GA_BACKEND_URL` / `GA_API_TOKEN` / `TEST_DOMAIN` 创建
    pub fn from_env() -> Option<Self> {
        let base_url = env::var("GA_BACKEND_URL").ok()?;
        let domain = env::var("TEST_DOMAIN").ok()?;
        let mut config = BackendConfig::new(base_url);
        if let Ok(token) = env::var("GA_API_TOKEN") {
            config = config.with_api_token(token);
        }
        let backend = create_backend(&config).ok()?;
        Some(Self { backend, domain })
    }

    /// 查找并清理所有测试记录（以 _test- 开头的记录）
    pub async fn cleanup_all_test_records(&self) {
        if let Ok(records) = self.backend.list_records(&self.domain).await {
            let ids: Vec<String> = records
                .into_iter()
                .filter(|r| r.name.contains("_test-"))
                .map(|r| r.id)
                .collect();
            let _ = self.backend.delete_records(&self.domain, &ids).await;
        }
    }
}
