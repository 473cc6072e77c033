use std::path::PathBuf;

/// 服务器配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 (数据库、标签缓存) |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | PRINTER_BRIDGE_HOST | - | 打印桥地址 `host[:port]`，未设置则不投递 |
/// | PRINT_MAX_ATTEMPTS | 3 | 每个打印任务最多尝试次数 |
/// | PRINT_RETRY_DELAY_MS | 500 | 重试间隔基数 (线性递增) |
/// | LABEL_RENDERING | on | `off` 时禁用栅格标签渲染 |
/// | LABEL_LOGO_PATH | - | 紧凑布局的 logo 图片 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | - | 日志文件目录 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/srv/bundles PRINTER_BRIDGE_HOST=192.168.1.20:8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 打印桥地址
    pub printer_bridge_host: Option<String>,
    pub print_max_attempts: u32,
    pub print_retry_delay_ms: u64,
    /// 是否启用标签渲染
    pub label_rendering: bool,
    pub label_logo_path: Option<String>,
    pub log_level: String,
    pub log_dir: Option<String>,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置或无法解析，使用默认值
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源加载 (测试用)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            work_dir: non_empty("WORK_DIR").unwrap_or_else(|| "./data".into()),
            http_port: lookup("HTTP_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            printer_bridge_host: non_empty("PRINTER_BRIDGE_HOST"),
            print_max_attempts: lookup("PRINT_MAX_ATTEMPTS")
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(3),
            print_retry_delay_ms: lookup("PRINT_RETRY_DELAY_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(500),
            label_rendering: lookup("LABEL_RENDERING")
                .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "off" | "false" | "0"))
                .unwrap_or(true),
            label_logo_path: non_empty("LABEL_LOGO_PATH"),
            log_level: non_empty("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            log_dir: non_empty("LOG_DIR"),
        }
    }

    /// 使用自定义工作目录 (测试场景)
    pub fn with_work_dir(work_dir: impl Into<String>) -> Self {
        let mut config = Self::from_lookup(|_| None);
        config.work_dir = work_dir.into();
        config
    }

    /// `<WORK_DIR>/bundles.redb`
    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("bundles.redb")
    }

    /// `<WORK_DIR>/cache`
    pub fn cache_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("cache")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let c = config(&[]);
        assert_eq!(c.work_dir, "./data");
        assert_eq!(c.http_port, 3000);
        assert_eq!(c.printer_bridge_host, None);
        assert_eq!(c.print_max_attempts, 3);
        assert_eq!(c.print_retry_delay_ms, 500);
        assert!(c.label_rendering);
        assert_eq!(c.log_level, "info");
        assert_eq!(c.cache_dir(), PathBuf::from("./data").join("cache"));
    }

    #[test]
    fn test_overrides_and_bad_values() {
        let c = config(&[
            ("WORK_DIR", "/srv/b"),
            ("HTTP_PORT", "not-a-port"),
            ("PRINTER_BRIDGE_HOST", "10.0.0.5:8080"),
            ("PRINT_MAX_ATTEMPTS", "0"),
            ("LABEL_RENDERING", "OFF"),
            ("LOG_DIR", " "),
        ]);
        assert_eq!(c.database_path(), PathBuf::from("/srv/b/bundles.redb"));
        assert_eq!(c.http_port, 3000);
        assert_eq!(c.printer_bridge_host.as_deref(), Some("10.0.0.5:8080"));
        assert_eq!(c.print_max_attempts, 3);
        assert!(!c.label_rendering);
        assert_eq!(c.log_dir, None);
    }
}
