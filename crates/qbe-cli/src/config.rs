use qbe::QuoteStyle;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct ProjectConfig {
    pub file: ConfigFile,
}

impl ProjectConfig {
    pub fn load(config_path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(config_path).map_err(|e| {
            anyhow::anyhow!(
                "failed to read config file {}: {e}",
                config_path.display()
            )
        })?;

        let file = ConfigFile::parse(&raw).map_err(|e| {
            anyhow::anyhow!(
                "failed to load config file {}: {e:#}",
                config_path.display()
            )
        })?;

        Ok(Self { file })
    }

    /// Load the config if the file exists, otherwise use defaults.
    pub fn load_or_default(config_path: &Path) -> anyhow::Result<Self> {
        if config_path.exists() {
            Self::load(config_path)
        } else {
            Ok(Self {
                file: ConfigFile::default(),
            })
        }
    }

    /// Connection string: flag, then config file, then `DATABASE_URL`.
    pub fn database_url(&self, flag: Option<&str>) -> anyhow::Result<String> {
        if let Some(url) = flag {
            return Ok(url.to_string());
        }
        if let Some(url) = self.file.database.url.as_deref() {
            return Ok(url.to_string());
        }
        std::env::var("DATABASE_URL").map_err(|_| {
            anyhow::anyhow!("no database configured: pass --database, set [database].url, or set DATABASE_URL")
        })
    }

    /// Quote style: flag, then config file.
    pub fn quote_style(&self, flag: Option<&str>) -> anyhow::Result<QuoteStyle> {
        match flag {
            Some(name) => parse_quote_style(name),
            None => Ok(self.file.compiler.quote_style),
        }
    }
}

fn parse_quote_style(name: &str) -> anyhow::Result<QuoteStyle> {
    QuoteStyle::from_name(name)
        .ok_or_else(|| anyhow::anyhow!("unknown quote style: {name} (expected backtick or double)"))
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub compiler: CompilerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_version() -> String {
    "1".to_string()
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            version: default_version(),
            database: DatabaseConfig::default(),
            compiler: CompilerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    /// Schema for unqualified tables and the query search path.
    pub default_schema: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompilerConfig {
    #[serde(default)]
    pub quote_style: QuoteStyle,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive, e.g. `qbe=debug`.
    pub filter: Option<String>,
}

impl ConfigFile {
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let mut file: ConfigFile = toml::from_str(raw)?;
        file.expand_env()?;
        file.validate()?;
        Ok(file)
    }

    fn expand_env(&mut self) -> anyhow::Result<()> {
        if let Some(url) = self.database.url.as_mut() {
            *url = expand_env_vars(url)?;
        }
        if let Some(schema) = self.database.default_schema.as_mut() {
            *schema = expand_env_vars(schema)?;
        }
        if let Some(filter) = self.logging.filter.as_mut() {
            *filter = expand_env_vars(filter)?;
        }
        Ok(())
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.version.trim() != "1" {
            anyhow::bail!("unsupported config version: {}", self.version);
        }
        if let Some(url) = &self.database.url {
            if url.trim().is_empty() {
                anyhow::bail!("database.url must not be empty");
            }
        }
        if let Some(schema) = &self.database.default_schema {
            if schema.trim().is_empty() {
                anyhow::bail!("database.default_schema must not be empty");
            }
        }
        Ok(())
    }
}

/// Substitute every `${NAME}` with the environment value of `NAME`.
fn expand_env_vars(input: &str) -> anyhow::Result<String> {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            anyhow::bail!("unclosed `${{` in config value {input:?}");
        };
        let name = &after[..end];
        if name.is_empty() {
            anyhow::bail!("empty variable name in config value {input:?}");
        }
        let value = std::env::var(name)
            .map_err(|_| anyhow::anyhow!("environment variable {name} is not set (used in config)"))?;
        out.push_str(&value);
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_config() {
        let file = ConfigFile::parse(
            r#"
version = "1"

[database]
url = "postgres://localhost/app"
default_schema = "sales"

[compiler]
quote_style = "double_quote"

[logging]
filter = "qbe=debug"
"#,
        )
        .unwrap();

        assert_eq!(file.database.url.as_deref(), Some("postgres://localhost/app"));
        assert_eq!(file.database.default_schema.as_deref(), Some("sales"));
        assert_eq!(file.compiler.quote_style, QuoteStyle::DoubleQuote);
        assert_eq!(file.logging.filter.as_deref(), Some("qbe=debug"));
    }

    #[test]
    fn empty_config_uses_defaults() {
        let file = ConfigFile::parse("").unwrap();
        assert_eq!(file.version, "1");
        assert!(file.database.url.is_none());
        assert_eq!(file.compiler.quote_style, QuoteStyle::Backtick);
    }

    #[test]
    fn rejects_unknown_version() {
        assert!(ConfigFile::parse(r#"version = "2""#).is_err());
    }

    #[test]
    fn rejects_empty_url() {
        assert!(ConfigFile::parse("[database]\nurl = \"  \"").is_err());
    }

    #[test]
    fn expands_env_vars() {
        let path = std::env::var("PATH").unwrap_or_default();
        assert_eq!(expand_env_vars("x${PATH}y").unwrap(), format!("x{path}y"));
        assert_eq!(expand_env_vars("no vars").unwrap(), "no vars");
        assert!(expand_env_vars("${").is_err());
        assert!(expand_env_vars("${}").is_err());
        assert!(expand_env_vars("${QBE_SURELY_UNSET_VARIABLE}").is_err());
        assert_eq!(
            expand_env_vars("${PATH}:${PATH}").unwrap(),
            format!("{path}:{path}")
        );
        assert_eq!(expand_env_vars("$PATH and $").unwrap(), "$PATH and $");
    }

    #[test]
    fn quote_flag_overrides_config() {
        let config = ProjectConfig {
            file: ConfigFile::default(),
        };
        assert_eq!(config.quote_style(None).unwrap(), QuoteStyle::Backtick);
        assert_eq!(
            config.quote_style(Some("double")).unwrap(),
            QuoteStyle::DoubleQuote
        );
        assert!(config.quote_style(Some("brackets")).is_err());
    }

    #[test]
    fn database_flag_wins() {
        let mut file = ConfigFile::default();
        file.database.url = Some("postgres://from-config".into());
        let config = ProjectConfig { file };
        assert_eq!(
            config.database_url(Some("postgres://from-flag")).unwrap(),
            "postgres://from-flag"
        );
        assert_eq!(config.database_url(None).unwrap(), "postgres://from-config");
    }
}
