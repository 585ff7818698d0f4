//! In-place rewriting of the generated application's `.env` files

use crate::error::Result;
use regex::Regex;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

/// Placeholder `APP_URL` shipped by the base package
pub const APP_URL_PLACEHOLDER: &str = "APP_URL=http://localhost";

/// Placeholder `DB_DATABASE` shipped by the base package
pub const DB_DATABASE_PLACEHOLDER: &str = "DB_DATABASE=laravel";

/// Settings that only make sense for server databases, as whole lines
static SERVER_SETTING_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(DB_(?:HOST|PORT|DATABASE|USERNAME|PASSWORD)=.*)$")
        .expect("server setting pattern is valid")
});

/// The same settings once commented out
static COMMENTED_SERVER_SETTING_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^# (DB_(?:HOST|PORT|DATABASE|USERNAME|PASSWORD)=.*)$")
        .expect("commented server setting pattern is valid")
});

static CONNECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"DB_CONNECTION=.*").expect("connection pattern is valid"));

/// Database engines offered during install
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseEngine {
    Sqlite,
    Mysql,
    MariaDb,
    Pgsql,
    Sqlsrv,
}

impl DatabaseEngine {
    pub const ALL: [DatabaseEngine; 5] = [
        DatabaseEngine::Sqlite,
        DatabaseEngine::Mysql,
        DatabaseEngine::MariaDb,
        DatabaseEngine::Pgsql,
        DatabaseEngine::Sqlsrv,
    ];

    /// Value written to `DB_CONNECTION`
    pub fn key(&self) -> &'static str {
        match self {
            DatabaseEngine::Sqlite => "sqlite",
            DatabaseEngine::Mysql => "mysql",
            DatabaseEngine::MariaDb => "mariadb",
            DatabaseEngine::Pgsql => "pgsql",
            DatabaseEngine::Sqlsrv => "sqlsrv",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            DatabaseEngine::Sqlite => "SQLite",
            DatabaseEngine::Mysql => "MySQL",
            DatabaseEngine::MariaDb => "MariaDB",
            DatabaseEngine::Pgsql => "PostgreSQL",
            DatabaseEngine::Sqlsrv => "SQL Server",
        }
    }

    /// PDO extension the interpreter needs for this engine
    pub fn pdo_extension(&self) -> &'static str {
        match self {
            DatabaseEngine::Sqlite => "pdo_sqlite",
            DatabaseEngine::Mysql | DatabaseEngine::MariaDb => "pdo_mysql",
            DatabaseEngine::Pgsql => "pdo_pgsql",
            DatabaseEngine::Sqlsrv => "pdo_sqlsrv",
        }
    }

    /// Port replacing the MySQL default, if the engine uses another one
    pub fn default_port(&self) -> Option<&'static str> {
        match self {
            DatabaseEngine::Pgsql => Some("5432"),
            DatabaseEngine::Sqlsrv => Some("1433"),
            _ => None,
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.key() == key)
    }
}

impl fmt::Display for DatabaseEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Engines ordered with available ones first, each paired with its label.
/// Unavailable engines keep their relative order and are marked.
pub fn database_options(loaded_modules: &[String]) -> Vec<(DatabaseEngine, String)> {
    let available = |engine: &DatabaseEngine| {
        loaded_modules
            .iter()
            .any(|m| m == engine.pdo_extension())
    };

    let mut engines = DatabaseEngine::ALL.to_vec();
    engines.sort_by_key(|e| if available(e) { 0 } else { 1 });

    engines
        .into_iter()
        .map(|engine| {
            let label = if available(&engine) {
                engine.display_name().to_string()
            } else {
                format!("{} (Missing PDO extension)", engine.display_name())
            };
            (engine, label)
        })
        .collect()
}

/// Database name derived from the project name
pub fn database_name(project_name: &str) -> String {
    project_name.to_lowercase().replace('-', "_")
}

/// Local development URL for the project
pub fn app_url(project_name: &str, tld: &str) -> String {
    format!("http://{}{}", project_name, tld)
}

/// Replace each `search[i]` with `replace[i]` in the file's contents.
/// Missing files are left alone.
pub fn replace_in_file<S: AsRef<str>>(path: &Path, search: &[&str], replace: &[S]) -> Result<()> {
    if !path.is_file() {
        return Ok(());
    }
    let mut contents = fs::read_to_string(path)?;
    for (from, to) in search.iter().zip(replace) {
        contents = contents.replace(from, to.as_ref());
    }
    fs::write(path, contents)?;
    Ok(())
}

/// Replace every regex match in the file's contents; `$1` style groups expand.
/// Missing files are left alone.
pub fn regex_replace_in_file(path: &Path, pattern: &Regex, replacement: &str) -> Result<()> {
    if !path.is_file() {
        return Ok(());
    }
    let contents = fs::read_to_string(path)?;
    let updated = pattern.replace_all(&contents, replacement);
    fs::write(path, updated.as_ref())?;
    Ok(())
}

/// Point `APP_URL` and `DB_DATABASE` in `.env` at the project name
pub fn apply_project_defaults(project_dir: &Path, project_name: &str, tld: &str) -> Result<()> {
    replace_in_file(
        &project_dir.join(".env"),
        &[APP_URL_PLACEHOLDER, DB_DATABASE_PLACEHOLDER],
        &[
            format!("APP_URL={}", app_url(project_name, tld)),
            format!("DB_DATABASE={}", database_name(project_name)),
        ],
    )
}

/// Configure `.env` and `.env.example` for the chosen engine
pub fn configure_database_connection(
    project_dir: &Path,
    engine: DatabaseEngine,
    project_name: &str,
) -> Result<()> {
    let env = project_dir.join(".env");
    let example = project_dir.join(".env.example");
    let connection_line = format!("DB_CONNECTION={}", engine.key());

    for file in [&env, &example] {
        regex_replace_in_file(file, &CONNECTION, &connection_line)?;
    }

    if engine == DatabaseEngine::Sqlite {
        let contents = fs::read_to_string(&env).unwrap_or_default();
        if !contents.contains("# DB_HOST=127.0.0.1") {
            comment_server_settings(project_dir)?;
        }
        return Ok(());
    }

    uncomment_server_settings(project_dir)?;

    if let Some(port) = engine.default_port() {
        let port_line = format!("DB_PORT={}", port);
        for file in [&env, &example] {
            replace_in_file(file, &["DB_PORT=3306"], &[port_line.as_str()])?;
        }
    }

    let name_line = format!("DB_DATABASE={}", database_name(project_name));
    for file in [&env, &example] {
        replace_in_file(file, &[DB_DATABASE_PLACEHOLDER], &[name_line.as_str()])?;
    }

    Ok(())
}

fn comment_server_settings(project_dir: &Path) -> Result<()> {
    for file in [".env", ".env.example"] {
        regex_replace_in_file(&project_dir.join(file), &SERVER_SETTING_LINE, "# $1")?;
    }
    Ok(())
}

fn uncomment_server_settings(project_dir: &Path) -> Result<()> {
    for file in [".env", ".env.example"] {
        regex_replace_in_file(&project_dir.join(file), &COMMENTED_SERVER_SETTING_LINE, "$1")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LARAVEL_ENV: &str = "APP_NAME=Statamic\n\
APP_URL=http://localhost\n\
DB_CONNECTION=sqlite\n\
# DB_HOST=127.0.0.1\n\
# DB_PORT=3306\n\
# DB_DATABASE=laravel\n\
# DB_USERNAME=root\n\
# DB_PASSWORD=\n";

    #[test]
    fn test_database_name_lowercases_and_underscores() {
        assert_eq!(database_name("My-Cool-App"), "my_cool_app");
        assert_eq!(database_name("my-app"), "my_app");
        assert_eq!(database_name("site"), "site");
    }

    #[test]
    fn test_apply_project_defaults_rewrites_placeholders() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(".env"),
            "APP_URL=http://localhost\nDB_DATABASE=laravel\n",
        )
        .unwrap();

        apply_project_defaults(dir.path(), "my-app", ".test").unwrap();
        apply_project_defaults(dir.path(), "my-app", ".test").unwrap();

        let env = fs::read_to_string(dir.path().join(".env")).unwrap();
        assert!(env.contains("APP_URL=http://my-app.test"));
        assert!(env.contains("DB_DATABASE=my_app"));
        assert!(!env.contains(APP_URL_PLACEHOLDER));
        assert!(!env.contains(DB_DATABASE_PLACEHOLDER));
        assert_eq!(env.matches("APP_URL=").count(), 1);
    }

    #[test]
    fn test_apply_project_defaults_ignores_missing_env() {
        let dir = tempfile::tempdir().unwrap();
        apply_project_defaults(dir.path(), "my-app", ".test").unwrap();
        assert!(!dir.path().join(".env").exists());
    }

    #[test]
    fn test_configure_mysql_uncomments_server_settings() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".env"), LARAVEL_ENV).unwrap();
        fs::write(dir.path().join(".env.example"), LARAVEL_ENV).unwrap();

        configure_database_connection(dir.path(), DatabaseEngine::Mysql, "My-Site").unwrap();

        for file in [".env", ".env.example"] {
            let env = fs::read_to_string(dir.path().join(file)).unwrap();
            assert!(env.contains("DB_CONNECTION=mysql"));
            assert!(env.contains("\nDB_HOST=127.0.0.1"));
            assert!(env.contains("\nDB_PORT=3306"));
            assert!(env.contains("\nDB_DATABASE=my_site"));
            assert!(!env.contains("# DB_"));
        }
    }

    #[test]
    fn test_configure_pgsql_uses_default_port() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".env"), LARAVEL_ENV).unwrap();

        configure_database_connection(dir.path(), DatabaseEngine::Pgsql, "blog").unwrap();

        let env = fs::read_to_string(dir.path().join(".env")).unwrap();
        assert!(env.contains("DB_CONNECTION=pgsql"));
        assert!(env.contains("DB_PORT=5432"));
        assert!(env.contains("DB_DATABASE=blog"));
    }

    #[test]
    fn test_configure_sqlite_comments_server_settings() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(".env"),
            "DB_CONNECTION=mysql\nDB_HOST=127.0.0.1\nDB_PORT=3306\nDB_DATABASE=laravel\nDB_USERNAME=root\nDB_PASSWORD=\n",
        )
        .unwrap();

        configure_database_connection(dir.path(), DatabaseEngine::Sqlite, "blog").unwrap();

        let env = fs::read_to_string(dir.path().join(".env")).unwrap();
        assert!(env.contains("DB_CONNECTION=sqlite"));
        assert!(env.contains("# DB_HOST=127.0.0.1"));
        assert!(env.contains("# DB_PASSWORD="));
    }

    #[test]
    fn test_configure_mysql_after_project_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".env"), LARAVEL_ENV).unwrap();

        apply_project_defaults(dir.path(), "my-app", ".test").unwrap();
        configure_database_connection(dir.path(), DatabaseEngine::Mysql, "my-app").unwrap();

        let env = fs::read_to_string(dir.path().join(".env")).unwrap();
        assert!(env.contains("\nDB_DATABASE=my_app"));
        assert!(env.contains("\nDB_HOST=127.0.0.1"));
    }

    #[test]
    fn test_database_options_orders_available_first() {
        let modules = vec!["pdo_pgsql".to_string(), "pdo_sqlite".to_string()];
        let options = database_options(&modules);

        let keys: Vec<&str> = options.iter().map(|(e, _)| e.key()).collect();
        assert_eq!(keys, vec!["sqlite", "pgsql", "mysql", "mariadb", "sqlsrv"]);
        assert_eq!(options[0].1, "SQLite");
        assert_eq!(options[2].1, "MySQL (Missing PDO extension)");
    }

    #[test]
    fn test_engine_from_key() {
        assert_eq!(DatabaseEngine::from_key("mariadb"), Some(DatabaseEngine::MariaDb));
        assert_eq!(DatabaseEngine::from_key("mongo"), None);
    }
}
