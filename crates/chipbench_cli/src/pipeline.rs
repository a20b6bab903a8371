//! Shared helpers for CLI commands: project root lookup and configuration
//! loading with environment overrides.

use std::path::{Path, PathBuf};

use chipbench_config::{load_config, EnvOverrides, ProjectConfig, CONFIG_FILE_NAME};

use crate::GlobalArgs;

/// A loaded project: where it lives and its effective configuration.
pub struct Project {
    /// Directory holding `chipbench.toml`.
    pub dir: PathBuf,
    /// Configuration after environment and CLI overrides.
    pub config: ProjectConfig,
    /// Home directory for `~` expansion.
    pub home: Option<PathBuf>,
}

/// Walks up from `start` looking for the nearest directory containing
/// `chipbench.toml`.
pub fn find_project_root(start: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE_NAME).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(format!(
                "could not find {CONFIG_FILE_NAME} in {} or any parent directory",
                start.display()
            )
            .into());
        }
    }
}

/// Resolves the project root directory from global CLI args.
///
/// If `--config` is given, uses that path (file → parent dir, dir → itself).
/// Otherwise walks up from the current directory.
pub fn resolve_project_root(global: &GlobalArgs) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(ref config_path) = global.config {
        let p = PathBuf::from(config_path);
        if p.is_file() {
            Ok(p.parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".")))
        } else {
            Ok(p)
        }
    } else {
        find_project_root(&std::env::current_dir()?)
    }
}

/// Loads the project configuration and applies overrides in order:
/// file, then environment, then `--gl`.
pub fn load_project(
    global: &GlobalArgs,
    env: &EnvOverrides,
    gate_level: bool,
) -> Result<Project, Box<dyn std::error::Error>> {
    let dir = resolve_project_root(global)?;
    let mut config = env.apply(&load_config(&dir)?);
    if gate_level {
        config.simulation.gate_level = true;
    }
    tracing::debug!(
        project = %config.project.name,
        dir = %dir.display(),
        backend = %config.simulation.backend,
        gate_level = config.simulation.gate_level,
        "loaded project"
    );
    Ok(Project {
        dir,
        config,
        home: env.home.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const CONFIG: &str = "[project]\nname = \"counter\"\ntop = \"chip_top\"\n";

    fn global_with(config: Option<String>) -> GlobalArgs {
        GlobalArgs {
            quiet: false,
            verbose: false,
            color: false,
            config,
        }
    }

    #[test]
    fn find_project_root_in_current_dir() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE_NAME), CONFIG).unwrap();
        assert_eq!(find_project_root(tmp.path()).unwrap(), tmp.path());
    }

    #[test]
    fn find_project_root_in_parent() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE_NAME), CONFIG).unwrap();
        let sub = tmp.path().join("test");
        fs::create_dir_all(&sub).unwrap();
        assert_eq!(find_project_root(&sub).unwrap(), tmp.path());
    }

    #[test]
    fn find_project_root_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = find_project_root(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("could not find chipbench.toml"));
    }

    #[test]
    fn resolve_project_root_from_config_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, CONFIG).unwrap();
        let global = global_with(Some(path.to_str().unwrap().to_string()));
        assert_eq!(resolve_project_root(&global).unwrap(), tmp.path());
    }

    #[test]
    fn resolve_project_root_from_config_dir() {
        let tmp = TempDir::new().unwrap();
        let global = global_with(Some(tmp.path().to_str().unwrap().to_string()));
        assert_eq!(resolve_project_root(&global).unwrap(), tmp.path());
    }

    #[test]
    fn overrides_apply_in_order() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE_NAME),
            format!("{CONFIG}\n[pdk]\nroot = \"/opt/pdks\"\n"),
        )
        .unwrap();
        let global = global_with(Some(tmp.path().to_str().unwrap().to_string()));
        let env = EnvOverrides::from_lookup(|key| match key {
            "PDK_ROOT" => Some("/env/pdks".to_string()),
            "GL" => Some("0".to_string()),
            "HOME" => Some("/home/dev".to_string()),
            _ => None,
        });

        let project = load_project(&global, &env, false).unwrap();
        assert_eq!(project.config.pdk.root, "/env/pdks");
        assert!(!project.config.simulation.gate_level);
        assert_eq!(project.home, Some(PathBuf::from("/home/dev")));

        let project = load_project(&global, &env, true).unwrap();
        assert!(project.config.simulation.gate_level);
    }
}
