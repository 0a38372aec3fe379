#[cfg(test)]
mod tests {
    use super::super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_path_precedence() {
        let cli = ConfigSource::resolve(Some(Path::new("cli.toml")), Some("env.toml".into()));
        assert_eq!(cli.path, PathBuf::from("cli.toml"));
        assert!(cli.explicit);

        let env = ConfigSource::resolve(None, Some("env.toml".into()));
        assert_eq!(env.path, PathBuf::from("env.toml"));
        assert!(env.explicit);

        let default = ConfigSource::resolve(None, Some(String::new()));
        assert_eq!(default.path, PathBuf::from(DEFAULT_CONFIG_FILE));
        assert!(!default.explicit);
    }

    #[test]
    fn test_missing_default_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let source = ConfigSource {
            path: dir.path().join(DEFAULT_CONFIG_FILE),
            explicit: false,
        };
        let config = source.read().unwrap();
        assert_eq!(config.database.path, PathBuf::from("clinvar.db"));
        assert_eq!(config.sources.ontology_root, "MONDO:0000001");
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = ConfigSource {
            path: dir.path().join("elsewhere.toml"),
            explicit: true,
        };
        assert!(matches!(source.read(), Err(VarminerError::Config(_))));
    }

    #[test]
    fn test_file_is_parsed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("varminer.toml");
        std::fs::write(
            &path,
            "[database]\npath = \"/data/clinvar.db\"\n\n[import]\nworkers = 2\nunresolved_condition_policy = \"plain_level\"\n",
        )
        .unwrap();
        let config = ConfigSource { path, explicit: true }.read().unwrap();
        assert_eq!(config.database.path, PathBuf::from("/data/clinvar.db"));
        assert_eq!(config.import.workers, Some(2));
        assert_eq!(
            config.import.unresolved_condition_policy,
            varminer_common::UnresolvedConditionPolicy::PlainLevel
        );
    }

    #[test]
    fn test_malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("varminer.toml");
        std::fs::write(&path, "[import]\nworkers = \"many\"\n").unwrap();
        let err = ConfigSource { path, explicit: true }.read().unwrap_err();
        assert!(matches!(err, VarminerError::ConfigParse(_)));
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = ImportConfig::default();
        apply_env(
            &mut config,
            env_of(&[(DB_ENV, "/tmp/env.db"), (WORKERS_ENV, " 6 ")]),
        )
        .unwrap();
        assert_eq!(config.database.path, PathBuf::from("/tmp/env.db"));
        assert_eq!(config.import.workers, Some(6));

        let mut untouched = ImportConfig::default();
        apply_env(&mut untouched, env_of(&[])).unwrap();
        assert_eq!(untouched.import.workers, None);
    }

    #[test]
    fn test_bad_worker_count_is_rejected() {
        let mut config = ImportConfig::default();
        let err = apply_env(&mut config, env_of(&[(WORKERS_ENV, "lots")])).unwrap_err();
        assert!(matches!(err, VarminerError::Config(_)));
    }

    #[test]
    fn test_cli_overrides_everything() {
        let mut config = ImportConfig::default();
        apply_env(&mut config, env_of(&[(DB_ENV, "/tmp/env.db"), (WORKERS_ENV, "6")])).unwrap();
        apply_cli(
            &mut config,
            &CliOverrides {
                config: None,
                db: Some(PathBuf::from("cli.db")),
                ontology: Some(PathBuf::from("mondo-2024.owl")),
                workers: Some(1),
            },
        );
        assert_eq!(config.database.path, PathBuf::from("cli.db"));
        assert_eq!(config.sources.ontology, PathBuf::from("mondo-2024.owl"));
        assert_eq!(config.import.workers, Some(1));
    }
}
