#![warn(clippy::all, clippy::pedantic)]

#[cfg(test)]
mod tests {
    use crate::components::SpawnPolicy;
    use crate::config::Config;
    use crate::config::loader::ConfigError;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.log_level, "info");
        assert_eq!(config.field.width, 10);
        assert_eq!(config.field.height, 24);
        assert_eq!(config.timing.frames_per_second, 30);
        assert_eq!(config.timing.fall_delay, 3);
        assert_eq!(config.spawn.policy, SpawnPolicy::Uniform);
        assert_eq!(config.spawn.seed, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_field_too_narrow() {
        let mut config = Config::default();
        config.field.width = 6;

        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_field_too_short() {
        let mut config = Config::default();
        config.field.height = 3;

        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_zero_fall_delay() {
        let mut config = Config::default();
        config.timing.fall_delay = 0;

        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_frame_rate_below_fall_delay() {
        let mut config = Config::default();
        config.timing.frames_per_second = 2;
        config.timing.fall_delay = 3;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("frames_per_second"));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [field]
            width = 12

            [spawn]
            policy = "always_t"
            seed = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.field.width, 12);
        assert_eq!(config.field.height, 24);
        assert_eq!(config.timing.fall_delay, 3);
        assert_eq!(config.spawn.policy, SpawnPolicy::AlwaysT);
        assert_eq!(config.spawn.seed, Some(5));
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_unknown_spawn_policy_rejected() {
        let result: Result<Config, _> = toml::from_str("[spawn]\npolicy = \"tetris_99\"\n");
        assert!(result.is_err());
    }
}
