//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{
    BotIdentityConfig, DispatchConfig, LogFormat, LogOutput, LoggingConfig, SwitchyardConfig,
};

/// Validates the entire configuration.
pub fn validate_config(config: &SwitchyardConfig) -> ConfigResult<()> {
    validate_bot_config(&config.bot)?;
    validate_dispatch_config(&config.dispatch)?;
    validate_logging_config(&config.logging)?;
    Ok(())
}

fn validate_bot_config(bot: &BotIdentityConfig) -> ConfigResult<()> {
    if bot.username.is_empty() {
        return Err(ConfigError::missing_field("bot.username"));
    }

    if bot.username.starts_with('@') {
        return Err(ConfigError::validation(
            "Bot username must not include the leading '@'",
        ));
    }

    if !bot
        .username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(ConfigError::validation(format!(
            "Bot username contains invalid characters: {}",
            bot.username
        )));
    }

    Ok(())
}

fn validate_dispatch_config(dispatch: &DispatchConfig) -> ConfigResult<()> {
    if dispatch.channel_capacity == 0 {
        return Err(ConfigError::validation(
            "Channel capacity must be greater than 0",
        ));
    }
    Ok(())
}

fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::missing_field("logging.file_path"));
    }

    if logging.format == LogFormat::Json && !cfg!(feature = "json-log") {
        return Err(ConfigError::validation(
            "JSON log format requires the `json-log` feature",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = SwitchyardConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_username() {
        let mut config = SwitchyardConfig::default();
        config.bot.username = String::new();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::MissingField { .. })
        ));

        config.bot.username = "@yard_bot".into();
        assert!(validate_config(&config).is_err());

        config.bot.username = "yard bot".into();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_capacity() {
        let mut config = SwitchyardConfig::default();
        config.dispatch.channel_capacity = 0;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_validate_file_output_needs_path() {
        let mut config = SwitchyardConfig::default();
        config.logging.output = LogOutput::File;
        assert!(validate_config(&config).is_err());

        config.logging.file_path = Some("logs/switchyard.log".into());
        assert!(validate_config(&config).is_ok());
    }
}
