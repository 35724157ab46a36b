use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Configuration {
    pub authentication: Authentication,
    pub discord: Discord,
    pub feedback: Feedback,
    pub logging: Logging,
}

impl Configuration {
    const FILENAME: &str = "config.toml";

    pub fn load() -> anyhow::Result<Self> {
        let config = if let Ok(file) = std::fs::read_to_string(Self::FILENAME) {
            toml::from_str(&file).context("failed to load config")?
        } else {
            Self::default()
        };
        config.feedback.validate()?;
        config.save()?;

        Ok(config)
    }

    fn save(&self) -> anyhow::Result<()> {
        Ok(std::fs::write(
            Self::FILENAME,
            toml::to_string_pretty(self)?,
        )?)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Authentication {
    pub discord_token: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Discord {
    /// Text that must precede a command name, including any trailing space
    pub prefix: String,
    /// Shown as a "Watching ..." presence once connected
    pub activity: Option<String>,
}

impl Default for Discord {
    fn default() -> Self {
        Self {
            prefix: "mo ".into(),
            activity: None,
        }
    }
}

/// Markers and timings used after a command finishes.
///
/// Symbols are either unicode emoji or custom emoji in the `<:name:id>` form.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Feedback {
    pub ok_symbol: String,
    pub confused_symbol: String,
    pub error_symbol: String,
    /// How long the invoker has to confirm an error marker
    pub confirmation_timeout_secs: u64,
    /// How long a disclosed error stays in the channel
    pub destruction_delay_secs: u64,
    pub disclosure_caption: String,
    pub attachment_name: String,
}

impl Default for Feedback {
    fn default() -> Self {
        Self {
            ok_symbol: "✅".into(),
            confused_symbol: "❓".into(),
            error_symbol: "❌".into(),
            confirmation_timeout_secs: 60,
            destruction_delay_secs: 30,
            disclosure_caption: "Here is your error:".into(),
            attachment_name: "error.txt".into(),
        }
    }
}

impl Feedback {
    /// Longest confirmation timeout or destruction delay accepted, one day
    pub const MAX_DELAY_SECS: u64 = 24 * 60 * 60;

    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, secs) in [
            ("confirmation_timeout_secs", self.confirmation_timeout_secs),
            ("destruction_delay_secs", self.destruction_delay_secs),
        ] {
            anyhow::ensure!(
                secs <= Self::MAX_DELAY_SECS,
                "feedback.{name} must be at most {} seconds, got {secs}",
                Self::MAX_DELAY_SECS
            );
        }
        Ok(())
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_secs)
    }

    pub fn destruction_delay(&self) -> Duration {
        Duration::from_secs(self.destruction_delay_secs)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Logging {
    /// An `EnvFilter` directive; `RUST_LOG` takes precedence when set
    pub filter: String,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            filter: "info,serenity=warn".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: Configuration = toml::from_str(
            r#"
[authentication]
discord_token = "abc"

[feedback]
error_symbol = "<:mo_error:123>"
"#,
        )
        .unwrap();

        assert_eq!(config.authentication.discord_token.as_deref(), Some("abc"));
        assert_eq!(config.discord.prefix, "mo ");
        assert_eq!(config.feedback.error_symbol, "<:mo_error:123>");
        assert_eq!(config.feedback.ok_symbol, "✅");
        assert_eq!(config.feedback.confirmation_timeout(), Duration::from_secs(60));
        assert_eq!(config.feedback.destruction_delay(), Duration::from_secs(30));
    }

    #[test]
    fn test_feedback_delays_are_bounded() {
        assert!(Feedback::default().validate().is_ok());

        let feedback = Feedback {
            destruction_delay_secs: Feedback::MAX_DELAY_SECS,
            ..Feedback::default()
        };
        assert!(feedback.validate().is_ok());

        let feedback = Feedback {
            confirmation_timeout_secs: u64::MAX,
            ..Feedback::default()
        };
        let err = feedback.validate().unwrap_err().to_string();
        assert!(err.contains("confirmation_timeout_secs"));

        let feedback = Feedback {
            destruction_delay_secs: Feedback::MAX_DELAY_SECS + 1,
            ..Feedback::default()
        };
        let err = feedback.validate().unwrap_err().to_string();
        assert!(err.contains("destruction_delay_secs"));
    }

    #[test]
    fn test_default_config_serializes() {
        let text = toml::to_string_pretty(&Configuration::default()).unwrap();
        let parsed: Configuration = toml::from_str(&text).unwrap();
        assert_eq!(parsed.logging.filter, "info,serenity=warn");
        assert_eq!(parsed.feedback.attachment_name, "error.txt");
    }
}
