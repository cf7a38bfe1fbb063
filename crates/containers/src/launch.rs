//! Launch specification for a bot container: image, network, per-launch
//! name, and the environment block the bot image contracts on.

use sr_domain::config::ContainersConfig;
use sr_domain::{Error, Result};
use sr_protocol::BotConfig;

/// Everything the driver needs to create and start one bot container.
#[derive(Debug, Clone)]
pub struct LaunchSpec {
    pub image: String,
    pub network: String,
    /// Per-launch name, `bot-<platform>-<first 8 of connection id>`.
    /// Operators reap orphaned containers by this convention.
    pub name: String,
    pub env: Vec<String>,
}

impl LaunchSpec {
    /// Build the launch spec for a bot. The env block carries the full
    /// `BOT_CONFIG` document plus the individual variables the bot image
    /// reads directly — names are bit-exact contract.
    pub fn for_bot(containers: &ContainersConfig, bot: &BotConfig) -> Result<Self> {
        let config_json = serde_json::to_string(bot)
            .map_err(|e| Error::Internal(format!("encoding BOT_CONFIG: {e}")))?;

        let short_id = bot.connection_id.get(..8).unwrap_or(&bot.connection_id);
        let name = format!("bot-{}-{}", bot.platform, short_id);

        let env = vec![
            format!("BOT_CONFIG={config_json}"),
            format!("PLATFORM={}", bot.platform),
            format!("TOKEN={}", bot.token),
            format!("MEETING_URL={}", bot.meeting_url),
            format!("TRANSCRIPTION_SERVICE={}", containers.transcription_url),
        ];

        Ok(Self {
            image: containers.image.clone(),
            network: containers.network.clone(),
            name,
            env,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sr_domain::Platform;
    use sr_protocol::AutomaticLeave;

    fn bot() -> BotConfig {
        BotConfig {
            platform: Platform::GoogleMeet,
            meeting_url: "https://meet.google.com/abc-defg-hij".into(),
            bot_name: Some("Scribe".into()),
            token: "tokK".into(),
            connection_id: "0f8fad5b-d9cb-469f-a165-70867728950e".into(),
            automatic_leave: AutomaticLeave::default(),
        }
    }

    fn containers() -> ContainersConfig {
        ContainersConfig {
            image: "scriberelay-bot:latest".into(),
            network: "meetings".into(),
            transcription_url: "ws://transcriber:9090".into(),
            ..ContainersConfig::default()
        }
    }

    #[test]
    fn name_embeds_platform_and_connection_prefix() {
        let spec = LaunchSpec::for_bot(&containers(), &bot()).unwrap();
        assert_eq!(spec.name, "bot-google_meet-0f8fad5b");
    }

    #[test]
    fn env_block_carries_the_exact_contract_names() {
        let spec = LaunchSpec::for_bot(&containers(), &bot()).unwrap();
        let keys: Vec<&str> = spec
            .env
            .iter()
            .map(|e| e.split('=').next().unwrap())
            .collect();
        assert_eq!(
            keys,
            vec![
                "BOT_CONFIG",
                "PLATFORM",
                "TOKEN",
                "MEETING_URL",
                "TRANSCRIPTION_SERVICE"
            ]
        );
        assert!(spec.env.contains(&"PLATFORM=google_meet".to_string()));
        assert!(spec
            .env
            .contains(&"TRANSCRIPTION_SERVICE=ws://transcriber:9090".to_string()));
    }

    #[test]
    fn bot_config_env_is_valid_camel_case_json() {
        let spec = LaunchSpec::for_bot(&containers(), &bot()).unwrap();
        let raw = spec.env[0].strip_prefix("BOT_CONFIG=").unwrap();
        let value: serde_json::Value = serde_json::from_str(raw).unwrap();
        assert_eq!(value["meetingUrl"], "https://meet.google.com/abc-defg-hij");
        assert_eq!(value["botName"], "Scribe");
        assert_eq!(value["automaticLeave"]["waitingRoomTimeout"], 300_000);
    }
}
