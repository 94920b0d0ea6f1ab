//! Discord channel adapter using serenity
//!
//! Direct messages starting with `!` go through the command router. The
//! `/wake` and `/ping` slash commands take a device picked via autocomplete,
//! which only ever offers devices the caller may act on.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serenity::Client;
use serenity::all::{
    Command as SlashCommand, CommandInteraction, CommandOptionType, Context,
    CreateAutocompleteResponse, CreateCommand, CreateCommandOption, CreateInteractionResponse,
    CreateMessage, EditInteractionResponse, EventHandler, GatewayIntents, Interaction, Message,
    Ready, ShardManager, UserId,
};

use super::Channel;
use crate::commands::{CommandRouter, format_probe, format_wake};
use crate::devices::Capabilities;
use crate::notify::MessageSink;
use crate::{Error, Result};

/// Discord caps autocomplete responses at 25 choices
const MAX_AUTOCOMPLETE_CHOICES: usize = 25;

/// Name of the device option on slash commands
const DEVICE_OPTION: &str = "device";

/// Discord channel adapter
pub struct DiscordChannel {
    token: SecretString,
    router: CommandRouter,
    http: Option<Arc<serenity::http::Http>>,
    shard_manager: Option<Arc<ShardManager>>,
    connected: bool,
}

impl DiscordChannel {
    /// Create a new Discord channel adapter
    ///
    /// # Arguments
    ///
    /// * `token` - Discord bot token
    /// * `router` - Command router shared with other transports
    #[must_use]
    pub const fn new(token: SecretString, router: CommandRouter) -> Self {
        Self {
            token,
            router,
            http: None,
            shard_manager: None,
            connected: false,
        }
    }

    /// Direct-message sink backed by this connection
    ///
    /// # Errors
    ///
    /// Returns error if the channel is not connected
    pub fn sink(&self) -> Result<DiscordSink> {
        let http = self
            .http
            .clone()
            .ok_or_else(|| Error::Channel("Discord not connected".to_string()))?;
        Ok(DiscordSink { http })
    }
}

#[async_trait]
impl Channel for DiscordChannel {
    fn name(&self) -> &'static str {
        "discord"
    }

    async fn connect(&mut self) -> Result<()> {
        let intents = GatewayIntents::DIRECT_MESSAGES | GatewayIntents::MESSAGE_CONTENT;

        let handler = DiscordHandler {
            router: self.router.clone(),
        };

        let mut client = Client::builder(self.token.expose_secret(), intents)
            .event_handler(handler)
            .await
            .map_err(|e| Error::Channel(format!("Discord client error: {e}")))?;

        self.http = Some(client.http.clone());
        self.shard_manager = Some(client.shard_manager.clone());

        // Spawn the client in a background task
        tokio::spawn(async move {
            if let Err(e) = client.start().await {
                tracing::error!(error = %e, "Discord client error");
            }
        });

        self.connected = true;
        tracing::info!("Discord channel connected");

        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        if let Some(manager) = self.shard_manager.take() {
            manager.shutdown_all().await;
        }
        self.connected = false;
        tracing::info!("Discord channel disconnected");
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

/// Sends alerts as Discord direct messages
#[derive(Clone)]
pub struct DiscordSink {
    http: Arc<serenity::http::Http>,
}

#[async_trait]
impl MessageSink for DiscordSink {
    async fn send_direct(&self, user_id: &str, content: &str) -> Result<()> {
        let id: u64 = user_id
            .parse()
            .map_err(|_| Error::Channel("Invalid user ID".to_string()))?;

        UserId::new(id)
            .direct_message(&self.http, CreateMessage::new().content(content))
            .await
            .map_err(|e| Error::Channel(format!("Discord send error: {e}")))?;

        tracing::debug!(user_id, "Discord direct message sent");
        Ok(())
    }
}

/// Capability a slash command needs
fn required_for(command: &str) -> Option<Capabilities> {
    match command {
        "wake" => Some(Capabilities::WAKE),
        "ping" => Some(Capabilities::PING),
        _ => None,
    }
}

fn slash_commands() -> Vec<CreateCommand> {
    let device_option = |description: &str| {
        CreateCommandOption::new(CommandOptionType::String, DEVICE_OPTION, description)
            .required(true)
            .set_autocomplete(true)
    };

    vec![
        CreateCommand::new("wake")
            .description("Send a wake packet to a device")
            .add_option(device_option("Device to wake")),
        CreateCommand::new("ping")
            .description("Check whether a device is online")
            .add_option(device_option("Device to ping")),
    ]
}

/// Discord event handler
struct DiscordHandler {
    router: CommandRouter,
}

impl DiscordHandler {
    async fn autocomplete(&self, ctx: &Context, interaction: &CommandInteraction) {
        let Some(required) = required_for(&interaction.data.name) else {
            return;
        };
        let query = interaction
            .data
            .autocomplete()
            .map(|opt| opt.value.to_string())
            .unwrap_or_default();

        let choices = self
            .router
            .dispatcher()
            .search(&query, &interaction.user.id.to_string(), required);

        let response = choices
            .into_iter()
            .take(MAX_AUTOCOMPLETE_CHOICES)
            .fold(CreateAutocompleteResponse::new(), |resp, choice| {
                resp.add_string_choice(choice.name, choice.value)
            });

        if let Err(e) = interaction
            .create_response(ctx, CreateInteractionResponse::Autocomplete(response))
            .await
        {
            tracing::warn!(error = %e, "Failed to answer autocomplete");
        }
    }

    async fn slash_command(&self, ctx: &Context, interaction: &CommandInteraction) {
        let Some(required) = required_for(&interaction.data.name) else {
            return;
        };
        let device_id = interaction
            .data
            .options
            .iter()
            .find(|opt| opt.name == DEVICE_OPTION)
            .and_then(|opt| opt.value.as_str())
            .unwrap_or_default()
            .to_string();
        let user_id = interaction.user.id.to_string();

        // Probes can outlast the interaction deadline
        if let Err(e) = interaction.defer_ephemeral(ctx).await {
            tracing::warn!(error = %e, "Failed to defer interaction");
            return;
        }

        let dispatcher = self.router.dispatcher();
        let reply = if required == Capabilities::WAKE {
            format_wake(&dispatcher.wake(&device_id, &user_id, required).await)
        } else {
            format_probe(&device_id, &dispatcher.probe(&device_id, &user_id, required).await)
        };

        if let Err(e) = interaction
            .edit_response(ctx, EditInteractionResponse::new().content(reply))
            .await
        {
            tracing::warn!(error = %e, "Failed to send interaction reply");
        }
    }
}

#[async_trait]
impl EventHandler for DiscordHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        tracing::info!(user = %ready.user.name, "Discord bot ready");

        match SlashCommand::set_global_commands(&ctx.http, slash_commands()).await {
            Ok(cmds) => tracing::info!(count = cmds.len(), "Discord slash commands registered"),
            Err(e) => tracing::error!(error = %e, "Failed to register slash commands"),
        }
    }

    async fn message(&self, ctx: Context, msg: Message) {
        // Ignore bot messages and anything outside DMs
        if msg.author.bot || msg.guild_id.is_some() {
            return;
        }

        let user_id = msg.author.id.to_string();
        let Some(reply) = self.router.handle(&user_id, &msg.content).await else {
            return;
        };

        if let Err(e) = msg.channel_id.say(&ctx.http, reply).await {
            tracing::warn!(error = %e, "Failed to send Discord reply");
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        match interaction {
            Interaction::Autocomplete(ac) => self.autocomplete(&ctx, &ac).await,
            Interaction::Command(cmd) => self.slash_command(&ctx, &cmd).await,
            _ => {}
        }
    }
}
