//! Direct messages over Discord REST.

use async_trait::async_trait;
use srcbot_common::UserId;

use super::models::{MessageBody, OpenDmBody, WireDmChannel};
use super::DiscordClient;
use crate::directory::{Notifier, UpstreamError};

#[async_trait]
impl Notifier for DiscordClient {
    async fn send_direct_message(&self, user_id: UserId, text: &str) -> Result<(), UpstreamError> {
        let dm: WireDmChannel = self
            .post("/users/@me/channels", &OpenDmBody { recipient_id: user_id })
            .await?;
        let _: serde_json::Value = self
            .post(
                &format!("/channels/{}/messages", dm.id),
                &MessageBody { content: text },
            )
            .await?;
        Ok(())
    }
}
