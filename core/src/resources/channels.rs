//! Messaging channels and the messages providers push into them.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{segment, ChannelId};
use crate::client::{Call, Client};
use crate::error::Error;
use crate::http::{HttpMethod, Transport};
use crate::options::{RequestOptions, WithRequestOptions};
use crate::payload::{Validate, Violations};
use crate::time::{local_timestamp, Timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    Facebook,
    Whatsapp,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Sent,
    Delivered,
    Read,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub id: ChannelId,
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub provider_channel_id: Option<String>,
    #[serde(default)]
    pub marketplace_client_id: Option<String>,
    #[serde(default)]
    pub pd_company_id: Option<i64>,
    #[serde(default)]
    pub pd_user_id: Option<i64>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub provider_type: Option<ProviderType>,
    #[serde(default)]
    pub template_support: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageAttachment {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_expires: Option<bool>,
}

/// A message as recorded by Pipedrive after `receive_message`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelMessage {
    pub id: String,
    pub channel_id: ChannelId,
    pub sender_id: String,
    pub conversation_id: String,
    pub message: String,
    pub status: MessageStatus,
    pub created_at: Timestamp,
    #[serde(default)]
    pub reply_by: Option<Timestamp>,
    #[serde(default)]
    pub conversation_link: Option<String>,
    #[serde(default)]
    pub attachments: Vec<MessageAttachment>,
}

/// Body for `POST /channels`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateChannelOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    provider_channel_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    template_support: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    provider_type: Option<ProviderType>,
    #[serde(skip)]
    request: RequestOptions,
}

impl CreateChannelOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The channel's id on the provider's side.
    pub fn provider_channel_id(mut self, id: impl Into<String>) -> Self {
        self.provider_channel_id = Some(id.into());
        self
    }

    pub fn avatar_url(mut self, url: impl Into<String>) -> Self {
        self.avatar_url = Some(url.into());
        self
    }

    pub fn template_support(mut self, supported: bool) -> Self {
        self.template_support = Some(supported);
        self
    }

    pub fn provider_type(mut self, provider: ProviderType) -> Self {
        self.provider_type = Some(provider);
        self
    }
}

impl Validate for CreateChannelOptions {
    const OPERATION: &'static str = "create channel";

    fn violations(&self) -> Vec<String> {
        Violations::new()
            .required("name", &self.name)
            .required("provider_channel_id", &self.provider_channel_id)
            .into_vec()
    }
}

impl WithRequestOptions for CreateChannelOptions {
    fn request_options(&self) -> &RequestOptions {
        &self.request
    }

    fn request_options_mut(&mut self) -> &mut RequestOptions {
        &mut self.request
    }
}

/// Body for `POST /channels/messages/receive`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReceiveMessageOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    channel_id: Option<ChannelId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sender_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    conversation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<MessageStatus>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "local_timestamp::serialize")]
    created_at: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "local_timestamp::serialize")]
    reply_by: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    conversation_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    attachments: Option<Vec<MessageAttachment>>,
    #[serde(skip)]
    request: RequestOptions,
}

impl ReceiveMessageOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider-side message id.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn channel_id(mut self, id: impl Into<ChannelId>) -> Self {
        self.channel_id = Some(id.into());
        self
    }

    pub fn sender_id(mut self, id: impl Into<String>) -> Self {
        self.sender_id = Some(id.into());
        self
    }

    pub fn conversation_id(mut self, id: impl Into<String>) -> Self {
        self.conversation_id = Some(id.into());
        self
    }

    pub fn message(mut self, text: impl Into<String>) -> Self {
        self.message = Some(text.into());
        self
    }

    pub fn status(mut self, status: MessageStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn created_at(mut self, at: NaiveDateTime) -> Self {
        self.created_at = Some(at);
        self
    }

    /// Deadline after which the conversation can no longer be answered.
    pub fn reply_by(mut self, at: NaiveDateTime) -> Self {
        self.reply_by = Some(at);
        self
    }

    pub fn conversation_link(mut self, link: impl Into<String>) -> Self {
        self.conversation_link = Some(link.into());
        self
    }

    pub fn attachments(mut self, attachments: impl IntoIterator<Item = MessageAttachment>) -> Self {
        self.attachments = Some(attachments.into_iter().collect());
        self
    }
}

impl Validate for ReceiveMessageOptions {
    const OPERATION: &'static str = "receive message";

    fn violations(&self) -> Vec<String> {
        Violations::new()
            .required("id", &self.id)
            .required("channel_id", &self.channel_id)
            .required("sender_id", &self.sender_id)
            .required("conversation_id", &self.conversation_id)
            .required("message", &self.message)
            .required("status", &self.status)
            .required("created_at", &self.created_at)
            .check(
                matches!((self.created_at, self.reply_by), (Some(created), Some(reply)) if reply < created),
                "reply_by must not be before created_at",
            )
            .into_vec()
    }
}

impl WithRequestOptions for ReceiveMessageOptions {
    fn request_options(&self) -> &RequestOptions {
        &self.request
    }

    fn request_options_mut(&mut self) -> &mut RequestOptions {
        &mut self.request
    }
}

pub struct Channels<'a, T> {
    client: &'a Client<T>,
}

impl<'a, T: Transport> Channels<'a, T> {
    pub(crate) fn new(client: &'a Client<T>) -> Self {
        Self { client }
    }

    pub fn create(&self, opts: CreateChannelOptions) -> Result<Channel, Error> {
        let call = Call::new(HttpMethod::Post, "channels", &opts.request).json(&opts)?;
        self.client.fetch(call)
    }

    /// Remove a channel. The API acknowledges without returning data.
    pub fn delete(&self, id: &str, opts: RequestOptions) -> Result<(), Error> {
        self.client
            .ack(Call::delete(format!("channels/{}", segment(id)), &opts))
    }

    pub fn receive_message(&self, opts: ReceiveMessageOptions) -> Result<ChannelMessage, Error> {
        let call =
            Call::new(HttpMethod::Post, "channels/messages/receive", &opts.request).json(&opts)?;
        self.client.fetch(call)
    }

    pub fn delete_conversation(
        &self,
        channel_id: &str,
        conversation_id: &str,
        opts: RequestOptions,
    ) -> Result<(), Error> {
        self.client.ack(Call::delete(
            format!(
                "channels/{}/conversations/{}",
                segment(channel_id),
                segment(conversation_id)
            ),
            &opts,
        ))
    }
}
