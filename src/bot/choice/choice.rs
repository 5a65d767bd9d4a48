use std::{collections::HashMap, sync::{atomic::{AtomicU64, Ordering}, Arc, Weak}, time::Duration};

use futures::future::BoxFuture;
use serenity::all::{ChannelId, GuildId, MessageId, UserId};
use tokio::{sync::Mutex, task::JoinHandle, time::sleep};
use tracing::{debug, error, warn};

use crate::bot::{chat_event::chat_event::InteractionEvent, commands::commands::BotResult, handler::handler::ChatClient, replies::Replies, response::{compose::EXIT_BUTTON_ID, response::{CommandResponse, Reply}}, state::def::AppState};

pub type ChoiceHandler = Arc<dyn Fn(InteractionEvent, Arc<AppState>) -> BoxFuture<'static, BotResult<CommandResponse>> + Send + Sync>;

/// Declared by a command response to make the sent message interactive.
#[derive(Clone)]
pub struct ChoiceOptions {
    pub user_id: UserId,
    pub user_tag: String,
    pub channel_id: ChannelId,
    pub guild_id: Option<GuildId>,
    /// Falls back to the configured inactivity timeout.
    pub timeout: Option<Duration>,
    pub handler: ChoiceHandler,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceKey {
    pub message_id: MessageId,
    pub channel_id: ChannelId,
    pub guild_id: Option<GuildId>,
    pub user_id: UserId,
}

impl ChoiceKey {
    pub fn for_message(message_id: MessageId, options: &ChoiceOptions) -> Self {
        ChoiceKey {
            message_id,
            channel_id: options.channel_id,
            guild_id: options.guild_id,
            user_id: options.user_id,
        }
    }

    /// Only the user who triggered the command, in the same channel and guild, may drive it.
    pub fn authorizes(&self, event: &InteractionEvent) -> bool {
        self.message_id == event.message_id
            && self.user_id == event.user.id
            && self.channel_id == event.channel_id
            && self.guild_id == event.guild_id
    }
}

#[derive(Debug)]
pub enum InteractionOutcome {
    /// Nothing registered for the message, or the user is not allowed to drive it.
    Ignored,
    Updated(Reply),
    /// The exit control retired the registration.
    Closed,
    /// The handler failed; the previous handler stays armed.
    Failed,
}

struct PendingChoice {
    key: ChoiceKey,
    user_tag: String,
    handler: ChoiceHandler,
    timeout: Duration,
    generation: u64,
    timer: JoinHandle<()>,
}

enum Slot {
    Armed(PendingChoice),
    /// A handler is running for the message. Retiring drops the marker, and a
    /// handler that finds its marker gone does not re-arm.
    Running { key: ChoiceKey, generation: u64 },
}

impl Slot {
    fn key(&self) -> &ChoiceKey {
        match self {
            Slot::Armed(pending) => &pending.key,
            Slot::Running { key, .. } => key,
        }
    }

    fn release(self) {
        if let Slot::Armed(pending) = self {
            pending.timer.abort();
        }
    }
}

/// Correlates interactions on sent messages with the handler that knows how to update them.
///
/// One registration per message id. Every armed registration owns a timer
/// task; the generation number lets a timer or a running handler that lost a
/// race with a re-registration or a retire recognise that its entry is gone.
pub struct ChoiceRegistry {
    pending: Mutex<HashMap<MessageId, Slot>>,
    client: Arc<dyn ChatClient>,
    default_timeout: Duration,
    generation: AtomicU64,
}

impl ChoiceRegistry {
    pub fn new(client: Arc<dyn ChatClient>, default_timeout: Duration) -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
            client,
            default_timeout,
            generation: AtomicU64::new(0),
        }
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub async fn register(self: &Arc<Self>, key: ChoiceKey, user_tag: String, handler: ChoiceHandler, timeout: Option<Duration>) {
        let mut pending = self.pending.lock().await;
        self.arm(&mut pending, key, user_tag, handler, timeout);
    }

    fn arm(self: &Arc<Self>, pending: &mut HashMap<MessageId, Slot>, key: ChoiceKey, user_tag: String, handler: ChoiceHandler, timeout: Option<Duration>) {
        let timeout = timeout.unwrap_or(self.default_timeout);
        let generation = self.next_generation();
        let message_id = key.message_id;

        let timer = spawn_timer(Arc::downgrade(self), message_id, generation, timeout);
        let previous = pending.insert(message_id, Slot::Armed(PendingChoice { key, user_tag, handler, timeout, generation, timer }));

        if let Some(previous) = previous {
            previous.release();
            debug!("Replaced choice handler for message {}", message_id);
        }
    }

    pub async fn resolve(&self, key: &ChoiceKey) -> Option<ChoiceHandler> {
        let pending = self.pending.lock().await;
        match pending.get(&key.message_id) {
            Some(Slot::Armed(p)) if &p.key == key => Some(p.handler.clone()),
            _ => None,
        }
    }

    pub async fn is_armed(&self, message_id: MessageId) -> bool {
        matches!(self.pending.lock().await.get(&message_id), Some(Slot::Armed(_)))
    }

    /// Whether `invoke` would act on this interaction.
    pub async fn accepts(&self, event: &InteractionEvent) -> bool {
        let pending = self.pending.lock().await;
        matches!(pending.get(&event.message_id), Some(Slot::Armed(p)) if p.key.authorizes(event))
    }

    /// Runs the handler registered for the interaction's message.
    ///
    /// While the handler runs the entry is a `Running` marker, so a second
    /// interaction on the same message is ignored until the handler re-arms,
    /// and a delete in the meantime keeps the message retired.
    pub async fn invoke(self: &Arc<Self>, state: Arc<AppState>, event: InteractionEvent) -> InteractionOutcome {
        let message_id = event.message_id;
        let taken = {
            let mut pending = self.pending.lock().await;
            match pending.remove(&message_id) {
                Some(Slot::Armed(entry)) if entry.key.authorizes(&event) => {
                    entry.timer.abort();
                    if event.custom_id != EXIT_BUTTON_ID {
                        let generation = self.next_generation();
                        pending.insert(message_id, Slot::Running { key: entry.key.clone(), generation });
                        Some((entry, generation))
                    } else {
                        debug!("Choice on message {} closed by user", message_id);
                        return InteractionOutcome::Closed;
                    }
                }
                Some(slot) => {
                    if matches!(slot, Slot::Armed(_)) {
                        debug!("Ignoring interaction by {} on message {}", event.user.id, message_id);
                    }
                    pending.insert(message_id, slot);
                    None
                }
                None => None,
            }
        };

        let Some((entry, running)) = taken else {
            return InteractionOutcome::Ignored;
        };

        let result = (entry.handler)(event, state).await;

        let mut pending = self.pending.lock().await;
        let still_running = matches!(pending.get(&message_id), Some(Slot::Running { generation, .. }) if *generation == running);
        if !still_running {
            debug!("Message {} was retired while its handler ran", message_id);
            return InteractionOutcome::Ignored;
        }
        pending.remove(&message_id);

        match result {
            Ok(CommandResponse { reply, choice }) => {
                if let Some(options) = choice {
                    self.arm(&mut pending, entry.key, options.user_tag, options.handler, options.timeout);
                }
                InteractionOutcome::Updated(reply)
            }
            Err(e) => {
                error!("Choice handler for message {} failed: {e:?}", message_id);
                self.arm(&mut pending, entry.key, entry.user_tag, entry.handler, Some(entry.timeout));
                InteractionOutcome::Failed
            }
        }
    }

    /// Drops the registration for a message that no longer exists, including
    /// one whose handler is still running.
    pub async fn retire(&self, message_id: MessageId) -> bool {
        match self.pending.lock().await.remove(&message_id) {
            Some(slot) => {
                slot.release();
                true
            }
            None => false,
        }
    }

    pub async fn retire_channel(&self, channel_id: ChannelId) {
        let mut pending = self.pending.lock().await;
        let retired: Vec<MessageId> = pending
            .iter()
            .filter(|(_, slot)| slot.key().channel_id == channel_id)
            .map(|(id, _)| *id)
            .collect();

        for id in retired {
            if let Some(slot) = pending.remove(&id) {
                slot.release();
            }
        }
    }

    async fn expire(&self, message_id: MessageId, generation: u64) {
        let expired = {
            let mut pending = self.pending.lock().await;
            let current = matches!(pending.get(&message_id), Some(Slot::Armed(p)) if p.generation == generation);
            match current.then(|| pending.remove(&message_id)).flatten() {
                Some(Slot::Armed(p)) => p,
                _ => return,
            }
        };

        debug!("Choice on message {} expired", message_id);

        let notice = Replies::inactivity(&expired.user_tag);
        if let Err(e) = self.client.close_message(expired.key.channel_id, message_id, &notice).await {
            warn!("Failed to close inactive message {}: {e:?}", message_id);
        }
    }
}

fn spawn_timer(registry: Weak<ChoiceRegistry>, message_id: MessageId, generation: u64, timeout: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        sleep(timeout).await;
        if let Some(registry) = registry.upgrade() {
            registry.expire(message_id, generation).await;
        }
    })
}
