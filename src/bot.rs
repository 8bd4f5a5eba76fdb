use std::sync::Arc;

use poise::serenity_prelude::UserId;
use tracing::debug;

use crate::assistant;
use crate::commands::{self, CommandTable};
use crate::commands::admins::giveaway::Giveaways;
use crate::commands::economy::shop::PriceList;
use crate::message::IncomingMessage;
use crate::utils::counters::{CounterStore, MemoryCounterStore};
use crate::utils::openai::Completion;
use crate::utils::platform::Platform;
use crate::utils::voice::Voice;

/// Tunables that are not service handles.
#[derive(Debug, Clone)]
pub struct BotSettings {
    pub prefix: char,
    /// Name the assistant introduces itself with.
    pub persona: String,
    pub max_tokens: u32,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            prefix: '!',
            persona: "Ghostbot".to_string(),
            max_tokens: 250,
        }
    }
}

/// Everything a message handler needs: settings, state and the external
/// services, each behind a trait so tests can swap them out.
pub struct Bot {
    id: UserId,
    settings: BotSettings,
    counters: Arc<dyn CounterStore>,
    platform: Arc<dyn Platform>,
    voice: Arc<dyn Voice>,
    completion: Arc<dyn Completion>,
    shop: PriceList,
    giveaways: Giveaways,
    commands: CommandTable,
}

impl Bot {
    pub fn new(
        id: UserId,
        platform: Arc<dyn Platform>,
        voice: Arc<dyn Voice>,
        completion: Arc<dyn Completion>,
    ) -> Self {
        Self {
            id,
            settings: BotSettings::default(),
            counters: Arc::new(MemoryCounterStore::new()),
            platform,
            voice,
            completion,
            shop: PriceList::default(),
            giveaways: Giveaways::new(),
            commands: CommandTable::default(),
        }
    }

    pub fn with_settings(mut self, settings: BotSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_counters(mut self, counters: Arc<dyn CounterStore>) -> Self {
        self.counters = counters;
        self
    }

    pub fn with_price_list(mut self, shop: PriceList) -> Self {
        self.shop = shop;
        self
    }

    /// Make giveaway winner selection reproducible.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.giveaways = Giveaways::seeded(seed);
        self
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn settings(&self) -> &BotSettings {
        &self.settings
    }

    pub fn counters(&self) -> &Arc<dyn CounterStore> {
        &self.counters
    }

    pub fn platform(&self) -> &Arc<dyn Platform> {
        &self.platform
    }

    pub fn voice(&self) -> &Arc<dyn Voice> {
        &self.voice
    }

    pub fn completion(&self) -> &Arc<dyn Completion> {
        &self.completion
    }

    pub fn shop(&self) -> &PriceList {
        &self.shop
    }

    pub fn giveaways(&self) -> &Giveaways {
        &self.giveaways
    }

    pub fn commands(&self) -> &CommandTable {
        &self.commands
    }

    /// Handle one received message: count it, answer a mention, run a
    /// command. The three steps are independent of each other.
    pub async fn on_message(&self, message: &IncomingMessage) {
        if message.author_is_bot {
            return;
        }

        let counters = self.counters.increment(message.author);
        debug!(
            "User {} now at {} XP / {} coins",
            message.author, counters.experience, counters.currency
        );

        if message.mentions_user(self.id) {
            assistant::respond(self, message).await;
        }

        commands::dispatch(self, message).await;
    }
}
