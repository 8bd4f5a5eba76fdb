//! Reaction giveaways: announce, wait, draw one winner among the reactors.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use dashmap::DashMap;
use poise::serenity_prelude::{ChannelId, Mentionable, MessageId, UserId};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use tracing::{error, info, warn};

use super::*;
use crate::utils::platform::{Platform, PlatformError, Reactor};

/// Reaction users add to enter.
pub const ENTRY_EMOJI: &str = "🎉";

const USAGE: &str = "giveaway <minutes> <prize>";

/// Longest giveaway accepted: one year.
pub const MAX_MINUTES: u64 = 60 * 24 * 365;

/// Arguments of a `giveaway` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GiveawayRequest {
    pub minutes: u64,
    pub prize: String,
}

impl GiveawayRequest {
    /// `<minutes> <prize...>`: a whole number of minutes in
    /// `1..=MAX_MINUTES` followed by a non-empty prize description.
    pub fn parse(args: &[String]) -> Option<Self> {
        let (minutes, prize) = args.split_first()?;
        let minutes = minutes
            .parse::<u64>()
            .ok()
            .filter(|m| (1..=MAX_MINUTES).contains(m))?;
        let prize = prize.join(" ");
        if prize.is_empty() {
            return None;
        }

        Some(Self { minutes, prize })
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.minutes * 60)
    }
}

/// A giveaway waiting for its deadline.
#[derive(Debug, Clone)]
pub struct Giveaway {
    pub channel_id: ChannelId,
    pub announcement: MessageId,
    pub prize: String,
    pub duration: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    NoEntries,
    Winner(UserId),
}

/// Draw one winner uniformly among the non-bot reactors. A user reacting more
/// than once still counts once.
pub fn pick_winner(reactors: &[Reactor], rng: &mut StdRng) -> Option<UserId> {
    let mut seen = HashSet::new();
    let eligible: Vec<UserId> = reactors
        .iter()
        .filter(|r| !r.bot && seen.insert(r.id))
        .map(|r| r.id)
        .collect();

    eligible.choose(rng).copied()
}

/// In-flight giveaways, keyed by announcement message.
pub struct Giveaways {
    rng: Arc<Mutex<StdRng>>,
    pending: Arc<DashMap<MessageId, Giveaway>>,
}

/// Removes a giveaway from the registry when its task ends, including by
/// panic.
struct PendingEntry {
    pending: Arc<DashMap<MessageId, Giveaway>>,
    key: MessageId,
}

impl Drop for PendingEntry {
    fn drop(&mut self) {
        self.pending.remove(&self.key);
    }
}

impl Default for Giveaways {
    fn default() -> Self {
        Self::new()
    }
}

impl Giveaways {
    pub fn new() -> Self {
        Self::seeded(rand::random())
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Arc::new(Mutex::new(StdRng::seed_from_u64(seed))),
            pending: Arc::new(DashMap::new()),
        }
    }

    /// Number of giveaways that have not been resolved yet.
    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    /// Resolve `giveaway` once its duration has elapsed. Not cancellable.
    pub fn schedule(&self, platform: Arc<dyn Platform>, giveaway: Giveaway) {
        let rng = Arc::clone(&self.rng);
        self.pending.insert(giveaway.announcement, giveaway.clone());
        let entry = PendingEntry {
            pending: Arc::clone(&self.pending),
            key: giveaway.announcement,
        };

        tokio::spawn(async move {
            let _entry = entry;
            tokio::time::sleep(giveaway.duration).await;

            match resolve(platform.as_ref(), &giveaway, &rng).await {
                Ok(resolution) => info!(
                    "Giveaway {} for '{}' resolved: {:?}",
                    giveaway.announcement, giveaway.prize, resolution
                ),
                Err(e) => error!(
                    "Failed to resolve giveaway {}: {}",
                    giveaway.announcement, e
                ),
            }
        });
    }
}

/// Fetch the current entrants and announce the outcome.
pub async fn resolve(
    platform: &dyn Platform,
    giveaway: &Giveaway,
    rng: &Mutex<StdRng>,
) -> Result<Resolution, PlatformError> {
    let reactors = platform
        .reactors(
            giveaway.channel_id,
            giveaway.announcement,
            ENTRY_EMOJI.to_string(),
        )
        .await?;

    let winner = {
        let mut rng = rng.lock().unwrap_or_else(PoisonError::into_inner);
        pick_winner(&reactors, &mut rng)
    };

    let (resolution, announcement) = match winner {
        Some(winner) => (
            Resolution::Winner(winner),
            format!("🏆 {} won **{}**", winner.mention(), giveaway.prize),
        ),
        None => (
            Resolution::NoEntries,
            format!("No entries for **{}**", giveaway.prize),
        ),
    };

    platform
        .send_message(giveaway.channel_id, announcement)
        .await?;
    Ok(resolution)
}

/// Start a giveaway (administrators only)
pub async fn giveaway(invocation: &Invocation<'_>, bot: &Bot) -> CommandResult {
    let message = invocation.message;
    if !message.has_capability(Permissions::ADMINISTRATOR) {
        return Err(CommandError::PermissionDenied);
    }

    let request = GiveawayRequest::parse(&invocation.args).ok_or_else(|| {
        CommandError::InvalidArguments(format!("{}{USAGE}", bot.settings().prefix))
    })?;

    let ends_at = chrono::Utc::now().timestamp() + request.duration().as_secs() as i64;
    let text = format!(
        "🎉 GIVEAWAY 🎉\nPrize: {}\nReact {ENTRY_EMOJI}\nEnds in {} min (<t:{ends_at}:R>)",
        request.prize, request.minutes
    );

    let platform = bot.platform();
    let announcement = platform.send_message(message.channel_id, text).await?;

    bot.giveaways().schedule(
        Arc::clone(platform),
        Giveaway {
            channel_id: message.channel_id,
            announcement,
            prize: request.prize.clone(),
            duration: request.duration(),
        },
    );
    info!(
        "Giveaway {} for '{}' started by {}, {} min",
        announcement, request.prize, message.author, request.minutes
    );

    // Entrants can still add the reaction themselves.
    if let Err(e) = platform
        .react(message.channel_id, announcement, ENTRY_EMOJI.to_string())
        .await
    {
        warn!("Failed to add entry reaction to giveaway {}: {}", announcement, e);
    }

    // The announcement is the response.
    Ok(None)
}
