mod common;

use std::time::Duration;

use common::{BOT_ID, Harness, Sent, bot_user, harness, message, user};
use ghostbot::utils::platform::Reactor;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serenity::all::{MessageId, Permissions, UserId};

const MODERATOR: u64 = 2;
const TARGET: u64 = 50;

#[rstest]
#[tokio::test]
async fn kick_removes_the_tagged_member(harness: Harness) {
    let target = user(TARGET);
    let msg = message(MODERATOR, "!kick @someone")
        .mentioning(target.clone())
        .with_permissions(Permissions::KICK_MEMBERS)
        .build();
    harness.bot.on_message(&msg).await;

    assert_eq!(
        harness.platform.sent(),
        vec![
            Sent::Kick(UserId::new(TARGET)),
            Sent::Reply(format!("✅ Kicked {}", target.tag)),
        ]
    );
}

#[rstest]
#[tokio::test]
async fn mute_times_out_for_ten_minutes(harness: Harness) {
    let target = user(TARGET);
    let msg = message(MODERATOR, "!mute @someone")
        .mentioning(target.clone())
        .with_permissions(Permissions::MODERATE_MEMBERS)
        .build();
    harness.bot.on_message(&msg).await;

    assert_eq!(
        harness.platform.sent()[0],
        Sent::Timeout(UserId::new(TARGET), Duration::from_secs(600))
    );
    assert_eq!(
        harness.platform.replies(),
        vec![format!("🔇 Muted {} for 10 minutes", target.tag)]
    );
}

#[rstest]
#[tokio::test]
async fn ban_without_permission_is_denied(harness: Harness) {
    let msg = message(MODERATOR, "!ban @someone")
        .mentioning(user(TARGET))
        .with_permissions(Permissions::KICK_MEMBERS)
        .build();
    harness.bot.on_message(&msg).await;

    assert_eq!(
        harness.platform.sent(),
        vec![Sent::Reply("❌ No permission".to_string())]
    );
}

#[rstest]
#[tokio::test]
async fn administrators_may_ban(harness: Harness) {
    let msg = message(MODERATOR, "!ban @someone")
        .mentioning(user(TARGET))
        .with_permissions(Permissions::ADMINISTRATOR)
        .build();
    harness.bot.on_message(&msg).await;

    assert_eq!(harness.platform.sent()[0], Sent::Ban(UserId::new(TARGET)));
}

#[rstest]
#[tokio::test]
async fn a_target_is_required(harness: Harness) {
    let untagged = message(MODERATOR, "!kick")
        .with_permissions(Permissions::KICK_MEMBERS)
        .build();
    let only_the_bot = message(MODERATOR, "!kick <@900>")
        .mentioning(bot_user())
        .with_permissions(Permissions::KICK_MEMBERS)
        .build();
    harness.bot.on_message(&untagged).await;
    harness.bot.on_message(&only_the_bot).await;

    let replies = harness.platform.replies();
    // The second message also mentions the bot, so the assistant answers first.
    assert_eq!(replies, vec!["Tag a user", "Hello there!", "Tag a user"]);
    assert!(
        !harness
            .platform
            .sent()
            .contains(&Sent::Kick(UserId::new(BOT_ID)))
    );
}

#[rstest]
#[tokio::test]
async fn moderation_needs_a_guild(harness: Harness) {
    let msg = message(MODERATOR, "!kick @someone")
        .mentioning(user(TARGET))
        .direct()
        .build();
    harness.bot.on_message(&msg).await;

    assert_eq!(harness.platform.replies(), vec!["❌ No permission"]);
}

#[rstest]
#[tokio::test]
async fn only_administrators_start_giveaways(harness: Harness) {
    let msg = message(MODERATOR, "!giveaway 1 Gift Card")
        .with_permissions(Permissions::BAN_MEMBERS | Permissions::KICK_MEMBERS)
        .build();
    harness.bot.on_message(&msg).await;

    assert_eq!(
        harness.platform.sent(),
        vec![Sent::Reply("❌ No permission".to_string())]
    );
    assert_eq!(harness.bot.giveaways().in_flight(), 0);
}

#[rstest]
#[tokio::test]
async fn giveaway_usage_is_explained(harness: Harness) {
    let msg = message(MODERATOR, "!giveaway soon Gift")
        .with_permissions(Permissions::ADMINISTRATOR)
        .build();
    harness.bot.on_message(&msg).await;

    assert_eq!(
        harness.platform.replies(),
        vec!["Usage: !giveaway <minutes> <prize>"]
    );
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn giveaway_announces_a_winner_after_the_deadline(harness: Harness) {
    let msg = message(MODERATOR, "!giveaway 1 Gift Card")
        .with_permissions(Permissions::ADMINISTRATOR)
        .build();
    harness.bot.on_message(&msg).await;

    let announcement = MessageId::new(1000);
    let posted = harness.platform.messages();
    assert_eq!(posted.len(), 1);
    assert!(posted[0].starts_with("🎉 GIVEAWAY 🎉\nPrize: Gift Card\nReact 🎉\nEnds in 1 min"));
    assert!(
        harness
            .platform
            .sent()
            .contains(&Sent::React(announcement, "🎉".to_string()))
    );
    assert!(harness.platform.replies().is_empty());

    harness.platform.set_reactors(vec![
        Reactor {
            id: UserId::new(BOT_ID),
            bot: true,
        },
        Reactor {
            id: UserId::new(TARGET),
            bot: false,
        },
    ]);

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(harness.platform.messages().len(), 1);

    tokio::time::sleep(Duration::from_secs(31)).await;
    let posted = harness.platform.messages();
    assert_eq!(posted.len(), 2);
    assert_eq!(posted[1], "🏆 <@50> won **Gift Card**");
    assert_eq!(harness.bot.giveaways().in_flight(), 0);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn giveaway_without_entrants_says_so(harness: Harness) {
    let msg = message(MODERATOR, "!giveaway 2 Nitro")
        .with_permissions(Permissions::ADMINISTRATOR)
        .build();
    harness.bot.on_message(&msg).await;

    tokio::time::sleep(Duration::from_secs(121)).await;
    assert_eq!(
        harness.platform.messages().last().map(String::as_str),
        Some("No entries for **Nitro**")
    );
}
