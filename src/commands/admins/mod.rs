pub mod giveaway;
pub mod moderation;

use crate::Bot;
use crate::commands::{CommandError, CommandResult, Invocation};
use poise::serenity_prelude::Permissions;
