pub mod join;
pub mod play;
pub mod stop;

use crate::Bot;
use crate::commands::{CommandError, CommandResult, Invocation};
use tracing::info;
