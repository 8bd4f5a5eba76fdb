pub mod help;
pub mod level;
pub mod ping;

use crate::Bot;
use crate::commands::{CommandResult, Invocation};
