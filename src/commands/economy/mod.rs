pub mod shop;

use crate::Bot;
use crate::commands::{CommandResult, Invocation};
