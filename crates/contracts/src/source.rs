//! MessageSource trait - input front-end interface

use crate::{ContractError, ParsedMessage};

/// Producer of parsed input messages
///
/// The engine consumes a source to exhaustion; `None` means end of input.
#[trait_variant::make(MessageSource: Send)]
pub trait LocalMessageSource {
    /// Next parsed message, or `None` at end of input
    ///
    /// # Errors
    /// A malformed line yields `Err`; the run terminates, there is no
    /// partial-line recovery.
    async fn next_message(&mut self) -> Option<Result<ParsedMessage, ContractError>>;
}
