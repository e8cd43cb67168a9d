// Terminal presentation: renders the workflow and forwards user intents

pub mod intent;
pub mod repl;
pub mod view;

pub use intent::{Intent, IntentError};
pub use repl::run_session;
pub use view::{PreviewView, ViewModel};
