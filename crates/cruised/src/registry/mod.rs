//! Ship registry using the actor pattern.
//!
//! ```text
//! ┌──────────────────┐   RegistryCommand   ┌─────────────────┐   ShipEvent   ┌──────────────┐
//! │ ConnectionHandler│────(mpsc)──────────▶│  RegistryActor  │──(broadcast)─▶│  Subscribers │
//! │  (per client)    │◀───(oneshot)────────│  owns the Ship  │               │  (consoles)  │
//! └──────────────────┘                     └─────────────────┘               └──────────────┘
//! ```
//!
//! The actor is the only writer of cabin and waiting-list state.

use tokio::sync::{broadcast, mpsc};

mod actor;
mod commands;
mod handle;

pub use actor::RegistryActor;
pub use commands::{RegistryCommand, RegistryError, ShipEvent};
pub use handle::RegistryHandle;

/// Channel buffer sizes
const COMMAND_BUFFER: usize = 100;
const EVENT_BUFFER: usize = 100;

/// Spawns the registry actor on a tokio task and returns a handle to it.
///
/// The ship starts with all twelve cabins empty and nobody waiting.
///
/// ```no_run
/// use cruised::registry::spawn_registry;
///
/// #[tokio::main]
/// async fn main() {
///     let handle = spawn_registry();
///     let cabins = handle.get_all_cabins().await;
/// }
/// ```
pub fn spawn_registry() -> RegistryHandle {
    let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_BUFFER);
    let (event_tx, _) = broadcast::channel(EVENT_BUFFER);

    let actor = RegistryActor::new(cmd_rx, event_tx.clone());
    tokio::spawn(actor.run());

    RegistryHandle::new(cmd_tx, event_tx)
}
