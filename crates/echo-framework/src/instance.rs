use state::InitCell;

use crate::error::HostError;

static PROCESS: InstanceSlot = InstanceSlot::new();

/// A claim-once slot guarding "at most one game".
///
/// [`EchoGame::new`](crate::EchoGame::new) claims the process-wide slot.
/// Tests and tools that need several independent hosts in one process
/// construct their own slot and use
/// [`EchoGame::new_in`](crate::EchoGame::new_in).
///
/// A claimed slot is never released.
pub struct InstanceSlot {
    owner: InitCell<String>,
}

impl InstanceSlot {
    pub const fn new() -> Self {
        Self { owner: InitCell::new() }
    }

    /// The slot shared by the whole process.
    pub fn process() -> &'static InstanceSlot {
        &PROCESS
    }

    pub fn is_claimed(&self) -> bool {
        self.owner.try_get().is_some()
    }

    /// Title of the game that claimed the slot.
    pub fn owner(&self) -> Option<&str> {
        self.owner.try_get().map(String::as_str)
    }

    /// Claims the slot for `owner`.
    pub fn claim(&self, owner: &str) -> Result<(), HostError> {
        if self.owner.set(owner.to_string()) {
            Ok(())
        } else {
            Err(HostError::AlreadyInitialized)
        }
    }
}

impl Default for InstanceSlot {
    fn default() -> Self {
        Self::new()
    }
}
