mod copy_directory;
mod create_shortcut;
mod operation;
mod registry;

pub use copy_directory::{CopyDirectory, FILES_KEY, FORCE_OVERWRITE};
pub use create_shortcut::{CREATED_DIRECTORIES_KEY, CreateShortcut, WORKING_DIRECTORY_PREFIX};
pub use operation::{NoProgress, OpResult, Operation, PersistedState, Progress};
pub use registry::{OperationRecord, OperationRegistry};
