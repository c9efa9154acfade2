//! Platform-neutral path utilities used by the operations.
//!
//! Provides deletion of files that may be locked, native link and shortcut
//! creation, and the directory pruning helpers undo relies on.

mod delete;
mod link;
mod lnk;
mod shortcut;
mod tree;

pub use delete::{Deletion, delete_file_now_or_later, remove_entry};
pub use link::{create_symlink, normalize, resolve_link_target, to_absolute};
pub use lnk::{ShellLink, ShellLinkStrings, decode_shell_link, encode_shell_link};
pub use shortcut::{ShortcutSpec, create_shortcut, supports_shortcut_metadata};
pub use tree::{
    create_dir_all_tracked, is_system_generated_file, prune_empty_ancestors,
    remove_dir_if_empty, remove_system_generated_files,
};
