//! Changelog generation in the conventional-changelog Markdown format.

pub mod file;
pub mod notes;

pub use file::{contains_version, prepend};
pub use notes::{section_title, NoteEntry, NoteSection, ReleaseInfo, ReleaseNotes};
