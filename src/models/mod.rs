pub mod commit;
pub mod log;
pub mod selection;

pub use commit::{abbreviate, parse_timestamp, Commit, CommitStatus, RepoRole, Repository, SHORT_HASH_LEN};
pub use log::ExecutionLog;
pub use selection::Selection;
