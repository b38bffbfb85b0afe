//! Command handlers.
//!
//! | File      | Invocation                       | Description                     |
//! |-----------|----------------------------------|---------------------------------|
//! | `run.rs`  | `unbackup <config> [full\|diff]`  | Full or differential backup     |

pub mod run;
