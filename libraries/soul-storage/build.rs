//! Build script for soul-storage.
//!
//! `sqlx::migrate!` embeds the SQL files at compile time, so the crate has
//! to be rebuilt whenever one of them is added or edited.

fn main() {
    println!("cargo:rerun-if-changed=migrations");
}
