//! Node query client: asks the node-control command for the selected tip
//! and for blocks, and turns its JSON output into core types.

mod cli;
mod client;
mod wire;

pub use cli::CliNodeClient;
pub use client::{NodeClient, OP_GET_BLOCK, OP_GET_SELECTED_TIP_HASH};
pub use wire::{parse_block, parse_selected_tip_hash};
