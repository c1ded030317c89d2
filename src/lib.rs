//! Client-side voxel world engine.
//!
//! [`Engine`] owns the chunk store, the mesh worker pool, the player table and
//! the clock. It consumes decoded server messages, keeps the chunks around the
//! player compiled, and answers spatial queries for movement and editing.
#![forbid(unsafe_code)]

pub mod chat;
pub mod clock;
pub mod config;
pub mod engine;
pub mod player;
pub mod query;
pub mod render;

mod lifecycle_tests;
mod messages_tests;
mod test_support;

pub use chat::{ChatLog, Command};
pub use clock::DayClock;
pub use config::{EngineConfig, load_config_from_path};
pub use engine::{DrawItem, EYE_HEIGHT, Engine, MoveInput, Radii};
pub use player::{LocalPlayer, PlayerState, Players, RemotePlayer};
pub use query::{Hit, chunk_visible, collide, highest_block, hit_test, player_intersects_block};
pub use render::{NullRenderer, RenderSink};
