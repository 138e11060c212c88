//! GoFit Core Library
//!
//! This crate provides the storage and state core of GoFit, a personal
//! fitness tracker: exercises, workouts, scheduled workouts, activities,
//! the user profile and aggregate stats, all kept on the local device.
//!
//! # Architecture
//!
//! - **KvStore**: async JSON key-value store over SQLite (or memory)
//! - **WorkoutStorage**: six fixed collections, one key each
//! - **WorkoutData**: in-memory state that only changes after a write lands
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let data = WorkoutData::open_with_config(&config).await?;
//!
//! // Build today's workout
//! let workout = data
//!     .create_workout("Push day", vec![NewExercise::new("Push-ups", 3, 15)])
//!     .await?;
//!
//! // Tick off the first exercise
//! data.toggle_exercise_completed(0).await?;
//! ```
//!
//! # Modules
//!
//! - `workout_data`: state controller (main entry point)
//! - `models`: records, creation inputs and partial updates
//! - `storage`: key-value backends and typed collections
//! - `config`: application configuration

pub mod config;
pub mod models;
pub mod storage;
pub mod workout_data;

pub use config::Config;
pub use models::{
    Activity, ActivityStatus, Exercise, NewActivity, NewExercise, NewScheduledWorkout,
    ScheduleStatus, ScheduledWorkout, UserProfile, Workout, WorkoutStats, WorkoutType,
};
pub use storage::{KvStore, StorageError, StorageKey, WorkoutStorage};
pub use workout_data::{Clock, WorkoutData, WorkoutState};
