//! Domain collections
//!
//! Six fixed collections, each stored as one JSON value under one key.
//! The list collections read back as an empty `Vec` when nothing is stored.
//!
//! Writes that depend on the current value (`modify_*`) hold the key's
//! lock while they re-read, edit and write back the whole collection.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::debug;

use super::error::StorageResult;
use super::kv::KvStore;
use crate::models::{
    Activity, Exercise, Record, ScheduledWorkout, UserProfile, Workout, WorkoutStats,
    WorkoutUpdate,
};

/// The fixed keys of the persisted collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    UserProfile,
    Workouts,
    Exercises,
    ScheduledWorkouts,
    WorkoutStats,
    Activities,
}

impl StorageKey {
    pub const ALL: [StorageKey; 6] = [
        StorageKey::UserProfile,
        StorageKey::Workouts,
        StorageKey::Exercises,
        StorageKey::ScheduledWorkouts,
        StorageKey::WorkoutStats,
        StorageKey::Activities,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::UserProfile => "user_profile",
            StorageKey::Workouts => "workouts",
            StorageKey::Exercises => "exercises",
            StorageKey::ScheduledWorkouts => "scheduled_workouts",
            StorageKey::WorkoutStats => "workout_stats",
            StorageKey::Activities => "activities",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

/// Every collection as read by [`WorkoutStorage::load_snapshot`]
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub user_profile: Option<UserProfile>,
    pub workouts: Vec<Workout>,
    pub exercises: Vec<Exercise>,
    pub scheduled_workouts: Vec<ScheduledWorkout>,
    pub workout_stats: Option<WorkoutStats>,
    pub activities: Vec<Activity>,
}

/// Typed access to the persisted collections
#[derive(Clone)]
pub struct WorkoutStorage {
    kv: KvStore,
    locks: Arc<[Mutex<()>; 6]>,
}

impl WorkoutStorage {
    pub fn new(kv: KvStore) -> Self {
        Self {
            kv,
            locks: Arc::new(Default::default()),
        }
    }

    /// The underlying key-value store
    pub fn kv(&self) -> &KvStore {
        &self.kv
    }

    fn lock(&self, key: StorageKey) -> &Mutex<()> {
        &self.locks[key.index()]
    }

    async fn get_list<T: DeserializeOwned>(&self, key: StorageKey) -> Vec<T> {
        self.kv.get(key.as_str()).await.unwrap_or_default()
    }

    async fn save_value<T: Serialize + ?Sized>(&self, key: StorageKey, value: &T) -> StorageResult<()> {
        let _guard = self.lock(key).lock().await;
        self.kv.set(key.as_str(), value).await
    }

    /// Re-read, edit and write back a list collection under its key lock
    ///
    /// A read error aborts before anything is written; only a missing key
    /// starts from an empty list. `on_saved` runs after the write succeeds
    /// and before the lock is released, so observers see saves in commit
    /// order.
    async fn modify_list<T, R, E, C>(&self, key: StorageKey, edit: E, on_saved: C) -> StorageResult<R>
    where
        T: Record,
        E: FnOnce(&mut Vec<T>) -> R,
        C: FnOnce(&[T], &R),
    {
        let _guard = self.lock(key).lock().await;
        let mut items: Vec<T> = self.kv.try_get(key.as_str()).await?.unwrap_or_default();
        let output = edit(&mut items);
        self.kv.set(key.as_str(), &items).await?;
        debug!("Saved {} records to {}", items.len(), key.as_str());
        on_saved(&items, &output);
        Ok(output)
    }

    /// Same as [`modify_list`](Self::modify_list) for the single-record keys
    async fn modify_record<T, E, C>(&self, key: StorageKey, edit: E, on_saved: C) -> StorageResult<T>
    where
        T: Serialize + DeserializeOwned,
        E: FnOnce(Option<T>) -> T,
        C: FnOnce(&T),
    {
        let _guard = self.lock(key).lock().await;
        let current: Option<T> = self.kv.try_get(key.as_str()).await?;
        let updated = edit(current);
        self.kv.set(key.as_str(), &updated).await?;
        on_saved(&updated);
        Ok(updated)
    }

    /// Read all six collections while holding every key lock
    ///
    /// Locks are taken in [`StorageKey::ALL`] order and stay held while
    /// `on_loaded` runs, so no write can commit between the reads and
    /// whatever the caller does with them.
    pub async fn load_snapshot<R, C>(&self, on_loaded: C) -> R
    where
        C: FnOnce(Snapshot) -> R,
    {
        let mut guards = Vec::with_capacity(StorageKey::ALL.len());
        for key in StorageKey::ALL {
            guards.push(self.lock(key).lock().await);
        }

        let (user_profile, workouts, exercises, scheduled_workouts, workout_stats, activities) = tokio::join!(
            self.get_user_profile(),
            self.get_workouts(),
            self.get_exercises(),
            self.get_scheduled_workouts(),
            self.get_workout_stats(),
            self.get_activities(),
        );

        let output = on_loaded(Snapshot {
            user_profile,
            workouts,
            exercises,
            scheduled_workouts,
            workout_stats,
            activities,
        });
        drop(guards);
        output
    }

    // ==================== User profile ====================

    pub async fn get_user_profile(&self) -> Option<UserProfile> {
        self.kv.get(StorageKey::UserProfile.as_str()).await
    }

    pub async fn save_user_profile(&self, profile: &UserProfile) -> StorageResult<()> {
        self.save_value(StorageKey::UserProfile, profile).await
    }

    pub async fn modify_user_profile<E, C>(&self, edit: E, on_saved: C) -> StorageResult<UserProfile>
    where
        E: FnOnce(Option<UserProfile>) -> UserProfile,
        C: FnOnce(&UserProfile),
    {
        self.modify_record(StorageKey::UserProfile, edit, on_saved)
            .await
    }

    // ==================== Workout stats ====================

    pub async fn get_workout_stats(&self) -> Option<WorkoutStats> {
        self.kv.get(StorageKey::WorkoutStats.as_str()).await
    }

    pub async fn save_workout_stats(&self, stats: &WorkoutStats) -> StorageResult<()> {
        self.save_value(StorageKey::WorkoutStats, stats).await
    }

    pub async fn modify_workout_stats<E, C>(&self, edit: E, on_saved: C) -> StorageResult<WorkoutStats>
    where
        E: FnOnce(Option<WorkoutStats>) -> WorkoutStats,
        C: FnOnce(&WorkoutStats),
    {
        self.modify_record(StorageKey::WorkoutStats, edit, on_saved)
            .await
    }

    // ==================== Workouts ====================

    pub async fn get_workouts(&self) -> Vec<Workout> {
        self.get_list(StorageKey::Workouts).await
    }

    pub async fn save_workouts(&self, workouts: &[Workout]) -> StorageResult<()> {
        self.save_value(StorageKey::Workouts, workouts).await
    }

    pub async fn modify_workouts<R, E, C>(&self, edit: E, on_saved: C) -> StorageResult<R>
    where
        E: FnOnce(&mut Vec<Workout>) -> R,
        C: FnOnce(&[Workout], &R),
    {
        self.modify_list(StorageKey::Workouts, edit, on_saved).await
    }

    /// Append a workout to the stored collection
    pub async fn add_workout(&self, workout: &Workout) -> StorageResult<()> {
        self.modify_workouts(|workouts| workouts.push(workout.clone()), |_, _| {})
            .await
    }

    /// Merge `updates` into the stored workout with `id`
    pub async fn update_workout(
        &self,
        id: &str,
        updates: &WorkoutUpdate,
    ) -> StorageResult<Option<Workout>> {
        self.modify_workouts(|workouts| update_by_id(workouts, id, updates), |_, _| {})
            .await
    }

    /// Remove the stored workout with `id`; returns whether it existed
    pub async fn delete_workout(&self, id: &str) -> StorageResult<bool> {
        self.modify_workouts(|workouts| remove_by_id(workouts, id).is_some(), |_, _| {})
            .await
    }

    // ==================== Exercises ====================

    pub async fn get_exercises(&self) -> Vec<Exercise> {
        self.get_list(StorageKey::Exercises).await
    }

    pub async fn save_exercises(&self, exercises: &[Exercise]) -> StorageResult<()> {
        self.save_value(StorageKey::Exercises, exercises).await
    }

    pub async fn modify_exercises<R, E, C>(&self, edit: E, on_saved: C) -> StorageResult<R>
    where
        E: FnOnce(&mut Vec<Exercise>) -> R,
        C: FnOnce(&[Exercise], &R),
    {
        self.modify_list(StorageKey::Exercises, edit, on_saved).await
    }

    // ==================== Scheduled workouts ====================

    pub async fn get_scheduled_workouts(&self) -> Vec<ScheduledWorkout> {
        self.get_list(StorageKey::ScheduledWorkouts).await
    }

    pub async fn save_scheduled_workouts(
        &self,
        scheduled: &[ScheduledWorkout],
    ) -> StorageResult<()> {
        self.save_value(StorageKey::ScheduledWorkouts, scheduled)
            .await
    }

    pub async fn modify_scheduled_workouts<R, E, C>(&self, edit: E, on_saved: C) -> StorageResult<R>
    where
        E: FnOnce(&mut Vec<ScheduledWorkout>) -> R,
        C: FnOnce(&[ScheduledWorkout], &R),
    {
        self.modify_list(StorageKey::ScheduledWorkouts, edit, on_saved)
            .await
    }

    // ==================== Activities ====================

    pub async fn get_activities(&self) -> Vec<Activity> {
        self.get_list(StorageKey::Activities).await
    }

    pub async fn save_activities(&self, activities: &[Activity]) -> StorageResult<()> {
        self.save_value(StorageKey::Activities, activities).await
    }

    pub async fn modify_activities<R, E, C>(&self, edit: E, on_saved: C) -> StorageResult<R>
    where
        E: FnOnce(&mut Vec<Activity>) -> R,
        C: FnOnce(&[Activity], &R),
    {
        self.modify_list(StorageKey::Activities, edit, on_saved)
            .await
    }

    // ==================== Maintenance ====================

    /// Remove every stored collection
    pub async fn clear_all(&self) -> StorageResult<()> {
        for key in StorageKey::ALL {
            let _guard = self.lock(key).lock().await;
            self.kv.remove(key.as_str()).await?;
        }
        Ok(())
    }
}

/// Merge `updates` into the record with `id`, returning the merged record
pub fn update_by_id<T: Record>(items: &mut [T], id: &str, updates: &T::Update) -> Option<T> {
    let item = items.iter_mut().find(|item| item.id() == id)?;
    item.apply(updates);
    Some(item.clone())
}

/// Remove the record with `id`, returning it
pub fn remove_by_id<T: Record>(items: &mut Vec<T>, id: &str) -> Option<T> {
    let pos = items.iter().position(|item| item.id() == id)?;
    Some(items.remove(pos))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        ActivityStatus, ExerciseCounts, NewActivity, NewExercise, NewScheduledWorkout,
        ScheduleStatus, WorkoutType,
    };
    use crate::storage::backend::KvBackend;
    use crate::storage::test_support::FlakyBackend;
    use chrono::{NaiveDate, Utc};

    fn storage() -> WorkoutStorage {
        WorkoutStorage::new(KvStore::in_memory())
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_key_names() {
        let names: Vec<&str> = StorageKey::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "user_profile",
                "workouts",
                "exercises",
                "scheduled_workouts",
                "workout_stats",
                "activities"
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_collections_are_empty_vecs() {
        let storage = storage();
        assert!(storage.get_workouts().await.is_empty());
        assert!(storage.get_exercises().await.is_empty());
        assert!(storage.get_scheduled_workouts().await.is_empty());
        assert!(storage.get_activities().await.is_empty());
        assert!(storage.get_user_profile().await.is_none());
        assert!(storage.get_workout_stats().await.is_none());
    }

    #[tokio::test]
    async fn test_save_then_get_returns_same_collections() {
        let storage = storage();
        let now = Utc::now();

        let exercises = vec![
            Exercise::create(NewExercise::new("Push-ups", 3, 15), date("2024-03-01"), now),
            Exercise::create(
                NewExercise::new("Deadlift", 5, 3).with_weight(140.5),
                date("2024-03-02"),
                now,
            ),
        ];
        storage.save_exercises(&exercises).await.unwrap();
        assert_eq!(storage.get_exercises().await, exercises);

        let scheduled = vec![ScheduledWorkout::create(
            NewScheduledWorkout {
                name: "Yoga".to_string(),
                date: date("2024-03-04"),
                time: "18:30".to_string(),
                duration: 60,
                workout_type: WorkoutType::Flexibility,
                status: ScheduleStatus::Scheduled,
            },
            now,
        )];
        storage.save_scheduled_workouts(&scheduled).await.unwrap();
        assert_eq!(storage.get_scheduled_workouts().await, scheduled);

        let activities = vec![Activity::create(
            NewActivity {
                name: "Upper body".to_string(),
                status: ActivityStatus::Completed,
                exercises: ExerciseCounts {
                    completed: 4,
                    total: 4,
                },
                duration: Some(50),
                ..NewActivity::default()
            },
            date("2024-03-01"),
            now,
        )];
        storage.save_activities(&activities).await.unwrap();
        assert_eq!(storage.get_activities().await, activities);

        let profile = UserProfile::new("Alex Johnson", date("2024-01-15"));
        storage.save_user_profile(&profile).await.unwrap();
        assert_eq!(storage.get_user_profile().await, Some(profile));

        let stats = WorkoutStats {
            total_workouts: 87,
            weekly_goal: 5,
            ..WorkoutStats::default()
        };
        storage.save_workout_stats(&stats).await.unwrap();
        assert_eq!(storage.get_workout_stats().await, Some(stats));
    }

    #[tokio::test]
    async fn test_workout_helpers() {
        let storage = storage();
        let first = Workout::new("Push day", date("2024-03-01"));
        let second = Workout::new("Pull day", date("2024-03-02"));

        storage.add_workout(&first).await.unwrap();
        storage.add_workout(&second).await.unwrap();
        assert_eq!(storage.get_workouts().await.len(), 2);

        let updated = storage
            .update_workout(
                &first.id,
                &WorkoutUpdate {
                    completed: Some(true),
                    ..WorkoutUpdate::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert!(updated.completed);
        assert_eq!(updated.name, "Push day");

        let missing = storage
            .update_workout("nope", &WorkoutUpdate::default())
            .await
            .unwrap();
        assert!(missing.is_none());

        assert!(storage.delete_workout(&first.id).await.unwrap());
        assert!(!storage.delete_workout(&first.id).await.unwrap());

        let remaining = storage.get_workouts().await;
        assert_eq!(remaining, vec![second]);
    }

    #[tokio::test]
    async fn test_modify_reports_saved_collection() {
        let storage = storage();
        let mut seen = Vec::new();

        let added = storage
            .modify_exercises(
                |items| {
                    let exercise =
                        Exercise::create(NewExercise::new("Lunge", 3, 12), date("2024-03-01"), Utc::now());
                    items.push(exercise.clone());
                    exercise
                },
                |saved, _| seen = saved.to_vec(),
            )
            .await
            .unwrap();

        assert_eq!(seen, vec![added]);
    }

    #[tokio::test]
    async fn test_modify_record_starts_from_none() {
        let storage = storage();

        let stats = storage
            .modify_workout_stats(
                |current| {
                    assert!(current.is_none());
                    WorkoutStats {
                        weekly_goal: 4,
                        ..WorkoutStats::default()
                    }
                },
                |_| {},
            )
            .await
            .unwrap();

        assert_eq!(storage.get_workout_stats().await, Some(stats));
    }

    fn flaky_storage() -> (Arc<FlakyBackend>, WorkoutStorage) {
        let backend = Arc::new(FlakyBackend::new());
        let storage = WorkoutStorage::new(KvStore::from_backend(backend.clone()));
        (backend, storage)
    }

    fn exercise(name: &str) -> Exercise {
        Exercise::create(NewExercise::new(name, 3, 10), date("2024-03-01"), Utc::now())
    }

    #[tokio::test]
    async fn test_modify_aborts_when_read_fails() {
        let (backend, storage) = flaky_storage();
        let existing = vec![exercise("A"), exercise("B"), exercise("C")];
        storage.save_exercises(&existing).await.unwrap();

        backend.fail_next_reads(1);
        let mut saved_called = false;
        let result = storage
            .modify_exercises(|items| items.push(exercise("D")), |_, _| saved_called = true)
            .await;

        assert!(result.is_err());
        assert!(!saved_called);
        assert_eq!(storage.get_exercises().await, existing);
    }

    #[tokio::test]
    async fn test_modify_keeps_unreadable_collection_intact() {
        let (backend, storage) = flaky_storage();
        let legacy = r#"[{"id":"1","name":"Old","sets":3,"reps":10,"date":"2024-01-01"}]"#;
        backend.inner().set("exercises", legacy).unwrap();

        let result = storage
            .modify_exercises(|items| items.push(exercise("New")), |_, _| {})
            .await;

        assert!(result.is_err());
        assert_eq!(backend.inner().get("exercises").unwrap().as_deref(), Some(legacy));
    }

    #[tokio::test]
    async fn test_modify_record_aborts_when_read_fails() {
        let (backend, storage) = flaky_storage();
        let stats = WorkoutStats {
            total_workouts: 12,
            ..WorkoutStats::default()
        };
        storage.save_workout_stats(&stats).await.unwrap();

        backend.fail_next_reads(1);
        let result = storage
            .modify_workout_stats(|current| current.unwrap_or_default(), |_| {})
            .await;

        assert!(result.is_err());
        assert_eq!(storage.get_workout_stats().await, Some(stats));
    }

    #[tokio::test]
    async fn test_load_snapshot_waits_for_pending_write() {
        let (backend, storage) = flaky_storage();
        backend.slow_reads(true);

        let writer = storage.modify_exercises(|items| items.push(exercise("A")), |_, _| {});
        let reader = async {
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            storage.load_snapshot(|snapshot| snapshot.exercises.len()).await
        };
        let (written, seen) = tokio::join!(writer, reader);

        written.unwrap();
        assert_eq!(seen, 1);
    }

    #[tokio::test]
    async fn test_clear_all() {
        let storage = storage();
        storage
            .add_workout(&Workout::new("Push day", date("2024-03-01")))
            .await
            .unwrap();
        storage
            .save_workout_stats(&WorkoutStats::default())
            .await
            .unwrap();

        storage.clear_all().await.unwrap();

        assert!(storage.get_workouts().await.is_empty());
        assert!(storage.get_workout_stats().await.is_none());
        assert!(storage.kv().list_keys().await.is_empty());
    }
}
