//! Diesel schema for weekly task persistence.

diesel::table! {
    /// Weekly task records.
    weekly_tasks (id) {
        /// Internal task identifier.
        id -> Uuid,
        /// Owning person.
        owner_id -> Uuid,
        /// Assigning manager, if any.
        assigned_by -> Nullable<Uuid>,
        /// ISO week-numbering year.
        year -> Int4,
        /// ISO week number.
        week_number -> Int4,
        /// Task title.
        #[max_length = 500]
        title -> Varchar,
        /// Optional description.
        description -> Nullable<Text>,
        /// Task source.
        #[max_length = 32]
        source -> Varchar,
        /// Catalog task type reference.
        task_type_id -> Nullable<Uuid>,
        /// Key-task flag.
        is_key_task -> Bool,
        /// Planned start.
        planned_start -> Timestamptz,
        /// Planned end.
        planned_end -> Timestamptz,
        /// Planned duration in minutes.
        planned_duration_minutes -> Int8,
        /// Actual start.
        actual_start -> Nullable<Timestamptz>,
        /// Actual end.
        actual_end -> Nullable<Timestamptz>,
        /// Actual duration in minutes.
        actual_duration_minutes -> Nullable<Int8>,
        /// Lifecycle status.
        #[max_length = 32]
        status -> Varchar,
        /// Completion timestamp.
        completed_at -> Nullable<Timestamptz>,
        /// Rollover flag.
        is_delayed_from_previous -> Bool,
        /// Week number one rollover hop back.
        original_week -> Nullable<Int4>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// One review per weekly task.
    task_reviews (id) {
        /// Internal review identifier.
        id -> Uuid,
        /// Reviewed task; unique.
        task_id -> Uuid,
        /// Whether the work was finished.
        is_completed -> Bool,
        /// Why the work was not finished.
        #[max_length = 500]
        incomplete_reason -> Nullable<Varchar>,
        /// Follow-up action for unfinished work.
        #[max_length = 32]
        follow_up_action -> Nullable<Varchar>,
        /// Free-text notes.
        notes -> Nullable<Text>,
        /// Review origin.
        #[max_length = 16]
        origin -> Varchar,
        /// Review timestamp.
        reviewed_at -> Timestamptz,
    }
}

diesel::table! {
    /// Manager comments on a member's weekly report.
    report_comments (id) {
        /// Internal comment identifier.
        id -> Uuid,
        /// Member whose week is commented on.
        member_id -> Uuid,
        /// ISO week-numbering year.
        year -> Int4,
        /// ISO week number.
        week_number -> Int4,
        /// Comment author.
        manager_id -> Uuid,
        /// Comment text.
        content -> Text,
        /// Reviewed flag.
        is_reviewed -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(task_reviews -> weekly_tasks (task_id));
diesel::allow_tables_to_appear_in_same_query!(weekly_tasks, task_reviews, report_comments);
