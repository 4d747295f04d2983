// Phase 2: Repeatable sections (education / experience) and section-level progress tracking.

pub mod entries;
pub mod progress;

pub use entries::{
    add_entry, enforce_capacity, remove_entry, set_education_field, set_experience_current,
    set_experience_field, EducationField, ExperienceField, SectionKind, MAX_EXPERIENCE,
};
pub use progress::{compute_progress, Progress, ProgressSection, SectionProgress};
