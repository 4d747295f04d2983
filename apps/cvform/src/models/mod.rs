pub mod form;

pub use form::{
    is_affirmative, parse_skills, EducationEntry, EmbeddedPhoto, ExperienceEntry, FieldId,
    FormState, AFFIRMATIVE,
};
