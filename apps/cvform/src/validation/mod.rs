// Phase 1: Field validation: per-field rules, the field → rule registry, date arithmetic and
// the derived-field engine that keeps age and license fields in step.

pub mod dates;
pub mod derived;
pub mod registry;
pub mod rules;

pub use dates::{Clock, FixedClock, SystemClock};
pub use derived::apply_change;
pub use registry::{ValidationResult, ValidatorRegistry};
