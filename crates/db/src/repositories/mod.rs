//! Repositories: one struct of associated query functions per table group.

mod course_repo;
mod purchase_repo;
mod question_repo;
mod session_repo;
mod trial_repo;
mod user_repo;

pub use course_repo::CourseRepo;
pub use purchase_repo::PurchaseRepo;
pub use question_repo::QuestionRepo;
pub use session_repo::SessionRepo;
pub use trial_repo::TrialRepo;
pub use user_repo::UserRepo;
