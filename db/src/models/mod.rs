pub mod assessment;
pub mod assessment_submission;
pub mod course;
pub mod user;

pub use assessment::Entity as Assessment;
pub use assessment_submission::Entity as AssessmentSubmission;
pub use course::Entity as Course;
pub use user::Entity as User;
