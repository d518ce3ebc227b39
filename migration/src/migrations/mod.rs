pub mod m202601050001_create_users;
pub mod m202601050002_create_courses;
pub mod m202601050003_create_assessments;
pub mod m202601050004_create_assessment_submissions;
