//! End-to-end tests for the assessment lifecycle: creation, publication,
//! submission, and grading, driven through the HTTP surface.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{Duration, Utc};
use common::config::AppConfig;
use db::models::{
    assessment::{AssessmentType, Model as AssessmentModel, NewAssessment, SubmissionType},
    course::Model as CourseModel,
    user::Model as UserModel,
};
use jsonwebtoken::{EncodingKey, Header, encode};
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use serial_test::serial;
use tower::ServiceExt;

const TEST_JWT_SECRET: &str = "test_secret_key";

struct TestData {
    admin: UserModel,
    instructor: UserModel,
    other_instructor: UserModel,
    student: UserModel,
    course: CourseModel,
}

async fn make_test_app() -> (Router, DatabaseConnection) {
    // from_env requires JWT_SECRET before the config singleton initializes
    unsafe {
        std::env::set_var("JWT_SECRET", TEST_JWT_SECRET);
    }
    AppConfig::set_jwt_secret(TEST_JWT_SECRET);

    let db = db::test_utils::setup_test_db().await;
    let state = api::state::AppState::new(db.clone());
    let app = Router::new().nest("/api", api::routes::routes(state));
    (app, db)
}

async fn setup_test_data(db: &DatabaseConnection) -> TestData {
    let admin = UserModel::create(db, "admin", "admin@test.com", false, true)
        .await
        .expect("Failed to create admin");
    let instructor = UserModel::create(db, "instructor", "instructor@test.com", true, false)
        .await
        .expect("Failed to create instructor");
    let other_instructor = UserModel::create(db, "other", "other@test.com", true, false)
        .await
        .expect("Failed to create other instructor");
    let student = UserModel::create(db, "student", "student@test.com", false, false)
        .await
        .expect("Failed to create student");
    let course = CourseModel::create(db, "CS101", "Intro to Programming", instructor.id)
        .await
        .expect("Failed to create course");

    TestData {
        admin,
        instructor,
        other_instructor,
        student,
        course,
    }
}

fn token_for(user: &UserModel) -> String {
    let claims = api::auth::Claims {
        sub: user.id,
        exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
        admin: user.is_admin,
        instructor: user.is_instructor,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .expect("Failed to encode token")
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json).unwrap())
        }
        None => Body::empty(),
    };
    builder.body(body).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn assessment_body(course_id: i64, due_in_hours: i64) -> Value {
    json!({
        "course_id": course_id,
        "title": "Essay 1",
        "description": "Write an essay",
        "instructions": "At least 500 words",
        "assessment_type": "essay",
        "max_points": 100.0,
        "due_date": (Utc::now() + Duration::hours(due_in_hours)).to_rfc3339(),
        "submission_type": "text",
        "allow_late_submission": true,
        "late_penalty": 20.0
    })
}

/// Seeds an assessment directly through the model layer, bypassing HTTP.
async fn seed_assessment(
    db: &DatabaseConnection,
    data: &TestData,
    due_in_hours: i64,
    allow_late: bool,
    late_penalty: f64,
) -> AssessmentModel {
    AssessmentModel::create(
        db,
        NewAssessment {
            course_id: data.course.id,
            instructor_id: data.instructor.id,
            title: "Late policy test".into(),
            description: "desc".into(),
            instructions: "do it".into(),
            assessment_type: AssessmentType::Essay,
            max_points: 100.0,
            due_date: Utc::now() + Duration::hours(due_in_hours),
            allow_late_submission: allow_late,
            late_penalty,
            submission_type: SubmissionType::Text,
            allowed_file_types: None,
            max_file_size: None,
            rubric: vec![],
        },
    )
    .await
    .expect("Failed to seed assessment")
}

#[tokio::test]
#[serial]
async fn full_lifecycle_create_publish_submit_grade() {
    let (app, db) = make_test_app().await;
    let data = setup_test_data(&db).await;
    let instructor_token = token_for(&data.instructor);
    let student_token = token_for(&data.student);

    // Instructor creates an assessment already past its due date with a 20%
    // per-day late penalty.
    let mut body = assessment_body(data.course.id, -30);
    body["title"] = json!("Graded essay");
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/assessments",
            Some(&instructor_token),
            Some(body),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["is_published"], false);
    let assessment_id = json["data"]["id"].as_i64().unwrap();

    // Student cannot submit before publication.
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/api/assessments/{assessment_id}/submissions"),
            Some(&student_token),
            Some(json!({"content_text": "my essay"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Publish.
    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/api/assessments/{assessment_id}/publish"),
            Some(&instructor_token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["is_published"], true);

    // Student submits 30 hours past due: late, two chargeable days.
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/api/assessments/{assessment_id}/submissions"),
            Some(&student_token),
            Some(json!({"content_text": "my essay"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["is_late"], true);
    assert_eq!(json["data"]["status"], "submitted");
    let submission_id = json["data"]["id"].as_i64().unwrap();

    // Grade with 90 raw points: 90 * (1 - 0.20 * 2) = 54.
    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/api/assessments/{assessment_id}/submissions/{submission_id}/grade"),
            Some(&instructor_token),
            Some(json!({"points": 90.0, "feedback": "Good but late"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "graded");
    assert_eq!(json["data"]["grade"]["points"], 54.0);
    assert_eq!(json["data"]["grade"]["feedback"], "Good but late");
    assert_eq!(json["data"]["grade"]["graded_by"], data.instructor.id);
}

#[tokio::test]
#[serial]
async fn unauthenticated_requests_are_rejected() {
    let (app, _db) = make_test_app().await;

    let response = app
        .oneshot(request("GET", "/api/assessments", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[serial]
async fn create_rejects_non_owning_instructor_and_unknown_course() {
    let (app, db) = make_test_app().await;
    let data = setup_test_data(&db).await;

    // A different instructor cannot create under someone else's course.
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/assessments",
            Some(&token_for(&data.other_instructor)),
            Some(assessment_body(data.course.id, 24)),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Unknown course is a 404, not a 403.
    let response = app
        .oneshot(request(
            "POST",
            "/api/assessments",
            Some(&token_for(&data.instructor)),
            Some(assessment_body(9999, 24)),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Course not found");
}

#[tokio::test]
#[serial]
async fn students_cannot_see_unpublished_assessments() {
    let (app, db) = make_test_app().await;
    let data = setup_test_data(&db).await;
    let assessment = seed_assessment(&db, &data, 24, true, 10.0).await;
    let student_token = token_for(&data.student);

    // Hidden from the list.
    let response = app
        .clone()
        .oneshot(request("GET", "/api/assessments", Some(&student_token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["total"], 0);

    // Direct fetch is denied.
    let response = app
        .clone()
        .oneshot(request(
            "GET",
            &format!("/api/assessments/{}", assessment.id),
            Some(&student_token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Assessment is not published");

    // The owning instructor still sees it in their list.
    let response = app
        .oneshot(request(
            "GET",
            "/api/assessments",
            Some(&token_for(&data.instructor)),
            None,
        ))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["data"]["total"], 1);
    assert_eq!(json["data"]["items"][0]["title"], "Late policy test");
}

#[tokio::test]
#[serial]
async fn status_filter_splits_published_and_unpublished() {
    let (app, db) = make_test_app().await;
    let data = setup_test_data(&db).await;
    let unpublished = seed_assessment(&db, &data, 24, true, 10.0).await;
    let published = seed_assessment(&db, &data, 48, true, 10.0).await;
    published
        .set_published(&db, true)
        .await
        .expect("Failed to publish");
    let instructor_token = token_for(&data.instructor);

    let response = app
        .clone()
        .oneshot(request(
            "GET",
            "/api/assessments?status=unpublished",
            Some(&instructor_token),
            None,
        ))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["data"]["total"], 1);
    assert_eq!(json["data"]["items"][0]["id"], unpublished.id);

    // An unknown status value is rejected.
    let response = app
        .oneshot(request(
            "GET",
            "/api/assessments?status=archived",
            Some(&instructor_token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[serial]
async fn duplicate_submission_is_a_conflict() {
    let (app, db) = make_test_app().await;
    let data = setup_test_data(&db).await;
    let assessment = seed_assessment(&db, &data, 24, true, 10.0).await;
    assessment
        .clone()
        .set_published(&db, true)
        .await
        .expect("Failed to publish");
    let student_token = token_for(&data.student);
    let uri = format!("/api/assessments/{}/submissions", assessment.id);

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &uri,
            Some(&student_token),
            Some(json!({"content_text": "first"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(request(
            "POST",
            &uri,
            Some(&student_token),
            Some(json!({"content_text": "second"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["message"], "A submission already exists for this student");
}

#[tokio::test]
#[serial]
async fn late_submission_rejected_when_not_allowed() {
    let (app, db) = make_test_app().await;
    let data = setup_test_data(&db).await;
    let assessment = seed_assessment(&db, &data, -1, false, 0.0).await;
    assessment
        .clone()
        .set_published(&db, true)
        .await
        .expect("Failed to publish");

    let response = app
        .oneshot(request(
            "POST",
            &format!("/api/assessments/{}/submissions", assessment.id),
            Some(&token_for(&data.student)),
            Some(json!({"content_text": "too late"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Submissions are closed for this assessment");
}

#[tokio::test]
#[serial]
async fn empty_submission_is_rejected() {
    let (app, db) = make_test_app().await;
    let data = setup_test_data(&db).await;
    let assessment = seed_assessment(&db, &data, 24, true, 10.0).await;
    assessment
        .clone()
        .set_published(&db, true)
        .await
        .expect("Failed to publish");

    let response = app
        .oneshot(request(
            "POST",
            &format!("/api/assessments/{}/submissions", assessment.id),
            Some(&token_for(&data.student)),
            Some(json!({})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[serial]
async fn detail_redacts_other_students_submissions() {
    let (app, db) = make_test_app().await;
    let data = setup_test_data(&db).await;
    let assessment = seed_assessment(&db, &data, 24, true, 10.0).await;
    assessment
        .clone()
        .set_published(&db, true)
        .await
        .expect("Failed to publish");
    let other_student = UserModel::create(&db, "student2", "student2@test.com", false, false)
        .await
        .expect("Failed to create second student");

    let uri = format!("/api/assessments/{}/submissions", assessment.id);
    for (user, text) in [(&data.student, "mine"), (&other_student, "theirs")] {
        let response = app
            .clone()
            .oneshot(request(
                "POST",
                &uri,
                Some(&token_for(user)),
                Some(json!({"content_text": text})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    // The student sees only their own submission on the detail view.
    let response = app
        .clone()
        .oneshot(request(
            "GET",
            &format!("/api/assessments/{}", assessment.id),
            Some(&token_for(&data.student)),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let submissions = json["data"]["submissions"].as_array().unwrap();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0]["student_id"], data.student.id);

    // The instructor sees both.
    let response = app
        .oneshot(request(
            "GET",
            &format!("/api/assessments/{}", assessment.id),
            Some(&token_for(&data.instructor)),
            None,
        ))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["data"]["submissions"].as_array().unwrap().len(), 2);
}

#[tokio::test]
#[serial]
async fn students_cannot_list_or_grade_submissions() {
    let (app, db) = make_test_app().await;
    let data = setup_test_data(&db).await;
    let assessment = seed_assessment(&db, &data, 24, true, 10.0).await;
    assessment
        .clone()
        .set_published(&db, true)
        .await
        .expect("Failed to publish");
    let student_token = token_for(&data.student);
    let uri = format!("/api/assessments/{}/submissions", assessment.id);

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &uri,
            Some(&student_token),
            Some(json!({"content_text": "work"})),
        ))
        .await
        .unwrap();
    let submission_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(request("GET", &uri, Some(&student_token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            &format!("{uri}/{submission_id}/grade"),
            Some(&student_token),
            Some(json!({"points": 100.0})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Admins may list without owning the course.
    let response = app
        .oneshot(request("GET", &uri, Some(&token_for(&data.admin)), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["total"], 1);
}

#[tokio::test]
#[serial]
async fn grading_rejects_negative_points() {
    let (app, db) = make_test_app().await;
    let data = setup_test_data(&db).await;
    let assessment = seed_assessment(&db, &data, 24, true, 10.0).await;
    assessment
        .clone()
        .set_published(&db, true)
        .await
        .expect("Failed to publish");
    let uri = format!("/api/assessments/{}/submissions", assessment.id);

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &uri,
            Some(&token_for(&data.student)),
            Some(json!({"content_text": "work"})),
        ))
        .await
        .unwrap();
    let submission_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = app
        .oneshot(request(
            "PUT",
            &format!("{uri}/{submission_id}/grade"),
            Some(&token_for(&data.instructor)),
            Some(json!({"points": -5.0})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[serial]
async fn grading_missing_submission_is_not_found_even_for_non_owners() {
    let (app, db) = make_test_app().await;
    let data = setup_test_data(&db).await;
    let assessment = seed_assessment(&db, &data, 24, true, 10.0).await;
    let uri = format!(
        "/api/assessments/{}/submissions/9999/grade",
        assessment.id
    );

    // Missing-resource resolution precedes the grade authorization check, so
    // a student hitting a nonexistent submission sees 404, not 403.
    for user in [&data.student, &data.instructor] {
        let response = app
            .clone()
            .oneshot(request(
                "PUT",
                &uri,
                Some(&token_for(user)),
                Some(json!({"points": 50.0})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["message"], "Submission not found");
    }
}

#[tokio::test]
#[serial]
async fn update_and_delete_respect_ownership() {
    let (app, db) = make_test_app().await;
    let data = setup_test_data(&db).await;
    let assessment = seed_assessment(&db, &data, 24, true, 10.0).await;
    let uri = format!("/api/assessments/{}", assessment.id);

    // Non-owner cannot edit.
    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            &uri,
            Some(&token_for(&data.other_instructor)),
            Some(json!({"title": "Hijacked"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Owner edits a single field; the rest is untouched.
    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            &uri,
            Some(&token_for(&data.instructor)),
            Some(json!({"title": "Renamed"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["title"], "Renamed");
    assert_eq!(json["data"]["max_points"], 100.0);

    // Admin may delete without owning the course.
    let response = app
        .clone()
        .oneshot(request("DELETE", &uri, Some(&token_for(&data.admin)), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(request(
            "GET",
            &uri,
            Some(&token_for(&data.instructor)),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[serial]
async fn listing_paginates_with_envelope_fields() {
    let (app, db) = make_test_app().await;
    let data = setup_test_data(&db).await;
    for _ in 0..3 {
        let a = seed_assessment(&db, &data, 24, true, 10.0).await;
        a.set_published(&db, true).await.expect("Failed to publish");
    }

    let response = app
        .oneshot(request(
            "GET",
            "/api/assessments?page=1&limit=2",
            Some(&token_for(&data.student)),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let page = &json["data"];
    assert_eq!(page["items"].as_array().unwrap().len(), 2);
    assert_eq!(page["page"], 1);
    assert_eq!(page["limit"], 2);
    assert_eq!(page["total"], 3);
    assert_eq!(page["total_pages"], 2);
    assert_eq!(page["has_next"], true);
    assert_eq!(page["has_prev"], false);
}
