mod helpers;

use axum_test::multipart::{MultipartForm, Part};
use helpers::auth::{mint_token, test_user};
use helpers::fixtures::{
    create_test_docx, create_test_pdf, file_form, DOCX_CONTENT_TYPE, PDF_CONTENT_TYPE,
};
use helpers::{api_path, setup_test_app, TEST_JWT_SECRET};
use uuid::Uuid;

#[tokio::test]
async fn test_extract_text_requires_token() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/extract-text"))
        .multipart(file_form(create_test_pdf(&[&["Hello"]]), "a.pdf", PDF_CONTENT_TYPE))
        .await;

    assert_eq!(response.status_code(), 401);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_extract_text_rejects_expired_token() {
    let app = setup_test_app().await;
    let token = mint_token(Uuid::new_v4(), -60, TEST_JWT_SECRET);

    let response = app
        .client()
        .post(&api_path("/extract-text"))
        .add_header("Authorization", format!("Bearer {}", token))
        .multipart(file_form(create_test_pdf(&[&["Hello"]]), "a.pdf", PDF_CONTENT_TYPE))
        .await;

    assert_eq!(response.status_code(), 401);
}

#[tokio::test]
async fn test_extract_text_rejects_token_signed_with_other_secret() {
    let app = setup_test_app().await;
    let token = mint_token(
        Uuid::new_v4(),
        3600,
        "some-other-secret-that-is-also-32-characters",
    );

    let response = app
        .client()
        .post(&api_path("/extract-text"))
        .add_header("Authorization", format!("Bearer {}", token))
        .multipart(file_form(create_test_pdf(&[&["Hello"]]), "a.pdf", PDF_CONTENT_TYPE))
        .await;

    assert_eq!(response.status_code(), 401);
}

#[tokio::test]
async fn test_extract_text_from_pdf() {
    let app = setup_test_app().await;
    let user = test_user();

    let pdf = create_test_pdf(&[&["Hello"], &["World"]]);
    let response = app
        .client()
        .post(&api_path("/extract-text"))
        .add_header("Authorization", user.bearer())
        .multipart(file_form(pdf, "hello.pdf", PDF_CONTENT_TYPE))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["extractedText"], "Hello World");
}

#[tokio::test]
async fn test_extract_text_from_docx() {
    let app = setup_test_app().await;
    let user = test_user();

    let docx = create_test_docx(&["Quarterly report", "All good"]);
    let response = app
        .client()
        .post(&api_path("/extract-text"))
        .add_header("Authorization", user.bearer())
        .multipart(file_form(docx, "Report.DOCX", DOCX_CONTENT_TYPE))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["extractedText"], "Quarterly report\n\nAll good\n\n");
}

#[tokio::test]
async fn test_extract_text_pdf_without_text_is_empty_success() {
    let app = setup_test_app().await;
    let user = test_user();

    let response = app
        .client()
        .post(&api_path("/extract-text"))
        .add_header("Authorization", user.bearer())
        .multipart(file_form(create_test_pdf(&[&[]]), "scan.pdf", PDF_CONTENT_TYPE))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["extractedText"], "");
}

#[tokio::test]
async fn test_extract_text_unsupported_type() {
    let app = setup_test_app().await;
    let user = test_user();

    let response = app
        .client()
        .post(&api_path("/extract-text"))
        .add_header("Authorization", user.bearer())
        .multipart(file_form(b"hello".to_vec(), "notes.txt", "text/plain"))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Unsupported file type: txt");
}

#[tokio::test]
async fn test_extract_text_missing_file_field() {
    let app = setup_test_app().await;
    let user = test_user();

    let form = MultipartForm::new().add_text("comment", "no file here");
    let response = app
        .client()
        .post(&api_path("/extract-text"))
        .add_header("Authorization", user.bearer())
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "No file provided");
}

#[tokio::test]
async fn test_extract_text_corrupt_pdf_is_unprocessable() {
    let app = setup_test_app().await;
    let user = test_user();

    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(b"this is not a pdf at all".to_vec())
            .file_name("broken.pdf")
            .mime_type(PDF_CONTENT_TYPE),
    );
    let response = app
        .client()
        .post(&api_path("/extract-text"))
        .add_header("Authorization", user.bearer())
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), 422);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "DOCUMENT_PARSE_ERROR");
}
