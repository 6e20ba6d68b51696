use crate::common;
use actix_web::{
    http::{header, StatusCode},
    test,
};
use serde_json::{json, Value};

#[actix_web::test]
async fn test_list_snippets_when_empty_expect_empty_page() {
    let fixture = common::initialize().await;
    let app = common::initialize_app(&fixture.db).await;
    let req = test::TestRequest::get().uri("/snippets/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let actual: Value = test::read_body_json(resp).await;
    let expected = json!({"count": 0, "next": null, "previous": null, "results": []});
    assert_eq!(actual, expected);
}

#[actix_web::test]
async fn test_create_snippet_when_authenticated_expect_created_and_owned() {
    let fixture = common::initialize().await;
    let app = common::initialize_app(&fixture.db).await;
    let req = test::TestRequest::post()
        .uri("/snippets/")
        .insert_header(common::as_alice())
        .set_json(json!({"code": "print(1)"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let location = resp
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_owned();
    let body: Value = test::read_body_json(resp).await;

    assert_eq!(body["owner"], "alice");
    assert_eq!(body["code"], "print(1)");
    assert_eq!(body["title"], "");
    assert_eq!(body["linenos"], false);
    assert_eq!(body["language"], "python");
    assert_eq!(body["style"], "friendly");
    assert_eq!(body["url"], location.as_str());
    assert!(location.ends_with("/snippets/1/"));
    assert!(body["highlight"]
        .as_str()
        .unwrap()
        .ends_with("/snippets/1/highlight.html"));
    assert!(body["created"].as_str().is_some());
    let keys: Vec<&String> = body.as_object().unwrap().keys().collect();
    let expected = [
        "url",
        "id",
        "highlight",
        "owner",
        "title",
        "code",
        "linenos",
        "language",
        "style",
        "created",
    ];
    assert_eq!(keys, expected);
}

#[actix_web::test]
async fn test_create_snippet_when_owner_supplied_expect_caller_owns() {
    let fixture = common::initialize().await;
    let app = common::initialize_app(&fixture.db).await;
    let req = test::TestRequest::post()
        .uri("/snippets/")
        .insert_header(common::as_alice())
        .set_json(json!({"code": "x = 1", "owner": "bob"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["owner"], "alice");
}

#[actix_web::test]
async fn test_create_snippet_when_anonymous_expect_unauthorized() {
    let fixture = common::initialize().await;
    let app = common::initialize_app(&fixture.db).await;
    let req = test::TestRequest::post()
        .uri("/snippets/")
        .set_json(json!({"code": "print(1)"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        resp.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Basic realm=\"api\""
    );
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        json!({"detail": "Authentication credentials were not provided."})
    );
}

#[actix_web::test]
async fn test_request_when_wrong_password_expect_unauthorized_even_for_reads() {
    let fixture = common::initialize().await;
    let app = common::initialize_app(&fixture.db).await;
    let req = test::TestRequest::get()
        .uri("/snippets/")
        .insert_header(common::basic_auth(common::ALICE, "wrong"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"detail": "Invalid username/password."}));
}

#[actix_web::test]
async fn test_create_snippet_when_code_missing_expect_field_error() {
    let fixture = common::initialize().await;
    let app = common::initialize_app(&fixture.db).await;
    let req = test::TestRequest::post()
        .uri("/snippets/")
        .insert_header(common::as_alice())
        .set_json(json!({"title": "no code", "language": "cobol-ish"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    let expected = json!({
        "code": ["This field is required."],
        "language": ["\"cobol-ish\" is not a valid choice."]
    });
    assert_eq!(body, expected);
}

#[actix_web::test]
async fn test_create_snippet_when_malformed_json_expect_parse_error() {
    let fixture = common::initialize().await;
    let app = common::initialize_app(&fixture.db).await;
    let req = test::TestRequest::post()
        .uri("/snippets/")
        .insert_header(common::as_alice())
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{\"code\": ")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .starts_with("JSON parse error - "));
}

#[actix_web::test]
async fn test_retrieve_snippet_expect_ok_for_any_caller() {
    let fixture = common::initialize().await;
    let id = common::create_snippet(&fixture.db, Some(fixture.alice), "print(1)").await;
    let app = common::initialize_app(&fixture.db).await;
    let uri = format!("/snippets/{id}/");

    let req = test::TestRequest::get().uri(&uri).to_request();
    let anonymous: Value = test::call_and_read_body_json(&app, req).await;
    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(common::as_bob())
        .to_request();
    let other: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(anonymous["id"], id);
    assert_eq!(anonymous["owner"], "alice");
    assert_eq!(anonymous, other);
}

#[actix_web::test]
async fn test_retrieve_snippet_when_nonexistent_expect_not_found() {
    let fixture = common::initialize().await;
    let app = common::initialize_app(&fixture.db).await;
    for auth in [None, Some(common::as_alice())] {
        let mut req = test::TestRequest::get().uri("/snippets/999/");
        if let Some(auth) = auth {
            req = req.insert_header(auth);
        }
        let resp = test::call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({"detail": "Not found."}));
    }
}

#[actix_web::test]
async fn test_mutate_snippet_when_not_owner_expect_forbidden() {
    let fixture = common::initialize().await;
    let id = common::create_snippet(&fixture.db, Some(fixture.alice), "print(1)").await;
    let app = common::initialize_app(&fixture.db).await;
    let uri = format!("/snippets/{id}/");

    let requests = [
        test::TestRequest::put().set_json(json!({"code": "print(2)"})),
        test::TestRequest::patch().set_json(json!({"title": "mine now"})),
        test::TestRequest::delete(),
    ];
    for req in requests {
        let req = req.uri(&uri).insert_header(common::as_bob()).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(
            body,
            json!({"detail": "You do not have permission to perform this action."})
        );
    }

    let req = test::TestRequest::get().uri(&uri).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["code"], "print(1)");
}

#[actix_web::test]
async fn test_update_snippet_when_anonymous_and_nonexistent_expect_unauthorized() {
    let fixture = common::initialize().await;
    let app = common::initialize_app(&fixture.db).await;
    let req = test::TestRequest::put()
        .uri("/snippets/999/")
        .set_json(json!({"code": "x"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_update_snippet_when_authenticated_and_nonexistent_expect_not_found() {
    let fixture = common::initialize().await;
    let app = common::initialize_app(&fixture.db).await;
    let req = test::TestRequest::put()
        .uri("/snippets/999/")
        .insert_header(common::as_alice())
        .set_json(json!({"code": "x"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_update_snippet_when_unowned_expect_forbidden_for_everyone() {
    let fixture = common::initialize().await;
    let id = common::create_snippet(&fixture.db, None, "orphan").await;
    let app = common::initialize_app(&fixture.db).await;
    let req = test::TestRequest::patch()
        .uri(&format!("/snippets/{id}/"))
        .insert_header(common::as_alice())
        .set_json(json!({"code": "adopted"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::get()
        .uri(&format!("/snippets/{id}/"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["owner"], Value::Null);
}

#[actix_web::test]
async fn test_update_snippet_when_owner_expect_saved_and_highlight_refreshed() {
    let fixture = common::initialize().await;
    let id = common::create_snippet(&fixture.db, Some(fixture.alice), "print(1)").await;
    let app = common::initialize_app(&fixture.db).await;
    let highlight_uri = format!("/snippets/{id}/highlight/");

    let req = test::TestRequest::get().uri(&highlight_uri).to_request();
    let before = test::call_and_read_body(&app, req).await;

    let req = test::TestRequest::put()
        .uri(&format!("/snippets/{id}/"))
        .insert_header(common::as_alice())
        .set_json(json!({"code": "fn main() {}", "language": "rust", "style": "monokai"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "fn main() {}");
    assert_eq!(body["language"], "rust");
    assert_eq!(body["style"], "monokai");
    assert_eq!(body["owner"], "alice");

    let req = test::TestRequest::get().uri(&highlight_uri).to_request();
    let after = test::call_and_read_body(&app, req).await;
    assert_ne!(before, after);
    assert!(String::from_utf8_lossy(&after).contains("main"));
}

#[actix_web::test]
async fn test_update_snippet_when_code_missing_expect_field_error() {
    let fixture = common::initialize().await;
    let id = common::create_snippet(&fixture.db, Some(fixture.alice), "print(1)").await;
    let app = common::initialize_app(&fixture.db).await;
    let req = test::TestRequest::put()
        .uri(&format!("/snippets/{id}/"))
        .insert_header(common::as_alice())
        .set_json(json!({"title": "only a title"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"code": ["This field is required."]}));
}

#[actix_web::test]
async fn test_partial_update_snippet_expect_other_fields_kept() {
    let fixture = common::initialize().await;
    let id = common::create_snippet(&fixture.db, Some(fixture.alice), "print(1)").await;
    let app = common::initialize_app(&fixture.db).await;
    let req = test::TestRequest::patch()
        .uri(&format!("/snippets/{id}/"))
        .insert_header(common::as_alice())
        .set_json(json!({"title": "  Hello  ", "linenos": true}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["title"], "Hello");
    assert_eq!(body["linenos"], true);
    assert_eq!(body["code"], "print(1)");
}

#[actix_web::test]
async fn test_destroy_snippet_when_owner_expect_gone() {
    let fixture = common::initialize().await;
    let id = common::create_snippet(&fixture.db, Some(fixture.alice), "print(1)").await;
    let app = common::initialize_app(&fixture.db).await;
    let uri = format!("/snippets/{id}/");

    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(common::as_alice())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get().uri(&uri).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_highlight_expect_same_html_for_any_caller() {
    let fixture = common::initialize().await;
    let id = common::create_snippet(&fixture.db, Some(fixture.alice), "print('<hi>')").await;
    let app = common::initialize_app(&fixture.db).await;
    let uri = format!("/snippets/{id}/highlight/");

    let req = test::TestRequest::get().uri(&uri).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/html; charset=utf-8"
    );
    let anonymous = test::read_body(resp).await;

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(common::as_bob())
        .to_request();
    let other = test::call_and_read_body(&app, req).await;

    assert_eq!(anonymous, other);
    let html = String::from_utf8_lossy(&anonymous);
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(!html.contains("<hi>"));
}

#[actix_web::test]
async fn test_highlight_when_format_suffix_expect_html_only() {
    let fixture = common::initialize().await;
    let id = common::create_snippet(&fixture.db, Some(fixture.alice), "print(1)").await;
    let app = common::initialize_app(&fixture.db).await;

    let req = test::TestRequest::get()
        .uri(&format!("/snippets/{id}/highlight.html"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/snippets/{id}/highlight.json"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_retrieve_snippet_when_format_suffix_expect_links_suffixed() {
    let fixture = common::initialize().await;
    let id = common::create_snippet(&fixture.db, Some(fixture.alice), "print(1)").await;
    let app = common::initialize_app(&fixture.db).await;

    let req = test::TestRequest::get()
        .uri(&format!("/snippets/{id}.json"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["url"]
        .as_str()
        .unwrap()
        .ends_with(&format!("/snippets/{id}.json")));
    assert!(body["highlight"]
        .as_str()
        .unwrap()
        .ends_with(&format!("/snippets/{id}/highlight.html")));

    let req = test::TestRequest::get()
        .uri(&format!("/snippets/{id}.xml"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri(&format!("/snippets/{id}/?format=xml"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_snippet_list_when_unsupported_verb_expect_method_not_allowed() {
    let fixture = common::initialize().await;
    let app = common::initialize_app(&fixture.db).await;
    let req = test::TestRequest::delete()
        .uri("/snippets/")
        .insert_header(common::as_alice())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"detail": "Method \"DELETE\" not allowed."}));
}

#[actix_web::test]
async fn test_list_snippets_expect_paginated_oldest_first() {
    let fixture = common::initialize().await;
    for index in 0..12 {
        common::create_snippet(&fixture.db, Some(fixture.alice), &format!("print({index})")).await;
    }
    let app = common::initialize_app(&fixture.db).await;

    let req = test::TestRequest::get().uri("/snippets/").to_request();
    let first: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(first["count"], 12);
    assert_eq!(first["results"].as_array().unwrap().len(), 10);
    assert_eq!(first["results"][0]["code"], "print(0)");
    assert_eq!(first["previous"], Value::Null);
    assert!(first["next"]
        .as_str()
        .unwrap()
        .ends_with("/snippets/?page=2"));

    let req = test::TestRequest::get().uri("/snippets/?page=2").to_request();
    let second: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(second["results"].as_array().unwrap().len(), 2);
    assert_eq!(second["results"][1]["code"], "print(11)");
    assert_eq!(second["next"], Value::Null);
    assert!(second["previous"].as_str().unwrap().ends_with("/snippets/"));

    let req = test::TestRequest::get().uri("/snippets/?page=last").to_request();
    let last: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(last, second);
}

#[actix_web::test]
async fn test_list_snippets_when_page_out_of_range_expect_invalid_page() {
    let fixture = common::initialize().await;
    let app = common::initialize_app(&fixture.db).await;
    for page in ["2", "0", "abc"] {
        let req = test::TestRequest::get()
            .uri(&format!("/snippets/?page={page}"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({"detail": "Invalid page."}));
    }
}

#[actix_web::test]
async fn test_list_snippets_when_page_size_configured_expect_respected() {
    let fixture = common::initialize().await;
    for index in 0..3 {
        common::create_snippet(&fixture.db, None, &format!("print({index})")).await;
    }
    let app = common::initialize_app_with_page_size(&fixture.db, 2).await;
    let req = test::TestRequest::get().uri("/snippets/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["count"], 3);
    assert_eq!(body["results"].as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn test_list_snippets_when_page_repeated_expect_last_value_used() {
    let fixture = common::initialize().await;
    for index in 0..3 {
        common::create_snippet(&fixture.db, None, &format!("print({index})")).await;
    }
    let app = common::initialize_app_with_page_size(&fixture.db, 2).await;
    let req = test::TestRequest::get()
        .uri("/snippets/?page=1&page=2&search=ignored")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["results"].as_array().unwrap().len(), 1);
    assert_eq!(body["results"][0]["code"], "print(2)");

    let req = test::TestRequest::get()
        .uri("/snippets/?page=1&page=9")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let content_type = resp.headers().get(header::CONTENT_TYPE).unwrap();
    assert_eq!(content_type, "application/json");
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"detail": "Invalid page."}));
}

#[actix_web::test]
async fn test_options_when_anonymous_expect_allowed_verbs() {
    let fixture = common::initialize().await;
    let id = common::create_snippet(&fixture.db, Some(fixture.alice), "a").await;
    let app = common::initialize_app(&fixture.db).await;

    let req = test::TestRequest::default()
        .method(actix_web::http::Method::OPTIONS)
        .uri("/snippets/")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let allow = resp.headers().get(header::ALLOW).unwrap();
    assert_eq!(allow, "GET, POST, HEAD, OPTIONS");
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["name"], "Snippet List");
    assert_eq!(body["parses"], json!(["application/json"]));

    let req = test::TestRequest::default()
        .method(actix_web::http::Method::OPTIONS)
        .uri(&format!("/snippets/{id}/highlight.html"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let allow = resp.headers().get(header::ALLOW).unwrap();
    assert_eq!(allow, "GET, HEAD, OPTIONS");
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["renders"], json!(["text/html"]));
}

#[actix_web::test]
async fn test_options_when_wrong_password_expect_unauthorized() {
    let fixture = common::initialize().await;
    let app = common::initialize_app(&fixture.db).await;
    let req = test::TestRequest::default()
        .method(actix_web::http::Method::OPTIONS)
        .uri("/snippets/")
        .insert_header(common::basic_auth(common::ALICE, "wrong"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
