use serde_json::json;

use crate::common::{TestApp, routes};

mod create_log {
    use super::*;

    #[tokio::test]
    async fn creates_log_on_case() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("log_create", "password123").await;
        let case_id = app.create_case(&token, "Furnace swap").await;

        let res = app
            .post_with_token(
                &routes::case_logs(&case_id),
                &json!({"log_type": "Issue", "note": "  Igniter fails intermittently  "}),
                &token,
            )
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["case_id"], case_id.as_str());
        assert_eq!(res.body["log_type"], "Issue");
        assert_eq!(res.body["note"], "Igniter fails intermittently");
        assert!(res.body["id"].is_string());
    }

    #[tokio::test]
    async fn rejects_log_type_outside_compose_list() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("log_type", "password123").await;
        let case_id = app.create_case(&token, "Typed").await;

        let res = app
            .post_with_token(
                &routes::case_logs(&case_id),
                &json!({"log_type": "Invoice", "note": "Billing follow-up"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert_eq!(
            res.body["error"],
            "Invalid log type 'Invoice'. Allowed: Before, During, After, Issue, Resolution, Call, Visit, General"
        );
    }

    #[tokio::test]
    async fn rejects_note_over_2000_characters() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("log_note", "password123").await;
        let case_id = app.create_case(&token, "Wordy").await;

        let res = app
            .post_with_token(
                &routes::case_logs(&case_id),
                &json!({"log_type": "General", "note": "x".repeat(2001)}),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["error"], "Note must be at most 2000 characters");
    }

    #[tokio::test]
    async fn unknown_case_is_not_found() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("log_nocase", "password123").await;

        let res = app
            .post_with_token(
                &routes::case_logs("00000000-0000-0000-0000-000000000000"),
                &json!({"log_type": "Issue", "note": "Orphan"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["error"], "Case not found");
    }

    #[tokio::test]
    async fn cannot_log_on_someone_elses_case() {
        let app = TestApp::spawn().await;
        let token_a = app.create_authenticated_user("log_owner", "password123").await;
        let token_b = app.create_authenticated_user("log_intruder", "password123").await;
        let case_id = app.create_case(&token_a, "Theirs").await;

        let res = app
            .post_with_token(
                &routes::case_logs(&case_id),
                &json!({"log_type": "Issue", "note": "Sneaky"}),
                &token_b,
            )
            .await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn logging_bumps_the_case_to_the_top() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("log_bump", "password123").await;
        let first = app.create_case(&token, "Stale").await;
        let _second = app.create_case(&token, "Fresh").await;

        app.create_log(&first, &token).await;

        let res = app.get_with_token(routes::CASES, &token).await;
        let data = res.body["data"].as_array().unwrap();
        assert_eq!(data[0]["id"], first.as_str());
    }
}

mod log_detail {
    use super::*;

    #[tokio::test]
    async fn carries_case_header_and_photos() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("log_detail", "password123").await;

        let create = app
            .post_with_token(
                routes::CASES,
                &json!({"title": "Water heater", "client_name": "Ramona Vega"}),
                &token,
            )
            .await;
        let case_id = create.id();
        let log_id = app.create_log(&case_id, &token).await;
        app.upload_log_photo(&log_id, &token).await;

        let res = app.get_with_token(&routes::log(&log_id), &token).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["id"], log_id.as_str());
        assert_eq!(res.body["case"]["title"], "Water heater");
        assert_eq!(res.body["case"]["client_name"], "Ramona Vega");
        assert_eq!(res.body["orphaned_count"], 0);

        let photos = res.body["photos"].as_array().unwrap();
        assert_eq!(photos.len(), 1);
        assert_eq!(photos[0]["original_filename"], "site.jpg");
        assert!(photos[0]["url"].is_string(), "photo carries a viewing URL");
    }

    #[tokio::test]
    async fn unknown_log_is_not_found() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("log_missing", "password123").await;

        let res = app
            .get_with_token(&routes::log("00000000-0000-0000-0000-000000000000"), &token)
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["error"], "Log not found");
    }

    #[tokio::test]
    async fn hides_other_owners_log() {
        let app = TestApp::spawn().await;
        let token_a = app.create_authenticated_user("log_mine", "password123").await;
        let token_b = app.create_authenticated_user("log_theirs", "password123").await;
        let case_id = app.create_case(&token_a, "Mine").await;
        let log_id = app.create_log(&case_id, &token_a).await;

        let res = app.get_with_token(&routes::log(&log_id), &token_b).await;

        assert_eq!(res.status, 404);
    }
}

mod update_log {
    use super::*;

    #[tokio::test]
    async fn updates_note_and_type() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("log_update", "password123").await;
        let case_id = app.create_case(&token, "Editable").await;
        let log_id = app.create_log(&case_id, &token).await;

        let res = app
            .patch_with_token(
                &routes::log(&log_id),
                &json!({"log_type": "Resolution", "note": "Joint resealed and tested"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["log_type"], "Resolution");
        assert_eq!(res.body["note"], "Joint resealed and tested");
    }

    #[tokio::test]
    async fn invoice_type_is_only_available_when_editing() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("log_invoice", "password123").await;
        let case_id = app.create_case(&token, "Billable").await;
        let log_id = app.create_log(&case_id, &token).await;

        let res = app
            .patch_with_token(&routes::log(&log_id), &json!({"log_type": "Invoice"}), &token)
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["log_type"], "Invoice");
    }

    #[tokio::test]
    async fn general_type_is_rejected_when_editing() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("log_general", "password123").await;
        let case_id = app.create_case(&token, "Locked").await;
        let log_id = app.create_log(&case_id, &token).await;

        let res = app
            .patch_with_token(&routes::log(&log_id), &json!({"log_type": "General"}), &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(
            res.body["error"],
            "Invalid log type 'General'. Allowed: Before, During, After, Issue, Resolution, Call, Visit, Invoice"
        );
    }

    #[tokio::test]
    async fn empty_patch_is_a_no_op() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("log_noop", "password123").await;
        let case_id = app.create_case(&token, "Static").await;
        let log_id = app.create_log(&case_id, &token).await;

        let res = app
            .patch_with_token(&routes::log(&log_id), &json!({}), &token)
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["log_type"], "Issue");
        assert_eq!(res.body["note"], "Pipe joint leaking behind the north wall");
    }
}

mod delete_log {
    use super::*;

    #[tokio::test]
    async fn removes_log_and_its_photos() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("log_delete", "password123").await;
        let case_id = app.create_case(&token, "Shrinking").await;
        let log_id = app.create_log(&case_id, &token).await;
        let photo_id = app.upload_log_photo(&log_id, &token).await;

        let res = app.delete_with_token(&routes::log(&log_id), &token).await;
        assert_eq!(res.status, 204);

        let log = app.get_with_token(&routes::log(&log_id), &token).await;
        assert_eq!(log.status, 404);

        // Cascade removed the photo row too.
        let download = app
            .download_with_token(&routes::photo_download(&photo_id), &token)
            .await;
        assert_eq!(download.status, 404);

        let detail = app.get_with_token(&routes::case(&case_id), &token).await;
        assert_eq!(detail.body["logs"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn deleting_twice_is_not_found() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("log_twice", "password123").await;
        let case_id = app.create_case(&token, "Once").await;
        let log_id = app.create_log(&case_id, &token).await;

        app.delete_with_token(&routes::log(&log_id), &token).await;
        let res = app.delete_with_token(&routes::log(&log_id), &token).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["error"], "Log not found");
    }
}

mod search_logs {
    use super::*;

    #[tokio::test]
    async fn matches_note_text() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("search_note", "password123").await;
        let case_id = app.create_case(&token, "Plumbing").await;
        app.post_with_token(
            &routes::case_logs(&case_id),
            &json!({"log_type": "Issue", "note": "Leaking pipe joint"}),
            &token,
        )
        .await;
        app.post_with_token(
            &routes::case_logs(&case_id),
            &json!({"log_type": "Call", "note": "Scheduled the inspection"}),
            &token,
        )
        .await;

        let res = app
            .get_with_token(&format!("{}?q=leaking", routes::LOGS_SEARCH), &token)
            .await;

        assert_eq!(res.status, 200);
        let hits = res.body.as_array().unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0]["note"], "Leaking pipe joint");
        assert_eq!(hits[0]["case"]["title"], "Plumbing");
    }

    #[tokio::test]
    async fn filters_by_case_and_type() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("search_filter", "password123").await;
        let case_a = app.create_case(&token, "Case A").await;
        let case_b = app.create_case(&token, "Case B").await;
        app.create_log(&case_a, &token).await;
        app.create_log(&case_b, &token).await;
        app.post_with_token(
            &routes::case_logs(&case_b),
            &json!({"log_type": "Visit", "note": "Walked the site"}),
            &token,
        )
        .await;

        let res = app
            .get_with_token(
                &format!("{}?case_id={case_b}", routes::LOGS_SEARCH),
                &token,
            )
            .await;
        assert_eq!(res.body.as_array().unwrap().len(), 2);

        let res = app
            .get_with_token(
                &format!("{}?case_id={case_b}&log_type=Visit", routes::LOGS_SEARCH),
                &token,
            )
            .await;
        let hits = res.body.as_array().unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0]["log_type"], "Visit");
    }

    #[tokio::test]
    async fn skips_logs_of_trashed_cases() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("search_trash", "password123").await;
        let case_id = app.create_case(&token, "Condemned").await;
        app.create_log(&case_id, &token).await;
        app.delete_with_token(&routes::case(&case_id), &token).await;

        let res = app
            .get_with_token(&format!("{}?q=pipe", routes::LOGS_SEARCH), &token)
            .await;

        assert_eq!(res.body.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn carries_photo_counts() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("search_count", "password123").await;
        let case_id = app.create_case(&token, "Counted").await;
        let log_id = app.create_log(&case_id, &token).await;
        app.upload_log_photo(&log_id, &token).await;

        let res = app.get_with_token(routes::LOGS_SEARCH, &token).await;

        let hits = res.body.as_array().unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0]["photo_count"], 1);
    }
}
