use serde_json::json;

use crate::common::{TestApp, routes};

mod create_showing {
    use super::*;

    #[tokio::test]
    async fn creates_showing_with_public_link() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("agent_create", "password123").await;

        let res = app
            .post_with_token(
                routes::SHOWINGS,
                &json!({
                    "buyer_name": "Jordan Blake",
                    "buyer_phone": "+14155551234",
                    "buyer_email": "jordan@example.com",
                    "address": "123 Main St",
                    "city": "San Francisco",
                    "state": "CA",
                    "zip": "94105",
                    "showing_datetime": "2025-06-01T14:30:00Z"
                }),
                &token,
            )
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["showing"]["buyer_name"], "Jordan Blake");
        assert_eq!(res.body["showing"]["address"], "123 Main St");
        assert!(res.body["showing"]["feedback_status"].is_null());

        let public_token = res.body["showing"]["public_token"]
            .as_str()
            .unwrap()
            .to_string();
        let public_url = res.body["public_url"].as_str().unwrap();
        assert_eq!(
            public_url,
            format!("http://testserver/r/{public_token}"),
            "public link must point at the buyer-facing route"
        );
    }

    #[tokio::test]
    async fn normalizes_state_to_uppercase() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("agent_state", "password123").await;

        let res = app
            .post_with_token(
                routes::SHOWINGS,
                &json!({
                    "buyer_name": "Jordan Blake",
                    "buyer_phone": "+14155551234",
                    "address": "123 Main St",
                    "city": "San Francisco",
                    "state": "ca",
                    "zip": "94105",
                    "showing_datetime": "2025-06-01T14:30:00Z"
                }),
                &token,
            )
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["showing"]["state"], "CA");
    }

    #[tokio::test]
    async fn accepts_naive_datetime() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("agent_naive", "password123").await;

        let res = app
            .post_with_token(
                routes::SHOWINGS,
                &json!({
                    "buyer_name": "Jordan Blake",
                    "buyer_phone": "+14155551234",
                    "address": "123 Main St",
                    "city": "San Francisco",
                    "state": "CA",
                    "zip": "94105",
                    "showing_datetime": "2025-06-01T14:30"
                }),
                &token,
            )
            .await;

        assert_eq!(res.status, 201);
    }

    #[tokio::test]
    async fn rejects_invalid_phone() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("agent_phone", "password123").await;

        let res = app
            .post_with_token(
                routes::SHOWINGS,
                &json!({
                    "buyer_name": "Jordan Blake",
                    "buyer_phone": "not-a-phone",
                    "address": "123 Main St",
                    "city": "San Francisco",
                    "state": "CA",
                    "zip": "94105",
                    "showing_datetime": "2025-06-01T14:30:00Z"
                }),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn rejects_invalid_state_and_zip() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("agent_zip", "password123").await;

        for (state, zip) in [("California", "94105"), ("CA", "9410"), ("C1", "94105")] {
            let res = app
                .post_with_token(
                    routes::SHOWINGS,
                    &json!({
                        "buyer_name": "Jordan Blake",
                        "buyer_phone": "+14155551234",
                        "address": "123 Main St",
                        "city": "San Francisco",
                        "state": state,
                        "zip": zip,
                        "showing_datetime": "2025-06-01T14:30:00Z"
                    }),
                    &token,
                )
                .await;

            assert_eq!(res.status, 400, "state={state} zip={zip}");
            assert_eq!(res.body["code"], "VALIDATION_ERROR");
        }
    }

    #[tokio::test]
    async fn rejects_unparseable_datetime() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("agent_dt", "password123").await;

        let res = app
            .post_with_token(
                routes::SHOWINGS,
                &json!({
                    "buyer_name": "Jordan Blake",
                    "buyer_phone": "+14155551234",
                    "address": "123 Main St",
                    "city": "San Francisco",
                    "state": "CA",
                    "zip": "94105",
                    "showing_datetime": "June 1st at 2:30pm"
                }),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn rejects_missing_fields() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("agent_missing", "password123").await;

        let res = app
            .post_with_token(routes::SHOWINGS, &json!({"buyer_name": "Jordan"}), &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn requires_authentication() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(routes::SHOWINGS, &json!({"buyer_name": "Jordan"}))
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }
}

mod list_showings {
    use super::*;

    #[tokio::test]
    async fn returns_own_showings_newest_first() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("agent_list", "password123").await;

        let (first_id, _) = app.create_showing(&token).await;
        let (second_id, _) = app.create_showing(&token).await;

        let res = app.get_with_token(routes::SHOWINGS, &token).await;

        assert_eq!(res.status, 200);
        let items = res.body.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["id"], second_id.as_str());
        assert_eq!(items[1]["id"], first_id.as_str());
        assert_eq!(items[0]["photo_count"], 0);
    }

    #[tokio::test]
    async fn does_not_leak_other_agents_showings() {
        let app = TestApp::spawn().await;
        let token_a = app.create_authenticated_user("agent_a", "password123").await;
        let token_b = app.create_authenticated_user("agent_b", "password123").await;

        app.create_showing(&token_a).await;

        let res = app.get_with_token(routes::SHOWINGS, &token_b).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body.as_array().unwrap().len(), 0);
    }
}

mod get_showing {
    use super::*;

    #[tokio::test]
    async fn returns_showing_with_empty_photo_list() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("agent_get", "password123").await;
        let (id, _) = app.create_showing(&token).await;

        let res = app.get_with_token(&routes::showing(&id), &token).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["showing"]["id"], id.as_str());
        assert_eq!(res.body["photos"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn includes_uploaded_photos_with_viewing_urls() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("agent_photos", "password123").await;
        let (id, public_token) = app.create_showing(&token).await;

        let upload = app
            .upload_without_token(
                &routes::public_photos(&public_token),
                vec![("kitchen.jpg", b"fake-jpeg-bytes".to_vec(), "image/jpeg")],
            )
            .await;
        assert_eq!(upload.status, 201);

        let res = app.get_with_token(&routes::showing(&id), &token).await;

        assert_eq!(res.status, 200);
        let photos = res.body["photos"].as_array().unwrap();
        assert_eq!(photos.len(), 1);
        assert_eq!(photos[0]["original_name"], "kitchen.jpg");
        assert!(photos[0]["url"].is_string());
    }

    #[tokio::test]
    async fn hides_other_agents_showing() {
        let app = TestApp::spawn().await;
        let token_a = app.create_authenticated_user("agent_owner", "password123").await;
        let token_b = app.create_authenticated_user("agent_intruder", "password123").await;
        let (id, _) = app.create_showing(&token_a).await;

        let res = app.get_with_token(&routes::showing(&id), &token_b).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
        assert_eq!(res.body["error"], "Showing not found or access denied");
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("agent_unknown", "password123").await;

        let res = app
            .get_with_token(
                &routes::showing("00000000-0000-0000-0000-000000000000"),
                &token,
            )
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}
