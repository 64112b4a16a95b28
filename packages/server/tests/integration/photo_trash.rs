use serde_json::json;

use crate::common::{TestApp, routes};

mod stage_photo {
    use super::*;

    #[tokio::test]
    async fn staged_photo_leaves_active_views() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("trash_stage", "password123").await;
        let case_id = app.create_case(&token, "Staged").await;
        let log_id = app.create_log(&case_id, &token).await;
        let photo_id = app.upload_log_photo(&log_id, &token).await;

        let res = app
            .post_with_token(&routes::photo_trash(&photo_id), &json!({}), &token)
            .await;
        assert_eq!(res.status, 204);

        let log = app.get_with_token(&routes::log(&log_id), &token).await;
        assert_eq!(log.body["photos"].as_array().unwrap().len(), 0);

        let case = app.get_with_token(&routes::case(&case_id), &token).await;
        assert_eq!(
            case.body["logs"][0]["photos"].as_array().unwrap().len(),
            0,
            "case detail hides staged photos too"
        );

        let trash = app.get_with_token(&routes::log_trash(&log_id), &token).await;
        let staged = trash.body["photos"].as_array().unwrap();
        assert_eq!(staged.len(), 1);
        assert_eq!(staged[0]["id"], photo_id.as_str());
        assert_eq!(staged[0]["original_filename"], "site.jpg");
        assert!(staged[0]["trashed_at"].is_string());
    }

    #[tokio::test]
    async fn unknown_photo_is_not_found() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("trash_unknown", "password123").await;

        let res = app
            .post_with_token(
                &routes::photo_trash("00000000-0000-0000-0000-000000000000"),
                &json!({}),
                &token,
            )
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["error"], "Photo not found");
    }

    #[tokio::test]
    async fn cannot_stage_someone_elses_photo() {
        let app = TestApp::spawn().await;
        let token_a = app.create_authenticated_user("trash_owner", "password123").await;
        let token_b = app.create_authenticated_user("trash_intruder", "password123").await;
        let case_id = app.create_case(&token_a, "Guarded").await;
        let log_id = app.create_log(&case_id, &token_a).await;
        let photo_id = app.upload_log_photo(&log_id, &token_a).await;

        let res = app
            .post_with_token(&routes::photo_trash(&photo_id), &json!({}), &token_b)
            .await;

        assert_eq!(res.status, 404);
    }
}

mod restore_photo {
    use super::*;

    #[tokio::test]
    async fn restored_photo_returns_to_active_views() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("trash_restore", "password123").await;
        let case_id = app.create_case(&token, "Recovered").await;
        let log_id = app.create_log(&case_id, &token).await;
        let photo_id = app.upload_log_photo(&log_id, &token).await;
        app.post_with_token(&routes::photo_trash(&photo_id), &json!({}), &token)
            .await;

        let res = app
            .post_with_token(&routes::photo_restore(&photo_id), &json!({}), &token)
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["id"], photo_id.as_str());

        let log = app.get_with_token(&routes::log(&log_id), &token).await;
        assert_eq!(log.body["photos"].as_array().unwrap().len(), 1);

        let trash = app.get_with_token(&routes::log_trash(&log_id), &token).await;
        assert_eq!(trash.body["photos"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn restoring_an_unstaged_photo_is_not_found() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("trash_active", "password123").await;
        let case_id = app.create_case(&token, "Active").await;
        let log_id = app.create_log(&case_id, &token).await;
        let photo_id = app.upload_log_photo(&log_id, &token).await;

        let res = app
            .post_with_token(&routes::photo_restore(&photo_id), &json!({}), &token)
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["error"], "Photo not found");
    }
}

mod empty_trash {
    use super::*;

    #[tokio::test]
    async fn destroys_staged_blobs_and_rows() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("trash_empty", "password123").await;
        let case_id = app.create_case(&token, "Purged").await;
        let log_id = app.create_log(&case_id, &token).await;
        let first = app.upload_log_photo(&log_id, &token).await;
        let second = app.upload_log_photo(&log_id, &token).await;
        app.post_with_token(&routes::photo_trash(&first), &json!({}), &token)
            .await;
        app.post_with_token(&routes::photo_trash(&second), &json!({}), &token)
            .await;

        let res = app.delete_with_token(&routes::log_trash(&log_id), &token).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["purged"], 2);

        for photo_id in [&first, &second] {
            let download = app
                .download_with_token(&routes::photo_download(photo_id), &token)
                .await;
            assert_eq!(download.status, 404, "purged photo must be gone for good");
        }

        let log = app.get_with_token(&routes::log(&log_id), &token).await;
        assert_eq!(log.body["photos"].as_array().unwrap().len(), 0);
        let trash = app.get_with_token(&routes::log_trash(&log_id), &token).await;
        assert_eq!(trash.body["photos"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn leaves_unstaged_photos_alone() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("trash_partial", "password123").await;
        let case_id = app.create_case(&token, "Partial").await;
        let log_id = app.create_log(&case_id, &token).await;
        let staged = app.upload_log_photo(&log_id, &token).await;
        let kept = app.upload_log_photo(&log_id, &token).await;
        app.post_with_token(&routes::photo_trash(&staged), &json!({}), &token)
            .await;

        let res = app.delete_with_token(&routes::log_trash(&log_id), &token).await;
        assert_eq!(res.body["purged"], 1);

        let log = app.get_with_token(&routes::log(&log_id), &token).await;
        let photos = log.body["photos"].as_array().unwrap();
        assert_eq!(photos.len(), 1);
        assert_eq!(photos[0]["id"], kept.as_str());
    }

    #[tokio::test]
    async fn empty_trash_with_nothing_staged_purges_zero() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("trash_zero", "password123").await;
        let case_id = app.create_case(&token, "Quiet").await;
        let log_id = app.create_log(&case_id, &token).await;

        let res = app.delete_with_token(&routes::log_trash(&log_id), &token).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["purged"], 0);
    }
}

mod eviction {
    use super::*;

    #[tokio::test]
    async fn direct_delete_evicts_the_staged_entry() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("trash_evict", "password123").await;
        let case_id = app.create_case(&token, "Evicted").await;
        let log_id = app.create_log(&case_id, &token).await;
        let photo_id = app.upload_log_photo(&log_id, &token).await;
        app.post_with_token(&routes::photo_trash(&photo_id), &json!({}), &token)
            .await;

        let res = app.delete_with_token(&routes::photo(&photo_id), &token).await;
        assert_eq!(res.status, 204);

        let trash = app.get_with_token(&routes::log_trash(&log_id), &token).await;
        assert_eq!(trash.body["photos"].as_array().unwrap().len(), 0);

        let restore = app
            .post_with_token(&routes::photo_restore(&photo_id), &json!({}), &token)
            .await;
        assert_eq!(restore.status, 404);
    }

    #[tokio::test]
    async fn deleting_the_log_evicts_its_staged_entries() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("trash_logdel", "password123").await;
        let case_id = app.create_case(&token, "Collapsed").await;
        let log_id = app.create_log(&case_id, &token).await;
        let photo_id = app.upload_log_photo(&log_id, &token).await;
        app.post_with_token(&routes::photo_trash(&photo_id), &json!({}), &token)
            .await;

        let res = app.delete_with_token(&routes::log(&log_id), &token).await;
        assert_eq!(res.status, 204);

        let restore = app
            .post_with_token(&routes::photo_restore(&photo_id), &json!({}), &token)
            .await;
        assert_eq!(restore.status, 404);
    }
}
