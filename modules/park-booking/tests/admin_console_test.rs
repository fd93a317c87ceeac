//! Admin console pages driven against the in-memory API.

use std::sync::Arc;

use park_api_client::{ApiError, ReservationApi, ReservationStatus};
use park_booking::admin::{AdminConsole, RowAction};
use park_booking::booking::PublicBookingController;
use park_booking::form::FormMode;
use park_booking::presentation::{MessageKind, OTHER_PARK};
use park_booking::testing::{reservation, Failure, MockApi, RecordingHost};
use park_booking::Config;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn console(api: &Arc<MockApi>, host: &Arc<RecordingHost>) -> AdminConsole {
    AdminConsole::new(api.clone(), host.clone(), Config::immediate())
}

fn seeded() -> Arc<MockApi> {
    Arc::new(
        MockApi::new()
            .with_park("中央公園")
            .with_park("北公園")
            .with_reservation(reservation(1, "中央公園", ReservationStatus::Pending))
            .with_reservation(reservation(2, "中央公園", ReservationStatus::Approved))
            .with_reservation(reservation(3, "北公園", ReservationStatus::Rejected))
            .with_reservation(reservation(4, "北公園", ReservationStatus::CancelledByAdmin)),
    )
}

// ---------------------------------------------------------------------------
// Login / logout
// ---------------------------------------------------------------------------

#[tokio::test]
async fn login_goes_to_next_or_dashboard() {
    let api = Arc::new(MockApi::new().with_admin("admin", "secret"));
    let host = Arc::new(RecordingHost::new());
    let console = console(&api, &host);

    let mut page = console.login_page();
    page.username = "admin".into();
    page.password = "secret".into();
    page.submit("/admin/login?next=/admin/reservations/7/edit").await;
    assert_eq!(page.message().text(), "ログイン成功");
    assert_eq!(
        host.last_navigation().as_deref(),
        Some("/admin/reservations/7/edit")
    );

    page.submit("/admin/login").await;
    assert_eq!(host.last_navigation().as_deref(), Some("/admin/dashboard"));
}

#[tokio::test]
async fn login_failure_stays_on_page() {
    let api = Arc::new(MockApi::new().with_admin("admin", "secret"));
    let host = Arc::new(RecordingHost::new());
    let mut page = console(&api, &host).login_page();
    page.username = "admin".into();
    page.password = "wrong".into();

    page.submit("/admin/login").await;
    assert_eq!(page.message().kind(), Some(MessageKind::Error));
    assert_eq!(
        page.message().text(),
        "ユーザー名またはパスワードが間違っています"
    );

    api.fail_on("login", Failure::Network);
    page.submit("/admin/login").await;
    assert_eq!(page.message().text(), "ログイン処理中にエラーが発生しました。");
    assert!(host.navigations().is_empty());
}

#[tokio::test]
async fn logout_navigates_to_login_or_alerts() {
    let api = Arc::new(MockApi::new());
    let host = Arc::new(RecordingHost::new());
    let dashboard = console(&api, &host).dashboard();

    dashboard.logout().await;
    assert_eq!(host.navigations(), vec!["/admin/login".to_string()]);

    api.fail_on(
        "logout",
        Failure::Rejected {
            status: 500,
            message: None,
            error: None,
        },
    );
    dashboard.logout().await;
    assert_eq!(host.alerts(), vec!["ログアウトに失敗しました。".to_string()]);
}

// ---------------------------------------------------------------------------
// Reservations table
// ---------------------------------------------------------------------------

#[tokio::test]
async fn row_actions_follow_status() {
    let api = seeded();
    let host = Arc::new(RecordingHost::new());
    let mut dashboard = console(&api, &host).dashboard();
    dashboard.load().await;

    let rows = dashboard.reservations.body().rows();
    assert_eq!(rows.len(), 4);
    let actions = |id: i64| {
        rows.iter()
            .find(|r| r.id == id)
            .map(|r| r.actions.clone())
            .unwrap()
    };
    assert_eq!(
        actions(1),
        vec![
            RowAction::Approve,
            RowAction::Reject,
            RowAction::Edit,
            RowAction::Delete
        ]
    );
    assert_eq!(
        actions(2),
        vec![
            RowAction::CancelByUser,
            RowAction::CancelByAdmin,
            RowAction::Edit,
            RowAction::Delete
        ]
    );
    assert_eq!(actions(3), vec![RowAction::Edit, RowAction::Delete]);
    assert_eq!(actions(4), vec![RowAction::Edit, RowAction::Delete]);

    let first = &rows[0];
    assert_eq!(first.cells[2], "中央公園");
    assert_eq!(first.cells[3], "2024/06/01 09:00");
    assert_eq!(first.cells[8], "pending");
}

#[tokio::test]
async fn approving_confirms_then_reloads() {
    let api = seeded();
    let host = Arc::new(RecordingHost::new());
    let mut dashboard = console(&api, &host).dashboard();
    dashboard.load().await;

    dashboard
        .reservations
        .activate(1, RowAction::Approve)
        .await;

    assert_eq!(
        host.confirms(),
        vec!["予約ID 1 のステータスを「approved」に変更しますか？".to_string()]
    );
    assert_eq!(
        host.alerts(),
        vec!["予約ID 1 のステータスを更新しました。".to_string()]
    );
    assert_eq!(api.stored(1).unwrap().status, ReservationStatus::Approved);
    assert_eq!(api.call_count("list_reservations"), 2);
    let row = &dashboard.reservations.body().rows()[0];
    assert_eq!(row.actions[0], RowAction::CancelByUser);
}

#[tokio::test]
async fn declined_confirm_does_nothing() {
    let api = seeded();
    let host = Arc::new(RecordingHost::declining());
    let mut dashboard = console(&api, &host).dashboard();

    dashboard.reservations.activate(2, RowAction::CancelByAdmin).await;
    dashboard.reservations.activate(2, RowAction::Delete).await;

    assert_eq!(host.confirms().len(), 2);
    assert_eq!(api.call_count("update_status"), 0);
    assert_eq!(api.call_count("delete_reservation"), 0);
    assert_eq!(api.stored(2).unwrap().status, ReservationStatus::Approved);
}

#[tokio::test]
async fn deleting_reservation_alerts_and_reloads() {
    let api = seeded();
    let host = Arc::new(RecordingHost::new());
    let mut dashboard = console(&api, &host).dashboard();

    dashboard.reservations.activate(3, RowAction::Delete).await;

    assert_eq!(
        host.confirms(),
        vec!["予約ID 3 を本当に削除しますか？この操作は元に戻せません。".to_string()]
    );
    assert_eq!(
        host.alerts(),
        vec!["Reservation deleted successfully".to_string()]
    );
    assert_eq!(dashboard.reservations.body().rows().len(), 3);
}

#[tokio::test]
async fn status_failure_alerts_server_message() {
    let api = seeded();
    let host = Arc::new(RecordingHost::new());
    let mut dashboard = console(&api, &host).dashboard();

    dashboard
        .reservations
        .update_status(99, ReservationStatus::Approved)
        .await;
    api.fail_on("update_status", Failure::Network);
    dashboard
        .reservations
        .update_status(1, ReservationStatus::Approved)
        .await;

    assert_eq!(
        host.alerts(),
        vec![
            "予約が見つかりません".to_string(),
            "ステータス更新処理中にエラーが発生しました。".to_string()
        ]
    );
}

#[tokio::test]
async fn edit_action_navigates_to_editor() {
    let api = seeded();
    let host = Arc::new(RecordingHost::new());
    let mut dashboard = console(&api, &host).dashboard();

    dashboard.reservations.activate(4, RowAction::Edit).await;

    assert!(host.confirms().is_empty());
    assert_eq!(
        host.navigations(),
        vec!["/admin/reservations/4/edit".to_string()]
    );
}

#[tokio::test]
async fn empty_and_failed_loads_show_notices() {
    let api = Arc::new(MockApi::new());
    let host = Arc::new(RecordingHost::new());
    let mut dashboard = console(&api, &host).dashboard();

    dashboard.load().await;
    assert_eq!(
        dashboard.reservations.body().notice(),
        Some("現在、予約はありません。")
    );
    assert_eq!(
        dashboard.parks.body().notice(),
        Some("登録されている公園はありません。")
    );

    api.fail_on(
        "list_reservations",
        Failure::Rejected {
            status: 500,
            message: Some("boom".into()),
            error: None,
        },
    );
    dashboard.reservations.load().await;
    assert_eq!(
        dashboard.reservations.body().notice(),
        Some("予約の読み込み中にエラーが発生しました: Failed to load reservations: 500")
    );
}

#[tokio::test]
async fn expired_session_redirects_to_login() {
    let api = seeded();
    api.fail_on(
        "list_reservations",
        Failure::Unauthorized {
            redirect_url: Some("/admin/login?next=/admin/dashboard".into()),
        },
    );
    let host = Arc::new(RecordingHost::new());
    let mut dashboard = console(&api, &host).dashboard();

    dashboard.reservations.load().await;

    assert_eq!(
        host.navigations(),
        vec!["/admin/login?next=/admin/dashboard".to_string()]
    );
    assert!(dashboard.reservations.body().rows().is_empty());
}

#[tokio::test]
async fn expired_session_without_redirect_leaves_table_alone() {
    let api = seeded();
    let host = Arc::new(RecordingHost::new());
    let mut dashboard = console(&api, &host).dashboard();
    dashboard.reservations.load().await;
    assert_eq!(dashboard.reservations.body().rows().len(), 4);

    api.fail_on(
        "list_reservations",
        Failure::Unauthorized { redirect_url: None },
    );
    dashboard.reservations.load().await;

    assert!(host.navigations().is_empty());
    assert_eq!(dashboard.reservations.body().rows().len(), 4);
    assert_eq!(dashboard.reservations.body().notice(), None);
}

#[tokio::test]
async fn expired_session_on_row_actions_alerts_instead_of_leaving() {
    let api = seeded();
    let expired = || Failure::Unauthorized {
        redirect_url: Some("/admin/login".into()),
    };
    api.fail_on("update_status", expired());
    api.fail_on("delete_reservation", expired());
    let host = Arc::new(RecordingHost::new());
    let mut dashboard = console(&api, &host).dashboard();

    dashboard
        .reservations
        .update_status(1, ReservationStatus::Approved)
        .await;
    dashboard.reservations.delete(1).await;

    assert!(host.navigations().is_empty());
    assert_eq!(
        host.alerts(),
        vec![
            "ステータスの更新に失敗しました。".to_string(),
            "ログインが必要です。".to_string()
        ]
    );
    assert!(api.stored(1).is_some());
}

#[tokio::test]
async fn delete_failure_prefers_error_over_message() {
    let api = seeded();
    api.fail_on(
        "delete_reservation",
        Failure::Rejected {
            status: 404,
            message: Some("別の文言".into()),
            error: Some("Reservation not found".into()),
        },
    );
    let host = Arc::new(RecordingHost::new());
    let mut dashboard = console(&api, &host).dashboard();

    dashboard.reservations.delete(1).await;

    assert_eq!(host.alerts(), vec!["Reservation not found".to_string()]);
}

// ---------------------------------------------------------------------------
// Parks panel
// ---------------------------------------------------------------------------

#[tokio::test]
async fn deleting_referenced_park_leaves_table_unchanged() {
    let api = seeded();
    let host = Arc::new(RecordingHost::new());
    let mut dashboard = console(&api, &host).dashboard();
    dashboard.parks.load().await;
    let before = dashboard.parks.body().clone();
    let park = before.rows()[0].clone();

    dashboard.parks.delete(&park).await;

    assert_eq!(
        host.confirms(),
        vec![
            "公園「中央公園」(ID: 1) を本当に削除しますか？この公園に関連する予約がある場合は削除できません。"
                .to_string()
        ]
    );
    assert_eq!(dashboard.parks.message().kind(), Some(MessageKind::Error));
    assert!(dashboard
        .parks
        .message()
        .text()
        .starts_with("この公園は予約で使用されているため削除できません。"));
    assert_eq!(dashboard.parks.body(), &before);
    assert_eq!(api.call_count("list_parks"), 1);
    assert_eq!(api.parks().len(), 2);
}

#[tokio::test]
async fn unreferenced_park_is_deleted_and_table_reloaded() {
    let api = Arc::new(MockApi::new().with_park("中央公園").with_park("空き地"));
    let host = Arc::new(RecordingHost::new());
    let mut dashboard = console(&api, &host).dashboard();
    dashboard.parks.load().await;
    let park = dashboard.parks.body().rows()[1].clone();

    dashboard.parks.delete(&park).await;

    assert_eq!(dashboard.parks.message().text(), "公園を削除しました");
    assert_eq!(dashboard.parks.body().rows().len(), 1);
}

#[tokio::test]
async fn adding_park_validates_and_reloads() {
    let api = Arc::new(MockApi::new().with_park("中央公園"));
    let host = Arc::new(RecordingHost::new());
    let mut dashboard = console(&api, &host).dashboard();

    dashboard.parks.new_park_name = "   ".into();
    dashboard.parks.add().await;
    assert_eq!(dashboard.parks.message().text(), "公園名を入力してください。");
    assert_eq!(api.call_count("create_park"), 0);

    dashboard.parks.new_park_name = " 南公園 ".into();
    dashboard.parks.add().await;
    assert_eq!(dashboard.parks.message().text(), "公園を追加しました");
    assert_eq!(dashboard.parks.new_park_name, "");
    let names: Vec<String> = dashboard
        .parks
        .body()
        .rows()
        .iter()
        .map(|p| p.name.clone())
        .collect();
    assert_eq!(names, vec!["中央公園", "南公園"]);

    dashboard.parks.new_park_name = "中央公園".into();
    dashboard.parks.add().await;
    assert_eq!(
        dashboard.parks.message().text(),
        "同じ名前の公園が既に存在します"
    );
}

#[tokio::test]
async fn edit_modal_saves_then_closes() {
    let api = seeded();
    let host = Arc::new(RecordingHost::new());
    let mut dashboard = console(&api, &host).dashboard();
    dashboard.parks.load().await;
    let park = dashboard.parks.body().rows()[1].clone();

    dashboard.parks.open_edit(&park);
    assert!(dashboard.parks.modal().visible());
    assert_eq!(dashboard.parks.modal().name_input, "北公園");

    dashboard.parks.modal_mut().name_input = " ".into();
    dashboard.parks.save_edit().await;
    assert_eq!(
        dashboard.parks.modal().message().text(),
        "公園名は空にできません。"
    );
    assert!(dashboard.parks.modal().visible());

    dashboard.parks.modal_mut().name_input = "北の森公園".into();
    dashboard.parks.save_edit().await;
    assert!(!dashboard.parks.modal().visible());
    assert_eq!(
        dashboard.parks.modal().message().text(),
        "公園情報を更新しました"
    );
    assert_eq!(dashboard.parks.body().rows()[1].name, "北の森公園");
    assert_eq!(
        api.stored(3).unwrap().park_name.as_deref(),
        Some("北の森公園")
    );
}

#[tokio::test]
async fn edit_modal_transport_failure_keeps_modal_open() {
    let api = seeded();
    api.fail_on("rename_park", Failure::Network);
    let host = Arc::new(RecordingHost::new());
    let mut dashboard = console(&api, &host).dashboard();
    dashboard.parks.load().await;
    let park = dashboard.parks.body().rows()[0].clone();

    dashboard.parks.open_edit(&park);
    dashboard.parks.modal_mut().name_input = "新中央公園".into();
    dashboard.parks.save_edit().await;

    assert!(dashboard.parks.modal().visible());
    assert_eq!(
        dashboard.parks.modal().message().text(),
        "公園情報の更新中にエラーが発生しました。"
    );

    dashboard.parks.close_edit();
    assert!(!dashboard.parks.modal().visible());
}

// ---------------------------------------------------------------------------
// Reservation editor
// ---------------------------------------------------------------------------

#[tokio::test]
async fn public_submission_round_trips_through_editor() {
    let api = Arc::new(MockApi::new().with_park("中央公園"));
    let host = Arc::new(RecordingHost::new());

    let mut public = PublicBookingController::new(api.clone(), host.clone());
    public.load_parks().await;
    public.select_park("中央公園");
    public.form.start_datetime = "2024-06-01T09:00".into();
    public.form.end_datetime = "2024-06-01T11:30".into();
    public.form.is_exclusive = "1".into();
    public.input_purpose("遠足");
    public.form.grade = "2年".into();
    public.form.organization_name = "みどり小学校".into();
    public.form.number_of_people = "45".into();
    public.form.contact_info = "03-1234-5678".into();
    assert!(public.submit_form());
    let draft = public.flow().draft().cloned().unwrap();
    public.confirm().await;

    let id = api.reservations()[0].id;
    let mut editor = console(&api, &host).editor(Some(id));
    editor.load().await;

    assert_eq!(editor.form.park.selected(), "中央公園");
    assert_eq!(editor.form.status, "pending");
    let mut reopened = editor.form.to_input(FormMode::Admin).unwrap();
    assert_eq!(reopened.status, Some(ReservationStatus::Pending));
    reopened.status = None;
    assert_eq!(reopened, draft);
}

#[tokio::test]
async fn unknown_stored_park_falls_back_to_free_text() {
    let mut stored = reservation(5, "旧中央公園", ReservationStatus::Approved);
    stored.grade = Some("5年".into());
    stored.start_datetime = "2024-07-01 10:00:00".into();
    let api = Arc::new(MockApi::new().with_park("中央公園").with_reservation(stored));
    let host = Arc::new(RecordingHost::new());

    let mut editor = console(&api, &host).editor(Some(5));
    editor.load().await;

    assert_eq!(editor.form.park.selected(), OTHER_PARK);
    assert!(editor.form.park.other_visible());
    assert_eq!(editor.form.park.other_text(), "旧中央公園");
    assert_eq!(editor.form.start_datetime, "2024-07-01T10:00");
    let input = editor.form.to_input(FormMode::Admin).unwrap();
    assert_eq!(input.park_name, "旧中央公園");
    assert_eq!(input.grade.as_deref(), Some("5年"));

    // The server only accepts registered parks.
    editor.submit().await;
    assert_eq!(editor.message().text(), "指定された公園名は存在しません");
    assert!(host.navigations().is_empty());
}

#[tokio::test]
async fn update_shows_message_then_returns_to_dashboard() {
    let api = seeded();
    let host = Arc::new(RecordingHost::new());
    let mut editor = console(&api, &host).editor(Some(1));
    editor.load().await;

    editor.form.status = "approved".into();
    editor.form.number_of_people = "12".into();
    editor.submit().await;

    assert_eq!(editor.message().text(), "予約を更新しました。");
    assert_eq!(host.navigations(), vec!["/admin/dashboard".to_string()]);
    let stored = api.stored(1).unwrap();
    assert_eq!(stored.status, ReservationStatus::Approved);
    assert_eq!(stored.number_of_people, 12);
}

#[tokio::test]
async fn create_with_id_alerts_and_leaves_at_once() {
    let api = Arc::new(MockApi::new().with_park("北公園"));
    let host = Arc::new(RecordingHost::new());
    let mut editor = console(&api, &host).editor(None);
    editor.load().await;

    editor.select_park("北公園");
    editor.form.start_datetime = "2024-08-01T09:00".into();
    editor.form.end_datetime = "2024-08-01T10:00".into();
    editor.input_purpose("清掃");
    editor.form.organization_name = "町内会".into();
    editor.form.number_of_people = "8".into();
    editor.form.contact_info = "090-0000-0000".into();
    editor.submit().await;

    assert_eq!(
        host.alerts(),
        vec!["予約が正常に作成されました。ダッシュボードに戻ります。".to_string()]
    );
    assert_eq!(host.navigations(), vec!["/admin/dashboard".to_string()]);
    assert_eq!(api.reservations().len(), 1);
    assert_eq!(editor.message().kind(), Some(MessageKind::Success));
    assert_eq!(editor.message().text(), "Reservation created successfully");
}

#[tokio::test]
async fn purpose_edit_keeps_stored_grade() {
    let api = seeded();
    let host = Arc::new(RecordingHost::new());
    let mut editor = console(&api, &host).editor(Some(1));
    editor.load().await;
    editor.form.grade = "3年".into();

    editor.input_purpose("清掃");
    assert!(!editor.form.grade_visible);
    assert_eq!(editor.form.grade, "3年");

    editor.input_purpose("遠足");
    assert!(editor.form.grade_visible);

    editor.input_purpose("散歩");
    editor.submit().await;
    assert_eq!(api.stored(1).unwrap().grade.as_deref(), Some("3年"));
    assert_eq!(api.stored(1).unwrap().purpose, "散歩");
}

#[tokio::test]
async fn editor_handles_load_failures() {
    let api = seeded();
    let host = Arc::new(RecordingHost::new());

    let mut missing = console(&api, &host).editor(Some(42));
    missing.load().await;
    assert_eq!(
        missing.message().text(),
        "予約情報の読み込みに失敗しました: Reservation not found"
    );

    api.fail_on(
        "get_reservation",
        Failure::Unauthorized {
            redirect_url: Some("/admin/login".into()),
        },
    );
    let mut expired = console(&api, &host).editor(Some(1));
    expired.load().await;
    assert_eq!(host.navigations(), vec!["/admin/login".to_string()]);
}

#[tokio::test]
async fn editor_save_transport_failure() {
    let api = seeded();
    let host = Arc::new(RecordingHost::new());
    let mut editor = console(&api, &host).editor(Some(2));
    editor.load().await;
    api.fail_on("update_reservation", Failure::Network);

    editor.submit().await;

    assert_eq!(editor.message().text(), "保存処理中にエラーが発生しました。");
    assert!(host.navigations().is_empty());
}

#[tokio::test]
async fn editor_save_failure_prefers_error_over_message() {
    let api = seeded();
    let host = Arc::new(RecordingHost::new());
    let mut editor = console(&api, &host).editor(Some(2));
    editor.load().await;
    api.fail_on(
        "update_reservation",
        Failure::Rejected {
            status: 400,
            message: Some("別の文言".into()),
            error: Some("Missing or empty field: contact_info".into()),
        },
    );

    editor.submit().await;

    assert_eq!(
        editor.message().text(),
        "Missing or empty field: contact_info"
    );
}

#[tokio::test]
async fn editor_save_on_expired_session_stays_on_page() {
    let api = seeded();
    let host = Arc::new(RecordingHost::new());
    let mut editor = console(&api, &host).editor(Some(2));
    editor.load().await;
    api.fail_on(
        "update_reservation",
        Failure::Unauthorized {
            redirect_url: Some("/admin/login".into()),
        },
    );

    editor.submit().await;

    assert!(host.navigations().is_empty());
    assert_eq!(editor.message().kind(), Some(MessageKind::Error));
    assert_eq!(editor.message().text(), "ログインが必要です。");
}

#[tokio::test]
async fn editor_refuses_unknown_status() {
    let api = seeded();
    let host = Arc::new(RecordingHost::new());
    let mut editor = console(&api, &host).editor(Some(1));
    editor.load().await;

    editor.form.status = "archived".into();
    editor.submit().await;

    assert_eq!(editor.message().text(), "ステータスを正しく選択してください。");
    assert_eq!(api.call_count("update_reservation"), 0);
}

#[tokio::test]
async fn mock_reports_unknown_reservation() {
    let api = seeded();
    let err = api.get_reservation(404).await.unwrap_err();
    assert!(matches!(err, ApiError::Rejected { status: 404, .. }));
}
