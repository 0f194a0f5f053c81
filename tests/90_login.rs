mod common;

use anyhow::Result;
use cirquetask_client::i18n::{keys, Translator};
use cirquetask_client::navigation::{auth_guard, guest_guard, Route};
use cirquetask_client::views::LoginOutcome;

#[tokio::test]
async fn login_success_lands_on_dashboard() -> Result<()> {
    let backend = common::MockBackend::start().await?;
    let app = backend.client()?;
    let mut view = app.client.login_view();

    let outcome = view.submit("ada@example.com", common::PASSWORD).await;

    assert_eq!(outcome, LoginOutcome::SignedIn);
    assert_eq!(app.router.current(), Route::Dashboard);
    assert!(app.client.session().is_authenticated());
    assert!(app.notices.is_empty());
    Ok(())
}

#[tokio::test]
async fn wrong_password_stays_on_login_with_notice() -> Result<()> {
    let backend = common::MockBackend::start().await?;
    let app = backend.client()?;
    let mut view = app.client.login_view();

    let outcome = view.submit("ada@example.com", "hunter2").await;

    assert_eq!(outcome, LoginOutcome::Failed("Invalid email or password".to_string()));
    assert_eq!(app.router.current(), Route::Login);
    assert!(app.storage.is_empty());

    let notices = app.notices.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].message, "Invalid email or password");
    assert_eq!(notices[0].action, Translator::from_code("tr").instant(keys::CLOSE));
    Ok(())
}

#[tokio::test]
async fn server_validation_lands_on_known_fields() -> Result<()> {
    let backend = common::MockBackend::start().await?;
    let app = backend.client()?;
    let mut view = app.client.login_view();

    let outcome = view.submit("invalid@example.com", "whatever").await;

    assert!(matches!(outcome, LoginOutcome::Failed(_)));
    assert_eq!(view.form().error("email"), Some("must be a well-formed email address"));
    assert!(view.form().is_touched("email"));
    assert!(view.form().error("captcha").is_none());
    assert!(view.form().error("password").is_none());
    assert_eq!(app.router.current(), Route::Login);
    Ok(())
}

#[tokio::test]
async fn local_validation_skips_the_backend() -> Result<()> {
    let backend = common::MockBackend::start().await?;
    let app = backend.client()?;
    let mut view = app.client.login_view();

    let outcome = view.submit("not-an-email", "").await;

    assert_eq!(outcome, LoginOutcome::Invalid);
    assert_eq!(view.form().error("email"), Some("email"));
    assert_eq!(view.form().error("password"), Some("required"));
    assert!(view.form().is_touched("password"));
    assert!(backend.requests_to("/api/auth/login").is_empty());
    assert!(app.notices.is_empty());

    let outcome = view.submit("ada@example.com", common::PASSWORD).await;
    assert_eq!(outcome, LoginOutcome::SignedIn);
    assert_eq!(backend.requests_to("/api/auth/login").len(), 1);
    Ok(())
}

#[tokio::test]
async fn guards_route_by_session() -> Result<()> {
    let backend = common::MockBackend::start().await?;
    let app = backend.client()?;
    let session = app.client.session().as_ref();

    assert!(!auth_guard(session, app.router.as_ref()));
    assert_eq!(app.router.current(), Route::Login);
    assert!(guest_guard(session, app.router.as_ref()));

    app.sign_in().await?;

    assert!(auth_guard(session, app.router.as_ref()));
    assert!(!guest_guard(session, app.router.as_ref()));
    assert_eq!(app.router.current(), Route::Dashboard);

    assert!(app.router.activate(Route::Board { project_id: 1, board_id: 7 }, session));
    assert_eq!(app.router.current().path(), "/projects/1/board/7");
    Ok(())
}
